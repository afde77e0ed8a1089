//! SQLite-backed wordnet connection.
//!
//! The alternative to the pure flat-file engine: the same three primitive
//! queries served from a prebuilt SQLite database acting as an ordered
//! key-value table. The database is produced by the dataset tooling; this
//! module only reads it.

use crate::error::{Result, WndbError};
use crate::models::{EvocationRecord, HomographRecord, SynsetRecord};
use crate::parse;
use crate::{Connector, WordnetConnection};
use log::{debug, info, warn};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// Table layout of the prebuilt dataset. Each table is a key-value map;
// values are bincode-serialized records. Homographs are keyed by the
// normalized lemma, synsets by their id, evocations by id + "s".
pub const HOMOGRAPHS_TABLE: &str = "homographs";
pub const SYNSETS_TABLE: &str = "synsets";
pub const EVOCATIONS_TABLE: &str = "evocations";

#[derive(Debug)]
pub struct DbConnection {
    db_path: PathBuf,
    conn: Mutex<Option<Connection>>,
    /// Whether the dataset was built with the optional evocations table.
    has_evocations: bool,
}

impl DbConnection {
    /// Opens the prebuilt dataset read-only. The two mandatory tables must
    /// be present; the evocations table is optional (its absence is the
    /// "evocations not installed" configuration).
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Self::connect(db_path)?;

        for table in [HOMOGRAPHS_TABLE, SYNSETS_TABLE] {
            if !table_exists(&conn, table)? {
                return Err(WndbError::BadDataset(format!(
                    "the sqlite dataset at {:?} is missing its {} table; rebuild it with the dataset tooling",
                    db_path, table
                )));
            }
        }
        let has_evocations = table_exists(&conn, EVOCATIONS_TABLE)?;
        if !has_evocations {
            warn!(
                "the dataset at {:?} has no evocations table; evocation queries will report absent",
                db_path
            );
        }

        info!("Opened sqlite wordnet connection at {:?}", db_path);
        Ok(DbConnection {
            db_path: db_path.to_path_buf(),
            conn: Mutex::new(Some(conn)),
            has_evocations,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(db_path: &Path) -> Result<Connection> {
        if !db_path.is_file() {
            return Err(WndbError::BadDataset(format!(
                "failed to locate the sqlite wordnet dataset at {:?}; build it with the dataset tooling",
                db_path
            )));
        }
        Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
            WndbError::BadDataset(format!("failed to open {:?}: {}", db_path, e))
        })
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| WndbError::Internal("connection mutex poisoned".to_string()))
    }

    /// Fetches the value blob stored under `key`, or `None` when the key
    /// has no row.
    fn fetch(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let guard = self.lock_conn()?;
        let conn = guard.as_ref().ok_or(WndbError::NoConnection)?;

        let sql = format!("SELECT value FROM {} WHERE key = ?1", table);
        let mut stmt = conn.prepare(&sql)?;
        let blob = stmt
            .query_row(params![key], |row| row.get::<_, Vec<u8>>(0))
            .optional()?;
        debug!(
            "sqlite fetch {}[{:?}]: {}",
            table,
            key,
            if blob.is_some() { "hit" } else { "miss" }
        );
        Ok(blob)
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

impl WordnetConnection for DbConnection {
    fn connector(&self) -> Connector {
        Connector::Sqlite
    }

    fn connected(&self) -> bool {
        self.conn.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    fn close(&self) {
        if let Ok(mut guard) = self.conn.lock() {
            guard.take();
        }
    }

    fn reopen(&self) -> Result<()> {
        let mut guard = self.lock_conn()?;
        if guard.is_none() {
            *guard = Some(Self::connect(&self.db_path)?);
            info!("Reopened sqlite wordnet connection at {:?}", self.db_path);
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("sqlite mode with dataset at {}", self.db_path.display())
    }

    fn homographs(&self, term: &str) -> Result<Option<HomographRecord>> {
        let key = parse::normalize_term(term);
        match self.fetch(HOMOGRAPHS_TABLE, &key)? {
            Some(blob) => Ok(Some(bincode::deserialize(&blob)?)),
            None => Ok(None),
        }
    }

    fn synset(&self, synset_id: &str) -> Result<Option<SynsetRecord>> {
        match self.fetch(SYNSETS_TABLE, synset_id)? {
            Some(blob) => Ok(Some(bincode::deserialize(&blob)?)),
            None => Ok(None),
        }
    }

    fn evocations(&self, synset_id: &str) -> Result<Option<EvocationRecord>> {
        if !self.has_evocations {
            // Still a query against the connection: a closed connection
            // reports NoConnection before reporting absence.
            let guard = self.lock_conn()?;
            guard.as_ref().ok_or(WndbError::NoConnection)?;
            return Ok(None);
        }
        match self.fetch(EVOCATIONS_TABLE, &format!("{}s", synset_id))? {
            Some(blob) => {
                let raw: crate::models::RawEvocation = bincode::deserialize(&blob)?;
                Ok(Some(parse::decode_evocation(&raw)?))
            }
            None => Ok(None),
        }
    }
}
