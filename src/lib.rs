// Declare modules
pub mod data;
pub mod db;
pub mod entity;
pub mod error;
pub mod models;
pub mod parse;
pub mod pure;

#[cfg(test)]
pub(crate) mod fixture;

// Re-export key types for easier use
pub use entity::{EvocationEdge, Evocations, Homographs, Relation, Synset};
pub use error::{Result, WndbError};
pub use models::{
    EvocationRecord,
    HomographRecord,
    LexicalCategory,
    PartOfSpeech,
    PosHomograph,
    RelationKind,
    RelationToken,
    SynsetRecord,
    SynsetType,
    SynsetWord,
};

use crate::db::DbConnection;
use crate::pure::PureConnection;
use log::{debug, info};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// --- Connector selection ---

/// The available backends. Both answer the same three primitive queries;
/// `Pure` reads the flat wordnet files directly, `Sqlite` reads a prebuilt
/// key-value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    Pure,
    Sqlite,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Connector::Pure => "pure",
            Connector::Sqlite => "sqlite",
        })
    }
}

impl std::str::FromStr for Connector {
    type Err = WndbError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pure" => Ok(Connector::Pure),
            "sqlite" => Ok(Connector::Sqlite),
            other => Err(WndbError::BadConnector(format!(
                "{} (supported connectors are: pure, sqlite)",
                other
            ))),
        }
    }
}

// --- Connection capability interface ---

/// The capability interface implemented by every backend: the three
/// primitive queries plus connection lifecycle. Absent terms and ids are
/// `Ok(None)`, never errors; a closed connection answers every query with
/// [`WndbError::NoConnection`].
pub trait WordnetConnection: Send + Sync + std::fmt::Debug {
    fn connector(&self) -> Connector;

    fn connected(&self) -> bool;

    /// Closes the connection. Queries fail with `NoConnection` until
    /// [`WordnetConnection::reopen`] succeeds.
    fn close(&self);

    fn reopen(&self) -> Result<()>;

    /// One-line description of the backend and its dataset location.
    fn description(&self) -> String;

    fn homographs(&self, term: &str) -> Result<Option<HomographRecord>>;

    fn synset(&self, synset_id: &str) -> Result<Option<SynsetRecord>>;

    fn evocations(&self, synset_id: &str) -> Result<Option<EvocationRecord>>;

    /// Whether the auxiliary evocation dataset is installed, answered by
    /// probing a known well-formed id.
    fn evocations_available(&self) -> Result<bool> {
        Ok(self.evocations(models::EVOCATION_PROBE_ID)?.is_some())
    }
}

// --- Wordnet ---

/// Options for opening a wordnet connection.
#[derive(Debug, Default, Clone)]
pub struct OpenOptions {
    /// Directory holding the wordnet index/data files. If `None`, the
    /// standard install locations are searched.
    pub wordnet_path: Option<PathBuf>,
    /// Directory holding the constructed datasets (prefix index, evocation
    /// dump, sqlite table). If `None`, the per-user data directory is used.
    pub data_path: Option<PathBuf>,
}

/// The main wordnet interface: a handle on one open connection plus the
/// entity-model entry points.
#[derive(Clone, Debug)] // Clone is cheap, the connection is shared behind an Arc
pub struct Wordnet {
    connection: Arc<dyn WordnetConnection>,
}

impl Wordnet {
    /// Opens a connection with default options (searched wordnet path,
    /// per-user data directory).
    pub fn open(connector: Connector) -> Result<Self> {
        Self::open_with_options(connector, OpenOptions::default())
    }

    /// Opens a connection with specific options. Opening is all-or-nothing:
    /// any missing piece of the dataset fails here with
    /// [`WndbError::BadDataset`] and leaves nothing half-open.
    pub fn open_with_options(connector: Connector, options: OpenOptions) -> Result<Self> {
        let data_path = match options.data_path {
            Some(path) => path,
            None => data::default_data_dir()?,
        };
        info!(
            "Opening {} wordnet connection (data path {:?})",
            connector, data_path
        );

        let connection: Arc<dyn WordnetConnection> = match connector {
            Connector::Pure => Arc::new(PureConnection::open(
                options.wordnet_path.as_deref(),
                &data_path,
            )?),
            Connector::Sqlite => {
                Arc::new(DbConnection::open(&data_path.join(data::SQLITE_FILENAME))?)
            }
        };
        Ok(Wordnet { connection })
    }

    /// Wraps an already-constructed connection, e.g. a custom backend.
    pub fn with_connection(connection: Arc<dyn WordnetConnection>) -> Self {
        Wordnet { connection }
    }

    /// Locates the homographs of `term`. The term is case-folded and
    /// underscore-normalized before lookup; an unknown term is `Ok(None)`.
    pub fn find(&self, term: &str) -> Result<Option<Homographs>> {
        debug!("find: {:?}", term);
        let record = self.connection.homographs(term)?;
        Ok(record.map(|record| Homographs::new(record, Arc::clone(&self.connection))))
    }

    /// Resolves a synset by id. Ids come from prior lookups, so an id that
    /// does not resolve is [`WndbError::SynsetNotFound`].
    pub fn synset(&self, synset_id: &str) -> Result<Synset> {
        entity::resolve_synset(&self.connection, synset_id)
    }

    pub fn evocations_available(&self) -> Result<bool> {
        self.connection.evocations_available()
    }

    pub fn connector(&self) -> Connector {
        self.connection.connector()
    }

    pub fn connected(&self) -> bool {
        self.connection.connected()
    }

    pub fn close(&self) {
        self.connection.close();
    }

    pub fn reopen(&self) -> Result<()> {
        self.connection.reopen()
    }

    /// The underlying connection object.
    pub fn connection(&self) -> &Arc<dyn WordnetConnection> {
        &self.connection
    }
}

impl fmt::Display for Wordnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.connected() {
            f.write_str("wordnet not connected")
        } else {
            write!(f, "wordnet running in {}", self.connection.description())
        }
    }
}
