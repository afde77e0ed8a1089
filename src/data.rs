//! Dataset discovery and dump management.
//!
//! This module locates a WordNet distribution on disk, resolves the
//! per-user data directory that holds the constructed dumps (prefix index,
//! evocations, SQLite table), and loads those dumps.

use crate::error::{Result, WndbError};
use crate::models::{PartOfSpeech, RawEvocation};
use directories_next::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// File name of the serialized prefix-index table inside the data directory.
pub const PREFIX_INDEX_FILENAME: &str = "prefix_index.dmp";
/// File name of the serialized evocation dataset inside the data directory.
pub const EVOCATIONS_FILENAME: &str = "evocations.dmp";
/// File name of the prebuilt SQLite table inside the data directory.
pub const SQLITE_FILENAME: &str = "wordnet.db";

/// Install locations probed when no explicit wordnet path is given.
pub const DEFAULT_WORDNET_LOCATIONS: [&str; 6] = [
    "/usr/share/wordnet",
    "/usr/local/share/wordnet",
    "/usr/local/WordNet-3.0",
    "/opt/WordNet-3.0",
    "/opt/wordnet",
    "/opt/local/share/WordNet-3.0",
];

/// Locates the directory holding the wordnet index/data files.
///
/// With an explicit path only that path is considered; otherwise the
/// standard install locations are probed. Each candidate is accepted (with
/// or without a `dict/` subdirectory) if it contains `data.noun`.
pub fn locate_wordnet(override_path: Option<&Path>) -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = match override_path {
        Some(path) => vec![path.to_path_buf()],
        None => DEFAULT_WORDNET_LOCATIONS.iter().map(PathBuf::from).collect(),
    };

    for dir in candidates {
        for sub in ["", "dict"] {
            let path = dir.join(sub);
            if path.join(PartOfSpeech::Noun.data_file()).is_file() {
                debug!("Found wordnet files at {:?}", path);
                return Some(path);
            }
        }
    }
    None
}

/// Gets the default per-user directory for constructed dumps.
pub fn default_data_dir() -> Result<PathBuf> {
    let project_dirs =
        ProjectDirs::from("org", "WndbRs", "wndb-rs").ok_or(WndbError::DataDirNotFound)?;
    Ok(project_dirs.data_dir().to_path_buf())
}

/// Static per-part-of-speech mapping from a term's leading (up to two)
/// characters to the byte offset of the first index line carrying that
/// prefix. Built offline by the installation tooling; consumed read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefixIndex {
    tables: HashMap<PartOfSpeech, HashMap<String, u64>>,
}

impl PrefixIndex {
    /// Deserializes a prefix-index dump.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let index = bincode::deserialize_from(BufReader::new(file))?;
        Ok(index)
    }

    /// Serializes this table to `path`. The reader never calls this; it
    /// exists for the installation tooling and for fixture tests.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Records `offset` for `prefix` unless an earlier offset is already
    /// known; index files are walked front to back, so the first offset
    /// seen for a prefix is the start of its run.
    pub fn insert(&mut self, pos: PartOfSpeech, prefix: &str, offset: u64) {
        self.tables
            .entry(pos)
            .or_default()
            .entry(prefix.to_string())
            .or_insert(offset);
    }

    /// The byte offset to seek to before scanning for `prefix`, or `None`
    /// if no term with this prefix exists for this part of speech (in which
    /// case the part of speech is skipped entirely, never scanned from 0).
    pub fn offset(&self, pos: PartOfSpeech, prefix: &str) -> Option<u64> {
        self.tables.get(&pos).and_then(|table| table.get(prefix)).copied()
    }
}

/// Loads the evocation dump if installed. Absence is a normal, common
/// configuration and is reported as `Ok(None)`, never an error.
pub fn load_evocations(path: &Path) -> Result<Option<HashMap<String, RawEvocation>>> {
    if !path.is_file() {
        info!("No evocation dump at {:?}; evocation queries will report absent", path);
        return Ok(None);
    }
    let file = File::open(path)?;
    let map: HashMap<String, RawEvocation> = bincode::deserialize_from(BufReader::new(file))?;
    info!("Loaded {} evocation entries from {:?}", map.len(), path);
    Ok(Some(map))
}
