use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, WndbError>;

/// Enum representing all possible errors in the wndb_rs library.
#[derive(Error, Debug)]
pub enum WndbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Dump serialization/deserialization error: {0}")]
    Dump(#[from] bincode::Error),

    #[error("Unsupported wordnet connector: {0}")]
    BadConnector(String),

    #[error("Failed to open the wordnet dataset: {0}")]
    BadDataset(String),

    #[error("There is presently no connection to wordnet; reopen the connection and retry")]
    NoConnection,

    #[error("Failed to decode record: {0}")]
    Decode(String),

    #[error("Synset not found: {0}")]
    SynsetNotFound(String),

    #[error("Data directory not found or could not be determined")]
    DataDirNotFound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WndbError {
    /// Shorthand for a [`WndbError::Decode`] with a formatted message.
    pub(crate) fn decode<S: Into<String>>(msg: S) -> Self {
        WndbError::Decode(msg.into())
    }
}
