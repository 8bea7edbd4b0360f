/// Top-level Clickflow error type.
///
/// All fallible operations in `clickflow-core` return
/// [`Result<T, ClickflowError>`](Result). Each variant wraps a
/// domain-specific error enum, allowing callers to match on the error
/// source without losing type information.
#[derive(thiserror::Error, Debug)]
pub enum ClickflowError {
    /// Error from the visit store layer (`SQLite` operations, migrations).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error while ingesting visit data (parse failures, bad rows).
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Error during analysis (leaderboard, insights).
    #[error("Analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    /// Error from the flow-graph engine.
    #[error("Graph engine error: {0}")]
    Graph(#[from] clickflow_graphs::GraphError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the SQLite-backed visit store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Underlying `SQLite` operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Schema migration failed (version mismatch or DDL error).
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A referenced project was not found in the store.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// JSON serialization/deserialization of stored data failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors while loading visit data into the store.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    /// Input file could not be parsed as a visit export.
    #[error("Parse error at record {index}: {message}")]
    Parse {
        /// Zero-based index of the offending record.
        index: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// Filesystem I/O error reading the input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors during analysis.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    /// Not enough data in the store to run this analysis.
    #[error("Insufficient data for analysis: {0}")]
    InsufficientData(String),

    /// Algorithmic or numerical error during computation.
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Errors in Clickflow configuration parsing and validation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// Configuration values are present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Configuration file syntax could not be parsed (TOML error).
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience alias for `Result<T, ClickflowError>`.
pub type Result<T> = std::result::Result<T, ClickflowError>;
