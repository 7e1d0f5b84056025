use thiserror::Error;

/// Main error type for the market environment
#[derive(Error, Debug)]
pub enum GymError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No tradeable instruments admitted (need more than {scope} return records each)")]
    NoInstruments { scope: usize },

    // Caller contract violations
    #[error("Invalid action index: {0} (expected 0=LONG or 1=SHORT)")]
    InvalidAction(usize),

    // Internal indexing faults
    #[error("Window out of range for {instrument}: end index {end_index}, scope {scope}, {available} records")]
    WindowOutOfRange {
        instrument: String,
        end_index: usize,
        scope: usize,
        available: usize,
    },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GymError
pub type Result<T> = std::result::Result<T, GymError>;

/// Reasons a single raw series line is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    #[error("expected 6 columns, found {found}")]
    ColumnCount { found: usize },

    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}
