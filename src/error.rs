//! Error types shared by every stage of the pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RainfallError {
    /// The dataset identifier does not resolve on the platform
    #[error("Dataset not found: {0}")]
    NotFound(String),

    /// The archive does not contain the requested layer
    #[error("Layer `{layer}` not found (available: {})", available.join(", "))]
    LayerNotFound { layer: String, available: Vec<String> },

    /// A resource filter matched zero or several resources
    #[error("Expected exactly one resource matching `{pattern}`, found {}", matches.len())]
    AmbiguousSelection { pattern: String, matches: Vec<String> },

    /// Network failure or a broken remote payload
    #[error("Transport failed: {0}")]
    Transport(String),

    /// A geometry cell could not be parsed as well-known text
    #[error("Invalid geometry in row {row}: {reason}")]
    InvalidGeometry { row: usize, reason: String },

    /// Malformed or failing SQL
    #[error("Query failed: {0}")]
    Query(#[from] duckdb::Error),

    /// A selector value is not one of its options
    #[error("`{value}` is not a valid option for {label}")]
    UnknownOption { label: String, value: String },

    /// A range selection outside the slider bounds
    #[error("Invalid range [{lo}, {hi}], expected values within [{start}, {stop}]")]
    InvalidRange {
        lo: usize,
        hi: usize,
        start: usize,
        stop: usize,
    },

    #[error("Failed to parse `{0}`")]
    Parse(String),

    #[error("Failed to render: {0}")]
    Render(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for RainfallError {
    fn from(e: reqwest::Error) -> Self {
        RainfallError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RainfallError>;

// -- Tests -------------------------------------------------------------------
