//! Error types for coverage review operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    /// The report could not be read as a JaCoCo XML document
    #[error("Malformed JaCoCo report: {0}")]
    MalformedReport(String),

    /// A configured class pattern or source root is not a valid regex
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The report parsed but contains no class entries
    #[error("No classes found in coverage report {0}")]
    NoCoverageData(String),

    #[error("Failed to read coverage report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for coverage review operations
pub type Result<T> = std::result::Result<T, ReviewError>;
