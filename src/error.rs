//! Error types for Lectern

use thiserror::Error;

/// Result type alias for Lectern operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Lectern
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Host lacks a required speech capability
    #[error("unsupported capability: {0}")]
    Unsupported(String),

    /// Speech capture error
    #[error("capture error: {0}")]
    Capture(String),

    /// Speech synthesis error
    #[error("speech error: {0}")]
    Speech(String),

    /// Answering backend error
    #[error("answer error: {0}")]
    Answer(String),

    /// Document engine error
    #[error("document error: {0}")]
    Document(String),

    /// Page rendering error
    #[error("render error: {0}")]
    Render(String),

    /// Library storage error
    #[error("library error: {0}")]
    Library(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),
}
