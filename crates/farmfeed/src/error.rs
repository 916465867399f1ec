//! Error types for Farmfeed

use thiserror::Error;

/// Main error type for Farmfeed operations
#[derive(Error, Debug)]
pub enum FarmfeedError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Proxy/HTTP errors
    #[error("Proxy error: {0}")]
    Proxy(String),
}

/// Result type alias for Farmfeed operations
pub type Result<T> = std::result::Result<T, FarmfeedError>;
