// src/error.rs

//! Error types for pom2feed

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while converting Maven artifacts into feeds
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem or stream failure, with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Raw I/O error from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// HTTP transfer failed
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Resource does not exist in the repository
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// XML or text content could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Group id, artifact id or version contains characters Maven does not allow
    #[error("Invalid artifact coordinate: {0}")]
    InvalidCoordinate(String),

    /// Repository location is neither a path nor an http(s) URL
    #[error("Unsupported repository location: {0}")]
    UnsupportedRepository(String),

    /// Hash string is malformed or uses an unknown algorithm
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// gpg invocation failed
    #[error("Signing failed: {0}")]
    SigningError(String),

    /// Configuration file is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Client or component could not be set up
    #[error("Initialization error: {0}")]
    InitError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::NotFoundError("org/example/maven-metadata.xml".to_string());
        assert_eq!(err.to_string(), "Not found: org/example/maven-metadata.xml");

        let err = Error::SigningError("no secret key".to_string());
        assert_eq!(err.to_string(), "Signing failed: no secret key");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
