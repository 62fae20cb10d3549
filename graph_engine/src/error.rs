//! Error types for the graph engine.
//!
//! Queries never fail: unknown ids produce empty results. Errors are limited
//! to reading the source file and loading configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the engine's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read knowledge graph source '{}': {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file '{}': {source}", path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_mentions_path() {
        let err = Error::SourceUnreadable {
            path: PathBuf::from("data/missing.cypher"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };

        let message = err.to_string();
        assert!(message.contains("data/missing.cypher"));
        assert!(message.contains("no such file"));
    }

    #[test]
    fn test_config_invalid_message() {
        let err = Error::ConfigInvalid("graph.default_depth must be >= 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: graph.default_depth must be >= 0"
        );
    }
}
