//! Library error type
//!
//! Structural problems inside a document are never errors: they are reported
//! as findings. Errors are reserved for conditions that abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a lint run
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be read
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text
    #[error("{path:?} is not valid UTF-8 text")]
    Parse {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The configuration file could not be parsed
    #[error("invalid configuration in {path:?}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Directory traversal failed
    #[error("failed to scan directory")]
    Walk(#[from] walkdir::Error),

    /// The parallel validation pool could not be started
    #[error("failed to start validation pool")]
    Runtime(#[source] std::io::Error),

    /// A validation task panicked or was cancelled
    #[error("validation task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Build an I/O error tied to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_source_is_reported_once_in_chain() {
        let err = Error::io("docs/intro.md", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "failed to read \"docs/intro.md\"");

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain, "failed to read \"docs/intro.md\": gone");
    }
}
