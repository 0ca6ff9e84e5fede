//! Error types for trigger persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading or saving trigger data.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O or filesystem error.
    #[error("{message}")]
    Read {
        /// Optional path associated with the error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    /// The file is not valid RON. Individual malformed entries inside a
    /// well-formed file are skipped, not reported here.
    #[error("{message}")]
    Parse {
        /// Optional path associated with the error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a message including the path when one is known.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse { path, message } => match path {
                Some(p) => format!("Trigger parse error at {}: {}", p.display(), message),
                None => format!("Trigger parse error: {}", message),
            },
        }
    }
}
