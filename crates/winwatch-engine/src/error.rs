use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the winwatch engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The notification channel has been closed by the receiver.
    #[error("notification channel closed")]
    ChannelClosed,

    /// I/O failure while spawning a script.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A script dialect requires an interpreter executable that is missing.
    #[error("required interpreter not found: {0}")]
    MissingInterpreter(PathBuf),

    /// Generic error with context.
    #[error("engine error: {0}")]
    Msg(String),
}
