//! Errors surfaced by projtree commands
//!
//! Only invocation-level failures end up here. Problems with a single file or
//! directory during a scan are recorded on the tree and logged instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Error type of every fallible projtree operation
#[derive(Error, Debug)]
pub enum ProjtreeError {
    /// The tokenizer could not be constructed
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// I/O failure outside per-file reads
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Ignore-file parse errors
    #[error("Ignore rule error: {0}")]
    Ignore(#[from] ignore::Error),

    /// Dump serialization failure
    #[error("Failed to serialize dump: {0}")]
    Json(#[from] serde_json::Error),

    /// Inconsistent scanner setup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to overwrite a file
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path given on the command line does not exist
    #[error("{0}")]
    PathNotFound(String),

    /// An argument value is out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ProjtreeError>;

/// Build a [`ProjtreeError`] variant from a format string
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ProjtreeError::$error_type(format!($($arg)*))
    };
}

/// Return early with a formatted [`ProjtreeError`]
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Bail out unless the condition holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
