//! Tokenizer construction errors

use thiserror::Error;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Failure to set up a tokenizer; counting itself cannot fail
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The BPE ranks of an encoding could not be loaded
    #[error("Failed to load the {encoding} encoding: {message}")]
    Encoding {
        encoding: &'static str,
        message: String,
    },
}
