//! Tokenizer module for token counting
//!
//! Token counts are a size metric only. The scheme is a fixed BPE encoding
//! picked through [`Model`], so the same text always yields the same count.

mod bpe;
mod error;
mod model;

// Re-exports for public API
pub use bpe::BpeTokenizer;
pub use error::{TokenizerError, TokenizerResult};
pub use model::Model;

/// Trait defining the interface for tokenizers
pub trait Tokenizer: Send + Sync {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> usize;

    /// Model whose tokenization scheme is used
    fn model(&self) -> Model;
}

/// Create a tokenizer for the specified model
pub fn create_tokenizer(model: Model) -> TokenizerResult<Box<dyn Tokenizer>> {
    Ok(Box::new(BpeTokenizer::new(model)?))
}
