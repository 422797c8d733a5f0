//! BPE tokenizer implementation using tiktoken

use tiktoken_rs::CoreBPE;

use super::Tokenizer;
use crate::tokenizer::error::{TokenizerError, TokenizerResult};
use crate::tokenizer::model::Model;

/// Tokenizer backed by a tiktoken BPE encoding
pub struct BpeTokenizer {
    model: Model,
    encoding: CoreBPE,
}

impl BpeTokenizer {
    /// Create a new BPE tokenizer for the model's encoding
    pub fn new(model: Model) -> TokenizerResult<Self> {
        let encoding = tiktoken_rs::get_bpe_from_model(model.model_id()).map_err(|e| {
            TokenizerError::Encoding {
                encoding: model.encoding(),
                message: e.to_string(),
            }
        })?;

        Ok(Self { model, encoding })
    }
}

impl Tokenizer for BpeTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.encoding.encode_ordinary(text).len()
    }

    fn model(&self) -> Model {
        self.model
    }
}
