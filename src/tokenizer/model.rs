//! Model definitions and metadata

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumProperty};

/// Models whose tokenization scheme can be used for counting
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    Display,
    ValueEnum,
    Serialize,
    Deserialize,
    EnumProperty,
)]
pub enum Model {
    #[default]
    #[strum(props(model_id = "gpt-4", encoding = "cl100k_base"))]
    Gpt4,

    #[strum(props(model_id = "gpt-4-0125-preview", encoding = "cl100k_base"))]
    Gpt4Turbo,

    #[strum(props(model_id = "gpt-4o", encoding = "o200k_base"))]
    Gpt4o,

    #[strum(props(model_id = "gpt-3.5-turbo", encoding = "cl100k_base"))]
    Gpt35Turbo,
}

impl Model {
    /// Get the model identifier understood by tiktoken
    pub fn model_id(&self) -> &'static str {
        self.get_str("model_id").unwrap_or("gpt-4")
    }

    /// Name of the BPE encoding used by this model
    pub fn encoding(&self) -> &'static str {
        self.get_str("encoding").unwrap_or("cl100k_base")
    }
}
