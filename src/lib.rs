/*!
 * projtree - Inspect a project tree for LLM context
 *
 * This library walks a directory while honouring its .gitignore and produces
 * tree listings, token counts, inlined contents, search hits and structured
 * JSON dumps from a single scan.
 */

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod mutate;
pub mod report;
pub mod scanner;
pub mod tokenizer;
pub mod tools;
pub mod types;
pub mod utils;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use classify::FileClassifier;
pub use config::Config;
pub use error::{ProjtreeError, Result};
pub use filter::IgnoreMatcher;
pub use report::{Reporter, TreeStyle};
pub use scanner::{ScanOptions, Scanner};
pub use tokenizer::{create_tokenizer, Model, Tokenizer};
pub use types::{DirectoryNode, DumpRecord, FileKind, FileNode, LargeFile, ScanResult};
pub use writer::JsonWriter;
