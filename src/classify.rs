/*!
 * File classification: text vs binary, size ceiling, decoding and MIME types
 */

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::{debug, warn};

use crate::types::FileKind;
use crate::utils::format_file_size;

/// Files larger than this never take part in content-bearing reports
pub const MAX_FILE_SIZE: u64 = 1_048_576;

/// Number of leading bytes sniffed to tell text from binary
const SAMPLE_SIZE: usize = 8192;

/// Outcome of classifying one file
#[derive(Debug, Clone)]
pub struct Classified {
    /// Classification of the file
    pub kind: FileKind,
    /// Size in bytes
    pub size: u64,
    /// Decoded text, present only for [`FileKind::Text`]
    pub content: Option<String>,
}

/// Decides whether files are eligible for content-bearing reports
#[derive(Debug, Clone, Copy)]
pub struct FileClassifier {
    max_size: u64,
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE)
    }
}

impl FileClassifier {
    /// Create a classifier with the given size ceiling
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    /// Text content within the size ceiling
    pub fn is_eligible(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(metadata) if metadata.len() <= self.max_size => {
                is_text_sample(path).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Classify a file and, when it is eligible, read its text
    pub fn classify(&self, path: &Path) -> Classified {
        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("Cannot stat {}: {}", path.display(), e);
                return Classified {
                    kind: FileKind::Unreadable,
                    size: 0,
                    content: None,
                };
            }
        };

        if size > self.max_size {
            debug!(
                "Skipping oversized file {} ({})",
                path.display(),
                format_file_size(size)
            );
            return Classified {
                kind: FileKind::Oversized,
                size,
                content: None,
            };
        }

        match is_text_sample(path) {
            Ok(true) => {}
            Ok(false) => {
                return Classified {
                    kind: FileKind::Binary,
                    size,
                    content: None,
                }
            }
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                return Classified {
                    kind: FileKind::Unreadable,
                    size,
                    content: None,
                };
            }
        }

        match read_text(path) {
            Ok(Some(content)) => Classified {
                kind: FileKind::Text,
                size,
                content: Some(content),
            },
            Ok(None) => {
                warn!("Cannot decode {}, skipping its content", path.display());
                Classified {
                    kind: FileKind::Unreadable,
                    size,
                    content: None,
                }
            }
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                Classified {
                    kind: FileKind::Unreadable,
                    size,
                    content: None,
                }
            }
        }
    }
}

/// Sniff the first bytes of a file for binary content
fn is_text_sample(path: &Path) -> io::Result<bool> {
    let mut buffer = vec![0; SAMPLE_SIZE];
    let mut file = File::open(path)?;
    let bytes_read = file.read(&mut buffer)?;
    buffer.truncate(bytes_read);
    Ok(looks_like_text(&buffer))
}

/// Heuristic for text content: no NUL bytes and few control characters
pub fn looks_like_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return true;
    }
    if sample.contains(&0) {
        return false;
    }

    // Control characters outside tab, newlines, form feed and escape
    let binary_count = sample
        .iter()
        .filter(|&&b| b < 9 || (b > 13 && b < 32 && b != 27))
        .count();
    let binary_ratio = binary_count as f32 / sample.len() as f32;

    binary_ratio < 0.1
}

/// Read a file as UTF-8, falling back to Windows-1252
///
/// Returns `Ok(None)` when neither encoding can decode the bytes.
pub fn read_text(path: &Path) -> io::Result<Option<String>> {
    let bytes = fs::read(path)?;
    Ok(decode(bytes))
}

/// Decode raw bytes as UTF-8, falling back to a single-byte encoding
pub fn decode(bytes: Vec<u8>) -> Option<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            let bytes = e.into_bytes();
            WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(&bytes)
                .map(Cow::into_owned)
        }
    }
}

/// Guess the MIME type of a file from its name
pub fn mime_type(path: &Path, kind: Option<FileKind>) -> String {
    match mime_guess::from_path(path).first_raw() {
        Some(mime) => mime.to_string(),
        None if kind == Some(FileKind::Binary) => "application/octet-stream".to_string(),
        None => "text/plain".to_string(),
    }
}
