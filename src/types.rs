/*!
 * Core types and data structures for projtree
 */

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Classification of a file visited by a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Text file whose content was read successfully
    Text,
    /// Binary file (non-text)
    Binary,
    /// File larger than the size ceiling
    Oversized,
    /// Text-looking file that could not be read or decoded
    Unreadable,
}

/// Represents a file in the scanned tree
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File name
    pub name: String,
    /// Path relative to the scan root
    pub path: PathBuf,
    /// Absolute path on disk
    pub abs_path: PathBuf,
    /// Classification, `None` when the scan did not need file contents
    pub kind: Option<FileKind>,
    /// MIME type guess
    pub mime: String,
    /// Token count, only computed when requested
    pub tokens: Option<usize>,
    /// Whether the content contains the search pattern
    pub matched: bool,
    /// File content, only kept when requested
    pub content: Option<String>,
}

impl FileNode {
    /// Whether the file takes part in content-bearing reports
    pub fn is_eligible(&self) -> bool {
        self.kind == Some(FileKind::Text)
    }
}

/// Represents a directory in the scanned tree
#[derive(Debug, Clone, Default)]
pub struct DirectoryNode {
    /// Directory name
    pub name: String,
    /// Path relative to the scan root (empty for the root)
    pub path: PathBuf,
    /// Files in enumeration order
    pub files: Vec<FileNode>,
    /// Subdirectories in enumeration order
    pub dirs: Vec<DirectoryNode>,
    /// Sum of the token counts of everything beneath this directory
    pub total_tokens: usize,
    /// Set when the directory could not be listed
    pub inaccessible: bool,
}

impl DirectoryNode {
    /// Iterate over every file in the subtree, depth first, files before subdirectories
    pub fn walk_files(&self) -> Box<dyn Iterator<Item = &FileNode> + '_> {
        Box::new(
            self.files
                .iter()
                .chain(self.dirs.iter().flat_map(|dir| dir.walk_files())),
        )
    }
}

/// A file path with its token count, used by the largest-files report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargeFile {
    /// Path relative to the scan root
    pub path: PathBuf,
    /// Token count
    pub tokens: usize,
}

/// One entry of the structured dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpRecord {
    /// Absolute path of the file
    pub path: String,
    /// Full text content
    pub contents: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Everything produced by one scan
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Root of the scanned tree
    pub root: DirectoryNode,
    /// Token total of the whole tree
    pub total_tokens: usize,
    /// Largest files by token count, descending
    pub largest: Vec<LargeFile>,
    /// Dump records in discovery order
    pub dump: Vec<DumpRecord>,
}
