/*!
 * Directory and file scanning functionality
 *
 * A scan is one depth-first pass. Each directory is listed, filtered through
 * the ignore rules with root-relative paths, its files are classified and
 * tokenized (in parallel, order preserved), and then its subdirectories are
 * scanned recursively. Every level returns its own totals, largest-file
 * candidates and dump records, which the parent folds into its own.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classify::{mime_type, FileClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::filter::IgnoreMatcher;
use crate::tokenizer::Tokenizer;
use crate::types::{DirectoryNode, DumpRecord, FileNode, LargeFile, ScanResult};
use crate::utils::{absolute_output_path, format_file_size};

/// What a scan has to compute besides the bare tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Count tokens of eligible files
    pub count_tokens: bool,
    /// Keep the text of eligible files on their nodes
    pub keep_content: bool,
    /// Number of largest files to track, 0 disables tracking
    pub largest: usize,
    /// Collect dump records for eligible files
    pub collect_dump: bool,
    /// Literal text to look for in eligible files
    pub pattern: Option<String>,
}

impl ScanOptions {
    /// Options for a plain structure listing
    pub fn structure() -> Self {
        Self::default()
    }

    /// Options for a content search, matching while files are read
    pub fn search(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Whether token counts must be computed
    pub fn needs_tokens(&self) -> bool {
        self.count_tokens || self.largest > 0
    }

    /// Whether files have to be classified and read
    pub fn needs_content(&self) -> bool {
        self.needs_tokens() || self.keep_content || self.collect_dump || self.pattern.is_some()
    }
}

/// Result of scanning one directory, folded into its parent
struct DirectoryScan {
    node: DirectoryNode,
    large_candidates: Vec<LargeFile>,
    dump: Vec<DumpRecord>,
}

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Ignore rules of the scan root
    matcher: IgnoreMatcher,
    /// Eligibility policy
    classifier: FileClassifier,
    /// Tokenizer, required when token counts are requested
    tokenizer: Option<Box<dyn Tokenizer>>,
    /// Absolute path of the dump target, never scanned itself
    output_file: Option<PathBuf>,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, matcher: IgnoreMatcher, progress: Arc<ProgressBar>) -> Self {
        let output_file = config.dump_file.as_deref().and_then(absolute_output_path);
        Self {
            config,
            matcher,
            classifier: FileClassifier::default(),
            tokenizer: None,
            output_file,
            progress,
        }
    }

    /// Use this tokenizer for token counts
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Use a different eligibility policy
    pub fn with_classifier(mut self, classifier: FileClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Scan the target directory and return the tree with its aggregates
    ///
    /// The progress bar is cleared before returning, whether the scan
    /// succeeded or not.
    pub fn scan(&self, options: &ScanOptions) -> Result<ScanResult> {
        let result = self.run_scan(options);
        self.progress.finish_and_clear();
        result
    }

    fn run_scan(&self, options: &ScanOptions) -> Result<ScanResult> {
        crate::ensure!(
            !options.needs_tokens() || self.tokenizer.is_some(),
            Config,
            "token counting requested without a tokenizer"
        );

        let abs_path = fs::canonicalize(&self.config.target_dir)?;
        let dir_name = abs_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| abs_path.display().to_string());

        debug!(
            "Scanning {} with {} ignore rules",
            abs_path.display(),
            self.matcher.num_rules()
        );
        if let Some(tokenizer) = self.tokenizer.as_ref().filter(|_| options.needs_tokens()) {
            let model = tokenizer.model();
            debug!("Counting tokens with {} ({})", model, model.encoding());
        }

        let scan = self.scan_directory(&abs_path, Path::new(""), dir_name, options);

        let mut largest = scan.large_candidates;
        if options.largest > 0 {
            // Stable sort keeps discovery order between equal counts
            largest.sort_by(|a, b| b.tokens.cmp(&a.tokens));
            largest.truncate(options.largest);
        } else {
            largest.clear();
        }

        Ok(ScanResult {
            total_tokens: scan.node.total_tokens,
            root: scan.node,
            largest,
            dump: scan.dump,
        })
    }

    /// Scan a directory and return its node with everything collected beneath it
    fn scan_directory(
        &self,
        abs_path: &Path,
        rel_path: &Path,
        name: String,
        options: &ScanOptions,
    ) -> DirectoryScan {
        let mut node = DirectoryNode {
            name,
            path: rel_path.to_path_buf(),
            ..DirectoryNode::default()
        };
        let mut large_candidates = Vec::new();
        let mut dump = Vec::new();

        let entries = match self.list_directory(abs_path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list directory {}: {}", abs_path.display(), e);
                node.inaccessible = true;
                return DirectoryScan {
                    node,
                    large_candidates,
                    dump,
                };
            }
        };

        // Split into directories and files, dropping excluded entries
        let (dirs, files): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| entry.file_type().is_dir());
        let dirs: Vec<_> = dirs
            .into_iter()
            .filter(|entry| !self.is_excluded(entry, rel_path, true))
            .collect();
        let files: Vec<_> = files
            .into_iter()
            .filter(|entry| !self.is_excluded(entry, rel_path, false))
            .filter(|entry| self.output_file.as_deref() != Some(entry.path()))
            .collect();

        // Process files in parallel
        let mut file_nodes: Vec<FileNode> = files
            .par_iter()
            .map(|entry| self.process_file(entry, rel_path, options))
            .collect();

        for file in file_nodes.iter_mut().filter(|file| file.is_eligible()) {
            if let Some(tokens) = file.tokens {
                node.total_tokens += tokens;
                if options.largest > 0 {
                    large_candidates.push(LargeFile {
                        path: file.path.clone(),
                        tokens,
                    });
                }
            }

            if options.collect_dump {
                let contents = if options.keep_content {
                    file.content.clone()
                } else {
                    file.content.take()
                };
                if let Some(contents) = contents {
                    dump.push(DumpRecord {
                        path: file.abs_path.to_string_lossy().to_string(),
                        contents,
                        mime_type: file.mime.clone(),
                    });
                }
            }
        }
        node.files = file_nodes;

        // Recurse into subdirectories, folding their results into ours
        for entry in dirs {
            let entry_name = entry.file_name().to_string_lossy().to_string();
            let new_rel_path = rel_path.join(&entry_name);

            let sub = self.scan_directory(entry.path(), &new_rel_path, entry_name, options);
            node.total_tokens += sub.node.total_tokens;
            large_candidates.extend(sub.large_candidates);
            dump.extend(sub.dump);
            node.dirs.push(sub.node);
        }

        DirectoryScan {
            node,
            large_candidates,
            dump,
        }
    }

    /// List the immediate children of a directory, sorted by name
    fn list_directory(&self, abs_path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(abs_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => entries.push(entry),
                // Failing to open the directory itself is fatal for this subtree
                Err(e) if e.path() == Some(abs_path) => return Err(e.into()),
                Err(e) => warn!("Skipping entry in {}: {}", abs_path.display(), e),
            }
        }

        Ok(entries)
    }

    /// Check an entry against the ignore rules, relative to the scan root
    fn is_excluded(&self, entry: &DirEntry, parent_rel: &Path, is_dir: bool) -> bool {
        let rel_path = parent_rel.join(entry.file_name());
        let excluded = self.matcher.is_excluded(&rel_path, is_dir);
        if excluded {
            debug!("Ignoring {}", rel_path.display());
        }
        excluded
    }

    /// Process a single file and return its node representation
    fn process_file(&self, entry: &DirEntry, parent_rel: &Path, options: &ScanOptions) -> FileNode {
        self.progress.inc(1);

        let abs_path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        let rel_path = parent_rel.join(&file_name);
        self.progress
            .set_message(format!("Current file: {}", rel_path.display()));

        if !options.needs_content() {
            return FileNode {
                mime: mime_type(abs_path, None),
                name: file_name,
                path: rel_path,
                abs_path: abs_path.to_path_buf(),
                kind: None,
                tokens: None,
                matched: false,
                content: None,
            };
        }

        let classified = self.classifier.classify(abs_path);
        debug!(
            "{} is {:?} ({})",
            rel_path.display(),
            classified.kind,
            format_file_size(classified.size)
        );
        let tokens = match (&classified.content, &self.tokenizer) {
            (Some(content), Some(tokenizer)) if options.needs_tokens() => {
                Some(tokenizer.count_tokens(content))
            }
            _ => None,
        };
        let matched = match (&options.pattern, &classified.content) {
            (Some(pattern), Some(content)) => content.contains(pattern.as_str()),
            _ => false,
        };
        let content = if options.keep_content || options.collect_dump {
            classified.content
        } else {
            None
        };

        FileNode {
            mime: mime_type(abs_path, Some(classified.kind)),
            name: file_name,
            path: rel_path,
            abs_path: abs_path.to_path_buf(),
            kind: Some(classified.kind),
            tokens,
            matched,
            content,
        }
    }
}
