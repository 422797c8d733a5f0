/*!
 * Ignore-rule matching with gitignore semantics
 *
 * Rules always apply to paths relative to the scan root, never to the
 * directory currently being visited, so rules containing a slash keep
 * working for nested files.
 */

use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

use crate::error::Result;
use crate::utils::DEFAULT_IGNORE;

/// Name of the ignore file looked up at the scan root
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Decides which paths under a scan root are excluded
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    gitignore: Gitignore,
}

impl IgnoreMatcher {
    /// Load `<root>/.gitignore` plus the built-in rules
    pub fn load(root: &Path) -> Result<Self> {
        Self::builder(root).build()
    }

    /// Start a matcher for the given scan root
    pub fn builder(root: &Path) -> IgnoreMatcherBuilder {
        IgnoreMatcherBuilder {
            root: root.to_path_buf(),
            ignore_file: None,
            extra_patterns: Vec::new(),
            defaults: true,
        }
    }

    /// Check whether a root-relative path is excluded; the last matching rule wins
    pub fn is_excluded(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.gitignore.matched(rel_path, is_dir).is_ignore()
    }

    /// Number of rules loaded
    pub fn num_rules(&self) -> u64 {
        self.gitignore.num_ignores() + self.gitignore.num_whitelists()
    }
}

/// Builder collecting the rule sources of an [`IgnoreMatcher`]
#[derive(Debug, Clone)]
pub struct IgnoreMatcherBuilder {
    root: PathBuf,
    ignore_file: Option<PathBuf>,
    extra_patterns: Vec<String>,
    defaults: bool,
}

impl IgnoreMatcherBuilder {
    /// Read rules from this file instead of `<root>/.gitignore`
    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = Some(path.into());
        self
    }

    /// Append rules evaluated after the ignore file
    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Toggle the built-in `.git/` and `.gitignore` rules
    pub fn defaults(mut self, enabled: bool) -> Self {
        self.defaults = enabled;
        self
    }

    /// Parse every rule source, in priority order
    pub fn build(self) -> Result<IgnoreMatcher> {
        // `Gitignore::matched` strips a leading copy of the root from the
        // paths it is given, so a relative root must never be kept as typed
        let root = fs::canonicalize(&self.root)?;
        let mut builder = GitignoreBuilder::new(&root);

        if self.defaults {
            for pattern in DEFAULT_IGNORE {
                builder.add_line(None, pattern)?;
            }
        }

        let ignore_file = self
            .ignore_file
            .unwrap_or_else(|| root.join(IGNORE_FILE_NAME));
        if ignore_file.is_file() {
            debug!("Loading ignore rules from {}", ignore_file.display());
            // Partial errors only concern individual lines, the rest still apply
            if let Some(err) = builder.add(&ignore_file) {
                warn!("Some ignore rules in {} were skipped: {}", ignore_file.display(), err);
            }
        }

        for pattern in &self.extra_patterns {
            builder.add_line(None, pattern)?;
        }

        Ok(IgnoreMatcher {
            gitignore: builder.build()?,
        })
    }
}
