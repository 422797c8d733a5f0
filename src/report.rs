/*!
 * Reporting functionality for projtree
 *
 * Every report is a pure function of a finished scan. Tree reports print a
 * directory header, its files, its subdirectories and finally, when token
 * counts are shown, the directory's own total.
 */

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{DirectoryNode, FileNode, LargeFile};

/// Indentation added per directory level
const INDENT: &str = "    ";

/// Marker printed for directories that could not be listed
pub const INACCESSIBLE_MARKER: &str = "[Permission Denied]";

/// Which extras a tree report shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStyle {
    /// Per-file token counts and per-directory totals
    pub tokens: bool,
    /// Inline text of each eligible file
    pub content: bool,
}

impl TreeStyle {
    /// Whether the report carries file contents or metrics
    fn content_bearing(&self) -> bool {
        self.tokens || self.content
    }
}

/// Report generator for scan results
pub struct Reporter {
    style: TreeStyle,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(style: TreeStyle) -> Self {
        Self { style }
    }

    /// Write the tree report
    pub fn write_tree<W: Write>(&self, root: &DirectoryNode, writer: &mut W) -> io::Result<()> {
        self.write_directory(root, 0, writer)
    }

    /// Generate the tree report as a string
    pub fn render_tree(&self, root: &DirectoryNode) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_tree(root, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn write_directory<W: Write>(
        &self,
        dir: &DirectoryNode,
        depth: usize,
        writer: &mut W,
    ) -> io::Result<()> {
        let indent = INDENT.repeat(depth);
        let subindent = INDENT.repeat(depth + 1);

        writeln!(writer, "{}{}/", indent, dir.name)?;

        if dir.inaccessible {
            writeln!(writer, "{}{}", subindent, INACCESSIBLE_MARKER)?;
        }

        for file in &dir.files {
            self.write_file(file, &subindent, writer)?;
        }

        for sub in &dir.dirs {
            self.write_directory(sub, depth + 1, writer)?;
        }

        if self.style.tokens {
            writeln!(
                writer,
                "{}Total tokens in folder: {}",
                indent, dir.total_tokens
            )?;
        }

        Ok(())
    }

    fn write_file<W: Write>(&self, file: &FileNode, indent: &str, writer: &mut W) -> io::Result<()> {
        if !self.style.content_bearing() {
            return writeln!(writer, "{}{}", indent, file.name);
        }

        // Binary, oversized and unreadable files have nothing to report
        if !file.is_eligible() {
            return Ok(());
        }

        match file.tokens {
            Some(tokens) if self.style.tokens => {
                writeln!(writer, "{}{} - {} tokens", indent, file.name, tokens)?
            }
            _ => writeln!(writer, "{}{}", indent, file.name)?,
        }

        if self.style.content {
            if let Some(content) = &file.content {
                writeln!(writer, "{}Contents:\n{}{}", indent, indent, content)?;
            }
        }

        Ok(())
    }

    /// Render the largest files as a table
    pub fn render_largest(&self, largest: &[LargeFile], limit: usize) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Tokens")]
            tokens: usize,
        }

        let rows: Vec<FileRow> = largest
            .iter()
            .map(|file| FileRow {
                path: file.path.display().to_string(),
                tokens: file.tokens,
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        format!(
            "TOP {} LARGEST FILES BY TOKEN COUNT\n{}",
            limit, table
        )
    }
}

/// Eligible files that matched the scan's search pattern, each listed once
pub fn search_hits(root: &DirectoryNode) -> impl Iterator<Item = &FileNode> {
    root.walk_files()
        .filter(|file| file.is_eligible() && file.matched)
}

/// Write one `Found in <path>` line per hit, paths joined onto `display_root`
pub fn write_search<'a, W: Write>(
    hits: impl IntoIterator<Item = &'a FileNode>,
    display_root: &Path,
    writer: &mut W,
) -> io::Result<usize> {
    let mut count = 0;
    for file in hits {
        let display: PathBuf = display_root.join(&file.path);
        writeln!(writer, "Found in {}", display.display())?;
        count += 1;
    }
    Ok(count)
}
