//! Small helpers shared by the scanner and the CLI

use std::fs;
use std::path::{Path, PathBuf};

/// Built-in ignore rules, applied before any user rule so they can be negated
pub const DEFAULT_IGNORE: &[&str] = &[".git/", ".gitignore"];

/// Human-readable size, e.g. `2.00 KB`
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if size < 1024 {
        return format!("{} bytes", size);
    }

    let mut value = size as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Resolve an output path to an absolute one, if its parent directory exists
pub fn absolute_output_path(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|dir| dir.join(file_name))
}
