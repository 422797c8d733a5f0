/*!
 * Single-file overwrite used by the `modify` command
 */

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::ensure;
use crate::error::{ProjtreeError, Result};

/// Replace the whole content of an existing file
pub fn overwrite(path: &Path, content: &str) -> Result<()> {
    ensure!(path.is_file(), PathNotFound, "File not found: {}", path.display());

    fs::write(path, content).map_err(|source| ProjtreeError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Overwrote {} with {} bytes", path.display(), content.len());
    Ok(())
}
