/*!
 * JSON dump writer for projtree
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::debug;

use crate::error::Result;
use crate::types::DumpRecord;

/// Writes dump records as one JSON array indented with four spaces
pub struct JsonWriter {
    output_file: PathBuf,
}

impl JsonWriter {
    /// Create a new JSON writer
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }

    /// Target file of this writer
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Write the records and return how many were written
    pub fn write(&self, records: &[DumpRecord]) -> Result<usize> {
        let file = File::create(&self.output_file)?;
        let writer = BufWriter::new(file);

        let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut serializer)?;

        let mut writer = serializer.into_inner();
        writer.flush()?;

        debug!(
            "Wrote {} dump records to {}",
            records.len(),
            self.output_file.display()
        );
        Ok(records.len())
    }
}
