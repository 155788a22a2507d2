use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::flatten::executor::FrameTable;

/// Writes frame rows to one JSON Lines file per frame in a directory.
pub struct FrameWriter {
    directory: PathBuf,
    writers: HashMap<String, File>,
}

impl FrameWriter {
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        std::fs::create_dir_all(&directory).context("Failed to create output directory")?;
        Ok(FrameWriter {
            directory: directory.as_ref().to_path_buf(),
            writers: HashMap::new(),
        })
    }

    pub fn write_tables(&mut self, tables: &[FrameTable]) -> Result<()> {
        for table in tables {
            self.write_table(table)?;
        }
        Ok(())
    }

    /// Append a table's rows to `<name>.jsonl`, one JSON object per line.
    pub fn write_table(&mut self, table: &FrameTable) -> Result<()> {
        let writer = match self.writers.entry(table.name.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self.directory.join(format!("{}.jsonl", table.name));
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("Failed to open file: {}", path.display()))?;
                entry.insert(file)
            }
        };

        for row in &table.rows {
            let line = serde_json::to_string(row).context("Failed to serialize row")?;
            writeln!(writer, "{}", line).context("Failed to write row")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush().context("Failed to flush writer")?;
        }
        Ok(())
    }
}

/// A simpler writer that streams every frame to a single output, tagging each
/// row with a `_frame` metadata column.
pub struct SingleWriter<W: Write> {
    writer: W,
}

impl<W: Write> SingleWriter<W> {
    pub fn new(writer: W) -> Self {
        SingleWriter { writer }
    }

    pub fn write_tables(&mut self, tables: &[FrameTable]) -> Result<()> {
        for table in tables {
            self.write_table(table)?;
        }
        Ok(())
    }

    pub fn write_table(&mut self, table: &FrameTable) -> Result<()> {
        for row in &table.rows {
            let mut tagged = row.clone();
            tagged.insert(
                "_frame".to_string(),
                serde_json::Value::String(table.name.clone()),
            );
            let line = serde_json::to_string(&tagged).context("Failed to serialize row")?;
            writeln!(self.writer, "{}", line).context("Failed to write row")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(name: &str, rows: serde_json::Value) -> FrameTable {
        FrameTable {
            name: name.to_string(),
            rows: serde_json::from_value(rows).unwrap(),
        }
    }

    #[test]
    fn test_single_writer_tags_rows_with_frame() {
        let mut buffer = Vec::new();
        let mut writer = SingleWriter::new(&mut buffer);

        writer
            .write_tables(&[
                table("launches", json!([{"mission_name": "FalconSat"}])),
                table("ships", json!([{"name": "GO Quest"}])),
            ])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(lines[0]).unwrap(),
            json!({"mission_name": "FalconSat", "_frame": "launches"})
        );
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(lines[1]).unwrap(),
            json!({"name": "GO Quest", "_frame": "ships"})
        );
    }

    #[test]
    fn test_frame_writer_one_file_per_frame() {
        let dir = std::env::temp_dir().join(format!("quarry-writer-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut writer = FrameWriter::new(&dir).unwrap();
        writer
            .write_tables(&[
                table("launches", json!([{"id": 1}, {"id": 2}])),
                table("ships", json!([{"id": 3}])),
            ])
            .unwrap();
        writer.flush().unwrap();

        let launches = std::fs::read_to_string(dir.join("launches.jsonl")).unwrap();
        assert_eq!(launches.lines().count(), 2);
        let ships = std::fs::read_to_string(dir.join("ships.jsonl")).unwrap();
        assert_eq!(ships.lines().count(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
