use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use carestock_inventory::ActionLogEntry;

use super::{ActionSink, SinkError};

/// Appends one JSON object per line to a file.
///
/// The file is opened per call, so external rotation is picked up. Writes
/// are serialized through a process-local lock.
#[derive(Debug)]
pub struct JsonLinesActionSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesActionSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActionSink for JsonLinesActionSink {
    fn append(&self, entry: &ActionLogEntry) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().map_err(|_| SinkError::Poisoned)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ActionLogEntry>, SinkError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str::<ActionLogEntry>(&line)?);
        }

        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::entry;
    use super::*;

    #[test]
    fn appends_and_reads_back_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonLinesActionSink::new(dir.path().join("actions.jsonl"));

        assert!(sink.recent(5).unwrap().is_empty());

        let first = entry("Supply Team", 10.0);
        let second = entry("Pharmacy", -2.0);
        sink.append(&first).unwrap();
        sink.append(&second).unwrap();

        let recent = sink.recent(5).unwrap();
        assert_eq!(recent, vec![second.clone(), first]);
        assert_eq!(sink.recent(1).unwrap(), vec![second]);

        let raw = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn corrupt_line_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();

        let sink = JsonLinesActionSink::new(path);
        assert!(matches!(sink.recent(1), Err(SinkError::Json(_))));
    }
}
