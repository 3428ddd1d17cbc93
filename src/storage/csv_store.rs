//! Append-only CSV record store.
//!
//! Plain `std::fs` against the VFS path from config, which resolves to the
//! wear-levelled FAT volume on hardware and to a normal file on the host.
//! Open-use-close discipline on every call: a deep sleep may follow any
//! append, so no handle outlives the operation and every write is flushed
//! and fsynced before return.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use log::warn;

use crate::cycle::ports::RecordStore;
use crate::error::StorageError;
use crate::reading::CSV_HEADER;

pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing or zero-length file needs the header; anything else
    /// already has it.  Partial truncation is not recoverable here and is
    /// treated as "has header" so appends keep accumulating data.
    fn needs_header(&self) -> bool {
        match fs::metadata(&self.path) {
            Ok(m) => m.len() == 0,
            Err(_) => true,
        }
    }

    fn append(&self, text: &str) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                warn!("csv: open {:?} failed: {e}", self.path);
                StorageError::OpenFailed
            })?;
        file.write_all(text.as_bytes()).map_err(|e| {
            warn!("csv: write failed: {e}");
            StorageError::WriteFailed
        })?;
        file.flush().map_err(|_| StorageError::SyncFailed)?;
        // fsync so the record survives the power-down that follows.
        file.sync_all().map_err(|_| StorageError::SyncFailed)?;
        Ok(())
    }
}

impl RecordStore for CsvStore {
    fn ensure_header(&mut self) -> Result<(), StorageError> {
        if !self.needs_header() {
            return Ok(());
        }
        let mut header = String::with_capacity(CSV_HEADER.len() + 1);
        header.push_str(CSV_HEADER);
        header.push('\n');
        self.append(&header)
    }

    fn append_line(&mut self, line: &str) -> Result<(), StorageError> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        self.append(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("paddy-csv-{}-{tag}.csv", std::process::id()));
        let _ = fs::remove_file(&p);
        p
    }

    #[test]
    fn header_written_exactly_once_across_boots() {
        let path = temp_path("header");
        {
            let mut store = CsvStore::new(&path);
            store.ensure_header().unwrap();
            store.append_line("first").unwrap();
        }
        {
            // A fresh store instance stands in for the next cold boot.
            let mut store = CsvStore::new(&path);
            store.ensure_header().unwrap();
            store.append_line("second").unwrap();
        }
        let text = fs::read_to_string(&path).unwrap();
        let headers = text.lines().filter(|l| *l == CSV_HEADER).count();
        assert_eq!(headers, 1);
        assert_eq!(text.lines().count(), 3);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn appends_preserve_order() {
        let path = temp_path("order");
        let mut store = CsvStore::new(&path);
        store.ensure_header().unwrap();
        for i in 0..5 {
            store.append_line(&format!("row-{i}")).unwrap();
        }
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "row-0");
        assert_eq!(lines[5], "row-4");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn header_skipped_when_file_has_content() {
        let path = temp_path("existing");
        fs::write(&path, "pre-existing\n").unwrap();
        let mut store = CsvStore::new(&path);
        store.ensure_header().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains(CSV_HEADER));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unreachable_path_reports_open_failed() {
        let mut store = CsvStore::new("/no-such-dir-paddy/data.csv");
        assert_eq!(store.ensure_header(), Err(StorageError::OpenFailed));
        assert_eq!(store.append_line("x"), Err(StorageError::OpenFailed));
    }
}
