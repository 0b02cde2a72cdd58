//! Append-only tabular lead store.
//!
//! Layout: one UTF-8 CSV file with the fixed header
//! `Timestamp,Name,City,Intent,Type,Budget,Phone` and one row per lead.
//!
//! Appends from every session of this process go through a single mutex so
//! concurrent completions cannot interleave or drop rows.

use crate::error::Result;
use crate::lead::{LeadRecord, HEADER};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct LeadStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LeadStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the store with only its header row when it does not exist.
    /// Returns true if the file was created.
    pub fn ensure_initialized(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        tracing::info!(path = %self.path.display(), "created lead store");
        Ok(true)
    }

    /// Append one lead as a new row, writing the header first if the file
    /// is missing or empty.
    pub fn append(&self, record: &LeadRecord) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let len = file.metadata()?.len();
        if len > 0 && !ends_with_newline(&mut file, len)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if len == 0 {
            writer.write_record(HEADER)?;
        }
        writer.write_record(record.row())?;
        writer.flush()?;
        Ok(())
    }

    /// Read every stored lead, oldest first. A missing store is empty.
    pub fn load_all(&self) -> Result<Vec<LeadRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let mut leads: Vec<LeadRecord> = Vec::new();
        for row in reader.deserialize::<LeadRecord>() {
            leads.push(row?);
        }
        Ok(leads)
    }
}

fn ends_with_newline(file: &mut std::fs::File, len: u64) -> Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
