//! CSV-backed record store with snapshot and restore.
//!
//! The data file is read once and kept in memory as an immutable, versioned
//! [`Dataset`]. Readers get a shared `Arc` of the current dataset; writers
//! are serialized by a mutex so that the snapshot taken before an append can
//! never interleave with another mutation. Every write goes to a temp file in
//! the same directory and is renamed into place, so an interrupted write
//! never leaves a partial file behind.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tempfile::NamedTempFile;

use crate::error::{RateError, Result};
use crate::models::{Column, RateRecord};

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// An immutable snapshot of the stored rows, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    version: u64,
    rows: Vec<RateRecord>,
}

impl Dataset {
    /// Monotonic counter bumped by every load, append and restore.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Table {
    current: Option<Arc<Dataset>>,
    version: u64,
}

/// Owns the canonical dataset and its backing files.
pub struct RecordStore {
    data_file: PathBuf,
    backup_file: PathBuf,
    table: RwLock<Table>,
    writer: Mutex<()>,
}

impl RecordStore {
    /// Create a store over `data_file`, snapshotting into `backup_file`.
    ///
    /// Nothing is read until the first [`load`](Self::load).
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(data_file: P, backup_file: Q) -> Self {
        Self {
            data_file: data_file.into(),
            backup_file: backup_file.into(),
            table: RwLock::new(Table::default()),
            writer: Mutex::new(()),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn backup_file(&self) -> &Path {
        &self.backup_file
    }

    /// Return the current dataset, reading the data file on first use.
    ///
    /// Fails with [`RateError::DataUnavailable`] if the file is missing or
    /// cannot be parsed.
    pub fn load(&self) -> Result<Arc<Dataset>> {
        if let Some(current) = self.read_table()?.current.clone() {
            return Ok(current);
        }

        let rows = read_rows(&self.data_file)?;
        let mut table = self.write_table()?;
        // Another reader may have won the race; keep its dataset.
        if let Some(current) = table.current.clone() {
            return Ok(current);
        }
        Ok(install(&mut table, rows))
    }

    /// Drop the in-memory dataset and read the data file again.
    pub fn reload(&self) -> Result<Arc<Dataset>> {
        let _writer = self.lock_writer()?;
        let rows = read_rows(&self.data_file)?;
        let mut table = self.write_table()?;
        Ok(install(&mut table, rows))
    }

    /// Snapshot the data file, then append `record` to it.
    ///
    /// The data file is re-read first, so rows written by other processes
    /// since the last load are kept. A missing or zero-length data file
    /// counts as an empty table. A data file that exists but cannot be parsed
    /// is left untouched and the call fails with
    /// [`RateError::DataUnavailable`]. The new table is staged before the
    /// snapshot is rotated, so a failed write keeps the previous snapshot.
    pub fn append(&self, record: RateRecord) -> Result<Arc<Dataset>> {
        let _writer = self.lock_writer()?;

        let mut rows = match read_rows(&self.data_file) {
            Ok(rows) => rows,
            Err(RateError::DataUnavailable(_)) if !self.data_file.exists() => Vec::new(),
            Err(e) => return Err(e),
        };

        rows.push(record);
        let staged = stage_rows(&self.data_file, &rows)?;

        self.snapshot_locked()?;
        staged
            .persist(&self.data_file)
            .map_err(|e| RateError::Io(e.error))?;

        let mut table = self.write_table()?;
        let dataset = install(&mut table, rows);
        tracing::info!(
            "Added new record to history ({} rows, version {})",
            dataset.len(),
            dataset.version()
        );
        Ok(dataset)
    }

    /// Copy the data file aside so the next [`restore_snapshot`](Self::restore_snapshot)
    /// can bring it back.
    pub fn snapshot(&self) -> Result<()> {
        let _writer = self.lock_writer()?;
        self.snapshot_locked()
    }

    /// Replace the data file with the last snapshot.
    ///
    /// The snapshot is kept, so restoring twice yields the same state. Fails
    /// with [`RateError::NoSnapshot`] when no snapshot exists.
    pub fn restore_snapshot(&self) -> Result<Arc<Dataset>> {
        let _writer = self.lock_writer()?;

        if !self.backup_file.exists() {
            return Err(RateError::NoSnapshot);
        }

        // Parse first so a corrupt snapshot never replaces good data.
        let rows = read_rows(&self.backup_file)?;
        copy_atomic(&self.backup_file, &self.data_file)?;

        let mut table = self.write_table()?;
        let dataset = install(&mut table, rows);
        tracing::info!("Backup restored ({} rows)", dataset.len());
        Ok(dataset)
    }

    /// Whether a snapshot is available to restore.
    pub fn has_snapshot(&self) -> bool {
        self.backup_file.exists()
    }

    fn snapshot_locked(&self) -> Result<()> {
        if self.data_file.exists() {
            copy_atomic(&self.data_file, &self.backup_file)?;
        } else {
            write_rows(&self.backup_file, &[])?;
        }
        tracing::info!("Backup created: {}", self.backup_file.display());
        Ok(())
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| RateError::Runtime("store writer lock poisoned".into()))
    }

    fn read_table(&self) -> Result<std::sync::RwLockReadGuard<'_, Table>> {
        self.table
            .read()
            .map_err(|_| RateError::Runtime("store table lock poisoned".into()))
    }

    fn write_table(&self) -> Result<std::sync::RwLockWriteGuard<'_, Table>> {
        self.table
            .write()
            .map_err(|_| RateError::Runtime("store table lock poisoned".into()))
    }
}

fn install(table: &mut Table, rows: Vec<RateRecord>) -> Arc<Dataset> {
    if table.current.is_some() {
        table.version += 1;
    }
    let dataset = Arc::new(Dataset {
        version: table.version,
        rows,
    });
    table.current = Some(dataset.clone());
    dataset
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

fn read_rows(path: &Path) -> Result<Vec<RateRecord>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RateError::DataUnavailable(format!(
                "data file {} does not exist",
                path.display()
            )));
        }
        Err(e) => {
            tracing::warn!("Cannot open {}: {}", path.display(), e);
            return Err(RateError::DataUnavailable(format!(
                "cannot open {}: {}",
                path.display(),
                e
            )));
        }
    };

    let unavailable = |detail: String| {
        tracing::warn!("Error loading data from {}: {}", path.display(), detail);
        RateError::DataUnavailable(format!("{}: {}", path.display(), detail))
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(|e| unavailable(e.to_string()))?;
    if headers.is_empty() {
        // Zero-length file: no header yet, no rows.
        return Ok(Vec::new());
    }
    let missing: Vec<&str> = Column::ALL
        .iter()
        .map(|c| c.header())
        .filter(|h| !headers.iter().any(|found| found == *h))
        .collect();
    if !missing.is_empty() {
        return Err(unavailable(format!(
            "missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (i, row) in reader.deserialize::<RateRecord>().enumerate() {
        let record = row.map_err(|e| unavailable(format!("row {}: {}", i + 1, e)))?;
        rows.push(record);
    }
    Ok(rows)
}

fn write_rows(path: &Path, rows: &[RateRecord]) -> Result<()> {
    stage_rows(path, rows)?
        .persist(path)
        .map_err(|e| RateError::Io(e.error))?;
    Ok(())
}

/// Write `rows` with the header to a temp file beside `path`, ready to be
/// persisted over it.
fn stage_rows(path: &Path, rows: &[RateRecord]) -> Result<NamedTempFile> {
    let mut tmp = temp_file_for(path)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(Column::ALL.iter().map(|c| c.header()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(tmp)
}

fn copy_atomic(from: &Path, to: &Path) -> Result<()> {
    let bytes = fs::read(from)?;
    let mut tmp = temp_file_for(to)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.persist(to).map_err(|e| RateError::Io(e.error))?;
    Ok(())
}

/// A temp file in the destination's directory, so the final rename stays on
/// one filesystem.
fn temp_file_for(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    Ok(NamedTempFile::new_in(dir)?)
}
