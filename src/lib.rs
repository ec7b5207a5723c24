//! Exchange rate history for Rust.
//!
//! Keeps a table of timestamped EUR/USD buy and sell rates in a CSV file,
//! and answers filtered, sorted and paginated queries over it in memory.
//! Appends are snapshotted first so the last change can be undone.
//!
//! # Quick start
//!
//! ```no_run
//! use rate_history::{Access, Currency, NewRecord, QueryBuilder, RateHistory};
//!
//! let history = RateHistory::builder().data_dir("./data").build().unwrap();
//!
//! // Add a record (admin only)
//! let record = NewRecord::new("2024-01-02 12:00:00", 4.31, 4.40, 3.95, 4.02);
//! history.append(&record, Access::Admin).unwrap();
//!
//! // Query EUR rates above 4.3, highest first
//! let params = QueryBuilder::new()
//!     .currency(Currency::Eur)
//!     .min_value(4.3)
//!     .sort_by("EURbuy", rate_history::SortOrder::Desc)
//!     .build();
//! let page = history.rates().table(&params).unwrap();
//!
//! // Undo the append
//! history.undo(Access::Admin).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod models;
pub mod queries;
pub mod query_builder;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncRateHistory;
pub use error::{RateError, Result};
pub use models::{
    Column, Currency, FilterSpec, NewRecord, PageSpec, Projection, QueryParams, QueryResult,
    RateRecord, RateSeries, SortOrder, SortSpec, TablePage, TabularRecord,
};
pub use query_builder::QueryBuilder;
pub use store::{Dataset, RecordStore};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Caller privilege, as decided by an external authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Admin,
    Anonymous,
}

impl Access {
    pub fn is_admin(self) -> bool {
        self == Access::Admin
    }
}

impl From<bool> for Access {
    fn from(authorized: bool) -> Self {
        if authorized {
            Access::Admin
        } else {
            Access::Anonymous
        }
    }
}

// ---------------------------------------------------------------------------
// RateHistoryBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`RateHistory`] instance.
///
/// Use [`RateHistory::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](RateHistoryBuilder::build) to create it.
#[derive(Debug, Default)]
pub struct RateHistoryBuilder {
    data_dir: Option<PathBuf>,
    data_file: Option<PathBuf>,
    backup_file: Option<PathBuf>,
}

impl RateHistoryBuilder {
    /// Set the directory holding the data and backup files.
    ///
    /// If not set, the platform data directory is used (e.g.
    /// `~/.local/share/rate-history` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an explicit data file instead of `history.csv` in the data directory.
    pub fn data_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an explicit backup file instead of `history_backup.csv` in the
    /// data directory.
    pub fn backup_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.backup_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the history, creating the data directory if needed.
    ///
    /// The data file itself is not read until the first query.
    pub fn build(self) -> Result<RateHistory> {
        let dir = self.data_dir.unwrap_or_else(config::default_data_dir);
        fs::create_dir_all(&dir)?;
        let data_file = self.data_file.unwrap_or_else(|| dir.join(config::DATA_FILE));
        let backup_file = self
            .backup_file
            .unwrap_or_else(|| dir.join(config::BACKUP_FILE));
        Ok(RateHistory {
            store: RecordStore::new(data_file, backup_file),
        })
    }
}

// ---------------------------------------------------------------------------
// RateHistory
// ---------------------------------------------------------------------------

/// The main entry point: a record store plus the query interface over it.
///
/// Created via [`RateHistory::builder()`]. Safe to share across threads;
/// mutations are serialized inside the store.
pub struct RateHistory {
    store: RecordStore,
}

impl RateHistory {
    /// Create a new builder for configuring the history.
    pub fn builder() -> RateHistoryBuilder {
        RateHistoryBuilder::default()
    }

    /// Wrap an existing store.
    pub fn from_store(store: RecordStore) -> Self {
        Self { store }
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the rate query interface.
    pub fn rates(&self) -> queries::RateQuery<'_> {
        queries::RateQuery::new(&self.store)
    }

    // -- Mutations ---------------------------------------------------------

    /// Validate and append a record, snapshotting the data file first.
    ///
    /// Requires [`Access::Admin`]. On any failure the store is unchanged.
    pub fn append(&self, record: &NewRecord, access: Access) -> Result<RateRecord> {
        if !access.is_admin() {
            tracing::warn!("Rejected append from unauthorized caller");
            return Err(RateError::Unauthorized);
        }
        let record = record.validate()?;
        self.store.append(record.clone())?;
        Ok(record)
    }

    /// Restore the data file from the last snapshot.
    ///
    /// Requires [`Access::Admin`].
    pub fn undo(&self, access: Access) -> Result<()> {
        if !access.is_admin() {
            tracing::warn!("Rejected undo from unauthorized caller");
            return Err(RateError::Unauthorized);
        }
        self.store.restore_snapshot()?;
        Ok(())
    }

    /// Re-read the data file, picking up changes made outside this process.
    pub fn reload(&self) -> Result<()> {
        self.store.reload()?;
        Ok(())
    }

    /// Return a reference to the underlying [`RecordStore`].
    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for RateHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RateHistory(data_file={}, backup_file={}, snapshot={})",
            self.store.data_file().display(),
            self.store.backup_file().display(),
            self.store.has_snapshot()
        )
    }
}
