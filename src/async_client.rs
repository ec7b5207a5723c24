//! Async wrapper around [`RateHistory`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//! File reads and writes are blocking, so they must not run on the
//! event loop itself.
//!
//! # Example
//!
//! ```no_run
//! use rate_history::{AsyncRateHistory, QueryParams};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let history = AsyncRateHistory::builder().data_dir("./data").build().await.unwrap();
//!
//!     // Run any sync method via closure
//!     let count = history.run(|h| h.rates().count()).await.unwrap();
//!
//!     // Convenience method for a paginated query
//!     let result = history.search(QueryParams::default()).await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{RateError, Result};
use crate::models::{NewRecord, QueryParams, QueryResult, RateRecord};
use crate::{Access, RateHistory};

// ---------------------------------------------------------------------------
// AsyncRateHistoryBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncRateHistory`] instance.
#[derive(Debug, Default)]
pub struct AsyncRateHistoryBuilder {
    data_dir: Option<PathBuf>,
    data_file: Option<PathBuf>,
    backup_file: Option<PathBuf>,
}

impl AsyncRateHistoryBuilder {
    /// Set the directory holding the data and backup files.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an explicit data file.
    pub fn data_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an explicit backup file.
    pub fn backup_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.backup_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the async history.
    ///
    /// Initialization runs on the blocking thread pool so it won't block
    /// the async event loop.
    pub async fn build(self) -> Result<AsyncRateHistory> {
        tokio::task::spawn_blocking(move || {
            let mut builder = RateHistory::builder();
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if let Some(file) = self.data_file {
                builder = builder.data_file(file);
            }
            if let Some(file) = self.backup_file {
                builder = builder.backup_file(file);
            }
            let history = builder.build()?;
            Ok(AsyncRateHistory {
                inner: Arc::new(history),
            })
        })
        .await
        .map_err(|e| RateError::Runtime(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncRateHistory
// ---------------------------------------------------------------------------

/// Async wrapper around [`RateHistory`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. [`RateHistory`] synchronizes its own
/// writes, so the wrapper shares it through an [`Arc`] without an extra lock.
#[derive(Clone)]
pub struct AsyncRateHistory {
    inner: Arc<RateHistory>,
}

impl AsyncRateHistory {
    /// Create a new builder for configuring the async history.
    pub fn builder() -> AsyncRateHistoryBuilder {
        AsyncRateHistoryBuilder::default()
    }

    /// Wrap an already-built [`RateHistory`].
    pub fn from_history(history: RateHistory) -> Self {
        Self {
            inner: Arc::new(history),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    ///
    /// The closure receives a `&RateHistory` reference and should return
    /// a `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&RateHistory) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let history = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&history))
            .await
            .map_err(|e| RateError::Runtime(format!("Task join error: {e}")))?
    }

    /// Run a paginated query asynchronously.
    pub async fn search(&self, params: QueryParams) -> Result<QueryResult> {
        self.run(move |h| h.rates().search(&params)).await
    }

    /// The `n` most recent records asynchronously.
    pub async fn history(&self, n: usize) -> Result<Vec<RateRecord>> {
        self.run(move |h| h.rates().history(n)).await
    }

    /// Append a record asynchronously.
    pub async fn append(&self, record: NewRecord, access: Access) -> Result<RateRecord> {
        self.run(move |h| h.append(&record, access)).await
    }

    /// Undo the last append asynchronously.
    pub async fn undo(&self, access: Access) -> Result<()> {
        self.run(move |h| h.undo(access)).await
    }
}
