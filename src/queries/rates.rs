//! Read-only queries over the stored rate history.

use std::io::Write;

use crate::config;
use crate::engine;
use crate::error::{RateError, Result};
use crate::format;
use crate::models::{
    FilterSpec, QueryParams, QueryResult, RateRecord, RateSeries, SortSpec, TablePage,
};
use crate::store::RecordStore;

// ---------------------------------------------------------------------------
// RateQuery
// ---------------------------------------------------------------------------

/// Query interface borrowing the [`RecordStore`].
///
/// Each call takes one consistent dataset snapshot and never mutates it.
pub struct RateQuery<'a> {
    store: &'a RecordStore,
}

impl<'a> RateQuery<'a> {
    /// Create a new `RateQuery` bound to the given store.
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    // -- Filtered queries --------------------------------------------------

    /// Run a filtered, sorted and paginated query.
    pub fn search(&self, params: &QueryParams) -> Result<QueryResult> {
        let dataset = self.store.load()?;
        engine::run_query(dataset.records(), params)
    }

    /// Run a query and render the page as table rows with paging metadata.
    pub fn table(&self, params: &QueryParams) -> Result<TablePage> {
        let result = self.search(params)?;
        let page = format::format_table_page(&result);
        tracing::info!("Filtered data returned: {} records", page.records.len());
        Ok(page)
    }

    /// All matching rows, unpaginated, transposed for charting.
    pub fn chart(&self, filter: &FilterSpec, sort: &SortSpec) -> Result<RateSeries> {
        let dataset = self.store.load()?;
        let result = engine::filter_and_sort(dataset.records(), filter, sort)?.into_result();
        tracing::info!(
            "Generated chart data for range: {:?} - {:?}",
            filter.start_date,
            filter.end_date
        );
        Ok(format::format_series(&result))
    }

    /// Write all matching rows, unpaginated, as CSV.
    ///
    /// Returns the number of data rows written.
    pub fn export_csv<W: Write>(
        &self,
        filter: &FilterSpec,
        sort: &SortSpec,
        writer: W,
    ) -> Result<usize> {
        let dataset = self.store.load()?;
        let result = engine::filter_and_sort(dataset.records(), filter, sort)?.into_result();
        let written = format::write_csv(&result, writer)?;
        tracing::info!("Exported {} records as CSV", written);
        Ok(written)
    }

    // -- History -----------------------------------------------------------

    /// The `n` most recent records by timestamp, newest first.
    ///
    /// Records sharing a timestamp keep their insertion order.
    pub fn history(&self, n: usize) -> Result<Vec<RateRecord>> {
        let dataset = self.store.load()?;
        if dataset.is_empty() {
            return Err(RateError::DataUnavailable("dataset is empty".to_string()));
        }

        let mut rows = dataset.records().to_vec();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(n);
        Ok(rows)
    }

    /// The default-length history (the 10 most recent records).
    pub fn recent(&self) -> Result<Vec<RateRecord>> {
        self.history(config::DEFAULT_HISTORY_LEN)
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Result<Option<RateRecord>> {
        Ok(self.history(1)?.into_iter().next())
    }

    // -- Count -------------------------------------------------------------

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        Ok(self.store.load()?.len())
    }
}
