//! Filter, projection, sort and pagination over a dataset snapshot.
//!
//! Every function here is pure: the input slice is only read, and the same
//! inputs always produce the same output. Steps run in a fixed order because
//! currency projection decides which columns the value bounds apply to:
//!
//! 1. date range
//! 2. currency projection
//! 3. value bounds over every projected numeric column
//! 4. stable sort
//! 5. page slice
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rate_history::engine::run_query;
//! use rate_history::{Currency, QueryBuilder, RateRecord};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let rows = vec![
//!     RateRecord::new(day(1), 4.0, 4.2, 3.9, 4.0),
//!     RateRecord::new(day(2), 5.0, 5.2, 4.9, 5.0),
//! ];
//!
//! let params = QueryBuilder::new()
//!     .currency(Currency::Eur)
//!     .min_value(4.5)
//!     .build();
//! let result = run_query(&rows, &params).unwrap();
//! assert_eq!(result.total_records, 1);
//! assert_eq!(result.records[0].timestamp, day(2));
//! ```

use std::cmp::Ordering;

use crate::error::{RateError, Result};
use crate::models::{
    Column, FilterSpec, PageSpec, Projection, QueryParams, QueryResult, RateRecord, SortOrder,
    SortSpec,
};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Filtered and sorted rows before pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub rows: Vec<RateRecord>,
    pub projection: Projection,
}

impl Selection {
    /// Cut one page out of the selection.
    ///
    /// Pages are 1-based. A page past the end, or page 0, yields no rows but
    /// keeps the totals.
    pub fn paginate(self, page: PageSpec) -> Result<QueryResult> {
        if page.per_page == 0 {
            return Err(RateError::InvalidFilter(
                "per_page must be at least 1".to_string(),
            ));
        }

        let total_records = self.rows.len();
        let total_pages = total_records.div_ceil(page.per_page);
        let start = page
            .page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(page.per_page));

        let records = match start {
            Some(start) if start < total_records => self
                .rows
                .into_iter()
                .skip(start)
                .take(page.per_page)
                .collect(),
            _ => Vec::new(),
        };

        Ok(QueryResult {
            records,
            projection: self.projection,
            total_records,
            current_page: page.page,
            per_page: page.per_page,
            total_pages,
        })
    }

    /// Wrap the whole selection as a single page.
    pub fn into_result(self) -> QueryResult {
        let total_records = self.rows.len();
        QueryResult {
            records: self.rows,
            projection: self.projection,
            total_records,
            current_page: 1,
            per_page: total_records,
            total_pages: usize::from(total_records > 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run a full query: filter, project, sort, then paginate.
///
/// Fails with [`RateError::DataUnavailable`] when `dataset` is empty,
/// [`RateError::NoMatch`] when nothing survives the filters, and
/// [`RateError::InvalidFilter`] for unusable bounds or `per_page == 0`.
pub fn run_query(dataset: &[RateRecord], params: &QueryParams) -> Result<QueryResult> {
    if params.page.per_page == 0 {
        return Err(RateError::InvalidFilter(
            "per_page must be at least 1".to_string(),
        ));
    }
    let selection = filter_and_sort(dataset, &params.filter, &params.sort)?;
    let result = selection.paginate(params.page)?;
    tracing::debug!(
        "Query matched {} records, returning {} (page {}/{})",
        result.total_records,
        result.records.len(),
        result.current_page,
        result.total_pages
    );
    Ok(result)
}

/// Apply filters, projection and sorting without paginating.
pub fn filter_and_sort(
    dataset: &[RateRecord],
    filter: &FilterSpec,
    sort: &SortSpec,
) -> Result<Selection> {
    if dataset.is_empty() {
        return Err(RateError::DataUnavailable("dataset is empty".to_string()));
    }
    check_bounds(filter)?;

    let projection = Projection::from(filter.currency);
    let mut rows: Vec<RateRecord> = dataset
        .iter()
        .filter(|r| in_date_range(r, filter))
        .filter(|r| within_value_bounds(r, projection, filter.min_value, filter.max_value))
        .cloned()
        .collect();

    if rows.is_empty() {
        return Err(RateError::NoMatch);
    }

    match resolve_sort_column(sort, projection) {
        Some(column) => sort_rows(&mut rows, column, sort.order),
        None => {
            if let Some(name) = &sort.sort_by {
                tracing::debug!("Sort column '{}' not in result; keeping order", name);
            }
        }
    }

    Ok(Selection { rows, projection })
}

/// Stable sort of `rows` on `column`.
///
/// Ties keep their relative order in both directions. Absent values sort
/// after present ones regardless of direction.
pub fn sort_rows(rows: &mut [RateRecord], column: Column, order: SortOrder) {
    rows.sort_by(|a, b| compare(a, b, column, order));
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn check_bounds(filter: &FilterSpec) -> Result<()> {
    for (name, bound) in [("min_value", filter.min_value), ("max_value", filter.max_value)] {
        if bound.is_some_and(|b| b.is_nan()) {
            return Err(RateError::InvalidFilter(format!("{} is NaN", name)));
        }
    }
    Ok(())
}

fn in_date_range(record: &RateRecord, filter: &FilterSpec) -> bool {
    filter.start_date.map_or(true, |start| record.timestamp >= start)
        && filter.end_date.map_or(true, |end| record.timestamp <= end)
}

/// Conjunctive bound check: every projected numeric column must satisfy
/// both bounds, so one out-of-range column drops the whole row. Absent
/// values never satisfy a bound.
fn within_value_bounds(
    record: &RateRecord,
    projection: Projection,
    min: Option<f64>,
    max: Option<f64>,
) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    projection.numeric_columns().iter().all(|&column| {
        record.value(column).is_some_and(|v| {
            min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
        })
    })
}

fn resolve_sort_column(sort: &SortSpec, projection: Projection) -> Option<Column> {
    sort.sort_by
        .as_deref()
        .and_then(Column::from_header)
        .filter(|c| projection.contains(*c))
}

fn compare(a: &RateRecord, b: &RateRecord, column: Column, order: SortOrder) -> Ordering {
    if !column.is_numeric() {
        return order.apply(a.timestamp.cmp(&b.timestamp));
    }
    match (a.value(column), b.value(column)) {
        (Some(x), Some(y)) => order.apply(x.total_cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
