//! Chaining builder for [`QueryParams`].
//!
//! Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rate_history::{Currency, QueryBuilder, SortOrder};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let params = QueryBuilder::new()
//!     .start_date(start)
//!     .currency(Currency::Usd)
//!     .sort_by("USDbuy", SortOrder::Desc)
//!     .page(2)
//!     .per_page(25)
//!     .build();
//!
//! assert_eq!(params.page.page, 2);
//! assert_eq!(params.sort.sort_by.as_deref(), Some("USDbuy"));
//! ```

use chrono::NaiveDateTime;

use crate::models::{Currency, QueryParams, SortOrder};

/// Builds [`QueryParams`] step by step. Unset parts keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: QueryParams,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower timestamp bound.
    pub fn start_date(&mut self, ts: NaiveDateTime) -> &mut Self {
        self.params.filter.start_date = Some(ts);
        self
    }

    /// Inclusive upper timestamp bound.
    pub fn end_date(&mut self, ts: NaiveDateTime) -> &mut Self {
        self.params.filter.end_date = Some(ts);
        self
    }

    /// Both timestamp bounds at once.
    pub fn date_range(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> &mut Self {
        self.start_date(start).end_date(end)
    }

    /// Keep only the columns of one currency.
    pub fn currency(&mut self, currency: Currency) -> &mut Self {
        self.params.filter.currency = Some(currency);
        self
    }

    pub fn min_value(&mut self, value: f64) -> &mut Self {
        self.params.filter.min_value = Some(value);
        self
    }

    pub fn max_value(&mut self, value: f64) -> &mut Self {
        self.params.filter.max_value = Some(value);
        self
    }

    /// Sort by a column header name (e.g. `"EURbuy"`).
    pub fn sort_by(&mut self, column: &str, order: SortOrder) -> &mut Self {
        self.params.sort.sort_by = Some(column.to_string());
        self.params.sort.order = order;
        self
    }

    /// 1-based page number.
    pub fn page(&mut self, page: usize) -> &mut Self {
        self.params.page.page = page;
        self
    }

    pub fn per_page(&mut self, per_page: usize) -> &mut Self {
        self.params.page.per_page = per_page;
        self
    }

    /// Return the finished parameters.
    pub fn build(&self) -> QueryParams {
        self.params.clone()
    }
}
