use serde::{Deserialize, Serialize};

use super::record::{Column, Projection, RateRecord};

// ---------------------------------------------------------------------------
// QueryResult — Engine output
// ---------------------------------------------------------------------------

/// One page of filtered, projected and sorted rows plus paging metadata.
///
/// Records keep all of their fields; `projection` says which columns are
/// part of the result and is honored by every formatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub records: Vec<RateRecord>,
    pub projection: Projection,
    pub total_records: usize,
    pub current_page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl QueryResult {
    /// Columns present in this result, `date_time` first.
    pub fn columns(&self) -> &'static [Column] {
        self.projection.columns()
    }

    /// Value of a projected numeric column for the row at `index`.
    ///
    /// Returns `None` for projected-away columns, absent values and
    /// out-of-range rows.
    pub fn value(&self, index: usize, column: Column) -> Option<f64> {
        if !self.projection.contains(column) {
            return None;
        }
        self.records.get(index).and_then(|r| r.value(column))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TabularRecord / TablePage — List-of-records form
// ---------------------------------------------------------------------------

/// A row rendered for table display.
///
/// Projected-away columns are `None` and omitted when serialized; absent
/// values of kept columns are rendered as `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularRecord {
    pub date_time: String,
    #[serde(rename = "EURbuy", default, skip_serializing_if = "Option::is_none")]
    pub eur_buy: Option<f64>,
    #[serde(rename = "EURsell", default, skip_serializing_if = "Option::is_none")]
    pub eur_sell: Option<f64>,
    #[serde(rename = "USDbuy", default, skip_serializing_if = "Option::is_none")]
    pub usd_buy: Option<f64>,
    #[serde(rename = "USDsell", default, skip_serializing_if = "Option::is_none")]
    pub usd_sell: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    pub records: Vec<TabularRecord>,
    pub total_records: usize,
    pub current_page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

// ---------------------------------------------------------------------------
// RateSeries — Chart form
// ---------------------------------------------------------------------------

/// Result rows transposed into index-aligned column sequences.
///
/// Only projected columns carry a sequence. Absent values stay `None` so a
/// chart can leave a gap instead of plotting zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    pub date_time: Vec<String>,
    #[serde(rename = "EURbuy", default, skip_serializing_if = "Option::is_none")]
    pub eur_buy: Option<Vec<Option<f64>>>,
    #[serde(rename = "EURsell", default, skip_serializing_if = "Option::is_none")]
    pub eur_sell: Option<Vec<Option<f64>>>,
    #[serde(rename = "USDbuy", default, skip_serializing_if = "Option::is_none")]
    pub usd_buy: Option<Vec<Option<f64>>>,
    #[serde(rename = "USDsell", default, skip_serializing_if = "Option::is_none")]
    pub usd_sell: Option<Vec<Option<f64>>>,
}

impl RateSeries {
    /// The sequence for a numeric column, if it is part of the series.
    pub fn column(&self, column: Column) -> Option<&[Option<f64>]> {
        match column {
            Column::DateTime => None,
            Column::EurBuy => self.eur_buy.as_deref(),
            Column::EurSell => self.eur_sell.as_deref(),
            Column::UsdBuy => self.usd_buy.as_deref(),
            Column::UsdSell => self.usd_sell.as_deref(),
        }
    }

    pub(crate) fn column_mut(&mut self, column: Column) -> Option<&mut Option<Vec<Option<f64>>>> {
        match column {
            Column::DateTime => None,
            Column::EurBuy => Some(&mut self.eur_buy),
            Column::EurSell => Some(&mut self.eur_sell),
            Column::UsdBuy => Some(&mut self.usd_buy),
            Column::UsdSell => Some(&mut self.usd_sell),
        }
    }

    /// Number of rows (length of every sequence).
    pub fn len(&self) -> usize {
        self.date_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.date_time.is_empty()
    }
}
