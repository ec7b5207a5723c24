//! Conversion of query results into table, chart and CSV shapes.

use std::io::Write;

use chrono::NaiveDateTime;

use crate::config;
use crate::error::Result;
use crate::models::{
    format_timestamp, Column, QueryResult, RateRecord, RateSeries, TablePage, TabularRecord,
};

/// Render each result row for table display.
///
/// Absent values of projected columns become `0`.
pub fn format_tabular(result: &QueryResult) -> Vec<TabularRecord> {
    let rendered = |record: &RateRecord, column: Column| {
        result
            .projection
            .contains(column)
            .then(|| record.value(column).unwrap_or(0.0))
    };

    result
        .records
        .iter()
        .map(|r| TabularRecord {
            date_time: format_timestamp(&r.timestamp),
            eur_buy: rendered(r, Column::EurBuy),
            eur_sell: rendered(r, Column::EurSell),
            usd_buy: rendered(r, Column::UsdBuy),
            usd_sell: rendered(r, Column::UsdSell),
        })
        .collect()
}

/// Tabular rows together with the paging metadata.
pub fn format_table_page(result: &QueryResult) -> TablePage {
    TablePage {
        records: format_tabular(result),
        total_records: result.total_records,
        current_page: result.current_page,
        per_page: result.per_page,
        total_pages: result.total_pages,
    }
}

/// Transpose result rows into one sequence per projected column.
pub fn format_series(result: &QueryResult) -> RateSeries {
    let mut series = RateSeries {
        date_time: result
            .records
            .iter()
            .map(|r| format_timestamp(&r.timestamp))
            .collect(),
        ..RateSeries::default()
    };

    for &column in result.projection.numeric_columns() {
        if let Some(slot) = series.column_mut(column) {
            *slot = Some(result.records.iter().map(|r| r.value(column)).collect());
        }
    }

    series
}

/// Write result rows as CSV with the persisted header names.
///
/// Only projected columns are written. Absent values are left empty.
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(result: &QueryResult, writer: W) -> Result<usize> {
    let mut out = csv::Writer::from_writer(writer);
    let columns = result.columns();

    out.write_record(columns.iter().map(|c| c.header()))?;
    for record in &result.records {
        out.write_record(columns.iter().map(|&c| match c {
            Column::DateTime => format_timestamp(&record.timestamp),
            _ => record
                .value(c)
                .map(|v| format!("{:?}", v))
                .unwrap_or_default(),
        }))?;
    }
    out.flush()?;

    Ok(result.records.len())
}

/// File name for an export created at `now`, e.g.
/// `currency_data_20240102_153000.csv`.
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!(
        "{}{}.csv",
        config::EXPORT_FILE_PREFIX,
        now.format(config::EXPORT_TIMESTAMP_FORMAT)
    )
}
