//! Formatter tests: table rows, chart series and CSV export.

mod common;

use common::{sample_records, ts};
use rate_history::engine::Selection;
use rate_history::format::{
    export_file_name, format_series, format_table_page, format_tabular, write_csv,
};
use rate_history::{Column, PageSpec, Projection, QueryResult, RateRecord};
use serde_json::json;

fn whole(rows: Vec<RateRecord>, projection: Projection) -> QueryResult {
    Selection { rows, projection }.into_result()
}

fn with_gap() -> Vec<RateRecord> {
    let mut rows = sample_records();
    rows[0].eur_buy = None;
    rows[1].usd_sell = None;
    rows
}

fn csv_lines(result: &QueryResult) -> Vec<String> {
    let mut buf = Vec::new();
    write_csv(result, &mut buf).unwrap();
    String::from_utf8(buf)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tabular
// ---------------------------------------------------------------------------

#[test]
fn tabular_keeps_all_columns_without_projection() {
    let rows = format_tabular(&whole(sample_records(), Projection::All));

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].date_time, "2024-01-01 09:00:00");
    assert_eq!(rows[0].eur_buy, Some(4.30));
    assert_eq!(rows[0].eur_sell, Some(4.40));
    assert_eq!(rows[0].usd_buy, Some(3.95));
    assert_eq!(rows[0].usd_sell, Some(4.05));
}

#[test]
fn tabular_renders_absent_values_as_zero() {
    let rows = format_tabular(&whole(with_gap(), Projection::All));

    assert_eq!(rows[0].eur_buy, Some(0.0));
    assert_eq!(rows[1].usd_sell, Some(0.0));
    assert_eq!(rows[2].eur_buy, Some(4.28));
}

#[test]
fn tabular_omits_projected_away_columns() {
    let rows = format_tabular(&whole(sample_records(), Projection::Eur));

    assert_eq!(rows[0].usd_buy, None);
    assert_eq!(rows[0].usd_sell, None);
    assert_eq!(
        serde_json::to_value(&rows[0]).unwrap(),
        json!({
            "date_time": "2024-01-01 09:00:00",
            "EURbuy": 4.30,
            "EURsell": 4.40
        })
    );
}

#[test]
fn table_page_carries_paging_metadata() {
    let result = Selection {
        rows: sample_records(),
        projection: Projection::Usd,
    }
    .paginate(PageSpec::new(2, 2))
    .unwrap();

    let page = format_table_page(&result);
    assert_eq!(page.total_records, 5);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.total_pages, 3);
    let dates: Vec<&str> = page.records.iter().map(|r| r.date_time.as_str()).collect();
    assert_eq!(dates, ["2024-01-03 09:00:00", "2024-01-04 09:00:00"]);
    assert!(page.records.iter().all(|r| r.eur_buy.is_none()));
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[test]
fn series_is_index_aligned() {
    let series = format_series(&whole(sample_records(), Projection::All));

    assert_eq!(series.len(), 5);
    for column in Column::NUMERIC {
        assert_eq!(series.column(column).unwrap().len(), series.len());
    }
    assert_eq!(series.date_time[4], "2024-01-05 09:00:00");
    assert_eq!(series.column(Column::UsdSell).unwrap()[4], Some(4.08));
    assert!(series.column(Column::DateTime).is_none());
}

#[test]
fn series_only_carries_projected_columns() {
    let series = format_series(&whole(sample_records(), Projection::Usd));

    assert!(series.eur_buy.is_none());
    assert!(series.eur_sell.is_none());
    assert_eq!(
        series.usd_buy.as_deref().unwrap(),
        [Some(3.95), Some(4.00), Some(3.90), Some(4.02), Some(3.98)]
    );

    let json = serde_json::to_value(&series).unwrap();
    assert!(json.get("EURbuy").is_none());
    assert!(json.get("USDsell").is_some());
}

#[test]
fn series_keeps_gaps_as_null() {
    let series = format_series(&whole(with_gap(), Projection::All));

    assert_eq!(series.column(Column::EurBuy).unwrap()[0], None);
    let json = serde_json::to_value(&series).unwrap();
    assert_eq!(json["USDsell"][1], serde_json::Value::Null);
}

#[test]
fn series_of_empty_result_is_empty() {
    let series = format_series(&whole(Vec::new(), Projection::Eur));
    assert!(series.is_empty());
    assert_eq!(series.eur_buy.as_deref(), Some(&[][..]));
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[test]
fn csv_writes_header_and_rows() {
    let lines = csv_lines(&whole(sample_records(), Projection::All));

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "date_time,EURbuy,EURsell,USDbuy,USDsell");
    assert_eq!(lines[1], "2024-01-01 09:00:00,4.3,4.4,3.95,4.05");
}

#[test]
fn csv_writes_only_projected_columns() {
    let lines = csv_lines(&whole(sample_records(), Projection::Eur));

    assert_eq!(lines[0], "date_time,EURbuy,EURsell");
    assert_eq!(lines[1], "2024-01-01 09:00:00,4.3,4.4");
}

#[test]
fn csv_leaves_absent_values_empty() {
    let lines = csv_lines(&whole(with_gap(), Projection::All));

    assert_eq!(lines[1], "2024-01-01 09:00:00,,4.4,3.95,4.05");
    assert_eq!(lines[2], "2024-01-02 09:00:00,4.35,4.45,4.0,");
}

#[test]
fn csv_returns_row_count() {
    let mut buf = Vec::new();
    let written = write_csv(&whole(sample_records(), Projection::Usd), &mut buf).unwrap();
    assert_eq!(written, 5);
}

#[test]
fn export_file_name_uses_timestamp() {
    assert_eq!(
        export_file_name(ts("2024-01-02 15:30:00")),
        "currency_data_20240102_153000.csv"
    );
}

// ---------------------------------------------------------------------------
// QueryResult helpers
// ---------------------------------------------------------------------------

#[test]
fn whole_result_is_single_page() {
    let result = whole(sample_records(), Projection::All);
    assert_eq!(result.current_page, 1);
    assert_eq!(result.per_page, 5);
    assert_eq!(result.total_pages, 1);

    let empty = whole(Vec::new(), Projection::All);
    assert_eq!(empty.total_pages, 0);
    assert!(empty.is_empty());
}

#[test]
fn result_value_respects_projection() {
    let result = whole(sample_records(), Projection::Eur);
    assert_eq!(result.value(0, Column::EurBuy), Some(4.30));
    assert_eq!(result.value(0, Column::UsdBuy), None);
    assert_eq!(result.value(99, Column::EurBuy), None);
    assert_eq!(
        result.columns(),
        [Column::DateTime, Column::EurBuy, Column::EurSell]
    );
}
