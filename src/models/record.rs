use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{RateError, Result};

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse a caller- or file-supplied timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` and a few close variants (`T` separator,
/// no seconds). A bare `YYYY-MM-DD` date means midnight of that day.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in config::TIMESTAMP_INPUT_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, config::DATE_INPUT_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a timestamp in the canonical `YYYY-MM-DD HH:MM:SS` layout.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(config::TIMESTAMP_FORMAT).to_string()
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(crate::config::TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

/// A stored rate cell. Blank, unparseable and non-finite (`NaN`, `inf`)
/// cells are all absent.
fn rate_cell<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<f64>, D::Error> {
    let cell: Option<f64> = csv::invalid_option(d)?;
    Ok(cell.filter(|v| v.is_finite()))
}

// ---------------------------------------------------------------------------
// RateRecord — One stored row
// ---------------------------------------------------------------------------

/// One timestamped row of EUR/USD buy and sell rates.
///
/// Numeric values read from storage that are blank, unparseable or non-finite
/// are kept as `None` rather than being coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    #[serde(rename = "date_time", with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "EURbuy", default, deserialize_with = "rate_cell")]
    pub eur_buy: Option<f64>,
    #[serde(rename = "EURsell", default, deserialize_with = "rate_cell")]
    pub eur_sell: Option<f64>,
    #[serde(rename = "USDbuy", default, deserialize_with = "rate_cell")]
    pub usd_buy: Option<f64>,
    #[serde(rename = "USDsell", default, deserialize_with = "rate_cell")]
    pub usd_sell: Option<f64>,
}

impl RateRecord {
    /// Create a record with all four rates present.
    pub fn new(
        timestamp: NaiveDateTime,
        eur_buy: f64,
        eur_sell: f64,
        usd_buy: f64,
        usd_sell: f64,
    ) -> Self {
        Self {
            timestamp,
            eur_buy: Some(eur_buy),
            eur_sell: Some(eur_sell),
            usd_buy: Some(usd_buy),
            usd_sell: Some(usd_sell),
        }
    }

    /// Value of a numeric column. Always `None` for [`Column::DateTime`].
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::DateTime => None,
            Column::EurBuy => self.eur_buy,
            Column::EurSell => self.eur_sell,
            Column::UsdBuy => self.usd_buy,
            Column::UsdSell => self.usd_sell,
        }
    }

    /// The timestamp in canonical string form.
    pub fn date_time(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A column of the persisted table, named by its CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "date_time")]
    DateTime,
    #[serde(rename = "EURbuy")]
    EurBuy,
    #[serde(rename = "EURsell")]
    EurSell,
    #[serde(rename = "USDbuy")]
    UsdBuy,
    #[serde(rename = "USDsell")]
    UsdSell,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::DateTime,
        Column::EurBuy,
        Column::EurSell,
        Column::UsdBuy,
        Column::UsdSell,
    ];

    pub const NUMERIC: [Column; 4] = [
        Column::EurBuy,
        Column::EurSell,
        Column::UsdBuy,
        Column::UsdSell,
    ];

    /// Header name as it appears in the data file.
    pub fn header(self) -> &'static str {
        match self {
            Column::DateTime => config::COL_DATE_TIME,
            Column::EurBuy => config::COL_EUR_BUY,
            Column::EurSell => config::COL_EUR_SELL,
            Column::UsdBuy => config::COL_USD_BUY,
            Column::UsdSell => config::COL_USD_SELL,
        }
    }

    /// Look up a column by exact header name.
    pub fn from_header(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == name)
    }

    pub fn is_numeric(self) -> bool {
        self != Column::DateTime
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Currency and Projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
}

impl Currency {
    /// Parse a currency code case-insensitively. Unknown codes yield `None`.
    pub fn parse(raw: &str) -> Option<Currency> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "EUR" => Some(Currency::Eur),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The set of columns kept after currency selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    All,
    Eur,
    Usd,
}

impl Projection {
    /// All columns retained, `date_time` first.
    pub fn columns(self) -> &'static [Column] {
        match self {
            Projection::All => &Column::ALL,
            Projection::Eur => &[Column::DateTime, Column::EurBuy, Column::EurSell],
            Projection::Usd => &[Column::DateTime, Column::UsdBuy, Column::UsdSell],
        }
    }

    /// Numeric columns retained.
    pub fn numeric_columns(self) -> &'static [Column] {
        &self.columns()[1..]
    }

    pub fn contains(self, column: Column) -> bool {
        self.columns().contains(&column)
    }
}

impl From<Option<Currency>> for Projection {
    fn from(currency: Option<Currency>) -> Self {
        match currency {
            Some(Currency::Eur) => Projection::Eur,
            Some(Currency::Usd) => Projection::Usd,
            None => Projection::All,
        }
    }
}

// ---------------------------------------------------------------------------
// NewRecord — Append payload
// ---------------------------------------------------------------------------

/// A record submitted for appending, before validation.
///
/// Every field is optional so that missing input can be reported as a
/// validation failure rather than a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRecord {
    pub date_time: Option<String>,
    #[serde(rename = "EURbuy")]
    pub eur_buy: Option<f64>,
    #[serde(rename = "EURsell")]
    pub eur_sell: Option<f64>,
    #[serde(rename = "USDbuy")]
    pub usd_buy: Option<f64>,
    #[serde(rename = "USDsell")]
    pub usd_sell: Option<f64>,
}

impl NewRecord {
    pub fn new(
        date_time: impl Into<String>,
        eur_buy: f64,
        eur_sell: f64,
        usd_buy: f64,
        usd_sell: f64,
    ) -> Self {
        Self {
            date_time: Some(date_time.into()),
            eur_buy: Some(eur_buy),
            eur_sell: Some(eur_sell),
            usd_buy: Some(usd_buy),
            usd_sell: Some(usd_sell),
        }
    }

    /// Parse an append payload from a JSON object.
    ///
    /// Unknown keys and wrongly-typed values are rejected as
    /// [`RateError::Validation`].
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        NewRecord::deserialize(value).map_err(|e| RateError::Validation(e.to_string()))
    }

    /// Check required fields and convert into a storable [`RateRecord`].
    pub fn validate(&self) -> Result<RateRecord> {
        let missing: Vec<&str> = [
            (config::COL_DATE_TIME, self.date_time.is_none()),
            (config::COL_EUR_BUY, self.eur_buy.is_none()),
            (config::COL_EUR_SELL, self.eur_sell.is_none()),
            (config::COL_USD_BUY, self.usd_buy.is_none()),
            (config::COL_USD_SELL, self.usd_sell.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(RateError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let raw_ts = self.date_time.as_deref().unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| RateError::Format(format!("cannot parse timestamp '{}'", raw_ts)))?;

        let record = RateRecord {
            timestamp,
            eur_buy: self.eur_buy,
            eur_sell: self.eur_sell,
            usd_buy: self.usd_buy,
            usd_sell: self.usd_sell,
        };

        for column in Column::NUMERIC {
            if let Some(v) = record.value(column) {
                if !v.is_finite() || v < 0.0 {
                    return Err(RateError::Validation(format!(
                        "{} must be a non-negative number, got {}",
                        column, v
                    )));
                }
            }
        }

        Ok(record)
    }
}
