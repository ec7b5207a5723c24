use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{RateError, Result};

use super::record::{parse_timestamp, Currency};

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// Row filters. All fields are optional; `None` skips the filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Inclusive lower bound on the timestamp.
    pub start_date: Option<NaiveDateTime>,
    /// Inclusive upper bound on the timestamp.
    pub end_date: Option<NaiveDateTime>,
    /// Keep only this currency's columns.
    pub currency: Option<Currency>,
    /// Inclusive lower bound applied to every numeric column kept.
    pub min_value: Option<f64>,
    /// Inclusive upper bound applied to every numeric column kept.
    pub max_value: Option<f64>,
}

// ---------------------------------------------------------------------------
// SortSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse `asc` / `desc`, case-insensitively.
    pub fn parse(raw: &str) -> Result<SortOrder> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(RateError::InvalidFilter(format!(
                "sort_order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ord: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Sort key and direction.
///
/// `sort_by` is kept as the caller's column name: a name that is unknown, or
/// whose column was dropped by currency selection, leaves the order as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

// ---------------------------------------------------------------------------
// PageSpec
// ---------------------------------------------------------------------------

/// 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: config::DEFAULT_PAGE,
            per_page: config::DEFAULT_PER_PAGE,
        }
    }
}

impl PageSpec {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }
}

// ---------------------------------------------------------------------------
// QueryParams
// ---------------------------------------------------------------------------

/// Complete filter, sort and page specification for one query.
///
/// Deserializes from a flat object with the keys `start_date`, `end_date`,
/// `currency`, `min_value`, `max_value`, `sort_by`, `sort_order`, `page` and
/// `per_page`. Any other key is rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawQuery")]
pub struct QueryParams {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub page: PageSpec,
}

impl QueryParams {
    /// Build parameters from string key/value pairs, e.g. a URL query.
    ///
    /// Empty values count as absent. Unknown keys, unparseable dates or
    /// numbers and an invalid `sort_order` fail with
    /// [`RateError::InvalidFilter`]. An unrecognized currency is ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut raw = RawQuery::default();
        for (key, value) in pairs {
            let value = Some(Scalar::Text(value.as_ref().to_string()));
            match key.as_ref() {
                "start_date" => raw.start_date = value,
                "end_date" => raw.end_date = value,
                "currency" => raw.currency = value,
                "min_value" => raw.min_value = value,
                "max_value" => raw.max_value = value,
                "sort_by" => raw.sort_by = value,
                "sort_order" => raw.sort_order = value,
                "page" => raw.page = value,
                "per_page" => raw.per_page = value,
                other => {
                    return Err(RateError::InvalidFilter(format!(
                        "unknown query parameter '{}'",
                        other
                    )))
                }
            }
        }
        QueryParams::try_from(raw)
    }

    /// Build parameters from a flat JSON object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let raw = RawQuery::deserialize(value)
            .map_err(|e| RateError::InvalidFilter(e.to_string()))?;
        QueryParams::try_from(raw)
    }
}

// ---------------------------------------------------------------------------
// Boundary parsing
// ---------------------------------------------------------------------------

/// A loosely-typed input value: JSON may carry numbers where a URL query
/// carries text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(u64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQuery {
    start_date: Option<Scalar>,
    end_date: Option<Scalar>,
    currency: Option<Scalar>,
    min_value: Option<Scalar>,
    max_value: Option<Scalar>,
    sort_by: Option<Scalar>,
    sort_order: Option<Scalar>,
    page: Option<Scalar>,
    per_page: Option<Scalar>,
}

impl TryFrom<RawQuery> for QueryParams {
    type Error = RateError;

    fn try_from(raw: RawQuery) -> Result<Self> {
        let currency = match text("currency", raw.currency)? {
            Some(code) => {
                let parsed = Currency::parse(&code);
                if parsed.is_none() {
                    tracing::debug!("Ignoring unrecognized currency '{}'", code);
                }
                parsed
            }
            None => None,
        };

        let order = match text("sort_order", raw.sort_order)? {
            Some(s) => SortOrder::parse(&s)?,
            None => SortOrder::default(),
        };

        Ok(QueryParams {
            filter: FilterSpec {
                start_date: timestamp("start_date", raw.start_date)?,
                end_date: timestamp("end_date", raw.end_date)?,
                currency,
                min_value: number("min_value", raw.min_value)?,
                max_value: number("max_value", raw.max_value)?,
            },
            sort: SortSpec {
                sort_by: text("sort_by", raw.sort_by)?,
                order,
            },
            page: PageSpec {
                page: count("page", raw.page)?.unwrap_or(config::DEFAULT_PAGE),
                per_page: count("per_page", raw.per_page)?.unwrap_or(config::DEFAULT_PER_PAGE),
            },
        })
    }
}

fn text(key: &str, value: Option<Scalar>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(RateError::InvalidFilter(format!("{} must be a string", key))),
    }
}

fn timestamp(key: &str, value: Option<Scalar>) -> Result<Option<NaiveDateTime>> {
    match text(key, value)? {
        None => Ok(None),
        Some(s) => parse_timestamp(&s).map(Some).ok_or_else(|| {
            RateError::InvalidFilter(format!("{} is not a valid date: '{}'", key, s))
        }),
    }
}

fn number(key: &str, value: Option<Scalar>) -> Result<Option<f64>> {
    let n = match value {
        None => return Ok(None),
        Some(Scalar::Int(n)) => n as f64,
        Some(Scalar::Float(f)) => f,
        Some(Scalar::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
            RateError::InvalidFilter(format!("{} is not a number: '{}'", key, s))
        })?,
    };
    if !n.is_finite() {
        return Err(RateError::InvalidFilter(format!("{} must be finite", key)));
    }
    Ok(Some(n))
}

fn count(key: &str, value: Option<Scalar>) -> Result<Option<usize>> {
    let invalid = || RateError::InvalidFilter(format!("{} must be a non-negative integer", key));
    match value {
        None => Ok(None),
        Some(Scalar::Int(n)) => usize::try_from(n).map(Some).map_err(|_| invalid()),
        Some(Scalar::Float(_)) => Err(invalid()),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse::<usize>().map(Some).map_err(|_| invalid()),
    }
}
