use std::path::PathBuf;

pub const DATA_FILE: &str = "history.csv";
pub const BACKUP_FILE: &str = "history_backup.csv";

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 50;
pub const DEFAULT_HISTORY_LEN: usize = 10;

/// Canonical timestamp layout, used for storage and all formatted output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Additional layouts accepted when parsing caller-supplied timestamps.
pub const TIMESTAMP_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

pub const EXPORT_FILE_PREFIX: &str = "currency_data_";
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const COL_DATE_TIME: &str = "date_time";
pub const COL_EUR_BUY: &str = "EURbuy";
pub const COL_EUR_SELL: &str = "EURsell";
pub const COL_USD_BUY: &str = "USDbuy";
pub const COL_USD_SELL: &str = "USDsell";

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("rate-history")
    } else {
        PathBuf::from(".rate-history")
    }
}
