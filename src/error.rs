#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("No data available: {0}")]
    DataUnavailable(String),

    #[error("No data matches the selected criteria")]
    NoMatch,

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date format: {0}")]
    Format(String),

    #[error("No snapshot available to restore")]
    NoSnapshot,

    #[error("Unauthorized: admin access required")]
    Unauthorized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl RateError {
    /// Stable machine-readable code for this error kind.
    ///
    /// Transports branch on this rather than on the display message.
    pub fn code(&self) -> &'static str {
        match self {
            RateError::DataUnavailable(_) => "data_unavailable",
            RateError::NoMatch => "no_match",
            RateError::InvalidFilter(_) => "invalid_filter",
            RateError::Validation(_) => "validation_error",
            RateError::Format(_) => "format_error",
            RateError::NoSnapshot => "no_snapshot",
            RateError::Unauthorized => "unauthorized",
            RateError::Io(_) => "io_error",
            RateError::Csv(_) => "csv_error",
            RateError::Json(_) => "json_error",
            RateError::Runtime(_) => "runtime_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
