use axum::http::StatusCode;
use thiserror::Error;

/// Failures of the raw key-value layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read key '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write key '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored expenses are unreadable: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("could not encode expenses: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored expenses use schema version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("no expense ids left after {0}")]
    IdsExhausted(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("amount '{0}' is not a number")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("amount must not exceed {0}")]
    AmountTooLarge(rust_decimal::Decimal),
    #[error("category must be selected")]
    MissingCategory,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// Errors raised while handling a UI event.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(err) => Self::bad_request(err.to_string()),
            TrackerError::Store(err) => {
                tracing::error!("failed to persist expenses: {err}");
                Self::internal(err)
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
