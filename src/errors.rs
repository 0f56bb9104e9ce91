use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::external::blob_store::StorageError;

pub const STOCK_DATA_DETAILS: &str = "Failed to fetch stock data from blob storage";
pub const STOCK_LIST_DETAILS: &str = "Failed to list stocks from blob storage";
pub const VALIDATION_DETAILS: &str = "Invalid stock symbol";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{source}")]
    Storage {
        source: StorageError,
        details: &'static str,
    },
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn stock_data(source: StorageError) -> Self {
        AppError::Storage {
            source,
            details: STOCK_DATA_DETAILS,
        }
    }

    pub fn stock_list(source: StorageError) -> Self {
        AppError::Storage {
            source,
            details: STOCK_LIST_DETAILS,
        }
    }

    // Clients only tell failures apart by `details`.
    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn details(&self) -> &'static str {
        match self {
            AppError::Storage { details, .. } => *details,
            AppError::Validation(_) => VALIDATION_DETAILS,
        }
    }
}

// Every failure renders as `{"error": ..., "details": ...}`.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "error": self.to_string(),
            "details": self.details(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_are_internal() {
        let err = AppError::stock_data(StorageError::NotConfigured("no account".into()));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details(), STOCK_DATA_DETAILS);
        assert_eq!(err.to_string(), "storage not configured: no account");
    }

    #[test]
    fn test_listing_errors_carry_their_own_details() {
        let err = AppError::stock_list(StorageError::Network("timeout".into()));

        assert_eq!(err.details(), STOCK_LIST_DETAILS);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_renders_like_other_failures() {
        let err = AppError::Validation("invalid symbol '../x'".into());

        assert_eq!(err.details(), VALIDATION_DETAILS);
        assert_eq!(err.to_string(), "Validation error: invalid symbol '../x'");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
