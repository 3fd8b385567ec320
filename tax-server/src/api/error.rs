use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tax_data::FetchError;
use thiserror::Error;

use crate::utils::join_years;

/// Everything the calculation endpoint can answer besides a result.
///
/// Validation failures carry their message to the client. Upstream
/// failures are logged here with full detail and reach the client only as
/// a bare "Internal Server Error".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required parameters")]
    MissingParameters,

    #[error("Unsupported tax year. Supported years are: {}", join_years(.0))]
    UnsupportedYear(Vec<i32>),

    #[error("Internal Server Error")]
    Upstream(#[from] FetchError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParameters | ApiError::UnsupportedYear(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Upstream(source) = &self {
            tracing::debug!(error = %source, "answering upstream failure with 500");
        }

        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Turns a panic caught while serving a request into the same opaque 500
/// an upstream failure gets.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Error calculating tax");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unsupported_year_lists_years() {
        let err = ApiError::UnsupportedYear(vec![2021, 2022, 2023]);

        assert_eq!(
            err.to_string(),
            "Unsupported tax year. Supported years are: 2021, 2022, 2023"
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failure_hides_detail() {
        let err = ApiError::from(FetchError::from_status(404, "year 1999 not on file".into()));

        assert_eq!(err.to_string(), "Internal Server Error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
