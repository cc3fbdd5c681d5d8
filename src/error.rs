use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::rejection::QueryRejection,
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationError;

/// Failure categories reported by the data-access layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// The database could not be reached; the client may retry.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("database error: {0}")]
    Other(String),
}

impl DataError {
    /// Short description safe to show to clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            DataError::Unavailable(_) => "Database temporarily unavailable",
            DataError::Query(_) => "Database query failed",
            DataError::Other(_) => "Database error",
        }
    }
}

impl From<DbErr> for DataError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => DataError::Unavailable(err.to_string()),
            DbErr::Query(_)
            | DbErr::Exec(_)
            | DbErr::Type(_)
            | DbErr::Json(_)
            | DbErr::TryIntoErr { .. }
            | DbErr::RecordNotFound(_) => DataError::Query(err.to_string()),
            other => DataError::Other(other.to_string()),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so handlers can return `Result<T, ApiError>`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Malformed query strings (duplicate keys, bad encoding) get the same body as
/// any other validation failure.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(ValidationError::new("params", rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Data(DataError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => ValidationError::CODE,
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Data(DataError::Unavailable(_)) => "SERVICE_UNAVAILABLE",
            ApiError::Data(DataError::Query(_)) => "DATABASE_ERROR",
            ApiError::Data(DataError::Other(_)) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match &self {
            ApiError::Validation(err) => (err.message.clone(), Some(err.details())),
            ApiError::RateLimited { .. } => (
                "Too many requests. Please try again later.".to_string(),
                None,
            ),
            ApiError::NotFound(msg) => (msg.clone(), None),
            ApiError::Data(err) => {
                tracing::error!(error = %err, "request failed in data layer");
                tracing::Span::current().record("error", tracing::field::display(err));
                (format!("{}. Please try again later.", err.public_message()), None)
            }
        };

        let body = Json(ErrorBody {
            success: false,
            error: code,
            message,
            details,
        });

        let mut response = (status, body).into_response();
        if let ApiError::RateLimited { retry_after } = self {
            let seconds = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_connection_errors_are_unavailable() {
        let err: DataError = DbErr::Conn(RuntimeErr::Internal("connection refused".into())).into();
        assert!(matches!(err, DataError::Unavailable(_)));
        assert_eq!(ApiError::from(err).status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_query_errors_are_server_errors() {
        let err: DataError = DbErr::Query(RuntimeErr::Internal("syntax error".into())).into();
        assert!(matches!(err, DataError::Query(_)));
        assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: DataError = DbErr::Custom("timeout".into()).into();
        assert!(matches!(err, DataError::Other(_)));
        assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_server_error_codes() {
        let query: DataError = DbErr::Exec(RuntimeErr::Internal("deadlock".into())).into();
        let body = body_json(ApiError::from(query).into_response()).await;
        assert_eq!(body["error"], "DATABASE_ERROR");

        let other: DataError = DbErr::Custom("unexpected".into()).into();
        let response = ApiError::from(other).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "Database error. Please try again later.");
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let err = ApiError::from(ValidationError::new("query", "Please enter at least 3 characters"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "Please enter at least 3 characters");
        assert_eq!(body["details"]["query"], "Please enter at least 3 characters");
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            retry_after: Duration::from_secs(42),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "42");
    }

    #[tokio::test]
    async fn test_data_errors_hide_internal_detail() {
        let err: DataError = DbErr::Conn(RuntimeErr::Internal("password=hunter2".into())).into();
        let body = body_json(ApiError::from(err).into_response()).await;
        assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
        assert!(!body["message"].as_str().unwrap().contains("hunter2"));
        assert!(body.get("details").is_none());
    }
}
