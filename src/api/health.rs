use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use super::ServiceInfo;
use crate::store;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub environment: String,
    pub database: DatabaseStatus,
    /// Seconds since the process started.
    pub uptime: u64,
}

// GET /api/health
pub async fn health_check(
    Extension(db): Extension<DatabaseConnection>,
    Extension(info): Extension<ServiceInfo>,
) -> Response {
    let (status_code, status, database) = match store::products::count_all(&db).await {
        Ok(count) => (
            StatusCode::OK,
            "healthy",
            DatabaseStatus {
                connected: true,
                record_count: Some(count),
                error: None,
            },
        ),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unhealthy",
                DatabaseStatus {
                    connected: false,
                    record_count: None,
                    error: Some(e.public_message().to_string()),
                },
            )
        }
    };

    let body = HealthResponse {
        status,
        timestamp: Utc::now(),
        version: info.version,
        environment: info.environment.clone(),
        database,
        uptime: info.started_at.elapsed().as_secs(),
    };

    (status_code, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr};

    use crate::api::testing::{app, get};
    use crate::store::testing::count_row;

    #[tokio::test]
    async fn test_healthy_when_count_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1234)]])
            .into_connection();

        let (status, body) = get(app(db), "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"]["connected"], true);
        assert_eq!(body["database"]["recordCount"], 1234);
        assert_eq!(body["environment"], "test");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["uptime"].is_u64());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unhealthy_when_count_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Conn(RuntimeErr::Internal("connection refused".into()))])
            .into_connection();

        let (status, body) = get(app(db), "/api/health").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["database"]["connected"], false);
        assert!(body["database"]["error"].is_string());
        assert!(body["database"].get("recordCount").is_none());
    }
}
