use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::rate_limit::{client_identifier, RateLimiter};

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_identifier(request.headers());
    let decision = limiter.check(&client).await;
    if !decision.allowed {
        tracing::warn!(group = limiter.group(), client = %client, "rate limit exceeded");
        crate::metrics::record_rate_limited(limiter.group());
        return ApiError::RateLimited {
            retry_after: decision.reset_in,
        }
        .into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    use crate::api::{router, ServiceInfo};
    use crate::rate_limit::{RateLimitPolicy, RateLimits};

    fn limited_app(limits: RateLimits) -> Router {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        router(db, limits, ServiceInfo::new("test"))
    }

    async fn status_of(app: &Router, uri: &str, ip: &str) -> StatusCode {
        let request = Request::builder()
            .uri(uri)
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_hundred_and_first_request_is_rejected() {
        let app = limited_app(RateLimits::in_memory(RateLimitPolicy::default(), 1024));

        // Malformed ids fail validation without touching the database.
        for _ in 0..100 {
            assert_eq!(
                status_of(&app, "/api/companies/abc", "10.1.1.1").await,
                StatusCode::BAD_REQUEST
            );
        }
        assert_eq!(
            status_of(&app, "/api/companies/abc", "10.1.1.1").await,
            StatusCode::TOO_MANY_REQUESTS
        );
        // Another client and another endpoint group are unaffected.
        assert_eq!(
            status_of(&app, "/api/companies/abc", "10.1.1.2").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&app, "/api/ingredients/abc", "10.1.1.1").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_rejection_carries_retry_after() {
        let policy = RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let app = limited_app(RateLimits::in_memory(policy, 16));

        status_of(&app, "/api/products/search?query=ab", "10.9.9.9").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/products/search?query=ab")
                    .header("x-forwarded-for", "10.9.9.9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response.headers()["retry-after"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=60).contains(&retry_after));
    }

    #[tokio::test]
    async fn test_unidentified_clients_share_a_bucket() {
        let policy = RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let app = limited_app(RateLimits::in_memory(policy, 16));
        let anonymous = || Request::builder().uri("/api/companies/x").body(Body::empty()).unwrap();

        let first = app.clone().oneshot(anonymous()).await.unwrap();
        assert_eq!(first.status(), StatusCode::BAD_REQUEST);
        let second = app.clone().oneshot(anonymous()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_health_is_not_rate_limited() {
        let policy = RateLimitPolicy {
            max_requests: 0,
            window: Duration::from_secs(60),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![crate::store::testing::count_row(3)]])
            .into_connection();
        let app = router(db, RateLimits::in_memory(policy, 16), ServiceInfo::new("test"))
            .route("/ping", get(|| async { "pong" }));

        assert_eq!(status_of(&app, "/api/health", "1.2.3.4").await, StatusCode::OK);
        assert_eq!(status_of(&app, "/ping", "1.2.3.4").await, StatusCode::OK);
    }
}
