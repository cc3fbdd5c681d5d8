use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use cosmetics_safety::{
    api::{self, ServiceInfo},
    config::Config,
    migrator,
    rate_limit::{client_identifier, MemoryStore, RateLimitStore, RateLimits, RedisStore},
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    cosmetics_safety::telemetry::init_telemetry(
        "cosmetics-safety-api",
        config.log_format,
        config.otlp_endpoint.as_deref(),
    )?;

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    // Database Connection
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        migrator::Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
    }

    cosmetics_safety::metrics::init_metrics(&db).await;

    // Shared counters in Redis when configured, otherwise per-process.
    let store: Arc<dyn RateLimitStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid Redis URL")?;
            tracing::info!("rate limiting backed by redis");
            let store = RedisStore::connect(&client)
                .await
                .context("Failed to connect to Redis")?;
            Arc::new(store)
        }
        None => Arc::new(MemoryStore::new(config.rate_limit_capacity)),
    };
    let limits = RateLimits::new(config.rate_limit, store);

    let routes = api::router(db, limits, ServiceInfo::new(config.environment.clone()));
    let app = app(routes, &config, prometheus_layer, metric_handle)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutdown signal received");
}

fn app(
    routes: Router,
    config: &Config,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> anyhow::Result<Router> {
    let cors_origin = config
        .cors_origin
        .parse::<axum::http::HeaderValue>()
        .context("CORS_ORIGIN is not a valid header value")?;

    Ok(routes
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // Span name: "METHOD /path" (e.g., "GET /api/companies/:id")
                    let path = matched_path.unwrap_or_else(|| request.uri().path());
                    let span_name = format!("{} {}", request.method(), path);

                    let user_ip = client_identifier(request.headers());

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        user_ip = %user_ip,
                        method = ?request.method(),
                        path = %path,
                        // Filled in by the error mapper
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                    // Only completions are logged.
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));

                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(cors_origin)
                .allow_methods([axum::http::Method::GET])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .route("/metrics", get(|| async move { metric_handle.render() })))
}
