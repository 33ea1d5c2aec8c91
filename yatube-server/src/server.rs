use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower::make::Shared;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::{AppState, http_handlers};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(settings.http_request_timeout_secs));

    let app = build_router(state)
        .layer(DefaultBodyLimit::max(settings.http_request_body_limit_bytes))
        .layer(timeout);
    let app = apply_trace(app);
    let service = ServiceBuilder::new()
        .layer(ConcurrencyLimitLayer::new(settings.http_concurrency_limit))
        .service(app);

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!(
        addr = %settings.http_addr,
        concurrency_limit = settings.http_concurrency_limit,
        "HTTP server listening"
    );
    axum::serve(listener, Shared::new(service)).await?;
    Ok(())
}

pub(crate) fn build_router(state: AppState) -> Router {
    http_handlers::routes(state)
}
