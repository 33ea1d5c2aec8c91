use axum::{Json, Router, middleware, routing::get};
use serde::Serialize;
use tower_http::services::ServeDir;

use super::handlers::pages::not_found;
use super::middleware::auth::session_middleware;
use super::{AppState, routes};

pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .nest_service("/media", ServeDir::new(state.media.root()))
        .merge(routes::router(state.clone()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}
