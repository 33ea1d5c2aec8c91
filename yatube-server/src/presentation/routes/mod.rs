use axum::Router;

use super::AppState;

pub(crate) mod about;
pub(crate) mod auth;
pub(crate) mod follow;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(posts::router(state))
        .merge(follow::router())
        .nest("/auth", auth::router())
        .nest("/about", about::router())
}
