use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::handlers::pages::{about_author, about_tech};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/author/", get(about_author))
        .route("/tech/", get(about_tech))
}
