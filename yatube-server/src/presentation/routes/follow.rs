use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::follow::{follow_index, profile_follow, profile_unfollow};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_index))
        .route(
            "/profile/{username}/follow/",
            get(profile_follow).post(profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            get(profile_unfollow).post(profile_unfollow),
        )
}
