use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    add_comment, group_posts, index, post_create, post_create_form, post_detail, post_edit,
    post_edit_form, profile,
};
use crate::presentation::middleware::cache::cache_page;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let cached = Router::new()
        .route("/", get(index))
        .route_layer(middleware::from_fn_with_state(state, cache_page));

    let pages = Router::new()
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
        .route("/posts/{post_id}/", get(post_detail))
        .route(
            "/posts/{post_id}/edit/",
            get(post_edit_form).post(post_edit),
        )
        .route("/posts/{post_id}/comment/", post(add_comment))
        .route("/create/", get(post_create_form).post(post_create));

    cached.merge(pages)
}
