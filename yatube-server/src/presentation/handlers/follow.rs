use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};

use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::forms::PageQuery;
use crate::presentation::middleware::auth::AuthenticatedUser;
use crate::presentation::templates::{FollowTemplate, Html};
use crate::presentation::urls::profile_path;

pub(crate) async fn follow_index(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<FollowTemplate>> {
    let page_obj = state
        .follow_service
        .feed(user.user_id, query.page.as_deref())
        .await?;
    Ok(Html(FollowTemplate {
        viewer: Some(user.username),
        page_obj,
    }))
}

pub(crate) async fn profile_follow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<Redirect> {
    let author = state.follow_service.follow(user.user_id, &username).await?;
    Ok(Redirect::to(&profile_path(&author.username)))
}

pub(crate) async fn profile_unfollow(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(username): Path<String>,
) -> AppResult<Redirect> {
    let author = state
        .follow_service
        .unfollow(user.user_id, &username)
        .await?;
    Ok(Redirect::to(&profile_path(&author.username)))
}
