use axum::{
    Form,
    extract::{Path, Query, Request, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use crate::domain::comment::CommentDraft;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::forms::{
    CommentForm, PageQuery, PostFormView, PostSubmission, UploadedImage, check_post_submission,
    read_post_submission,
};
use crate::presentation::middleware::auth::{AuthenticatedUser, CurrentUser};
use crate::presentation::templates::{
    CreatePostTemplate, GroupListTemplate, Html, IndexTemplate, PostDetailTemplate,
    ProfileTemplate,
};
use crate::presentation::urls::{post_detail_path, profile_path};

pub(crate) async fn index(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<IndexTemplate>> {
    let page_obj = state.blog_service.index(query.page.as_deref()).await?;
    Ok(Html(IndexTemplate {
        viewer: viewer.username(),
        page_obj,
    }))
}

pub(crate) async fn group_posts(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<GroupListTemplate>> {
    let listing = state
        .blog_service
        .group_posts(&slug, query.page.as_deref())
        .await?;
    Ok(Html(GroupListTemplate {
        viewer: viewer.username(),
        group: listing.group,
        page_obj: listing.page_obj,
    }))
}

pub(crate) async fn profile(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<ProfileTemplate>> {
    let listing = state
        .blog_service
        .author_posts(&username, query.page.as_deref())
        .await?;
    let author = listing.author;

    let other_viewer = viewer.user_id().filter(|&user_id| user_id != author.id);
    let following = match other_viewer {
        Some(user_id) => state.follow_service.is_following(user_id, author.id).await?,
        None => false,
    };

    Ok(Html(ProfileTemplate {
        viewer: viewer.username(),
        posts_count: listing.page_obj.count,
        following,
        show_follow_controls: other_viewer.is_some(),
        author,
        page_obj: listing.page_obj,
    }))
}

pub(crate) async fn post_detail(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Html<PostDetailTemplate>> {
    let post_id = parse_post_id(&post_id)?;
    let detail = state.blog_service.post_detail(post_id).await?;
    let can_edit = viewer
        .user_id()
        .is_some_and(|user_id| detail.post.is_authored_by(user_id));

    Ok(Html(PostDetailTemplate {
        viewer: viewer.username(),
        post: detail.post,
        comments: detail.comments,
        author_posts_count: detail.author_posts_count,
        can_edit,
    }))
}

pub(crate) async fn post_create_form(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Response> {
    let groups = state.blog_service.groups().await?;
    let form = PostFormView::new("", None, &groups, None);
    Ok(render_post_form(user, form, None))
}

pub(crate) async fn post_create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    request: Request,
) -> AppResult<Response> {
    let submission = read_post_submission(request).await?;
    let groups = state.blog_service.groups().await?;
    let (group_id, form) = check_post_submission(&submission, &groups, None);
    if form.has_errors() {
        return Ok(render_post_form(user, form, None));
    }

    let PostSubmission { text, image, .. } = submission;
    let image = store_image(&state, image).await?;
    let created = state
        .blog_service
        .create_post(user.user_id, PostDraft { text, group_id }, image.clone())
        .await;
    let post = match created {
        Ok(post) => post,
        Err(err) => {
            discard_image(&state, image).await;
            return Err(err.into());
        }
    };

    Ok(Redirect::to(&profile_path(&post.author.username)).into_response())
}

pub(crate) async fn post_edit_form(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let post = match load_for_edit(&state, &user, post_id).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    let groups = state.blog_service.groups().await?;
    let group_id = post.group_id();
    let form = PostFormView::new(post.text, group_id, &groups, post.image);
    Ok(render_post_form(user, form, Some(post_id)))
}

pub(crate) async fn post_edit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<String>,
    request: Request,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let post = match load_for_edit(&state, &user, post_id).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect),
    };

    let submission = read_post_submission(request).await?;
    let groups = state.blog_service.groups().await?;
    let (group_id, form) = check_post_submission(&submission, &groups, post.image);
    if form.has_errors() {
        return Ok(render_post_form(user, form, Some(post_id)));
    }

    let PostSubmission { text, image, .. } = submission;
    let image = store_image(&state, image).await?;
    let updated = state
        .blog_service
        .update_post(
            user.user_id,
            post_id,
            PostDraft { text, group_id },
            image.clone(),
        )
        .await;
    if let Err(err) = updated {
        discard_image(&state, image).await;
        if !matches!(err, DomainError::NotAuthor) {
            return Err(err.into());
        }
    }

    Ok(Redirect::to(&post_detail_path(post_id)).into_response())
}

pub(crate) async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> AppResult<Redirect> {
    let post_id = parse_post_id(&post_id)?;
    let draft = CommentDraft { text: form.text };
    match state
        .blog_service
        .add_comment(user.user_id, post_id, draft)
        .await
    {
        // a rejected comment is dropped; the reader lands back on the post either way
        Ok(_) | Err(DomainError::Validation { .. }) => {}
        Err(err) => return Err(err.into()),
    }

    Ok(Redirect::to(&post_detail_path(post_id)))
}

/// Route ids that are not integers behave like unknown posts.
fn parse_post_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Domain(DomainError::not_found(format!("post id: {raw}"))))
}

/// The post when the caller may edit it, otherwise a redirect to its page.
async fn load_for_edit(
    state: &AppState,
    user: &AuthenticatedUser,
    post_id: i64,
) -> AppResult<Result<Post, Response>> {
    match state.blog_service.post_for_edit(user.user_id, post_id).await {
        Ok(post) => Ok(Ok(post)),
        Err(DomainError::NotAuthor) => {
            Ok(Err(Redirect::to(&post_detail_path(post_id)).into_response()))
        }
        Err(err) => Err(err.into()),
    }
}

async fn store_image(
    state: &AppState,
    image: Option<UploadedImage>,
) -> AppResult<Option<String>> {
    match image {
        Some(upload) => Ok(Some(
            state
                .media
                .save_post_image(&upload.file_name, &upload.bytes)
                .await?,
        )),
        None => Ok(None),
    }
}

/// Removes an upload whose post was never saved.
async fn discard_image(state: &AppState, image: Option<String>) {
    let Some(path) = image else {
        return;
    };
    if let Err(err) = state.media.remove(&path).await {
        warn!(path = %path, error = %err, "orphaned post image left behind");
    }
}

fn render_post_form(user: AuthenticatedUser, form: PostFormView, post_id: Option<i64>) -> Response {
    let action = match post_id {
        Some(post_id) => format!("/posts/{post_id}/edit/"),
        None => "/create/".to_string(),
    };
    Html(CreatePostTemplate {
        viewer: Some(user.username),
        form,
        is_edit: post_id.is_some(),
        action,
    })
    .into_response()
}
