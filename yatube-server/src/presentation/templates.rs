use askama::Template;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::domain::comment::Comment;
use crate::domain::group::Group;
use crate::domain::pagination::Page;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::presentation::forms::{AccountFormView, PostFormView};

/// Renders an askama template as an HTML response.
pub(crate) struct Html<T: Template>(pub(crate) T);

impl<T: Template> Html<T> {
    pub(crate) fn with_status(self, status: StatusCode) -> Response {
        match self.0.render() {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(err) => {
                error!(error = %err, "template render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) page_obj: Page<Post>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub(crate) struct GroupListTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) group: Group,
    pub(crate) page_obj: Page<Post>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub(crate) struct ProfileTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) author: User,
    pub(crate) posts_count: i64,
    pub(crate) following: bool,
    /// False for anonymous visitors and on one's own profile.
    pub(crate) show_follow_controls: bool,
    pub(crate) page_obj: Page<Post>,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub(crate) struct PostDetailTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
    pub(crate) author_posts_count: i64,
    pub(crate) can_edit: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub(crate) struct CreatePostTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) form: PostFormView,
    pub(crate) is_edit: bool,
    pub(crate) action: String,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub(crate) struct FollowTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) page_obj: Page<Post>,
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub(crate) struct LoginTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) form: AccountFormView,
    pub(crate) next: String,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub(crate) struct SignupTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) form: AccountFormView,
}

#[derive(Template)]
#[template(path = "about/author.html")]
pub(crate) struct AboutAuthorTemplate {
    pub(crate) viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "about/tech.html")]
pub(crate) struct AboutTechTemplate {
    pub(crate) viewer: Option<String>,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub(crate) struct NotFoundTemplate {
    pub(crate) viewer: Option<String>,
    pub(crate) path: String,
}

#[derive(Template)]
#[template(path = "core/500.html")]
pub(crate) struct ServerErrorTemplate {
    pub(crate) viewer: Option<String>,
}
