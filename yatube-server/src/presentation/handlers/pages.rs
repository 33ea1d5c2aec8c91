use axum::{
    http::{StatusCode, Uri},
    response::Response,
};

use crate::presentation::middleware::auth::CurrentUser;
use crate::presentation::templates::{AboutAuthorTemplate, AboutTechTemplate, Html, NotFoundTemplate};

pub(crate) async fn about_author(viewer: CurrentUser) -> Html<AboutAuthorTemplate> {
    Html(AboutAuthorTemplate {
        viewer: viewer.username(),
    })
}

pub(crate) async fn about_tech(viewer: CurrentUser) -> Html<AboutTechTemplate> {
    Html(AboutTechTemplate {
        viewer: viewer.username(),
    })
}

pub(crate) async fn not_found(viewer: CurrentUser, uri: Uri) -> Response {
    Html(NotFoundTemplate {
        viewer: viewer.username(),
        path: uri.path().to_string(),
    })
    .with_status(StatusCode::NOT_FOUND)
}
