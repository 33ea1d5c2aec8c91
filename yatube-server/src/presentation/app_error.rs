use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;
use crate::infrastructure::media::MediaError;
use crate::presentation::templates::{Html, NotFoundTemplate, ServerErrorTemplate};
use crate::presentation::urls::login_path;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("login required for {next}")]
    LoginRequired { next: String },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::LoginRequired { next } => Redirect::to(&login_path(&next)).into_response(),
            AppError::Domain(err) => match err {
                DomainError::NotFound(_) => not_found_page(String::new()),
                DomainError::Validation { .. } => {
                    (StatusCode::BAD_REQUEST, err.to_string()).into_response()
                }
                DomainError::AlreadyExists(_) => {
                    (StatusCode::CONFLICT, err.to_string()).into_response()
                }
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
                }
                DomainError::NotAuthor => (StatusCode::FORBIDDEN, err.to_string()).into_response(),
                DomainError::Unexpected(_) => server_error_page(&err),
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            AppError::Media(MediaError::UnsupportedType(name)) => (
                StatusCode::BAD_REQUEST,
                format!("unsupported image type: {name}"),
            )
                .into_response(),
            AppError::Media(err) => server_error_page(&err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Internal(err) => server_error_page(err.as_ref()),
        }
    }
}

pub(crate) fn not_found_page(path: String) -> Response {
    Html(NotFoundTemplate { viewer: None, path }).with_status(StatusCode::NOT_FOUND)
}

fn server_error_page(err: &(dyn std::error::Error + 'static)) -> Response {
    error!(error = %err, "request failed");
    Html(ServerErrorTemplate { viewer: None }).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}
