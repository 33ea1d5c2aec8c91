use axum::{
    Form,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, SignupRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::forms::{AccountFormView, LoginForm, NextQuery, SignupForm, error_messages};
use crate::presentation::middleware::auth::{CurrentUser, clear_session_cookie, session_cookie};
use crate::presentation::middleware::cache::cache_key;
use crate::presentation::templates::{Html, LoginTemplate, SignupTemplate};
use crate::presentation::urls::safe_next;

const BAD_CREDENTIALS: &str =
    "Введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";
const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";

pub(crate) async fn login_form(
    viewer: CurrentUser,
    Query(query): Query<NextQuery>,
) -> Html<LoginTemplate> {
    Html(LoginTemplate {
        viewer: viewer.username(),
        form: AccountFormView::default(),
        next: query.next.unwrap_or_default(),
    })
}

pub(crate) async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(login_page(&form, error_messages(&errors)));
    }

    let req = LoginRequest {
        username: form.username.clone(),
        password: form.password.clone(),
    };
    let result = match state.auth_service.login(req).await {
        Ok(result) => result,
        Err(DomainError::InvalidCredentials | DomainError::Validation { .. }) => {
            return Ok(login_page(&form, vec![BAD_CREDENTIALS.to_string()]));
        }
        Err(err) => return Err(err.into()),
    };

    info!(user_id = result.user.id, "user logged in");
    let target = safe_next(Some(&form.next)).unwrap_or_else(|| "/".to_string());
    Ok(start_session(&state, &result.session_token, &target))
}

pub(crate) async fn signup_form(viewer: CurrentUser) -> Html<SignupTemplate> {
    Html(SignupTemplate {
        viewer: viewer.username(),
        form: AccountFormView::default(),
    })
}

pub(crate) async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(signup_page(&form, error_messages(&errors)));
    }

    let req = SignupRequest {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
    };
    let result = match state.auth_service.signup(req).await {
        Ok(result) => result,
        Err(DomainError::AlreadyExists(_)) => {
            return Ok(signup_page(&form, vec![USERNAME_TAKEN.to_string()]));
        }
        Err(DomainError::Validation { field, message }) => {
            return Ok(signup_page(&form, vec![format!("{field}: {message}")]));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(start_session(&state, &result.session_token, "/"))
}

/// Drops the session cookie along with the index page cached for the user.
pub(crate) async fn logout(State(state): State<AppState>, viewer: CurrentUser) -> Response {
    if let Some(user_id) = viewer.user_id() {
        state.page_cache.invalidate(&cache_key("/", Some(user_id))).await;
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

fn start_session(state: &AppState, token: &str, target: &str) -> Response {
    (
        [(
            header::SET_COOKIE,
            session_cookie(token, state.jwt.ttl_seconds()),
        )],
        Redirect::to(target),
    )
        .into_response()
}

fn login_page(form: &LoginForm, errors: Vec<String>) -> Response {
    Html(LoginTemplate {
        viewer: None,
        form: AccountFormView::with_errors(&form.username, "", errors),
        next: form.next.clone(),
    })
    .into_response()
}

fn signup_page(form: &SignupForm, errors: Vec<String>) -> Response {
    Html(SignupTemplate {
        viewer: None,
        form: AccountFormView::with_errors(&form.username, &form.email, errors),
    })
    .into_response()
}
