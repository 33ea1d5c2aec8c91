use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{HeaderMap, Uri, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

pub(crate) const SESSION_COOKIE: &str = "yatube_session";

/// Identity resolved from the session cookie or a bearer token.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

/// Requires a session; anonymous callers are sent to the login page.
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::LoginRequired {
                next: requested_path(parts),
            })
    }
}

/// The caller's identity when there is one; never rejects.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser(pub(crate) Option<AuthenticatedUser>);

impl CurrentUser {
    pub(crate) fn username(&self) -> Option<String> {
        self.0.as_ref().map(|user| user.username.clone())
    }

    pub(crate) fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Resolves the session for every request. Invalid or expired tokens are
/// treated as anonymous rather than rejected.
pub(crate) async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(request.headers()) {
        match state.jwt.verify_token(token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthenticatedUser {
                    user_id: claims.user_id,
                    username: claims.username,
                });
            }
            Err(err) => debug!(error = %err, "ignoring invalid session token"),
        }
    }

    next.run(request).await
}

/// The session cookie, or failing that an `Authorization: Bearer` token.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, SESSION_COOKIE)
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(headers))
}

pub(crate) fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

pub(crate) fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

pub(crate) fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Path and query as the client sent them, before any router nesting.
fn requested_path(parts: &Parts) -> String {
    let uri: &Uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}
