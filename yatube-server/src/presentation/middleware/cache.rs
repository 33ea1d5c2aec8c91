use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::infrastructure::page_cache::CachedPage;
use crate::presentation::AppState;
use crate::presentation::middleware::auth::AuthenticatedUser;

/// Cache key for a page as seen by one signed-in user (or by anonymous visitors).
pub(crate) fn cache_key(path_and_query: &str, viewer_id: Option<i64>) -> String {
    match viewer_id {
        Some(user_id) => format!("{path_and_query}|user:{user_id}"),
        None => format!("{path_and_query}|anon"),
    }
}

/// Serves successful GET responses from the page cache and fills it on a miss.
pub(crate) async fn cache_page(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let viewer_id = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.user_id);
    let key = cache_key(path_and_query, viewer_id);

    if let Some(page) = state.page_cache.get(&key).await {
        debug!(path = path_and_query, "page cache hit");
        return page.into_response();
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(error = %err, "failed to buffer response for the page cache");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    state
        .page_cache
        .insert(
            key,
            CachedPage {
                status: parts.status,
                headers: parts.headers.clone(),
                body: bytes.clone(),
            },
        )
        .await;

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::cache_key;

    #[test]
    fn viewers_never_share_a_key() {
        assert_eq!(cache_key("/", None), "/|anon");
        assert_eq!(cache_key("/", Some(7)), "/|user:7");
        assert_ne!(cache_key("/", Some(1)), cache_key("/", Some(2)));
        assert_ne!(cache_key("/?page=2", None), cache_key("/", None));
    }
}
