//! Full-router harness over the in-memory store.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use tower::ServiceExt;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::follow_service::FollowService;
use crate::data::repositories::memory::MemoryStore;
use crate::domain::pagination::Paginator;
use crate::domain::user::User;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::page_cache::PageCache;
use crate::presentation::AppState;
use crate::server::build_router;

const SECRET: &str = "0123456789abcdef0123456789abcdef";
const BOUNDARY: &str = "yatube-test-boundary";
pub(crate) const CACHE_CAPACITY: usize = 16;

static NEXT_MEDIA_DIR: AtomicUsize = AtomicUsize::new(0);

pub(crate) struct TestApp {
    pub(crate) store: MemoryStore,
    pub(crate) state: AppState,
    router: Router,
    media_root: PathBuf,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        let store = MemoryStore::new();
        let repos = store.repositories();
        let paginator = Paginator::new(10);
        let jwt = Arc::new(JwtService::new(SECRET, 3600));
        let media_root = std::env::temp_dir().join(format!(
            "yatube-router-{}-{}",
            std::process::id(),
            NEXT_MEDIA_DIR.fetch_add(1, Ordering::Relaxed)
        ));

        let state = AppState::new(
            Arc::new(AuthService::new(repos.users.clone(), jwt.clone())),
            Arc::new(BlogService::new(&repos, paginator)),
            Arc::new(FollowService::new(&repos, paginator)),
            jwt,
            Arc::new(PageCache::new(Duration::from_secs(20), CACHE_CAPACITY)),
            Arc::new(MediaStorage::new(&media_root)),
        );
        let router = build_router(state.clone());

        Self {
            store,
            state,
            router,
            media_root,
        }
    }

    /// `Cookie` header value carrying a session for `user`.
    pub(crate) fn session(&self, user: &User) -> String {
        let token = self
            .state
            .jwt
            .issue_token(user.id, &user.username)
            .expect("token must be issued");
        format!("yatube_session={token}")
    }

    pub(crate) async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let request = with_cookie(Request::get(uri), cookie)
            .body(Body::empty())
            .expect("request must build");
        self.send(request).await
    }

    pub(crate) async fn post_form(
        &self,
        uri: &str,
        body: &str,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let request = with_cookie(Request::post(uri), cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("request must build");
        self.send(request).await
    }

    pub(crate) async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let request = with_cookie(Request::post(uri), cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, image)))
            .expect("request must build");
        self.send(request).await
    }

    /// Files currently kept under the post image directory.
    pub(crate) fn stored_images(&self) -> usize {
        std::fs::read_dir(self.media_root.join("posts"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

fn with_cookie(
    builder: axum::http::request::Builder,
    cookie: Option<&str>,
) -> axum::http::request::Builder {
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(crate) async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    String::from_utf8(bytes.to_vec()).expect("body must be utf-8")
}

pub(crate) fn assert_redirect(response: &Response<Body>, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(location)
    );
}
