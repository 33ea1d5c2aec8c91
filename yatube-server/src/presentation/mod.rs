use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::follow_service::FollowService;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::page_cache::PageCache;

pub(crate) mod app_error;
pub(crate) mod forms;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod routes;
pub(crate) mod templates;
pub(crate) mod urls;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) blog_service: Arc<BlogService>,
    pub(crate) follow_service: Arc<FollowService>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) page_cache: Arc<PageCache>,
    pub(crate) media: Arc<MediaStorage>,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AuthService>,
        blog_service: Arc<BlogService>,
        follow_service: Arc<FollowService>,
        jwt: Arc<JwtService>,
        page_cache: Arc<PageCache>,
        media: Arc<MediaStorage>,
    ) -> Self {
        Self {
            auth_service,
            blog_service,
            follow_service,
            jwt,
            page_cache,
            media,
        }
    }
}
