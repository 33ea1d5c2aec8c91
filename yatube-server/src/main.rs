use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::blog_service::BlogService;
use application::follow_service::FollowService;
use data::Repositories;
use domain::pagination::Paginator;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::media::MediaStorage;
use infrastructure::page_cache::PageCache;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let repos = Repositories::postgres(pool);
    let paginator = Paginator::new(settings.posts_per_page);
    let jwt = Arc::new(JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds));
    let page_cache = Arc::new(PageCache::new(
        Duration::from_secs(settings.index_cache_ttl_secs),
        settings.index_cache_capacity,
    ));
    let media = Arc::new(MediaStorage::new(&settings.media_root));

    info!(
        posts_per_page = paginator.per_page(),
        index_cache_ttl_secs = page_cache.ttl().as_secs(),
        index_cache_capacity = page_cache.capacity(),
        media_root = %media.root().display(),
        "application configured"
    );

    let state = AppState::new(
        Arc::new(AuthService::new(repos.users.clone(), jwt.clone())),
        Arc::new(BlogService::new(&repos, paginator)),
        Arc::new(FollowService::new(&repos, paginator)),
        jwt,
        page_cache,
        media,
    );

    server::run_http(&settings, state).await
}
