use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catapult::config::Config;
use catapult::lever_client::{LeverClient, RecruitingApi};
use catapult::routes::build_router;
use catapult::state::AppState;
use catapult::user_cache::{MemoryUserCache, RedisUserCache, UserCache, UserDirectory};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Catapult v{}", env!("CARGO_PKG_VERSION"));

    let lever: Arc<dyn RecruitingApi> = Arc::new(
        LeverClient::new(
            &config.lever_api_url,
            config.lever_api_key.clone(),
            config.lever_timeout_secs,
        )
        .context("Failed to build Lever client")?,
    );
    info!("Lever client initialized ({})", config.lever_api_url);

    let cache = build_user_cache(&config).await;
    let users = UserDirectory::new(lever.clone(), cache, config.user_cache_ttl);

    let state = AppState {
        lever,
        users,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when configured and reachable, otherwise an in-process cache.
async fn build_user_cache(config: &Config) -> Arc<dyn UserCache> {
    let Some(redis_url) = config.redis_url.as_deref() else {
        info!("REDIS_URL not set; caching users in-process");
        return Arc::new(MemoryUserCache::new());
    };

    match RedisUserCache::connect(redis_url).await {
        Ok(cache) => {
            info!(
                "Redis user cache initialized (ttl {}s)",
                config.user_cache_ttl.as_secs()
            );
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Redis unavailable ({e}); caching users in-process");
            Arc::new(MemoryUserCache::new())
        }
    }
}
