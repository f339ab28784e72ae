//! User lookup cache.
//!
//! Interviewer records rarely change, so the pipeline goes through
//! `UserDirectory::get_or_fetch` instead of hitting `/users/:id` for every
//! feedback form. A cache failure is only ever a miss: output is the same
//! whether the cache is warm, cold, or down.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::{debug, warn};

use crate::lever_client::{LeverError, RecruitingApi};
use crate::models::User;

/// One week.
pub const DEFAULT_USER_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

const REDIS_KEY_PREFIX: &str = "lever:user:";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait UserCache: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<User>, CacheError>;

    async fn put(&self, user: &User, ttl: Duration) -> Result<(), CacheError>;
}

/// Redis-backed cache shared across processes. Values are JSON under `lever:user:<id>`.
#[derive(Clone)]
pub struct RedisUserCache {
    connection: ConnectionManager,
}

impl RedisUserCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, user_id: &str) -> Result<Option<User>, CacheError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(format!("{REDIS_KEY_PREFIX}{user_id}")).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, user: &User, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(user)?;
        conn.set_ex::<_, _, ()>(
            format!("{REDIS_KEY_PREFIX}{}", user.id),
            json,
            ttl.as_secs().max(1),
        )
        .await?;
        Ok(())
    }
}

/// In-process cache, used when no Redis URL is configured.
#[derive(Default)]
pub struct MemoryUserCache {
    entries: Mutex<HashMap<String, (User, Instant)>>,
}

impl MemoryUserCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserCache for MemoryUserCache {
    async fn get(&self, user_id: &str) -> Result<Option<User>, CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let expired = match entries.get(user_id) {
            Some((user, expires_at)) if *expires_at > Instant::now() => {
                return Ok(Some(user.clone()))
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(user_id);
        }
        Ok(None)
    }

    async fn put(&self, user: &User, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(user.id.clone(), (user.clone(), now + ttl));
        Ok(())
    }
}

/// Cache-or-fetch user resolution.
#[derive(Clone)]
pub struct UserDirectory {
    api: Arc<dyn RecruitingApi>,
    cache: Arc<dyn UserCache>,
    ttl: Duration,
}

impl UserDirectory {
    pub fn new(api: Arc<dyn RecruitingApi>, cache: Arc<dyn UserCache>, ttl: Duration) -> Self {
        Self { api, cache, ttl }
    }

    pub async fn get_or_fetch(&self, user_id: &str) -> Result<User, LeverError> {
        match self.cache.get(user_id).await {
            Ok(Some(user)) => {
                debug!("User cache hit for {user_id}");
                return Ok(user);
            }
            Ok(None) => {}
            Err(e) => warn!("User cache read failed for {user_id}: {e}"),
        }

        let user = self.api.get_user(user_id).await?;

        if let Err(e) = self.cache.put(&user, self.ttl).await {
            warn!("User cache write failed for {user_id}: {e}");
        }
        Ok(user)
    }
}
