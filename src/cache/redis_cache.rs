//! Command cache shared by every server instance through Redis.
//!
//! Each account's command map is stored as one JSON string under
//! `bookshelf:cmds:<api_key>` with a Redis-side expiry.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use super::CommandCache;
use crate::errors::AppError;
use crate::models::CommandMap;

const KEY_PREFIX: &str = "bookshelf:cmds";

#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    /// Validate `url` without connecting; connections are opened per call.
    pub fn open(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::BadRequest(format!("Invalid Redis URL: {}", e)))?;
        Ok(Self { client })
    }

    fn key(api_key: &str) -> String {
        format!("{}:{}", KEY_PREFIX, api_key)
    }
}

#[async_trait]
impl CommandCache for RedisCache {
    async fn get(&self, api_key: &str) -> Result<Option<CommandMap>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(Self::key(api_key)).await?;

        payload
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Transient(format!("Unreadable cache entry for {}: {}", api_key, e))
                })
            })
            .transpose()
    }

    async fn set(&self, api_key: &str, cmds: CommandMap, ttl: Duration) -> Result<(), AppError> {
        let payload = serde_json::to_string(&cmds)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Redis rejects an expiry of zero seconds.
        let _: () = conn
            .set_ex(Self::key(api_key), payload, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }
}
