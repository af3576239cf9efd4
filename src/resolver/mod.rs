//! Command resolution.
//!
//! Answers "which URL does command X map to for account A" with a cache-aside
//! lookup: the account's whole command map is read from the cache, or from the
//! store on a miss and then written back to the cache. Unknown commands resolve
//! to a search URL instead of an error.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{timeout_at, Instant};

use crate::cache::CommandCache;
use crate::config::MAX_REQUEST_TIMEOUT;
use crate::db::Store;
use crate::errors::AppError;

/// Search endpoint used when a command cannot be resolved.
pub const DEFAULT_SEARCH_URL: &str = "http://www.google.com/search";

/// Why a resolution fell back to the search URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackReason {
    /// The account exists but has no such command.
    UnknownCommand,
    /// No account matches the API key.
    UnknownAccount,
}

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "reason")]
pub enum Origin {
    CacheHit,
    StoreHit,
    DefaultFallback(FallbackReason),
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::CacheHit => "cache-hit",
            Origin::StoreHit => "store-hit",
            Origin::DefaultFallback(FallbackReason::UnknownCommand) => "default-fallback",
            Origin::DefaultFallback(FallbackReason::UnknownAccount) => {
                "default-fallback-unknown-account"
            }
        }
    }
}

/// Outcome of resolving a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub url: String,
    pub origin: Origin,
}

impl Resolution {
    fn hit(url: &str, origin: Origin) -> Self {
        Self {
            url: format_url(url),
            origin,
        }
    }

    fn fallback(cmd: &str, reason: FallbackReason) -> Self {
        Self {
            url: default_search_url(cmd),
            origin: Origin::DefaultFallback(reason),
        }
    }
}

/// Cache-aside command resolver.
///
/// Holds no locks of its own; concurrent resolutions only share the injected
/// store and cache. Concurrent misses for the same account each read the
/// store and rewrite the cache entry.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn Store>,
    cache: Arc<dyn CommandCache>,
    ttl: Duration,
    deadline: Duration,
}

impl Resolver {
    /// `deadline` is clamped to `MAX_REQUEST_TIMEOUT`.
    pub fn new(
        store: Arc<dyn Store>,
        cache: Arc<dyn CommandCache>,
        ttl: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            ttl,
            deadline: deadline.min(MAX_REQUEST_TIMEOUT),
        }
    }

    /// Resolve `cmd` for the account identified by `api_key`.
    ///
    /// Fails only with a transient or store error when the answer could not be
    /// determined, including when the deadline elapses. A confirmed miss
    /// always yields the search fallback.
    pub async fn resolve(&self, api_key: &str, cmd: &str) -> Result<Resolution, AppError> {
        let deadline = Instant::now() + self.deadline;
        let resolution = self.lookup(api_key, cmd, deadline).await?;
        tracing::debug!(
            api_key = %api_key,
            cmd = %cmd,
            origin = resolution.origin.as_str(),
            "Resolved command"
        );
        Ok(resolution)
    }

    async fn lookup(
        &self,
        api_key: &str,
        cmd: &str,
        deadline: Instant,
    ) -> Result<Resolution, AppError> {
        match timeout_at(deadline, self.cache.get(api_key)).await? {
            // The cached map is authoritative until it expires.
            Ok(Some(cmds)) => {
                return Ok(match cmds.get(cmd) {
                    Some(url) => Resolution::hit(url, Origin::CacheHit),
                    None => Resolution::fallback(cmd, FallbackReason::UnknownCommand),
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}, using store: {}", api_key, e),
        }

        let fetched = timeout_at(deadline, self.store.fetch_account_commands(api_key)).await??;
        let Some(cmds) = fetched else {
            tracing::info!("No account for API key {}", api_key);
            return Ok(Resolution::fallback(cmd, FallbackReason::UnknownAccount));
        };

        let resolution = match cmds.get(cmd) {
            Some(url) => Resolution::hit(url, Origin::StoreHit),
            None => Resolution::fallback(cmd, FallbackReason::UnknownCommand),
        };

        // Backfill is best-effort and must not alter the answer.
        match timeout_at(deadline, self.cache.set(api_key, cmds, self.ttl)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to cache commands for {}: {}", api_key, e),
            Err(_) => tracing::warn!("Timed out caching commands for {}", api_key),
        }

        Ok(resolution)
    }
}

/// Search URL for an unresolved command.
pub fn default_search_url(cmd: &str) -> String {
    let query: String = url::form_urlencoded::byte_serialize(cmd.as_bytes()).collect();
    format!("{}?q={}", DEFAULT_SEARCH_URL, query)
}

/// Prefix `http://` onto URLs stored without a scheme.
pub fn format_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Reject a command URL that could not be sent as a redirect target.
pub fn validate_command_url(url: &str) -> Result<(), AppError> {
    if url.chars().any(char::is_control) {
        return Err(AppError::Validation(format!(
            "URL {:?} contains control characters",
            url
        )));
    }
    url::Url::parse(&format_url(url))
        .map_err(|e| AppError::Validation(format!("Invalid URL {:?}: {}", url, e)))?;
    Ok(())
}
