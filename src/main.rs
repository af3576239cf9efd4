//! Bookshelf Backend
//!
//! REST backend resolving short commands to URLs and serving bookmark folders,
//! with SQLite persistence and an in-process command cache.

mod api;
mod auth;
mod cache;
mod config;
mod db;
mod errors;
mod hierarchy;
mod import;
mod models;
mod resolver;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::{CommandCache, MemoryCache, RedisCache};
use config::Config;
use db::{Repository, Store};
use import::Importer;
use resolver::Resolver;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub resolver: Resolver,
    pub importer: Importer,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the resolver and importer to the given store and cache clients.
    pub fn new(repo: Arc<Repository>, cache: Arc<dyn CommandCache>, config: Config) -> Self {
        let store: Arc<dyn Store> = repo.clone();
        Self {
            resolver: Resolver::new(
                store.clone(),
                cache,
                config.cache_ttl,
                config.request_timeout,
            ),
            importer: Importer::new(store, config.request_timeout),
            repo,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookshelf Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Command cache TTL: {:?}", config.cache_ttl);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (BOOKSHELF_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path, config.request_timeout).await?;
    let repo = Arc::new(Repository::new(pool));

    // Initialize command cache; the in-process one sweeps expired entries in the background
    let cache: Arc<dyn CommandCache> = match &config.redis_url {
        Some(url) => {
            tracing::info!("Using Redis command cache");
            Arc::new(RedisCache::open(url)?)
        }
        None => {
            tracing::info!("Using in-process command cache");
            let cache = Arc::new(MemoryCache::new());
            spawn_cache_purge(cache.clone(), config.cache_ttl);
            cache
        }
    };

    let bind_addr = config.bind_addr;
    let state = AppState::new(repo, cache, config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop expired cache entries so idle accounts do not linger.
fn spawn_cache_purge(cache: Arc<MemoryCache>, every: std::time::Duration) {
    let every = every.max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let purged = cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!(
                    "Purged {} expired cache entries, {} remain",
                    purged,
                    cache.len().await
                );
            }
        }
    });
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();
    let body_limit = state.config.max_import_bytes;

    // API routes
    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(api::create_account))
        .route("/accounts/{api_key}", get(api::get_account))
        // Commands
        .route(
            "/cmds/{api_key}",
            get(api::list_cmds)
                .put(api::add_cmd)
                .delete(api::delete_cmd),
        )
        // Resolution
        .route("/search/{api_key}/{cmd}", get(api::search))
        .route("/resolve/{api_key}/{cmd}", get(api::resolve_cmd))
        // Bookmarks
        .route(
            "/bookmarks/{api_key}",
            get(api::get_bookmarks).post(api::add_bookmark),
        )
        .route("/bookmarks/{api_key}/import", post(api::import_bookmarks))
        .route("/bookmarks/{api_key}/{id}", delete(api::delete_bookmark))
        .layer(DefaultBodyLimit::max(body_limit))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
