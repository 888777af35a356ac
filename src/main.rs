//! Meme Game Backend
//!
//! REST backend for a caption guessing game with SQLite persistence and
//! session-tracked multi-round matches.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod game;
mod models;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use game::MatchArchive;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub archive: MatchArchive,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Repository, config: Config) -> Self {
        Self {
            archive: MatchArchive::new(repo.clone()),
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Meme Game Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (MEME_ADMIN_PSK). Content admin routes are open!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;

    if let Some(seed_path) = &config.seed_path {
        let seed = db::load_seed(&pool, seed_path).await?;
        tracing::info!(
            "Loaded seed {:?}: {} memes, {} captions, {} associations",
            seed_path,
            seed.memes.len(),
            seed.captions.len(),
            seed.associations.len()
        );
    }

    let repo = Repository::new(pool);
    let meme_count = repo.list_meme_ids().await?.len();
    if meme_count == 0 {
        tracing::warn!("No memes in the database; rounds will fail until content is added");
    } else {
        tracing::info!("{} memes available", meme_count);
    }

    let state = AppState::new(repo, config.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.cookie_secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_ttl_minutes,
        )));

    // Clone PSK for the admin layer
    let psk = state.config.admin_psk.clone();

    let admin_routes = Router::new()
        .route("/memes", get(api::list_memes).post(api::create_meme))
        .route("/captions", get(api::list_captions).post(api::create_caption))
        .route(
            "/memes/{id}/captions",
            get(api::list_associations).post(api::create_association),
        )
        .route(
            "/memes/{id}/captions/{caption_id}",
            delete(api::delete_association),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_psk_layer(psk.clone(), req, next)
        }));

    let api_routes = Router::new()
        // Accounts
        .route("/users", post(api::register))
        .route("/sessions", post(api::login))
        .route(
            "/sessions/current",
            get(api::current_session).delete(api::logout),
        )
        // Gameplay
        .route("/round", get(api::get_round))
        .route("/check", post(api::check_round))
        .route("/match/start", get(api::start_match))
        .route("/match/finish", post(api::finish_match))
        // History
        .route("/history", get(api::list_history))
        .route("/history/{id}", get(api::get_history))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(session_layer),
        )
        .with_state(state)
}

/// CORS policy: a single credentialed origin when configured, otherwise open.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let permissive = || {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let Some(origin) = origin else {
        return permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                HeaderName::from_static(auth::API_KEY_HEADER),
            ]),
        Err(e) => {
            tracing::warn!("Ignoring invalid MEME_CORS_ORIGIN {:?}: {}", origin, e);
            permissive()
        }
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
