use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower_http::services::ServeDir;

use std::{path::PathBuf, sync::Arc};

use crate::{admin, candidates, elections, positions, session, voter};
use engine::Engine;

/// Default cap on request bodies, uploads included.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Process-level settings the HTTP layer needs.
#[derive(Clone)]
pub struct Config {
    /// Signs the session and flash cookies.
    pub key: Key,
    /// Where candidate photos are written and served from.
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Mark cookies `Secure`; enable when served over HTTPS.
    pub secure_cookies: bool,
}

impl Config {
    pub fn new(key: Key, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            key,
            uploads_dir: uploads_dir.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            secure_cookies: false,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub config: Arc<Config>,
}

impl FromRef<ServerState> for Key {
    fn from_ref(state: &ServerState) -> Self {
        state.config.key.clone()
    }
}

pub fn router(state: ServerState) -> Router {
    let admin_pages = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/voters", get(admin::voters))
        .route(
            "/admin/elections",
            get(elections::list).post(elections::save),
        )
        .route("/admin/elections/delete", post(elections::delete))
        .route(
            "/admin/candidates",
            get(candidates::list).post(candidates::save),
        )
        .route("/admin/candidates/delete", post(candidates::delete))
        .route("/admin/position", get(positions::list).post(positions::save))
        .route("/admin/position/delete", post(positions::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_admin,
        ));

    let voter_pages = Router::new()
        .route("/voter/select", get(voter::select))
        .route("/voter/vote", get(voter::ballot))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_voter,
        ));

    let voter_api = Router::new()
        .route("/voter/submit_votes", post(voter::submit_votes))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_voter_json,
        ));

    Router::new()
        .route("/", get(voter::login_page).post(voter::login))
        .route(
            "/voter/register",
            get(voter::register_page).post(voter::register),
        )
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/logout", post(admin::logout))
        .merge(admin_pages)
        .merge(voter_pages)
        .merge(voter_api)
        .nest_service(
            "/static/uploads",
            ServeDir::new(state.config.uploads_dir.clone()),
        )
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    config: Config,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        config: Arc::new(config),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: Config,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
