use crate::assets::serve_asset;
use crate::config::ServerConfig;
use crate::net::is_local_network;
use crate::room::RoomRegistry;
use crate::signaling::{Coordinator, SessionTable, ws_handler};
use anyhow::{Context, Result};
use audiosync_core::utils::WS_PATH;
use axum::Router;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub struct AppState {
    pub config: ServerConfig,
    pub sessions: Arc<SessionTable>,
    pub coordinator: Coordinator,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let sessions = Arc::new(SessionTable::new());
        let registry = Arc::new(RoomRegistry::new(config.code_attempts));
        let coordinator = Coordinator::new(registry, sessions.clone());

        Arc::new(Self {
            config,
            sessions,
            coordinator,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(WS_PATH, get(ws_handler))
        .fallback(serve_asset)
        .layer(middleware::from_fn_with_state(state.clone(), lan_guard))
        .with_state(state)
}

async fn lan_guard(
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let ip = remote_addr.ip();
    if !is_local_network(ip) {
        if state.config.lan_only {
            warn!("Blocked external connection from {}", ip);
            return (StatusCode::FORBIDDEN, "Access Denied: Local Network Only").into_response();
        }
        info!("External connection from {}", ip);
    }
    next.run(request).await
}

/// Binds the configured address and serves until the listener fails.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_on(listener, AppState::new(config)).await
}

pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Signaling server listening on http://{}", addr);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server terminated")
}
