//! Interactive HTTP API.
//!
//! # Routes
//! ```text
//! GET    /status
//! GET    /lookup/{address}?chain=
//! GET    /chats/{chat_id}/wallets
//! POST   /chats/{chat_id}/wallets            {address, chain}
//! DELETE /chats/{chat_id}/wallets/{address}
//! ```
//!
//! Every route requires `Authorization: Bearer <api.api_key>`.

pub mod auth;
pub mod error;
pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::service::WatchService;

use self::auth::api_key_auth;
use self::handlers::*;

pub use error::ApiError;

#[derive(Clone)]
pub struct ApiState {
    pub service: WatchService,
    pub api_key: Arc<str>,
}

pub fn router(service: WatchService, config: &ApiConfig) -> Router {
    let state = ApiState {
        service,
        api_key: Arc::from(config.api_key.as_str()),
    };

    Router::new()
        .route("/status", get(get_status))
        .route("/lookup/{address}", get(lookup_wallet))
        .route("/chats/{chat_id}/wallets", get(list_wallets).post(track_wallet))
        .route("/chats/{chat_id}/wallets/{address}", delete(untrack_wallet))
        .layer(middleware::from_fn_with_state(state.clone(), api_key_auth))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(address = %addr, "API server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}
