use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::ApiState;
use crate::service::WalletInfo;
use crate::tracker::Chain;
use crate::watch::{ChatId, TrackedWallet};

#[derive(Serialize)]
pub struct ServiceStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub tracked_wallets: usize,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub chain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub address: String,
    /// Optional when the address format identifies a single chain.
    #[serde(default)]
    pub chain: Option<String>,
}

fn parse_chain(raw: Option<&str>) -> Result<Option<Chain>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Ok(Some(raw.parse()?)),
        None => Ok(None),
    }
}

pub async fn get_status(State(state): State<ApiState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        tracked_wallets: state.service.registry().len(),
    })
}

pub async fn lookup_wallet(
    State(state): State<ApiState>,
    Path(address): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<WalletInfo>, ApiError> {
    let address = address.trim();
    let requested = parse_chain(query.chain.as_deref())?;
    let chain = state.service.resolve_chain(address, requested)?;
    let info = state.service.lookup(address, chain).await?;
    Ok(Json(info))
}

pub async fn list_wallets(
    State(state): State<ApiState>,
    Path(chat_id): Path<ChatId>,
) -> Json<Vec<TrackedWallet>> {
    Json(state.service.registry().list(chat_id))
}

pub async fn track_wallet(
    State(state): State<ApiState>,
    Path(chat_id): Path<ChatId>,
    Json(request): Json<TrackRequest>,
) -> Result<(StatusCode, Json<TrackedWallet>), ApiError> {
    let address = request.address.trim();
    let requested = parse_chain(request.chain.as_deref())?;
    let chain = state.service.resolve_chain(address, requested)?;

    let registry = state.service.registry();
    if !registry.add(chat_id, address, chain).await? {
        return Err(ApiError::AlreadyTracked(address.to_string()));
    }

    // Seeding may have set the cursor; report the stored entry.
    let wallet = registry
        .list(chat_id)
        .into_iter()
        .find(|w| w.is(chat_id, address, chain))
        .unwrap_or_else(|| TrackedWallet::new(chat_id, address, chain));
    Ok((StatusCode::CREATED, Json(wallet)))
}

pub async fn untrack_wallet(
    State(state): State<ApiState>,
    Path((chat_id, address)): Path<(ChatId, String)>,
) -> Result<StatusCode, ApiError> {
    if state.service.registry().remove(chat_id, address.trim()) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotTracked(address))
    }
}
