// src/api.rs
// Axum router exposing node status and the broadcast operations. Handlers
// are thin request/response mapping; all behavior lives in the core
// components.
use crate::broadcast::BroadcastSummary;
use crate::error::GatewayError;
use crate::node::{GatewayNode, NodeStatus};
use crate::types::{CriticalProcess, PeerInfo, RequestClass, Transaction, TransactionBatch};
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

type ApiError = (StatusCode, Json<JsonValue>);

pub fn router(node: Arc<GatewayNode>) -> Router {
    Router::new()
        .route("/status", get(node_status))
        .route("/peers", get(list_peers))
        .route("/peers/active", get(list_active_peers))
        .route("/peers/refresh", post(refresh_peers))
        .route("/peers/ping", get(ping_peer))
        .route("/broadcast/tx", post(broadcast_tx))
        .route("/broadcast/tx/batch", post(broadcast_batch))
        .route("/broadcast/critical", post(broadcast_critical))
        .route("/network/status/:class", get(network_status))
        .route("/network/mempool/:class", get(network_mempool))
        .layer(Extension(node))
}

fn internal_error(e: GatewayError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

#[derive(Serialize)]
struct PeerList {
    peers: Vec<PeerInfo>,
}

async fn node_status(Extension(node): Extension<Arc<GatewayNode>>) -> Json<NodeStatus> {
    Json(node.status())
}

async fn list_peers(Extension(node): Extension<Arc<GatewayNode>>) -> Json<PeerList> {
    Json(PeerList {
        peers: node.peers(),
    })
}

async fn list_active_peers(Extension(node): Extension<Arc<GatewayNode>>) -> Json<PeerList> {
    Json(PeerList {
        peers: node.active_peers(),
    })
}

async fn refresh_peers(
    Extension(node): Extension<Arc<GatewayNode>>,
) -> Result<Json<PeerList>, ApiError> {
    match node.refresh_peers().await {
        Ok(peers) => Ok(Json(PeerList { peers })),
        Err(e) => Err((
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

#[derive(Deserialize)]
struct PingParams {
    address: String,
}

async fn ping_peer(
    Extension(node): Extension<Arc<GatewayNode>>,
    Query(params): Query<PingParams>,
) -> Json<JsonValue> {
    let alive = node.ping_peer(&params.address).await;
    Json(json!({ "address": params.address, "alive": alive }))
}

async fn broadcast_tx(
    Extension(node): Extension<Arc<GatewayNode>>,
    Json(tx): Json<Transaction>,
) -> Result<Json<BroadcastSummary>, ApiError> {
    node.broadcast_transaction(&tx)
        .await
        .map(Json)
        .map_err(internal_error)
}

async fn broadcast_batch(
    Extension(node): Extension<Arc<GatewayNode>>,
    Json(batch): Json<TransactionBatch>,
) -> Result<Json<BroadcastSummary>, ApiError> {
    node.broadcast_batch(&batch)
        .await
        .map(Json)
        .map_err(internal_error)
}

async fn broadcast_critical(
    Extension(node): Extension<Arc<GatewayNode>>,
    Json(process): Json<CriticalProcess>,
) -> Result<Json<BroadcastSummary>, ApiError> {
    node.broadcast_critical(&process)
        .await
        .map(Json)
        .map_err(internal_error)
}

fn parse_class(raw: &str) -> Result<RequestClass, ApiError> {
    raw.parse::<RequestClass>().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
    })
}

async fn network_status(
    Extension(node): Extension<Arc<GatewayNode>>,
    Path(class): Path<String>,
) -> Result<Json<BroadcastSummary>, ApiError> {
    let class = parse_class(&class)?;
    Ok(Json(node.query_status(class).await))
}

async fn network_mempool(
    Extension(node): Extension<Arc<GatewayNode>>,
    Path(class): Path<String>,
) -> Result<Json<BroadcastSummary>, ApiError> {
    let class = parse_class(&class)?;
    Ok(Json(node.query_mempool(class).await))
}
