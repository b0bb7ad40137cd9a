// tests/common/mod.rs
// Stub seed node and validator peers for integration tests, served from
// axum routers bound to ephemeral ports.
#![allow(dead_code)]

use axum::extract::Json;
use axum::http::StatusCode;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use gateway_node::types::PeerInfo;
use serde_json::{json, Value as JsonValue};
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bind an ephemeral port and serve the router on it.
pub fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    listener
        .set_nonblocking(true)
        .expect("set stub listener nonblocking");
    let addr = listener.local_addr().expect("stub listener addr");
    let server = axum::Server::from_tcp(listener)
        .expect("build stub server")
        .serve(router.into_make_service());
    tokio::spawn(server);
    addr
}

/// An address nothing listens on (bound once, then released).
pub fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe listener addr");
    drop(listener);
    format!("127.0.0.1:{}", addr.port())
}

/// Poll `cond` until it holds or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Switches and counters shared with a stub seed node.
#[derive(Default)]
pub struct SeedStub {
    pub ping_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub fail_ping: AtomicBool,
    pub fail_register: AtomicBool,
    pub already_registered: AtomicBool,
    pub fail_nodes: AtomicBool,
    pub nodes: Mutex<JsonValue>,
    pub last_registered: Mutex<Option<String>>,
}

impl SeedStub {
    pub fn new(nodes: JsonValue) -> Arc<Self> {
        let stub = Self::default();
        *stub.nodes.lock().unwrap() = nodes;
        Arc::new(stub)
    }

    pub fn set_nodes(&self, nodes: JsonValue) {
        *self.nodes.lock().unwrap() = nodes;
    }
}

pub fn seed_router(stub: Arc<SeedStub>) -> Router {
    let ping_stub = stub.clone();
    let register_stub = stub.clone();
    let nodes_stub = stub.clone();
    let active_stub = stub;

    Router::new()
        .route(
            "/ping",
            get(move || {
                let stub = ping_stub.clone();
                async move {
                    stub.ping_calls.fetch_add(1, Ordering::SeqCst);
                    if stub.fail_ping.load(Ordering::SeqCst) {
                        StatusCode::INTERNAL_SERVER_ERROR
                    } else {
                        StatusCode::OK
                    }
                }
            }),
        )
        .route(
            "/register",
            post(move |Json(address): Json<String>| {
                let stub = register_stub.clone();
                async move {
                    stub.register_calls.fetch_add(1, Ordering::SeqCst);
                    *stub.last_registered.lock().unwrap() = Some(address);
                    if stub.fail_register.load(Ordering::SeqCst) {
                        StatusCode::CONFLICT
                    } else if stub.already_registered.load(Ordering::SeqCst) {
                        StatusCode::OK
                    } else {
                        StatusCode::CREATED
                    }
                }
            }),
        )
        .route(
            "/nodes",
            get(move || {
                let stub = nodes_stub.clone();
                async move {
                    if stub.fail_nodes.load(Ordering::SeqCst) {
                        Err(StatusCode::INTERNAL_SERVER_ERROR)
                    } else {
                        Ok(Json(stub.nodes.lock().unwrap().clone()))
                    }
                }
            }),
        )
        .route(
            "/nodes/active",
            get(move || {
                let stub = active_stub.clone();
                async move {
                    let listing = stub.nodes.lock().unwrap().clone();
                    let active: Vec<JsonValue> = listing
                        .as_array()
                        .map(|nodes| {
                            nodes
                                .iter()
                                .filter(|n| n["isResponding"] == json!(true))
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();
                    Json(JsonValue::Array(active))
                }
            }),
        )
}

/// Switches and recordings shared with a stub validator.
#[derive(Default)]
pub struct ValidatorStub {
    pub ping_calls: AtomicUsize,
    pub fail_ping: AtomicBool,
    pub fail_requests: AtomicBool,
    pub delay_ms: AtomicU64,
    /// (path, body) pairs in arrival order
    pub requests: Mutex<Vec<(String, JsonValue)>>,
}

impl ValidatorStub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recorded(&self) -> Vec<(String, JsonValue)> {
        self.requests.lock().unwrap().clone()
    }
}

fn work_route(stub: Arc<ValidatorStub>, path: &'static str) -> MethodRouter {
    post(move |Json(body): Json<JsonValue>| {
        let stub = stub.clone();
        async move {
            let delay = stub.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            stub.requests.lock().unwrap().push((path.to_string(), body));
            if stub.fail_requests.load(Ordering::SeqCst) {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "accepted": false })),
                )
            } else {
                (StatusCode::OK, Json(json!({ "accepted": true })))
            }
        }
    })
}

fn query_route(stub: Arc<ValidatorStub>, payload: JsonValue) -> MethodRouter {
    get(move || {
        let stub = stub.clone();
        let payload = payload.clone();
        async move {
            let delay = stub.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if stub.fail_requests.load(Ordering::SeqCst) {
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            } else {
                Ok(Json(payload))
            }
        }
    })
}

pub fn validator_router(stub: Arc<ValidatorStub>) -> Router {
    let ping_stub = stub.clone();
    let chain_status = json!({
        "height": 42,
        "lastBlockHash": "0xabc123",
        "difficulty": 3,
        "totalTransactions": 99
    });
    let mempool_status = json!({
        "pendingTransactions": 7,
        "totalSize": 1024,
        "oldestTransaction": "2026-01-01T00:00:00Z"
    });

    Router::new()
        .route(
            "/ping",
            get(move || {
                let stub = ping_stub.clone();
                async move {
                    stub.ping_calls.fetch_add(1, Ordering::SeqCst);
                    if stub.fail_ping.load(Ordering::SeqCst) {
                        StatusCode::INTERNAL_SERVER_ERROR
                    } else {
                        StatusCode::OK
                    }
                }
            }),
        )
        .route("/tx", work_route(stub.clone(), "/tx"))
        .route("/tx/batch", work_route(stub.clone(), "/tx/batch"))
        .route("/critical", work_route(stub.clone(), "/critical"))
        .route(
            "/status/tx",
            query_route(stub.clone(), chain_status.clone()),
        )
        .route("/status/critical", query_route(stub.clone(), chain_status))
        .route(
            "/mempool/tx",
            query_route(stub.clone(), mempool_status.clone()),
        )
        .route("/mempool/critical", query_route(stub, mempool_status))
}

/// Start a stub validator, returning its shared state and address.
pub fn spawn_validator() -> (Arc<ValidatorStub>, String) {
    let stub = ValidatorStub::new();
    let addr = spawn_server(validator_router(stub.clone()));
    (stub, addr.to_string())
}

/// Directory record for a validator at `address`, as the seed would list it.
pub fn validator_peer(address: &str) -> PeerInfo {
    PeerInfo {
        address: address.to_string(),
        node_type: "validator".to_string(),
        last_seen: None,
        is_responding: true,
        version: None,
    }
}

/// Seed-listing JSON entry.
pub fn listing_entry(address: &str, node_type: &str, responding: bool) -> JsonValue {
    json!({
        "address": address,
        "nodeType": node_type,
        "lastSeen": "2026-01-01T00:00:00Z",
        "isResponding": responding,
        "version": "0.1.0"
    })
}
