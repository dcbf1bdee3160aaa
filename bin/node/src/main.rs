//! Deposit ledger node
//!
//! A minimal service that:
//! - Owns a single in-memory deposit ledger
//! - Accepts deposits via HTTP and timestamps them on acceptance
//! - Serves the current root, branch proofs, and ledger status
//! - Keeps a bounded ring of recent deposit events for pollers

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State as AxumState},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use deposit_core::{
    ChainStartEvent, DepositEvent, DepositLedger, LedgerError, RecordingSink,
};

/// Node configuration
#[derive(Clone)]
struct Config {
    rpc_addr: String,
    chain_start_threshold: u64,
    max_recent_events: usize,
}

impl Default for Config {
    fn default() -> Self {
        let chain_start_threshold = std::env::var("CHAIN_START_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(16384);
        let max_recent_events = std::env::var("MAX_RECENT_EVENTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1024);

        Self {
            rpc_addr: std::env::var("RPC_ADDR").unwrap_or_else(|_| "0.0.0.0:8547".to_string()),
            chain_start_threshold,
            max_recent_events,
        }
    }
}

/// Shared node state
struct NodeState {
    /// The ledger itself; all writes go through this lock
    ledger: DepositLedger,
    /// Recent deposit events, oldest first
    recent_events: VecDeque<DepositEvent>,
    /// The chain-start event, once it has fired
    chain_start: Option<ChainStartEvent>,
    /// Config
    config: Config,
}

impl NodeState {
    fn new(config: Config) -> Self {
        Self {
            ledger: DepositLedger::new(config.chain_start_threshold),
            recent_events: VecDeque::new(),
            chain_start: None,
            config,
        }
    }

    fn record_events(&mut self, sink: RecordingSink) {
        for event in sink.deposits {
            if self.recent_events.len() >= self.config.max_recent_events {
                self.recent_events.pop_front();
            }
            self.recent_events.push_back(event);
        }
        if let Some(event) = sink.chain_start {
            info!(
                "Chain start signaled: root={}, time={}",
                hex::encode(event.root),
                u64::from_be_bytes(event.time)
            );
            self.chain_start = Some(event);
        }
    }
}

type SharedState = Arc<RwLock<NodeState>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting deposit ledger node...");

    let config = Config::default();
    info!("  Chain start threshold: {}", config.chain_start_threshold);
    info!("  Recent event buffer: {}", config.max_recent_events);

    let rpc_addr = config.rpc_addr.clone();
    let state = Arc::new(RwLock::new(NodeState::new(config)));

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/deposit", post(submit_deposit))
        .route("/root", get(get_root))
        .route("/branch/:index", get(get_branch))
        .route("/status", get(get_status))
        .route("/events", get(get_events))
        .with_state(state);

    info!("RPC server listening on {}", rpc_addr);
    let listener = tokio::net::TcpListener::bind(&rpc_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check endpoint
async fn health() -> &'static str {
    "ok"
}

/// Deposit submission body
#[derive(Deserialize)]
struct DepositRequest {
    /// Amount in gwei
    amount_gwei: u64,
    /// Hex-encoded opaque deposit input
    #[serde(default)]
    data: String,
}

#[derive(Serialize)]
struct DepositResponse {
    leaf_index: u64,
    root: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
}

fn ledger_error(err: LedgerError) -> ApiError {
    let status = match err {
        LedgerError::CapacityExhausted => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Accept a deposit. The node supplies the acceptance timestamp; the
/// environment submitting the request is trusted for the amount.
async fn submit_deposit(
    AxumState(state): AxumState<SharedState>,
    Json(req): Json<DepositRequest>,
) -> Result<Json<DepositResponse>, ApiError> {
    let input = hex::decode(req.data.trim_start_matches("0x"))
        .map_err(|e| bad_request(format!("invalid hex data: {e}")))?;

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let mut node_state = state.write().unwrap();
    let mut sink = RecordingSink::default();

    match node_state
        .ledger
        .deposit(req.amount_gwei, timestamp, input, &mut sink)
    {
        Ok(leaf_index) => {
            info!(
                "Deposit {} accepted: amount={} gwei, root={}",
                leaf_index,
                req.amount_gwei,
                hex::encode(&node_state.ledger.get_root()[..4]),
            );
            node_state.record_events(sink);
            Ok(Json(DepositResponse {
                leaf_index,
                root: hex::encode(node_state.ledger.get_root()),
            }))
        }
        Err(err) => {
            warn!("Deposit rejected: {err}");
            Err(ledger_error(err))
        }
    }
}

#[derive(Serialize)]
struct RootResponse {
    root: String,
}

async fn get_root(AxumState(state): AxumState<SharedState>) -> Json<RootResponse> {
    let node_state = state.read().unwrap();
    Json(RootResponse {
        root: hex::encode(node_state.ledger.get_root()),
    })
}

#[derive(Serialize)]
struct BranchResponse {
    leaf_index: u64,
    branch: Vec<String>,
}

async fn get_branch(
    AxumState(state): AxumState<SharedState>,
    Path(index): Path<u64>,
) -> Result<Json<BranchResponse>, ApiError> {
    let node_state = state.read().unwrap();
    let branch = node_state
        .ledger
        .get_branch(index)
        .map_err(ledger_error)?;

    Ok(Json(BranchResponse {
        leaf_index: index,
        branch: branch.iter().map(hex::encode).collect(),
    }))
}

#[derive(Serialize)]
struct StatusResponse {
    deposit_count: u64,
    full_deposit_count: u64,
    chain_start_threshold: u64,
    chain_started: bool,
    root: String,
}

async fn get_status(AxumState(state): AxumState<SharedState>) -> Json<StatusResponse> {
    let node_state = state.read().unwrap();
    Json(StatusResponse {
        deposit_count: node_state.ledger.deposit_count(),
        full_deposit_count: node_state.ledger.full_deposit_count(),
        chain_start_threshold: node_state.ledger.chain_start_threshold(),
        chain_started: node_state.ledger.chain_started(),
        root: hex::encode(node_state.ledger.get_root()),
    })
}

/// Deposit event in wire form
#[derive(Serialize)]
struct DepositEventJson {
    previous_root: String,
    data: String,
    merkle_tree_index: String,
}

#[derive(Serialize)]
struct ChainStartEventJson {
    root: String,
    time: String,
}

#[derive(Serialize)]
struct EventsResponse {
    deposits: Vec<DepositEventJson>,
    chain_start: Option<ChainStartEventJson>,
}

async fn get_events(AxumState(state): AxumState<SharedState>) -> Json<EventsResponse> {
    let node_state = state.read().unwrap();
    Json(EventsResponse {
        deposits: node_state
            .recent_events
            .iter()
            .map(|event| DepositEventJson {
                previous_root: hex::encode(event.previous_root),
                data: hex::encode(&event.data),
                merkle_tree_index: hex::encode(event.merkle_tree_index),
            })
            .collect(),
        chain_start: node_state
            .chain_start
            .as_ref()
            .map(|event| ChainStartEventJson {
                root: hex::encode(event.root),
                time: hex::encode(event.time),
            }),
    })
}
