//! Shared utilities for integration tests.
//!
//! Mock servers bind `127.0.0.1:0` so tests can run in parallel.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use prost::Message;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use dtps_relay::config::RelayConfig;
use dtps_relay::ledger::cosmos::proto::{
    Any, BaseAccount, Coin, QueryAccountResponse, QueryBalanceResponse, TxRaw,
    ACCOUNT_QUERY_PATH, BALANCE_QUERY_PATH, BASE_ACCOUNT_TYPE_URL,
};
use dtps_relay::ledger::legacy::{LegacyAccount, NetworkType};
use dtps_relay::store::MemoryStore;

pub const SENDER_PRIVATE_KEY: &str =
    "575DBB3062267EFF57C970A336EBBC8FBCFE12C5BD3ED7BC11EB0481D7704CED";
pub const ENTITY_PRIVATE_KEY: &str =
    "3333333333333333333333333333333333333333333333333333333333333333";
pub const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const CHAIN_ID: &str = "dhealth-test";

pub const LEGACY_CODE: &str = "legacy-code";
pub const COSMOS_CODE: &str = "cosmos-code";
pub const CLIENT_IP: &str = "10.0.0.7";

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Legacy address of a hex private key on main net.
pub fn legacy_address(private_key: &str) -> String {
    LegacyAccount::from_private_key(private_key, NetworkType::MAIN_NET)
        .unwrap()
        .address()
        .plain()
}

/// Directory service and legacy node in one server.
///
/// The directory lists `hosts`; every host resolves to this same server
/// through the configured node port.
#[derive(Clone, Default)]
pub struct MockLegacyNetwork {
    pub hosts: Arc<Mutex<Vec<String>>>,
    pub announced: Arc<Mutex<Vec<String>>>,
    pub announce_delay: Arc<Mutex<Duration>>,
}

impl MockLegacyNetwork {
    pub fn set_hosts(&self, hosts: &[&str]) {
        *self.hosts.lock().unwrap() = hosts.iter().map(|h| h.to_string()).collect();
    }

    /// Hold every announce for `delay` before accepting it.
    pub fn set_announce_delay(&self, delay: Duration) {
        *self.announce_delay.lock().unwrap() = delay;
    }

    pub fn announced(&self) -> Vec<String> {
        self.announced.lock().unwrap().clone()
    }
}

pub async fn start_legacy_network(mock: MockLegacyNetwork) -> SocketAddr {
    let router = Router::new()
        .route("/network/nodes", get(directory_nodes))
        .route("/transactions", put(announce))
        .route("/node/health", get(|| async {
            Json(json!({ "status": { "apiNode": "up", "db": "up" } }))
        }))
        .route("/chain/info", get(|| async {
            Json(json!({ "height": "1200", "latestFinalizedBlock": { "height": "1180" } }))
        }))
        .with_state(mock);
    serve(router).await
}

async fn directory_nodes(State(mock): State<MockLegacyNetwork>) -> Json<Value> {
    let hosts = mock.hosts.lock().unwrap().clone();
    let data: Vec<Value> = hosts.iter().map(|h| json!({ "host": h })).collect();
    Json(json!({ "data": data }))
}

async fn announce(
    State(mock): State<MockLegacyNetwork>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let payload = body["payload"].as_str().unwrap_or_default().to_string();
    let delay = *mock.announce_delay.lock().unwrap();
    tokio::time::sleep(delay).await;
    mock.announced.lock().unwrap().push(payload);
    (
        StatusCode::ACCEPTED,
        Json(json!({ "message": "packet 9 was pushed to the network via /transactions" })),
    )
}

/// Tendermint JSON-RPC endpoint.
#[derive(Clone)]
pub struct MockTendermint {
    pub balance: Arc<Mutex<u128>>,
    pub broadcasts: Arc<Mutex<Vec<TxRaw>>>,
}

impl MockTendermint {
    pub fn with_balance(balance: u128) -> Self {
        Self {
            balance: Arc::new(Mutex::new(balance)),
            broadcasts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn broadcasts(&self) -> Vec<TxRaw> {
        self.broadcasts.lock().unwrap().clone()
    }
}

pub async fn start_tendermint(mock: MockTendermint) -> SocketAddr {
    let router = Router::new().route("/", post(rpc)).with_state(mock);
    serve(router).await
}

async fn rpc(State(mock): State<MockTendermint>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let params = &request["params"];
    let result = match request["method"].as_str().unwrap_or_default() {
        "status" => json!({ "node_info": { "network": CHAIN_ID } }),
        "abci_query" => {
            let value = match params["path"].as_str().unwrap_or_default() {
                BALANCE_QUERY_PATH => QueryBalanceResponse {
                    balance: Some(Coin::new(*mock.balance.lock().unwrap(), "udhp")),
                }
                .encode_to_vec(),
                ACCOUNT_QUERY_PATH => QueryAccountResponse {
                    account: Some(Any::pack(
                        BASE_ACCOUNT_TYPE_URL,
                        &BaseAccount {
                            address: String::new(),
                            pub_key: None,
                            account_number: 5,
                            sequence: mock.broadcasts.lock().unwrap().len() as u64,
                        },
                    )),
                }
                .encode_to_vec(),
                other => {
                    return Json(json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": -32602, "message": format!("unknown path {}", other) }
                    }))
                }
            };
            json!({ "response": { "code": 0, "log": "", "value": STANDARD.encode(value) } })
        }
        "broadcast_tx_commit" => {
            let bytes = STANDARD
                .decode(params["tx"].as_str().unwrap_or_default())
                .unwrap();
            let hash = hex::encode_upper(Sha256::digest(&bytes));
            mock.broadcasts
                .lock()
                .unwrap()
                .push(TxRaw::decode(bytes.as_slice()).unwrap());
            json!({
                "check_tx": { "code": 0, "log": "" },
                "tx_result": { "code": 0, "log": "" },
                "hash": hash,
                "height": "42"
            })
        }
        other => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("method {} not found", other) }
            }))
        }
    };
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

/// Config pointing both ledgers at the mocks.
pub fn relay_config(legacy: SocketAddr, tendermint: SocketAddr) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.legacy.directory_url = format!("http://{}", legacy);
    config.legacy.node_port = legacy.port();
    config.cosmos.rpc_url = format!("http://{}", tendermint);
    config
}

/// Store with one legacy sender, one new-ledger sender, a peer entity,
/// recipient configs and the auth policy.
pub fn seeded_store(cosmos_sender_address: &str) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(
        "entities",
        LEGACY_CODE,
        json!({ "privateKey": SENDER_PRIVATE_KEY, "production": false }),
    );
    store.insert(
        "entities",
        "peer-entity",
        json!({ "privateKey": ENTITY_PRIVATE_KEY, "production": true }),
    );
    store.insert(
        "entities",
        COSMOS_CODE,
        json!({ "mnemonic": MNEMONIC, "address": cosmos_sender_address, "production": true }),
    );
    store.insert(
        "configs",
        "broadcastRecipient",
        json!({
            "production": legacy_address(&"11".repeat(32)),
            "staging": legacy_address(&"22".repeat(32)),
        }),
    );
    store.insert(
        "configs",
        "legacyBroadcastRecipient",
        json!({
            "production": legacy_address(&"44".repeat(32)),
            "staging": legacy_address(&"55".repeat(32)),
        }),
    );
    store.insert(
        "configs",
        "newBroadcastRecipient",
        json!({
            "production": cosmos_sender_address,
            "staging": cosmos_sender_address,
        }),
    );
    store.insert(
        "configs",
        "auth",
        json!({ "whitelist": [CLIENT_IP], "codes": [LEGACY_CODE, COSMOS_CODE] }),
    );
    store
}
