//! DTPS announce relay library.
//!
//! Relays data payloads onto two ledgers on behalf of stored senders:
//! message-only transfers on the legacy (key-based) ledger, announced
//! through a health-checked node, and token sends on the new
//! (mnemonic-based) ledger, guarded by a balance check.

pub mod config;
pub mod health;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod relay;
pub mod store;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use ledger::{BroadcastResult, CosmosClient, LegacyClient};
pub use lifecycle::Shutdown;
pub use relay::{RelayError, RelayPipeline, RelayRequest, RequestShape};
