//! Relay pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → request.rs (RelayRequest: authorization key + tagged shape)
//!     → pipeline.rs (lookups, preconditions, dispatch)
//!         - NewChain   → TokenLedger::validate_balance → send_tokens
//!         - Legacy     → LegacyLedger::send_transaction
//!         - PeerToPeer → LegacyLedger::send_transaction
//!     → error.rs (Rejection / RelayError → HTTP response)
//! ```

pub mod error;
pub mod pipeline;
pub mod request;

pub use error::{ErrorClass, Rejection, RelayError};
pub use pipeline::{PipelineSettings, RelayPipeline};
pub use request::{AnnounceBody, LegacyVariant, RelayRequest, RequestShape, TransferBody};
