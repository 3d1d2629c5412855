//! Legacy node selection subsystem.
//!
//! # Data Flow
//! ```text
//! Announce requested
//!     → selector.rs (probe directory, pick first healthy node)
//!         - empty list → reuse last selected node
//!         - nothing ever selected → NoUsableNode
//!     → node.rs (NodeCandidate: URL + fixed network identity + repositories)
//!     → record URL as last selected node
//! ```
//!
//! # Design Decisions
//! - Deterministic first-healthy policy: no rotation, no randomization
//! - The last selected node is a lock-free cell shared across requests;
//!   concurrent requests may briefly read a stale value, which at worst
//!   reuses an older endpoint
//! - A candidate lives for one relay attempt

pub mod node;
pub mod selector;

pub use node::NodeCandidate;
pub use selector::{NodeSelector, SelectionSource};
