//! Node health discovery.
//!
//! # Data Flow
//! ```text
//! NodeSelector
//!     → probe.rs (ask the directory service for nodes whose API and
//!       database are both "up")
//!     → ordered list of node URLs, as returned by the directory
//! ```
//!
//! # Design Decisions
//! - The directory is the source of truth; nodes are not probed one by one
//! - Directory order is preserved, never re-sorted
//! - No retry at this layer; transport errors propagate

pub mod probe;

pub use probe::{DirectoryProbe, NodeHealthProbe, ProbeError};
