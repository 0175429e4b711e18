//! Ports: the pluggable seams of the core.
//!
//! - [`Broker`]: ordered message transport (publish/consume).
//! - [`ResultBackend`]: (state, outcome) store keyed by task id.
//!
//! In-memory implementations live in [`crate::impls`]; anything satisfying
//! these contracts can be substituted.

pub mod backend;
pub mod broker;

pub use backend::ResultBackend;
pub use broker::Broker;
