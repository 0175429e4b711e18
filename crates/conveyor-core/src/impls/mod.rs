//! In-memory implementations of the ports (development and testing).

pub mod inmem_backend;
pub mod inmem_broker;

pub use inmem_backend::InMemoryBackend;
pub use inmem_broker::InMemoryBroker;
