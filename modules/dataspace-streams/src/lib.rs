//! Append-only stream collaborator contract.
//!
//! Streams are ordered logs of domain events, each linked to one graph vertex.
//! The stream engine lives elsewhere; `MemoryStreamStore` stands in for tests.

pub mod memory;
pub mod store;
pub mod types;

pub use memory::MemoryStreamStore;
pub use store::StreamStore;
pub use types::{AppendEntry, StreamAnnotation, StreamEntry};
