//! Graph collaborator contract and the vertex/edge materializer.
//!
//! The graph engine itself lives elsewhere; this crate only states what the
//! connector needs from it (`GraphStore`), ships an in-memory implementation
//! for tests and local runs, and layers lookup-or-create on top.

pub mod materializer;
pub mod memory;
pub mod store;

pub use materializer::{Materialized, VertexMaterializer};
pub use memory::{GraphCall, MemoryGraphStore};
pub use store::{GraphStore, PropertyFilter};
