//! The graph store contract.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use dataspace_common::{CallerContext, NewVertex, Vertex, VertexPatch};

/// Equality predicate over a dotted property path of the serialized vertex,
/// e.g. `annotationObject.globalId = "urn:consignment:1"`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub property: String,
    pub value: Value,
}

impl PropertyFilter {
    pub fn equals(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Evaluate against a JSON document. Missing paths never match.
    pub fn matches(&self, document: &Value) -> bool {
        let mut current = document;
        for part in self.property.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => return false,
            }
        }
        *current == self.value
    }
}

/// Persistent vertex/edge storage.
///
/// Implemented by the remote auditable graph service and by
/// `MemoryGraphStore` (tests). Also implemented for `Arc<G>` so a store can
/// be shared with test assertions.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create a vertex and return its store-assigned id.
    async fn create(&self, vertex: NewVertex, caller: &CallerContext) -> Result<String>;

    /// Apply a partial update to an existing vertex.
    async fn update(&self, patch: VertexPatch, caller: &CallerContext) -> Result<()>;

    /// All vertices matching every filter, in store order.
    async fn query(&self, filters: &[PropertyFilter]) -> Result<Vec<Vertex>>;
}

#[async_trait]
impl<G: GraphStore + ?Sized> GraphStore for Arc<G> {
    async fn create(&self, vertex: NewVertex, caller: &CallerContext) -> Result<String> {
        (**self).create(vertex, caller).await
    }

    async fn update(&self, patch: VertexPatch, caller: &CallerContext) -> Result<()> {
        (**self).update(patch, caller).await
    }

    async fn query(&self, filters: &[PropertyFilter]) -> Result<Vec<Vertex>> {
        (**self).query(filters).await
    }
}
