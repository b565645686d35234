//! Lookup-or-create of vertices keyed by `globalId`, and edge attachment.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use dataspace_common::vocab::GLOBAL_ID_PROPERTY;
use dataspace_common::{CallerContext, Edge, NewVertex, Node, Vertex, VertexPatch};

use crate::store::{GraphStore, PropertyFilter};

/// Result of a find-or-create. `existing` is the vertex as it was before this
/// call, or `None` when a new vertex was created.
#[derive(Debug, Clone)]
pub struct Materialized {
    pub vertex_id: String,
    pub existing: Option<Vertex>,
}

impl Materialized {
    pub fn created(&self) -> bool {
        self.existing.is_none()
    }
}

#[derive(Clone)]
pub struct VertexMaterializer {
    graph: Arc<dyn GraphStore>,
    dedupe_edges: bool,
}

impl VertexMaterializer {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self {
            graph,
            dedupe_edges: false,
        }
    }

    /// Skip appending an edge the vertex already carries.
    pub fn with_edge_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe_edges = dedupe;
        self
    }

    pub fn dedupes_edges(&self) -> bool {
        self.dedupe_edges
    }

    pub fn graph(&self) -> &Arc<dyn GraphStore> {
        &self.graph
    }

    /// Create a vertex wrapping `node`. No existence check.
    pub async fn create_vertex(&self, node: &Node, caller: &CallerContext) -> Result<String> {
        let vertex_id = self
            .graph
            .create(NewVertex::wrapping(node.clone()), caller)
            .await?;
        info!(vertex_id = %vertex_id, node_type = %node.type_label(), "Vertex created");
        Ok(vertex_id)
    }

    /// First vertex whose annotation carries `global_id`, in store order.
    pub async fn find_by_global_id(&self, global_id: &str) -> Result<Option<Vertex>> {
        let filter = PropertyFilter::equals(GLOBAL_ID_PROPERTY, global_id);
        let mut results = self.graph.query(std::slice::from_ref(&filter)).await?;
        if results.is_empty() {
            return Ok(None);
        }
        Ok(Some(results.swap_remove(0)))
    }

    /// Find the vertex for `node.globalId`, creating one if none exists.
    pub async fn find_or_create(&self, node: &Node, caller: &CallerContext) -> Result<Materialized> {
        let global_id = node
            .global_id()
            .ok_or_else(|| anyhow!("node of type {} has no globalId", node.type_label()))?;

        match self.find_by_global_id(global_id).await? {
            Some(vertex) => {
                info!(vertex_id = %vertex.id, global_id, "Existing vertex found");
                Ok(Materialized {
                    vertex_id: vertex.id.clone(),
                    existing: Some(vertex),
                })
            }
            None => {
                let vertex_id = self.create_vertex(node, caller).await?;
                info!(vertex_id = %vertex_id, global_id, "New vertex for globalId created");
                Ok(Materialized {
                    vertex_id,
                    existing: None,
                })
            }
        }
    }

    /// Vertex for a node about to become an edge target.
    ///
    /// With edge dedupe on, a node carrying `globalId` resolves to its
    /// existing vertex, so resending it produces the same edge. Otherwise
    /// every call creates a new vertex.
    pub async fn materialize_edge_target(
        &self,
        node: &Node,
        caller: &CallerContext,
    ) -> Result<Materialized> {
        if self.dedupe_edges && node.global_id().is_some() {
            return self.find_or_create(node, caller).await;
        }
        let vertex_id = self.create_vertex(node, caller).await?;
        Ok(Materialized {
            vertex_id,
            existing: None,
        })
    }

    /// Append `edge` to `vertex_id`, resubmitting `annotation` for merge.
    ///
    /// `current` is the vertex as last read, used for dedupe. Returns `false`
    /// when dedupe is on and an identical edge is already present.
    pub async fn attach_edge(
        &self,
        vertex_id: &str,
        current: Option<&Vertex>,
        annotation: Option<Node>,
        edge: Edge,
        caller: &CallerContext,
    ) -> Result<bool> {
        if self.dedupe_edges && current.is_some_and(|v| v.has_edge(&edge)) {
            info!(vertex_id, target_id = %edge.target_id, "Identical edge present, skipping");
            return Ok(false);
        }

        let target_id = edge.target_id.clone();
        let patch = VertexPatch::new(vertex_id)
            .with_annotation(annotation)
            .with_edge(edge);
        self.graph.update(patch, caller).await?;
        info!(vertex_id, target_id = %target_id, "Edge attached");
        Ok(true)
    }
}
