use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use dataspace_common::{CallerContext, ResourceRef, Vertex, VertexPatch};
use dataspace_graph::GraphStore;
use dataspace_streams::{StreamAnnotation, StreamStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub stream_id: String,
    pub created: bool,
}

/// Finds the stream linked to a vertex, or creates and links one.
/// At most one stream of `resource_type` per vertex.
#[derive(Clone)]
pub struct StreamResolver {
    graph: Arc<dyn GraphStore>,
    streams: Arc<dyn StreamStore>,
    resource_type: String,
}

impl StreamResolver {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        streams: Arc<dyn StreamStore>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            graph,
            streams,
            resource_type: resource_type.into(),
        }
    }

    pub async fn resolve(
        &self,
        vertex: &Vertex,
        consignment_id: &str,
        caller: &CallerContext,
    ) -> Result<ResolvedStream> {
        if let Some(existing) = vertex.resource_of_type(&self.resource_type) {
            info!(stream_id = %existing.id, vertex_id = %vertex.id, "Using existing stream");
            return Ok(ResolvedStream {
                stream_id: existing.id.clone(),
                created: false,
            });
        }

        let stream_id = self
            .streams
            .create(StreamAnnotation::for_consignment(consignment_id), caller)
            .await?;

        let mut resources = vertex.resources.clone();
        resources.push(ResourceRef {
            id: stream_id.clone(),
            resource_type: self.resource_type.clone(),
        });
        let patch = VertexPatch::new(&vertex.id)
            .with_annotation(vertex.annotation_object.clone())
            .with_resources(resources);
        self.graph.update(patch, caller).await?;

        info!(stream_id = %stream_id, vertex_id = %vertex.id, "Stream created and linked");
        Ok(ResolvedStream {
            stream_id,
            created: true,
        })
    }
}
