//! In-memory graph store.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use dataspace_common::{CallerContext, NewVertex, Vertex, VertexPatch};

use crate::store::{GraphStore, PropertyFilter};

/// One recorded call against the store, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCall {
    Create { vertex_id: String, user_identity: String },
    Update { vertex_id: String },
    Query { filters: Vec<PropertyFilter> },
}

/// Vertices kept in insertion order. Records every call for test assertions.
/// Thread-safe.
///
/// Update semantics: annotation fields are shallow-merged, edges appended,
/// resources upserted by id.
pub struct MemoryGraphStore {
    vertices: Mutex<Vec<Vertex>>,
    calls: Mutex<Vec<GraphCall>>,
    failure: Option<String>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self {
            vertices: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// A store whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Insert a vertex directly, bypassing call recording.
    pub fn seed(&self, vertex: Vertex) {
        self.vertices.lock().unwrap().push(vertex);
    }

    pub fn vertices(&self) -> Vec<Vertex> {
        self.vertices.lock().unwrap().clone()
    }

    pub fn vertex(&self, id: &str) -> Option<Vertex> {
        self.vertices
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned()
    }

    pub fn calls(&self) -> Vec<GraphCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GraphCall::Create { .. }))
            .count()
    }

    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GraphCall::Update { .. }))
            .count()
    }

    fn record(&self, call: GraphCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self) -> Result<()> {
        if let Some(message) = &self.failure {
            bail!("graph store unavailable: {message}");
        }
        Ok(())
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn create(&self, vertex: NewVertex, caller: &CallerContext) -> Result<String> {
        self.check_failure()?;
        let id = format!("aig:{}", uuid::Uuid::new_v4().simple());
        self.vertices.lock().unwrap().push(Vertex {
            id: id.clone(),
            annotation_object: Some(vertex.annotation_object),
            edges: Vec::new(),
            resources: Vec::new(),
        });
        self.record(GraphCall::Create {
            vertex_id: id.clone(),
            user_identity: caller.user_identity.clone(),
        });
        Ok(id)
    }

    async fn update(&self, patch: VertexPatch, _caller: &CallerContext) -> Result<()> {
        self.check_failure()?;
        {
            let mut vertices = self.vertices.lock().unwrap();
            let Some(vertex) = vertices.iter_mut().find(|v| v.id == patch.id) else {
                bail!("vertex {} does not exist", patch.id);
            };

            if let Some(annotation) = &patch.annotation_object {
                match &mut vertex.annotation_object {
                    Some(existing) => existing.merge(annotation),
                    None => vertex.annotation_object = Some(annotation.clone()),
                }
            }

            vertex.edges.extend(patch.edges.iter().cloned());

            for resource in &patch.resources {
                match vertex.resources.iter_mut().find(|r| r.id == resource.id) {
                    Some(existing) => *existing = resource.clone(),
                    None => vertex.resources.push(resource.clone()),
                }
            }
        }
        self.record(GraphCall::Update {
            vertex_id: patch.id,
        });
        Ok(())
    }

    async fn query(&self, filters: &[PropertyFilter]) -> Result<Vec<Vertex>> {
        self.check_failure()?;
        let matches = {
            let vertices = self.vertices.lock().unwrap();
            let mut matches = Vec::new();
            for vertex in vertices.iter() {
                let document = serde_json::to_value(vertex)?;
                if filters.iter().all(|f| f.matches(&document)) {
                    matches.push(vertex.clone());
                }
            }
            matches
        };
        self.record(GraphCall::Query {
            filters: filters.to_vec(),
        });
        Ok(matches)
    }
}
