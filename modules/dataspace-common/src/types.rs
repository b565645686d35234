use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::type_match::is_type_match;
use crate::vocab;

// --- Activity ---

/// An activity-stream record: an `actor` performing `type` on `object`,
/// optionally relative to `target`.
///
/// `object`, `target` and `published` are kept as raw JSON so that malformed
/// payloads surface as validation errors at the dispatcher, not as decode
/// failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub actor: Value,
    #[serde(default)]
    pub object: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    pub fn new(activity_type: impl Into<String>, actor_id: &str, object: Value) -> Self {
        Self {
            context: None,
            activity_type: activity_type.into(),
            actor: serde_json::json!({ "id": actor_id }),
            object,
            target: None,
            published: Some(Value::String(
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            generator: None,
            extra: Map::new(),
        }
    }

    pub fn with_target(mut self, target: Value) -> Self {
        self.target = Some(target);
        self
    }

    /// `published` as a timestamp. `None` when absent or not RFC 3339.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published.as_ref()?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// The actor's identifier, whether `actor` is an object with `id` or a bare IRI.
    pub fn actor_id(&self) -> Option<&str> {
        match &self.actor {
            Value::String(id) => Some(id.as_str()),
            Value::Object(actor) => actor.get("id").and_then(Value::as_str),
            _ => None,
        }
        .filter(|id| !id.is_empty())
    }

    pub fn object_node(&self) -> Option<Node> {
        Node::from_value(&self.object)
    }

    pub fn target_node(&self) -> Option<Node> {
        self.target.as_ref().and_then(Node::from_value)
    }

    /// Deep copy with JSON-LD `@context` stripped from object and target and
    /// `generator` set to the sending node. `self` is left untouched.
    pub fn sanitized_copy(&self, generator: &str) -> Activity {
        let mut copy = self.clone();
        copy.generator = Some(generator.to_string());
        if let Value::Object(object) = &mut copy.object {
            object.remove(vocab::JSON_LD_CONTEXT_KEY);
        }
        if let Some(Value::Object(target)) = &mut copy.target {
            target.remove(vocab::JSON_LD_CONTEXT_KEY);
        }
        copy
    }
}

// --- Node ---

/// A JSON-LD node object. `globalId` is the natural key used for dedup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(Map<String, Value>);

impl Node {
    /// Wrap a JSON value, rejecting anything that is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned().map(Node)
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Node(map)
    }

    pub fn type_tags(&self) -> Option<&Value> {
        self.0.get("type")
    }

    pub fn is_type(&self, expected: &str) -> bool {
        is_type_match(self.type_tags(), expected)
    }

    /// Matches either the full vocabulary IRI or its compacted short name.
    pub fn is_vocab_type(&self, iri: &str) -> bool {
        self.is_type(iri) || vocab::short_name(iri).is_some_and(|short| self.is_type(short))
    }

    pub fn global_id(&self) -> Option<&str> {
        self.0
            .get("globalId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Resolve a dotted path such as `destinationCountry.countryId`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Shallow merge: keys in `other` overwrite, keys absent from `other` survive.
    pub fn merge(&mut self, other: &Node) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Short human label for logs: the first type tag, or `<untyped>`.
    pub fn type_label(&self) -> String {
        match self.type_tags() {
            Some(Value::String(tag)) => tag.clone(),
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(","),
            _ => "<untyped>".to_string(),
        }
    }
}

// --- Graph ---

/// Directed, labelled relationship to another vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(rename = "@context", default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    pub target_id: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(rename = "edgeRelationships")]
    pub relationships: Vec<String>,
}

impl Edge {
    pub fn new(target_id: impl Into<String>, relationship: impl Into<String>) -> Self {
        Self {
            context: vocab::graph_contexts(),
            target_id: target_id.into(),
            edge_type: vocab::GRAPH_EDGE_TYPE.to_string(),
            relationships: vec![relationship.into()],
        }
    }

    /// Same target and same relationship set, ignoring envelope fields.
    pub fn same_link(&self, other: &Edge) -> bool {
        self.target_id == other.target_id && self.relationships == other.relationships
    }
}

/// Pointer from a vertex to an external resource such as a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

/// A vertex as returned by the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_object: Option<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceRef>,
}

impl Vertex {
    pub fn resource_of_type(&self, resource_type: &str) -> Option<&ResourceRef> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type)
    }

    pub fn has_edge(&self, edge: &Edge) -> bool {
        self.edges.iter().any(|e| e.same_link(edge))
    }
}

/// Payload for creating a vertex. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVertex {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub vertex_type: String,
    pub annotation_object: Node,
}

impl NewVertex {
    pub fn wrapping(annotation_object: Node) -> Self {
        Self {
            context: vocab::graph_contexts(),
            vertex_type: vocab::GRAPH_VERTEX_TYPE.to_string(),
            annotation_object,
        }
    }
}

/// Partial update addressed by vertex id.
///
/// The store merges `annotation_object` into the existing annotation,
/// appends `edges`, and upserts `resources` by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexPatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_object: Option<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceRef>,
}

impl VertexPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            annotation_object: None,
            edges: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Option<Node>) -> Self {
        self.annotation_object = annotation;
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn with_resources(mut self, resources: Vec<ResourceRef>) -> Self {
        self.resources = resources;
        self
    }
}

// --- Caller context ---

/// Identities attached to every store call made on behalf of an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_identity: String,
    pub node_identity: String,
}

impl CallerContext {
    pub fn new(user_identity: impl Into<String>, node_identity: impl Into<String>) -> Self {
        Self {
            user_identity: user_identity.into(),
            node_identity: node_identity.into(),
        }
    }
}
