//! Vocabulary constants shared by the connector crates.
//!
//! UN/CEFACT types are accepted both as full IRIs and as the short names that
//! appear when the activity was compacted against the vocabulary context.

pub const UNCEFACT_BASE: &str = "https://vocabulary.uncefact.org/";

pub const CONSIGNMENT_TYPE: &str = "https://vocabulary.uncefact.org/Consignment";
pub const DOCUMENT_TYPE: &str = "https://vocabulary.uncefact.org/Document";
pub const EVENT_TYPE: &str = "https://vocabulary.uncefact.org/Event";

pub const DOCUMENT_EDGE_RELATIONSHIP: &str =
    "https://vocabulary.uncefact.org/associatedDocument";

pub const ACTIVITY_TYPE_CREATE: &str = "Create";
pub const ACTIVITY_TYPE_ADD: &str = "Add";
pub const ACTIVITY_IRI_CREATE: &str = "https://www.w3.org/ns/activitystreams#Create";
pub const ACTIVITY_IRI_ADD: &str = "https://www.w3.org/ns/activitystreams#Add";

pub const ACTIVITY_STREAMS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";
pub const SCHEMA_ORG_CONTEXT: &str = "https://schema.org/";

pub const GRAPH_CONTEXT_ROOT: &str = "https://schema.twindev.org/aig/";
pub const GRAPH_CONTEXT_COMMON: &str = "https://schema.twindev.org/common/";
pub const GRAPH_VERTEX_TYPE: &str = "AuditableItemGraphVertex";
pub const GRAPH_EDGE_TYPE: &str = "AuditableItemGraphEdge";

pub const STREAM_RESOURCE_TYPE: &str = "AuditableItemStream";
pub const STREAM_ENTRY_TYPE: &str = "Add";

/// JSON-LD key stripped from nodes before they leave this connector.
pub const JSON_LD_CONTEXT_KEY: &str = "@context";

/// Natural key used to deduplicate vertices across activities.
pub const GLOBAL_ID_PROPERTY: &str = "annotationObject.globalId";

/// Short name for a UN/CEFACT IRI, if it lives under the vocabulary base.
pub fn short_name(iri: &str) -> Option<&str> {
    iri.strip_prefix(UNCEFACT_BASE)
}

pub fn graph_contexts() -> Vec<String> {
    vec![GRAPH_CONTEXT_ROOT.to_string(), GRAPH_CONTEXT_COMMON.to_string()]
}

pub fn stream_contexts() -> serde_json::Value {
    serde_json::json!([ACTIVITY_STREAMS_CONTEXT, SCHEMA_ORG_CONTEXT])
}
