//! Core types for the stream store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dataspace_common::vocab;

/// Annotation describing a new stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamAnnotation {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "type")]
    pub stream_type: String,
    pub name: String,
}

impl StreamAnnotation {
    /// The event stream belonging to one consignment.
    pub fn for_consignment(consignment_id: &str) -> Self {
        Self {
            context: vocab::stream_contexts(),
            stream_type: vocab::STREAM_RESOURCE_TYPE.to_string(),
            name: format!("Event Stream for Consignment {consignment_id}"),
        }
    }
}

/// An entry to be appended. The caller builds this; the store assigns id/seq.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendEntry {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub object: Value,
    pub published: String,
}

impl AppendEntry {
    /// Wrap a domain object in an `Add` entry stamped with the current time.
    pub fn wrapping(object: Value) -> Self {
        Self {
            context: vocab::stream_contexts(),
            entry_type: vocab::STREAM_ENTRY_TYPE.to_string(),
            object,
            published: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = published.to_rfc3339_opts(SecondsFormat::Millis, true);
        self
    }
}

/// An entry as stored. Returned by the in-memory store's read methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub id: String,
    pub stream_id: String,
    pub seq: i64,
    pub ts: DateTime<Utc>,
    pub user_identity: String,
    pub entry: AppendEntry,
}
