use tracing::info;

use dataspace_common::{ActivityError, ActivityResult, CallerContext, Node};
use dataspace_graph::VertexMaterializer;
use dataspace_streams::{AppendEntry, StreamStore};

use crate::locks::KeyLocks;
use crate::stream_resolver::StreamResolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAdded {
    pub consignment_vertex_id: String,
    pub stream_id: String,
    pub stream_created: bool,
    pub entry_id: String,
}

pub struct EventDeps<'a> {
    pub materializer: &'a VertexMaterializer,
    pub resolver: &'a StreamResolver,
    pub streams: &'a dyn StreamStore,
    pub locks: &'a KeyLocks,
}

/// Append an event to the consignment's stream. Unlike documents, events
/// only attach to a consignment that already exists.
pub async fn handle_event_add(
    event: &Node,
    consignment: &Node,
    caller: &CallerContext,
    deps: &EventDeps<'_>,
) -> ActivityResult<EventAdded> {
    let consignment_id = consignment.global_id().ok_or_else(|| {
        ActivityError::Validation("Consignment identifier missing for Event activity".into())
    })?;

    let _guard = deps.locks.lock(&format!("consignment:{consignment_id}")).await;

    let vertex = deps
        .materializer
        .find_by_global_id(consignment_id)
        .await?
        .ok_or_else(|| {
            ActivityError::NotFound(format!("Consignment with ID {consignment_id} not found"))
        })?;

    let stream = deps.resolver.resolve(&vertex, consignment_id, caller).await?;

    let entry_id = deps
        .streams
        .append_entry(
            &stream.stream_id,
            AppendEntry::wrapping(event.clone().into_value()),
            caller,
        )
        .await?;

    info!(
        stream_id = %stream.stream_id,
        consignment_id,
        entry_id = %entry_id,
        "Event added to stream"
    );

    Ok(EventAdded {
        consignment_vertex_id: vertex.id,
        stream_id: stream.stream_id,
        stream_created: stream.created,
        entry_id,
    })
}
