use tracing::info;

use dataspace_common::vocab::DOCUMENT_EDGE_RELATIONSHIP;
use dataspace_common::{Activity, ActivityResult, CallerContext, Edge, Node};
use dataspace_graph::VertexMaterializer;

use crate::locks::KeyLocks;
use crate::notify::{NotificationTrigger, NotifyOutcome, SkipReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAdded {
    pub document_vertex_id: String,
    pub document_created: bool,
    pub consignment_vertex_id: String,
    pub consignment_created: bool,
    pub edge_appended: bool,
    pub notification: NotifyOutcome,
}

pub struct DocumentDeps<'a> {
    pub materializer: &'a VertexMaterializer,
    pub trigger: &'a NotificationTrigger,
    pub locks: &'a KeyLocks,
}

/// Attach a document to a consignment, creating the consignment on first
/// reference, then notify the export authority if the stored consignment
/// data and the document satisfy the export rule.
///
/// With edge dedupe on, a document carrying `globalId` is reused rather than
/// recreated, and a repeated (consignment, document) link is not appended.
pub async fn handle_document_add(
    activity: &Activity,
    document: &Node,
    consignment: &Node,
    caller: &CallerContext,
    deps: &DocumentDeps<'_>,
) -> ActivityResult<DocumentAdded> {
    let document_vertex = {
        let _guard = match document.global_id() {
            Some(gid) if deps.materializer.dedupes_edges() => {
                Some(deps.locks.lock(&format!("document:{gid}")).await)
            }
            _ => None,
        };
        deps.materializer
            .materialize_edge_target(document, caller)
            .await?
    };
    let document_vertex_id = document_vertex.vertex_id.clone();
    info!(
        vertex_id = %document_vertex_id,
        created = document_vertex.created(),
        "Object's vertex resolved"
    );

    let global_id = consignment.global_id().unwrap_or_default();
    let (target, edge_appended) = {
        let _guard = deps.locks.lock(&format!("consignment:{global_id}")).await;

        let target = deps.materializer.find_or_create(consignment, caller).await?;
        let edge = Edge::new(&document_vertex_id, DOCUMENT_EDGE_RELATIONSHIP);
        let appended = deps
            .materializer
            .attach_edge(
                &target.vertex_id,
                target.existing.as_ref(),
                Some(consignment.clone()),
                edge,
                caller,
            )
            .await?;
        (target, appended)
    };

    let prior = target
        .existing
        .as_ref()
        .and_then(|v| v.annotation_object.as_ref());
    let notification = match prior {
        None => NotifyOutcome::Skipped(SkipReason::NoPriorData),
        Some(prior) => {
            let precondition = deps.trigger.rule().is_satisfied(prior, document);
            deps.trigger.maybe_notify(precondition, activity).await
        }
    };

    Ok(DocumentAdded {
        document_vertex_id,
        document_created: document_vertex.created(),
        consignment_vertex_id: target.vertex_id.clone(),
        consignment_created: target.created(),
        edge_appended,
        notification,
    })
}
