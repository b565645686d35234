//! Materializer behaviour against the in-memory graph store.

use std::sync::Arc;

use serde_json::json;

use dataspace_common::vocab::DOCUMENT_EDGE_RELATIONSHIP;
use dataspace_common::{CallerContext, Edge, Node, ResourceRef, VertexPatch};
use dataspace_graph::{GraphCall, GraphStore, MemoryGraphStore, PropertyFilter, VertexMaterializer};

fn caller() -> CallerContext {
    CallerContext::new("did:example:alice", "did:example:node")
}

fn consignment(global_id: &str) -> Node {
    Node::from_value(&json!({
        "type": "Consignment",
        "globalId": global_id,
        "exportTypeCode": "09011101"
    }))
    .unwrap()
}

fn setup() -> (Arc<MemoryGraphStore>, VertexMaterializer) {
    let store = Arc::new(MemoryGraphStore::new());
    let materializer = VertexMaterializer::new(store.clone());
    (store, materializer)
}

#[tokio::test]
async fn create_vertex_wraps_node_without_lookup() {
    let (store, materializer) = setup();

    let first = materializer.create_vertex(&consignment("c-1"), &caller()).await.unwrap();
    let second = materializer.create_vertex(&consignment("c-1"), &caller()).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(store.create_count(), 2);
    assert!(store
        .calls()
        .iter()
        .all(|c| !matches!(c, GraphCall::Query { .. })));
    let vertex = store.vertex(&first).unwrap();
    assert_eq!(vertex.annotation_object.unwrap().global_id(), Some("c-1"));
}

#[tokio::test]
async fn find_or_create_creates_once_then_finds() {
    let (store, materializer) = setup();

    let created = materializer.find_or_create(&consignment("c-1"), &caller()).await.unwrap();
    assert!(created.created());

    let found = materializer.find_or_create(&consignment("c-1"), &caller()).await.unwrap();
    assert!(!found.created());
    assert_eq!(found.vertex_id, created.vertex_id);
    assert_eq!(store.vertices().len(), 1);
}

#[tokio::test]
async fn find_or_create_requires_global_id() {
    let (store, materializer) = setup();
    let anonymous = Node::from_value(&json!({ "type": "Consignment" })).unwrap();

    assert!(materializer.find_or_create(&anonymous, &caller()).await.is_err());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn find_by_global_id_returns_first_in_store_order() {
    let (_store, materializer) = setup();
    let first = materializer.create_vertex(&consignment("dup"), &caller()).await.unwrap();
    materializer.create_vertex(&consignment("dup"), &caller()).await.unwrap();

    let found = materializer.find_by_global_id("dup").await.unwrap().unwrap();
    assert_eq!(found.id, first);
    assert!(materializer.find_by_global_id("other").await.unwrap().is_none());
}

#[tokio::test]
async fn attach_edge_appends_every_time_by_default() {
    let (store, materializer) = setup();
    let target = materializer.create_vertex(&consignment("c-1"), &caller()).await.unwrap();
    let edge = Edge::new("aig:doc", DOCUMENT_EDGE_RELATIONSHIP);

    for _ in 0..2 {
        let current = store.vertex(&target);
        let appended = materializer
            .attach_edge(&target, current.as_ref(), None, edge.clone(), &caller())
            .await
            .unwrap();
        assert!(appended);
    }

    assert_eq!(store.vertex(&target).unwrap().edges.len(), 2);
}

#[tokio::test]
async fn attach_edge_dedupes_when_enabled() {
    let store = Arc::new(MemoryGraphStore::new());
    let materializer = VertexMaterializer::new(store.clone()).with_edge_dedupe(true);
    let target = materializer.create_vertex(&consignment("c-1"), &caller()).await.unwrap();
    let edge = Edge::new("aig:doc", DOCUMENT_EDGE_RELATIONSHIP);

    let current = store.vertex(&target);
    assert!(materializer
        .attach_edge(&target, current.as_ref(), None, edge.clone(), &caller())
        .await
        .unwrap());

    let current = store.vertex(&target);
    assert!(!materializer
        .attach_edge(&target, current.as_ref(), None, edge, &caller())
        .await
        .unwrap());

    assert_eq!(store.vertex(&target).unwrap().edges.len(), 1);
    assert_eq!(store.update_count(), 1);
}

#[tokio::test]
async fn edge_target_is_reused_by_global_id_only_with_dedupe() {
    let doc = Node::from_value(&json!({ "type": "Document", "globalId": "urn:doc:1" })).unwrap();

    let (store, plain) = setup();
    let first = plain.materialize_edge_target(&doc, &caller()).await.unwrap();
    let second = plain.materialize_edge_target(&doc, &caller()).await.unwrap();
    assert!(first.created() && second.created());
    assert_ne!(first.vertex_id, second.vertex_id);
    assert_eq!(store.vertices().len(), 2);

    let store = Arc::new(MemoryGraphStore::new());
    let deduping = VertexMaterializer::new(store.clone()).with_edge_dedupe(true);
    let first = deduping.materialize_edge_target(&doc, &caller()).await.unwrap();
    let second = deduping.materialize_edge_target(&doc, &caller()).await.unwrap();
    assert!(first.created());
    assert!(!second.created());
    assert_eq!(first.vertex_id, second.vertex_id);
    assert_eq!(store.vertices().len(), 1);

    // Without a natural key there is nothing to reuse.
    let anonymous = Node::from_value(&json!({ "type": "Document" })).unwrap();
    let a = deduping.materialize_edge_target(&anonymous, &caller()).await.unwrap();
    let b = deduping.materialize_edge_target(&anonymous, &caller()).await.unwrap();
    assert_ne!(a.vertex_id, b.vertex_id);
}

#[tokio::test]
async fn update_merges_annotation_without_clobbering() {
    let (store, materializer) = setup();
    let target = materializer.create_vertex(&consignment("c-1"), &caller()).await.unwrap();

    let resubmitted = Node::from_value(&json!({ "globalId": "c-1", "status": "loaded" })).unwrap();
    materializer
        .attach_edge(
            &target,
            None,
            Some(resubmitted),
            Edge::new("aig:doc", DOCUMENT_EDGE_RELATIONSHIP),
            &caller(),
        )
        .await
        .unwrap();

    let annotation = store.vertex(&target).unwrap().annotation_object.unwrap();
    assert_eq!(annotation.str_at("exportTypeCode"), Some("09011101"));
    assert_eq!(annotation.str_at("status"), Some("loaded"));
}

#[tokio::test]
async fn resources_upsert_by_id() {
    let store = MemoryGraphStore::new();
    let id = store
        .create(
            dataspace_common::NewVertex::wrapping(consignment("c-1")),
            &caller(),
        )
        .await
        .unwrap();
    let stream = ResourceRef {
        id: "ais:1".into(),
        resource_type: "AuditableItemStream".into(),
    };

    for _ in 0..2 {
        store
            .update(
                VertexPatch::new(&id).with_resources(vec![stream.clone()]),
                &caller(),
            )
            .await
            .unwrap();
    }

    assert_eq!(store.vertex(&id).unwrap().resources, vec![stream]);
}

#[tokio::test]
async fn update_of_unknown_vertex_fails() {
    let store = MemoryGraphStore::new();
    let err = store
        .update(VertexPatch::new("aig:missing"), &caller())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("aig:missing"));
}

#[tokio::test]
async fn failing_store_fails_every_call() {
    let store = MemoryGraphStore::failing("connection refused");
    assert!(store
        .query(&[PropertyFilter::equals("annotationObject.globalId", "c-1")])
        .await
        .is_err());
    assert!(store.calls().is_empty());
}
