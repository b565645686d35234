//! Export-authority notification after a document is attached.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use catalogue_client::FederatedCatalogueClient;
use common::{add, consignment, consignment_ref, create, document, ALICE};
use dataspace_app::testing::{
    init_tracing, Harness, RecordingNotifiers, StaticDirectory, TEST_ENDPOINT, TEST_NODE_IDENTITY,
};
use dataspace_app::{
    ActivityOutcome, Dispatcher, DispatcherDeps, DispatcherSettings, DocumentAdded,
    HttpNotifierFactory, NotifyOutcome, SkipReason,
};
use dataspace_common::config::DEFAULT_NOTIFY_PARTICIPANT;
use dataspace_common::{Activity, ConnectorConfig, FileConfig};
use dataspace_graph::MemoryGraphStore;
use dataspace_streams::MemoryStreamStore;

async fn seed_consignment(h: &Harness, value: Value) {
    h.dispatcher.handle_activity(&create(value)).await.unwrap();
}

async fn add_document(dispatcher: &Dispatcher, activity: &Activity) -> DocumentAdded {
    match dispatcher.handle_activity(activity).await.unwrap() {
        ActivityOutcome::DocumentAdded(added) => added,
        other => panic!("expected DocumentAdded, got {other:?}"),
    }
}

// =========================================================================
// Rule matched
// =========================================================================

#[tokio::test]
async fn matching_document_notifies_once_with_sanitized_copy() {
    init_tracing();
    let h = Harness::new();
    seed_consignment(&h, consignment("urn:consignment:1")).await;

    let activity = add(document("#853"), consignment_ref("urn:consignment:1"));
    let original = activity.clone();
    let added = add_document(&h.dispatcher, &activity).await;

    assert_eq!(
        added.notification,
        NotifyOutcome::Sent {
            endpoint: TEST_ENDPOINT.to_string()
        }
    );

    let deliveries = h.notifiers.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].endpoint, TEST_ENDPOINT);

    let sent = &deliveries[0].activity;
    assert_eq!(sent.generator.as_deref(), Some(TEST_NODE_IDENTITY));
    assert!(sent.object.get("@context").is_none());
    assert!(sent.target.as_ref().unwrap().get("@context").is_none());
    assert_eq!(sent.object["documentTypeCode"], "#853");
    assert_eq!(sent.actor_id(), Some(ALICE));

    // The caller's activity is never modified.
    assert_eq!(activity, original);
    assert!(activity.object.get("@context").is_some());
    assert!(activity.generator.is_none());
}

#[tokio::test]
async fn rule_checks_stored_consignment_not_resubmitted_reference() {
    let h = Harness::new();
    seed_consignment(&h, consignment("urn:consignment:1")).await;

    // The reference carries none of the export fields; the stored vertex does.
    let added = add_document(
        &h.dispatcher,
        &add(
            document("https://vocabulary.uncefact.org/DocumentCodeList#853"),
            consignment_ref("urn:consignment:1"),
        ),
    )
    .await;

    assert!(matches!(added.notification, NotifyOutcome::Sent { .. }));
    assert_eq!(h.directory.lookups(), 1);
}

// =========================================================================
// Rule not matched
// =========================================================================

#[tokio::test]
async fn any_mismatched_field_suppresses_notification() {
    let mut other_commodity = consignment("urn:consignment:a");
    other_commodity["exportTypeCode"] = json!("09011102");
    let mut other_country = consignment("urn:consignment:b");
    other_country["destinationCountry"] = json!({ "countryId": "#FR" });
    let mut no_country = consignment("urn:consignment:c");
    no_country.as_object_mut().unwrap().remove("destinationCountry");

    let cases = [
        (other_commodity, document("#853")),
        (other_country, document("#853")),
        (no_country, document("#853")),
        (consignment("urn:consignment:d"), document("#380")),
    ];

    for (stored, doc) in cases {
        let h = Harness::new();
        let global_id = stored["globalId"].as_str().unwrap().to_string();
        seed_consignment(&h, stored).await;

        let added = add_document(&h.dispatcher, &add(doc, consignment_ref(&global_id))).await;

        assert_eq!(added.notification, NotifyOutcome::Skipped(SkipReason::RuleNotMet));
        assert_eq!(h.directory.lookups(), 0, "{global_id}");
        assert!(h.notifiers.deliveries().is_empty(), "{global_id}");
    }
}

#[tokio::test]
async fn first_reference_creating_consignment_never_notifies() {
    let h = Harness::new();

    // Full matching data, but nothing was stored before this activity.
    let added = add_document(
        &h.dispatcher,
        &add(document("#853"), consignment("urn:consignment:fresh")),
    )
    .await;

    assert_eq!(added.notification, NotifyOutcome::Skipped(SkipReason::NoPriorData));
    assert_eq!(h.directory.lookups(), 0);
}

#[tokio::test]
async fn disabled_notifications_are_skipped() {
    let mut settings = DispatcherSettings::new(TEST_NODE_IDENTITY);
    settings.notification.enabled = false;
    let h = Harness::build(
        MemoryGraphStore::new(),
        MemoryStreamStore::new(),
        StaticDirectory::new().on_participant(DEFAULT_NOTIFY_PARTICIPANT, TEST_ENDPOINT),
        RecordingNotifiers::new(),
        settings,
    );
    seed_consignment(&h, consignment("urn:consignment:1")).await;

    let added = add_document(
        &h.dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    assert_eq!(added.notification, NotifyOutcome::Skipped(SkipReason::Disabled));
    assert_eq!(h.directory.lookups(), 0);
}

// =========================================================================
// Best-effort delivery
// =========================================================================

fn harness_with(directory: StaticDirectory, notifiers: RecordingNotifiers) -> Harness {
    Harness::build(
        MemoryGraphStore::new(),
        MemoryStreamStore::new(),
        directory,
        notifiers,
        DispatcherSettings::new(TEST_NODE_IDENTITY),
    )
}

#[tokio::test]
async fn delivery_failure_keeps_graph_writes() {
    let h = harness_with(
        StaticDirectory::new().on_participant(DEFAULT_NOTIFY_PARTICIPANT, TEST_ENDPOINT),
        RecordingNotifiers::failing("connection reset"),
    );
    seed_consignment(&h, consignment("urn:consignment:1")).await;

    let added = add_document(
        &h.dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    match &added.notification {
        NotifyOutcome::Failed { endpoint, reason } => {
            assert_eq!(endpoint.as_deref(), Some(TEST_ENDPOINT));
            assert!(reason.contains("connection reset"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(added.notification.was_attempted());
    assert_eq!(h.notifiers.deliveries().len(), 1);
    assert_eq!(
        h.graph.vertex(&added.consignment_vertex_id).unwrap().edges.len(),
        1
    );
}

#[tokio::test]
async fn catalogue_failure_is_reported_not_raised() {
    let h = harness_with(StaticDirectory::failing("timeout"), RecordingNotifiers::new());
    seed_consignment(&h, consignment("urn:consignment:1")).await;

    let added = add_document(
        &h.dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    assert!(matches!(
        added.notification,
        NotifyOutcome::Failed { endpoint: None, .. }
    ));
    assert!(h.notifiers.deliveries().is_empty());
}

#[tokio::test]
async fn unregistered_participant_is_reported_not_raised() {
    let h = harness_with(StaticDirectory::new(), RecordingNotifiers::new());
    seed_consignment(&h, consignment("urn:consignment:1")).await;

    let added = add_document(
        &h.dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    assert!(matches!(
        added.notification,
        NotifyOutcome::Failed { endpoint: None, .. }
    ));
    assert_eq!(h.directory.lookups(), 1);
}

// =========================================================================
// Over HTTP
// =========================================================================

#[derive(Clone, Default)]
struct Peer {
    received: Arc<Mutex<Vec<Value>>>,
    participants: Arc<Mutex<Vec<String>>>,
    /// When set, the catalogue lists this endpoint for every participant.
    listed_endpoint: Arc<Mutex<Option<String>>>,
}

async fn spawn_peer(peer: Peer) -> String {
    async fn connectors(
        State(peer): State<Peer>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let participant = params.get("participantId").cloned().unwrap_or_default();
        peer.participants.lock().unwrap().push(participant);
        let listed = peer.listed_endpoint.lock().unwrap().clone();
        let items: Vec<Value> = listed
            .into_iter()
            .map(|url| json!({ "id": "urn:connector:peer", "defaultEndpoint": { "endpointURL": url } }))
            .collect();
        Json(json!({ "itemListElement": items }))
    }

    async fn notify(State(peer): State<Peer>, Json(body): Json<Value>) -> StatusCode {
        peer.received.lock().unwrap().push(body);
        StatusCode::OK
    }

    let app = Router::new()
        .route("/data-space-connectors", get(connectors))
        .route("/connector/notify", post(notify))
        .with_state(peer);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn http_peer_receives_sanitized_activity() {
    let peer = Peer::default();
    let base = spawn_peer(peer.clone()).await;
    let endpoint = format!("{base}/connector");

    let graph = Arc::new(MemoryGraphStore::new());
    let directory =
        StaticDirectory::new().on_participant(DEFAULT_NOTIFY_PARTICIPANT, &endpoint);
    let dispatcher = Dispatcher::new(
        DispatcherDeps {
            graph: graph.clone(),
            streams: Arc::new(MemoryStreamStore::new()),
            directory: Arc::new(directory),
            notifiers: Arc::new(HttpNotifierFactory::default()),
        },
        DispatcherSettings::new(TEST_NODE_IDENTITY),
    );

    dispatcher
        .handle_activity(&create(consignment("urn:consignment:1")))
        .await
        .unwrap();
    let added = add_document(
        &dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    assert_eq!(added.notification, NotifyOutcome::Sent { endpoint });
    let received = peer.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["type"], "Add");
    assert_eq!(received[0]["generator"], TEST_NODE_IDENTITY);
    assert!(received[0]["object"].get("@context").is_none());
}

#[tokio::test]
async fn http_catalogue_without_connectors_fails_softly() {
    let peer = Peer::default();
    let base = spawn_peer(peer.clone()).await;

    let dispatcher = Dispatcher::new(
        DispatcherDeps {
            graph: Arc::new(MemoryGraphStore::new()),
            streams: Arc::new(MemoryStreamStore::new()),
            directory: Arc::new(FederatedCatalogueClient::new(Url::parse(&base).unwrap())),
            notifiers: Arc::new(HttpNotifierFactory::default()),
        },
        DispatcherSettings::new(TEST_NODE_IDENTITY),
    );

    dispatcher
        .handle_activity(&create(consignment("urn:consignment:1")))
        .await
        .unwrap();
    let added = add_document(
        &dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    assert!(matches!(added.notification, NotifyOutcome::Failed { .. }));
    assert_eq!(
        peer.participants.lock().unwrap().clone(),
        vec![DEFAULT_NOTIFY_PARTICIPANT.to_string()]
    );
    assert!(peer.received.lock().unwrap().is_empty());
}

fn connector_config(catalogue_url: Option<&str>, notifications: bool) -> ConnectorConfig {
    let mut file = FileConfig::default();
    file.notification.enabled = notifications;
    ConnectorConfig {
        node_identity: TEST_NODE_IDENTITY.to_string(),
        catalogue_url: catalogue_url.map(|u| Url::parse(u).unwrap()),
        file,
    }
}

#[tokio::test]
async fn configured_wiring_reaches_catalogue_and_peer() {
    let peer = Peer::default();
    let base = spawn_peer(peer.clone()).await;
    let endpoint = format!("{base}/connector");
    *peer.listed_endpoint.lock().unwrap() = Some(endpoint.clone());

    let config = connector_config(Some(&base), true);
    config.validate().unwrap();
    let dispatcher = Dispatcher::new(
        DispatcherDeps::over_http(
            Arc::new(MemoryGraphStore::new()),
            Arc::new(MemoryStreamStore::new()),
            &config,
        ),
        DispatcherSettings::from_config(&config),
    );

    dispatcher
        .handle_activity(&create(consignment("urn:consignment:1")))
        .await
        .unwrap();
    let added = add_document(
        &dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    assert_eq!(added.notification, NotifyOutcome::Sent { endpoint });
    assert_eq!(peer.participants.lock().unwrap().len(), 1);
    assert_eq!(peer.received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn wiring_without_catalogue_still_materializes() {
    let config = connector_config(None, false);
    config.validate().unwrap();
    let graph = Arc::new(MemoryGraphStore::new());
    let dispatcher = Dispatcher::new(
        DispatcherDeps::over_http(graph.clone(), Arc::new(MemoryStreamStore::new()), &config),
        DispatcherSettings::from_config(&config),
    );

    dispatcher
        .handle_activity(&create(consignment("urn:consignment:1")))
        .await
        .unwrap();
    let added = add_document(
        &dispatcher,
        &add(document("#853"), consignment_ref("urn:consignment:1")),
    )
    .await;

    assert_eq!(added.notification, NotifyOutcome::Skipped(SkipReason::Disabled));
    assert_eq!(graph.vertices().len(), 2);
}
