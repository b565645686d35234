// Test mocks for the notification path.
//
// - StaticDirectory (Directory): participant → endpoints, counts lookups
// - RecordingNotifiers (NotifierFactory): records every delivery, can fail
//
// Plus builders for wiring a Dispatcher over in-memory stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use catalogue_client::{DirectoryEntry, Endpoint};
use dataspace_common::config::DEFAULT_NOTIFY_PARTICIPANT;
use dataspace_common::Activity;
use dataspace_graph::MemoryGraphStore;
use dataspace_streams::MemoryStreamStore;

use crate::collaborators::{Directory, Notifier, NotifierFactory};
use crate::dispatcher::{Dispatcher, DispatcherDeps, DispatcherSettings};

pub const TEST_NODE_IDENTITY: &str = "did:example:node";
pub const TEST_ENDPOINT: &str = "https://fsa.example.org/connector";

/// Install a test-writer subscriber once. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// StaticDirectory
// ---------------------------------------------------------------------------

/// HashMap-based directory. Unregistered participants have no entries.
pub struct StaticDirectory {
    entries: HashMap<String, Vec<DirectoryEntry>>,
    failure: Option<String>,
    lookups: AtomicUsize,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            failure: None,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn on_participant(mut self, participant_id: &str, endpoint_url: &str) -> Self {
        let entry = DirectoryEntry {
            id: Some(format!("urn:connector:{endpoint_url}")),
            maintainer: Some(participant_id.to_string()),
            default_endpoint: Some(Endpoint {
                endpoint_url: endpoint_url.to_string(),
            }),
        };
        self.entries
            .entry(participant_id.to_string())
            .or_default()
            .push(entry);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Default for StaticDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn query_by_participant(&self, participant_id: &str) -> Result<Vec<DirectoryEntry>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            bail!("catalogue unavailable: {message}");
        }
        Ok(self.entries.get(participant_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifiers
// ---------------------------------------------------------------------------

/// One delivery attempt as seen by the fake peer.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub endpoint: String,
    pub activity: Activity,
}

/// Records every delivery attempt. With `failing`, each attempt is recorded
/// and then rejected as a network error.
#[derive(Clone, Default)]
pub struct RecordingNotifiers {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    failure: Option<String>,
}

impl RecordingNotifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

struct RecordingNotifier {
    endpoint: String,
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    failure: Option<String>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, activity: &Activity) -> Result<()> {
        self.deliveries.lock().unwrap().push(Delivery {
            endpoint: self.endpoint.clone(),
            activity: activity.clone(),
        });
        if let Some(message) = &self.failure {
            bail!("network error: {message}");
        }
        Ok(())
    }
}

impl NotifierFactory for RecordingNotifiers {
    fn connect(&self, endpoint: &str) -> Result<Box<dyn Notifier>> {
        Ok(Box::new(RecordingNotifier {
            endpoint: endpoint.to_string(),
            deliveries: self.deliveries.clone(),
            failure: self.failure.clone(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A dispatcher over in-memory stores, with handles kept for assertions.
pub struct Harness {
    pub graph: Arc<MemoryGraphStore>,
    pub streams: Arc<MemoryStreamStore>,
    pub directory: Arc<StaticDirectory>,
    pub notifiers: RecordingNotifiers,
    pub dispatcher: Dispatcher,
}

impl Harness {
    /// Directory knows the default notification participant.
    pub fn new() -> Self {
        Self::build(
            MemoryGraphStore::new(),
            MemoryStreamStore::new(),
            StaticDirectory::new().on_participant(DEFAULT_NOTIFY_PARTICIPANT, TEST_ENDPOINT),
            RecordingNotifiers::new(),
            DispatcherSettings::new(TEST_NODE_IDENTITY),
        )
    }

    pub fn build(
        graph: MemoryGraphStore,
        streams: MemoryStreamStore,
        directory: StaticDirectory,
        notifiers: RecordingNotifiers,
        settings: DispatcherSettings,
    ) -> Self {
        let graph = Arc::new(graph);
        let streams = Arc::new(streams);
        let directory = Arc::new(directory);
        let deps = DispatcherDeps {
            graph: graph.clone(),
            streams: streams.clone(),
            directory: directory.clone(),
            notifiers: Arc::new(notifiers.clone()),
        };
        Self {
            graph,
            streams,
            directory,
            notifiers,
            dispatcher: Dispatcher::new(deps, settings),
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
