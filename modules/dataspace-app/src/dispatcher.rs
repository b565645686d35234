//! The activity entry point.
//!
//! Validate → classify → handle. This is the only error boundary: failures
//! are logged once here and returned to the transport layer unchanged.

use std::sync::Arc;

use tracing::{error, info, Instrument};

use catalogue_client::FederatedCatalogueClient;
use dataspace_common::vocab::STREAM_RESOURCE_TYPE;
use dataspace_common::{
    Activity, ActivityError, ActivityResult, CallerContext, ConnectorConfig, NotificationConfig,
};
use dataspace_graph::{GraphStore, VertexMaterializer};
use dataspace_streams::StreamStore;

use crate::classify::{classify, ClassifiedActivity};
use crate::collaborators::{
    Directory, HttpNotifierFactory, NotifierFactory, UnconfiguredDirectory,
};
use crate::descriptor::{self, ActivityQuery, AppDescriptor};
use crate::handlers::{
    handle_consignment_create, handle_document_add, handle_event_add, DocumentAdded,
    DocumentDeps, EventAdded, EventDeps,
};
use crate::locks::KeyLocks;
use crate::notify::NotificationTrigger;
use crate::stream_resolver::StreamResolver;

/// Collaborators, resolved once at wiring time.
#[derive(Clone)]
pub struct DispatcherDeps {
    pub graph: Arc<dyn GraphStore>,
    pub streams: Arc<dyn StreamStore>,
    pub directory: Arc<dyn Directory>,
    pub notifiers: Arc<dyn NotifierFactory>,
}

impl DispatcherDeps {
    /// REST directory and notifier sharing one HTTP client, over the given
    /// stores.
    pub fn over_http(
        graph: Arc<dyn GraphStore>,
        streams: Arc<dyn StreamStore>,
        config: &ConnectorConfig,
    ) -> Self {
        let http = reqwest::Client::new();
        let directory: Arc<dyn Directory> = match &config.catalogue_url {
            Some(url) => Arc::new(FederatedCatalogueClient::with_client(
                http.clone(),
                url.clone(),
            )),
            None => Arc::new(UnconfiguredDirectory),
        };
        Self {
            graph,
            streams,
            directory,
            notifiers: Arc::new(HttpNotifierFactory::new(http)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub node_identity: String,
    pub notification: NotificationConfig,
    pub dedupe_document_edges: bool,
}

impl DispatcherSettings {
    pub fn new(node_identity: impl Into<String>) -> Self {
        Self {
            node_identity: node_identity.into(),
            notification: NotificationConfig::default(),
            dedupe_document_edges: false,
        }
    }

    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self {
            node_identity: config.node_identity.clone(),
            notification: config.file.notification.clone(),
            dedupe_document_edges: config.file.graph.dedupe_document_edges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityOutcome {
    ConsignmentCreated { vertex_id: String },
    DocumentAdded(DocumentAdded),
    EventAdded(EventAdded),
}

pub struct Dispatcher {
    materializer: VertexMaterializer,
    resolver: StreamResolver,
    streams: Arc<dyn StreamStore>,
    trigger: NotificationTrigger,
    locks: KeyLocks,
    node_identity: String,
    descriptor: AppDescriptor,
}

impl Dispatcher {
    pub fn new(deps: DispatcherDeps, settings: DispatcherSettings) -> Self {
        let materializer = VertexMaterializer::new(deps.graph.clone())
            .with_edge_dedupe(settings.dedupe_document_edges);
        let resolver = StreamResolver::new(
            deps.graph.clone(),
            deps.streams.clone(),
            STREAM_RESOURCE_TYPE,
        );
        let trigger = NotificationTrigger::new(
            deps.directory,
            deps.notifiers,
            &settings.notification,
            settings.node_identity.clone(),
        );

        Self {
            materializer,
            resolver,
            streams: deps.streams,
            trigger,
            locks: KeyLocks::new(),
            node_identity: settings.node_identity,
            descriptor: AppDescriptor::consignment_app(),
        }
    }

    pub fn descriptor(&self) -> &AppDescriptor {
        &self.descriptor
    }

    /// Activity shapes to forward to `handle_activity`.
    pub fn activities_handled(&self) -> Vec<ActivityQuery> {
        descriptor::activities_handled()
    }

    /// Handle one activity. Stateless across calls apart from key locks.
    pub async fn handle_activity(&self, activity: &Activity) -> ActivityResult<ActivityOutcome> {
        let span = tracing::info_span!(
            "handle_activity",
            source = %self.descriptor.module_name,
            app_id = %self.descriptor.id,
            activity_type = %activity.activity_type,
        );

        async {
            info!("Activity received");
            let result = self.dispatch(activity).await;
            if let Err(e) = &result {
                error!(kind = e.kind(), error = %e, "Activity handling failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, activity: &Activity) -> ActivityResult<ActivityOutcome> {
        let classified = classify(activity)?;
        let user_identity = activity
            .actor_id()
            .ok_or_else(|| ActivityError::Validation("activity.actor.id is required".into()))?;
        let caller = CallerContext::new(user_identity, self.node_identity.clone());
        info!(route = classified.label(), "Activity classified");

        match classified {
            ClassifiedActivity::CreateConsignment { consignment } => {
                let vertex_id =
                    handle_consignment_create(&consignment, &caller, &self.materializer).await?;
                Ok(ActivityOutcome::ConsignmentCreated { vertex_id })
            }
            ClassifiedActivity::AddDocument {
                document,
                consignment,
            } => {
                let deps = DocumentDeps {
                    materializer: &self.materializer,
                    trigger: &self.trigger,
                    locks: &self.locks,
                };
                let added =
                    handle_document_add(activity, &document, &consignment, &caller, &deps).await?;
                Ok(ActivityOutcome::DocumentAdded(added))
            }
            ClassifiedActivity::AddEvent { event, consignment } => {
                let deps = EventDeps {
                    materializer: &self.materializer,
                    resolver: &self.resolver,
                    streams: self.streams.as_ref(),
                    locks: &self.locks,
                };
                let added = handle_event_add(&event, &consignment, &caller, &deps).await?;
                Ok(ActivityOutcome::EventAdded(added))
            }
        }
    }
}
