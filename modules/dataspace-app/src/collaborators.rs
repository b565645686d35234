// Trait seams for the outbound side of the notification path.
//
// Directory: participant id → registered connectors (federated catalogue).
// NotifierFactory: builds a Notifier bound to one peer endpoint.
//
// Graph and stream stores have their own crates; these two live here because
// only the notification trigger needs them.

use anyhow::Result;
use async_trait::async_trait;

use catalogue_client::{DataSpaceConnectorClient, DirectoryEntry, FederatedCatalogueClient};
use dataspace_common::Activity;

#[async_trait]
pub trait Directory: Send + Sync {
    /// Connectors registered for a participant, in catalogue order.
    async fn query_by_participant(&self, participant_id: &str) -> Result<Vec<DirectoryEntry>>;
}

#[async_trait]
impl Directory for FederatedCatalogueClient {
    async fn query_by_participant(&self, participant_id: &str) -> Result<Vec<DirectoryEntry>> {
        Ok(self.query_data_space_connectors(participant_id).await?)
    }
}

/// Stands in when no catalogue URL is configured. Every lookup fails, which
/// the notification trigger reports as `NotifyOutcome::Failed`.
pub struct UnconfiguredDirectory;

#[async_trait]
impl Directory for UnconfiguredDirectory {
    async fn query_by_participant(&self, participant_id: &str) -> Result<Vec<DirectoryEntry>> {
        anyhow::bail!("no catalogue configured to look up {participant_id}")
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an activity. `Ok` means the peer acknowledged it.
    async fn deliver(&self, activity: &Activity) -> Result<()>;
}

#[async_trait]
impl Notifier for DataSpaceConnectorClient {
    async fn deliver(&self, activity: &Activity) -> Result<()> {
        Ok(self.notify_activity(activity).await?)
    }
}

pub trait NotifierFactory: Send + Sync {
    fn connect(&self, endpoint: &str) -> Result<Box<dyn Notifier>>;
}

/// Builds REST clients that share one connection pool.
#[derive(Clone, Default)]
pub struct HttpNotifierFactory {
    http: reqwest::Client,
}

impl HttpNotifierFactory {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl NotifierFactory for HttpNotifierFactory {
    fn connect(&self, endpoint: &str) -> Result<Box<dyn Notifier>> {
        let client = DataSpaceConnectorClient::with_client(self.http.clone(), endpoint)?;
        Ok(Box::new(client))
    }
}
