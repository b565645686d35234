pub mod error;
pub mod types;

pub use error::{ConnectorClientError, Result};
pub use types::{DirectoryEntry, Endpoint, ItemList};

use dataspace_common::Activity;
use url::Url;

const DATA_SPACE_CONNECTORS_ROUTE: &str = "data-space-connectors";
const NOTIFY_ROUTE: &str = "notify";

/// Join a route onto a base URL, keeping any path prefix the base carries.
fn join_route(base: &Url, route: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(route)?)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ConnectorClientError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

/// Read-only client for the federated catalogue.
#[derive(Clone)]
pub struct FederatedCatalogueClient {
    client: reqwest::Client,
    base_url: Url,
}

impl FederatedCatalogueClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Connectors registered for `participant_id`, in catalogue order.
    pub async fn query_data_space_connectors(
        &self,
        participant_id: &str,
    ) -> Result<Vec<DirectoryEntry>> {
        let url = join_route(&self.base_url, DATA_SPACE_CONNECTORS_ROUTE)?;
        let resp = self
            .client
            .get(url)
            .query(&[("participantId", participant_id)])
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let body = resp.bytes().await?;
        let list: ItemList<DirectoryEntry> = serde_json::from_slice(&body)?;
        tracing::debug!(
            participant_id,
            count = list.item_list_element.len(),
            "Catalogue returned connectors"
        );
        Ok(list.item_list_element)
    }
}

/// Client bound to one peer connector's endpoint.
#[derive(Clone)]
pub struct DataSpaceConnectorClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl DataSpaceConnectorClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Deliver an activity to the peer. Any 2xx counts as acknowledged.
    pub async fn notify_activity(&self, activity: &Activity) -> Result<()> {
        let url = join_route(&self.endpoint, NOTIFY_ROUTE)?;
        let resp = self.client.post(url).json(activity).send().await?;
        check_status(resp).await?;
        Ok(())
    }
}
