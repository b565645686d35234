use serde::{Deserialize, Serialize};

/// JSON-LD item list envelope used by the catalogue's query responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub item_list_element: Vec<T>,
}

/// A data space connector registered in the federated catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub default_endpoint: Option<Endpoint>,
}

impl DirectoryEntry {
    pub fn endpoint_url(&self) -> Option<&str> {
        self.default_endpoint
            .as_ref()
            .map(|e| e.endpoint_url.as_str())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "endpointURL")]
    pub endpoint_url: String,
}
