use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const NODE_IDENTITY_ENV: &str = "DATA_SPACE_CONNECTOR_NODE_IDENTITY";
pub const CATALOGUE_URL_ENV: &str = "DATA_SPACE_CONNECTOR_CATALOGUE_URL";
pub const APP_CONFIG_ENV: &str = "DATA_SPACE_CONNECTOR_APP_CONFIG";

/// UK Food Standards Agency participant, the default notification recipient.
pub const DEFAULT_NOTIFY_PARTICIPANT: &str =
    "did:iota:testnet:0x83e99fd9b8804966fd474da212aa93a5769f39f2150714a3c6701d20b5353975";

/// Connector configuration. Identities and endpoints come from the
/// environment; business rules come from the optional TOML file.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub node_identity: String,
    pub catalogue_url: Option<url::Url>,
    pub file: FileConfig,
}

impl ConnectorConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let node_identity = std::env::var(NODE_IDENTITY_ENV)
            .with_context(|| format!("{NODE_IDENTITY_ENV} environment variable is required"))?;

        let catalogue_url = match std::env::var(CATALOGUE_URL_ENV).ok() {
            Some(raw) => Some(
                url::Url::parse(&raw)
                    .with_context(|| format!("{CATALOGUE_URL_ENV} is not a valid URL: {raw}"))?,
            ),
            None => None,
        };

        let file = match std::env::var(APP_CONFIG_ENV).ok() {
            Some(path) => load_file_config(&PathBuf::from(path))?,
            None => FileConfig::default(),
        };

        let config = Self {
            node_identity,
            catalogue_url,
            file,
        };
        config.validate()?;
        config.log_summary();
        Ok(config)
    }

    /// Notifications need somewhere to look participants up.
    pub fn validate(&self) -> Result<()> {
        if self.node_identity.trim().is_empty() {
            anyhow::bail!("{NODE_IDENTITY_ENV} must not be empty");
        }
        if self.file.notification.enabled && self.catalogue_url.is_none() {
            anyhow::bail!("{CATALOGUE_URL_ENV} is required when notifications are enabled");
        }
        Ok(())
    }

    fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  NODE_IDENTITY: {}", self.node_identity);
        tracing::info!(
            "  CATALOGUE_URL: {}",
            self.catalogue_url
                .as_ref()
                .map(|u| u.as_str())
                .unwrap_or("<not set>")
        );
        tracing::info!(
            "  notifications: {} (participant {})",
            self.file.notification.enabled,
            self.file.notification.participant_id
        );
        tracing::info!(
            "  dedupe_document_edges: {}",
            self.file.graph.dedupe_document_edges
        );
    }
}

/// TOML-backed rule configuration. Every table is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

/// The export rule that triggers a notification on document arrival.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub participant_id: String,
    pub export_type_code: String,
    pub destination_country_marker: String,
    pub document_type_marker: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            participant_id: DEFAULT_NOTIFY_PARTICIPANT.to_string(),
            export_type_code: "09011101".to_string(),
            destination_country_marker: "#GB".to_string(),
            document_type_marker: "#853".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Skip appending an edge identical to one the vertex already has.
    pub dedupe_document_edges: bool,
}

/// Load and parse a TOML config file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
