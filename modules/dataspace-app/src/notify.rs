//! Best-effort notification of a peer connector.
//!
//! Never fails the enclosing handler: every problem on the way to the peer
//! (catalogue lookup, missing endpoint, delivery) becomes
//! `NotifyOutcome::Failed` and a warning in the log.

use std::sync::Arc;

use tracing::{debug, info, warn};

use dataspace_common::{Activity, Node, NotificationConfig};

use crate::collaborators::{Directory, NotifierFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Notifications are switched off in configuration.
    Disabled,
    /// The consignment had no stored annotation before this activity,
    /// typically because this activity created it.
    NoPriorData,
    /// The consignment/document data does not satisfy the export rule.
    RuleNotMet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent { endpoint: String },
    Skipped(SkipReason),
    Failed { endpoint: Option<String>, reason: String },
}

impl NotifyOutcome {
    pub fn was_attempted(&self) -> bool {
        !matches!(self, NotifyOutcome::Skipped(_))
    }
}

/// Export rule: the commodity code matches exactly, the destination country
/// carries the marker, and the document type code carries the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRule {
    pub export_type_code: String,
    pub destination_country_marker: String,
    pub document_type_marker: String,
}

impl ExportRule {
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self {
            export_type_code: config.export_type_code.clone(),
            destination_country_marker: config.destination_country_marker.clone(),
            document_type_marker: config.document_type_marker.clone(),
        }
    }

    /// `consignment` is the annotation stored before this activity arrived.
    pub fn is_satisfied(&self, consignment: &Node, document: &Node) -> bool {
        let commodity_ok =
            consignment.str_at("exportTypeCode") == Some(self.export_type_code.as_str());
        let destination_ok = consignment
            .str_at("destinationCountry.countryId")
            .is_some_and(|c| c.contains(&self.destination_country_marker));
        let document_ok = document
            .str_at("documentTypeCode")
            .unwrap_or_default()
            .contains(&self.document_type_marker);
        commodity_ok && destination_ok && document_ok
    }
}

pub struct NotificationTrigger {
    directory: Arc<dyn Directory>,
    notifiers: Arc<dyn NotifierFactory>,
    participant_id: String,
    node_identity: String,
    enabled: bool,
    rule: ExportRule,
}

impl NotificationTrigger {
    pub fn new(
        directory: Arc<dyn Directory>,
        notifiers: Arc<dyn NotifierFactory>,
        config: &NotificationConfig,
        node_identity: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            notifiers,
            participant_id: config.participant_id.clone(),
            node_identity: node_identity.into(),
            enabled: config.enabled,
            rule: ExportRule::from_config(config),
        }
    }

    pub fn rule(&self) -> &ExportRule {
        &self.rule
    }

    /// Deliver a sanitized copy of `activity` when `precondition` holds.
    pub async fn maybe_notify(&self, precondition: bool, activity: &Activity) -> NotifyOutcome {
        if !self.enabled {
            return NotifyOutcome::Skipped(SkipReason::Disabled);
        }
        if !precondition {
            return NotifyOutcome::Skipped(SkipReason::RuleNotMet);
        }

        let entries = match self.directory.query_by_participant(&self.participant_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(participant_id = %self.participant_id, error = %e, "Catalogue lookup failed");
                return NotifyOutcome::Failed {
                    endpoint: None,
                    reason: format!("catalogue lookup failed: {e}"),
                };
            }
        };

        let Some(endpoint) = entries.iter().find_map(|e| e.endpoint_url()) else {
            warn!(participant_id = %self.participant_id, "No connector endpoint registered");
            return NotifyOutcome::Failed {
                endpoint: None,
                reason: format!("no endpoint registered for {}", self.participant_id),
            };
        };
        let endpoint = endpoint.to_string();
        info!(endpoint = %endpoint, "Endpoint to notify");

        let notifier = match self.notifiers.connect(&endpoint) {
            Ok(notifier) => notifier,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Cannot build notifier");
                return NotifyOutcome::Failed {
                    endpoint: Some(endpoint),
                    reason: e.to_string(),
                };
            }
        };

        let copy = activity.sanitized_copy(&self.node_identity);
        match notifier.deliver(&copy).await {
            Ok(()) => {
                debug!(endpoint = %endpoint, "Endpoint successfully notified");
                NotifyOutcome::Sent { endpoint }
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Cannot notify endpoint");
                NotifyOutcome::Failed {
                    endpoint: Some(endpoint),
                    reason: e.to_string(),
                }
            }
        }
    }
}
