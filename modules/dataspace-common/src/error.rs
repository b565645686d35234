use thiserror::Error;

/// Failures surfaced to the transport layer by the activity dispatcher.
///
/// Notification delivery problems never appear here; they are reported as a
/// `NotifyOutcome` instead.
#[derive(Error, Debug)]
pub enum ActivityError {
    /// Malformed or missing object/target/actor. Raised before any store call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The (activity, object, target) type combination is not handled here.
    #[error("Unsupported activity: {0}")]
    UnsupportedActivity(String),

    /// A referenced entity does not exist, e.g. the consignment for an event.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Graph, stream or directory collaborator failure, passed through unchanged.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ActivityError {
    /// Short machine-friendly label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ActivityError::Validation(_) => "validation",
            ActivityError::UnsupportedActivity(_) => "unsupported_activity",
            ActivityError::NotFound(_) => "not_found",
            ActivityError::Store(_) => "store",
        }
    }
}

pub type ActivityResult<T> = std::result::Result<T, ActivityError>;
