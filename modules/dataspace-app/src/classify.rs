//! One-shot classification of an incoming activity into a closed route.
//!
//! Validation runs first and touches nothing external. Routing then maps the
//! (activity, object, target) types onto a `ClassifiedActivity`; every
//! combination not listed there is unsupported.

use dataspace_common::vocab::{
    ACTIVITY_IRI_ADD, ACTIVITY_IRI_CREATE, ACTIVITY_TYPE_ADD, ACTIVITY_TYPE_CREATE,
    CONSIGNMENT_TYPE, DOCUMENT_TYPE, EVENT_TYPE,
};
use dataspace_common::{Activity, ActivityError, ActivityResult, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityVerb {
    Create,
    Add,
}

impl ActivityVerb {
    /// Short names and their activity-streams IRIs are aliases.
    pub fn parse(activity_type: &str) -> Option<Self> {
        match activity_type {
            ACTIVITY_TYPE_CREATE | ACTIVITY_IRI_CREATE => Some(ActivityVerb::Create),
            ACTIVITY_TYPE_ADD | ACTIVITY_IRI_ADD => Some(ActivityVerb::Add),
            _ => None,
        }
    }

    pub fn iri(self) -> &'static str {
        match self {
            ActivityVerb::Create => ACTIVITY_IRI_CREATE,
            ActivityVerb::Add => ACTIVITY_IRI_ADD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedActivity {
    CreateConsignment { consignment: Node },
    AddDocument { document: Node, consignment: Node },
    AddEvent { event: Node, consignment: Node },
}

impl ClassifiedActivity {
    pub fn label(&self) -> &'static str {
        match self {
            ClassifiedActivity::CreateConsignment { .. } => "create_consignment",
            ClassifiedActivity::AddDocument { .. } => "add_document",
            ClassifiedActivity::AddEvent { .. } => "add_event",
        }
    }
}

pub fn classify(activity: &Activity) -> ActivityResult<ClassifiedActivity> {
    // --- Validating ---

    let object = activity
        .object_node()
        .ok_or_else(|| ActivityError::Validation("activity.object must be an object".into()))?;

    if activity.actor_id().is_none() {
        return Err(ActivityError::Validation("activity.actor.id is required".into()));
    }

    if activity.published.is_some() && activity.published_at().is_none() {
        return Err(ActivityError::Validation(
            "activity.published must be an RFC 3339 timestamp".into(),
        ));
    }

    let verb = ActivityVerb::parse(&activity.activity_type);

    let target = match verb {
        Some(ActivityVerb::Add) => Some(activity.target_node().ok_or_else(|| {
            ActivityError::Validation("activity.target must be an object".into())
        })?),
        _ => None,
    };

    // --- Routing ---

    match (verb, target) {
        (Some(ActivityVerb::Create), _) if object.is_vocab_type(CONSIGNMENT_TYPE) => {
            Ok(ClassifiedActivity::CreateConsignment { consignment: object })
        }
        (Some(ActivityVerb::Add), Some(target)) if target.is_vocab_type(CONSIGNMENT_TYPE) => {
            let is_document = object.is_vocab_type(DOCUMENT_TYPE);
            let is_event = object.is_vocab_type(EVENT_TYPE);
            if !is_document && !is_event {
                return Err(unsupported(activity, &object, Some(&target)));
            }
            if target.global_id().is_none() {
                return Err(ActivityError::Validation(
                    "activity.target.globalId is required to address a consignment".into(),
                ));
            }
            if is_event {
                Ok(ClassifiedActivity::AddEvent {
                    event: object,
                    consignment: target,
                })
            } else {
                Ok(ClassifiedActivity::AddDocument {
                    document: object,
                    consignment: target,
                })
            }
        }
        (_, target) => Err(unsupported(activity, &object, target.as_ref())),
    }
}

fn unsupported(activity: &Activity, object: &Node, target: Option<&Node>) -> ActivityError {
    let target_label = target
        .map(Node::type_label)
        .unwrap_or_else(|| "<none>".to_string());
    ActivityError::UnsupportedActivity(format!(
        "{} activity for object type {} and target type {}",
        activity.activity_type,
        object.type_label(),
        target_label
    ))
}
