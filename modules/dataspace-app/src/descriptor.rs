use serde::{Deserialize, Serialize};

use dataspace_common::vocab::{CONSIGNMENT_TYPE, DOCUMENT_TYPE, EVENT_TYPE};
use dataspace_common::Activity;

use crate::classify::ActivityVerb;

pub const APP_ID: &str = "https://twin.example.org/app1";
pub const MODULE_NAME: &str = "dataspace-app";

/// One (activity, object, target) shape the app accepts. The surrounding
/// router uses these to decide what to forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    pub activity_type: String,
}

impl ActivityQuery {
    pub fn new(verb: ActivityVerb, object_type: &str, target_type: Option<&str>) -> Self {
        Self {
            object_type: object_type.to_string(),
            target_type: target_type.map(str::to_string),
            activity_type: verb.iri().to_string(),
        }
    }

    /// Whether `activity` has this shape, honouring short-name aliases.
    pub fn matches(&self, activity: &Activity) -> bool {
        let (Some(wanted), Some(actual)) = (
            ActivityVerb::parse(&self.activity_type),
            ActivityVerb::parse(&activity.activity_type),
        ) else {
            return false;
        };
        if wanted != actual {
            return false;
        }

        let object_ok = activity
            .object_node()
            .is_some_and(|o| o.is_vocab_type(&self.object_type));
        let target_ok = match &self.target_type {
            Some(target_type) => activity
                .target_node()
                .is_some_and(|t| t.is_vocab_type(target_type)),
            None => true,
        };
        object_ok && target_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    pub id: String,
    pub module_name: String,
    pub activities_handled: Vec<ActivityQuery>,
}

impl AppDescriptor {
    pub fn consignment_app() -> Self {
        Self {
            id: APP_ID.to_string(),
            module_name: MODULE_NAME.to_string(),
            activities_handled: activities_handled(),
        }
    }

    pub fn handles(&self, activity: &Activity) -> bool {
        self.activities_handled.iter().any(|q| q.matches(activity))
    }
}

pub fn activities_handled() -> Vec<ActivityQuery> {
    vec![
        ActivityQuery::new(ActivityVerb::Create, CONSIGNMENT_TYPE, None),
        ActivityQuery::new(ActivityVerb::Add, DOCUMENT_TYPE, Some(CONSIGNMENT_TYPE)),
        ActivityQuery::new(ActivityVerb::Add, EVENT_TYPE, Some(CONSIGNMENT_TYPE)),
    ]
}
