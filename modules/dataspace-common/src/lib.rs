pub mod config;
pub mod error;
pub mod type_match;
pub mod types;
pub mod vocab;

pub use config::{load_file_config, ConnectorConfig, FileConfig, GraphConfig, NotificationConfig};
pub use error::{ActivityError, ActivityResult};
pub use type_match::is_type_match;
pub use types::{
    Activity, CallerContext, Edge, NewVertex, Node, ResourceRef, Vertex, VertexPatch,
};
