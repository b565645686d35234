use tracing::info;

use dataspace_common::vocab::CONSIGNMENT_TYPE;
use dataspace_common::{ActivityError, ActivityResult, CallerContext, Node};
use dataspace_graph::VertexMaterializer;

/// Create a vertex for a new consignment. Every call creates a new vertex.
pub async fn handle_consignment_create(
    consignment: &Node,
    caller: &CallerContext,
    materializer: &VertexMaterializer,
) -> ActivityResult<String> {
    if !consignment.is_vocab_type(CONSIGNMENT_TYPE) {
        return Err(ActivityError::UnsupportedActivity(format!(
            "Create activity for type {}",
            consignment.type_label()
        )));
    }

    let vertex_id = materializer.create_vertex(consignment, caller).await?;
    info!(vertex_id = %vertex_id, "Item created");
    Ok(vertex_id)
}
