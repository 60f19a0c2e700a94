use canopy_types::TreeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire shape returned after storing a tree: `{"id": <integer>}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateTreeResponse {
    pub id: TreeId,
}

/// Wire shape returned for an ancestor query: `{"node": <value>}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AncestorResponse {
    pub node: Value,
}
