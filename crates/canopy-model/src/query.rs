use canopy_types::TreeId;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// Request for the lowest common ancestor of two node values in one tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AncestorQuery {
    pub id: TreeId,
    pub node_a: Value,
    pub node_b: Value,
}

impl AncestorQuery {
    pub fn new(id: TreeId, node_a: impl Into<Value>, node_b: impl Into<Value>) -> Self {
        Self {
            id,
            node_a: node_a.into(),
            node_b: node_b.into(),
        }
    }

    /// Read a query from `{"id": ..., "node_a": ..., "node_b": ...}`.
    ///
    /// A field set to `null` is present. `id` may be an integer or a string
    /// holding one; anything else cannot name a stored tree.
    pub fn from_value(value: &Value) -> ModelResult<Self> {
        let field = |name: &'static str| value.get(name).ok_or(ModelError::MissingField(name));
        let id = field("id")?;
        let node_a = field("node_a")?;
        let node_b = field("node_b")?;

        let id = match id {
            Value::Number(n) => n.as_i64().map(TreeId::new),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| ModelError::TreeNotFound(id.to_string()))?;

        Ok(Self {
            id,
            node_a: node_a.clone(),
            node_b: node_b.clone(),
        })
    }
}
