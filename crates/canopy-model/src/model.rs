use std::sync::Arc;

use canopy_store::TreeStore;
use canopy_types::{PayloadDigest, TreeId, TreeNode};
use serde_json::Value;

use crate::ancestor;
use crate::error::{ModelError, ModelResult};
use crate::query::AncestorQuery;

/// Validates trees, persists them by content, and answers ancestor queries.
///
/// The model holds no state of its own beyond the store handle; every query
/// re-reads and re-parses the stored tree.
pub struct TreeModel {
    store: Arc<dyn TreeStore>,
}

impl TreeModel {
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }

    /// Validate `tree`, store its canonical form, and return its id.
    ///
    /// Submitting a tree whose canonical form is already stored returns the
    /// existing id.
    pub fn create_new_tree(&self, tree: &Value) -> ModelResult<TreeId> {
        let root = TreeNode::from_value(tree).map_err(|e| ModelError::MalformedTree(e.to_string()))?;
        let payload = root
            .canonical_json()
            .map_err(|e| ModelError::MalformedTree(e.to_string()))?;
        // Refuse trees that serialize but nest too deeply for `load` to parse.
        serde_json::from_str::<Value>(&payload)
            .map_err(|e| ModelError::MalformedTree(format!("tree cannot be stored: {e}")))?;

        let id = self.store.insert(&payload)?;
        tracing::debug!(
            %id,
            digest = %PayloadDigest::of(&payload).short_hex(),
            nodes = root.len(),
            "created tree"
        );
        Ok(id)
    }

    /// Answer `{"id", "node_a", "node_b"}` with the value of the lowest
    /// common ancestor.
    pub fn lowest_common_ancestor(&self, query: &Value) -> ModelResult<Value> {
        let query = AncestorQuery::from_value(query)?;
        self.resolve(&query)
    }

    /// Answer an already parsed query.
    pub fn resolve(&self, query: &AncestorQuery) -> ModelResult<Value> {
        let root = self.load(query.id)?;
        let found = ancestor::lowest_common_ancestor(&root, &query.node_a, &query.node_b)
            .cloned()
            .ok_or(ModelError::AncestorNotFound)?;
        tracing::debug!(id = %query.id, ancestor = %found, "resolved ancestor");
        Ok(found)
    }

    /// Fetch and parse the tree stored under `id`.
    ///
    /// Every fetch or parse failure reads as "not found"; the cause is only
    /// logged.
    fn load(&self, id: TreeId) -> ModelResult<TreeNode> {
        let payload = self.store.select(id).map_err(|e| {
            tracing::debug!(%id, error = %e, "tree lookup failed");
            ModelError::TreeNotFound(id.to_string())
        })?;
        let value: Value = serde_json::from_str(&payload).map_err(|e| {
            tracing::warn!(%id, error = %e, "stored tree is not valid JSON");
            ModelError::TreeNotFound(id.to_string())
        })?;
        TreeNode::from_value(&value).map_err(|e| ModelError::MalformedTree(e.to_string()))
    }
}

impl std::fmt::Debug for TreeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeModel").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_store::{InMemoryTreeStore, SqliteTreeStore};
    use serde_json::json;

    fn model() -> (Arc<InMemoryTreeStore>, TreeModel) {
        let store = Arc::new(InMemoryTreeStore::new());
        let model = TreeModel::new(store.clone());
        (store, model)
    }

    fn big() -> Value {
        json!({
            "node": 1,
            "left": {"node": 2, "left": {"node": 3}},
            "right": {"node": 4, "left": {"node": 5}, "right": {"node": 6}}
        })
    }

    fn ask(model: &TreeModel, id: TreeId, a: Value, b: Value) -> ModelResult<Value> {
        model.lowest_common_ancestor(&json!({"id": id, "node_a": a, "node_b": b}))
    }

    #[test]
    fn same_tree_twice_yields_same_id() {
        let (store, model) = model();
        let tree = json!({"node": 1, "left": {"node": 2, "left": {"node": 3}}});
        let first = model.create_new_tree(&tree).unwrap();
        let second = model.create_new_tree(&tree).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn id_depends_only_on_content() {
        let (_, model) = model();
        let left = model
            .create_new_tree(&json!({"node": 1, "left": {"node": 2, "left": {"node": 3}}}))
            .unwrap();
        let right = model
            .create_new_tree(&json!({"node": 1, "left": {"node": 2, "right": {"node": 3}}}))
            .unwrap();
        assert_ne!(left, right);
    }

    #[test]
    fn key_order_does_not_change_the_id() {
        let (_, model) = model();
        let a = model.create_new_tree(&json!({"node": {"x": 1, "y": 2}})).unwrap();
        let b: Value = serde_json::from_str(r#"{"node": {"y": 2, "x": 1}}"#).unwrap();
        assert_eq!(model.create_new_tree(&b).unwrap(), a);
    }

    #[test]
    fn stores_canonical_payload() {
        let (store, model) = model();
        let id = model
            .create_new_tree(&json!({"right": {"node": 2}, "node": 1}))
            .unwrap();
        assert_eq!(store.select(id).unwrap(), r#"{"node":1,"right":{"node":2}}"#);
    }

    #[test]
    fn tree_without_root_value_is_malformed() {
        let (store, model) = model();
        let err = model.create_new_tree(&json!({"left": {"node": 1}})).unwrap_err();
        assert!(matches!(err, ModelError::MalformedTree(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn nested_node_without_value_is_malformed() {
        let (_, model) = model();
        let err = model
            .create_new_tree(&json!({"node": 1, "right": {"left": {"node": 2}}}))
            .unwrap_err();
        assert!(err.to_string().contains("$.right"));
    }

    #[test]
    fn unknown_id_is_tree_not_found() {
        let (_, model) = model();
        let err = ask(&model, TreeId::new(1000), json!(1), json!(3)).unwrap_err();
        assert!(matches!(err, ModelError::TreeNotFound(_)));
    }

    #[test]
    fn corrupt_record_reads_as_not_found() {
        let (store, model) = model();
        let id = store.insert("Testing").unwrap();
        let err = ask(&model, id, json!(1), json!(1)).unwrap_err();
        assert!(matches!(err, ModelError::TreeNotFound(_)));
    }

    #[test]
    fn stored_record_with_missing_value_is_malformed() {
        let (store, model) = model();
        let id = store.insert(r#"{"node":1,"left":{"right":{"node":2}}}"#).unwrap();
        let err = ask(&model, id, json!(1), json!(2)).unwrap_err();
        assert!(matches!(err, ModelError::MalformedTree(_)));
    }

    #[test]
    fn missing_query_field() {
        let (_, model) = model();
        let id = model.create_new_tree(&big()).unwrap();
        let err = model
            .lowest_common_ancestor(&json!({"id": id, "node_a": 1}))
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingField("node_b")));
    }

    #[test]
    fn absent_value_is_ancestor_not_found() {
        let (_, model) = model();
        let id = model.create_new_tree(&big()).unwrap();
        let err = ask(&model, id, json!(6), json!(42)).unwrap_err();
        assert!(matches!(err, ModelError::AncestorNotFound));
    }

    #[test]
    fn six_node_scenario() {
        let (_, model) = model();
        let id = model.create_new_tree(&big()).unwrap();
        let cases = [(6, 3, 1), (1, 1, 1), (6, 6, 6), (6, 2, 1), (2, 6, 1)];
        for (a, b, expected) in cases {
            assert_eq!(ask(&model, id, json!(a), json!(b)).unwrap(), json!(expected), "lca({a}, {b})");
        }
    }

    #[test]
    fn three_level_chain() {
        let (_, model) = model();
        let id = model
            .create_new_tree(&json!({"node": 1, "left": {"node": 2, "left": {"node": 3}}}))
            .unwrap();
        assert_eq!(ask(&model, id, json!(1), json!(3)).unwrap(), json!(1));
        assert_eq!(ask(&model, id, json!(3), json!(3)).unwrap(), json!(3));
    }

    #[test]
    fn string_trees() {
        let (_, model) = model();
        let id = model
            .create_new_tree(&json!({"node": "un nodo", "left": {"node": "otro nodo"}}))
            .unwrap();
        let found = ask(&model, id, json!("un nodo"), json!("otro nodo")).unwrap();
        assert_eq!(found, json!("un nodo"));
    }

    #[test]
    fn object_trees() {
        let (_, model) = model();
        let id = model
            .create_new_tree(&json!({
                "node": {"name": "John", "surname": "Doe"},
                "left": {"node": {"name": "Fulano", "surname": "de Tal"}}
            }))
            .unwrap();
        let found = ask(
            &model,
            id,
            json!({"name": "John", "surname": "Doe"}),
            json!({"name": "Fulano", "surname": "de Tal"}),
        )
        .unwrap();
        assert_eq!(found.to_string(), r#"{"name":"John","surname":"Doe"}"#);
    }

    #[test]
    fn over_nested_tree_is_refused() {
        let (store, model) = model();
        let mut tree = json!({"node": 0});
        for value in 1..200 {
            tree = json!({"node": value, "left": tree});
        }
        let err = model.create_new_tree(&tree).unwrap_err();
        assert!(matches!(err, ModelError::MalformedTree(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn deep_accepted_tree_can_be_queried() {
        let (_, model) = model();
        let mut tree = json!({"node": 0});
        for value in 1..100 {
            tree = json!({"node": value, "left": tree});
        }
        let id = model.create_new_tree(&tree).unwrap();
        assert_eq!(ask(&model, id, json!(0), json!(1)).unwrap(), json!(1));
        assert_eq!(ask(&model, id, json!(0), json!(98)).unwrap(), json!(98));
    }

    #[test]
    fn works_over_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteTreeStore::open(dir.path().join("trees.db")).unwrap());
        let model = TreeModel::new(store.clone());
        let id = model.create_new_tree(&big()).unwrap();
        assert_eq!(model.create_new_tree(&big()).unwrap(), id);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(ask(&model, id, json!(5), json!(6)).unwrap(), json!(4));
    }
}
