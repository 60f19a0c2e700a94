use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// One node of a binary tree.
///
/// A node carries an arbitrary JSON value in `node` and up to two children.
/// The JSON shape is `{"node": <value>, "left": {...}, "right": {...}}` with
/// both children optional. Every node reachable from the root must carry a
/// `node` key; [`TreeNode::from_value`] rejects anything else.
///
/// Field order matches lexicographic key order, so serializing a `TreeNode`
/// yields the sorted-key compact form used as the tree's canonical payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct TreeNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeNode>>,
    pub node: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    /// A node without children.
    pub fn leaf(value: impl Into<Value>) -> Self {
        Self {
            left: None,
            node: canonical_value(&value.into()),
            right: None,
        }
    }

    pub fn with_left(mut self, child: TreeNode) -> Self {
        self.left = Some(Box::new(child));
        self
    }

    pub fn with_right(mut self, child: TreeNode) -> Self {
        self.right = Some(Box::new(child));
        self
    }

    /// Build a tree from parsed JSON, validating every node.
    ///
    /// `null` children count as absent. Keys other than `node`, `left` and
    /// `right` are ignored.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        Self::from_value_at(value, "$")
    }

    /// Parse and validate a tree from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, TypeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TypeError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    fn from_value_at(value: &Value, path: &str) -> Result<Self, TypeError> {
        let object = value.as_object().ok_or_else(|| TypeError::NotAnObject {
            path: path.to_string(),
        })?;
        let node = object.get("node").ok_or_else(|| TypeError::MissingNode {
            path: path.to_string(),
        })?;
        Ok(Self {
            left: child_at(object, "left", path)?,
            node: canonical_value(node),
            right: child_at(object, "right", path)?,
        })
    }

    /// The canonical serialization: compact JSON, keys sorted at every level.
    pub fn canonical_json(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// The children of this node, left first.
    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.left.as_deref().into_iter().chain(self.right.as_deref())
    }

    /// Number of nodes in the tree rooted here.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children());
        }
        count
    }

    /// Always `false`: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of levels in the tree rooted here (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(1, self)];
        while let Some((level, node)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(node.children().map(|child| (level + 1, child)));
        }
        deepest
    }
}

impl TryFrom<Value> for TreeNode {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl TryFrom<&Value> for TreeNode {
    type Error = TypeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn child_at(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<Box<TreeNode>>, TypeError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(child) => {
            let child_path = format!("{path}.{key}");
            TreeNode::from_value_at(child, &child_path).map(|node| Some(Box::new(node)))
        }
    }
}

/// Rebuild `value` with object keys inserted in sorted order.
///
/// `serde_json::Map` keeps insertion order when the `preserve_order` feature
/// is enabled anywhere in the build, so the sort is done explicitly.
fn canonical_value(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort();
            let sorted = keys
                .into_iter()
                .map(|key| (key.clone(), canonical_value(&object[key.as_str()])))
                .collect::<Map<String, Value>>();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "node": 1,
            "left": {"node": 2, "left": {"node": 3}},
            "right": {"node": 4, "left": {"node": 5}, "right": {"node": 6}}
        })
    }

    #[test]
    fn parses_well_formed_tree() {
        let tree = TreeNode::from_value(&sample()).unwrap();
        assert_eq!(tree.node, json!(1));
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.left.as_ref().unwrap().node, json!(2));
    }

    #[test]
    fn root_without_node_is_rejected() {
        let err = TreeNode::from_value(&json!({"left": {"node": 1}})).unwrap_err();
        assert_eq!(err, TypeError::MissingNode { path: "$".into() });
    }

    #[test]
    fn nested_node_without_value_names_its_path() {
        let value = json!({"node": 1, "left": {"node": 2, "right": {"left": {"node": 3}}}});
        let err = TreeNode::from_value(&value).unwrap_err();
        assert_eq!(err, TypeError::MissingNode { path: "$.left.right".into() });
    }

    #[test]
    fn scalar_child_is_rejected() {
        let err = TreeNode::from_value(&json!({"node": 1, "right": 7})).unwrap_err();
        assert_eq!(err, TypeError::NotAnObject { path: "$.right".into() });
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = TreeNode::from_value(&json!([1, 2])).unwrap_err();
        assert_eq!(err, TypeError::NotAnObject { path: "$".into() });
    }

    #[test]
    fn null_child_counts_as_absent() {
        let tree = TreeNode::from_value(&json!({"node": 1, "left": null})).unwrap();
        assert!(tree.left.is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn null_node_value_is_accepted() {
        let tree = TreeNode::from_value(&json!({"node": null})).unwrap();
        assert_eq!(tree.node, Value::Null);
    }

    #[test]
    fn canonical_form_sorts_keys() {
        let tree = TreeNode::from_json_str(
            r#"{ "right": {"node": "r"}, "node": {"b": 2, "a": 1}, "left": {"node": "l"} }"#,
        )
        .unwrap();
        assert_eq!(
            tree.canonical_json().unwrap(),
            r#"{"left":{"node":"l"},"node":{"a":1,"b":2},"right":{"node":"r"}}"#
        );
    }

    #[test]
    fn canonical_form_ignores_key_order_and_whitespace() {
        let a = TreeNode::from_json_str(r#"{"node":1,"left":{"node":2}}"#).unwrap();
        let b = TreeNode::from_json_str("{ \"left\" : { \"node\" : 2 } ,\n \"node\" : 1 }").unwrap();
        assert_eq!(a.canonical_json().unwrap(), b.canonical_json().unwrap());
    }

    #[test]
    fn canonical_form_drops_unknown_keys() {
        let tree = TreeNode::from_value(&json!({"node": 1, "colour": "red"})).unwrap();
        assert_eq!(tree.canonical_json().unwrap(), r#"{"node":1}"#);
    }

    #[test]
    fn invalid_json_text_is_reported() {
        let err = TreeNode::from_json_str("{node: 1").unwrap_err();
        assert!(matches!(err, TypeError::InvalidJson(_)));
    }

    #[test]
    fn builders_match_parsed_tree() {
        let built = TreeNode::leaf(1)
            .with_left(TreeNode::leaf(2).with_left(TreeNode::leaf(3)))
            .with_right(
                TreeNode::leaf(4)
                    .with_left(TreeNode::leaf(5))
                    .with_right(TreeNode::leaf(6)),
            );
        assert_eq!(built, TreeNode::from_value(&sample()).unwrap());
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: TreeNode = serde_json::from_str(r#"{"node":"x"}"#).unwrap();
        assert_eq!(ok.node, json!("x"));
        assert!(serde_json::from_str::<TreeNode>(r#"{"left":{"node":"x"}}"#).is_err());
    }
}
