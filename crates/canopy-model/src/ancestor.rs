//! Lowest common ancestor search over a [`TreeNode`].
//!
//! The search runs in two phases. An iterative depth-first walk records the
//! root-to-node path of each queried value, then the two paths are aligned
//! from the root end: after trimming the longer path to the length of the
//! shorter one, both are popped together until their tops are the same node.
//! That node is the lowest common ancestor.
//!
//! Values are matched with `serde_json::Value` equality. When a value occurs
//! more than once in a tree, the occurrence visited last wins. Children are
//! pushed left then right, so the walk is a right-first pre-order and which
//! occurrence counts is only defined by that order.

use canopy_types::TreeNode;
use serde_json::Value;

/// Nodes from the root down to (and including) one node.
type Path<'t> = Vec<&'t TreeNode>;

/// Find the value of the lowest common ancestor of `a` and `b`.
///
/// Returns `None` if either value does not occur in the tree.
pub fn lowest_common_ancestor<'t>(root: &'t TreeNode, a: &Value, b: &Value) -> Option<&'t Value> {
    let (path_a, path_b) = find_paths(root, a, b);
    align(path_a?, path_b?).map(|node| &node.node)
}

/// Walk the tree once, recording the path to the last node matching each value.
fn find_paths<'t>(
    root: &'t TreeNode,
    a: &Value,
    b: &Value,
) -> (Option<Path<'t>>, Option<Path<'t>>) {
    let mut path_a = None;
    let mut path_b = None;
    let mut path: Path<'t> = Vec::new();
    // Each pending node carries the length the path had when its parent was
    // on top. The root's parent is the empty path.
    let mut pending: Vec<(usize, &'t TreeNode)> = vec![(0, root)];

    while let Some((parent_len, node)) = pending.pop() {
        // The stack interleaves subtrees, so drop whatever sibling branch
        // was walked since the parent was visited.
        path.truncate(parent_len);
        path.push(node);

        if node.node == *a {
            path_a = Some(path.clone());
        }
        if node.node == *b {
            path_b = Some(path.clone());
        }

        let len = path.len();
        pending.extend(node.children().map(|child| (len, child)));
    }

    (path_a, path_b)
}

/// The deepest node shared by two root-to-node paths.
fn align<'t>(mut a: Path<'t>, mut b: Path<'t>) -> Option<&'t TreeNode> {
    // Position counted from the root is preserved when trimming the deep end.
    let common = a.len().min(b.len());
    a.truncate(common);
    b.truncate(common);

    while let (Some(x), Some(y)) = (a.pop(), b.pop()) {
        if std::ptr::eq(x, y) {
            return Some(x);
        }
    }
    None
}
