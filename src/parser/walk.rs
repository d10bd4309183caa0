//! Preorder traversal with explicit control flow.

use super::SyntaxNode;
use rowan::WalkEvent;

/// What a visitor wants the walk to do after seeing a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Descend into the node's children
    Continue,
    /// Move on to the next sibling without visiting the children
    SkipChildren,
    /// End the walk
    Stop,
}

/// Visit `root` and its descendants in document order.
///
/// Returns `false` when the visitor stopped the walk early.
pub fn walk(root: &SyntaxNode, mut visit: impl FnMut(&SyntaxNode) -> WalkControl) -> bool {
    let mut preorder = root.preorder();
    while let Some(event) = preorder.next() {
        let WalkEvent::Enter(node) = event else {
            continue;
        };
        match visit(&node) {
            WalkControl::Continue => {}
            WalkControl::SkipChildren => preorder.skip_subtree(),
            WalkControl::Stop => return false,
        }
    }
    true
}
