//! The scrolling state tree: the main thread's snapshot of scroll geometry
//! and viewport constraints, keyed by stable node IDs.
//!
//! The tree mirrors the compositing layer tree's scrollable and
//! viewport-constrained subset. Nodes accumulate changed state between
//! commits; a commit hands the dirty subset to the scrolling thread and
//! resets the dirty tracking.

use std::collections::{HashMap, HashSet};

use log::warn;
use swivel_traits::{
    LayoutRect, ScrollingLayerPositionAction, ScrollingNodeID, ScrollingNodeType,
};

use crate::errors::{Error, Result};

mod node;

pub use node::{
    FrameScrollingState, OverflowScrollingState, RequestedScrollPosition, ScrollingState,
    ScrollingStateNode, ScrollingStateNodeKind,
};

#[derive(Debug, Default)]
pub struct ScrollingStateTree {
    nodes: HashMap<ScrollingNodeID, ScrollingStateNode>,
    root: Option<ScrollingNodeID>,
    has_changed_properties: bool,
    /// IDs detached since the last commit. Such an ID must not be reattached
    /// until the commit has told the scrolling thread about the removal.
    nodes_removed_since_last_commit: HashSet<ScrollingNodeID>,
    next_fresh_id: u64,
}

impl ScrollingStateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_node_id(&self) -> Option<ScrollingNodeID> {
        self.root
    }

    pub fn root_state_node(&self) -> Option<&ScrollingStateNode> {
        self.root.and_then(|id| self.nodes.get(&id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_changed_properties(&self) -> bool {
        self.has_changed_properties
    }

    pub fn state_node_for_id(&self, id: ScrollingNodeID) -> Option<&ScrollingStateNode> {
        self.nodes.get(&id)
    }

    /// Mutable lookup. Marks the node (and the tree) as carrying changed
    /// properties for the next commit.
    pub fn state_node_mut(&mut self, id: ScrollingNodeID) -> Option<&mut ScrollingStateNode> {
        let node = self.nodes.get_mut(&id)?;
        node.changed = true;
        self.has_changed_properties = true;
        Some(node)
    }

    /// Inserts a node of the given type under `parent`, returning the ID it
    /// now lives under.
    ///
    /// Attaching a root node replaces the whole tree. A `new_node_id` that
    /// was detached since the last commit cannot be reused yet; a fresh ID
    /// is allocated instead so the scrolling thread never sees one ID die
    /// and come back within a single commit.
    pub fn attach_node(
        &mut self,
        node_type: ScrollingNodeType,
        new_node_id: ScrollingNodeID,
        parent: Option<ScrollingNodeID>,
    ) -> Result<ScrollingNodeID> {
        debug_assert!(new_node_id.0 != 0);

        let id = if self.nodes_removed_since_last_commit.contains(&new_node_id) {
            let fresh = self.allocate_fresh_id(new_node_id);
            warn!("node {new_node_id} removed earlier this commit; reattaching as {fresh}");
            fresh
        } else {
            new_node_id
        };

        if let Some(existing) = self.nodes.get(&id) {
            debug_assert!(existing.node_type() == node_type);
            debug_assert!(existing.parent() == parent);
            return Ok(id);
        }

        match parent {
            None => {
                // A new root supplants any existing tree.
                self.clear();
                let node = ScrollingStateNode::new(node_type, id, None);
                self.nodes.insert(id, node);
                self.root = Some(id);
            }
            Some(parent_id) => {
                if !self.nodes.contains_key(&parent_id) {
                    return Err(Error::ParentNodeMissing(parent_id));
                }
                let node = ScrollingStateNode::new(node_type, id, Some(parent_id));
                self.nodes.insert(id, node);
                if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                    parent_node.children.push(id);
                }
            }
        }

        self.has_changed_properties = true;
        Ok(id)
    }

    /// Removes the node and its entire subtree. Detaching an unknown ID is
    /// a no-op.
    pub fn detach_node(&mut self, id: ScrollingNodeID) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        if let Some(parent_id) = self.nodes.get(&id).and_then(|node| node.parent()) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|child| *child != id);
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.remove_subtree(id);
        self.has_changed_properties = true;
    }

    fn remove_subtree(&mut self, id: ScrollingNodeID) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        self.nodes_removed_since_last_commit.insert(id);
        for child in node.children {
            self.remove_subtree(child);
        }
    }

    pub fn clear(&mut self) {
        let ids: Vec<_> = self.nodes.keys().copied().collect();
        self.nodes_removed_since_last_commit.extend(ids);
        self.nodes.clear();
        self.root = None;
        self.has_changed_properties = true;
    }

    /// Ends the current commit window: dirty flags reset and detached IDs
    /// become reusable again.
    pub fn commit(&mut self) {
        for node in self.nodes.values_mut() {
            node.changed = false;
        }
        self.nodes_removed_since_last_commit.clear();
        self.has_changed_properties = false;
    }

    /// Repositions every viewport-constrained layer in the tree against the
    /// given viewport rect, in depth-first order from the root.
    pub fn reconcile_layer_positions(
        &self,
        viewport_rect: &LayoutRect,
        action: ScrollingLayerPositionAction,
    ) {
        let Some(root) = self.root else {
            return;
        };
        self.reconcile_subtree(root, viewport_rect, action);
    }

    fn reconcile_subtree(
        &self,
        id: ScrollingNodeID,
        viewport_rect: &LayoutRect,
        action: ScrollingLayerPositionAction,
    ) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        node.reconcile_layer_position_for_viewport_rect(viewport_rect, action);
        for child in node.children() {
            self.reconcile_subtree(*child, viewport_rect, action);
        }
    }

    fn allocate_fresh_id(&mut self, requested: ScrollingNodeID) -> ScrollingNodeID {
        let mut candidate = self.next_fresh_id.max(requested.0 + 1);
        loop {
            let id = ScrollingNodeID(candidate);
            if !self.nodes.contains_key(&id)
                && !self.nodes_removed_since_last_commit.contains(&id)
            {
                self.next_fresh_id = candidate + 1;
                return id;
            }
            candidate += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_lookup() {
        let mut tree = ScrollingStateTree::new();
        let root = tree
            .attach_node(ScrollingNodeType::FrameScrolling, ScrollingNodeID(1), None)
            .unwrap();
        let fixed = tree
            .attach_node(ScrollingNodeType::Fixed, ScrollingNodeID(2), Some(root))
            .unwrap();

        assert_eq!(tree.root_node_id(), Some(root));
        assert_eq!(tree.node_count(), 2);
        assert_eq!(
            tree.state_node_for_id(fixed).map(|node| node.node_type()),
            Some(ScrollingNodeType::Fixed)
        );
        assert_eq!(
            tree.state_node_for_id(root).map(|node| node.children().to_vec()),
            Some(vec![fixed])
        );
    }

    #[test]
    fn test_attach_under_missing_parent_fails() {
        let mut tree = ScrollingStateTree::new();
        let result = tree.attach_node(
            ScrollingNodeType::Sticky,
            ScrollingNodeID(5),
            Some(ScrollingNodeID(4)),
        );
        assert!(matches!(result, Err(Error::ParentNodeMissing(_))));
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_new_root_replaces_tree() {
        let mut tree = ScrollingStateTree::new();
        let old_root = tree
            .attach_node(ScrollingNodeType::FrameScrolling, ScrollingNodeID(1), None)
            .unwrap();
        tree.attach_node(ScrollingNodeType::Fixed, ScrollingNodeID(2), Some(old_root))
            .unwrap();

        let new_root = tree
            .attach_node(ScrollingNodeType::FrameScrolling, ScrollingNodeID(3), None)
            .unwrap();
        assert_eq!(tree.root_node_id(), Some(new_root));
        assert_eq!(tree.node_count(), 1);
        assert!(tree.state_node_for_id(old_root).is_none());
    }

    #[test]
    fn test_detach_removes_subtree() {
        let mut tree = ScrollingStateTree::new();
        let root = tree
            .attach_node(ScrollingNodeType::FrameScrolling, ScrollingNodeID(1), None)
            .unwrap();
        let overflow = tree
            .attach_node(
                ScrollingNodeType::OverflowScrolling,
                ScrollingNodeID(2),
                Some(root),
            )
            .unwrap();
        let sticky = tree
            .attach_node(ScrollingNodeType::Sticky, ScrollingNodeID(3), Some(overflow))
            .unwrap();

        tree.detach_node(overflow);
        assert!(tree.state_node_for_id(overflow).is_none());
        assert!(tree.state_node_for_id(sticky).is_none());
        assert_eq!(
            tree.state_node_for_id(root).map(|node| node.children().len()),
            Some(0)
        );

        // Detaching again is harmless.
        tree.detach_node(overflow);
    }

    #[test]
    fn test_no_id_reuse_within_a_commit() {
        let mut tree = ScrollingStateTree::new();
        let root = tree
            .attach_node(ScrollingNodeType::FrameScrolling, ScrollingNodeID(1), None)
            .unwrap();
        let overflow = tree
            .attach_node(
                ScrollingNodeType::OverflowScrolling,
                ScrollingNodeID(2),
                Some(root),
            )
            .unwrap();
        tree.detach_node(overflow);

        // Reattaching the detached ID before the commit gets a fresh one.
        let reattached = tree
            .attach_node(
                ScrollingNodeType::OverflowScrolling,
                ScrollingNodeID(2),
                Some(root),
            )
            .unwrap();
        assert_ne!(reattached, overflow);

        // After the commit the original ID is available again.
        tree.detach_node(reattached);
        tree.commit();
        let after_commit = tree
            .attach_node(
                ScrollingNodeType::OverflowScrolling,
                ScrollingNodeID(2),
                Some(root),
            )
            .unwrap();
        assert_eq!(after_commit, ScrollingNodeID(2));
    }

    #[test]
    fn test_commit_clears_dirty_state() {
        let mut tree = ScrollingStateTree::new();
        let root = tree
            .attach_node(ScrollingNodeType::FrameScrolling, ScrollingNodeID(1), None)
            .unwrap();
        assert!(tree.has_changed_properties());

        tree.commit();
        assert!(!tree.has_changed_properties());
        assert!(
            !tree
                .state_node_for_id(root)
                .is_some_and(|node| node.has_changed_properties())
        );

        // A mutable lookup re-dirties the node and the tree.
        tree.state_node_mut(root);
        assert!(tree.has_changed_properties());
        assert!(
            tree.state_node_for_id(root)
                .is_some_and(|node| node.has_changed_properties())
        );
    }

    #[test]
    fn test_clear_empties_tree() {
        let mut tree = ScrollingStateTree::new();
        let root = tree
            .attach_node(ScrollingNodeType::FrameScrolling, ScrollingNodeID(1), None)
            .unwrap();
        tree.attach_node(ScrollingNodeType::Fixed, ScrollingNodeID(2), Some(root))
            .unwrap();

        tree.clear();
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.root_node_id(), None);
    }
}
