//! Path-stack frames and cursor stepping.
//!
//! A position in the tree is a stack of frames recording the descent from
//! the root. For the top frame, `index` names the current entry within the
//! node; for every ancestor frame it names the child slot the descent took.
//! The two readings agree at a boundary: popping back out of child `i`
//! lands on entry `i` of the parent, which is exactly the next entry in
//! key order. An empty stack is the end sentinel.
//!
//! ```text
//!   frames[0]   (root,     2)   child 2 taken
//!   frames[1]   (interior, 0)   child 0 taken
//!   frames[2]   (leaf,     3)   ← current entry
//! ```

use coppice_types::NodeId;

use crate::node::Node;
use crate::store::NodeStore;

/// Generous bound on descent depth, used only in debug assertions. A
/// degree-2 tree needs 32 levels for more entries than a `u32` handle
/// space can address.
pub(crate) const MAX_DEPTH: usize = 64;

/// One level of a descent path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PathFrame {
    /// Handle of the node at this level.
    pub node: NodeId,
    /// Entry index (top frame) or child index taken (ancestor frames).
    pub index: usize,
}

/// Whether two frame stacks denote the same position: both the end
/// sentinel, or the same node identity at the same in-node index.
pub(crate) fn frames_equal(a: &[PathFrame], b: &[PathFrame]) -> bool {
    match (a.last(), b.last()) {
        (None, None) => true,
        (Some(x), Some(y)) => x.node == y.node && x.index == y.index,
        _ => false,
    }
}

/// Extend `frames` down to the first entry of the subtree at `node`.
pub(crate) fn descend_first<K, V, S: NodeStore<K, V>>(
    store: &S,
    mut node: NodeId,
    frames: &mut Vec<PathFrame>,
) {
    loop {
        debug_assert!(frames.len() < MAX_DEPTH, "descent depth out of bounds");
        frames.push(PathFrame { node, index: 0 });
        let block: &Node<K, V> = store.node(node);
        if block.is_leaf() {
            return;
        }
        node = block.children[0];
    }
}

/// Extend `frames` down to the last entry of the subtree at `node`.
pub(crate) fn descend_last<K, V, S: NodeStore<K, V>>(
    store: &S,
    mut node: NodeId,
    frames: &mut Vec<PathFrame>,
) {
    loop {
        debug_assert!(frames.len() < MAX_DEPTH, "descent depth out of bounds");
        let block: &Node<K, V> = store.node(node);
        if block.is_leaf() {
            frames.push(PathFrame {
                node,
                index: block.entries.len() - 1,
            });
            return;
        }
        frames.push(PathFrame {
            node,
            index: block.entries.len(),
        });
        node = block.children[block.entries.len()];
    }
}

/// Step to the successor entry. An exhausted stack is the end sentinel;
/// stepping from the sentinel stays there.
pub(crate) fn step_next<K, V, S: NodeStore<K, V>>(store: &S, frames: &mut Vec<PathFrame>) {
    let Some(top) = frames.last_mut() else {
        return;
    };
    let block = store.node(top.node);
    if block.is_leaf() {
        top.index += 1;
        // Pop while the index has run off the node; the parent's recorded
        // child slot doubles as its next entry slot.
        while let Some(frame) = frames.last() {
            if frame.index < store.node(frame.node).entries.len() {
                return;
            }
            frames.pop();
        }
    } else {
        top.index += 1;
        let child = block.children[top.index];
        descend_first(store, child, frames);
    }
}

/// Step to the predecessor entry. From the end sentinel this lands on the
/// last entry of the tree; stepping back past the first entry yields the
/// sentinel again.
pub(crate) fn step_prev<K, V, S: NodeStore<K, V>>(
    store: &S,
    root: Option<NodeId>,
    frames: &mut Vec<PathFrame>,
) {
    let Some(top) = frames.last_mut() else {
        if let Some(root) = root {
            descend_last(store, root, frames);
        }
        return;
    };
    let block = store.node(top.node);
    if block.is_leaf() {
        if top.index > 0 {
            top.index -= 1;
            return;
        }
        frames.pop();
        while let Some(frame) = frames.last_mut() {
            if frame.index > 0 {
                frame.index -= 1;
                return;
            }
            frames.pop();
        }
    } else {
        let child = block.children[top.index];
        descend_last(store, child, frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SlabNodeStore;
    use coppice_types::MinDegree;

    /// Hand-build a two-level tree:
    ///
    /// ```text
    ///            [20, 40]
    ///        /      |      \
    ///   [10]      [30]      [50, 60]
    /// ```
    fn two_level_tree() -> (SlabNodeStore<i32, ()>, NodeId) {
        let mut store = SlabNodeStore::new(MinDegree::MIN);
        let root = store.allocate_node().expect("alloc root");
        let left = store.allocate_node().expect("alloc left");
        let mid = store.allocate_node().expect("alloc mid");
        let right = store.allocate_node().expect("alloc right");

        store.node_mut(left).entries.push((10, ()));
        store.node_mut(mid).entries.push((30, ()));
        store.node_mut(right).entries.extend([(50, ()), (60, ())]);

        let root_block = store.node_mut(root);
        root_block.entries.extend([(20, ()), (40, ())]);
        root_block.children.extend([left, mid, right]);
        (store, root)
    }

    fn key_at(store: &SlabNodeStore<i32, ()>, frames: &[PathFrame]) -> Option<i32> {
        frames
            .last()
            .map(|frame| store.node(frame.node).entries[frame.index].0)
    }

    #[test]
    fn forward_walk_visits_keys_in_order() {
        let (store, root) = two_level_tree();
        let mut frames = Vec::new();
        descend_first(&store, root, &mut frames);

        let mut seen = Vec::new();
        while let Some(key) = key_at(&store, &frames) {
            seen.push(key);
            step_next(&store, &mut frames);
        }
        assert_eq!(seen, vec![10, 20, 30, 40, 50, 60]);
        assert!(frames.is_empty(), "walk ends at the sentinel");
    }

    #[test]
    fn backward_walk_from_sentinel_visits_keys_reversed() {
        let (store, root) = two_level_tree();
        let mut frames = Vec::new();

        let mut seen = Vec::new();
        loop {
            step_prev(&store, Some(root), &mut frames);
            match key_at(&store, &frames) {
                Some(key) => seen.push(key),
                None => break,
            }
        }
        assert_eq!(seen, vec![60, 50, 40, 30, 20, 10]);
    }

    #[test]
    fn next_then_prev_returns_to_the_same_position() {
        let (store, root) = two_level_tree();
        let mut frames = Vec::new();
        descend_first(&store, root, &mut frames);
        step_next(&store, &mut frames); // at 20, an interior entry

        let before = frames.clone();
        step_next(&store, &mut frames); // down to 30
        step_prev(&store, Some(root), &mut frames); // back up to 20
        assert!(frames_equal(&before, &frames));
        assert_eq!(key_at(&store, &frames), Some(20));
    }

    #[test]
    fn sentinel_compares_equal_only_to_itself() {
        let (store, root) = two_level_tree();
        let mut at_first = Vec::new();
        descend_first(&store, root, &mut at_first);

        assert!(frames_equal(&[], &[]));
        assert!(!frames_equal(&[], &at_first));

        // Same leaf, different index: distinct positions.
        let mut shifted = at_first.clone();
        step_next(&store, &mut shifted);
        assert!(!frames_equal(&at_first, &shifted));
    }

    #[test]
    fn step_next_from_sentinel_is_a_no_op() {
        let (store, _root) = two_level_tree();
        let mut frames: Vec<PathFrame> = Vec::new();
        step_next(&store, &mut frames);
        assert!(frames.is_empty());
    }
}
