//! Nodes and the balancing engine. Everything in here is purely structural:
//! no function looks at a payload, so the comparator never runs here.
//!
//! Every function takes ownership of a subtree root and returns the root of
//! the resulting subtree, which the caller must link back into the parent.

use std::fmt;

/// An owned, possibly empty, subtree.
pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// Largest height difference allowed between the two children of a node.
const MAX_IMBALANCE: isize = 1;

pub(crate) struct Node<T> {
    pub(crate) payload: T,
    /// How many times an equal payload has been inserted. Always at least 1.
    pub(crate) count: usize,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    /// Edges on the longest path down to a leaf. A leaf has a height of 0.
    pub(crate) height: isize,
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("payload", &self.payload)
            .field("count", &self.count)
            .field("height", &self.height)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

impl<T> Node<T> {
    /// A single node tree holding `payload`.
    pub(crate) fn new_boxed(payload: T) -> Box<Self> {
        Box::new(Self {
            payload,
            count: 1,
            left: None,
            right: None,
            height: 0,
        })
    }

    fn fix_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// Positive when the right subtree is taller.
    fn balance_factor(&self) -> isize {
        height(&self.right) - height(&self.left)
    }
}

/// Height of a subtree. The empty subtree has a height of -1.
pub(crate) fn height<T>(link: &Link<T>) -> isize {
    link.as_ref().map_or(-1, |node| node.height)
}

/// Rotate `old_root` to the right. This moves the left child up vertically
/// and `old_root` down vertically. Must only be called when there _is_ a left
/// child.
///
/// ## Panics
///
/// When called on a node without a left child.
///
/// # Diagram
///
/// ```text
///      old_root              new_root
///       /    \                /    \
///  new_root   z   rotate ->  x    old_root
///    / \                           /  \
///   x   y                         y    z
/// ```
pub(crate) fn rotate_right<T>(mut old_root: Box<Node<T>>) -> Box<Node<T>> {
    let mut new_root = old_root.left.take().expect("Rotate right => left child");
    log::trace!("rotating right at height {}", old_root.height);

    old_root.left = new_root.right.take();
    old_root.fix_height();

    new_root.right = Some(old_root);
    new_root.fix_height();
    new_root
}

/// Mirror image of [`rotate_right`]: the right child becomes the root.
///
/// ## Panics
///
/// When called on a node without a right child.
pub(crate) fn rotate_left<T>(mut old_root: Box<Node<T>>) -> Box<Node<T>> {
    let mut new_root = old_root.right.take().expect("Rotate left => right child");
    log::trace!("rotating left at height {}", old_root.height);

    old_root.right = new_root.left.take();
    old_root.fix_height();

    new_root.left = Some(old_root);
    new_root.fix_height();
    new_root
}

/// Fixes a left child that leans right: first rotate the child left, then
/// the root right.
pub(crate) fn rotate_left_right<T>(mut root: Box<Node<T>>) -> Box<Node<T>> {
    root.left = root.left.take().map(rotate_left);
    rotate_right(root)
}

/// Fixes a right child that leans left: first rotate the child right, then
/// the root left.
pub(crate) fn rotate_right_left<T>(mut root: Box<Node<T>>) -> Box<Node<T>> {
    root.right = root.right.take().map(rotate_right);
    rotate_left(root)
}

/// Restores the AVL invariant at `root` and refreshes its cached height.
///
/// Both children must already be valid AVL trees and their heights may differ
/// by at most 2, which is all a single insertion or deletion below `root` can
/// cause. This must run on every node of a mutated path, bottom up, even when
/// nothing needs rotating.
///
/// See <https://en.wikipedia.org/wiki/AVL_tree#Rebalancing> for terminology.
pub(crate) fn rebalance<T>(mut root: Box<Node<T>>) -> Box<Node<T>> {
    root.fix_height();
    debug_assert!(root.balance_factor().abs() <= MAX_IMBALANCE + 1);

    let mut root = if root.balance_factor() < -MAX_IMBALANCE {
        let left = root.left.as_ref().expect("Left heavy => left child");
        // Single rotation unless the inner grandchild is strictly taller.
        if height(&left.left) >= height(&left.right) {
            rotate_right(root)
        } else {
            rotate_left_right(root)
        }
    } else if root.balance_factor() > MAX_IMBALANCE {
        let right = root.right.as_ref().expect("Right heavy => right child");
        if height(&right.right) >= height(&right.left) {
            rotate_left(root)
        } else {
            rotate_right_left(root)
        }
    } else {
        root
    };
    root.fix_height();

    if cfg!(debug_assertions) {
        let left_height = height(&root.left);
        let right_height = height(&root.right);
        assert_eq!(root.height, left_height.max(right_height) + 1);
        assert!(left_height.abs_diff(right_height) <= MAX_IMBALANCE as usize);
    }
    root
}

/// [`rebalance`] whatever subtree hangs off `link`, leaving it linked there.
pub(crate) fn rebalance_link<T>(link: &mut Link<T>) {
    if let Some(root) = link.take() {
        *link = Some(rebalance(root));
    }
}
