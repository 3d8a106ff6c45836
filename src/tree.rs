//! A self-balancing Binary Search Tree (specifically, an AVL tree) over
//! opaque payloads ordered by an injected comparator.
//!
//! Equal payloads are not stored twice. Inserting a payload that compares
//! equal to a stored one bumps that node's count instead, so a tree behaves
//! like a multiset whose elements are each stored once.
//!
//! # Examples
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use bstree::Tree;
//!
//! let mut tree = Tree::default();
//! for x in [3, 1, 2, 3, 3] {
//!     tree.insert(x);
//! }
//!
//! assert_eq!(tree.size(), 3);
//! assert_eq!(tree.count(&3), 3);
//! assert_eq!(tree.search(&4), None);
//!
//! let mut sorted = Vec::new();
//! tree.traverse_counted(|x| {
//!     sorted.push(*x);
//!     ControlFlow::Continue(())
//! });
//! assert_eq!(sorted, [1, 2, 3, 3, 3]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::ControlFlow;

use crate::node::{self, Link, Node};
use crate::ops::Ops;
use crate::traverse;

/// The container. Holds the root of the tree and the [`Ops`] it was created
/// with.
///
/// Dropping the tree releases every node, passing each payload to the dispose
/// hook if the tree owns its payloads. [`Tree::destroy`] does the same
/// explicitly.
pub struct Tree<T> {
    root: Link<T>,
    ops: Ops<T>,
    /// Number of nodes, i.e. distinct payloads.
    len: usize,
}

impl<T: Ord + 'static> Default for Tree<T> {
    fn default() -> Self {
        Self::new(Ops::ordered())
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        if self.root.is_some() {
            log::debug!("releasing {} nodes", self.len);
        }
        release(self.root.take(), &self.ops);
        self.len = 0;
    }
}

impl<T> fmt::Debug for Tree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

/// What happens when an incoming payload compares equal to a stored one.
#[derive(Clone, Copy)]
enum Collision {
    /// Keep the stored payload and count the incoming one.
    Aggregate,
    /// Store the incoming payload in place of the old one.
    Overwrite,
}

/// Where an incoming payload ended up.
enum Placement<T> {
    /// A new node was linked into the tree.
    Linked,
    /// An equal payload was already stored. Holds whichever payload the tree
    /// no longer keeps.
    Collided(T),
}

impl<T> Tree<T> {
    /// An empty tree using `ops` for every operation for the rest of its life.
    pub fn new(ops: Ops<T>) -> Self {
        Self {
            root: None,
            ops,
            len: 0,
        }
    }

    /// The descriptor this tree was created with.
    pub fn ops(&self) -> &Ops<T> {
        &self.ops
    }

    /// Inserts `payload`.
    ///
    /// If an equal payload is already stored, its count goes up by one and
    /// `payload` itself is discarded: disposed of when the tree owns its
    /// payloads, handed back otherwise. `None` is returned in every other
    /// case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::Tree;
    ///
    /// let mut tree = Tree::default();
    ///
    /// assert_eq!(tree.insert("a"), None);
    /// assert_eq!(tree.insert("a"), Some("a"));
    /// assert_eq!(tree.count(&"a"), 2);
    /// ```
    pub fn insert(&mut self, payload: T) -> Option<T> {
        self.place(payload, Collision::Aggregate)
    }

    /// Stores `payload`, overwriting an equal payload if there is one. The
    /// overwritten payload is disposed of when the tree owns its payloads and
    /// handed back otherwise.
    ///
    /// The count of an existing node is left alone: a replaced payload keeps
    /// the tally of the payload it replaced, it does not start over at 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::{Ops, Tree};
    ///
    /// // Order by the number only.
    /// let mut tree = Tree::new(Ops::new(|a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0)));
    /// tree.insert((1, 'a'));
    /// tree.insert((1, 'b'));
    ///
    /// assert_eq!(tree.replace((1, 'c')), Some((1, 'a')));
    /// assert_eq!(tree.search(&(1, ' ')), Some(&(1, 'c')));
    /// assert_eq!(tree.count(&(1, ' ')), 2);
    /// ```
    pub fn replace(&mut self, payload: T) -> Option<T> {
        self.place(payload, Collision::Overwrite)
    }

    fn place(&mut self, payload: T, collision: Collision) -> Option<T> {
        match insert(&mut self.root, &self.ops, payload, collision) {
            Placement::Linked => {
                self.len += 1;
                None
            }
            Placement::Collided(discarded) => self.ops.release(discarded),
        }
    }

    /// Removes the node whose payload equals `key`, whatever its count. The
    /// stored payload is disposed of when the tree owns its payloads and
    /// handed back otherwise. Removing a key that isn't there does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::Tree;
    ///
    /// let mut tree = Tree::default();
    /// tree.insert(1);
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.remove(&1), Some(1));
    /// assert_eq!(tree.count(&1), 0);
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &T) -> Option<T> {
        let removed = remove(&mut self.root, &self.ops, key)?;
        self.len -= 1;
        self.ops.release(removed)
    }

    /// The stored payload equal to `key`, if any.
    pub fn search(&self, key: &T) -> Option<&T> {
        find(&self.root, &self.ops, key).map(|node| &node.payload)
    }

    /// Mutable access to the stored payload equal to `key`, if any.
    ///
    /// Only the parts of the payload the comparator ignores may be changed.
    /// Changing how the payload compares leaves the tree unordered.
    pub fn search_mut(&mut self, key: &T) -> Option<&mut T> {
        find_mut(&mut self.root, &self.ops, key).map(|node| &mut node.payload)
    }

    /// How many times a payload equal to `key` has been inserted since it was
    /// last absent from the tree. Zero when it isn't there.
    pub fn count(&self, key: &T) -> usize {
        find(&self.root, &self.ops, key).map_or(0, |node| node.count)
    }

    /// Whether a payload equal to `key` is stored.
    pub fn contains(&self, key: &T) -> bool {
        find(&self.root, &self.ops, key).is_some()
    }

    /// Number of distinct payloads stored.
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether the tree stores nothing.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree: 0 for a single node and -1 for an empty tree.
    pub fn height(&self) -> isize {
        node::height(&self.root)
    }

    /// The payload stored at the root.
    pub fn root(&self) -> Option<&T> {
        self.root.as_ref().map(|node| &node.payload)
    }

    /// Visits every stored payload once, in ascending order, until `visit`
    /// breaks. Returns whether it did.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::ControlFlow;
    ///
    /// use bstree::Tree;
    ///
    /// let mut tree = Tree::default();
    /// for x in 1..10 {
    ///     tree.insert(x);
    /// }
    ///
    /// // Sum values while they're below 5.
    /// let mut sum = 0;
    /// let stopped = tree.traverse(|&x| {
    ///     if x >= 5 {
    ///         return ControlFlow::Break(());
    ///     }
    ///     sum += x;
    ///     ControlFlow::Continue(())
    /// });
    ///
    /// assert!(stopped);
    /// assert_eq!(sum, 1 + 2 + 3 + 4);
    /// ```
    pub fn traverse<'t, F>(&'t self, mut visit: F) -> bool
    where
        F: FnMut(&'t T) -> ControlFlow<()>,
    {
        traverse::in_order(&self.root, &mut visit).is_break()
    }

    /// Like [`Tree::traverse`] but each payload is visited as many times in a
    /// row as it was inserted.
    pub fn traverse_counted<'t, F>(&'t self, mut visit: F) -> bool
    where
        F: FnMut(&'t T) -> ControlFlow<()>,
    {
        traverse::in_order_counted(&self.root, &mut visit).is_break()
    }

    /// Like [`Tree::traverse`] with mutable access to the payloads. The same
    /// restriction as [`Tree::search_mut`] applies.
    pub fn traverse_mut<F>(&mut self, mut visit: F) -> bool
    where
        F: FnMut(&mut T) -> ControlFlow<()>,
    {
        traverse::in_order_mut(&mut self.root, &mut visit).is_break()
    }

    /// Visits every node's payload before those of its children, left
    /// subtree first.
    pub fn traverse_preorder<'t, F>(&'t self, mut visit: F) -> bool
    where
        F: FnMut(&'t T) -> ControlFlow<()>,
    {
        traverse::pre_order(&self.root, &mut visit).is_break()
    }

    /// Visits every node's payload after those of its children, left subtree
    /// first.
    pub fn traverse_postorder<'t, F>(&'t self, mut visit: F) -> bool
    where
        F: FnMut(&'t T) -> ControlFlow<()>,
    {
        traverse::post_order(&self.root, &mut visit).is_break()
    }

    /// Releases every node, bottom up, disposing of the payloads if the tree
    /// owns them. Equivalent to dropping the tree.
    pub fn destroy(self) {
        drop(self)
    }
}

/// Inserts `payload` into the subtree hanging off `link`, rebalancing on the
/// way back up.
///
/// Nothing is detached while descending and the comparator is never called
/// after the first change, so a panicking comparator leaves the subtree as it
/// was.
fn insert<T>(link: &mut Link<T>, ops: &Ops<T>, payload: T, collision: Collision) -> Placement<T> {
    let Some(node) = link else {
        *link = Some(Node::new_boxed(payload));
        return Placement::Linked;
    };

    let placement = match ops.compare(&payload, &node.payload) {
        Ordering::Less => insert(&mut node.left, ops, payload, collision),
        Ordering::Greater => insert(&mut node.right, ops, payload, collision),
        Ordering::Equal => {
            return match collision {
                Collision::Aggregate => {
                    node.count += 1;
                    Placement::Collided(payload)
                }
                Collision::Overwrite => {
                    Placement::Collided(mem::replace(&mut node.payload, payload))
                }
            };
        }
    };

    node::rebalance_link(link);
    placement
}

/// Unlinks the node equal to `key` from the subtree hanging off `link` and
/// returns its payload, which is not released here. Like [`insert`], the
/// subtree is untouched until the comparator is done with it.
fn remove<T>(link: &mut Link<T>, ops: &Ops<T>, key: &T) -> Option<T> {
    let node = link.as_deref_mut()?;

    let removed = match ops.compare(key, &node.payload) {
        Ordering::Less => remove(&mut node.left, ops, key),
        Ordering::Greater => remove(&mut node.right, ops, key),
        Ordering::Equal => return unlink(link),
    };

    if removed.is_some() {
        node::rebalance_link(link);
    }
    removed
}

/// Takes the root node off `link`, putting its subtrees back together.
fn unlink<T>(link: &mut Link<T>) -> Option<T> {
    let mut node = link.take()?;
    match (node.left.take(), node.right.take()) {
        (None, None) => {}
        (Some(child), None) | (None, Some(child)) => *link = Some(child),
        // With two children we promote this node's in-order successor: the
        // smallest node of the right subtree.
        (Some(left), Some(right)) => {
            let mut right = Some(right);
            let successor = take_leftmost(&mut right)?;
            let Node { payload, count, .. } = *successor;
            node.left = Some(left);
            node.right = right;
            node.count = count;
            let removed = mem::replace(&mut node.payload, payload);
            *link = Some(node::rebalance(node));
            return Some(removed);
        }
    }
    Some(node.payload)
}

/// Detaches the smallest node of the subtree hanging off `link`, rebalancing
/// what remains. The detached node's payload is moved out untouched.
fn take_leftmost<T>(link: &mut Link<T>) -> Option<Box<Node<T>>> {
    let node = link.as_deref_mut()?;
    if node.left.is_some() {
        let leftmost = take_leftmost(&mut node.left);
        node::rebalance_link(link);
        return leftmost;
    }

    let mut leftmost = link.take()?;
    *link = leftmost.right.take();
    Some(leftmost)
}

fn find<'t, T>(link: &'t Link<T>, ops: &Ops<T>, key: &T) -> Option<&'t Node<T>> {
    let node = link.as_deref()?;
    match ops.compare(key, &node.payload) {
        Ordering::Less => find(&node.left, ops, key),
        Ordering::Equal => Some(node),
        Ordering::Greater => find(&node.right, ops, key),
    }
}

fn find_mut<'t, T>(link: &'t mut Link<T>, ops: &Ops<T>, key: &T) -> Option<&'t mut Node<T>> {
    let node = link.as_deref_mut()?;
    match ops.compare(key, &node.payload) {
        Ordering::Less => find_mut(&mut node.left, ops, key),
        Ordering::Equal => Some(node),
        Ordering::Greater => find_mut(&mut node.right, ops, key),
    }
}

/// Post-order release of a whole subtree.
fn release<T>(link: Link<T>, ops: &Ops<T>) {
    if let Some(node) = link {
        let Node {
            payload,
            left,
            right,
            ..
        } = *node;
        release(left, ops);
        release(right, ops);
        // Payloads of a non-owning tree are simply dropped here.
        let _ = ops.release(payload);
    }
}

/// Asserts every structural invariant of the subtree and returns its height.
#[cfg(test)]
fn check<T>(link: &Link<T>, ops: &Ops<T>, lower: Option<&T>, upper: Option<&T>) -> isize {
    let Some(node) = link else {
        return -1;
    };
    assert!(node.count >= 1);
    if let Some(lower) = lower {
        assert_eq!(ops.compare(lower, &node.payload), Ordering::Less);
    }
    if let Some(upper) = upper {
        assert_eq!(ops.compare(&node.payload, upper), Ordering::Less);
    }
    let left = check(&node.left, ops, lower, Some(&node.payload));
    let right = check(&node.right, ops, Some(&node.payload), upper);
    assert!(left.abs_diff(right) <= 1);
    assert_eq!(node.height, left.max(right) + 1);
    node.height
}
