//! This crate exposes a generic AVL tree whose ordering and ownership
//! behavior are injected at construction, plus a small Markov chain text
//! generator built on top of it.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is the
//! longest path from the root `Node` to a leaf `Node`). An AVL tree keeps the
//! heights of the two subtrees of every `Node` within one of each other, which
//! limits the height to `O(lg N)` where `N` is the number of nodes in the tree.
//! BSTs also naturally support sorted iteration by visiting the left subtree,
//! then the subtree root, then the right subtree.
//!
//! ## This tree
//!
//! [`Tree`] stores opaque payloads. How they compare, and whether the tree
//! owns them, is decided by the [`Ops`] descriptor it is created with.
//! Payloads that compare equal share a single node with a count.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod markov;
mod node;
mod ops;
mod traverse;
mod tree;

#[cfg(test)]
mod test;

pub use ops::Ops;
pub use tree::Tree;
