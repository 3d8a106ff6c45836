//! The behaviors a [`Tree`][crate::Tree] is built with: how payloads are
//! ordered and, optionally, how the tree disposes of the payloads it lets go
//! of.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

type Compare<T> = Rc<dyn Fn(&T, &T) -> Ordering>;
type Dispose<T> = Rc<dyn Fn(T)>;

/// An ops descriptor: a three-way comparator plus an optional dispose hook.
///
/// The comparator must be a total order and must not change its answers for
/// the lifetime of the tree using it. Nothing checks this; a comparator that
/// breaks the contract leaves the tree in an unspecified (but memory safe)
/// state.
///
/// When a dispose hook is present the tree *owns* its payloads: every payload
/// it discards (a duplicate insert, an overwritten payload, a removed payload,
/// everything left when the tree is destroyed) is passed to the hook. Without
/// one, discarded payloads are handed back to the caller instead.
///
/// Cloning is cheap; clones share the same closures.
///
/// # Panics
///
/// A panic from the comparator unwinds out of the tree operation that called
/// it. The tree is left exactly as it was before that operation: every node,
/// count and the size stay in place, and they are disposed of as usual when
/// the tree goes. Only the payload being inserted is lost. It is dropped
/// during the unwind without reaching the dispose hook.
///
/// A panic from the dispose hook happens after the tree is consistent again.
/// During destruction, the payloads not yet released are then dropped without
/// reaching the hook.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use bstree::{Ops, Tree};
///
/// let disposed = Rc::new(Cell::new(0));
/// let ops = {
///     let disposed = Rc::clone(&disposed);
///     Ops::owning(|a: &u32, b: &u32| a.cmp(b), move |_| disposed.set(disposed.get() + 1))
/// };
///
/// let mut tree = Tree::new(ops);
/// tree.insert(7);
/// // The duplicate is disposed of, not returned.
/// assert_eq!(tree.insert(7), None);
/// assert_eq!(disposed.get(), 1);
/// ```
pub struct Ops<T> {
    compare: Compare<T>,
    dispose: Option<Dispose<T>>,
}

impl<T> Clone for Ops<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Rc::clone(&self.compare),
            dispose: self.dispose.as_ref().map(Rc::clone),
        }
    }
}

impl<T> fmt::Debug for Ops<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ops")
            .field("owns_payloads", &self.owns_payloads())
            .finish()
    }
}

impl<T: Ord + 'static> Default for Ops<T> {
    fn default() -> Self {
        Self::ordered()
    }
}

impl<T> Ops<T> {
    /// A non-owning descriptor ordering payloads with `compare`.
    pub fn new<C>(compare: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            compare: Rc::new(compare),
            dispose: None,
        }
    }

    /// An owning descriptor: payloads the tree discards are passed to
    /// `dispose`.
    pub fn owning<C, D>(compare: C, dispose: D) -> Self
    where
        C: Fn(&T, &T) -> Ordering + 'static,
        D: Fn(T) + 'static,
    {
        Self {
            compare: Rc::new(compare),
            dispose: Some(Rc::new(dispose)),
        }
    }

    /// A non-owning descriptor using the payload's own [`Ord`].
    pub fn ordered() -> Self
    where
        T: Ord + 'static,
    {
        Self::new(T::cmp)
    }

    /// The same comparator with the dispose hook suppressed.
    pub fn without_dispose(&self) -> Self {
        Self {
            compare: Rc::clone(&self.compare),
            dispose: None,
        }
    }

    /// Whether trees built with this descriptor own their payloads.
    pub fn owns_payloads(&self) -> bool {
        self.dispose.is_some()
    }

    /// Compares two payloads.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    /// Lets go of a payload the tree no longer stores. Owned payloads are
    /// disposed of; otherwise the payload goes back to the caller.
    pub(crate) fn release(&self, payload: T) -> Option<T> {
        match &self.dispose {
            Some(dispose) => {
                log::trace!("disposing of a discarded payload");
                dispose(payload);
                None
            }
            None => Some(payload),
        }
    }
}
