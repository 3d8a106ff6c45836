//! Visitor traversals over a subtree. A visitor returns
//! [`ControlFlow::Break`] to stop early, and the break is passed straight up
//! through every level of the recursion so nothing else gets visited.
//!
//! Read-only visitors receive references that live as long as the borrow of
//! the tree, so a visitor may keep what it sees.

use std::ops::ControlFlow;

use crate::node::Link;

pub(crate) fn in_order<'t, T, F>(link: &'t Link<T>, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&'t T) -> ControlFlow<()>,
{
    let Some(node) = link else {
        return ControlFlow::Continue(());
    };
    in_order(&node.left, visit)?;
    visit(&node.payload)?;
    in_order(&node.right, visit)
}

/// Like [`in_order`] but each payload is visited once per insertion.
pub(crate) fn in_order_counted<'t, T, F>(link: &'t Link<T>, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&'t T) -> ControlFlow<()>,
{
    let Some(node) = link else {
        return ControlFlow::Continue(());
    };
    in_order_counted(&node.left, visit)?;
    for _ in 0..node.count {
        visit(&node.payload)?;
    }
    in_order_counted(&node.right, visit)
}

pub(crate) fn in_order_mut<T, F>(link: &mut Link<T>, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&mut T) -> ControlFlow<()>,
{
    let Some(node) = link else {
        return ControlFlow::Continue(());
    };
    in_order_mut(&mut node.left, visit)?;
    visit(&mut node.payload)?;
    in_order_mut(&mut node.right, visit)
}

pub(crate) fn pre_order<'t, T, F>(link: &'t Link<T>, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&'t T) -> ControlFlow<()>,
{
    let Some(node) = link else {
        return ControlFlow::Continue(());
    };
    visit(&node.payload)?;
    pre_order(&node.left, visit)?;
    pre_order(&node.right, visit)
}

pub(crate) fn post_order<'t, T, F>(link: &'t Link<T>, visit: &mut F) -> ControlFlow<()>
where
    F: FnMut(&'t T) -> ControlFlow<()>,
{
    let Some(node) = link else {
        return ControlFlow::Continue(());
    };
    post_order(&node.left, visit)?;
    post_order(&node.right, visit)?;
    visit(&node.payload)
}
