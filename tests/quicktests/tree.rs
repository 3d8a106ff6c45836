use bstree::{Ops, Tree};

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::ops::ControlFlow;
use std::rc::Rc;

use crate::Op;

/// Applies a set of operations to a tree and a map of counts.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same keys, with the same counts, in both.
fn do_ops<K>(ops: &[Op<K>], bst: &mut Tree<K>, map: &mut BTreeMap<K, usize>)
where
    K: Ord + Clone,
{
    for op in ops {
        match op {
            Op::Insert(k) => {
                bst.insert(k.clone());
                *map.entry(k.clone()).or_default() += 1;
            }
            Op::Remove(k) => {
                bst.remove(k);
                map.remove(k);
            }
        }
    }
}

fn sorted<K: Clone>(tree: &Tree<K>) -> Vec<K> {
    let mut out = Vec::new();
    tree.traverse(|k| {
        out.push(k.clone());
        ControlFlow::Continue(())
    });
    out
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::default();
    let mut map = BTreeMap::new();

    do_ops(&ops, &mut tree, &mut map);
    tree.size() == map.len()
        && map.iter().all(|(k, &count)| tree.count(k) == count)
        && sorted(&tree).iter().eq(map.keys())
}

#[quickcheck]
fn in_order_is_sorted_and_unique(xs: Vec<i16>) -> bool {
    let mut tree = Tree::default();
    for x in &xs {
        tree.insert(*x);
    }

    let mut expected = xs;
    expected.sort_unstable();
    expected.dedup();
    sorted(&tree) == expected
}

#[quickcheck]
fn counted_traversal_repeats_duplicates(xs: Vec<u8>) -> bool {
    let mut tree = Tree::default();
    for x in &xs {
        tree.insert(*x);
    }

    let mut visits = Vec::new();
    tree.traverse_counted(|x| {
        visits.push(*x);
        ControlFlow::Continue(())
    });

    let mut expected = xs;
    expected.sort_unstable();
    visits == expected
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let mut tree = Tree::default();
    for x in &xs {
        tree.insert(*x);
    }
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.search(x).is_none() && tree.count(x) == 0)
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree = Tree::default();
    for x in &xs {
        tree.insert(*x);
    }
    for delete in &deletes {
        tree.remove(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| tree.search(x).is_none())
        && still_present.iter().all(|x| tree.search(x).is_some())
}

#[quickcheck]
fn removing_everything_empties_the_tree(xs: Vec<i8>) -> bool {
    let mut tree = Tree::default();
    for x in &xs {
        tree.insert(*x);
    }
    for x in xs.iter().rev() {
        tree.remove(x);
    }

    tree.is_empty() && tree.size() == 0 && tree.height() == -1
}

#[quickcheck]
fn unique_inserts_stay_shallow(xs: HashSet<u32>) -> bool {
    let mut tree = Tree::default();
    for x in &xs {
        tree.insert(*x);
    }
    let bound = (1.44 * ((xs.len() + 2) as f64).log2()).ceil() as isize;

    tree.size() == xs.len() && tree.height() <= bound
}

#[quickcheck]
fn early_stop_sees_exactly_three(xs: HashSet<i8>) -> bool {
    let mut tree = Tree::default();
    for x in &xs {
        tree.insert(*x);
    }

    let mut seen = 0;
    let stopped = tree.traverse(|_| {
        seen += 1;
        if seen == 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    if xs.len() >= 3 {
        stopped && seen == 3
    } else {
        !stopped && seen == xs.len()
    }
}

#[quickcheck]
fn owning_tree_disposes_every_payload_once(ops: Vec<Op<i8>>) -> bool {
    let disposed = Rc::new(RefCell::new(0usize));
    let ops_descriptor = {
        let disposed = Rc::clone(&disposed);
        Ops::owning(i8::cmp, move |_| *disposed.borrow_mut() += 1)
    };
    let mut tree = Tree::new(ops_descriptor);

    let inserted = ops.iter().filter(|op| matches!(op, Op::Insert(_))).count();
    for op in &ops {
        match op {
            Op::Insert(k) => {
                tree.insert(*k);
            }
            Op::Remove(k) => {
                tree.remove(k);
            }
        }
    }
    tree.destroy();

    let disposed = *disposed.borrow();
    disposed == inserted
}
