use quickcheck::{Arbitrary, Gen};

/// An enum for the various kinds of "things" to do to
/// a tree in a quicktest.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<K> {
    /// Insert the K, counting it if it's already there
    Insert(K),
    /// Overwrite the stored K, or insert it
    Replace(K),
    /// Remove the K from the data structure
    Remove(K),
    /// Compare in-order traversals
    Traverse,
}

impl<K> Arbitrary for Op<K>
where
    K: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation.
    /// Inserts are weighted up so trees actually grow.
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 0, 1, 2, 2, 3]).unwrap() {
            0 => Op::Insert(K::arbitrary(g)),
            1 => Op::Replace(K::arbitrary(g)),
            2 => Op::Remove(K::arbitrary(g)),
            3 => Op::Traverse,
            _ => unreachable!(),
        }
    }
}
