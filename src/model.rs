//! Model-based testing of [`AvlTree`] against [`BTreeSet`].
//!
//! The same operation sequences drive the proptest suite and the fuzz targets.

use std::{collections::BTreeSet, ops::Bound};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Key, Sum, Summed, TreeError};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Picks a key already in the tree (modulo its length), so removals usually hit.
    Index(usize),
    Random(i16),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in -500i16..500,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Find(ItemValue),
    Remove(ItemValue),
    SumLess(ItemValue),
    SumGreater(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, sorted: &[Key]) -> FinalOp {
        fn get_value(v: &[Key], i: ItemValue) -> Key {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as Key
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => Key::from(v),
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Find(item) => FinalOp::Find(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::SumLess(item) => FinalOp::SumLess(get_value(sorted, item)),
            Op::SumGreater(item) => FinalOp::SumGreater(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(Key),
    Find(Key),
    Remove(Key),
    SumLess(Key),
    SumGreater(Key),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Find),
        value_strategy().prop_map(Op::Remove),
        value_strategy().prop_map(Op::SumLess),
        value_strategy().prop_map(Op::SumGreater),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<Summed> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<Key>, value: Key) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<Key>, value: Key) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = btree.insert(value);
                let from_avl = match avl.insert(value) {
                    Ok(id) => {
                        assert_eq!(avl.node(id).map(|node| node.key()), Some(value));
                        true
                    }
                    Err(TreeError::DuplicateKey(key)) => {
                        assert_eq!(key, value);
                        false
                    }
                    Err(other) => panic!("FinalOp #{op_id}: unexpected error {other:?}"),
                };

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Find(value) => {
                let from_btree = btree.get(&value).copied();
                let from_avl = avl.find(value).map(|node| node.key());

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value);
                let from_avl = avl.remove(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::SumLess(value) => {
                let from_btree = (!btree.is_empty())
                    .then(|| btree_sum(btree.range(..value)))
                    .ok_or(TreeError::EmptyTree);
                let from_avl = avl.sum_less(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::SumGreater(value) => {
                let from_btree = (!btree.is_empty())
                    .then(|| btree_sum(btree.range((Bound::Excluded(value), Bound::Unbounded))))
                    .ok_or(TreeError::EmptyTree);
                let from_avl = avl.sum_greater(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first().copied();
                let from_avl = avl.first().map(|node| node.key());

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first();

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last().copied();
                let from_avl = avl.last().map(|node| node.key());

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last();

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().copied().eq(avl.keys()));
        assert_eq!(btree_sum(btree.iter()), avl.sum());
    }
}

/// A set of keys and a set of probes for the range queries.
#[derive(Clone, Debug)]
pub struct RangeSumInput {
    pub keys: Vec<i32>,
    pub probes: Vec<i32>,
}

impl<'a> arbitrary::Arbitrary<'a> for RangeSumInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> i32 {
            i32::arbitrary(u).unwrap_or(0)
        }

        let num_keys = u16::arbitrary(u)? % 2000;
        let num_probes = u8::arbitrary(u)? % 64;

        let keys = core::iter::repeat_with(|| value(u))
            .take(num_keys.into())
            .collect();

        let probes = core::iter::repeat_with(|| value(u))
            .take(num_probes.into())
            .collect();

        Ok(RangeSumInput { keys, probes })
    }
}

pub fn run_range_sums(keys: Vec<i32>, probes: Vec<i32>) {
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<Summed> = AvlTree::new();

    for key in keys {
        let key = Key::from(key);
        assert_eq!(btree.insert(key), avl.insert(key).is_ok());
    }

    avl.assert_invariants();

    for probe in probes {
        let probe = Key::from(probe);

        if btree.is_empty() {
            assert_eq!(avl.sum_less(probe), Err(TreeError::EmptyTree));
            assert_eq!(avl.sum_greater(probe), Err(TreeError::EmptyTree));
            continue;
        }

        let less = btree_sum(btree.range(..probe));
        let greater = btree_sum(btree.range((Bound::Excluded(probe), Bound::Unbounded)));

        assert_eq!(avl.sum_less(probe), Ok(less), "probe {probe}");
        assert_eq!(avl.sum_greater(probe), Ok(greater), "probe {probe}");
    }
}

fn btree_sum<'a>(keys: impl Iterator<Item = &'a Key>) -> Sum {
    keys.map(|&k| Sum::from(k)).sum()
}
