use pretty_assertions::assert_eq;

use crate::{ConstIndex, ConstValue, OperandWidth, PoolError, SliceLayout};

use super::ConstantArrayBuilder;

/// Tiers of 4, 4 and 8 slots: indices 0..4 byte, 4..8 short, 8..16 quad.
fn small() -> ConstantArrayBuilder<ConstValue> {
    let layout = SliceLayout::new([4, 4, 8]).unwrap_or_else(|e| panic!("{e}"));
    ConstantArrayBuilder::with_layout(layout)
}

fn int(n: i64) -> ConstValue {
    ConstValue::Int(n)
}

fn idx(n: u32) -> ConstIndex {
    ConstIndex::new(n)
}

// Insertion and deduplication

#[test]
fn empty_builder() {
    let builder = small();
    assert_eq!(builder.size(), 0);
    assert!(builder.is_empty());
    assert!(builder.to_fixed_array().is_empty());
}

#[test]
fn insert_deduplicates() {
    let mut builder = small();
    let a = builder.insert(int(1));
    let b = builder.insert(ConstValue::str("x"));
    assert_eq!(builder.insert(int(1)), a);
    assert_eq!(builder.insert(ConstValue::str("x")), b);
    assert_ne!(a, b);
    assert_eq!(builder.size(), 2);
    assert_eq!(builder.dedup_len(), 2);
}

#[test]
fn insert_fills_narrowest_tier_first() {
    let mut builder = small();
    for n in 0..4 {
        assert_eq!(builder.insert(int(n)), idx(n as u32));
    }
    assert_eq!(builder.insert(int(4)), idx(4));
    assert_eq!(builder.slices()[1].size(), 1);
    assert_eq!(builder.size(), 5);
}

#[test]
fn overflow_is_reported() {
    let layout = SliceLayout::new([1, 1, 1]).unwrap_or_else(|e| panic!("{e}"));
    let mut builder = ConstantArrayBuilder::with_layout(layout);
    for n in 0..3 {
        builder.insert(int(n));
    }
    assert_eq!(
        builder.try_insert(int(3)),
        Err(PoolError::Overflow { tiers: 3, size: 3 })
    );
    // Known values still resolve.
    assert_eq!(builder.try_insert(int(1)), Ok(idx(1)));
    assert_eq!(builder.try_allocate_entry(), Err(PoolError::Overflow { tiers: 3, size: 3 }));
    assert!(builder.try_create_reserved_entry().is_err());
}

#[test]
#[should_panic(expected = "constant array overflow")]
fn insert_overflow_panics() {
    let layout = SliceLayout::new([1, 1, 1]).unwrap_or_else(|e| panic!("{e}"));
    let mut builder = ConstantArrayBuilder::with_layout(layout);
    for n in 0..4 {
        builder.insert(int(n));
    }
}

// Index lookup

#[test]
fn index_to_slice_scans_tiers() {
    let builder = small();
    assert_eq!(builder.index_to_slice(idx(0)).operand_width(), OperandWidth::Byte);
    assert_eq!(builder.index_to_slice(idx(3)).operand_width(), OperandWidth::Byte);
    assert_eq!(builder.index_to_slice(idx(4)).operand_width(), OperandWidth::Short);
    assert_eq!(builder.index_to_slice(idx(15)).operand_width(), OperandWidth::Quad);
}

#[test]
#[should_panic(expected = "outside every tier")]
fn index_beyond_last_tier_panics() {
    let builder = small();
    let _ = builder.index_to_slice(idx(16));
}

#[test]
fn at_returns_hole_for_unrealized_slots() {
    let mut builder = small();
    let a = builder.insert(int(7));
    assert_eq!(builder.at(a), int(7));
    assert_eq!(builder.at(idx(2)), ConstValue::Hole);
    assert_eq!(builder.at(idx(9)), ConstValue::Hole);
}

#[test]
fn at_resolves_offsets_within_higher_tiers() {
    let mut builder = small();
    for n in 0..6 {
        builder.insert(int(n));
    }
    // Short tier: 4 and 5 realized, 6 and 7 within capacity only.
    assert_eq!(builder.at(idx(4)), int(4));
    assert_eq!(builder.at(idx(5)), int(5));
    assert_eq!(builder.at(idx(6)), ConstValue::Hole);
    assert_eq!(builder.at(idx(7)), ConstValue::Hole);
}

#[test]
fn operand_width_for_default_layout() {
    let mut builder = ConstantArrayBuilder::<ConstValue>::new();
    let first = builder.insert(int(0));
    assert_eq!(builder.operand_width_for(first), OperandWidth::Byte);
    assert_eq!(builder.operand_width_for(idx(300)), OperandWidth::Short);
    assert_eq!(builder.operand_width_for(idx(70_000)), OperandWidth::Quad);
}

// Index-first protocol

#[test]
fn allocate_entry_then_fill() {
    let mut builder = small();
    let a = builder.insert(int(1));
    let slot = builder.allocate_entry();
    assert_eq!(slot, idx(1));
    assert_eq!(builder.at(slot), ConstValue::Hole);

    builder.insert_allocated_entry(slot, ConstValue::Handle(9));
    assert_eq!(builder.at(slot), ConstValue::Handle(9));

    // Filled entries are not deduplicated.
    let again = builder.insert(ConstValue::Handle(9));
    assert_eq!(again, idx(2));
    assert_eq!(builder.at(a), int(1));
}

#[test]
#[should_panic(expected = "already filled")]
fn fill_twice_panics() {
    let mut builder = small();
    let slot = builder.allocate_entry();
    builder.insert_allocated_entry(slot, int(1));
    builder.insert_allocated_entry(slot, int(2));
}

#[test]
#[should_panic(expected = "already filled")]
fn fill_interned_slot_panics() {
    let mut builder = small();
    let a = builder.insert(int(1));
    builder.insert_allocated_entry(a, int(2));
}

#[test]
#[should_panic(expected = "duplicate constants in byte tier")]
fn export_rejects_duplicates_within_tier() {
    let mut builder = small();
    let slot = builder.allocate_entry();
    builder.insert_allocated_entry(slot, int(5));
    builder.insert(int(5));
    let _ = builder.to_fixed_array();
}

// Capacity-first protocol

#[test]
fn reservation_occupies_capacity() {
    let mut builder = small();
    let entry = builder.create_reserved_entry();
    assert_eq!(entry.width(), OperandWidth::Byte);
    assert_eq!(builder.reserved_count(), 1);

    for n in 0..3 {
        assert_eq!(builder.insert(int(n)), idx(n as u32));
    }
    // One slot early: the reservation holds index space in the byte tier.
    assert_eq!(builder.insert(int(3)), idx(4));

    let committed = builder.commit_reserved_entry(entry, int(100));
    assert_eq!(committed, idx(3));
    assert_eq!(builder.reserved_count(), 0);
}

#[test]
fn reservation_moves_to_next_tier_when_full() {
    let mut builder = small();
    for n in 0..4 {
        builder.insert(int(n));
    }
    let entry = builder.create_reserved_entry();
    assert_eq!(entry.width(), OperandWidth::Short);
    assert_eq!(builder.slices()[1].reserved(), 1);
    builder.discard_reserved_entry(entry);
    assert_eq!(builder.reserved_count(), 0);
}

#[test]
fn commit_new_value_then_insert_reuses() {
    let mut builder = small();
    let entry = builder.create_reserved_entry();
    let v = ConstValue::str("fresh");
    let index = builder.commit_reserved_entry(entry, v.clone());
    assert_eq!(index, idx(0));
    assert_eq!(builder.insert(v), index);
    assert_eq!(builder.size(), 1);
}

#[test]
fn commit_reuses_index_that_fits() {
    let mut builder = small();
    let a = builder.insert(int(1));
    let entry = builder.create_reserved_entry();
    assert_eq!(builder.commit_reserved_entry(entry, int(1)), a);
    assert_eq!(builder.size(), 1);
    assert_eq!(builder.reserved_count(), 0);
}

#[test]
fn commit_wider_reservation_reuses_narrow_index() {
    let mut builder = small();
    let a = builder.insert(int(1));
    for n in 2..5 {
        builder.insert(int(n));
    }
    let entry = builder.create_reserved_entry();
    assert_eq!(entry.width(), OperandWidth::Short);
    assert_eq!(builder.commit_reserved_entry(entry, int(1)), a);
}

#[test]
fn commit_duplicates_value_too_wide_for_reservation() {
    let mut builder = small();
    let byte_entries: Vec<_> = (0..4).map(|_| builder.create_reserved_entry()).collect();
    assert!(byte_entries.iter().all(|e| e.width() == OperandWidth::Byte));
    for n in 0..4 {
        assert_eq!(builder.insert(int(n)), idx(4 + n as u32));
    }
    let v = ConstValue::str("wide");
    let wide = builder.insert(v.clone());
    assert_eq!(wide, idx(8));

    let mut entries = byte_entries.into_iter();
    let first = entries.next().unwrap_or_else(|| panic!("missing reservation"));
    let narrow = builder.commit_reserved_entry(first, v.clone());
    assert_eq!(narrow, idx(0));
    assert_ne!(narrow, wide);
    assert_eq!(builder.insert(v.clone()), narrow);
    for entry in entries {
        builder.discard_reserved_entry(entry);
    }

    let array = builder.to_fixed_array();
    assert_eq!(
        array.as_slice(),
        &[
            v.clone(),
            ConstValue::Hole,
            ConstValue::Hole,
            ConstValue::Hole,
            int(0),
            int(1),
            int(2),
            int(3),
            v,
        ]
    );
}

#[test]
fn discard_leaves_hole() {
    let mut builder = small();
    let entry = builder.create_reserved_entry();
    for n in 0..3 {
        builder.insert(int(n));
    }
    let spilled = builder.insert(int(3));
    assert_eq!(spilled, idx(4));
    builder.discard_reserved_entry(entry);

    assert_eq!(builder.at(idx(3)), ConstValue::Hole);
    let array = builder.to_fixed_array();
    assert_eq!(
        array.as_slice(),
        &[int(0), int(1), int(2), ConstValue::Hole, int(3)]
    );
    assert_eq!(array.hole_count(), 1);
}

#[test]
fn discarded_slot_is_reused() {
    let mut builder = small();
    let entry = builder.create_reserved_entry();
    builder.discard_reserved_entry(entry);
    assert_eq!(builder.insert(int(1)), idx(0));
}

#[test]
#[should_panic(expected = "no reservations")]
fn discard_foreign_reservation_panics() {
    let mut builder = small();
    let mut other = small();
    let entry = other.create_reserved_entry();
    builder.discard_reserved_entry(entry);
}

// Export

#[test]
fn export_without_higher_tiers_has_no_padding() {
    let mut builder = small();
    builder.insert(int(1));
    builder.insert(int(2));
    let array = builder.to_fixed_array();
    assert_eq!(array.as_slice(), &[int(1), int(2)]);
}

#[test]
fn export_pads_lower_tiers_up_to_next_start() {
    let mut builder = small();
    let entries: Vec<_> = (0..8).map(|_| builder.create_reserved_entry()).collect();
    let q = builder.insert(int(42));
    assert_eq!(q, idx(8));
    for entry in entries {
        builder.discard_reserved_entry(entry);
    }
    assert_eq!(builder.size(), 9);

    let array = builder.to_fixed_array();
    assert_eq!(array.len(), 9);
    assert_eq!(array.hole_count(), 8);
    assert_eq!(array[q], int(42));
    assert_eq!(array.get(idx(9)), None);
}

mod proptest_builder {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::{int, small};
    use crate::{ConstIndex, ConstValue};

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i64),
        AllocateAndFill,
        Reserve,
        Commit(i64),
        Discard,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0i64..12).prop_map(Op::Insert),
            1 => Just(Op::AllocateAndFill),
            2 => Just(Op::Reserve),
            2 => (0i64..12).prop_map(Op::Commit),
            1 => Just(Op::Discard),
        ]
    }

    proptest! {
        #[test]
        fn insert_is_idempotent(values in proptest::collection::vec(0i64..8, 1..12)) {
            let mut builder = small();
            for v in values {
                let first = builder.insert(int(v));
                let size = builder.size();
                prop_assert_eq!(builder.insert(int(v)), first);
                prop_assert_eq!(builder.size(), size);
            }
        }

        // At most 16 ops, each consuming at most one of the 16 slots.
        #[test]
        fn export_round_trips(ops in proptest::collection::vec(op(), 0..16)) {
            let mut builder = small();
            let mut expected: HashMap<ConstIndex, ConstValue> = HashMap::new();
            let mut pending = Vec::new();
            let mut next_handle = 0u32;

            for op in ops {
                match op {
                    Op::Insert(v) => {
                        let index = builder.insert(int(v));
                        expected.insert(index, int(v));
                    }
                    Op::AllocateAndFill => {
                        let index = builder.allocate_entry();
                        let value = ConstValue::Handle(next_handle);
                        next_handle += 1;
                        builder.insert_allocated_entry(index, value.clone());
                        expected.insert(index, value);
                    }
                    Op::Reserve => pending.push(builder.create_reserved_entry()),
                    Op::Commit(v) => {
                        if let Some(entry) = pending.pop() {
                            let width = entry.width();
                            let index = builder.commit_reserved_entry(entry, int(v));
                            prop_assert!(builder.index_to_slice(index).operand_width() <= width);
                            expected.insert(index, int(v));
                        }
                    }
                    Op::Discard => {
                        if let Some(entry) = pending.pop() {
                            builder.discard_reserved_entry(entry);
                        }
                    }
                }
            }

            let size = builder.size();
            let array = builder.to_fixed_array();
            prop_assert_eq!(array.len(), size);
            for (index, value) in &expected {
                prop_assert_eq!(array.get(*index), Some(value));
            }
        }
    }
}
