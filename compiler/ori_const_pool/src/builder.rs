//! Constant array builder.
//!
//! Collects constants during bytecode generation, deduplicates them and hands
//! out indices packed into the narrowest operand width available. Indices are
//! allocated from three tiers (byte, short, quad), always preferring the
//! narrowest tier with spare capacity.
//!
//! # Forward references
//!
//! Two protocols allow a slot to exist before its value is known:
//!
//! - **Index first** ([`allocate_entry`](ConstantArrayBuilder::allocate_entry) →
//!   [`insert_allocated_entry`](ConstantArrayBuilder::insert_allocated_entry)):
//!   a hole is allocated immediately and the caller gets a concrete index to
//!   fill later. Bypasses deduplication.
//! - **Capacity first** ([`create_reserved_entry`](ConstantArrayBuilder::create_reserved_entry) →
//!   [`commit_reserved_entry`](ConstantArrayBuilder::commit_reserved_entry) |
//!   [`discard_reserved_entry`](ConstantArrayBuilder::discard_reserved_entry)):
//!   a slot of some tier is withheld so the operand width can be fixed before
//!   the value exists. No index is assigned until commit.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{
    ConstIndex, ConstantArray, ConstantSlice, OperandWidth, PoolError, PoolValue, SliceLayout,
};

/// Outstanding capacity-first reservation.
///
/// Returned by [`ConstantArrayBuilder::create_reserved_entry`] and consumed by
/// either [`commit_reserved_entry`](ConstantArrayBuilder::commit_reserved_entry)
/// or [`discard_reserved_entry`](ConstantArrayBuilder::discard_reserved_entry).
#[must_use = "a reservation must be committed or discarded"]
#[derive(Debug, PartialEq, Eq)]
pub struct ReservedEntry {
    width: OperandWidth,
}

impl ReservedEntry {
    /// Operand width the committed index is guaranteed to fit.
    #[inline]
    pub fn width(&self) -> OperandWidth {
        self.width
    }
}

/// Builder for a compilation unit's constant array.
///
/// Created once per unit, mutated throughout code generation, and consumed
/// by [`to_fixed_array`](Self::to_fixed_array).
pub struct ConstantArrayBuilder<V: PoolValue> {
    layout: SliceLayout,
    /// Tiers in ascending operand width.
    slices: [ConstantSlice<V>; 3],
    /// First assignment wins, except when a reserved commit duplicates a
    /// value into a narrower tier.
    dedup: FxHashMap<V::Key, ConstIndex>,
}

impl<V: PoolValue> ConstantArrayBuilder<V> {
    /// Create a builder with the default 8/16/32-bit layout.
    pub fn new() -> Self {
        Self::with_layout(SliceLayout::DEFAULT)
    }

    /// Create a builder with a custom tier layout.
    pub fn with_layout(layout: SliceLayout) -> Self {
        let slices = std::array::from_fn(|tier| {
            ConstantSlice::new(
                layout.start_index(tier),
                layout.capacity(tier),
                OperandWidth::ALL[tier],
            )
        });
        Self {
            layout,
            slices,
            dedup: FxHashMap::default(),
        }
    }

    /// Length of the exported array: one past the last realized slot of the
    /// highest tier with any content.
    pub fn size(&self) -> usize {
        self.slices
            .iter()
            .rev()
            .find(|slice| !slice.is_empty())
            .map_or(0, |slice| slice.start_index() as usize + slice.size())
    }

    /// Returns `true` if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of distinct deduplicated values.
    pub fn dedup_len(&self) -> usize {
        self.dedup.len()
    }

    /// Outstanding capacity-first reservations across all tiers.
    pub fn reserved_count(&self) -> usize {
        self.slices.iter().map(|slice| slice.reserved() as usize).sum()
    }

    /// Read-only view of the tiers, narrowest first.
    pub fn slices(&self) -> &[ConstantSlice<V>] {
        &self.slices
    }

    /// The tier layout in use.
    pub fn layout(&self) -> SliceLayout {
        self.layout
    }

    /// Narrowest operand width able to encode `index`.
    #[inline]
    pub fn operand_width_for(&self, index: ConstIndex) -> OperandWidth {
        OperandWidth::for_index(index.raw())
    }

    /// Tier owning `index`.
    ///
    /// # Panics
    /// Panics if `index` lies beyond the last tier.
    pub fn index_to_slice(&self, index: ConstIndex) -> &ConstantSlice<V> {
        &self.slices[self.slice_position(index)]
    }

    fn slice_position(&self, index: ConstIndex) -> usize {
        self.slices
            .iter()
            .position(|slice| index.raw() <= slice.max_index())
            .unwrap_or_else(|| panic!("constant index {} outside every tier", index.raw()))
    }

    /// Value at `index`, or the hole sentinel if the slot lies within its
    /// tier's capacity but has not been realized.
    pub fn at(&self, index: ConstIndex) -> V {
        let slice = self.index_to_slice(index);
        if ((index.raw() - slice.start_index()) as usize) < slice.size() {
            slice.at(index).clone()
        } else {
            V::hole()
        }
    }

    /// Intern `value`, returning its existing index or allocating a new one
    /// in the narrowest tier with spare capacity.
    pub fn try_insert(&mut self, value: V) -> Result<ConstIndex, PoolError> {
        let key = value.key();
        if let Some(&index) = self.dedup.get(&key) {
            return Ok(index);
        }
        let index = self.allocate_index(value)?;
        self.dedup.insert(key, index);
        Ok(index)
    }

    /// Intern `value`.
    ///
    /// # Panics
    /// Panics if every tier is exhausted. Use `try_insert` to handle overflow.
    pub fn insert(&mut self, value: V) -> ConstIndex {
        self.try_insert(value).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Allocate a hole to be filled later via
    /// [`insert_allocated_entry`](Self::insert_allocated_entry).
    pub fn try_allocate_entry(&mut self) -> Result<ConstIndex, PoolError> {
        self.allocate_index(V::hole())
    }

    /// Allocate a hole to be filled later.
    ///
    /// # Panics
    /// Panics if every tier is exhausted.
    pub fn allocate_entry(&mut self) -> ConstIndex {
        self.try_allocate_entry().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fill a slot handed out by [`allocate_entry`](Self::allocate_entry).
    ///
    /// Does not record `value` for deduplication.
    ///
    /// # Panics
    /// Panics if the slot is not realized or no longer holds a hole.
    pub fn insert_allocated_entry(&mut self, index: ConstIndex, value: V) {
        assert!(
            self.at(index).is_hole(),
            "constant index {} already filled",
            index.raw()
        );
        let position = self.slice_position(index);
        self.slices[position].insert_at(index, value);
    }

    /// Reserve one slot in the narrowest tier with spare capacity.
    pub fn try_create_reserved_entry(&mut self) -> Result<ReservedEntry, PoolError> {
        let tiers = self.slices.len();
        let size = self.size();
        let slice = self
            .slices
            .iter_mut()
            .find(|slice| slice.available() > 0)
            .ok_or(PoolError::Overflow { tiers, size })?;
        slice.reserve();
        Ok(ReservedEntry {
            width: slice.operand_width(),
        })
    }

    /// Reserve one slot in the narrowest tier with spare capacity.
    ///
    /// # Panics
    /// Panics if every tier is exhausted.
    pub fn create_reserved_entry(&mut self) -> ReservedEntry {
        self.try_create_reserved_entry().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Commit a reservation, interning `value`.
    ///
    /// The returned index always fits `entry.width()`. If `value` was already
    /// interned at an index too wide for that width, it is duplicated into the
    /// reserved tier and later lookups resolve to the new, narrower index.
    pub fn commit_reserved_entry(&mut self, entry: ReservedEntry, value: V) -> ConstIndex {
        let tier = entry.width.tier();
        self.discard_reserved_entry(entry);

        let key = value.key();
        match self.dedup.get(&key).copied() {
            None => {
                // The released reservation guarantees a slot at or below `tier`.
                let index = self.allocate_index(value).unwrap_or_else(|e| panic!("{e}"));
                self.dedup.insert(key, index);
                index
            }
            Some(existing) => {
                let slice = &mut self.slices[tier];
                if existing.raw() <= slice.max_index() {
                    return existing;
                }
                let index = slice.allocate(value);
                tracing::debug!(
                    existing = existing.raw(),
                    index = index.raw(),
                    width = %slice.operand_width(),
                    "duplicated constant into reserved tier"
                );
                self.dedup.insert(key, index);
                index
            }
        }
    }

    /// Release a reservation without storing a value.
    ///
    /// The slot becomes ordinary spare capacity; if never reused it is
    /// exported as a hole.
    pub fn discard_reserved_entry(&mut self, entry: ReservedEntry) {
        self.slices[entry.width.tier()].unreserve();
    }

    /// Allocate `value` into the narrowest tier with spare capacity.
    fn allocate_index(&mut self, value: V) -> Result<ConstIndex, PoolError> {
        let tiers = self.slices.len();
        let size = self.size();
        let Some(slice) = self.slices.iter_mut().find(|slice| slice.available() > 0) else {
            return Err(PoolError::Overflow { tiers, size });
        };
        if slice.is_empty() && slice.start_index() > 0 {
            tracing::debug!(
                width = %slice.operand_width(),
                start = slice.start_index(),
                "constant array spilled into wider tier"
            );
        }
        Ok(slice.allocate(value))
    }

    /// Flatten the tiers into the final constant array.
    ///
    /// Lower tiers are padded with holes up to the next tier's start when a
    /// higher tier is in use; trailing capacity of the last used tier is not
    /// materialized.
    ///
    /// # Panics
    /// Panics if a tier holds two values with the same identity, which means
    /// constants were interned without going through deduplication.
    pub fn to_fixed_array(self) -> ConstantArray<V> {
        let len = self.size();
        let aligned = self.layout.is_width_aligned();
        let mut array = ConstantArray::filled_with_holes(len);
        let mut cursor = 0usize;

        for slice in self.slices {
            if cursor == len {
                break;
            }
            debug_assert!(
                !aligned || cursor == 0 || cursor.is_power_of_two(),
                "tier boundary {cursor} is not a power of two"
            );
            // Tiers may share values through reserved commits, but a value
            // appears at most once within a tier.
            assert!(
                slice.all_elements_unique(),
                "duplicate constants in {} tier",
                slice.operand_width()
            );

            let spare = slice.capacity() as usize - slice.size();
            tracing::trace!(
                width = %slice.operand_width(),
                size = slice.size(),
                reserved = slice.reserved(),
                "flattening constant tier"
            );
            for value in slice.into_values() {
                array.set(cursor, value);
                cursor += 1;
            }

            // Remaining slots are already holes.
            let padding = (len - cursor).min(spare);
            cursor += padding;
        }

        assert_eq!(cursor, len, "constant array cursor does not match length");
        tracing::debug!(len, holes = array.hole_count(), "constant array flattened");
        array
    }
}

impl<V: PoolValue> Default for ConstantArrayBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PoolValue + fmt::Debug> fmt::Debug for ConstantArrayBuilder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantArrayBuilder")
            .field("layout", &self.layout)
            .field("slices", &self.slices)
            .field("dedup_len", &self.dedup.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
