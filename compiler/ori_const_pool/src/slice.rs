//! A single capacity tier of the constant array.

use rustc_hash::FxHashSet;

use crate::{ConstIndex, OperandWidth, PoolValue};

/// A contiguous, fixed-capacity region of the constant array index space,
/// addressed by one operand width.
///
/// Slots are either realized (holding a value), reserved (withheld for a
/// later commit, no value yet) or available. `reserved + size <= capacity`
/// holds at all times.
#[derive(Clone, Debug)]
pub struct ConstantSlice<V> {
    start_index: u32,
    capacity: u32,
    reserved: u32,
    width: OperandWidth,
    values: Vec<V>,
}

impl<V: PoolValue> ConstantSlice<V> {
    /// Create an empty slice covering `[start_index, start_index + capacity)`.
    pub(crate) fn new(start_index: u32, capacity: u32, width: OperandWidth) -> Self {
        debug_assert!(capacity > 0, "constant slice must have capacity");
        debug_assert!(
            width.fits(start_index + (capacity - 1)),
            "{width} slice cannot address its last index"
        );
        Self {
            start_index,
            capacity,
            reserved: 0,
            width,
            values: Vec::new(),
        }
    }

    /// Withhold one slot from future allocation.
    ///
    /// # Panics
    /// Panics if no slot is available.
    pub(crate) fn reserve(&mut self) {
        assert!(
            self.available() > 0,
            "reserve on full {} slice (size {}, reserved {})",
            self.width,
            self.values.len(),
            self.reserved
        );
        self.reserved += 1;
    }

    /// Release one reserved slot back to the available pool.
    ///
    /// # Panics
    /// Panics if nothing is reserved.
    pub(crate) fn unreserve(&mut self) {
        assert!(self.reserved > 0, "unreserve on {} slice with no reservations", self.width);
        self.reserved -= 1;
    }

    /// Append `value`, returning its absolute index.
    ///
    /// # Panics
    /// Panics if no slot is available.
    pub(crate) fn allocate(&mut self, value: V) -> ConstIndex {
        assert!(
            self.available() > 0,
            "allocate on full {} slice (size {}, reserved {})",
            self.width,
            self.values.len(),
            self.reserved
        );
        let local = self.realized();
        self.values.push(value);
        ConstIndex::new(self.start_index + local)
    }

    /// Value at absolute `index`.
    ///
    /// # Panics
    /// Panics if `index` is outside the realized range.
    pub fn at(&self, index: ConstIndex) -> &V {
        &self.values[self.local(index)]
    }

    /// Overwrite the value at absolute `index`.
    ///
    /// # Panics
    /// Panics if `index` is outside the realized range.
    pub(crate) fn insert_at(&mut self, index: ConstIndex, value: V) {
        let local = self.local(index);
        self.values[local] = value;
    }

    /// Returns `true` if no two realized values share an identity.
    pub fn all_elements_unique(&self) -> bool {
        let mut seen = FxHashSet::default();
        self.values.iter().all(|value| seen.insert(value.key()))
    }

    /// Map an absolute index into `values`, checking bounds.
    fn local(&self, index: ConstIndex) -> usize {
        let raw = index.raw();
        assert!(
            raw >= self.start_index && ((raw - self.start_index) as usize) < self.values.len(),
            "index {} outside realized range of {} slice [{}, {})",
            raw,
            self.width,
            self.start_index,
            self.start_index as usize + self.values.len()
        );
        (raw - self.start_index) as usize
    }

    /// Slots neither realized nor reserved.
    #[inline]
    pub fn available(&self) -> u32 {
        self.capacity - self.realized() - self.reserved
    }

    /// Realized slot count. Bounded by `capacity`, so it always fits.
    #[inline]
    fn realized(&self) -> u32 {
        u32::try_from(self.values.len())
            .unwrap_or_else(|_| panic!("{} slice size exceeds u32::MAX", self.width))
    }

    /// Number of realized values.
    #[inline]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    #[inline]
    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Last absolute index this slice covers.
    #[inline]
    pub fn max_index(&self) -> u32 {
        self.start_index + (self.capacity - 1)
    }

    /// Operand width needed to address any index in this slice.
    #[inline]
    pub fn operand_width(&self) -> OperandWidth {
        self.width
    }

    /// Realized values in allocation order.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub(crate) fn into_values(self) -> Vec<V> {
        self.values
    }
}
