//! The flattened constant array loaded by the VM.

use std::ops::Index;

use crate::{ConstIndex, PoolValue};

/// Fixed-length, index-addressable constant table.
///
/// Produced once by [`ConstantArrayBuilder::to_fixed_array`](crate::ConstantArrayBuilder::to_fixed_array);
/// indices handed out during compilation address it directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantArray<V> {
    values: Box<[V]>,
}

impl<V: PoolValue> ConstantArray<V> {
    /// Allocate an array of `len` hole sentinels.
    pub fn filled_with_holes(len: usize) -> Self {
        Self {
            values: vec![V::hole(); len].into_boxed_slice(),
        }
    }

    /// Value at `index`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, index: ConstIndex) -> Option<&V> {
        self.values.get(index.index())
    }

    #[inline]
    pub(crate) fn set(&mut self, position: usize, value: V) {
        self.values[position] = value;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots holding the hole sentinel.
    pub fn hole_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_hole()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<V> {
        self.values.into_vec()
    }
}

impl<V> Index<ConstIndex> for ConstantArray<V> {
    type Output = V;

    fn index(&self, index: ConstIndex) -> &V {
        &self.values[index.index()]
    }
}

impl<'a, V: PoolValue> IntoIterator for &'a ConstantArray<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
