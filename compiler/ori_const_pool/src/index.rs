//! Constant array indices.

use std::fmt;

/// Absolute index into the flattened constant array.
///
/// Handed to the bytecode encoder as an instruction operand; the encoder picks
/// the operand encoding via [`OperandWidth::for_index`](crate::OperandWidth::for_index).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ConstIndex(u32);

impl ConstIndex {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ConstIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstIndex({})", self.0)
    }
}

impl fmt::Display for ConstIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

impl From<ConstIndex> for u32 {
    fn from(index: ConstIndex) -> Self {
        index.0
    }
}
