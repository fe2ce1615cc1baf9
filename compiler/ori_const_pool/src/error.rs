//! Errors raised by the constant array builder.

use crate::OperandWidth;

/// Error when allocating a constant array slot fails.
///
/// The infallible entry points ([`insert`](crate::ConstantArrayBuilder::insert)
/// and friends) panic with this error's message; an overflow means the
/// compiler produced more distinct constants than the widest tier can address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Every tier is full or fully reserved.
    #[error("constant array overflow: all {tiers} tiers exhausted ({size} slots in use)")]
    Overflow { tiers: usize, size: usize },
}

/// Error when a [`SliceLayout`](crate::SliceLayout) is not usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// A tier was given no capacity.
    #[error("{width} tier has zero capacity")]
    EmptyTier { width: OperandWidth },

    /// A tier's last index cannot be encoded in the tier's operand width.
    #[error("{width} tier ends at index {max_index}, beyond the {width} operand limit {limit}")]
    WidthExceeded {
        width: OperandWidth,
        max_index: u64,
        limit: u32,
    },
}
