//! Tier layout configuration.

use crate::error::LayoutError;
use crate::OperandWidth;

/// Capacities of the three constant array tiers, narrowest first.
///
/// Tiers cover back-to-back index ranges: tier 0 starts at 0 and each later
/// tier starts right after the previous tier's full capacity. A layout is
/// only valid if every tier's last index is encodable in that tier's
/// operand width.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cache", serde(try_from = "RawSliceLayout"))]
pub struct SliceLayout {
    capacities: [u32; 3],
}

/// Unvalidated wire form of [`SliceLayout`]; deserialization goes through
/// [`SliceLayout::new`].
#[cfg(feature = "cache")]
#[derive(serde::Deserialize)]
struct RawSliceLayout {
    capacities: [u32; 3],
}

#[cfg(feature = "cache")]
impl TryFrom<RawSliceLayout> for SliceLayout {
    type Error = LayoutError;

    fn try_from(raw: RawSliceLayout) -> Result<Self, LayoutError> {
        SliceLayout::new(raw.capacities)
    }
}

impl SliceLayout {
    /// Capacity of the byte tier in the default layout.
    pub const BYTE_CAPACITY: u32 = 0x100;
    /// Capacity of the short tier in the default layout.
    pub const SHORT_CAPACITY: u32 = 0x1_0000 - Self::BYTE_CAPACITY;
    /// Capacity of the quad tier in the default layout.
    pub const QUAD_CAPACITY: u32 = u32::MAX - Self::SHORT_CAPACITY - Self::BYTE_CAPACITY + 1;

    /// The default layout: each tier fills its operand width exactly.
    pub const DEFAULT: SliceLayout = SliceLayout {
        capacities: [
            Self::BYTE_CAPACITY,
            Self::SHORT_CAPACITY,
            Self::QUAD_CAPACITY,
        ],
    };

    /// Validate a custom layout.
    ///
    /// Small layouts are mostly useful for exercising tier transitions
    /// without interning tens of thousands of constants.
    pub fn new(capacities: [u32; 3]) -> Result<Self, LayoutError> {
        let mut start = 0u64;
        for (width, &capacity) in OperandWidth::ALL.iter().zip(&capacities) {
            if capacity == 0 {
                return Err(LayoutError::EmptyTier { width: *width });
            }
            let max_index = start + u64::from(capacity) - 1;
            if max_index > u64::from(width.max_index()) {
                return Err(LayoutError::WidthExceeded {
                    width: *width,
                    max_index,
                    limit: width.max_index(),
                });
            }
            start += u64::from(capacity);
        }
        Ok(SliceLayout { capacities })
    }

    /// Capacity of tier `tier`.
    #[inline]
    pub fn capacity(&self, tier: usize) -> u32 {
        self.capacities[tier]
    }

    /// Absolute start index of tier `tier`.
    pub fn start_index(&self, tier: usize) -> u32 {
        // Validation guarantees every start below tier 2's fits in u32.
        self.capacities[..tier].iter().sum()
    }

    /// Whether tier boundaries coincide with operand width boundaries.
    pub fn is_width_aligned(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl Default for SliceLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}
