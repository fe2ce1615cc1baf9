//! Operand widths for constant array indices.

use std::fmt;

/// Width of the immediate operand an instruction uses to address the
/// constant array.
///
/// Ordered narrowest first, so `Byte < Short < Quad`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandWidth {
    /// 8-bit operand.
    Byte,
    /// 16-bit operand.
    Short,
    /// 32-bit operand.
    Quad,
}

impl OperandWidth {
    /// All widths, narrowest first. Tier `i` of a builder uses `ALL[i]`.
    pub const ALL: [OperandWidth; 3] = [OperandWidth::Byte, OperandWidth::Short, OperandWidth::Quad];

    /// Size of the operand in bytes.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            OperandWidth::Byte => 1,
            OperandWidth::Short => 2,
            OperandWidth::Quad => 4,
        }
    }

    /// Size of the operand in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            OperandWidth::Byte => u8::BITS,
            OperandWidth::Short => u16::BITS,
            OperandWidth::Quad => u32::BITS,
        }
    }

    /// Largest index this width can encode.
    #[inline]
    pub const fn max_index(self) -> u32 {
        match self {
            OperandWidth::Byte => 0xFF,
            OperandWidth::Short => 0xFFFF,
            OperandWidth::Quad => u32::MAX,
        }
    }

    /// Narrowest width able to encode `index`.
    #[inline]
    pub const fn for_index(index: u32) -> Self {
        if index <= OperandWidth::Byte.max_index() {
            OperandWidth::Byte
        } else if index <= OperandWidth::Short.max_index() {
            OperandWidth::Short
        } else {
            OperandWidth::Quad
        }
    }

    /// Whether `index` fits in an operand of this width.
    #[inline]
    pub const fn fits(self, index: u32) -> bool {
        index <= self.max_index()
    }

    /// Position of the tier that owns this width.
    #[inline]
    pub(crate) const fn tier(self) -> usize {
        match self {
            OperandWidth::Byte => 0,
            OperandWidth::Short => 1,
            OperandWidth::Quad => 2,
        }
    }
}

impl fmt::Display for OperandWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandWidth::Byte => "byte",
            OperandWidth::Short => "short",
            OperandWidth::Quad => "quad",
        };
        f.write_str(name)
    }
}
