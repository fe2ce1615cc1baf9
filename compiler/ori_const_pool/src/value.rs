//! Values stored in the constant array.
//!
//! The builder is generic over the value domain: anything implementing
//! [`PoolValue`] can be interned. [`ConstValue`] is the domain the bytecode
//! backend uses for compile-time literals and heap handles.

use std::fmt;
use std::hash::Hash;

/// A value domain the constant array can hold.
///
/// The domain supplies the identity used for deduplication and a canonical
/// hole sentinel for slots that were allocated or padded but never filled.
/// The hole is an ordinary value of the domain so padded slots read back
/// with the same type as real constants.
pub trait PoolValue: Clone {
    /// Identity under which values are deduplicated.
    type Key: Eq + Hash;

    /// Identity of this value.
    fn key(&self) -> Self::Key;

    /// The canonical hole sentinel.
    fn hole() -> Self;

    /// Returns `true` if this value is the hole sentinel.
    fn is_hole(&self) -> bool;
}

/// A constant produced by the bytecode backend.
///
/// Floats are stored as `u64` bits so the type can be `Eq + Hash`; two
/// floats are the same constant only if they are bitwise identical
/// (`0.0` and `-0.0` stay distinct, as do NaNs with different payloads).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    /// Slot allocated or padded but never written.
    Hole,
    Unit,
    Bool(bool),
    Int(i64),
    /// IEEE-754 bits.
    Float(u64),
    Str(Box<str>),
    /// Opaque reference to a runtime heap object (function template,
    /// boilerplate literal, scope info...).
    Handle(u32),
}

impl ConstValue {
    /// Create a float constant.
    #[inline]
    pub fn float(value: f64) -> Self {
        ConstValue::Float(value.to_bits())
    }

    /// Create a string constant.
    #[inline]
    pub fn str(value: &str) -> Self {
        ConstValue::Str(value.into())
    }

    /// The float value, if this is a float constant.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            ConstValue::Float(bits) => Some(f64::from_bits(bits)),
            _ => None,
        }
    }
}

impl PoolValue for ConstValue {
    type Key = ConstValue;

    #[inline]
    fn key(&self) -> ConstValue {
        self.clone()
    }

    #[inline]
    fn hole() -> Self {
        ConstValue::Hole
    }

    #[inline]
    fn is_hole(&self) -> bool {
        matches!(self, ConstValue::Hole)
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Hole => f.write_str("<hole>"),
            ConstValue::Unit => f.write_str("()"),
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Int(n) => write!(f, "{n}"),
            ConstValue::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ConstValue::Str(s) => write!(f, "{s:?}"),
            ConstValue::Handle(h) => write!(f, "<handle {h}>"),
        }
    }
}
