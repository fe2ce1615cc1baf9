//! Ori constant pool - tiered constant array builder for the bytecode backend.
//!
//! During code generation the backend interns literals and heap references
//! that are too large to encode inline. This crate:
//! - Deduplicates them by value identity ([`PoolValue::key`])
//! - Assigns indices from three capacity tiers addressed by 8-, 16- and
//!   32-bit operands, narrowest first
//! - Supports forward references, either index-first (a hole filled later)
//!   or capacity-first (an operand width reserved before the value exists)
//! - Flattens everything into one [`ConstantArray`] the VM loads at runtime
//!
//! # Example
//!
//! ```
//! use ori_const_pool::{ConstValue, ConstantArrayBuilder, OperandWidth};
//!
//! let mut builder = ConstantArrayBuilder::new();
//! let answer = builder.insert(ConstValue::Int(42));
//! assert_eq!(builder.insert(ConstValue::Int(42)), answer);
//! assert_eq!(builder.operand_width_for(answer), OperandWidth::Byte);
//!
//! let array = builder.to_fixed_array();
//! assert_eq!(array[answer], ConstValue::Int(42));
//! ```
//!
//! The builder is single-threaded: one instance per compilation unit,
//! consumed once by [`ConstantArrayBuilder::to_fixed_array`].

mod array;
mod builder;
mod config;
mod error;
mod index;
mod operand;
mod slice;
mod value;

pub use array::ConstantArray;
pub use builder::{ConstantArrayBuilder, ReservedEntry};
pub use config::SliceLayout;
pub use error::{LayoutError, PoolError};
pub use index::ConstIndex;
pub use operand::OperandWidth;
pub use slice::ConstantSlice;
pub use value::{ConstValue, PoolValue};
