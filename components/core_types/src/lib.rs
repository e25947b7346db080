//! Core SnapScript value types and error handling.
//!
//! This crate provides the foundational types shared by every stage of the
//! engine: the runtime operand representation, the static type lattice of the
//! language, source position tracking, and the complete error taxonomy.
//!
//! # Overview
//!
//! - [`Operand`] - Tagged runtime value (int, float, double, bool, string, vec2)
//! - [`ValueType`] - Static types of the script language
//! - [`Precision`] - Runtime storage width of script `float` values
//! - [`SourcePosition`] - Source code location
//! - [`CompileError`], [`LexError`], [`LinkError`] - Compile-time failures
//! - [`ScriptInvocationError`], [`RuntimeFault`] - Runtime failures
//!
//! # Examples
//!
//! ```
//! use core_types::{Operand, Precision, ValueType};
//!
//! let tick = Operand::Int(3);
//! assert_eq!(tick.value_type(), ValueType::Int);
//!
//! // Script floats are stored according to the runtime precision
//! let x = Operand::float(0.5, Precision::Single);
//! assert_eq!(x, Operand::Float(0.5));
//! assert!(!x.is_vector());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;
mod value;

pub use error::{
    CompileError, CompileResult, LexError, LinkError, NativeError, NativeResult, RuntimeFault,
    ScriptInvocationError, VarResult, VarStoreError,
};
pub use source::SourcePosition;
pub use value::{Operand, Precision, ValueType, Vec2};
