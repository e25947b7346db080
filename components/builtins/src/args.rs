//! Typed access to native arguments.
//!
//! The interpreter coerces arguments to the declared parameter types before
//! a handle runs, so a mismatch here means the binding was called by hand
//! with the wrong values.

use core_types::{NativeError, NativeResult, Operand, Vec2};

fn invalid(index: usize, expected: &str, found: Option<&Operand>) -> NativeError {
    match found {
        Some(value) => NativeError::InvalidArgument(format!(
            "argument {} expected {}, got {}",
            index,
            expected,
            value.value_type()
        )),
        None => NativeError::InvalidArgument(format!("missing argument {}", index)),
    }
}

pub(crate) fn value(args: &[Operand], index: usize) -> NativeResult<&Operand> {
    args.get(index).ok_or_else(|| invalid(index, "a value", None))
}

pub(crate) fn int(args: &[Operand], index: usize) -> NativeResult<i32> {
    let arg = args.get(index);
    arg.and_then(Operand::as_int)
        .ok_or_else(|| invalid(index, "int", arg))
}

pub(crate) fn float(args: &[Operand], index: usize) -> NativeResult<f64> {
    let arg = args.get(index);
    arg.and_then(Operand::as_number)
        .ok_or_else(|| invalid(index, "float", arg))
}

pub(crate) fn boolean(args: &[Operand], index: usize) -> NativeResult<bool> {
    let arg = args.get(index);
    arg.and_then(Operand::as_bool)
        .ok_or_else(|| invalid(index, "bool", arg))
}

pub(crate) fn string(args: &[Operand], index: usize) -> NativeResult<&str> {
    let arg = args.get(index);
    arg.and_then(Operand::as_str)
        .ok_or_else(|| invalid(index, "string", arg))
}

pub(crate) fn vec2(args: &[Operand], index: usize) -> NativeResult<Vec2> {
    let arg = args.get(index);
    arg.and_then(Operand::as_vec2)
        .ok_or_else(|| invalid(index, "vec2", arg))
}
