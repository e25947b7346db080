//! Conversion natives: `strToInt`, `strToFloat`, `toString`.

use crate::args;
use crate::registry::NativeRegistry;
use core_types::{LinkError, NativeError, NativeResult, Operand, ValueType};

/// Parse a decimal int, ignoring surrounding whitespace
pub fn str_to_int(text: &str) -> NativeResult<i32> {
    text.trim()
        .parse::<i32>()
        .map_err(|e| NativeError::InvalidArgument(format!("'{}' is not an int: {}", text, e)))
}

/// Parse a float, ignoring surrounding whitespace
pub fn str_to_float(text: &str) -> NativeResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| NativeError::InvalidArgument(format!("'{}' is not a float: {}", text, e)))
}

/// Link the conversion natives
pub fn link(registry: &mut NativeRegistry) -> Result<(), LinkError> {
    registry.register("strToInt", &[ValueType::String], ValueType::Int, |_, a| {
        Ok(Operand::Int(str_to_int(args::string(a, 0)?)?))
    })?;
    registry.register("strToFloat", &[ValueType::String], ValueType::Float, |_, a| {
        Ok(Operand::Double(str_to_float(args::string(a, 0)?)?))
    })?;
    for ty in [ValueType::Int, ValueType::Float, ValueType::Bool, ValueType::Vec2] {
        registry.register("toString", &[ty], ValueType::String, |_, a| {
            Ok(Operand::Str(args::value(a, 0)?.to_string()))
        })?;
    }
    Ok(())
}
