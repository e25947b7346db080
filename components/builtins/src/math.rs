//! Math natives: trigonometry, rounding, random numbers and vector helpers.

use crate::args;
use crate::registry::NativeRegistry;
use core_types::{LinkError, NativeError, NativeResult, Operand, ValueType, Vec2};
use rand::Rng;

/// Script math functions with host-side implementations
pub struct ScriptMath;

impl ScriptMath {
    /// Degrees to radians
    pub fn to_rads(degrees: f64) -> f64 {
        degrees.to_radians()
    }

    /// Radians to degrees
    pub fn to_degs(rads: f64) -> f64 {
        rads.to_degrees()
    }

    /// Round half up to the nearest int, saturating at the int range
    pub fn round(x: f64) -> i32 {
        (x + 0.5).floor() as i32
    }

    /// Truncate toward zero, saturating at the int range
    pub fn cast(x: f64) -> i32 {
        x as i32
    }

    /// Uniform float in `[0, 1)`
    pub fn rand() -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    /// Uniform int in `[min, max]`
    pub fn rand_int(min: i32, max: i32) -> NativeResult<i32> {
        if min > max {
            return Err(NativeError::InvalidArgument(format!(
                "randInt bounds {}..{} are reversed",
                min, max
            )));
        }
        Ok(rand::thread_rng().gen_range(min..=max))
    }

    /// Unit vector in the direction of `v`; the zero vector stays zero
    pub fn normalize(v: Vec2) -> Vec2 {
        let mag = v.magnitude();
        if mag == 0.0 {
            v
        } else {
            Vec2::new(v.x / mag, v.y / mag)
        }
    }
}

fn unary(registry: &mut NativeRegistry, name: &str, f: fn(f64) -> f64) -> Result<(), LinkError> {
    registry.register(name, &[ValueType::Float], ValueType::Float, move |_, a| {
        Ok(Operand::Double(f(args::float(a, 0)?)))
    })?;
    Ok(())
}

fn binary(
    registry: &mut NativeRegistry,
    name: &str,
    f: fn(f64, f64) -> f64,
) -> Result<(), LinkError> {
    registry.register(
        name,
        &[ValueType::Float, ValueType::Float],
        ValueType::Float,
        move |_, a| Ok(Operand::Double(f(args::float(a, 0)?, args::float(a, 1)?))),
    )?;
    Ok(())
}

fn vector(
    registry: &mut NativeRegistry,
    name: &str,
    f: fn(Vec2) -> f64,
) -> Result<(), LinkError> {
    registry.register(name, &[ValueType::Vec2], ValueType::Float, move |_, a| {
        Ok(Operand::Double(f(args::vec2(a, 0)?)))
    })?;
    Ok(())
}

/// Link the math natives
pub fn link(registry: &mut NativeRegistry) -> Result<(), LinkError> {
    use ValueType::{Float, Int};

    unary(registry, "sqrt", f64::sqrt)?;
    unary(registry, "cbrt", f64::cbrt)?;
    unary(registry, "sin", f64::sin)?;
    unary(registry, "cos", f64::cos)?;
    unary(registry, "tan", f64::tan)?;
    unary(registry, "asin", f64::asin)?;
    unary(registry, "acos", f64::acos)?;
    unary(registry, "atan", f64::atan)?;
    unary(registry, "toRads", ScriptMath::to_rads)?;
    unary(registry, "toDegs", ScriptMath::to_degs)?;
    unary(registry, "abs", f64::abs)?;
    unary(registry, "floor", f64::floor)?;
    unary(registry, "ceil", f64::ceil)?;

    binary(registry, "pow", f64::powf)?;
    binary(registry, "min", f64::min)?;
    binary(registry, "max", f64::max)?;

    registry.register("min", &[Int, Int], Int, |_, a| {
        Ok(Operand::Int(args::int(a, 0)?.min(args::int(a, 1)?)))
    })?;
    registry.register("max", &[Int, Int], Int, |_, a| {
        Ok(Operand::Int(args::int(a, 0)?.max(args::int(a, 1)?)))
    })?;
    registry.register("absInt", &[Int], Int, |_, a| {
        Ok(Operand::Int(args::int(a, 0)?.wrapping_abs()))
    })?;
    registry.register("round", &[Float], Int, |_, a| {
        Ok(Operand::Int(ScriptMath::round(args::float(a, 0)?)))
    })?;
    registry.register("cast", &[Float], Int, |_, a| {
        Ok(Operand::Int(ScriptMath::cast(args::float(a, 0)?)))
    })?;
    registry.register("rand", &[], Float, |_, _| {
        Ok(Operand::Double(ScriptMath::rand()))
    })?;
    registry.register("randInt", &[Int, Int], Int, |_, a| {
        Ok(Operand::Int(ScriptMath::rand_int(
            args::int(a, 0)?,
            args::int(a, 1)?,
        )?))
    })?;

    vector(registry, "vecMag", |v| v.magnitude())?;
    vector(registry, "vecAngle", |v| v.angle())?;
    vector(registry, "vecX", |v| v.x)?;
    vector(registry, "vecY", |v| v.y)?;
    registry.register("vecNorm", &[ValueType::Vec2], ValueType::Vec2, |_, a| {
        Ok(Operand::Vec2(ScriptMath::normalize(args::vec2(a, 0)?)))
    })?;
    Ok(())
}
