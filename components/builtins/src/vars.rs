//! Variable store natives (`storeInt`, `getInt`, `newIntArray`, ...).

use crate::args;
use crate::registry::NativeRegistry;
use core_types::{LinkError, NativeResult, Operand, ValueType};

const ARRAY_TYPES: [(&str, &str, ValueType); 4] = [
    ("Int", "Int", ValueType::Int),
    ("Float", "Float", ValueType::Float),
    ("Bool", "Bool", ValueType::Bool),
    ("String", "Str", ValueType::String),
];

fn void() -> NativeResult<Operand> {
    Ok(Operand::Void)
}

/// Link the variable store natives
pub fn link(registry: &mut NativeRegistry) -> Result<(), LinkError> {
    use ValueType::{Bool, Float, Int, String as Str, Vec2, Void};

    registry.register("storeInt", &[Str, Int], Void, |ctx, a| {
        ctx.vars.store_int(args::string(a, 0)?, args::int(a, 1)?);
        void()
    })?;
    registry.register("storeFloat", &[Str, Float], Void, |ctx, a| {
        ctx.vars.store_float(args::string(a, 0)?, args::float(a, 1)?);
        void()
    })?;
    registry.register("storeString", &[Str, Str], Void, |ctx, a| {
        ctx.vars.store_string(args::string(a, 0)?, args::string(a, 1)?);
        void()
    })?;
    registry.register("storeBool", &[Str, Bool], Void, |ctx, a| {
        ctx.vars.store_bool(args::string(a, 0)?, args::boolean(a, 1)?);
        void()
    })?;
    registry.register("storeVec", &[Str, Vec2], Void, |ctx, a| {
        ctx.vars.store_vec2(args::string(a, 0)?, args::vec2(a, 1)?);
        void()
    })?;

    registry.register("getInt", &[Str], Int, |ctx, a| {
        Ok(Operand::Int(ctx.vars.get_int(args::string(a, 0)?)?))
    })?;
    registry.register("getFloat", &[Str], Float, |ctx, a| {
        Ok(Operand::Double(ctx.vars.get_float(args::string(a, 0)?)?))
    })?;
    registry.register("getString", &[Str], Str, |ctx, a| {
        Ok(Operand::from(ctx.vars.get_string(args::string(a, 0)?)?))
    })?;
    registry.register("getBool", &[Str], Bool, |ctx, a| {
        Ok(Operand::Bool(ctx.vars.get_bool(args::string(a, 0)?)?))
    })?;
    registry.register("getVec", &[Str], Vec2, |ctx, a| {
        Ok(Operand::Vec2(ctx.vars.get_vec2(args::string(a, 0)?)?))
    })?;

    registry.register("hasVar", &[Str], Bool, |ctx, a| {
        Ok(Operand::Bool(ctx.vars.contains(args::string(a, 0)?)))
    })?;
    registry.register("deleteVar", &[Str], Void, |ctx, a| {
        ctx.vars.remove(args::string(a, 0)?);
        void()
    })?;
    registry.register("isUsingDouble", &[], Bool, |ctx, _| {
        Ok(Operand::Bool(ctx.vars.is_using_double()))
    })?;

    for (suffix, short, element) in ARRAY_TYPES {
        registry.register(&format!("new{}Array", suffix), &[Str, Int], Void, move |ctx, a| {
            ctx.vars.new_array(args::string(a, 0)?, element, args::int(a, 1)?)?;
            void()
        })?;
        registry.register(&format!("access{}", short), &[Str, Int], element, move |ctx, a| {
            Ok(ctx.vars.access(args::string(a, 0)?, element, args::int(a, 1)?)?)
        })?;
        registry.register(
            &format!("assign{}", short),
            &[Str, Int, element],
            Void,
            |ctx, a| {
                let value = args::value(a, 2)?.clone();
                ctx.vars.assign(args::string(a, 0)?, args::int(a, 1)?, value)?;
                void()
            },
        )?;
    }

    registry.register("arrayLength", &[Str], Int, |ctx, a| {
        let len = ctx.vars.array_length(args::string(a, 0)?)?;
        Ok(Operand::Int(i32::try_from(len).unwrap_or(i32::MAX)))
    })?;
    registry.register("deleteArray", &[Str], Void, |ctx, a| {
        ctx.vars.delete_array(args::string(a, 0)?);
        void()
    })?;
    Ok(())
}
