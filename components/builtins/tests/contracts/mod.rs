//! Contract tests for builtins component
//!
//! These tests exercise the public API through the registry, the way the
//! interpreter calls natives.

mod console_tests;
mod math_natives_tests;
mod registry_tests;
mod var_store_tests;

use builtins::{NativeContext, NativeRegistry, SharedOutput, VarStore};
use core_types::{NativeResult, Operand, ValueType};

/// Call the stdlib binding matching `name` and the argument types
pub fn call_stdlib(
    vars: &mut VarStore,
    out: &SharedOutput,
    name: &str,
    args: &[Operand],
) -> NativeResult<Operand> {
    let registry = NativeRegistry::with_stdlib().expect("stdlib links");
    let types: Vec<ValueType> = args.iter().map(Operand::value_type).collect();
    let (_, binding) = registry
        .find_exact(name, &types)
        .unwrap_or_else(|| panic!("no native {}", name));
    let mut sink = out.clone();
    let mut ctx = NativeContext::new(vars, &mut sink);
    binding.call(&mut ctx, args)
}
