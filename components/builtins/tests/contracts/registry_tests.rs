//! Contract tests for NativeRegistry

use builtins::{NativeContext, NativeRegistry, VarStore};
use core_types::{LinkError, NativeError, NativeResult, Operand, ValueType};
use std::sync::Arc;

fn identity(_: &mut NativeContext<'_>, args: &[Operand]) -> NativeResult<Operand> {
    Ok(args[0].clone())
}

#[test]
fn test_ids_are_dense() {
    let mut registry = NativeRegistry::new();
    let a = registry
        .register("a", &[], ValueType::Void, |_, _| Ok(Operand::Void))
        .unwrap();
    let b = registry
        .register("b", &[], ValueType::Void, |_, _| Ok(Operand::Void))
        .unwrap();
    assert_eq!(a.0 + 1, b.0);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_same_name_different_return_is_duplicate() {
    let mut registry = NativeRegistry::new();
    registry
        .register("f", &[ValueType::Int], ValueType::Int, |_, _| Ok(Operand::Int(0)))
        .unwrap();
    let err = registry
        .register("f", &[ValueType::Int], ValueType::Float, |_, _| Ok(Operand::Double(0.0)))
        .unwrap_err();
    assert!(matches!(err, LinkError::DuplicateNative { .. }));
}

#[test]
fn test_shared_handle() {
    let handle: builtins::NativeHandle = Arc::new(identity);
    let mut registry = NativeRegistry::new();
    let id_int = registry
        .register_handle("id", &[ValueType::Int], ValueType::Int, handle.clone())
        .unwrap();
    registry
        .register_handle("id", &[ValueType::String], ValueType::String, handle)
        .unwrap();
    let mut vars = VarStore::new();
    let mut out = Vec::<u8>::new();
    let mut ctx = NativeContext::new(&mut vars, &mut out);
    let result = registry
        .get(id_int)
        .unwrap()
        .call(&mut ctx, &[Operand::Int(8)])
        .unwrap();
    assert_eq!(result, Operand::Int(8));
}

#[test]
fn test_native_failure_propagates() {
    let mut registry = NativeRegistry::new();
    let id = registry
        .register("boom", &[], ValueType::Void, |_, _| {
            Err(NativeError::Failed("boom".to_string()))
        })
        .unwrap();
    let mut vars = VarStore::new();
    let mut out = Vec::<u8>::new();
    let mut ctx = NativeContext::new(&mut vars, &mut out);
    let err = registry.get(id).unwrap().call(&mut ctx, &[]).unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn test_registry_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NativeRegistry>();
}
