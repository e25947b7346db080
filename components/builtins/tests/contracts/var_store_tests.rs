//! Contract tests for the variable store natives

use super::call_stdlib;
use builtins::{SharedOutput, VarStore};
use core_types::{NativeError, Operand, VarStoreError, Vec2};

#[test]
fn test_store_int_then_get_int() {
    let mut vars = VarStore::new();
    let out = SharedOutput::new();
    call_stdlib(&mut vars, &out, "storeInt", &["k".into(), Operand::Int(5)]).unwrap();
    let value = call_stdlib(&mut vars, &out, "getInt", &["k".into()]).unwrap();
    assert_eq!(value, Operand::Int(5));
}

#[test]
fn test_get_float_of_int_is_type_mismatch() {
    let mut vars = VarStore::new();
    vars.store_int("k", 5);
    let err = call_stdlib(&mut vars, &SharedOutput::new(), "getFloat", &["k".into()]).unwrap_err();
    assert!(matches!(
        err,
        NativeError::VarStore(VarStoreError::TypeMismatch { .. })
    ));
}

#[test]
fn test_store_float_follows_precision() {
    let mut vars = VarStore::new();
    let out = SharedOutput::new();
    call_stdlib(&mut vars, &out, "storeFloat", &["f".into(), Operand::Double(0.25)]).unwrap();
    assert_eq!(vars.get("f"), Some(&Operand::Float(0.25)));
    vars.set_use_double(true);
    call_stdlib(&mut vars, &out, "storeFloat", &["f".into(), Operand::Double(0.25)]).unwrap();
    assert_eq!(vars.get("f"), Some(&Operand::Double(0.25)));
    let using = call_stdlib(&mut vars, &out, "isUsingDouble", &[]).unwrap();
    assert_eq!(using, Operand::Bool(true));
}

#[test]
fn test_vec_round_trip_through_natives() {
    let mut vars = VarStore::new();
    let out = SharedOutput::new();
    let v = Operand::Vec2(Vec2::new(-1.0, 3.5));
    call_stdlib(&mut vars, &out, "storeVec", &["pos".into(), v.clone()]).unwrap();
    assert_eq!(call_stdlib(&mut vars, &out, "getVec", &["pos".into()]).unwrap(), v);
}

#[test]
fn test_missing_array() {
    let mut vars = VarStore::new();
    let err = call_stdlib(
        &mut vars,
        &SharedOutput::new(),
        "accessInt",
        &["none".into(), Operand::Int(0)],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        NativeError::VarStore(VarStoreError::Missing { .. })
    ));
}
