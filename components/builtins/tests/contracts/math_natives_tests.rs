//! Contract tests for math and conversion natives

use super::call_stdlib;
use builtins::{SharedOutput, VarStore};
use core_types::{NativeError, Operand, Vec2};

fn call(name: &str, args: &[Operand]) -> Operand {
    let mut vars = VarStore::new();
    call_stdlib(&mut vars, &SharedOutput::new(), name, args).unwrap()
}

#[test]
fn test_sqrt() {
    assert_eq!(call("sqrt", &[Operand::Double(9.0)]), Operand::Double(3.0));
}

#[test]
fn test_pow() {
    assert_eq!(
        call("pow", &[Operand::Double(2.0), Operand::Double(10.0)]),
        Operand::Double(1024.0)
    );
}

#[test]
fn test_int_min_max() {
    assert_eq!(call("min", &[Operand::Int(3), Operand::Int(-1)]), Operand::Int(-1));
    assert_eq!(call("max", &[Operand::Int(3), Operand::Int(-1)]), Operand::Int(3));
}

#[test]
fn test_round_and_cast() {
    assert_eq!(call("round", &[Operand::Double(2.5)]), Operand::Int(3));
    assert_eq!(call("cast", &[Operand::Double(2.5)]), Operand::Int(2));
}

#[test]
fn test_vector_helpers() {
    let v = Operand::Vec2(Vec2::new(3.0, 4.0));
    assert_eq!(call("vecMag", &[v.clone()]), Operand::Double(5.0));
    assert_eq!(call("vecX", &[v.clone()]), Operand::Double(3.0));
    assert_eq!(call("vecNorm", &[v]), Operand::Vec2(Vec2::new(0.6, 0.8)));
}

#[test]
fn test_to_string() {
    assert_eq!(call("toString", &[Operand::Int(12)]), Operand::from("12"));
    assert_eq!(call("toString", &[Operand::Bool(false)]), Operand::from("false"));
}

#[test]
fn test_str_to_int_failure() {
    let mut vars = VarStore::new();
    let err = call_stdlib(&mut vars, &SharedOutput::new(), "strToInt", &[Operand::from("x1")])
        .unwrap_err();
    assert!(matches!(err, NativeError::InvalidArgument(_)));
}

#[test]
fn test_time_millis_non_negative() {
    match call("timeMillis", &[]) {
        Operand::Int(n) => assert!(n >= 0),
        other => panic!("expected int, got {:?}", other),
    }
}
