//! Contract tests for print/println

use super::call_stdlib;
use builtins::{SharedOutput, VarStore};
use core_types::{Operand, Vec2};

#[test]
fn test_println_each_type() {
    let mut vars = VarStore::new();
    let out = SharedOutput::new();
    for value in [
        Operand::from("hello"),
        Operand::Int(-4),
        Operand::Double(0.5),
        Operand::Bool(true),
        Operand::Vec2(Vec2::new(1.0, 2.0)),
    ] {
        call_stdlib(&mut vars, &out, "println", &[value]).unwrap();
    }
    assert_eq!(out.lines(), vec!["hello", "-4", "0.5", "true", "[1.0, 2.0]"]);
}

#[test]
fn test_print_has_no_newline() {
    let mut vars = VarStore::new();
    let out = SharedOutput::new();
    call_stdlib(&mut vars, &out, "print", &[Operand::from("a")]).unwrap();
    call_stdlib(&mut vars, &out, "print", &[Operand::from("b")]).unwrap();
    assert_eq!(out.contents(), "ab");
}
