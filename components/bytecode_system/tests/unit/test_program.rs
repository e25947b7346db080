//! Tests for CompiledProgram

use bytecode_system::{
    format_types, CompiledProgram, FunctionId, FunctionInfo, GlobalId, GlobalInfo, Opcode,
};
use core_types::{SourcePosition, ValueType};

fn function(name: &str, params: &[ValueType], ret: ValueType, entry: usize) -> FunctionInfo {
    FunctionInfo {
        name: name.to_string(),
        params: params.to_vec(),
        return_type: ret,
        entry,
        local_count: params.len(),
        position: SourcePosition::default(),
    }
}

#[test]
fn test_format_types() {
    assert_eq!(format_types(&[]), "");
    assert_eq!(
        format_types(&[ValueType::Int, ValueType::String]),
        "int, string"
    );
}

#[test]
fn test_lookup_missing_function() {
    let program = CompiledProgram::default();
    assert!(program.find("DoesNotExist").is_none());
    assert!(program.function(FunctionId(0)).is_none());
}

#[test]
fn test_find_by_name_and_arity() {
    let mut program = CompiledProgram::default();
    program.chunk.emit(Opcode::PushDefault(ValueType::Int)).unwrap();
    program.chunk.emit(Opcode::Return).unwrap();
    program
        .functions
        .push(function("add", &[ValueType::Int, ValueType::Int], ValueType::Int, 0));
    let (id, info) = program.find("add").unwrap();
    assert_eq!(id, FunctionId(0));
    assert_eq!(info.arity(), 2);
    assert!(program.find_exact("add", &[ValueType::Int]).is_none());
}

#[test]
fn test_globals_by_name() {
    let mut program = CompiledProgram::default();
    program.globals.push(GlobalInfo {
        name: "SPEED".to_string(),
        ty: ValueType::Float,
        position: SourcePosition::default(),
    });
    let (id, global) = program.find_global("SPEED").unwrap();
    assert_eq!(id, GlobalId(0));
    assert_eq!(global.ty, ValueType::Float);
    assert!(program.global(GlobalId(1)).is_none());
}
