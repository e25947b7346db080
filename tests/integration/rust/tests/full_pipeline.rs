//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Lexer -> Compiler -> Bytecode -> VM -> Result

use builtins::{NativeRegistry, SharedOutput, VarStore};
use bytecode_system::Opcode;
use core_types::{Operand, Precision};
use interpreter::{ExecutionContext, Vm, VmConfig};
use parser::{compile_program, tokenize, CompileOptions, ScriptSource, TokenKind};

/// Compile `source`, initialize constants and call `F()`
fn execute(source: &str, precision: Precision) -> Result<Operand, String> {
    let registry = NativeRegistry::with_stdlib().map_err(|e| e.to_string())?;
    let program = compile_program(
        &[ScriptSource::new("main", source)],
        &registry,
        &CompileOptions::default(),
    )
    .map_err(|e| format!("Compile error: {}", e))?;

    let mut vars = VarStore::new();
    let mut out = SharedOutput::new();
    let mut ctx = ExecutionContext::new(&program, &registry, &mut vars, &mut out);
    let mut vm = Vm::new(VmConfig {
        precision,
        ..VmConfig::default()
    });
    vm.initialize(&mut ctx).map_err(|e| e.to_string())?;
    let (id, _) = program.find("F").ok_or("no function F")?;
    vm.invoke(&mut ctx, id, &[])
        .map_err(|e| format!("Execution error: {}", e))
}

fn execute_single(source: &str) -> Operand {
    execute(source, Precision::Single).expect("Execution failed")
}

/// Test: comments are skipped by the lexer
#[test]
fn test_full_pipeline_comments() {
    let source = "// leading\nint F() { /* inline */ return 4; } // trailing";
    let kinds: Vec<TokenKind> = tokenize(source).unwrap().into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds.first(), Some(&TokenKind::Keyword(parser::Keyword::Int)));
    assert_eq!(execute_single(source), Operand::Int(4));
}

/// Test: operator precedence
#[test]
fn test_full_pipeline_precedence() {
    assert_eq!(execute_single("int F() { return 1 + 2 * 3 - 8 / 4; }"), Operand::Int(5));
    assert_eq!(execute_single("bool F() { return 1 + 1 == 2 && !(3 < 2); }"), Operand::Bool(true));
}

/// Test: equal literals share one pool slot
#[test]
fn test_full_pipeline_constant_pooling() {
    let registry = NativeRegistry::new();
    let program = compile_program(
        &[ScriptSource::new("main", "int F() { return 7 + 7 + 7; }")],
        &registry,
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(program.chunk.constant_count(), 1);
    let pushes = program
        .chunk
        .instructions
        .iter()
        .filter(|i| matches!(i.opcode, Opcode::PushConst(0)))
        .count();
    assert_eq!(pushes, 3);
}

/// Test: locals in sibling blocks
#[test]
fn test_full_pipeline_sibling_scopes() {
    let source = "int F() {
        int total = 0;
        { int a = 2; total += a; }
        { int b = 3; total += b; }
        return total;
    }";
    assert_eq!(execute_single(source), Operand::Int(5));
}

/// Test: compound assignment and increment on floats
#[test]
fn test_full_pipeline_compound_assignment() {
    let source = "float F() { float x = 1; x *= 3; x -= 0.5; x++; return x; }";
    assert_eq!(execute_single(source), Operand::Float(3.5));
}

/// Test: vec2 values flow through calls
#[test]
fn test_full_pipeline_vectors() {
    let source = "vec2 Step(vec2 p, vec2 v, float dt) { return p + v * dt; }
                  vec2 F() { return Step([0, 0], [2, 4], 0.5); }";
    assert_eq!(
        execute_single(source),
        Operand::Vec2(core_types::Vec2::new(1.0, 2.0))
    );
}

/// Test: natives called with widened arguments
#[test]
fn test_full_pipeline_math_natives() {
    assert_eq!(execute_single("float F() { return sqrt(16); }"), Operand::Float(4.0));
    assert_eq!(execute_single("int F() { return max(3, 9); }"), Operand::Int(9));
    assert_eq!(execute_single("int F() { return round(2.6); }"), Operand::Int(3));
    assert_eq!(execute_single("int F() { return strToInt(\"42\") + 1; }"), Operand::Int(43));
}

/// Test: precision of the same program in both modes
#[test]
fn test_full_pipeline_precision() {
    let source = "float F() { return 2.0 / 3; }";
    assert_eq!(
        execute(source, Precision::Single).unwrap(),
        Operand::Float(2.0f32 / 3.0f32)
    );
    assert_eq!(
        execute(source, Precision::Double).unwrap(),
        Operand::Double(2.0 / 3.0)
    );
}

/// Test: compile errors stop the pipeline
#[test]
fn test_full_pipeline_compile_error() {
    let err = execute("int F() { return true; }", Precision::Single).unwrap_err();
    assert!(err.starts_with("Compile error:"));
}

/// Test: runtime errors name the function
#[test]
fn test_full_pipeline_runtime_error() {
    let err = execute("int Zero() { return 0; } int F() { return 1 % Zero(); }", Precision::Single)
        .unwrap_err();
    assert!(err.contains("'F'"), "{}", err);
    assert!(err.contains("division by zero"), "{}", err);
}
