//! Unit tests for interpreter components

use builtins::{NativeRegistry, SharedOutput, VarStore};
use bytecode_system::{CompiledProgram, FunctionId, FunctionInfo, Opcode, SlotId};
use core_types::{NativeError, Operand, Precision, RuntimeFault, SourcePosition, ValueType, VarStoreError, Vec2};
use interpreter::{CallFrame, Dispatcher, ExecutionContext, Vm, VmConfig, VmState};
use std::io::Write;

fn single_function(ops: &[Opcode], constants: &[Operand], ret: ValueType) -> CompiledProgram {
    let mut program = CompiledProgram::default();
    for c in constants {
        program.chunk.add_constant(c.clone());
    }
    for op in ops {
        program.chunk.emit(*op).unwrap();
    }
    program.functions.push(FunctionInfo {
        name: "Main".to_string(),
        params: vec![],
        return_type: ret,
        entry: 0,
        local_count: 2,
        position: SourcePosition::default(),
    });
    program
}

fn run_with(
    program: &CompiledProgram,
    registry: &NativeRegistry,
    vars: &mut VarStore,
    out: &mut SharedOutput,
) -> Result<Operand, core_types::ScriptInvocationError> {
    let mut ctx = ExecutionContext::new(program, registry, vars, out);
    Vm::default().invoke(&mut ctx, FunctionId(0), &[])
}

fn run(program: &CompiledProgram) -> Result<Operand, core_types::ScriptInvocationError> {
    run_with(
        program,
        &NativeRegistry::new(),
        &mut VarStore::new(),
        &mut SharedOutput::new(),
    )
}

// ============================================================================
// CallFrame / Dispatcher Tests
// ============================================================================

#[test]
fn test_call_frame_is_copy() {
    let frame = CallFrame::new(FunctionId(1), 4, 0, 0);
    let copy = frame;
    assert_eq!(frame, copy);
}

#[test]
fn test_dispatcher_starts_empty() {
    let dispatcher = Dispatcher::new(16, 4, Precision::Single);
    assert_eq!(dispatcher.stack_depth(), 0);
    assert_eq!(dispatcher.call_depth(), 0);
}

// ============================================================================
// Opcode Tests
// ============================================================================

#[test]
fn test_push_default_per_type() {
    for (ty, expected) in [
        (ValueType::Int, Operand::Int(0)),
        (ValueType::Float, Operand::Float(0.0)),
        (ValueType::Bool, Operand::Bool(false)),
        (ValueType::String, Operand::from("")),
        (ValueType::Vec2, Operand::Vec2(Vec2::default())),
    ] {
        let program = single_function(&[Opcode::PushDefault(ty), Opcode::Return], &[], ty);
        assert_eq!(run(&program).unwrap(), expected);
    }
}

#[test]
fn test_make_vec2_from_ints() {
    let program = single_function(
        &[
            Opcode::PushConst(0),
            Opcode::PushConst(1),
            Opcode::MakeVec2,
            Opcode::Return,
        ],
        &[Operand::Int(3), Operand::Int(4)],
        ValueType::Vec2,
    );
    assert_eq!(run(&program).unwrap(), Operand::Vec2(Vec2::new(3.0, 4.0)));
}

#[test]
fn test_widen_int() {
    let program = single_function(
        &[Opcode::PushConst(0), Opcode::Widen, Opcode::Return],
        &[Operand::Int(2)],
        ValueType::Float,
    );
    assert_eq!(run(&program).unwrap(), Operand::Float(2.0));
}

#[test]
fn test_not_and_comparison() {
    let program = single_function(
        &[
            Opcode::PushConst(0),
            Opcode::PushConst(1),
            Opcode::Ge,
            Opcode::Not,
            Opcode::Return,
        ],
        &[Operand::Int(1), Operand::Int(2)],
        ValueType::Bool,
    );
    assert_eq!(run(&program).unwrap(), Operand::Bool(true));
}

#[test]
fn test_local_slots_survive_across_instructions() {
    let program = single_function(
        &[
            Opcode::PushConst(0),
            Opcode::StoreLocal(SlotId(1)),
            Opcode::PushTrue,
            Opcode::Pop,
            Opcode::LoadLocal(SlotId(1)),
            Opcode::Return,
        ],
        &[Operand::from("kept")],
        ValueType::String,
    );
    assert_eq!(run(&program).unwrap(), Operand::from("kept"));
}

#[test]
fn test_type_mismatch_at_opcode() {
    let program = single_function(
        &[
            Opcode::PushTrue,
            Opcode::PushConst(0),
            Opcode::Sub,
            Opcode::Return,
        ],
        &[Operand::Int(1)],
        ValueType::Int,
    );
    let err = run(&program).unwrap_err();
    assert!(matches!(err.cause, RuntimeFault::TypeMismatch { ref operation, .. } if operation == "SUB"));
    assert_eq!(err.offset, 2);
}

// ============================================================================
// Native Call Tests
// ============================================================================

#[test]
fn test_native_output_and_return() {
    let mut registry = NativeRegistry::new();
    let id = registry
        .register("shout", &[ValueType::String], ValueType::Int, |ctx, args| {
            let text = args[0].as_str().unwrap_or_default();
            write!(ctx.out, "{}!", text).map_err(NativeError::from)?;
            Ok(Operand::Int(text.len() as i32))
        })
        .unwrap();
    let program = single_function(
        &[Opcode::PushConst(0), Opcode::CallNative(id), Opcode::Return],
        &[Operand::from("hey")],
        ValueType::Int,
    );
    let mut out = SharedOutput::new();
    let result = run_with(&program, &registry, &mut VarStore::new(), &mut out).unwrap();
    assert_eq!(result, Operand::Int(3));
    assert_eq!(out.contents(), "hey!");
}

#[test]
fn test_native_float_return_follows_precision() {
    let mut registry = NativeRegistry::new();
    let id = registry
        .register("third", &[], ValueType::Float, |_, _| Ok(Operand::Double(1.0 / 3.0)))
        .unwrap();
    let program = single_function(
        &[Opcode::CallNative(id), Opcode::Return],
        &[],
        ValueType::Float,
    );
    let mut ctx_vars = VarStore::new();
    let mut out = SharedOutput::new();
    let mut ctx = ExecutionContext::new(&program, &registry, &mut ctx_vars, &mut out);

    let mut single = Vm::default();
    assert_eq!(
        single.invoke(&mut ctx, FunctionId(0), &[]).unwrap(),
        Operand::Float((1.0f64 / 3.0) as f32)
    );

    let mut double = Vm::new(VmConfig {
        precision: Precision::Double,
        ..VmConfig::default()
    });
    assert_eq!(
        double.invoke(&mut ctx, FunctionId(0), &[]).unwrap(),
        Operand::Double(1.0 / 3.0)
    );
}

#[test]
fn test_missing_variable_is_var_store_fault() {
    let mut registry = NativeRegistry::new();
    let id = registry
        .register("getTick", &[], ValueType::Int, |ctx, _| {
            Ok(Operand::Int(ctx.vars.get_int("tick")?))
        })
        .unwrap();
    let program = single_function(&[Opcode::CallNative(id), Opcode::Return], &[], ValueType::Int);
    let err = run_with(&program, &registry, &mut VarStore::new(), &mut SharedOutput::new()).unwrap_err();
    assert!(matches!(
        err.cause,
        RuntimeFault::VarStore(VarStoreError::Missing { ref name }) if name == "tick"
    ));
}

#[test]
fn test_native_failure_is_wrapped() {
    let mut registry = NativeRegistry::new();
    let id = registry
        .register("boom", &[], ValueType::Void, |_, _| {
            Err(NativeError::Failed("kaboom".to_string()))
        })
        .unwrap();
    let program = single_function(&[Opcode::CallNative(id), Opcode::ReturnVoid], &[], ValueType::Void);
    let err = run_with(&program, &registry, &mut VarStore::new(), &mut SharedOutput::new()).unwrap_err();
    assert_eq!(err.to_string(), "error in 'Main' at offset 0: native 'boom' failed: kaboom");
}

#[test]
fn test_many_native_arguments_spill() {
    let mut registry = NativeRegistry::new();
    let params = vec![ValueType::Int; 10];
    let id = registry
        .register("sum10", &params, ValueType::Int, |_, args| {
            Ok(Operand::Int(args.iter().filter_map(Operand::as_int).sum()))
        })
        .unwrap();
    let mut ops = vec![Opcode::PushConst(0); 10];
    ops.push(Opcode::CallNative(id));
    ops.push(Opcode::Return);
    let program = single_function(&ops, &[Operand::Int(2)], ValueType::Int);
    // the empty registry has no native behind the id
    assert!(run(&program).is_err());
    assert_eq!(
        run_with(&program, &registry, &mut VarStore::new(), &mut SharedOutput::new()).unwrap(),
        Operand::Int(20)
    );
}

// ============================================================================
// VM State Tests
// ============================================================================

#[test]
fn test_state_transitions() {
    let ok = single_function(&[Opcode::PushTrue, Opcode::Return], &[], ValueType::Bool);
    let bad = single_function(&[Opcode::Pop], &[], ValueType::Void);
    let registry = NativeRegistry::new();
    let mut vars = VarStore::new();
    let mut out = SharedOutput::new();
    let mut vm = Vm::default();
    assert_eq!(vm.state(), VmState::Ready);

    {
        let mut ctx = ExecutionContext::new(&bad, &registry, &mut vars, &mut out);
        assert!(vm.invoke(&mut ctx, FunctionId(0), &[]).is_err());
    }
    assert_eq!(vm.state(), VmState::Failed);

    let mut ctx = ExecutionContext::new(&ok, &registry, &mut vars, &mut out);
    assert_eq!(vm.invoke(&mut ctx, FunctionId(0), &[]).unwrap(), Operand::Bool(true));
    assert_eq!(vm.state(), VmState::Returned);
}
