//! Host Scenario Integration Tests
//!
//! A host embedding the engine the way a game loop does: register natives,
//! compile several sources, initialize once, then invoke per tick.

use snapscript::{
    CompileError, Operand, ProgramOptions, RuntimeFault, ScriptProgram, ScriptSource,
    SharedOutput, ValueType, Vec2,
};
use std::io::Write;

fn game(sources: &[(&str, &str)], out: &SharedOutput) -> ScriptProgram {
    let mut program = ScriptProgram::new(
        sources
            .iter()
            .map(|(name, text)| ScriptSource::new(*name, *text))
            .collect(),
    );
    program.set_output(out.clone());
    program
}

/// Scenario A: Init stores a tick counter, Tick prints it without writing back
#[test]
fn test_scenario_init_then_ten_ticks() {
    let out = SharedOutput::new();
    let mut program = game(
        &[(
            "sample",
            "void Init(){ storeInt(\"tick\",0); } void Tick(){ int t=getInt(\"tick\"); println(t); }",
        )],
        &out,
    );
    assert!(program.compile());
    program.init_runtime(false).unwrap();

    let init = program.find_function("Init").unwrap();
    let tick = program.find_function("Tick").unwrap();
    program.invoke(&init, &[]).unwrap();
    for _ in 0..10 {
        program.invoke(&tick, &[]).unwrap();
    }
    assert_eq!(out.contents(), "0\n".repeat(10));
}

/// Scenario B: only `print(int)` exists, so printing a string cannot compile
#[test]
fn test_scenario_print_string_without_overload() {
    let out = SharedOutput::new();
    let mut program = ScriptProgram::with_options(
        ProgramOptions::default().with_link_stdlib(false),
        vec![ScriptSource::new("main", "void Tick() { print(\"x\"); }")],
    );
    program.set_output(out);
    program
        .register_native("print", &[ValueType::Int], ValueType::Void, |ctx, args| {
            write!(ctx.out, "{}", args[0])?;
            Ok(Operand::Void)
        })
        .unwrap();

    assert!(!program.compile());
    let err = program.last_compile_error().unwrap();
    assert!(
        matches!(
            err,
            CompileError::TypeMismatch { .. } | CompileError::NoMatchingOverload { .. }
        ),
        "{:?}",
        err
    );
    assert!(err.position().is_some());
}

/// Forward references across sources, with host natives in between
#[test]
fn test_entity_update_across_sources() {
    let out = SharedOutput::new();
    let mut program = game(
        &[
            (
                "main",
                r#"
                void Init() {
                    storeVec("pos", [0, 0]);
                    storeVec("vel", [1, 2]);
                }
                void Tick() {
                    storeVec("pos", Integrate(getVec("pos"), getVec("vel"), DT));
                    log(getVec("pos"));
                }
                "#,
            ),
            (
                "physics",
                r#"
                const { float DT = 0.5; }
                vec2 Integrate(vec2 p, vec2 v, float dt) { return p + v * dt; }
                "#,
            ),
        ],
        &out,
    );
    program
        .register_native("log", &[ValueType::Vec2], ValueType::Void, |ctx, args| {
            writeln!(ctx.out, "pos={}", args[0])?;
            Ok(Operand::Void)
        })
        .unwrap();
    assert!(program.compile(), "{:?}", program.last_compile_error());
    program.init_runtime(false).unwrap();

    let init = program.find_function("Init").unwrap();
    let tick = program.find_function("Tick").unwrap();
    program.invoke(&init, &[]).unwrap();
    for _ in 0..4 {
        program.invoke(&tick, &[]).unwrap();
    }
    assert_eq!(
        program.var_store().get_vec2("pos").unwrap(),
        Vec2::new(2.0, 4.0)
    );
    assert_eq!(out.lines().len(), 4);
}

/// A runaway script faults, and the next tick runs normally
#[test]
fn test_recovery_after_call_depth_overflow() {
    let out = SharedOutput::new();
    let mut program = ScriptProgram::with_options(
        ProgramOptions::default().with_max_call_depth(50),
        vec![ScriptSource::new(
            "main",
            "int Forever(int n) { return Forever(n + 1); } void Tick() { println(\"ok\"); }",
        )],
    );
    program.set_output(out.clone());
    assert!(program.compile());
    program.init_runtime(false).unwrap();

    let forever = program.find_function("Forever").unwrap();
    let err = program.invoke(&forever, &[Operand::Int(0)]).unwrap_err();
    assert!(matches!(err.cause, RuntimeFault::CallStackOverflow { depth: 50 }));

    let tick = program.find_function("Tick").unwrap();
    program.invoke(&tick, &[]).unwrap();
    assert_eq!(out.lines(), vec!["ok"]);
}

/// Scripts fill arrays in the variable store; the host reads them back
#[test]
fn test_arrays_shared_with_host() {
    let out = SharedOutput::new();
    let mut program = game(
        &[(
            "main",
            r#"
            void Init() {
                newFloatArray("heights", 3);
                for (int i = 0; i < 3; i++) assignFloat("heights", i, i * 1.5);
            }
            "#,
        )],
        &out,
    );
    assert!(program.compile());
    program.init_runtime(true).unwrap();
    let init = program.find_function("Init").unwrap();
    program.invoke(&init, &[]).unwrap();

    let vars = program.var_store();
    assert_eq!(vars.array_length("heights").unwrap(), 3);
    assert_eq!(
        vars.access("heights", ValueType::Float, 2).unwrap(),
        Operand::Double(3.0)
    );
}
