//! Integration tests: compile SnapScript source and run it on the VM

use builtins::{NativeRegistry, SharedOutput, VarStore};
use bytecode_system::CompiledProgram;
use core_types::{Operand, Precision, RuntimeFault, ScriptInvocationError, ValueType, Vec2};
use interpreter::{ExecutionContext, Vm, VmConfig, VmState};
use parser::{compile_program, CompileOptions, ScriptSource};

/// A compiled program together with the host state it runs against
struct Harness {
    program: CompiledProgram,
    registry: NativeRegistry,
    vars: VarStore,
    out: SharedOutput,
    vm: Vm,
}

impl Harness {
    fn with_config(source: &str, config: VmConfig) -> Self {
        let registry = NativeRegistry::with_stdlib().unwrap();
        let program = compile_program(
            &[ScriptSource::new("main", source)],
            &registry,
            &CompileOptions::default(),
        )
        .unwrap();
        let mut harness = Self {
            program,
            registry,
            vars: VarStore::new(),
            out: SharedOutput::new(),
            vm: Vm::new(config),
        };
        harness
            .vars
            .set_use_double(config.precision == Precision::Double);
        let mut ctx = ExecutionContext::new(
            &harness.program,
            &harness.registry,
            &mut harness.vars,
            &mut harness.out,
        );
        harness.vm.initialize(&mut ctx).unwrap();
        harness
    }

    fn new(source: &str) -> Self {
        Self::with_config(source, VmConfig::default())
    }

    fn call(&mut self, name: &str, args: &[Operand]) -> Result<Operand, ScriptInvocationError> {
        let (id, _) = self.program.find(name).unwrap();
        let mut ctx = ExecutionContext::new(&self.program, &self.registry, &mut self.vars, &mut self.out);
        self.vm.invoke(&mut ctx, id, args)
    }

    fn output(&self) -> Vec<String> {
        self.out.lines()
    }
}

fn eval(source: &str) -> Operand {
    Harness::new(source).call("F", &[]).unwrap()
}

// ============================================================================
// Control Flow
// ============================================================================

#[test]
fn test_recursive_fibonacci() {
    let mut h = Harness::new("int Fib(int n) { if (n < 2) return n; return Fib(n - 1) + Fib(n - 2); }");
    assert_eq!(h.call("Fib", &[Operand::Int(15)]).unwrap(), Operand::Int(610));
}

#[test]
fn test_while_with_break_and_continue() {
    let source = "int F() {
        int i = 0; int sum = 0;
        while (true) {
            i++;
            if (i > 10) break;
            if (i % 2 == 1) continue;
            sum += i;
        }
        return sum;
    }";
    assert_eq!(eval(source), Operand::Int(30));
}

#[test]
fn test_for_loop_continue_runs_update() {
    let source = "int F() {
        int hits = 0;
        for (int i = 0; i < 5; i++) { if (i == 2) continue; hits += 1; }
        return hits;
    }";
    assert_eq!(eval(source), Operand::Int(4));
}

#[test]
fn test_nested_loops_break_inner_only() {
    let source = "int F() {
        int n = 0;
        for (int i = 0; i < 3; i++) {
            for (int j = 0; j < 10; j++) { if (j == 2) break; n++; }
        }
        return n;
    }";
    assert_eq!(eval(source), Operand::Int(6));
}

#[test]
fn test_short_circuit_skips_right_side() {
    let mut h = Harness::new(
        "bool Side() { println(\"side\"); return true; }
         bool F() { return false && Side(); }
         bool G() { return true || Side(); }
         bool H() { return true && Side(); }",
    );
    assert_eq!(h.call("F", &[]).unwrap(), Operand::Bool(false));
    assert_eq!(h.call("G", &[]).unwrap(), Operand::Bool(true));
    assert!(h.output().is_empty());
    assert_eq!(h.call("H", &[]).unwrap(), Operand::Bool(true));
    assert_eq!(h.output(), vec!["side"]);
}

#[test]
fn test_void_function_falls_off_end() {
    let mut h = Harness::new("void F() { int x = 1; }");
    assert_eq!(h.call("F", &[]).unwrap(), Operand::Void);
}

// ============================================================================
// Arithmetic and Values
// ============================================================================

#[test]
fn test_int_division_truncates() {
    assert_eq!(eval("int F() { return -7 / 2; }"), Operand::Int(-3));
    assert_eq!(eval("int F() { return -7 % 3; }"), Operand::Int(-1));
}

#[test]
fn test_int_overflow_wraps() {
    assert_eq!(eval("int F() { return 2147483647 + 1; }"), Operand::Int(i32::MIN));
}

#[test]
fn test_int_division_by_zero_faults() {
    let mut h = Harness::new("int F(int d) { return 10 / d; }");
    let err = h.call("F", &[Operand::Int(0)]).unwrap_err();
    assert!(matches!(err.cause, RuntimeFault::DivisionByZero));
    assert_eq!(err.function, "F");
    assert_eq!(h.vm.state(), VmState::Failed);
    assert_eq!(h.call("F", &[Operand::Int(5)]).unwrap(), Operand::Int(2));
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    match eval("float F() { return 1.0 / 0; }") {
        Operand::Float(f) => assert!(f.is_infinite()),
        other => panic!("expected float, got {:?}", other),
    }
}

#[test]
fn test_mixed_arithmetic_promotes() {
    assert_eq!(eval("float F() { return 1 + 0.5; }"), Operand::Float(1.5));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        eval("string F() { return \"n=\" + 3 + \", ok=\" + true; }"),
        Operand::from("n=3, ok=true")
    );
}

#[test]
fn test_bitwise_ops() {
    assert_eq!(eval("int F() { return (1 << 4) | 3 ^ 1; }"), Operand::Int(18));
    assert_eq!(eval("int F() { return -16 >> 2; }"), Operand::Int(-4));
}

#[test]
fn test_vector_arithmetic() {
    assert_eq!(
        eval("vec2 F() { vec2 a = [1, 2]; return a * 2 + [0.5, 0.5]; }"),
        Operand::Vec2(Vec2::new(2.5, 4.5))
    );
    assert_eq!(eval("float F() { return [1, 2] * [3, 4]; }"), Operand::Float(11.0));
    assert_eq!(eval("float F() { return vecMag([3, 4]); }"), Operand::Float(5.0));
}

// ============================================================================
// Precision
// ============================================================================

#[test]
fn test_single_precision_floats() {
    assert_eq!(
        eval("float F() { return 0.1 + 0.2; }"),
        Operand::Float(0.1f32 + 0.2f32)
    );
}

#[test]
fn test_double_precision_floats() {
    let config = VmConfig {
        precision: Precision::Double,
        ..VmConfig::default()
    };
    let mut h = Harness::with_config(
        "float F() { return 0.1 + 0.2; } bool D() { return isUsingDouble(); }",
        config,
    );
    assert_eq!(h.call("F", &[]).unwrap(), Operand::Double(0.1 + 0.2));
    assert_eq!(h.call("D", &[]).unwrap(), Operand::Bool(true));
}

// ============================================================================
// Calls and Limits
// ============================================================================

#[test]
fn test_call_depth_overflow_and_recovery() {
    let config = VmConfig {
        max_call_depth: 32,
        ..VmConfig::default()
    };
    let mut h = Harness::with_config(
        "int Down(int n) { return Down(n + 1); } int Ok() { return 1; }",
        config,
    );
    let err = h.call("Down", &[Operand::Int(0)]).unwrap_err();
    assert!(matches!(err.cause, RuntimeFault::CallStackOverflow { depth: 32 }));
    assert_eq!(err.function, "Down");
    assert_eq!(h.call("Ok", &[]).unwrap(), Operand::Int(1));
}

#[test]
fn test_int_argument_widens_at_call_site() {
    let mut h = Harness::new("float Half(float x) { return x / 2; } float F() { return Half(3); }");
    assert_eq!(h.call("F", &[]).unwrap(), Operand::Float(1.5));
}

#[test]
fn test_overload_selection_at_runtime() {
    let mut h = Harness::new(
        "string Kind(int a) { return \"int\"; }
         string Kind(float a) { return \"float\"; }
         string F() { return Kind(1) + Kind(1.0); }",
    );
    assert_eq!(h.call("F", &[]).unwrap(), Operand::from("intfloat"));
}

#[test]
fn test_native_output_and_var_store() {
    let mut h = Harness::new(
        "void Init() { storeInt(\"tick\", 0); }
         void Tick() { int t = getInt(\"tick\"); println(t); storeInt(\"tick\", t + 1); }",
    );
    h.call("Init", &[]).unwrap();
    for _ in 0..3 {
        h.call("Tick", &[]).unwrap();
    }
    assert_eq!(h.output(), vec!["0", "1", "2"]);
    assert_eq!(h.vars.get_int("tick").unwrap(), 3);
}

#[test]
fn test_typed_arrays_through_natives() {
    let mut h = Harness::new(
        "int F() {
            newIntArray(\"xs\", 4);
            for (int i = 0; i < arrayLength(\"xs\"); i++) assignInt(\"xs\", i, i * i);
            return accessInt(\"xs\", 3);
        }
        int Oob() { return accessInt(\"xs\", 9); }",
    );
    assert_eq!(h.call("F", &[]).unwrap(), Operand::Int(9));
    let err = h.call("Oob", &[]).unwrap_err();
    assert!(matches!(err.cause, RuntimeFault::VarStore(_)));
}

// ============================================================================
// Constants
// ============================================================================

#[test]
fn test_constants_initialized_before_calls() {
    let mut h = Harness::new(
        "const {
             int LIMIT = 3;
             float HALF = LIMIT / 2.0;
             string NAME = \"snap\" + LIMIT;
         }
         float F() { return HALF; }
         string N() { return NAME; }",
    );
    assert_eq!(h.call("F", &[]).unwrap(), Operand::Float(1.5));
    assert_eq!(h.call("N", &[]).unwrap(), Operand::from("snap3"));
    assert_eq!(h.program.find_global("HALF").unwrap().1.ty, ValueType::Float);
}
