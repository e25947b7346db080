//! Bytecode interpreter for SnapScript
//!
//! This crate provides a stack-based virtual machine with:
//! - An operand stack for intermediates and a frame stack for script calls
//! - Locals in a separate slot array, addressed relative to each frame
//! - Bounded operand and call stacks, reset after every fault
//! - Synchronous native calls through the registry
//!
//! # Example
//!
//! ```
//! use builtins::{NativeRegistry, VarStore};
//! use bytecode_system::{CompiledProgram, FunctionId, FunctionInfo, Opcode};
//! use core_types::{Operand, SourcePosition, ValueType};
//! use interpreter::{ExecutionContext, Vm};
//!
//! let mut program = CompiledProgram::default();
//! let idx = program.chunk.add_constant(Operand::Int(42));
//! program.chunk.emit(Opcode::PushConst(idx)).unwrap();
//! program.chunk.emit(Opcode::Return).unwrap();
//! program.functions.push(FunctionInfo {
//!     name: "Answer".to_string(),
//!     params: vec![],
//!     return_type: ValueType::Int,
//!     entry: 0,
//!     local_count: 0,
//!     position: SourcePosition::default(),
//! });
//!
//! let registry = NativeRegistry::new();
//! let mut vars = VarStore::new();
//! let mut out = std::io::sink();
//! let mut ctx = ExecutionContext::new(&program, &registry, &mut vars, &mut out);
//!
//! let mut vm = Vm::default();
//! let result = vm.invoke(&mut ctx, FunctionId(0), &[]).unwrap();
//! assert_eq!(result, Operand::Int(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call_frame;
pub mod context;
pub mod dispatch;
pub mod ops;
pub mod vm;

// Re-export main types at crate root
pub use call_frame::CallFrame;
pub use context::ExecutionContext;
pub use dispatch::Dispatcher;
pub use vm::{Vm, VmConfig, VmState, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STACK};
