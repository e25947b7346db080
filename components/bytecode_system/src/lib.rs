//! Bytecode system for the SnapScript engine
//!
//! This crate provides the instruction set, the shared instruction buffer
//! with its pooled constant table, and the compiled program artifact
//! (function table and global constants) consumed by the interpreter.
//!
//! # Features
//!
//! - Stack-based bytecode architecture
//! - Constant pooling: equal literals share one slot
//! - Capacity-limited buffer (emitting past it is a compile error)
//! - Human-readable disassembly
//!
//! # Example
//!
//! ```
//! use bytecode_system::{BytecodeChunk, Opcode};
//! use core_types::Operand;
//!
//! let mut chunk = BytecodeChunk::new();
//!
//! // Add constants
//! let idx = chunk.add_constant(Operand::Int(42));
//! assert_eq!(chunk.add_constant(Operand::Int(42)), idx);
//!
//! // Emit instructions
//! chunk.emit(Opcode::PushConst(idx)).unwrap();
//! chunk.emit(Opcode::Return).unwrap();
//!
//! assert!(chunk.to_string().contains("PUSH_CONST"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod instruction;
pub mod opcode;
pub mod program;

// Re-export main types at crate root
pub use chunk::{BytecodeChunk, DEFAULT_CAPACITY};
pub use instruction::Instruction;
pub use opcode::{FunctionId, GlobalId, NativeId, Opcode, SlotId};
pub use program::{format_types, CompiledProgram, FunctionInfo, GlobalInfo, INITIALIZER_NAME};
