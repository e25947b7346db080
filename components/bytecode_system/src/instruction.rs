//! Bytecode instruction representation
//!
//! An instruction's offset is its index in the program buffer.

use crate::opcode::Opcode;
use core_types::SourcePosition;

/// A single bytecode instruction with optional source mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The opcode for this instruction
    pub opcode: Opcode,
    /// Source position the instruction was emitted for
    pub source_position: Option<SourcePosition>,
}

impl Instruction {
    /// Create a new instruction without source position
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            source_position: None,
        }
    }

    /// Create a new instruction with source position
    pub fn with_position(opcode: Opcode, position: SourcePosition) -> Self {
        Self {
            opcode,
            source_position: Some(position),
        }
    }
}
