//! Bytecode chunk - the shared instruction buffer of a program
//!
//! Holds every function body back to back, plus the pooled constant table.

use crate::instruction::Instruction;
use crate::opcode::Opcode;
use core_types::{CompileError, CompileResult, Operand, SourcePosition};
use std::collections::HashMap;
use std::fmt;

/// Default instruction capacity (1 Mi instructions)
pub const DEFAULT_CAPACITY: usize = 1 << 20;

/// Hashable identity of a pooled constant. Floats compare by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstKey {
    Int(i32),
    Float(u32),
    Double(u64),
    Bool(bool),
    Str(String),
    Vec2(u64, u64),
    Void,
}

impl From<&Operand> for ConstKey {
    fn from(value: &Operand) -> Self {
        match value {
            Operand::Int(n) => ConstKey::Int(*n),
            Operand::Float(n) => ConstKey::Float(n.to_bits()),
            Operand::Double(n) => ConstKey::Double(n.to_bits()),
            Operand::Bool(b) => ConstKey::Bool(*b),
            Operand::Str(s) => ConstKey::Str(s.clone()),
            Operand::Vec2(v) => ConstKey::Vec2(v.x.to_bits(), v.y.to_bits()),
            Operand::Void => ConstKey::Void,
        }
    }
}

/// A compiled instruction buffer with its constant pool
#[derive(Debug, Clone)]
pub struct BytecodeChunk {
    /// Sequence of bytecode instructions
    pub instructions: Vec<Instruction>,
    /// Constant pool for literal values
    pub constants: Vec<Operand>,
    capacity: usize,
    pool: HashMap<ConstKey, usize>,
}

impl BytecodeChunk {
    /// Create a new empty chunk with the default capacity
    pub fn new() -> Self {
        Self::with_capacity_limit(DEFAULT_CAPACITY)
    }

    /// Create a new empty chunk holding at most `capacity` instructions
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            instructions: Vec::new(),
            constants: Vec::new(),
            capacity,
            pool: HashMap::new(),
        }
    }

    /// Maximum number of instructions
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Emit an instruction without source position, returning its offset
    pub fn emit(&mut self, opcode: Opcode) -> CompileResult<usize> {
        self.push(Instruction::new(opcode))
    }

    /// Emit an instruction with source position, returning its offset
    pub fn emit_with_position(
        &mut self,
        opcode: Opcode,
        position: SourcePosition,
    ) -> CompileResult<usize> {
        self.push(Instruction::with_position(opcode, position))
    }

    fn push(&mut self, inst: Instruction) -> CompileResult<usize> {
        if self.instructions.len() >= self.capacity {
            return Err(CompileError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let offset = self.instructions.len();
        self.instructions.push(inst);
        Ok(offset)
    }

    /// Add a constant to the pool and return its index.
    ///
    /// Equal constants share one slot.
    pub fn add_constant(&mut self, value: Operand) -> usize {
        let key = ConstKey::from(&value);
        if let Some(&idx) = self.pool.get(&key) {
            return idx;
        }
        let idx = self.constants.len();
        self.constants.push(value);
        self.pool.insert(key, idx);
        idx
    }

    /// Rewrite the target of the jump at `at`.
    ///
    /// Returns false if `at` is not a jump instruction.
    pub fn patch_jump(&mut self, at: usize, target: usize) -> bool {
        let Some(inst) = self.instructions.get_mut(at) else {
            return false;
        };
        inst.opcode = match inst.opcode {
            Opcode::Jump(_) => Opcode::Jump(target),
            Opcode::JumpIfTrue(_) => Opcode::JumpIfTrue(target),
            Opcode::JumpIfFalse(_) => Opcode::JumpIfFalse(target),
            _ => return false,
        };
        true
    }

    /// Offset the next emitted instruction will receive
    pub fn current_offset(&self) -> usize {
        self.instructions.len()
    }

    /// Instruction at `offset`
    pub fn get(&self, offset: usize) -> Option<&Instruction> {
        self.instructions.get(offset)
    }

    /// Constant at pool index `idx`
    pub fn constant(&self, idx: usize) -> Option<&Operand> {
        self.constants.get(idx)
    }

    /// Last emitted opcode
    pub fn last_opcode(&self) -> Option<Opcode> {
        self.instructions.last().map(|inst| inst.opcode)
    }

    /// Get the number of instructions
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Get the number of constants
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Clear all instructions and constants
    pub fn clear(&mut self) {
        self.instructions.clear();
        self.constants.clear();
        self.pool.clear();
    }

    /// Write a listing of `range` to `f`
    pub(crate) fn write_range(
        &self,
        f: &mut fmt::Formatter<'_>,
        range: std::ops::Range<usize>,
    ) -> fmt::Result {
        for offset in range {
            let Some(inst) = self.instructions.get(offset) else {
                break;
            };
            write!(f, "{:04}  {}", offset, inst.opcode)?;
            if let Opcode::PushConst(idx) = inst.opcode {
                if let Some(value) = self.constants.get(idx) {
                    write!(f, "  ; {:?}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Default for BytecodeChunk {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BytecodeChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_range(f, 0..self.instructions.len())
    }
}
