//! Bytecode opcodes for the SnapScript stack VM
//!
//! Every opcode pops its operands from the operand stack and pushes its
//! result. Jump targets are absolute instruction offsets in the shared
//! program buffer.

use core_types::ValueType;
use std::fmt;

/// Local variable slot, relative to the current frame's locals base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u32);

/// Index into a program's function table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

/// Index into a native registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub u32);

/// Index into a program's global constant table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId(pub u32);

/// Bytecode opcodes for SnapScript execution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Opcode {
    // Literals
    /// Push constant from the constant pool at given index
    PushConst(usize),
    /// Push boolean true
    PushTrue,
    /// Push boolean false
    PushFalse,
    /// Push the default value of a type (`0`, `0.0`, `false`, `""`, `[0, 0]`)
    PushDefault(ValueType),

    // Variables
    /// Push a local slot
    LoadLocal(SlotId),
    /// Pop into a local slot
    StoreLocal(SlotId),
    /// Push a global constant
    LoadGlobal(GlobalId),
    /// Pop into a global constant (initializer only)
    StoreGlobal(GlobalId),

    // Arithmetic
    /// Add, or concatenate when either side is a string
    Add,
    /// Subtract top from second-top
    Sub,
    /// Multiply; `vec2 * vec2` is the dot product
    Mul,
    /// Divide second-top by top
    Div,
    /// Remainder of second-top by top
    Mod,
    /// Negate top value
    Neg,
    /// Logical NOT
    Not,

    // Bitwise (int only)
    /// Bitwise and
    BitAnd,
    /// Bitwise or
    BitOr,
    /// Bitwise xor
    BitXor,
    /// Shift left
    Shl,
    /// Arithmetic shift right
    Shr,

    // Comparison
    /// Equality (==)
    Eq,
    /// Inequality (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,

    // Conversion
    /// Convert the int on top of the stack to a float of the runtime precision
    Widen,
    /// Pop y then x and push `[x, y]`
    MakeVec2,

    // Control flow
    /// Unconditional jump to offset
    Jump(usize),
    /// Pop a bool and jump to offset if it is true
    JumpIfTrue(usize),
    /// Pop a bool and jump to offset if it is false
    JumpIfFalse(usize),
    /// Discard top value
    Pop,

    // Calls
    /// Call a script function; arguments are on the stack
    Call(FunctionId),
    /// Call a native binding; arguments are on the stack
    CallNative(NativeId),
    /// Return top value from the current function
    Return,
    /// Return `Void` from the current function
    ReturnVoid,
}

impl Opcode {
    /// Check if this opcode is a terminator (ends basic block)
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Opcode::Return
                | Opcode::ReturnVoid
                | Opcode::Jump(_)
                | Opcode::JumpIfTrue(_)
                | Opcode::JumpIfFalse(_)
        )
    }

    /// Check if control never falls through to the next instruction
    pub fn is_unconditional_terminator(&self) -> bool {
        matches!(self, Opcode::Return | Opcode::ReturnVoid | Opcode::Jump(_))
    }

    /// Check if this opcode is a binary arithmetic operation
    pub fn is_binary_arithmetic(&self) -> bool {
        matches!(
            self,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod
        )
    }

    /// Jump target, if this is a jump
    pub fn jump_target(&self) -> Option<usize> {
        match self {
            Opcode::Jump(t) | Opcode::JumpIfTrue(t) | Opcode::JumpIfFalse(t) => Some(*t),
            _ => None,
        }
    }

    /// Mnemonic used in disassembly listings
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::PushConst(_) => "PUSH_CONST",
            Opcode::PushTrue => "PUSH_TRUE",
            Opcode::PushFalse => "PUSH_FALSE",
            Opcode::PushDefault(_) => "PUSH_DEFAULT",
            Opcode::LoadLocal(_) => "LOAD_LOCAL",
            Opcode::StoreLocal(_) => "STORE_LOCAL",
            Opcode::LoadGlobal(_) => "LOAD_GLOBAL",
            Opcode::StoreGlobal(_) => "STORE_GLOBAL",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Neg => "NEG",
            Opcode::Not => "NOT",
            Opcode::BitAnd => "BIT_AND",
            Opcode::BitOr => "BIT_OR",
            Opcode::BitXor => "BIT_XOR",
            Opcode::Shl => "SHL",
            Opcode::Shr => "SHR",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NE",
            Opcode::Lt => "LT",
            Opcode::Le => "LE",
            Opcode::Gt => "GT",
            Opcode::Ge => "GE",
            Opcode::Widen => "WIDEN",
            Opcode::MakeVec2 => "MAKE_VEC2",
            Opcode::Jump(_) => "JUMP",
            Opcode::JumpIfTrue(_) => "JUMP_IF_TRUE",
            Opcode::JumpIfFalse(_) => "JUMP_IF_FALSE",
            Opcode::Pop => "POP",
            Opcode::Call(_) => "CALL",
            Opcode::CallNative(_) => "CALL_NATIVE",
            Opcode::Return => "RETURN",
            Opcode::ReturnVoid => "RETURN_VOID",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.mnemonic();
        match self {
            Opcode::PushConst(idx) => write!(f, "{:<14} #{}", name, idx),
            Opcode::PushDefault(ty) => write!(f, "{:<14} {}", name, ty),
            Opcode::LoadLocal(slot) | Opcode::StoreLocal(slot) => {
                write!(f, "{:<14} ${}", name, slot.0)
            }
            Opcode::LoadGlobal(g) | Opcode::StoreGlobal(g) => write!(f, "{:<14} @{}", name, g.0),
            Opcode::Jump(t) | Opcode::JumpIfTrue(t) | Opcode::JumpIfFalse(t) => {
                write!(f, "{:<14} -> {:04}", name, t)
            }
            Opcode::Call(id) => write!(f, "{:<14} fn{}", name, id.0),
            Opcode::CallNative(id) => write!(f, "{:<14} native{}", name, id.0),
            _ => f.write_str(name),
        }
    }
}
