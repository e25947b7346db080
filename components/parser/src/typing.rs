//! Static result types of operators

use bytecode_system::Opcode;
use core_types::ValueType;

/// Why an operator rejected its operands: the expectation and the culprit
pub type OperandMismatch = (&'static str, ValueType);

fn arithmetic(left: ValueType, right: ValueType) -> Result<ValueType, OperandMismatch> {
    match (left, right) {
        (ValueType::Int, ValueType::Int) => Ok(ValueType::Int),
        (l, r) if l.is_numeric() && r.is_numeric() => Ok(ValueType::Float),
        (l, r) => Err(("a numeric operand", if l.is_numeric() { r } else { l })),
    }
}

/// Result type of a binary operator, or the reason it cannot apply
pub fn binary_result(op: Opcode, left: ValueType, right: ValueType) -> Result<ValueType, OperandMismatch> {
    use ValueType::{Bool, Float, Int, String, Vec2, Void};

    match op {
        Opcode::Add => match (left, right) {
            (String, other) | (other, String) if other != Void => Ok(String),
            (Vec2, Vec2) => Ok(Vec2),
            _ => arithmetic(left, right),
        },
        Opcode::Sub => match (left, right) {
            (Vec2, Vec2) => Ok(Vec2),
            _ => arithmetic(left, right),
        },
        Opcode::Mul => match (left, right) {
            (Vec2, Vec2) => Ok(Float),
            (Vec2, s) | (s, Vec2) if s.is_numeric() => Ok(Vec2),
            _ => arithmetic(left, right),
        },
        Opcode::Div => match (left, right) {
            (Vec2, s) if s.is_numeric() => Ok(Vec2),
            _ => arithmetic(left, right),
        },
        Opcode::Mod => arithmetic(left, right),
        Opcode::BitAnd | Opcode::BitOr | Opcode::BitXor | Opcode::Shl | Opcode::Shr => {
            match (left, right) {
                (Int, Int) => Ok(Int),
                (Int, other) | (other, _) => Err(("an int operand", other)),
            }
        }
        Opcode::Lt | Opcode::Le | Opcode::Gt | Opcode::Ge => {
            arithmetic(left, right).map(|_| Bool)
        }
        Opcode::Eq | Opcode::Ne => match (left, right) {
            (Void, _) => Err(("a comparable operand", Void)),
            (_, Void) => Err(("a comparable operand", Void)),
            (l, r) if l == r || (l.is_numeric() && r.is_numeric()) => Ok(Bool),
            (_, r) => Err(("an operand of the same type", r)),
        },
        _ => Err(("an operator", left)),
    }
}

/// Result type of a unary operator
pub fn unary_result(op: Opcode, operand: ValueType) -> Result<ValueType, OperandMismatch> {
    match (op, operand) {
        (Opcode::Neg, ValueType::Int | ValueType::Float | ValueType::Vec2) => Ok(operand),
        (Opcode::Neg, _) => Err(("int, float or vec2", operand)),
        (Opcode::Not, ValueType::Bool) => Ok(ValueType::Bool),
        (_, _) => Err(("bool", operand)),
    }
}
