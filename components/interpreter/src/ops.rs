//! Runtime semantics of arithmetic, comparison and logic opcodes
//!
//! Promotion: `int op int` stays int (wrapping), a `double` operand makes
//! the result double, otherwise a float operand makes it a single-width
//! float. Vector arithmetic always works on `f64` components.

use bytecode_system::Opcode;
use core_types::{Operand, Precision, RuntimeFault, Vec2};

/// Numeric view of an operand
#[derive(Debug, Clone, Copy, PartialEq)]
enum Num {
    Int(i32),
    Single(f32),
    Double(f64),
}

impl Num {
    fn of(value: &Operand) -> Option<Num> {
        match value {
            Operand::Int(n) => Some(Num::Int(*n)),
            Operand::Float(f) => Some(Num::Single(*f)),
            Operand::Double(d) => Some(Num::Double(*d)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => f64::from(n),
            Num::Single(f) => f64::from(f),
            Num::Double(d) => d,
        }
    }

    fn as_f32(self) -> f32 {
        match self {
            Num::Int(n) => n as f32,
            Num::Single(f) => f,
            Num::Double(d) => d as f32,
        }
    }
}

fn mismatch(op: Opcode, a: &Operand, b: &Operand) -> RuntimeFault {
    RuntimeFault::TypeMismatch {
        operation: op.mnemonic().to_string(),
        found: format!("{} and {}", a.value_type(), b.value_type()),
    }
}

fn int_arith(op: Opcode, x: i32, y: i32) -> Result<i32, RuntimeFault> {
    Ok(match op {
        Opcode::Add => x.wrapping_add(y),
        Opcode::Sub => x.wrapping_sub(y),
        Opcode::Mul => x.wrapping_mul(y),
        Opcode::Div | Opcode::Mod if y == 0 => return Err(RuntimeFault::DivisionByZero),
        Opcode::Div => x.wrapping_div(y),
        Opcode::Mod => x.wrapping_rem(y),
        Opcode::BitAnd => x & y,
        Opcode::BitOr => x | y,
        Opcode::BitXor => x ^ y,
        Opcode::Shl => x.wrapping_shl(y as u32),
        Opcode::Shr => x.wrapping_shr(y as u32),
        _ => {
            return Err(RuntimeFault::InvalidBytecode(format!(
                "{} is not an int operator",
                op.mnemonic()
            )))
        }
    })
}

macro_rules! float_arith {
    ($op:expr, $x:expr, $y:expr) => {
        match $op {
            Opcode::Add => Some($x + $y),
            Opcode::Sub => Some($x - $y),
            Opcode::Mul => Some($x * $y),
            Opcode::Div => Some($x / $y),
            Opcode::Mod => Some($x % $y),
            _ => None,
        }
    };
}

fn numeric(op: Opcode, a: Num, b: Num) -> Option<Result<Operand, RuntimeFault>> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Some(int_arith(op, x, y).map(Operand::Int)),
        (Num::Double(_), _) | (_, Num::Double(_)) => {
            float_arith!(op, a.as_f64(), b.as_f64()).map(|r| Ok(Operand::Double(r)))
        }
        _ => float_arith!(op, a.as_f32(), b.as_f32()).map(|r| Ok(Operand::Float(r))),
    }
}

fn vector(op: Opcode, a: &Operand, b: &Operand, precision: Precision) -> Option<Operand> {
    match (op, a, b) {
        (Opcode::Add, Operand::Vec2(v), Operand::Vec2(w)) => {
            Some(Operand::Vec2(Vec2::new(v.x + w.x, v.y + w.y)))
        }
        (Opcode::Sub, Operand::Vec2(v), Operand::Vec2(w)) => {
            Some(Operand::Vec2(Vec2::new(v.x - w.x, v.y - w.y)))
        }
        (Opcode::Mul, Operand::Vec2(v), Operand::Vec2(w)) => {
            Some(Operand::float(v.dot(w), precision))
        }
        (Opcode::Mul, Operand::Vec2(v), s) | (Opcode::Mul, s, Operand::Vec2(v)) => {
            let s = Num::of(s)?.as_f64();
            Some(Operand::Vec2(Vec2::new(v.x * s, v.y * s)))
        }
        (Opcode::Div, Operand::Vec2(v), s) => {
            let s = Num::of(s)?.as_f64();
            Some(Operand::Vec2(Vec2::new(v.x / s, v.y / s)))
        }
        _ => None,
    }
}

/// Apply an arithmetic or bitwise opcode
pub fn arithmetic(op: Opcode, a: Operand, b: Operand, precision: Precision) -> Result<Operand, RuntimeFault> {
    if op == Opcode::Add && (matches!(a, Operand::Str(_)) || matches!(b, Operand::Str(_))) {
        return Ok(Operand::Str(format!("{}{}", a, b)));
    }
    if a.is_vector() || b.is_vector() {
        return vector(op, &a, &b, precision).ok_or_else(|| mismatch(op, &a, &b));
    }
    if matches!(
        op,
        Opcode::BitAnd | Opcode::BitOr | Opcode::BitXor | Opcode::Shl | Opcode::Shr
    ) {
        return match (&a, &b) {
            (Operand::Int(x), Operand::Int(y)) => int_arith(op, *x, *y).map(Operand::Int),
            _ => Err(mismatch(op, &a, &b)),
        };
    }
    match (Num::of(&a), Num::of(&b)) {
        (Some(x), Some(y)) => numeric(op, x, y).unwrap_or_else(|| Err(mismatch(op, &a, &b))),
        _ => Err(mismatch(op, &a, &b)),
    }
}

/// Apply a relational or equality opcode
pub fn compare(op: Opcode, a: &Operand, b: &Operand) -> Result<bool, RuntimeFault> {
    if let (Some(x), Some(y)) = (Num::of(a), Num::of(b)) {
        let ordering = match (x, y) {
            (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
            _ => x.as_f64().partial_cmp(&y.as_f64()),
        };
        return Ok(match op {
            Opcode::Eq => ordering == Some(std::cmp::Ordering::Equal),
            Opcode::Ne => ordering != Some(std::cmp::Ordering::Equal),
            Opcode::Lt => ordering == Some(std::cmp::Ordering::Less),
            Opcode::Le => matches!(
                ordering,
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),
            Opcode::Gt => ordering == Some(std::cmp::Ordering::Greater),
            Opcode::Ge => matches!(
                ordering,
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            _ => return Err(mismatch(op, a, b)),
        });
    }
    let equal = match (a, b) {
        (Operand::Str(x), Operand::Str(y)) => x == y,
        (Operand::Bool(x), Operand::Bool(y)) => x == y,
        (Operand::Vec2(x), Operand::Vec2(y)) => x == y,
        _ => return Err(mismatch(op, a, b)),
    };
    match op {
        Opcode::Eq => Ok(equal),
        Opcode::Ne => Ok(!equal),
        _ => Err(mismatch(op, a, b)),
    }
}

/// Arithmetic negation
pub fn negate(value: Operand) -> Result<Operand, RuntimeFault> {
    match value {
        Operand::Int(n) => Ok(Operand::Int(n.wrapping_neg())),
        Operand::Float(f) => Ok(Operand::Float(-f)),
        Operand::Double(d) => Ok(Operand::Double(-d)),
        Operand::Vec2(v) => Ok(Operand::Vec2(Vec2::new(-v.x, -v.y))),
        other => Err(RuntimeFault::TypeMismatch {
            operation: Opcode::Neg.mnemonic().to_string(),
            found: other.value_type().to_string(),
        }),
    }
}

/// Boolean value of a condition operand
pub fn truth(op: Opcode, value: Operand) -> Result<bool, RuntimeFault> {
    match value {
        Operand::Bool(b) => Ok(b),
        other => Err(RuntimeFault::TypeMismatch {
            operation: op.mnemonic().to_string(),
            found: other.value_type().to_string(),
        }),
    }
}
