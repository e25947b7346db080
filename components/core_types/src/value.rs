//! SnapScript value representation.
//!
//! [`Operand`] is the tagged value manipulated by the interpreter, stored in
//! the constant pool and in the variable store. [`ValueType`] is the static
//! type the compiler reasons about.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static type of a script value.
///
/// Script `float` covers both runtime widths; whether a float is stored as
/// `f32` or `f64` is a runtime decision (see [`Precision`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// 32-bit signed integer (`int`)
    Int,
    /// Floating point number (`float`, alias `double`)
    Float,
    /// Boolean (`bool`, alias `boolean`)
    Bool,
    /// UTF-8 string (`string`)
    String,
    /// Two-component vector of doubles (`vec2`)
    Vec2,
    /// No value (`void`); only valid as a return type
    Void,
}

impl ValueType {
    /// Resolve a type keyword as written in script source.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" => Some(ValueType::Int),
            "float" | "double" => Some(ValueType::Float),
            "bool" | "boolean" => Some(ValueType::Bool),
            "string" => Some(ValueType::String),
            "vec2" => Some(ValueType::Vec2),
            "void" => Some(ValueType::Void),
            _ => None,
        }
    }

    /// Returns true for `int` and `float`.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    /// Whether a value of type `found` can be used where `self` is expected
    /// without an explicit conversion (identity or `int -> float`).
    pub fn accepts(self, found: ValueType) -> bool {
        self == found || self.widens_from(found)
    }

    /// Whether `found` widens implicitly into `self`.
    pub fn widens_from(self, found: ValueType) -> bool {
        matches!((self, found), (ValueType::Float, ValueType::Int))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Vec2 => "vec2",
            ValueType::Void => "void",
        };
        f.write_str(name)
    }
}

/// Storage width used for script `float` values at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    /// Floats are stored as `f32` ([`Operand::Float`])
    #[default]
    Single,
    /// Floats are stored as `f64` ([`Operand::Double`])
    Double,
}

impl Precision {
    /// Map the host-facing `use_double` flag to a precision.
    pub fn from_use_double(use_double: bool) -> Self {
        if use_double {
            Precision::Double
        } else {
            Precision::Single
        }
    }

    /// Returns true for [`Precision::Double`].
    pub fn is_double(self) -> bool {
        matches!(self, Precision::Double)
    }
}

/// Two-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Angle from the positive x axis, in radians
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Dot product
    pub fn dot(&self, other: &Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?}]", self.x, self.y)
    }
}

/// A typed runtime value.
///
/// Operands live on the interpreter's operand stack, in local slots, in the
/// constant pool and in the variable store.
///
/// # Examples
///
/// ```
/// use core_types::{Operand, Precision, ValueType, Vec2};
///
/// let v = Operand::Vec2(Vec2::new(1.0, 2.0));
/// assert!(v.is_vector());
/// assert_eq!(v.to_string(), "[1.0, 2.0]");
///
/// // Integers widen into floats, nothing narrows implicitly
/// let widened = Operand::Int(2).coerce_to(ValueType::Float, Precision::Double);
/// assert_eq!(widened, Some(Operand::Double(2.0)));
/// assert_eq!(Operand::Double(2.5).coerce_to(ValueType::Int, Precision::Double), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// 32-bit signed integer
    Int(i32),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Boolean
    Bool(bool),
    /// String
    Str(String),
    /// Two-component vector
    Vec2(Vec2),
    /// Absence of a value (result of a void function)
    Void,
}

impl Operand {
    /// Build a float operand in the given precision.
    pub fn float(value: f64, precision: Precision) -> Self {
        match precision {
            Precision::Single => Operand::Float(value as f32),
            Precision::Double => Operand::Double(value),
        }
    }

    /// The default value of a static type (`0`, `0.0`, `false`, `""`,
    /// `[0.0, 0.0]`, or `Void`).
    pub fn default_for(ty: ValueType, precision: Precision) -> Self {
        match ty {
            ValueType::Int => Operand::Int(0),
            ValueType::Float => Operand::float(0.0, precision),
            ValueType::Bool => Operand::Bool(false),
            ValueType::String => Operand::Str(String::new()),
            ValueType::Vec2 => Operand::Vec2(Vec2::default()),
            ValueType::Void => Operand::Void,
        }
    }

    /// Static type of this value. Both float widths report [`ValueType::Float`].
    pub fn value_type(&self) -> ValueType {
        match self {
            Operand::Int(_) => ValueType::Int,
            Operand::Float(_) | Operand::Double(_) => ValueType::Float,
            Operand::Bool(_) => ValueType::Bool,
            Operand::Str(_) => ValueType::String,
            Operand::Vec2(_) => ValueType::Vec2,
            Operand::Void => ValueType::Void,
        }
    }

    /// Returns true if this operand is a vector.
    pub fn is_vector(&self) -> bool {
        matches!(self, Operand::Vec2(_))
    }

    /// Returns true for integers and floats of either width.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Operand::Int(_) | Operand::Float(_) | Operand::Double(_))
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Operand::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float payload of either width, widened to `f64`. Integers are not
    /// accepted; use [`Operand::as_number`] for that.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Operand::Float(n) => Some(f64::from(*n)),
            Operand::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Any numeric payload as `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Int(n) => Some(f64::from(*n)),
            _ => self.as_float(),
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Operand::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Vector payload
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Operand::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to a value of static type `ty`, applying implicit widening and
    /// normalizing float width to `precision`. Returns `None` when the value
    /// is not assignable to `ty`.
    pub fn coerce_to(self, ty: ValueType, precision: Precision) -> Option<Operand> {
        match (ty, self) {
            (ValueType::Float, Operand::Int(n)) => Some(Operand::float(f64::from(n), precision)),
            (ValueType::Float, Operand::Float(n)) => Some(Operand::float(f64::from(n), precision)),
            (ValueType::Float, Operand::Double(n)) => Some(Operand::float(n, precision)),
            (ty, value) if value.value_type() == ty => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Float(n) => write!(f, "{:?}", n),
            Operand::Double(n) => write!(f, "{:?}", n),
            Operand::Bool(b) => write!(f, "{}", b),
            Operand::Str(s) => f.write_str(s),
            Operand::Vec2(v) => write!(f, "{}", v),
            Operand::Void => f.write_str("void"),
        }
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Int(value)
    }
}

impl From<f32> for Operand {
    fn from(value: f32) -> Self {
        Operand::Float(value)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Double(value)
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Bool(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Str(value.to_string())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Str(value)
    }
}

impl From<Vec2> for Operand {
    fn from(value: Vec2) -> Self {
        Operand::Vec2(value)
    }
}
