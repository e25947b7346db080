//! Error taxonomy shared by every SnapScript layer.
//!
//! Compile-time faults ([`LexError`], [`LinkError`], [`CompileError`]) carry a
//! [`SourcePosition`]. Runtime faults are reported as a single
//! [`ScriptInvocationError`] wrapping a [`RuntimeFault`].

use crate::{SourcePosition, ValueType};
use thiserror::Error;

/// Result alias for the compile pipeline
pub type CompileResult<T> = Result<T, CompileError>;

/// Result alias for native function handles
pub type NativeResult<T> = Result<T, NativeError>;

/// Result alias for variable store access
pub type VarResult<T> = Result<T, VarStoreError>;

/// Tokenizer failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A character that starts no token
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedCharacter {
        /// Offending character
        ch: char,
        /// Where it was found
        position: SourcePosition,
    },

    /// String literal reaches end of input
    #[error("unterminated string literal starting at {position}")]
    UnterminatedString {
        /// Opening quote
        position: SourcePosition,
    },

    /// Block comment reaches end of input
    #[error("unterminated block comment starting at {position}")]
    UnterminatedComment {
        /// Opening `/*`
        position: SourcePosition,
    },

    /// Unknown escape sequence inside a string literal
    #[error("invalid escape sequence '\\{escape}' at {position}")]
    InvalidEscape {
        /// Character following the backslash
        escape: char,
        /// Position of the backslash
        position: SourcePosition,
    },

    /// Numeric literal that cannot be represented
    #[error("malformed numeric literal '{literal}' at {position}")]
    MalformedNumber {
        /// Literal text
        literal: String,
        /// Start of the literal
        position: SourcePosition,
    },
}

impl LexError {
    /// Position the error refers to
    pub fn position(&self) -> SourcePosition {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::UnterminatedComment { position }
            | LexError::InvalidEscape { position, .. }
            | LexError::MalformedNumber { position, .. } => *position,
        }
    }
}

/// Symbol resolution failure between script call sites and natives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    /// Call to a name that is neither a script function nor a native
    #[error("unresolved symbol '{name}' at {position}")]
    UnresolvedSymbol {
        /// Called name
        name: String,
        /// Call site
        position: SourcePosition,
    },

    /// Same native name and parameter types registered twice
    #[error("native '{signature}' is already registered")]
    DuplicateNative {
        /// Rendered signature, e.g. `print(int)`
        signature: String,
    },
}

/// Any failure while turning sources into a program.
///
/// The first error aborts the compile; the program façade retains it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Tokenizer failure
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),

    /// Grammar violation
    #[error("syntax error at {position}: {message}")]
    Syntax {
        /// What was expected
        message: String,
        /// Offending token
        position: SourcePosition,
    },

    /// Expression type differs from the required type
    #[error("type mismatch at {position}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Required type, or a description such as `int or float`
        expected: String,
        /// Actual static type
        found: ValueType,
        /// Offending expression
        position: SourcePosition,
    },

    /// Read or write of a name with no visible declaration
    #[error("undefined variable '{name}' at {position}")]
    UndefinedVariable {
        /// Variable name
        name: String,
        /// Reference site
        position: SourcePosition,
    },

    /// Name declared twice in one scope
    #[error("'{name}' is already declared in this scope ({position})")]
    Redeclaration {
        /// Variable name
        name: String,
        /// Second declaration
        position: SourcePosition,
    },

    /// Assignment targeting a global constant
    #[error("cannot assign to constant '{name}' at {position}")]
    AssignToConstant {
        /// Constant name
        name: String,
        /// Assignment site
        position: SourcePosition,
    },

    /// `break` or `continue` outside a loop
    #[error("'{keyword}' outside of a loop at {position}")]
    InvalidBreak {
        /// `break` or `continue`
        keyword: String,
        /// Statement position
        position: SourcePosition,
    },

    /// Several overloads accept the arguments after widening
    #[error("ambiguous call to '{name}({args})' at {position}")]
    AmbiguousOverload {
        /// Called name
        name: String,
        /// Rendered argument types
        args: String,
        /// Call site
        position: SourcePosition,
    },

    /// The name exists but no overload accepts the arguments
    #[error("no overload of '{name}' accepts ({args}) at {position}")]
    NoMatchingOverload {
        /// Called name
        name: String,
        /// Rendered argument types
        args: String,
        /// Call site
        position: SourcePosition,
    },

    /// Function signature declared twice (or clashing with a native)
    #[error("function '{signature}' is already defined ({position})")]
    DuplicateFunction {
        /// Rendered signature
        signature: String,
        /// Second definition
        position: SourcePosition,
    },

    /// Instruction buffer is full
    #[error("bytecode capacity of {capacity} instructions exceeded")]
    CapacityExceeded {
        /// Configured capacity
        capacity: usize,
    },

    /// Symbol resolution failure
    #[error("link error: {0}")]
    Link(#[from] LinkError),
}

impl CompileError {
    /// Source position of the error, when it has one
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            CompileError::Lex(err) => Some(err.position()),
            CompileError::Syntax { position, .. }
            | CompileError::TypeMismatch { position, .. }
            | CompileError::UndefinedVariable { position, .. }
            | CompileError::Redeclaration { position, .. }
            | CompileError::AssignToConstant { position, .. }
            | CompileError::InvalidBreak { position, .. }
            | CompileError::AmbiguousOverload { position, .. }
            | CompileError::NoMatchingOverload { position, .. }
            | CompileError::DuplicateFunction { position, .. } => Some(*position),
            CompileError::Link(LinkError::UnresolvedSymbol { position, .. }) => Some(*position),
            CompileError::Link(LinkError::DuplicateNative { .. })
            | CompileError::CapacityExceeded { .. } => None,
        }
    }

    /// Shorthand for [`CompileError::Syntax`]
    pub fn syntax(message: impl Into<String>, position: SourcePosition) -> Self {
        CompileError::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Shorthand for [`CompileError::TypeMismatch`]
    pub fn type_mismatch(
        expected: impl ToString,
        found: ValueType,
        position: SourcePosition,
    ) -> Self {
        CompileError::TypeMismatch {
            expected: expected.to_string(),
            found,
            position,
        }
    }
}

/// Variable store access failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VarStoreError {
    /// No variable or array with this name
    #[error("no variable named '{name}'")]
    Missing {
        /// Requested key
        name: String,
    },

    /// Stored value has a different type than requested
    #[error("variable '{name}' holds {found}, not {expected}")]
    TypeMismatch {
        /// Requested key
        name: String,
        /// Requested type
        expected: ValueType,
        /// Stored type
        found: ValueType,
    },

    /// Array index outside `0..length`
    #[error("index {index} out of bounds for array '{name}' of length {length}")]
    IndexOutOfBounds {
        /// Array name
        name: String,
        /// Requested index
        index: i32,
        /// Array length
        length: usize,
    },

    /// Negative or oversized array length
    #[error("invalid length {length} for array '{name}'")]
    InvalidLength {
        /// Array name
        name: String,
        /// Requested length
        length: i32,
    },
}

/// Failure reported by a native function handle.
#[derive(Debug, Error)]
pub enum NativeError {
    /// Variable store access failed
    #[error(transparent)]
    VarStore(#[from] VarStoreError),

    /// Argument value outside the native's domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing to the output sink failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other host-side failure
    #[error("{0}")]
    Failed(String),
}

/// Cause of an aborted invocation.
#[derive(Debug, Error)]
pub enum RuntimeFault {
    /// Pop from an empty operand stack
    #[error("operand stack underflow")]
    StackUnderflow,

    /// Operand stack limit reached
    #[error("operand stack overflow (limit {limit})")]
    StackOverflow {
        /// Configured operand limit
        limit: usize,
    },

    /// Call depth limit reached
    #[error("call stack overflow (depth {depth})")]
    CallStackOverflow {
        /// Configured depth limit
        depth: usize,
    },

    /// Opcode applied to operands of the wrong type
    #[error("cannot apply {operation} to {found}")]
    TypeMismatch {
        /// Opcode or operator name
        operation: String,
        /// Offending operand types
        found: String,
    },

    /// Integer division or modulo by zero
    #[error("integer division by zero")]
    DivisionByZero,

    /// Host passed the wrong number of arguments
    #[error("expected {expected} arguments, got {found}")]
    ArgumentCount {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// Host passed an argument of the wrong type
    #[error("argument {index} expected {expected}, got {found}")]
    ArgumentType {
        /// Zero-based argument index
        index: usize,
        /// Declared parameter type
        expected: ValueType,
        /// Supplied type
        found: ValueType,
    },

    /// Invoke before a successful `init_runtime`
    #[error("runtime not initialized")]
    NotInitialized,

    /// Function handle belongs to another program
    #[error("function handle belongs to a different program")]
    ForeignFunction,

    /// Malformed instruction stream
    #[error("invalid bytecode: {0}")]
    InvalidBytecode(String),

    /// Variable store access failed
    #[error(transparent)]
    VarStore(#[from] VarStoreError),

    /// Native handle reported failure
    #[error("native '{name}' failed: {source}")]
    Native {
        /// Native symbol
        name: String,
        /// Underlying failure
        #[source]
        source: NativeError,
    },
}

/// A runtime fault annotated with where it happened.
#[derive(Debug, Error)]
#[error("error in '{function}' at offset {offset}{}: {cause}", line_suffix(.position))]
pub struct ScriptInvocationError {
    /// Function executing when the fault occurred
    pub function: String,
    /// Instruction offset of the faulting instruction
    pub offset: usize,
    /// Script location the faulting instruction was compiled from
    pub position: Option<SourcePosition>,
    /// What went wrong
    #[source]
    pub cause: RuntimeFault,
}

fn line_suffix(position: &Option<SourcePosition>) -> String {
    position
        .map(|p| format!(" (line {}, column {})", p.line, p.column))
        .unwrap_or_default()
}

impl ScriptInvocationError {
    /// Create a new invocation error
    pub fn new(function: impl Into<String>, offset: usize, cause: RuntimeFault) -> Self {
        Self {
            function: function.into(),
            offset,
            position: None,
            cause,
        }
    }

    /// Attach the script location of the faulting instruction
    pub fn with_position(mut self, position: Option<SourcePosition>) -> Self {
        self.position = position;
        self
    }
}
