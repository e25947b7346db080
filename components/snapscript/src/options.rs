//! Program configuration

use builtins::DEFAULT_MAX_ARRAY_LEN;
use bytecode_system::DEFAULT_CAPACITY;
use core_types::Precision;
use interpreter::{VmConfig, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STACK};
use parser::{CompileOptions, DEFAULT_MAX_NESTING};

/// Limits and linkage settings of a [`ScriptProgram`](crate::ScriptProgram)
///
/// # Examples
///
/// ```
/// use snapscript::ProgramOptions;
///
/// let options = ProgramOptions::default()
///     .with_max_call_depth(64)
///     .with_link_stdlib(false);
/// assert_eq!(options.max_call_depth, 64);
/// assert!(!options.link_stdlib);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramOptions {
    /// Link the standard native library before host natives
    pub link_stdlib: bool,
    /// Maximum nested script calls per invocation
    pub max_call_depth: usize,
    /// Maximum operand stack height
    pub max_stack: usize,
    /// Instruction buffer capacity
    pub bytecode_capacity: usize,
    /// Maximum nesting of statements and expressions accepted by the compiler
    pub max_nesting: usize,
    /// Largest array scripts may create in the variable store
    pub max_array_len: usize,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            link_stdlib: true,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_stack: DEFAULT_MAX_STACK,
            bytecode_capacity: DEFAULT_CAPACITY,
            max_nesting: DEFAULT_MAX_NESTING,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

impl ProgramOptions {
    /// Set whether the standard library is linked
    pub fn with_link_stdlib(mut self, link: bool) -> Self {
        self.link_stdlib = link;
        self
    }

    /// Set the call depth limit
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Set the operand stack limit
    pub fn with_max_stack(mut self, max_stack: usize) -> Self {
        self.max_stack = max_stack;
        self
    }

    /// Set the instruction buffer capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.bytecode_capacity = capacity;
        self
    }

    /// Set the compiler nesting limit
    pub fn with_max_nesting(mut self, depth: usize) -> Self {
        self.max_nesting = depth;
        self
    }

    /// Set the variable store array length limit
    pub fn with_max_array_len(mut self, len: usize) -> Self {
        self.max_array_len = len;
        self
    }

    pub(crate) fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            capacity: self.bytecode_capacity,
            max_nesting: self.max_nesting,
        }
    }

    pub(crate) fn vm_config(&self, precision: Precision) -> VmConfig {
        VmConfig {
            max_call_depth: self.max_call_depth,
            max_stack: self.max_stack,
            precision,
        }
    }
}
