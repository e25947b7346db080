//! Call frame for function call stack management

use bytecode_system::FunctionId;

/// Call frame representing a script function invocation
///
/// Stored on the call stack to track where execution resumes and which
/// part of the locals array and operand stack belongs to the callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallFrame {
    /// Function being executed
    pub function: FunctionId,
    /// Instruction offset to resume at in the caller
    pub return_address: usize,
    /// Index of this frame's first local slot
    pub locals_base: usize,
    /// Caller's operand stack height
    pub stack_base: usize,
}

impl CallFrame {
    /// Create a new call frame
    pub fn new(
        function: FunctionId,
        return_address: usize,
        locals_base: usize,
        stack_base: usize,
    ) -> Self {
        Self {
            function,
            return_address,
            locals_base,
            stack_base,
        }
    }
}
