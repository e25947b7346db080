//! Execution context for VM

use builtins::{NativeContext, NativeRegistry, VarStore};
use bytecode_system::CompiledProgram;
use std::io::Write;

/// Everything an invocation reads or mutates besides the VM's own stacks
pub struct ExecutionContext<'a> {
    /// Program being executed
    pub program: &'a CompiledProgram,
    /// Natives the program was linked against
    pub registry: &'a NativeRegistry,
    /// The program's variable store
    pub vars: &'a mut VarStore,
    /// Destination of script output
    pub out: &'a mut dyn Write,
}

impl<'a> ExecutionContext<'a> {
    /// Create a new execution context
    pub fn new(
        program: &'a CompiledProgram,
        registry: &'a NativeRegistry,
        vars: &'a mut VarStore,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            program,
            registry,
            vars,
            out,
        }
    }

    /// Context handed to a native handle
    pub fn native(&mut self) -> NativeContext<'_> {
        NativeContext::new(&mut *self.vars, &mut *self.out)
    }
}
