//! Virtual Machine for bytecode execution
//!
//! Main entry point for invoking compiled SnapScript functions.

use bytecode_system::{CompiledProgram, FunctionId};
use core_types::{Operand, Precision, RuntimeFault, ScriptInvocationError};
use log::{debug, warn};
use std::fmt;

use crate::context::ExecutionContext;
use crate::dispatch::Dispatcher;

/// Default call depth limit
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Default operand stack limit
pub const DEFAULT_MAX_STACK: usize = 4096;

/// VM limits and numeric precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of nested script calls
    pub max_call_depth: usize,
    /// Maximum number of values on the operand stack
    pub max_stack: usize,
    /// Storage width of script floats
    pub precision: Precision,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_stack: DEFAULT_MAX_STACK,
            precision: Precision::Single,
        }
    }
}

/// Lifecycle of the most recent invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VmState {
    /// Nothing has run yet
    #[default]
    Ready,
    /// An invocation is executing
    Running,
    /// The last invocation returned normally
    Returned,
    /// The last invocation faulted
    Failed,
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VmState::Ready => "ready",
            VmState::Running => "running",
            VmState::Returned => "returned",
            VmState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Virtual Machine for executing SnapScript bytecode
///
/// The VM owns the operand and call stacks plus the values of the
/// program's global constants. The program, natives and variable store are
/// passed in per invocation through an [`ExecutionContext`].
#[derive(Debug)]
pub struct Vm {
    config: VmConfig,
    state: VmState,
    globals: Vec<Operand>,
    dispatcher: Dispatcher,
}

impl Vm {
    /// Create a new VM instance
    pub fn new(config: VmConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.max_stack, config.max_call_depth, config.precision),
            config,
            state: VmState::Ready,
            globals: Vec::new(),
        }
    }

    /// Limits and precision
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Runtime float precision
    pub fn precision(&self) -> Precision {
        self.config.precision
    }

    /// State of the most recent invocation
    pub fn state(&self) -> VmState {
        self.state
    }

    /// Current values of the global constants, indexed like the program's
    /// global table
    pub fn globals(&self) -> &[Operand] {
        &self.globals
    }

    /// Reset globals to their defaults and run the constant initializer
    pub fn initialize(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<(), ScriptInvocationError> {
        let precision = self.config.precision;
        self.globals = ctx
            .program
            .globals
            .iter()
            .map(|g| Operand::default_for(g.ty, precision))
            .collect();
        if let Some(initializer) = ctx.program.initializer {
            debug!("running constant initializer for {} global(s)", self.globals.len());
            self.invoke(ctx, initializer, &[])?;
        }
        self.state = VmState::Ready;
        Ok(())
    }

    /// Check host arguments against the callee's parameters
    fn check_args(
        &self,
        program: &CompiledProgram,
        function: FunctionId,
        args: &[Operand],
    ) -> Result<Vec<Operand>, ScriptInvocationError> {
        let info = program.function(function).ok_or_else(|| {
            ScriptInvocationError::new(
                format!("fn{}", function.0),
                0,
                RuntimeFault::InvalidBytecode(format!("unknown function fn{}", function.0)),
            )
        })?;
        let fail = |cause: RuntimeFault| ScriptInvocationError::new(info.name.clone(), info.entry, cause);
        if args.len() != info.arity() {
            return Err(fail(RuntimeFault::ArgumentCount {
                expected: info.arity(),
                found: args.len(),
            }));
        }
        args.iter()
            .zip(&info.params)
            .enumerate()
            .map(|(index, (arg, ty))| {
                arg.clone()
                    .coerce_to(*ty, self.config.precision)
                    .ok_or_else(|| {
                        fail(RuntimeFault::ArgumentType {
                            index,
                            expected: *ty,
                            found: arg.value_type(),
                        })
                    })
            })
            .collect()
    }

    /// Run `function` to completion.
    ///
    /// Ints passed for float parameters are widened. On a fault the VM's
    /// stacks are reset, so the VM stays usable for the next invocation.
    pub fn invoke(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        function: FunctionId,
        args: &[Operand],
    ) -> Result<Operand, ScriptInvocationError> {
        let args = match self.check_args(ctx.program, function, args) {
            Ok(args) => args,
            Err(err) => {
                self.state = VmState::Failed;
                warn!("{}", err);
                return Err(err);
            }
        };

        self.state = VmState::Running;
        let result = self
            .dispatcher
            .execute(ctx, &mut self.globals, function, args);
        match result {
            Ok(value) => {
                self.state = VmState::Returned;
                let value = match ctx.program.function(function) {
                    Some(info) => value
                        .clone()
                        .coerce_to(info.return_type, self.config.precision)
                        .unwrap_or(value),
                    None => value,
                };
                Ok(value)
            }
            Err(err) => {
                self.state = VmState::Failed;
                warn!("{}", err);
                Err(err)
            }
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}
