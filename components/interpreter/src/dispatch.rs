//! Dispatch loop for bytecode execution
//!
//! Handles individual opcode execution over the shared program buffer.

use arrayvec::ArrayVec;
use bytecode_system::{FunctionId, Opcode};
use core_types::{NativeError, Operand, Precision, RuntimeFault, ScriptInvocationError, ValueType};
use std::ops::Deref;

use crate::call_frame::CallFrame;
use crate::context::ExecutionContext;
use crate::ops;

/// Native arguments up to this count are collected without allocating
pub const INLINE_NATIVE_ARGS: usize = 8;

/// Arguments popped for a native call
enum NativeArgs {
    Inline(ArrayVec<Operand, INLINE_NATIVE_ARGS>),
    Spilled(Vec<Operand>),
}

impl Deref for NativeArgs {
    type Target = [Operand];

    fn deref(&self) -> &[Operand] {
        match self {
            NativeArgs::Inline(args) => args,
            NativeArgs::Spilled(args) => args,
        }
    }
}

/// Operand stack, frame stack and locals of one VM
#[derive(Debug)]
pub struct Dispatcher {
    /// Stack for intermediate values
    stack: Vec<Operand>,
    /// Active script frames, innermost last
    frames: Vec<CallFrame>,
    /// Local slots of every active frame
    locals: Vec<Operand>,
    /// Next instruction to execute
    ip: usize,
    /// Offset of the instruction being executed
    offset: usize,
    max_stack: usize,
    max_call_depth: usize,
    precision: Precision,
}

impl Dispatcher {
    /// Create a new dispatcher with the given limits
    pub fn new(max_stack: usize, max_call_depth: usize, precision: Precision) -> Self {
        Self {
            stack: Vec::with_capacity(max_stack.min(256)),
            frames: Vec::with_capacity(max_call_depth.min(64)),
            locals: Vec::new(),
            ip: 0,
            offset: 0,
            max_stack,
            max_call_depth,
            precision,
        }
    }

    /// Current operand stack height
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Current call depth
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Drop all execution state
    pub fn reset(&mut self) {
        self.stack.clear();
        self.frames.clear();
        self.locals.clear();
        self.ip = 0;
        self.offset = 0;
    }

    /// Run `function` with already checked arguments until it returns.
    ///
    /// On a fault the stacks are cleared and the fault is annotated with the
    /// function and offset that raised it.
    pub fn execute(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        globals: &mut [Operand],
        function: FunctionId,
        args: Vec<Operand>,
    ) -> Result<Operand, ScriptInvocationError> {
        self.reset();
        let result = self
            .enter(ctx, function, args, 0)
            .and_then(|_| self.run(ctx, globals));
        result.map_err(|cause| {
            let faulting = self.frames.last().map(|f| f.function).unwrap_or(function);
            let name = ctx
                .program
                .function(faulting)
                .map(|info| info.name.clone())
                .unwrap_or_default();
            let position = ctx
                .program
                .chunk
                .get(self.offset)
                .and_then(|inst| inst.source_position);
            let err = ScriptInvocationError::new(name, self.offset, cause).with_position(position);
            self.reset();
            err
        })
    }

    fn push(&mut self, value: Operand) -> Result<(), RuntimeFault> {
        if self.stack.len() >= self.max_stack {
            return Err(RuntimeFault::StackOverflow {
                limit: self.max_stack,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Operand, RuntimeFault> {
        self.stack.pop().ok_or(RuntimeFault::StackUnderflow)
    }

    fn normalize(&self, value: Operand) -> Operand {
        match value {
            Operand::Float(f) => Operand::float(f64::from(f), self.precision),
            Operand::Double(d) => Operand::float(d, self.precision),
            other => other,
        }
    }

    fn coerce(&self, value: Operand, ty: ValueType, index: usize) -> Result<Operand, RuntimeFault> {
        let found = value.value_type();
        value
            .coerce_to(ty, self.precision)
            .ok_or(RuntimeFault::ArgumentType {
                index,
                expected: ty,
                found,
            })
    }

    fn local_index(&self, slot: u32) -> Result<usize, RuntimeFault> {
        let base = self.frames.last().map(|f| f.locals_base).unwrap_or(0);
        let idx = base + slot as usize;
        if idx < self.locals.len() {
            Ok(idx)
        } else {
            Err(RuntimeFault::InvalidBytecode(format!("local slot {} out of range", slot)))
        }
    }

    /// Push a frame for `function` and jump to its entry
    fn enter(
        &mut self,
        ctx: &ExecutionContext<'_>,
        function: FunctionId,
        args: Vec<Operand>,
        return_address: usize,
    ) -> Result<(), RuntimeFault> {
        if self.frames.len() >= self.max_call_depth {
            return Err(RuntimeFault::CallStackOverflow {
                depth: self.max_call_depth,
            });
        }
        let info = ctx.program.function(function).ok_or_else(|| {
            RuntimeFault::InvalidBytecode(format!("unknown function fn{}", function.0))
        })?;
        let locals_base = self.locals.len();
        let frame_size = info.local_count.max(args.len());
        self.locals.extend(args);
        self.locals.resize(locals_base + frame_size, Operand::Void);
        self.frames.push(CallFrame::new(
            function,
            return_address,
            locals_base,
            self.stack.len(),
        ));
        self.ip = info.entry;
        Ok(())
    }

    /// Pop the current frame; returns the value if control goes back to the host
    fn leave(&mut self, value: Option<Operand>) -> Result<Option<Operand>, RuntimeFault> {
        let frame = self.frames.pop().ok_or(RuntimeFault::StackUnderflow)?;
        self.locals.truncate(frame.locals_base);
        self.stack.truncate(frame.stack_base);
        if self.frames.is_empty() {
            return Ok(Some(value.unwrap_or(Operand::Void)));
        }
        if let Some(value) = value {
            self.push(value)?;
        }
        self.ip = frame.return_address;
        Ok(None)
    }

    fn call_script(&mut self, ctx: &ExecutionContext<'_>, id: FunctionId) -> Result<(), RuntimeFault> {
        let info = ctx.program.function(id).ok_or_else(|| {
            RuntimeFault::InvalidBytecode(format!("unknown function fn{}", id.0))
        })?;
        let start = self
            .stack
            .len()
            .checked_sub(info.arity())
            .ok_or(RuntimeFault::StackUnderflow)?;
        let raw = self.stack.split_off(start);
        let mut args = Vec::with_capacity(raw.len());
        for (index, (value, ty)) in raw.into_iter().zip(&info.params).enumerate() {
            args.push(self.coerce(value, *ty, index)?);
        }
        let return_address = self.ip;
        self.enter(ctx, id, args, return_address)
    }

    fn call_native(&mut self, ctx: &mut ExecutionContext<'_>, id: bytecode_system::NativeId) -> Result<(), RuntimeFault> {
        let registry = ctx.registry;
        let binding = registry.get(id).ok_or_else(|| {
            RuntimeFault::InvalidBytecode(format!("unknown native native{}", id.0))
        })?;
        let arity = binding.params.len();
        let start = self
            .stack
            .len()
            .checked_sub(arity)
            .ok_or(RuntimeFault::StackUnderflow)?;

        let args = if arity <= INLINE_NATIVE_ARGS {
            let mut inline = ArrayVec::new();
            for (index, (value, ty)) in self.stack.drain(start..).zip(&binding.params).enumerate() {
                let found = value.value_type();
                let value = value.coerce_to(*ty, self.precision).ok_or(RuntimeFault::ArgumentType {
                    index,
                    expected: *ty,
                    found,
                })?;
                inline.push(value);
            }
            NativeArgs::Inline(inline)
        } else {
            let raw = self.stack.split_off(start);
            let mut spilled = Vec::with_capacity(arity);
            for (index, (value, ty)) in raw.into_iter().zip(&binding.params).enumerate() {
                spilled.push(self.coerce(value, *ty, index)?);
            }
            NativeArgs::Spilled(spilled)
        };

        let result = binding
            .call(&mut ctx.native(), &args)
            .map_err(|source| match source {
                NativeError::VarStore(err) => RuntimeFault::VarStore(err),
                source => RuntimeFault::Native {
                    name: binding.name.clone(),
                    source,
                },
            })?;

        if binding.return_type != ValueType::Void {
            let found = result.value_type();
            let value = result
                .coerce_to(binding.return_type, self.precision)
                .ok_or_else(|| RuntimeFault::TypeMismatch {
                    operation: format!("return from {}", binding.signature()),
                    found: found.to_string(),
                })?;
            self.push(value)?;
        }
        Ok(())
    }

    fn run(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        globals: &mut [Operand],
    ) -> Result<Operand, RuntimeFault> {
        let program = ctx.program;
        loop {
            let inst = program.chunk.get(self.ip).ok_or_else(|| {
                RuntimeFault::InvalidBytecode(format!("instruction pointer {:04} out of range", self.ip))
            })?;
            self.offset = self.ip;
            self.ip += 1;

            match inst.opcode {
                Opcode::PushConst(idx) => {
                    let value = program.chunk.constant(idx).cloned().ok_or_else(|| {
                        RuntimeFault::InvalidBytecode(format!("constant #{} out of range", idx))
                    })?;
                    let value = self.normalize(value);
                    self.push(value)?;
                }
                Opcode::PushTrue => self.push(Operand::Bool(true))?,
                Opcode::PushFalse => self.push(Operand::Bool(false))?,
                Opcode::PushDefault(ty) => self.push(Operand::default_for(ty, self.precision))?,
                Opcode::LoadLocal(slot) => {
                    let idx = self.local_index(slot.0)?;
                    let value = self.locals[idx].clone();
                    self.push(value)?;
                }
                Opcode::StoreLocal(slot) => {
                    let value = self.pop()?;
                    let idx = self.local_index(slot.0)?;
                    self.locals[idx] = value;
                }
                Opcode::LoadGlobal(id) => {
                    let value = globals.get(id.0 as usize).cloned().ok_or_else(|| {
                        RuntimeFault::InvalidBytecode(format!("global #{} out of range", id.0))
                    })?;
                    self.push(value)?;
                }
                Opcode::StoreGlobal(id) => {
                    let value = self.pop()?;
                    let slot = globals.get_mut(id.0 as usize).ok_or_else(|| {
                        RuntimeFault::InvalidBytecode(format!("global #{} out of range", id.0))
                    })?;
                    *slot = value;
                }
                op @ (Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::BitAnd
                | Opcode::BitOr
                | Opcode::BitXor
                | Opcode::Shl
                | Opcode::Shr) => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    let result = ops::arithmetic(op, a, b, self.precision)?;
                    self.push(result)?;
                }
                op @ (Opcode::Eq
                | Opcode::Ne
                | Opcode::Lt
                | Opcode::Le
                | Opcode::Gt
                | Opcode::Ge) => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    let result = ops::compare(op, &a, &b)?;
                    self.push(Operand::Bool(result))?;
                }
                Opcode::Neg => {
                    let a = self.pop()?;
                    self.push(ops::negate(a)?)?;
                }
                Opcode::Not => {
                    let a = self.pop()?;
                    let b = ops::truth(Opcode::Not, a)?;
                    self.push(Operand::Bool(!b))?;
                }
                Opcode::Widen => {
                    let value = self.pop()?;
                    let widened = match value {
                        Operand::Int(n) => Operand::float(f64::from(n), self.precision),
                        Operand::Float(_) | Operand::Double(_) => self.normalize(value),
                        other => {
                            return Err(RuntimeFault::TypeMismatch {
                                operation: Opcode::Widen.mnemonic().to_string(),
                                found: other.value_type().to_string(),
                            })
                        }
                    };
                    self.push(widened)?;
                }
                Opcode::MakeVec2 => {
                    let y = self.pop()?;
                    let x = self.pop()?;
                    match (x.as_number(), y.as_number()) {
                        (Some(x), Some(y)) => {
                            self.push(Operand::Vec2(core_types::Vec2::new(x, y)))?
                        }
                        _ => {
                            return Err(RuntimeFault::TypeMismatch {
                                operation: Opcode::MakeVec2.mnemonic().to_string(),
                                found: format!("{} and {}", x.value_type(), y.value_type()),
                            })
                        }
                    }
                }
                Opcode::Jump(target) => {
                    self.ip = target;
                }
                op @ Opcode::JumpIfFalse(target) => {
                    let value = self.pop()?;
                    if !ops::truth(op, value)? {
                        self.ip = target;
                    }
                }
                op @ Opcode::JumpIfTrue(target) => {
                    let value = self.pop()?;
                    if ops::truth(op, value)? {
                        self.ip = target;
                    }
                }
                Opcode::Pop => {
                    self.pop()?;
                }
                Opcode::Call(id) => self.call_script(ctx, id)?,
                Opcode::CallNative(id) => self.call_native(ctx, id)?,
                Opcode::Return => {
                    let value = self.pop()?;
                    if let Some(result) = self.leave(Some(value))? {
                        return Ok(result);
                    }
                }
                Opcode::ReturnVoid => {
                    if let Some(result) = self.leave(None)? {
                        return Ok(result);
                    }
                }
            }
        }
    }
}
