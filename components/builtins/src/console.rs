//! Script output: `print`/`println` natives and capturable output sinks.

use crate::args;
use crate::registry::{NativeContext, NativeRegistry};
use core_types::{LinkError, NativeResult, Operand, ValueType};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Types `print` and `println` are overloaded for
pub const PRINTABLE_TYPES: [ValueType; 5] = [
    ValueType::String,
    ValueType::Int,
    ValueType::Float,
    ValueType::Bool,
    ValueType::Vec2,
];

/// Output sink backed by a shared in-memory buffer.
///
/// Clones share the same buffer, so a host can hand one clone to a program
/// and read what the script printed through another.
///
/// # Examples
///
/// ```
/// use builtins::SharedOutput;
/// use std::io::Write;
///
/// let out = SharedOutput::new();
/// let mut sink = out.clone();
/// writeln!(sink, "0").unwrap();
/// assert_eq!(out.contents(), "0\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedOutput {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Written output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Discard everything written so far
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn print(ctx: &mut NativeContext<'_>, args: &[Operand]) -> NativeResult<Operand> {
    write!(ctx.out, "{}", args::value(args, 0)?)?;
    Ok(Operand::Void)
}

fn println(ctx: &mut NativeContext<'_>, args: &[Operand]) -> NativeResult<Operand> {
    writeln!(ctx.out, "{}", args::value(args, 0)?)?;
    Ok(Operand::Void)
}

/// Link `print` and `println` for every printable type
pub fn link(registry: &mut NativeRegistry) -> Result<(), LinkError> {
    for ty in PRINTABLE_TYPES {
        registry.register("print", &[ty], ValueType::Void, print)?;
        registry.register("println", &[ty], ValueType::Void, println)?;
    }
    Ok(())
}
