//! Host bindings for SnapScript programs
//!
//! This crate provides everything a script can reach outside its own
//! bytecode:
//! - [`NativeRegistry`] - name + signature keyed table of host functions
//! - [`VarStore`] - named values and typed arrays shared with the host
//! - [`SharedOutput`] - capturable output sink for `print`/`println`
//! - the standard native library (output, variable store, math,
//!   conversion, timing), linked with [`link_stdlib`]
//!
//! # Example
//!
//! ```
//! use builtins::{NativeContext, NativeRegistry, VarStore};
//! use core_types::{Operand, ValueType};
//!
//! let registry = NativeRegistry::with_stdlib().unwrap();
//! let (_, store) = registry
//!     .find_exact("storeInt", &[ValueType::String, ValueType::Int])
//!     .unwrap();
//!
//! let mut vars = VarStore::new();
//! let mut out = Vec::<u8>::new();
//! let mut ctx = NativeContext::new(&mut vars, &mut out);
//! store.call(&mut ctx, &[Operand::from("tick"), Operand::Int(0)]).unwrap();
//!
//! assert_eq!(vars.get_int("tick").unwrap(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod args;
pub mod console;
pub mod convert;
pub mod math;
pub mod registry;
pub mod time;
pub mod var_store;
pub mod vars;

// Re-export main types for convenience
pub use console::SharedOutput;
pub use math::ScriptMath;
pub use registry::{NativeBinding, NativeContext, NativeHandle, NativeRegistry};
pub use var_store::{ScriptArray, VarStore, DEFAULT_MAX_ARRAY_LEN};

use core_types::LinkError;
use log::debug;
use std::time::Instant;

/// Link the complete standard native library into `registry`
pub fn link_stdlib(registry: &mut NativeRegistry) -> Result<(), LinkError> {
    link_stdlib_since(registry, Instant::now())
}

/// Link the standard library with `timeMillis` counting from `epoch`
pub fn link_stdlib_since(registry: &mut NativeRegistry, epoch: Instant) -> Result<(), LinkError> {
    let before = registry.len();
    console::link(registry)?;
    vars::link(registry)?;
    math::link(registry)?;
    convert::link(registry)?;
    time::link(registry, epoch)?;
    debug!("linked {} standard natives", registry.len() - before);
    Ok(())
}
