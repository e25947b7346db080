//! Embedding API for the SnapScript engine
//!
//! A host builds a [`ScriptProgram`] from one or more sources, registers its
//! natives, compiles, initializes the runtime and then invokes script
//! functions on its own schedule:
//!
//! ```
//! use snapscript::{ScriptProgram, ScriptSource, SharedOutput};
//!
//! let out = SharedOutput::new();
//! let mut program = ScriptProgram::new(vec![ScriptSource::new(
//!     "game",
//!     r#"
//!     void Init() { storeInt("tick", 0); }
//!     void Tick() { int t = getInt("tick"); println(t); }
//!     "#,
//! )]);
//! program.set_output(out.clone());
//!
//! assert!(program.compile());
//! program.init_runtime(false).unwrap();
//!
//! let init = program.find_function("Init").unwrap();
//! let tick = program.find_function("Tick").unwrap();
//! program.invoke(&init, &[]).unwrap();
//! for _ in 0..3 {
//!     program.invoke(&tick, &[]).unwrap();
//! }
//! assert_eq!(out.lines(), vec!["0", "0", "0"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod function;
pub mod options;
pub mod program;

pub use error::{LookupError, RuntimeInitError};
pub use function::Function;
pub use options::ProgramOptions;
pub use program::ScriptProgram;

// Types hosts need alongside the façade
pub use builtins::{NativeContext, SharedOutput, VarStore};
pub use core_types::{
    CompileError, LinkError, NativeError, NativeResult, Operand, RuntimeFault,
    ScriptInvocationError, ValueType, VarStoreError, Vec2,
};
pub use interpreter::VmState;
pub use parser::ScriptSource;
