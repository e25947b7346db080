//! Host-facing errors of the program façade

use bytecode_system::format_types;
use core_types::{ScriptInvocationError, ValueType};
use thiserror::Error;

/// Function lookup failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// `compile` has not succeeded yet
    #[error("program is not compiled")]
    NotCompiled,

    /// No script function has this name
    #[error("no function named '{name}'")]
    NotFound {
        /// Requested name
        name: String,
    },

    /// Functions with this name exist, but none with these parameters
    #[error("no overload {name}({})", format_types(.params))]
    NoOverload {
        /// Requested name
        name: String,
        /// Requested parameter types
        params: Vec<ValueType>,
    },
}

/// Failure of `init_runtime`
#[derive(Debug, Error)]
pub enum RuntimeInitError {
    /// `compile` has not succeeded yet
    #[error("program is not compiled")]
    NotCompiled,

    /// A constant initializer faulted
    #[error("constant initialization failed: {0}")]
    Initializer(#[source] ScriptInvocationError),
}
