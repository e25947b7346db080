//! Error types for the CLI

use snapscript::{CompileError, LookupError, RuntimeInitError, ScriptInvocationError};
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// A script file could not be read
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        /// Offending file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Compilation failed
    #[error("compile error: {0}")]
    Compile(CompileError),

    /// Runtime initialization failed
    #[error(transparent)]
    Init(#[from] RuntimeInitError),

    /// A requested function does not exist
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A script call faulted
    #[error("runtime error: {0}")]
    Script(#[from] ScriptInvocationError),

    /// Variable store could not be rendered
    #[error("could not render variables: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
