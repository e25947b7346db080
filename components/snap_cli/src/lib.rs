//! SnapScript command-line host
//!
//! Provides the argument definitions, logging setup and the [`Runner`] that
//! drives a script program through an init call and a series of ticks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod runtime;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use runtime::{RunPlan, Runner};
