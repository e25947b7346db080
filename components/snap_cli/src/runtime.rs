//! Runtime orchestration for the CLI
//!
//! The [`Runner`] owns one [`ScriptProgram`] and drives it the way a game
//! loop does: compile, initialize, call the init function once, then call
//! the tick function on a fixed interval.

use crate::cli::Cli;
use crate::error::{CliError, CliResult};
use log::{debug, info};
use snapscript::{LookupError, ScriptProgram, ScriptSource};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// What to call and how often
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Called once; skipped if the program does not define it
    pub init: String,
    /// Called `ticks` times
    pub tick: String,
    /// Number of tick calls
    pub ticks: u32,
    /// Pause between consecutive ticks
    pub interval: Duration,
}

impl RunPlan {
    /// Build the plan described by command-line arguments
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            init: cli.init.clone(),
            tick: cli.tick.clone(),
            ticks: cli.ticks,
            interval: Duration::from_millis(cli.interval_ms),
        }
    }
}

/// Drives one script program
#[derive(Debug)]
pub struct Runner {
    program: ScriptProgram,
}

impl Runner {
    /// Create a runner over in-memory sources
    pub fn new(sources: Vec<ScriptSource>) -> Self {
        Self {
            program: ScriptProgram::new(sources),
        }
    }

    /// Read every file into a source named after its path
    ///
    /// # Errors
    /// Returns [`CliError::Read`] for the first unreadable file
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> CliResult<Self> {
        let sources = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                std::fs::read_to_string(path)
                    .map(|text| ScriptSource::new(path.display().to_string(), text))
                    .map_err(|source| CliError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
            })
            .collect::<CliResult<Vec<_>>>()?;
        debug!("read {} script file(s)", sources.len());
        Ok(Self::new(sources))
    }

    /// Send script output somewhere other than stdout
    pub fn with_output<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.program.set_output(writer);
        self
    }

    /// The underlying program
    pub fn program(&self) -> &ScriptProgram {
        &self.program
    }

    /// Compile and initialize the runtime
    pub fn prepare(&mut self, use_double: bool) -> CliResult<()> {
        if !self.program.compile() {
            return Err(match self.program.last_compile_error() {
                Some(err) => CliError::Compile(err.clone()),
                None => CliError::Lookup(LookupError::NotCompiled),
            });
        }
        self.program.init_runtime(use_double)?;
        Ok(())
    }

    /// Disassembly of the compiled program
    pub fn disassembly(&self) -> Option<String> {
        self.program.bytecode().map(|program| program.to_string())
    }

    /// Call the init function once, then the tick function `plan.ticks` times
    pub fn run(&mut self, plan: &RunPlan) -> CliResult<()> {
        match self.program.find_function(&plan.init) {
            Ok(init) => {
                info!("calling {}", init);
                self.program.invoke(&init, &[])?;
            }
            Err(LookupError::NotFound { .. }) => {
                info!("no function '{}', skipping init", plan.init);
            }
            Err(err) => return Err(err.into()),
        }

        if plan.ticks == 0 {
            return Ok(());
        }
        let tick = self.program.find_function(&plan.tick)?;
        info!("calling {} {} time(s)", tick, plan.ticks);
        for n in 0..plan.ticks {
            if n > 0 && !plan.interval.is_zero() {
                thread::sleep(plan.interval);
            }
            self.program.invoke(&tick, &[])?;
        }
        Ok(())
    }

    /// The variable store as pretty-printed JSON
    pub fn dump_vars(&self) -> CliResult<String> {
        let snapshot = self.program.var_store().snapshot();
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}
