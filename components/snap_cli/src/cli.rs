//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Run SnapScript files the way a game loop would: one init call, then
/// a number of tick calls
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "snap-run", version, about)]
pub struct Cli {
    /// Script files, compiled together as one program
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Function called once after the runtime is initialized
    #[arg(long, default_value = "Init")]
    pub init: String,

    /// Function called on every tick
    #[arg(long, default_value = "Tick")]
    pub tick: String,

    /// Number of tick calls
    #[arg(short = 'n', long, default_value_t = 1)]
    pub ticks: u32,

    /// Pause between ticks, in milliseconds
    #[arg(short = 'i', long = "interval-ms", default_value_t = 0)]
    pub interval_ms: u64,

    /// Store script floats as f64
    #[arg(long)]
    pub double: bool,

    /// Print the disassembled program before running
    #[arg(long)]
    pub print_bytecode: bool,

    /// Print the variable store as JSON after the last tick
    #[arg(long)]
    pub dump_vars: bool,

    /// Log filter (error, warn, info, debug, trace); RUST_LOG wins if set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Arguments for running `file` with every other flag at its default
    pub fn with_file(file: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![file.into()],
            init: "Init".to_string(),
            tick: "Tick".to_string(),
            ticks: 1,
            interval_ms: 0,
            double: false,
            print_bytecode: false,
            dump_vars: false,
            log_level: "warn".to_string(),
        }
    }
}
