//! SnapScript runner
//!
//! Entry point for `snap-run`. Parses arguments and delegates to the
//! [`Runner`] for compilation and execution.

use clap::Parser;
use snap_cli::{init_logging, Cli, CliError, RunPlan, Runner};

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut runner = Runner::from_files(&cli.files)?;
    runner.prepare(cli.double)?;

    if cli.print_bytecode {
        if let Some(listing) = runner.disassembly() {
            println!("{}", listing);
        }
    }

    runner.run(&RunPlan::from_cli(cli))?;

    if cli.dump_vars {
        println!("{}", runner.dump_vars()?);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
