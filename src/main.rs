//! impactrun - parametric composite impact studies for explicit-dynamics solvers.
//!
//! This is the main entry point for the impactrun CLI tool.

use clap::Parser;
use impactrun::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand provided - show help
            println!("impactrun - parametric impact studies for explicit-dynamics solvers.");
            println!();
            println!("Run 'impactrun --help' for available commands.");
            println!();
            println!("Quick start:");
            println!("  impactrun summary study.json     # Preview the parametric study");
            println!("  impactrun cases study.json       # Expand the study into case files");
            println!("  impactrun run study.json         # Submit a case and monitor it");
        }
        Some(cmd) => match cmd {
            Commands::Cases(c) => c.execute(),
            Commands::Summary(c) => c.execute(),
            Commands::Run(c) => c.execute(),
            Commands::Monitor(c) => c.execute(),
            Commands::Completions(c) => c.execute(),
        },
    }
}
