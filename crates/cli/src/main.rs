mod commands;
mod loader;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{PlanCommand, QueryCommand};

/// queryspec CLI - spec-driven query planning and execution tool
#[derive(Debug, Parser)]
#[command(
    name = "queryspec",
    version,
    about = "Interpret list-query specs into plans and run them over CSV data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interpret a request and print the resulting query plan
    Plan(PlanCommand),
    /// Interpret a request and execute it against a directory of CSV files
    Query(QueryCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Plan(cmd) => cmd.execute(),
        Commands::Query(cmd) => cmd.execute(),
    }
}
