//! # SCLSchema CLI
//!
//! Command-line interface for IEC 61850 NSD schema validation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber;

mod commands;
mod loader;

use commands::{completion::CompletionCommand, validate::ValidateCommand};

#[derive(Parser)]
#[command(name = "sclschema")]
#[command(about = "A CLI tool for validating SCL documents against an NSD schema")]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an instance document against a namespace schema
    Validate(ValidateCommand),
    /// Generate shell completion scripts
    Completion(CompletionCommand),
}

fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting SCLSchema CLI");

    match cli.command {
        Commands::Validate(cmd) => cmd.execute(),
        Commands::Completion(cmd) => cmd.execute(),
    }
}
