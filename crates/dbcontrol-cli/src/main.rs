//! dbcontrol CLI
//!
//! Applies changelogs to a SQLite database and inspects its ledger

use clap::{Parser, Subcommand};
use dbcontrol_core::logging_facility::{self, Profile};

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "dbcontrol")]
#[command(about = "dbcontrol - Changelog-driven schema migrations", long_about = None)]
struct Cli {
    /// Emit JSON structured logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending changelogs
    Migrate(commands::migrate::MigrateArgs),
    /// List applied changelogs from the ledger
    Status(commands::status::StatusArgs),
    /// Check changelogs against the ledger without applying anything
    Verify(commands::verify::VerifyArgs),
}

fn main() {
    let cli = Cli::parse();

    logging_facility::init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args),
        Commands::Status(args) => commands::status::execute(args),
        Commands::Verify(args) => commands::verify::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
