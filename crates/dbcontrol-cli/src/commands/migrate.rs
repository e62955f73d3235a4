//! Migrate command

use crate::config::{self, ConfigArgs};
use clap::Args;
use dbcontrol_engine::{run_migrations, MigrationOptions};
use dbcontrol_store::loader::load_all_changelogs;
use dbcontrol_store::SqliteHandle;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Report what would be applied without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Execute each statement and its ledger insert separately
    #[arg(long)]
    pub no_atomic: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: MigrateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::resolve(&args.config, args.no_atomic)?;
    let changelogs = load_all_changelogs(settings.require_changelog()?)?;
    let mut handle = SqliteHandle::open(&settings.database)?;

    let options = MigrationOptions {
        atomic_apply: settings.atomic_apply,
        dry_run: args.dry_run,
    };
    let report = run_migrations(&mut handle, &changelogs, &options)?;

    if !args.json {
        if args.dry_run {
            println!("Dry run (nothing executed):");
        } else {
            println!("Migration complete:");
        }
    }
    super::print_report(&report, args.json)?;
    Ok(())
}
