//! Verify command

use crate::config::{self, ConfigArgs};
use clap::Args;
use dbcontrol_engine::verify_changelogs;
use dbcontrol_store::loader::load_all_changelogs;
use dbcontrol_store::SqliteHandle;

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: VerifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::resolve(&args.config, false)?;
    let changelogs = load_all_changelogs(settings.require_changelog()?)?;
    let mut handle = SqliteHandle::open_existing(&settings.database)?;

    let report = verify_changelogs(&mut handle, &changelogs)?;

    if !args.json {
        println!("Ledger verified:");
    }
    super::print_report(&report, args.json)?;
    Ok(())
}
