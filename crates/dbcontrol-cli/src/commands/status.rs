//! Status command

use crate::config::{self, ConfigArgs};
use clap::Args;
use dbcontrol_store::{ledger, SqliteHandle};

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn execute(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::resolve(&args.config, false)?;
    let mut handle = SqliteHandle::open_existing(&settings.database)?;

    ledger::ensure_schema(&mut handle)?;
    let entries = ledger::entries(&mut handle)?;

    if entries.is_empty() {
        println!("No changelogs applied");
        return Ok(());
    }

    println!("Applied changelogs:");
    for entry in &entries {
        println!(
            "  {}  {}  {}  {}",
            entry.execution_time.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.md5_sum,
            entry.id,
            entry.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
