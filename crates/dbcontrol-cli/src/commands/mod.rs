pub mod migrate;
pub mod status;
pub mod verify;

use dbcontrol_engine::MigrationReport;

/// Print one line per changelog: id, outcome, fingerprint
pub(crate) fn print_report(report: &MigrationReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for result in &report.results {
        println!(
            "  {:<8} {}  {}",
            result.outcome.as_str(),
            result.md5_sum,
            result.changelog_id
        );
    }
    println!(
        "{} applied, {} already applied, {} pending",
        report.applied_count(),
        report.matched_count(),
        report.pending_count()
    );
    Ok(())
}
