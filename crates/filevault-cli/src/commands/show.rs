//! Show command

use clap::Args;
use filevault_core::metadata::MetaSnapshot;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Record id
    pub id: String,
}

/// Print the record's snapshot. Loading it also rewrites `meta/{id}.json`.
pub fn execute(args: ShowArgs, global: &crate::GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let service = super::open_service(global)?;

    let record = service
        .get_file(&args.id)?
        .ok_or_else(|| format!("Record not found: {}", args.id))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&MetaSnapshot::from(&record))?
    );
    Ok(())
}
