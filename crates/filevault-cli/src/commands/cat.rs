//! Cat command

use clap::Args;
use std::io::Write;

#[derive(Debug, Args)]
pub struct CatArgs {
    /// Record id
    pub id: String,
}

pub fn execute(args: CatArgs, global: &crate::GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let service = super::open_service(global)?;
    let bytes = service.read_content(&args.id)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.flush()?;
    Ok(())
}
