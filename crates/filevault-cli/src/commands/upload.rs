//! Upload command

use clap::Args;
use filevault_core::model::FileProperties;
use filevault_engine::upload;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// File to store
    pub file: PathBuf,

    /// Stored name (defaults to the file's own name)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "application/octet-stream")]
    pub mime_type: String,
}

pub fn execute(
    args: UploadArgs,
    global: &crate::GlobalArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = super::open_service(global)?;

    let file = File::open(&args.file)?;
    let size = i64::try_from(file.metadata()?.len())?;
    let name = match args.name {
        Some(name) => name,
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or("Cannot derive a name from the file path; pass --name")?,
    };

    let response = upload(
        &mut service,
        FileProperties::new(name, args.mime_type, size),
        file,
    );

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
