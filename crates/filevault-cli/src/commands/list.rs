//! List command

pub fn execute(global: &crate::GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let service = super::open_service(global)?;

    for record in service.list_files()? {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            record.id,
            record.creation_time.to_rfc3339(),
            record.content_size,
            record.mime_type,
            record.name
        );
    }
    Ok(())
}
