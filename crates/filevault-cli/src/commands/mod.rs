pub mod cat;
pub mod list;
pub mod show;
pub mod upload;

use crate::GlobalArgs;
use filevault_engine::FileService;
use filevault_store::StoreConfig;

/// Resolve configuration and open the vault
pub fn open_service(global: &GlobalArgs) -> Result<FileService, Box<dyn std::error::Error>> {
    let config = StoreConfig::load(
        global.config.as_deref(),
        global.root.as_deref(),
        global.db.as_deref(),
    )?;
    Ok(FileService::open(&config)?)
}
