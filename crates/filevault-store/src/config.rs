//! Storage configuration
//!
//! Sources, lowest precedence first:
//! 1. `filevault.toml` in the working directory, or an explicit file
//! 2. environment, e.g. `FILEVAULT__ROOT_PATH`, `FILEVAULT__DATABASE_PATH`
//! 3. command line overrides

#![allow(clippy::result_large_err)]

use crate::errors::{configuration_error, Result};
use config::{Config, Environment, File};
use filevault_core::errors::{ExError, VaultError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_NAME: &str = "filevault";
const DEFAULT_DATABASE_FILE: &str = "filevault.db";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Absolute root holding `data/`, `meta/` and `tmp/`
    pub root_path: PathBuf,
    /// SQLite database file; defaults to `<root_path>/filevault.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            database_path: None,
        }
    }

    /// Load from file and environment, then apply overrides
    ///
    /// An explicit `config_file` must exist; the default `filevault.toml`
    /// is optional.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Configuration` if a source cannot be read, `root_path`
    /// is missing, or the root is not absolute.
    pub fn load(
        config_file: Option<&Path>,
        root_override: Option<&Path>,
        database_override: Option<&Path>,
    ) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix("FILEVAULT").separator("__"))
            .set_override_option("root_path", root_override.map(path_value))
            .and_then(|b| {
                b.set_override_option("database_path", database_override.map(path_value))
            })
            .and_then(|b| b.build())
            .map_err(|e| configuration_error(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| configuration_error(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject a relative root
    pub fn validate(&self) -> Result<()> {
        if !self.root_path.is_absolute() {
            return Err(ExError::from(VaultError::RelativeRootPath {
                path: self.root_path.display().to_string(),
            })
            .with_op("configuration"));
        }
        Ok(())
    }

    /// Effective database location
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.root_path.join(DEFAULT_DATABASE_FILE))
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
