use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::{DEFAULT_PROGRESS_INTERVAL, DEFAULT_VERSION, ImportOptions};
use crate::error::NomenError;
use crate::result::Result;

/// Import settings as stored in a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Source nomenclature document
    pub document: Option<PathBuf>,
    /// SQLite database receiving the rows
    pub database: Option<PathBuf>,
    /// Version tag written to chapters and codes
    pub version: String,
    pub progress_interval: usize,
    pub verbose: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            document: None,
            database: None,
            version: DEFAULT_VERSION.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            verbose: true,
        }
    }
}

impl ImportConfig {
    /// Load from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| NomenError::io_error(path, e))?;
        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                NomenError::config_error(format!("Invalid TOML in '{}': {e}", path.display()))
            })?,
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                NomenError::config_error(format!("Invalid JSON in '{}': {e}", path.display()))
            })?,
            _ => {
                return Err(NomenError::config_error(format!(
                    "Unsupported config format: {}",
                    path.display()
                )));
            }
        };

        config.resolve_relative_to(path.parent())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(NomenError::config_error("version must not be empty"));
        }
        Ok(())
    }

    /// Options for the importer
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            version: self.version.clone(),
            progress_interval: self.progress_interval,
            verbose: self.verbose,
        }
    }

    /// Paths in a config file are relative to the file itself
    fn resolve_relative_to(mut self, base: Option<&Path>) -> Result<Self> {
        if let Some(base) = base {
            self.document = self.document.map(|p| join_relative(base, p));
            self.database = self.database.map(|p| join_relative(base, p));
        }
        self.validate()?;
        Ok(self)
    }
}

fn join_relative(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
