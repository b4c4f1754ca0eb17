//! Configuration file discovery and loading

use std::path::{Path, PathBuf};

use tracing::debug;

use super::import_config::ImportConfig;
use crate::error::NomenError;
use crate::result::Result;

/// Config file names, in discovery priority order
pub const CONFIG_FILE_NAMES: [&str; 3] = [".nomenrc.toml", "nomen.toml", "nomen.json"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| NomenError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load config from an explicit path, or auto-discover from `start_dir`.
    ///
    /// An explicit path must exist. When discovery finds nothing, defaults
    /// are returned.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<ImportConfig> {
        if let Some(path) = custom_path {
            if !path.is_file() {
                return Err(NomenError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return ImportConfig::load(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => ImportConfig::load(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(ImportConfig::default())
            }
        }
    }
}
