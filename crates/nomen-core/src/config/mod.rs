//! Configuration for nomenclature imports
//!
//! Settings come from a TOML or JSON file, discovered by walking up from the
//! working directory, and are overridden by command-line flags.
//!
//! ## Configuration Files
//!
//! Searched in this order:
//! - `.nomenrc.toml`
//! - `nomen.toml`
//! - `nomen.json`
//!
//! ## Example Configuration
//!
//! ```toml
//! document = "data/icd10cm_tabular_2026.xml"
//! database = "nomenclature.db"
//! version = "2026"
//! progressInterval = 1000
//! verbose = true
//! ```

mod import_config;
mod loader;

pub use import_config::ImportConfig;
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
