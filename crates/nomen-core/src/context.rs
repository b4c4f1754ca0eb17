//! Per-run import state
//!
//! Everything the importers share during one run lives in [`ImportContext`],
//! which is passed explicitly down the chapter → section → code walk.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::stats::ImportStats;

/// Default nomenclature version tag stamped on chapters and codes
pub const DEFAULT_VERSION: &str = "2026";
/// Default number of codes between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Options that shape a single import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Version tag written to every chapter and code row
    pub version: String,
    /// Report progress every this many codes; 0 disables progress
    pub progress_interval: usize,
    /// Log every section as it is imported
    pub verbose: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            verbose: true,
        }
    }
}

/// Callback invoked with the running counters every progress interval
pub type ProgressCallback = Box<dyn FnMut(&ImportStats)>;

pub struct ImportContext {
    pub options: ImportOptions,
    pub stats: ImportStats,
    chapter_ids: HashMap<i32, Uuid>,
    section_ids: HashMap<String, Uuid>,
    code_ids: HashMap<String, Uuid>,
    progress: Option<ProgressCallback>,
}

impl ImportContext {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            stats: ImportStats::default(),
            chapter_ids: HashMap::new(),
            section_ids: HashMap::new(),
            code_ids: HashMap::new(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: impl FnMut(&ImportStats) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn set_progress(&mut self, callback: Option<ProgressCallback>) {
        self.progress = callback;
    }

    pub fn version(&self) -> &str {
        &self.options.version
    }

    pub fn record_chapter(&mut self, chapter_number: i32, id: Uuid) {
        self.stats.chapters += 1;
        self.chapter_ids.insert(chapter_number, id);
    }

    pub fn record_section(&mut self, section_code: &str, id: Uuid) {
        self.stats.sections += 1;
        self.section_ids.insert(section_code.to_string(), id);
    }

    /// Count an emitted code and report progress on interval boundaries
    pub fn record_code(&mut self, code: &str, id: Uuid) {
        self.stats.codes += 1;
        self.code_ids.entry(code.to_string()).or_insert(id);

        let interval = self.options.progress_interval;
        if interval > 0 && self.stats.codes % interval == 0 {
            info!("Processed {} codes...", self.stats.codes);
            if let Some(callback) = self.progress.as_mut() {
                callback(&self.stats);
            }
        }
    }

    pub fn chapter_id(&self, chapter_number: i32) -> Option<Uuid> {
        self.chapter_ids.get(&chapter_number).copied()
    }

    pub fn section_id(&self, section_code: &str) -> Option<Uuid> {
        self.section_ids.get(section_code).copied()
    }

    /// Identity of the first code emitted with this text
    pub fn code_id(&self, code: &str) -> Option<Uuid> {
        self.code_ids.get(code).copied()
    }

    /// Consume the context, keeping only the counters
    pub fn into_stats(self) -> ImportStats {
        self.stats
    }
}

impl Default for ImportContext {
    fn default() -> Self {
        Self::new(ImportOptions::default())
    }
}
