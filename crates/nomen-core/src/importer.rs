//! Import orchestrator
//!
//! Sequences a full import: load the document, relax constraint checking,
//! walk every chapter, resolve parent links once, restore constraint
//! checking and report. Faults anywhere in the bulk phase abort the run, and
//! the [`ConstraintGuard`] restores checking on the way out.

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::chapter::import_chapter;
use crate::context::{ImportContext, ImportOptions, ProgressCallback};
use crate::document::XmlDocument;
use crate::result::Result;
use crate::resolver::resolve_parents;
use crate::stats::{ImportStats, ImportSummary};
use crate::store::{ConstraintGuard, NomenclatureStore};

pub struct NomenclatureImporter {
    options: ImportOptions,
    progress: Option<ProgressCallback>,
}

impl NomenclatureImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    /// Report running counters every `progress_interval` codes
    pub fn with_progress(mut self, callback: impl FnMut(&ImportStats) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Load `path` and import it. Load failures happen before any write.
    pub fn import_file<S: NomenclatureStore + ?Sized>(
        self,
        path: &Path,
        store: &mut S,
    ) -> Result<ImportSummary> {
        info!("Loading document {}", path.display());
        let document = XmlDocument::load(path)?;
        self.import_document(&document, store)
    }

    /// Import an already loaded document into `store`
    pub fn import_document<S: NomenclatureStore + ?Sized>(
        self,
        document: &XmlDocument,
        store: &mut S,
    ) -> Result<ImportSummary> {
        let started = Instant::now();
        let document_version = document.version().map(str::to_string);
        info!(
            "Document loaded. Version: {}",
            document_version.as_deref().unwrap_or("N/A")
        );

        let chapters: Vec<_> = document.root().children("chapter").collect();
        info!("Found {} chapters", chapters.len());

        let mut ctx = ImportContext::new(self.options);
        ctx.set_progress(self.progress);

        info!("Importing into {}", store.describe());
        let mut guard = ConstraintGuard::relax(store)?;

        for chapter in chapters {
            import_chapter(&mut *guard, &mut ctx, chapter)?;
        }

        let resolution = resolve_parents(&mut *guard)?;
        let constraint_violations = guard.restore()?;

        let summary = ImportSummary {
            stats: ctx.into_stats(),
            document_version,
            parents_resolved: resolution.updated,
            orphans: resolution.orphans,
            constraint_violations,
            duration: started.elapsed(),
        };
        info!("Import complete: {}", summary.stats);
        Ok(summary)
    }
}

impl Default for NomenclatureImporter {
    fn default() -> Self {
        Self::new(ImportOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NomenError;
    use crate::store::MemoryStore;
    use std::path::PathBuf;

    #[test]
    fn test_missing_document_aborts_before_writes() {
        let mut store = MemoryStore::new();
        let err = NomenclatureImporter::default()
            .import_file(&PathBuf::from("/nonexistent/tabular.xml"), &mut store)
            .unwrap_err();

        assert!(matches!(err, NomenError::DocumentNotFound { .. }));
        assert!(err.is_pre_write());
        assert!(store.chapters.is_empty());
        assert!(store.constraints_enforced());
    }

    #[test]
    fn test_document_without_chapters() {
        let doc = XmlDocument::parse(r#"<ICD10CM.tabular version="2026"/>"#).unwrap();
        let mut store = MemoryStore::new();
        let summary = NomenclatureImporter::default()
            .import_document(&doc, &mut store)
            .unwrap();

        assert_eq!(summary.stats, ImportStats::default());
        assert_eq!(summary.document_version.as_deref(), Some("2026"));
        assert!(summary.is_consistent());
    }
}
