//! Nomen Core
//!
//! Importer for hierarchical ICD-10 nomenclature documents. Chapters,
//! sections and arbitrarily nested diagnostic entries are walked in document
//! order and written to a relational store, together with their inclusion
//! terms, exclusions, coding instructions and notes. Parent links are stored
//! as code text first and resolved in a second pass.

pub mod annotations;
pub mod chapter;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod extract;
pub mod importer;
pub mod model;
pub mod resolver;
pub mod result;
pub mod stats;
pub mod store;
pub mod walker;

// Re-export commonly used types
pub use config::{ConfigLoader, ImportConfig};
pub use context::{ImportContext, ImportOptions, ProgressCallback};
pub use document::{XmlDocument, XmlElement};
pub use error::{ErrorKind, NomenError};
pub use extract::{CodeCategory, CodeRange};
pub use importer::NomenclatureImporter;
pub use model::{
    Chapter, Code, CodingInstruction, Exclusion, ExclusionKind, InclusionKind, InclusionTerm,
    InstructionKind, Note, NoteKind, OrphanCode, Section,
};
pub use resolver::{ParentResolution, resolve_parents};
pub use result::Result;
pub use stats::{ImportStats, ImportSummary};
pub use store::{ConstraintGuard, MemoryStore, NomenclatureStore, REFERENCE_SCHEMA, SqliteStore};

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `default_directive`.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
