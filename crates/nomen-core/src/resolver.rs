//! Parent resolution pass
//!
//! Codes are written with their parent's code text only. Once the whole
//! document has been walked, this pass turns that text into a parent
//! reference and reports every link that could not be resolved.

use serde::Serialize;
use tracing::{info, warn};

use crate::model::OrphanCode;
use crate::result::Result;
use crate::store::NomenclatureStore;

/// Outcome of a resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentResolution {
    /// Rows whose parent reference was filled in by this pass
    pub updated: usize,
    /// Codes still without a parent reference afterwards
    pub orphans: Vec<OrphanCode>,
}

impl ParentResolution {
    pub fn is_complete(&self) -> bool {
        self.orphans.is_empty()
    }
}

/// Resolve parent references across the whole store.
///
/// Must run after every code row exists. Rows that already have a parent
/// reference are left untouched, so repeating the pass updates nothing.
pub fn resolve_parents<S: NomenclatureStore + ?Sized>(store: &mut S) -> Result<ParentResolution> {
    info!("Resolving parent-child links...");
    let updated = store.resolve_parent_links()?;
    info!("{} parent-child links resolved", updated);

    let orphans = store.unresolved_parent_links()?;
    for orphan in &orphans {
        warn!(
            "Orphaned code {}: parent {} was not imported",
            orphan.code, orphan.parent_code
        );
    }

    Ok(ParentResolution { updated, orphans })
}
