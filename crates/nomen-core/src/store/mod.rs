//! Relational store abstraction
//!
//! The importer writes through [`NomenclatureStore`], one insert per record.
//! Constraint checking is relaxed for the bulk phase through a
//! [`ConstraintGuard`], which always restores it, including on the fault path.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{REFERENCE_SCHEMA, SqliteStore};

use std::ops::{Deref, DerefMut};

use tracing::{debug, error, warn};

use crate::model::{
    Chapter, Code, CodingInstruction, Exclusion, InclusionTerm, Note, OrphanCode, Section,
};
use crate::result::Result;

/// Destination for imported nomenclature records
pub trait NomenclatureStore {
    /// Human-readable name of the store target, for logs
    fn describe(&self) -> String;

    /// Relax constraint checking on the code and annotation tables
    fn relax_constraints(&mut self) -> Result<()>;

    /// Re-enable constraint checking and re-validate existing rows.
    ///
    /// Returns the number of integrity violations found.
    fn restore_constraints(&mut self) -> Result<usize>;

    /// Re-enable constraint checking after a failed bulk phase.
    ///
    /// Stores that buffer the bulk phase may discard it here.
    fn abort_bulk_load(&mut self) -> Result<()> {
        self.restore_constraints().map(|_| ())
    }

    fn insert_chapter(&mut self, chapter: &Chapter) -> Result<()>;
    fn insert_section(&mut self, section: &Section) -> Result<()>;
    fn insert_code(&mut self, code: &Code) -> Result<()>;
    fn insert_inclusion_term(&mut self, term: &InclusionTerm) -> Result<()>;
    fn insert_exclusion(&mut self, exclusion: &Exclusion) -> Result<()>;
    fn insert_coding_instruction(&mut self, instruction: &CodingInstruction) -> Result<()>;
    fn insert_note(&mut self, note: &Note) -> Result<()>;

    /// Fill `parent_id` of every code whose `parent_code` matches another
    /// code's text and whose `parent_id` is still unset.
    ///
    /// Returns the number of rows updated.
    fn resolve_parent_links(&mut self) -> Result<usize>;

    /// Codes with parent code text but no resolved parent
    fn unresolved_parent_links(&self) -> Result<Vec<OrphanCode>>;
}

/// Holds constraint checking relaxed for the lifetime of the guard
pub struct ConstraintGuard<'s, S: NomenclatureStore + ?Sized> {
    store: &'s mut S,
    active: bool,
}

impl<'s, S: NomenclatureStore + ?Sized> ConstraintGuard<'s, S> {
    /// Relax constraints on `store`
    pub fn relax(store: &'s mut S) -> Result<Self> {
        debug!("Relaxing constraint checking on {}", store.describe());
        store.relax_constraints()?;
        Ok(Self {
            store,
            active: true,
        })
    }

    /// Restore constraint checking, returning the violations found on re-validation
    ///
    /// On failure the guard still aborts the bulk load when dropped.
    pub fn restore(mut self) -> Result<usize> {
        let violations = self.store.restore_constraints()?;
        self.active = false;
        if violations > 0 {
            warn!("{} constraint violations found after bulk load", violations);
        } else {
            debug!("Constraint checking restored");
        }
        Ok(violations)
    }
}

impl<S: NomenclatureStore + ?Sized> Deref for ConstraintGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: NomenclatureStore + ?Sized> DerefMut for ConstraintGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: NomenclatureStore + ?Sized> Drop for ConstraintGuard<'_, S> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        warn!("Bulk load aborted, restoring constraint checking");
        if let Err(e) = self.store.abort_bulk_load() {
            error!("Failed to restore constraint checking: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restore_reenables_constraints() {
        let mut store = MemoryStore::new();
        let guard = ConstraintGuard::relax(&mut store).unwrap();
        assert!(!guard.constraints_enforced());
        assert_eq!(guard.restore().unwrap(), 0);
        assert!(store.constraints_enforced());
    }

    #[test]
    fn test_guard_drop_reenables_constraints() {
        let mut store = MemoryStore::new();
        {
            let guard = ConstraintGuard::relax(&mut store).unwrap();
            assert!(!guard.constraints_enforced());
        }
        assert!(store.constraints_enforced());
    }
}
