//! In-memory store
//!
//! Keeps every table as a vector in insertion order. Owner references are
//! checked on insert while constraints are enforced, and every reference is
//! re-validated when constraints are restored.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::NomenclatureStore;
use crate::error::NomenError;
use crate::model::{
    Chapter, Code, CodingInstruction, Exclusion, InclusionTerm, Note, OrphanCode, Section,
};
use crate::result::Result;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub chapters: Vec<Chapter>,
    pub sections: Vec<Section>,
    pub codes: Vec<Code>,
    pub inclusion_terms: Vec<InclusionTerm>,
    pub exclusions: Vec<Exclusion>,
    pub coding_instructions: Vec<CodingInstruction>,
    pub notes: Vec<Note>,
    constraints_enforced: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            chapters: Vec::new(),
            sections: Vec::new(),
            codes: Vec::new(),
            inclusion_terms: Vec::new(),
            exclusions: Vec::new(),
            coding_instructions: Vec::new(),
            notes: Vec::new(),
            constraints_enforced: true,
        }
    }

    pub fn constraints_enforced(&self) -> bool {
        self.constraints_enforced
    }

    /// First code row with the given code text
    pub fn code(&self, code: &str) -> Option<&Code> {
        self.codes.iter().find(|row| row.code == code)
    }

    pub fn inclusion_terms_for(&self, code_id: Uuid) -> Vec<&InclusionTerm> {
        self.inclusion_terms
            .iter()
            .filter(|row| row.code_id == code_id)
            .collect()
    }

    pub fn exclusions_for(&self, code_id: Uuid) -> Vec<&Exclusion> {
        self.exclusions
            .iter()
            .filter(|row| row.code_id == code_id)
            .collect()
    }

    pub fn coding_instructions_for(&self, code_id: Uuid) -> Vec<&CodingInstruction> {
        self.coding_instructions
            .iter()
            .filter(|row| row.code_id == code_id)
            .collect()
    }

    pub fn notes_for(&self, code_id: Uuid) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|row| row.code_id == code_id)
            .collect()
    }

    fn chapter_exists(&self, id: Uuid) -> bool {
        self.chapters.iter().any(|row| row.id == id)
    }

    fn section_exists(&self, id: Uuid) -> bool {
        self.sections.iter().any(|row| row.id == id)
    }

    fn code_exists(&self, id: Uuid) -> bool {
        self.codes.iter().any(|row| row.id == id)
    }

    fn check_code_owner(&self, table: &str, code_id: Uuid) -> Result<()> {
        if self.constraints_enforced && !self.code_exists(code_id) {
            return Err(NomenError::constraint_violation(
                table,
                format!("code {code_id} does not exist"),
            ));
        }
        Ok(())
    }

    fn count_violations(&self) -> usize {
        let chapters: HashSet<Uuid> = self.chapters.iter().map(|row| row.id).collect();
        let sections: HashSet<Uuid> = self.sections.iter().map(|row| row.id).collect();
        let codes: HashSet<Uuid> = self.codes.iter().map(|row| row.id).collect();

        let section_violations = self
            .sections
            .iter()
            .filter(|row| !chapters.contains(&row.chapter_id))
            .count();

        let code_violations = self
            .codes
            .iter()
            .filter(|row| {
                !chapters.contains(&row.chapter_id)
                    || row.section_id.is_some_and(|id| !sections.contains(&id))
                    || row.parent_id.is_some_and(|id| !codes.contains(&id))
            })
            .count();

        let annotation_violations = self
            .inclusion_terms
            .iter()
            .map(|row| row.code_id)
            .chain(self.exclusions.iter().map(|row| row.code_id))
            .chain(self.coding_instructions.iter().map(|row| row.code_id))
            .chain(self.notes.iter().map(|row| row.code_id))
            .filter(|id| !codes.contains(id))
            .count();

        section_violations + code_violations + annotation_violations
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NomenclatureStore for MemoryStore {
    fn describe(&self) -> String {
        "in-memory store".to_string()
    }

    fn relax_constraints(&mut self) -> Result<()> {
        self.constraints_enforced = false;
        Ok(())
    }

    fn restore_constraints(&mut self) -> Result<usize> {
        self.constraints_enforced = true;
        Ok(self.count_violations())
    }

    fn insert_chapter(&mut self, chapter: &Chapter) -> Result<()> {
        self.chapters.push(chapter.clone());
        Ok(())
    }

    fn insert_section(&mut self, section: &Section) -> Result<()> {
        if !self.chapter_exists(section.chapter_id) {
            return Err(NomenError::constraint_violation(
                "icd10_sections",
                format!("chapter {} does not exist", section.chapter_id),
            ));
        }
        self.sections.push(section.clone());
        Ok(())
    }

    fn insert_code(&mut self, code: &Code) -> Result<()> {
        if self.constraints_enforced {
            if !self.chapter_exists(code.chapter_id) {
                return Err(NomenError::constraint_violation(
                    "icd10_codes",
                    format!("chapter {} does not exist", code.chapter_id),
                ));
            }
            if let Some(section_id) = code.section_id
                && !self.section_exists(section_id)
            {
                return Err(NomenError::constraint_violation(
                    "icd10_codes",
                    format!("section {section_id} does not exist"),
                ));
            }
        }
        self.codes.push(code.clone());
        Ok(())
    }

    fn insert_inclusion_term(&mut self, term: &InclusionTerm) -> Result<()> {
        self.check_code_owner("icd10_inclusion_terms", term.code_id)?;
        self.inclusion_terms.push(term.clone());
        Ok(())
    }

    fn insert_exclusion(&mut self, exclusion: &Exclusion) -> Result<()> {
        self.check_code_owner("icd10_exclusions", exclusion.code_id)?;
        self.exclusions.push(exclusion.clone());
        Ok(())
    }

    fn insert_coding_instruction(&mut self, instruction: &CodingInstruction) -> Result<()> {
        self.check_code_owner("icd10_coding_instructions", instruction.code_id)?;
        self.coding_instructions.push(instruction.clone());
        Ok(())
    }

    fn insert_note(&mut self, note: &Note) -> Result<()> {
        self.check_code_owner("icd10_notes", note.code_id)?;
        self.notes.push(note.clone());
        Ok(())
    }

    fn resolve_parent_links(&mut self) -> Result<usize> {
        let mut ids_by_code: HashMap<String, Uuid> = HashMap::new();
        for row in &self.codes {
            ids_by_code.entry(row.code.clone()).or_insert(row.id);
        }

        let mut updated = 0;
        for row in self.codes.iter_mut().filter(|row| row.parent_id.is_none()) {
            if let Some(parent_id) = row
                .parent_code
                .as_ref()
                .and_then(|parent| ids_by_code.get(parent))
            {
                row.parent_id = Some(*parent_id);
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn unresolved_parent_links(&self) -> Result<Vec<OrphanCode>> {
        Ok(self
            .codes
            .iter()
            .filter(|row| row.parent_id.is_none())
            .filter_map(|row| {
                row.parent_code.as_ref().map(|parent| OrphanCode {
                    code: row.code.clone(),
                    parent_code: parent.clone(),
                })
            })
            .collect())
    }
}
