//! SQLite store backed by rusqlite
//!
//! One connection serves the whole run. The bulk phase runs with foreign
//! keys off inside a single transaction; restoring commits, switches foreign
//! keys back on and re-validates with `PRAGMA foreign_key_check`.

use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, warn};

use super::NomenclatureStore;
use crate::error::NomenError;
use crate::model::{
    Chapter, Code, CodingInstruction, Exclusion, InclusionTerm, Note, OrphanCode, Section,
};
use crate::result::Result;

/// DDL for the seven nomenclature tables
pub const REFERENCE_SCHEMA: &str = include_str!("../../sql/schema.sql");

const CHECKED_TABLES: [&str; 5] = [
    "icd10_codes",
    "icd10_inclusion_terms",
    "icd10_exclusions",
    "icd10_coding_instructions",
    "icd10_notes",
];

pub struct SqliteStore {
    conn: Connection,
    target: String,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, path.display().to_string())
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    pub fn from_connection(conn: Connection, target: String) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, target })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether the nomenclature tables are present
    pub fn has_schema(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'icd10_%'",
            [],
            |row| row.get(0),
        )?;
        Ok(count >= 7)
    }

    /// Fail with [`NomenError::SchemaMissing`] unless the tables are present
    pub fn require_schema(&self) -> Result<()> {
        if self.has_schema()? {
            Ok(())
        } else {
            Err(NomenError::SchemaMissing {
                target: self.target.clone(),
            })
        }
    }

    /// Create the tables from [`REFERENCE_SCHEMA`]. Never called by the importer.
    pub fn apply_reference_schema(&self) -> Result<()> {
        self.conn.execute_batch(REFERENCE_SCHEMA)?;
        Ok(())
    }

    fn foreign_key_violations(&self) -> Result<usize> {
        let mut violations = 0;
        for table in CHECKED_TABLES {
            let mut stmt = self
                .conn
                .prepare(&format!("PRAGMA foreign_key_check({table})"))?;
            let mut rows = stmt.query([])?;
            while rows.next()?.is_some() {
                violations += 1;
            }
        }
        Ok(violations)
    }

    fn end_transaction(&self, statement: &str) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch(statement)?;
        }
        Ok(())
    }
}

fn uuid_text(id: uuid::Uuid) -> String {
    id.to_string()
}

impl NomenclatureStore for SqliteStore {
    fn describe(&self) -> String {
        self.target.clone()
    }

    fn relax_constraints(&mut self) -> Result<()> {
        // foreign_keys is a no-op inside a transaction, so it goes first
        self.conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        if let Err(e) = self.conn.execute_batch("BEGIN IMMEDIATE;") {
            self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            return Err(e.into());
        }
        Ok(())
    }

    fn restore_constraints(&mut self) -> Result<usize> {
        if let Err(e) = self.end_transaction("COMMIT;") {
            // a failed COMMIT can leave the transaction open
            if let Err(abort) = self.abort_bulk_load() {
                warn!(
                    "Rollback after failed commit on {} failed: {}",
                    self.target, abort
                );
            }
            return Err(e);
        }
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.foreign_key_violations()
    }

    fn abort_bulk_load(&mut self) -> Result<()> {
        debug!("Rolling back bulk load on {}", self.target);
        self.end_transaction("ROLLBACK;")?;
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    fn insert_chapter(&mut self, chapter: &Chapter) -> Result<()> {
        self.conn.execute(
            "INSERT INTO icd10_chapters
                (chapter_id, chapter_number, code_range_start, code_range_end, description_en, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                uuid_text(chapter.id),
                chapter.chapter_number,
                chapter.code_range_start,
                chapter.code_range_end,
                chapter.description,
                chapter.version,
            ],
        )?;
        Ok(())
    }

    fn insert_section(&mut self, section: &Section) -> Result<()> {
        self.conn.execute(
            "INSERT INTO icd10_sections
                (section_id, chapter_id, section_code, code_range_start, code_range_end, description_en)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                uuid_text(section.id),
                uuid_text(section.chapter_id),
                section.section_code,
                section.code_range_start,
                section.code_range_end,
                section.description,
            ],
        )?;
        Ok(())
    }

    fn insert_code(&mut self, code: &Code) -> Result<()> {
        self.conn.execute(
            "INSERT INTO icd10_codes
                (code_id, chapter_id, section_id, code, full_code, short_description_en,
                 parent_code, parent_id, hierarchy_level, is_leaf_node, is_billable, category, version)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                uuid_text(code.id),
                uuid_text(code.chapter_id),
                code.section_id.map(uuid_text),
                code.code,
                code.short_description,
                code.parent_code,
                code.parent_id.map(uuid_text),
                code.hierarchy_level,
                code.is_leaf,
                code.is_billable,
                code.category.label(),
                code.version,
            ],
        )?;
        Ok(())
    }

    fn insert_inclusion_term(&mut self, term: &InclusionTerm) -> Result<()> {
        self.conn.execute(
            "INSERT INTO icd10_inclusion_terms (inclusion_id, code_id, term_type, term_text_en, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid_text(term.id),
                uuid_text(term.code_id),
                term.kind.as_str(),
                term.text,
                term.sort_order,
            ],
        )?;
        Ok(())
    }

    fn insert_exclusion(&mut self, exclusion: &Exclusion) -> Result<()> {
        self.conn.execute(
            "INSERT INTO icd10_exclusions
                (exclusion_id, code_id, exclusion_type, note_text_en, referenced_code, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                uuid_text(exclusion.id),
                uuid_text(exclusion.code_id),
                exclusion.kind.as_str(),
                exclusion.text,
                exclusion.referenced_code,
                exclusion.sort_order,
            ],
        )?;
        Ok(())
    }

    fn insert_coding_instruction(&mut self, instruction: &CodingInstruction) -> Result<()> {
        self.conn.execute(
            "INSERT INTO icd10_coding_instructions
                (instruction_id, code_id, instruction_type, instruction_text_en, referenced_code, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                uuid_text(instruction.id),
                uuid_text(instruction.code_id),
                instruction.kind.as_str(),
                instruction.text,
                instruction.referenced_code,
                instruction.sort_order,
            ],
        )?;
        Ok(())
    }

    fn insert_note(&mut self, note: &Note) -> Result<()> {
        self.conn.execute(
            "INSERT INTO icd10_notes (note_id, code_id, note_type, note_text_en, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid_text(note.id),
                uuid_text(note.code_id),
                note.kind.as_str(),
                note.text,
                note.sort_order,
            ],
        )?;
        Ok(())
    }

    fn resolve_parent_links(&mut self) -> Result<usize> {
        let updated = self.conn.execute(
            "UPDATE icd10_codes
             SET parent_id = (
                 SELECT p.code_id FROM icd10_codes p
                 WHERE p.code = icd10_codes.parent_code
                 ORDER BY p.rowid
                 LIMIT 1
             )
             WHERE parent_code IS NOT NULL
               AND parent_id IS NULL
               AND EXISTS (SELECT 1 FROM icd10_codes p WHERE p.code = icd10_codes.parent_code)",
            [],
        )?;
        Ok(updated)
    }

    fn unresolved_parent_links(&self) -> Result<Vec<OrphanCode>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, parent_code FROM icd10_codes
             WHERE parent_code IS NOT NULL AND parent_id IS NULL
             ORDER BY rowid",
        )?;
        let orphans = stmt
            .query_map([], |row| {
                Ok(OrphanCode {
                    code: row.get(0)?,
                    parent_code: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(orphans)
    }
}
