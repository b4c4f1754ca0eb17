//! Record types materialized by the importer
//!
//! One struct per stored record kind. Identities are generated by the
//! importer, so every row is fully formed before it reaches a store.

use std::fmt;

use uuid::Uuid;

use crate::extract::CodeCategory;

/// Maximum stored length of a code's short description
pub const SHORT_DESCRIPTION_MAX: usize = 250;
/// Maximum stored length of inclusion terms, exclusions and coding instructions
pub const ANNOTATION_TEXT_MAX: usize = 1000;
/// Maximum stored length of notes
pub const NOTE_TEXT_MAX: usize = 2000;

/// Top-level grouping of the nomenclature
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: Uuid,
    pub chapter_number: i32,
    pub code_range_start: String,
    pub code_range_end: String,
    pub description: String,
    pub version: String,
}

/// Grouping of codes inside a chapter
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: Uuid,
    pub chapter_id: Uuid,
    /// Raw identifier, e.g. `A00-A09`
    pub section_code: String,
    pub code_range_start: String,
    pub code_range_end: String,
    pub description: String,
}

/// A single classification entry
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub id: Uuid,
    pub chapter_id: Uuid,
    /// Section of the top-level ancestor; nested codes inherit it
    pub section_id: Option<Uuid>,
    pub code: String,
    pub short_description: String,
    /// Code text of the parent node, resolved to `parent_id` after the walk
    pub parent_code: Option<String>,
    pub hierarchy_level: u32,
    pub is_leaf: bool,
    pub is_billable: bool,
    pub category: CodeCategory,
    pub version: String,
    pub parent_id: Option<Uuid>,
}

/// Inclusion term element kinds, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InclusionKind {
    Includes,
    InclusionTerm,
}

impl InclusionKind {
    pub const ALL: [InclusionKind; 2] = [InclusionKind::Includes, InclusionKind::InclusionTerm];

    pub fn as_str(self) -> &'static str {
        match self {
            InclusionKind::Includes => "includes",
            InclusionKind::InclusionTerm => "inclusionTerm",
        }
    }
}

/// Exclusion element kinds, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionKind {
    Excludes1,
    Excludes2,
}

impl ExclusionKind {
    pub const ALL: [ExclusionKind; 2] = [ExclusionKind::Excludes1, ExclusionKind::Excludes2];

    pub fn as_str(self) -> &'static str {
        match self {
            ExclusionKind::Excludes1 => "excludes1",
            ExclusionKind::Excludes2 => "excludes2",
        }
    }
}

/// Coding instruction element kinds, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    CodeFirst,
    UseAdditionalCode,
    CodeAlso,
}

impl InstructionKind {
    pub const ALL: [InstructionKind; 3] = [
        InstructionKind::CodeFirst,
        InstructionKind::UseAdditionalCode,
        InstructionKind::CodeAlso,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InstructionKind::CodeFirst => "codeFirst",
            InstructionKind::UseAdditionalCode => "useAdditionalCode",
            InstructionKind::CodeAlso => "codeAlso",
        }
    }
}

/// Note kinds. Every note imported from the tabular list is general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    General,
}

impl NoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteKind::General => "general",
        }
    }
}

macro_rules! impl_kind_display {
    ($($kind:ty),*) => {
        $(
            impl fmt::Display for $kind {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_kind_display!(InclusionKind, ExclusionKind, InstructionKind, NoteKind);

#[derive(Debug, Clone, PartialEq)]
pub struct InclusionTerm {
    pub id: Uuid,
    pub code_id: Uuid,
    pub kind: InclusionKind,
    pub text: String,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub id: Uuid,
    pub code_id: Uuid,
    pub kind: ExclusionKind,
    pub text: String,
    pub referenced_code: Option<String>,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodingInstruction {
    pub id: Uuid,
    pub code_id: Uuid,
    pub kind: InstructionKind,
    pub text: String,
    pub referenced_code: Option<String>,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub code_id: Uuid,
    pub kind: NoteKind,
    pub text: String,
    pub sort_order: u32,
}

/// A code whose parent code text matched no imported code
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OrphanCode {
    pub code: String,
    pub parent_code: String,
}
