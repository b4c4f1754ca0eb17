//! Annotation importers
//!
//! Inclusion terms, exclusions, coding instructions and notes are pulled out
//! of a `diag` element by scanning a fixed list of child element names.
//! Every kind keeps its own sort counter per code, starting at 0, and blank
//! items are dropped before they consume a sort position.

use tracing::trace;
use uuid::Uuid;

use crate::context::ImportContext;
use crate::document::XmlElement;
use crate::extract::{extract_referenced_code, truncate_chars};
use crate::model::{
    ANNOTATION_TEXT_MAX, CodingInstruction, Exclusion, ExclusionKind, InclusionKind,
    InclusionTerm, InstructionKind, NOTE_TEXT_MAX, Note, NoteKind,
};
use crate::result::Result;
use crate::store::NomenclatureStore;

const NOTE: &str = "note";
const NOTES: &str = "notes";

/// Per-code, per-kind sort position
#[derive(Debug, Default)]
struct SortCounter(u32);

impl SortCounter {
    fn next(&mut self) -> u32 {
        let current = self.0;
        self.0 += 1;
        current
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Full text of every `note` child under each `group` child of `diag`
fn grouped_notes<'a>(diag: &'a XmlElement, group: &'a str) -> impl Iterator<Item = String> + 'a {
    diag.children(group)
        .flat_map(|element| element.children(NOTE))
        .map(XmlElement::text)
}

pub fn collect_inclusion_terms(diag: &XmlElement, code_id: Uuid) -> Vec<InclusionTerm> {
    let mut order = SortCounter::default();
    let mut terms = Vec::new();

    for kind in InclusionKind::ALL {
        for text in grouped_notes(diag, kind.as_str()).filter(|text| !is_blank(text)) {
            terms.push(InclusionTerm {
                id: Uuid::new_v4(),
                code_id,
                kind,
                text: truncate_chars(&text, ANNOTATION_TEXT_MAX).to_string(),
                sort_order: order.next(),
            });
        }
    }

    terms
}

pub fn collect_exclusions(diag: &XmlElement, code_id: Uuid) -> Vec<Exclusion> {
    let mut order = SortCounter::default();
    let mut exclusions = Vec::new();

    for kind in ExclusionKind::ALL {
        for text in grouped_notes(diag, kind.as_str()).filter(|text| !is_blank(text)) {
            exclusions.push(Exclusion {
                id: Uuid::new_v4(),
                code_id,
                kind,
                referenced_code: extract_referenced_code(&text),
                text: truncate_chars(&text, ANNOTATION_TEXT_MAX).to_string(),
                sort_order: order.next(),
            });
        }
    }

    exclusions
}

/// Coding instructions carry their text inline; an element without inline
/// text contributes one instruction per `note` child instead.
pub fn collect_coding_instructions(diag: &XmlElement, code_id: Uuid) -> Vec<CodingInstruction> {
    let mut order = SortCounter::default();
    let mut instructions = Vec::new();

    for kind in InstructionKind::ALL {
        for element in diag.children(kind.as_str()) {
            let inline = element.own_text();
            let texts = if is_blank(&inline) {
                element.children(NOTE).map(XmlElement::text).collect()
            } else {
                vec![inline]
            };

            for text in texts.into_iter().filter(|text| !is_blank(text)) {
                instructions.push(CodingInstruction {
                    id: Uuid::new_v4(),
                    code_id,
                    kind,
                    referenced_code: extract_referenced_code(&text),
                    text: truncate_chars(&text, ANNOTATION_TEXT_MAX).to_string(),
                    sort_order: order.next(),
                });
            }
        }
    }

    instructions
}

/// Notes from `notes` groups first, then direct `note` children
pub fn collect_notes(diag: &XmlElement, code_id: Uuid) -> Vec<Note> {
    let mut order = SortCounter::default();

    grouped_notes(diag, NOTES)
        .chain(diag.children(NOTE).map(XmlElement::text))
        .filter(|text| !is_blank(text))
        .map(|text| Note {
            id: Uuid::new_v4(),
            code_id,
            kind: NoteKind::General,
            text: truncate_chars(&text, NOTE_TEXT_MAX).to_string(),
            sort_order: order.next(),
        })
        .collect()
}

/// Import all four annotation kinds for one code, in fixed order
pub fn import_annotations<S: NomenclatureStore + ?Sized>(
    store: &mut S,
    ctx: &mut ImportContext,
    diag: &XmlElement,
    code_id: Uuid,
) -> Result<()> {
    for term in collect_inclusion_terms(diag, code_id) {
        store.insert_inclusion_term(&term)?;
        ctx.stats.inclusion_terms += 1;
    }

    for exclusion in collect_exclusions(diag, code_id) {
        store.insert_exclusion(&exclusion)?;
        ctx.stats.exclusions += 1;
    }

    for instruction in collect_coding_instructions(diag, code_id) {
        store.insert_coding_instruction(&instruction)?;
        ctx.stats.coding_instructions += 1;
    }

    for note in collect_notes(diag, code_id) {
        store.insert_note(&note)?;
        ctx.stats.notes += 1;
    }

    trace!("Annotations imported for code {}", code_id);
    Ok(())
}
