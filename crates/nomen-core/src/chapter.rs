//! Chapter and section importer

use tracing::{debug, info};
use uuid::Uuid;

use crate::context::ImportContext;
use crate::document::XmlElement;
use crate::extract::{contains_code, parse_chapter_number, parse_code_range, truncate_chars};
use crate::model::{Chapter, Section};
use crate::result::Result;
use crate::store::NomenclatureStore;
use crate::walker::{CodeScope, import_diag};

const CHAPTER_LOG_PREVIEW: usize = 50;

/// Build a chapter row from a `chapter` element.
///
/// The code range comes from the description when it mentions a code, and
/// from the name text otherwise.
pub fn build_chapter(chapter: &XmlElement, version: &str) -> Chapter {
    let name = chapter.child_text("name").unwrap_or_default();
    let description = chapter.child_text("desc").unwrap_or_default();

    let range_source = if contains_code(&description) {
        &description
    } else {
        &name
    };
    let range = parse_code_range(range_source);

    Chapter {
        id: Uuid::new_v4(),
        chapter_number: parse_chapter_number(&name),
        code_range_start: range.start,
        code_range_end: range.end,
        description,
        version: version.to_string(),
    }
}

/// Build a section row; a missing or blank description falls back to the section code
pub fn build_section(section: &XmlElement, chapter_id: Uuid) -> Section {
    let section_code = section.attribute("id").unwrap_or_default().to_string();
    let description = section
        .child_text("desc")
        .filter(|desc| !desc.trim().is_empty())
        .unwrap_or_else(|| section_code.clone());
    let range = parse_code_range(&section_code);

    Section {
        id: Uuid::new_v4(),
        chapter_id,
        code_range_start: range.start,
        code_range_end: range.end,
        section_code,
        description,
    }
}

/// Import a chapter with all of its sections
pub fn import_chapter<S: NomenclatureStore + ?Sized>(
    store: &mut S,
    ctx: &mut ImportContext,
    element: &XmlElement,
) -> Result<Uuid> {
    let chapter = build_chapter(element, ctx.version());
    info!(
        "Chapter {}: {}...",
        chapter.chapter_number,
        truncate_chars(&chapter.description, CHAPTER_LOG_PREVIEW)
    );

    store.insert_chapter(&chapter)?;
    ctx.record_chapter(chapter.chapter_number, chapter.id);

    for section in element.children("section") {
        import_section(store, ctx, section, chapter.id)?;
    }

    Ok(chapter.id)
}

/// Import a section and walk its top-level `diag` elements at level 0
pub fn import_section<S: NomenclatureStore + ?Sized>(
    store: &mut S,
    ctx: &mut ImportContext,
    element: &XmlElement,
    chapter_id: Uuid,
) -> Result<Uuid> {
    let section = build_section(element, chapter_id);
    if ctx.options.verbose {
        info!("  Section: {}", section.section_code);
    } else {
        debug!("Section: {}", section.section_code);
    }

    store.insert_section(&section)?;
    ctx.record_section(&section.section_code, section.id);

    let scope = CodeScope {
        chapter_id,
        section_id: Some(section.id),
    };
    for diag in element.children("diag") {
        import_diag(store, ctx, diag, scope, None, 0)?;
    }

    Ok(section.id)
}
