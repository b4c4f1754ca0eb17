//! Hierarchy walker
//!
//! Depth-first, document-order traversal of `diag` elements. Each node with a
//! code emits one [`Code`] row, its annotations, and then its children one
//! level deeper with itself as their parent code text.

use tracing::trace;
use uuid::Uuid;

use crate::annotations::import_annotations;
use crate::context::ImportContext;
use crate::document::XmlElement;
use crate::extract::{CodeCategory, truncate_chars};
use crate::model::{Code, SHORT_DESCRIPTION_MAX};
use crate::result::Result;
use crate::store::NomenclatureStore;

const DIAG: &str = "diag";

/// Chapter and section that own a subtree of codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeScope {
    pub chapter_id: Uuid,
    pub section_id: Option<Uuid>,
}

/// Code text of a `diag` element, or `None` when it has none
pub fn diag_code(diag: &XmlElement) -> Option<String> {
    let code = diag.child_text("name")?;
    let code = code.trim();
    (!code.is_empty()).then(|| code.to_string())
}

/// Build the row for a single `diag` element without touching its children.
///
/// Returns `None` for nodes without a code.
pub fn build_code(
    diag: &XmlElement,
    scope: CodeScope,
    parent_code: Option<&str>,
    level: u32,
    version: &str,
) -> Option<Code> {
    let code = diag_code(diag)?;
    let description = diag.child_text("desc").unwrap_or_default();
    let is_leaf = !diag.has_child(DIAG);

    Some(Code {
        id: Uuid::new_v4(),
        chapter_id: scope.chapter_id,
        section_id: scope.section_id,
        short_description: truncate_chars(&description, SHORT_DESCRIPTION_MAX).to_string(),
        parent_code: parent_code.map(str::to_string),
        hierarchy_level: level,
        is_leaf,
        is_billable: is_leaf,
        category: CodeCategory::classify(&code),
        version: version.to_string(),
        parent_id: None,
        code,
    })
}

/// Import a `diag` element and its whole subtree.
///
/// Nodes without a code are skipped together with their descendants.
pub fn import_diag<S: NomenclatureStore + ?Sized>(
    store: &mut S,
    ctx: &mut ImportContext,
    diag: &XmlElement,
    scope: CodeScope,
    parent_code: Option<&str>,
    level: u32,
) -> Result<()> {
    let Some(code) = build_code(diag, scope, parent_code, level, ctx.version()) else {
        trace!("Skipping diag without code under {:?}", parent_code);
        return Ok(());
    };

    store.insert_code(&code)?;
    ctx.record_code(&code.code, code.id);

    import_annotations(store, ctx, diag, code.id)?;

    for child in diag.children(DIAG) {
        import_diag(store, ctx, child, scope, Some(code.code.as_str()), level + 1)?;
    }

    Ok(())
}
