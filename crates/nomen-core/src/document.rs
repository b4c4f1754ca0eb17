//! Loading of nomenclature documents into an in-memory element tree
//!
//! The tabular nomenclature is plain hierarchical markup. Elements keep their
//! attributes and their mixed content (text runs and child elements) in
//! document order, which is all the importers need to navigate it.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::NomenError;
use crate::result::Result;

/// A node inside an element's content
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// A single markup element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    content: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.content.push(XmlNode::Element(child));
        self
    }

    /// Builder: append a text run
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(XmlNode::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the named attribute, if present
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.content.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct child elements with the given name, in document order
    pub fn children<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + use<'a, 'n> {
        self.elements().filter(move |element| element.name == name)
    }

    /// First direct child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// Whether the element has a direct child with the given name
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Full text content of the first child with the given name
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(XmlElement::text)
    }

    /// Text runs that belong to this element itself, ignoring children
    pub fn own_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Concatenated text of this element and all descendants, in document order
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.content {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }

    fn push_node(&mut self, node: XmlNode) {
        self.content.push(node);
    }
}

/// A parsed nomenclature document
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// The `version` attribute of the root element
    pub fn version(&self) -> Option<&str> {
        self.root.attribute("version")
    }

    /// Load and parse a document from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(NomenError::DocumentNotFound {
                path: path.to_path_buf(),
            });
        }

        debug!("Loading nomenclature document: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| NomenError::io_error(path, e))?;
        Self::parse(&content)
    }

    /// Parse a document from a string
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| NomenError::MalformedDocument {
                message: e.to_string(),
                position: reader.buffer_position() as u64,
            })?;

            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start, reader.buffer_position() as u64)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, reader.buffer_position() as u64)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| NomenError::MalformedDocument {
                        message: e.to_string(),
                        position: reader.buffer_position() as u64,
                    })?;
                    push_text(&mut stack, &text);
                }
                Event::CData(data) => {
                    push_text(&mut stack, &String::from_utf8_lossy(&data));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(NomenError::MalformedDocument {
                message: format!("unclosed element '{}'", stack[stack.len() - 1].name),
                position: reader.buffer_position() as u64,
            });
        }

        root.map(Self::new).ok_or(NomenError::MissingRoot)
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<XmlElement> {
    let malformed = |message: String| NomenError::MalformedDocument { message, position };

    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| malformed(e.to_string()))?;
        let value = attribute
            .unescape_value()
            .map_err(|e| malformed(e.to_string()))?;
        element.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.push_node(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

// Whitespace-only runs between elements are layout, not content.
fn push_text(stack: &mut [XmlElement], text: &str) {
    if text.trim().is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.push_node(XmlNode::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ICD10CM.tabular version="2026">
  <chapter>
    <name>1</name>
    <desc>Certain infectious diseases (A00-B99)</desc>
    <section id="A00-A09">
      <desc>Intestinal infectious diseases</desc>
      <diag>
        <name>A00</name>
        <desc>Cholera &amp; friends</desc>
        <codeFirst>underlying <note>ignored here</note> condition</codeFirst>
      </diag>
    </section>
  </chapter>
</ICD10CM.tabular>"#;

    #[test]
    fn test_parse_tree_structure() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.root().name(), "ICD10CM.tabular");
        assert_eq!(doc.version(), Some("2026"));

        let chapter = doc.root().child("chapter").unwrap();
        assert_eq!(chapter.child_text("name").as_deref(), Some("1"));

        let section = chapter.child("section").unwrap();
        assert_eq!(section.attribute("id"), Some("A00-A09"));
        assert_eq!(section.children("diag").count(), 1);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let diag = doc
            .root()
            .child("chapter")
            .and_then(|c| c.child("section"))
            .and_then(|s| s.child("diag"))
            .unwrap();
        assert_eq!(diag.child_text("desc").as_deref(), Some("Cholera & friends"));
    }

    #[test]
    fn test_own_text_versus_full_text() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let code_first = doc
            .root()
            .child("chapter")
            .and_then(|c| c.child("section"))
            .and_then(|s| s.child("diag"))
            .and_then(|d| d.child("codeFirst"))
            .unwrap();
        assert_eq!(code_first.own_text(), "underlying  condition");
        assert_eq!(code_first.text(), "underlying ignored here condition");
    }

    #[test]
    fn test_lookup_by_borrowed_name_outlives_name() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let chapter = {
            let name = String::from("chapter");
            doc.root().child(&name)
        };
        let sections: Vec<_> = {
            let name = String::from("section");
            chapter.unwrap().children(&name).collect()
        };
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].attribute("id"), Some("A00-A09"));
    }

    #[test]
    fn test_empty_elements_are_kept() {
        let doc = XmlDocument::parse(r#"<root><diag/><diag><name>A01</name></diag></root>"#).unwrap();
        assert_eq!(doc.root().children("diag").count(), 2);
        assert!(doc.root().child("diag").unwrap().child("name").is_none());
    }

    #[test]
    fn test_missing_root() {
        let err = XmlDocument::parse("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, NomenError::MissingRoot));
    }

    #[test]
    fn test_mismatched_tags_are_rejected() {
        let err = XmlDocument::parse("<root><chapter></root>").unwrap_err();
        assert!(matches!(err, NomenError::MalformedDocument { .. }));
    }

    #[test]
    fn test_unclosed_root_is_rejected() {
        let err = XmlDocument::parse("<root><chapter></chapter>").unwrap_err();
        assert!(matches!(err, NomenError::MalformedDocument { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let doc = XmlDocument::load(file.path()).unwrap();
        assert_eq!(doc.root().children("chapter").count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = XmlDocument::load(Path::new("/nonexistent/tabular.xml")).unwrap_err();
        assert!(matches!(err, NomenError::DocumentNotFound { .. }));
    }
}
