//! # Flow Document Model
//!
//! Owned element tree of the resolved flow definition.
//!
//! Comments, processing instructions and the XML declaration are dropped.
//! Whitespace-only text between elements is dropped; all other text and
//! CDATA content is kept as unescaped text nodes.

use crate::StructuralError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// A node inside an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// One XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Qualified name, prefix included (`bpmn2:process`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without namespace prefix (`process`).
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Value of attribute `name`, matched on its qualified name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given local name.
    #[must_use]
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.child_elements()
            .find(|element| element.local_name() == local_name)
    }

    /// Concatenated direct text content.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// This element and every element below it, depth-first, document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All elements at or below this one with the given local name.
    pub fn find_all<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.descendants()
            .filter(move |element| element.local_name() == local_name)
    }
}

/// Depth-first iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack
            .extend(element.children.iter().rev().filter_map(|node| match node {
                Node::Element(child) => Some(child),
                Node::Text(_) => None,
            }));
        Some(element)
    }
}

/// The parsed flow definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDocument {
    root: Element,
}

impl FlowDocument {
    /// Parse a flow definition into an element tree.
    pub fn parse(bytes: &[u8]) -> Result<Self, StructuralError> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(malformed(format!(
                        "{e} (at byte {})",
                        reader.buffer_position()
                    )));
                }
            };

            match event {
                Event::Eof => break,
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(malformed("content after root element".to_string()));
                    }
                    open.push(element_from(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    close(element, &mut open, &mut root)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| malformed("unmatched end tag".to_string()))?;
                    close(element, &mut open, &mut root)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| malformed(e.to_string()))?;
                    push_text(&text, &mut open)?;
                }
                Event::CData(cdata) => {
                    let text = std::str::from_utf8(&cdata).map_err(|e| malformed(e.to_string()))?;
                    push_text(text, &mut open)?;
                }
                _ => {}
            }
            buf.clear();
        }

        if !open.is_empty() {
            return Err(malformed(format!("{} unclosed element(s)", open.len())));
        }
        let root = root.ok_or_else(|| malformed("document has no root element".to_string()))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements in the document with the given local name.
    pub fn find_all<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.root.find_all(local_name)
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, StructuralError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| malformed(e.to_string()))?
        .to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| malformed(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn close(
    element: Element,
    open: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), StructuralError> {
    match open.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("multiple root elements".to_string())),
    }
    Ok(())
}

fn push_text(text: &str, open: &mut [Element]) -> Result<(), StructuralError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match open.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text.to_string()));
            Ok(())
        }
        None => Err(malformed("text outside root element".to_string())),
    }
}

fn malformed(reason: String) -> StructuralError {
    StructuralError::MalformedFlowDocument(reason)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn2:definitions xmlns:bpmn2="http://www.omg.org/spec/BPMN/20100524/MODEL" id="Definitions_1">
    <!-- collaboration -->
    <bpmn2:collaboration id="Collaboration_1" name="Default Collaboration">
        <bpmn2:extensionElements>
            <ifl:property>
                <key>namespaceMapping</key>
                <value>xmlns:p=&quot;urn:x&quot;</value>
            </ifl:property>
        </bpmn2:extensionElements>
    </bpmn2:collaboration>
    <bpmn2:process id="Process_1" name="Integration Process">
        <bpmn2:callActivity id="CallActivity_1" name="Script"/>
        <bpmn2:callActivity id="CallActivity_2" name="Mapping"/>
    </bpmn2:process>
</bpmn2:definitions>"#;

    fn flow() -> FlowDocument {
        FlowDocument::parse(FLOW.as_bytes()).expect("parse")
    }

    #[test]
    fn root_element_and_attributes() {
        let doc = flow();
        assert_eq!(doc.root().name(), "bpmn2:definitions");
        assert_eq!(doc.root().local_name(), "definitions");
        assert_eq!(doc.root().attribute("id"), Some("Definitions_1"));
        assert_eq!(doc.root().attributes().count(), 2);
    }

    #[test]
    fn whitespace_and_comments_dropped() {
        let doc = flow();
        assert_eq!(doc.root().children().len(), 2);
    }

    #[test]
    fn find_all_in_document_order() {
        let doc = flow();
        let ids: Vec<_> = doc
            .find_all("callActivity")
            .filter_map(|e| e.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["CallActivity_1", "CallActivity_2"]);
    }

    #[test]
    fn text_is_unescaped() {
        let doc = flow();
        let property = doc.find_all("property").next().expect("property");
        assert_eq!(property.child("key").expect("key").text(), "namespaceMapping");
        assert_eq!(
            property.child("value").expect("value").text(),
            "xmlns:p=\"urn:x\""
        );
    }

    #[test]
    fn descendants_include_self() {
        let doc = flow();
        let first = doc.root().descendants().next().expect("root");
        assert_eq!(first.name(), "bpmn2:definitions");
        assert_eq!(doc.root().descendants().count(), 9);
    }

    #[test]
    fn cdata_becomes_text() {
        let doc = FlowDocument::parse(b"<s><![CDATA[a < b]]></s>").expect("parse");
        assert_eq!(doc.root().text(), "a < b");
    }

    #[test]
    fn rejects_malformed_documents() {
        for bad in [
            "",
            "<a>",
            "<a></b>",
            "<a/><b/>",
            "text<a/>",
            "<a x='&unknown;'/>",
        ] {
            assert!(
                matches!(
                    FlowDocument::parse(bad.as_bytes()),
                    Err(StructuralError::MalformedFlowDocument(_))
                ),
                "expected failure for {bad:?}"
            );
        }
    }
}
