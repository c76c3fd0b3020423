//! Tagged-tree document I/O
//!
//! The editable artefact is a plain hierarchical XML document; this module
//! reads and writes it as an untyped [`XmlNode`] tree over the quick-xml
//! event API. The typed layers above map nodes to and from the manual and
//! layout models.

use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::{Error, Result};

/// One element of the document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Concatenated, whitespace-trimmed text content.
    pub text: String,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn require_attr(&self, name: &'static str) -> Result<&str> {
        self.attr(name).ok_or_else(|| Error::MissingAttribute {
            tag: self.tag.clone(),
            attr: name,
        })
    }

    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    pub fn child_named(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// The single child this element must carry.
    pub fn only_child(&self, tag: &'static str) -> Result<&XmlNode> {
        self.child_named(tag).ok_or(Error::MissingElement(tag))
    }

    /// Parse a complete document; returns the root element.
    pub fn parse(text: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(node_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let node = node_from_start(&start)?;
                    attach(&mut stack, &mut root, node);
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or(Error::MissingElement("document root"))?;
                    attach(&mut stack, &mut root, node);
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(text.unescape()?.trim());
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text
                            .push_str(String::from_utf8_lossy(&data.into_inner()).trim());
                    }
                }
                Event::Eof => break,
                // Declarations, comments and processing instructions carry
                // no document content.
                _ => {}
            }
        }

        root.ok_or(Error::MissingElement("document root"))
    }

    /// Serialize as an indented document with an XML declaration.
    pub fn to_document_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_node(&mut writer, self)?;
        let buf = writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| Error::Io(std::io::Error::other(e)))
    }
}

fn node_from_start(start: &BytesStart<'_>) -> Result<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr?;
        node.attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(node)
}

fn attach(stack: &mut Vec<XmlNode>, root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            // Later roots shadow earlier ones; well-formed XML has one.
            *root = Some(node);
        }
    }
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &XmlNode) -> Result<()> {
    let mut start = BytesStart::new(&node.tag);
    for (key, value) in &node.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !node.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&node.text)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(&node.tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_and_nesting() {
        let doc = r#"<?xml version="1.0"?>
            <Manual>
              <Region region="EUR">
                <Pages lang="fr"/>
              </Region>
            </Manual>"#;
        let root = XmlNode::parse(doc).unwrap();
        assert_eq!(root.tag, "Manual");
        let region = root.only_child("Region").unwrap();
        assert_eq!(region.attr("region"), Some("EUR"));
        assert_eq!(
            region.only_child("Pages").unwrap().attr("lang"),
            Some("fr")
        );
    }

    #[test]
    fn test_text_content_is_trimmed() {
        let root = XmlNode::parse("<Image name=\"a\">\n  6P6A\n</Image>").unwrap();
        assert_eq!(root.text, "6P6A");
    }

    #[test]
    fn test_roundtrip_through_string() {
        let node = XmlNode::new("Manual")
            .with_child(
                XmlNode::new("ImageArcs").with_child(
                    XmlNode::new("ImageArc")
                        .with_attr("name", "Common_texture")
                        .with_child(XmlNode::new("Image").with_attr("name", "img").with_text("4A")),
                ),
            )
            .with_child(XmlNode::new("BcmaInfo"));
        let text = node.to_document_string().unwrap();
        assert_eq!(XmlNode::parse(&text).unwrap(), node);
    }

    #[test]
    fn test_escaped_values_survive() {
        let node = XmlNode::new("Data")
            .with_attr("name", "a<b&c")
            .with_text("x > y & z");
        let text = node.to_document_string().unwrap();
        assert_eq!(XmlNode::parse(&text).unwrap(), node);
    }

    #[test]
    fn test_missing_attr_error() {
        let node = XmlNode::new("Pages");
        assert!(matches!(
            node.require_attr("lang"),
            Err(Error::MissingAttribute { .. })
        ));
    }
}
