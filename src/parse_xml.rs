//! XML parse adapter - turns raw text into an arena of nodes with source offsets
//!
//! The reader is quick-xml driven over the borrowed input string. Every node
//! remembers where its parse began so the offset resolver can find it again
//! in the live text buffer.

use crate::error::{Result, XmlError};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// Stable index of a node inside a [`ParsedDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Kind of a parsed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Element,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    Declaration,
    Doctype,
}

/// Attribute value plus the byte offset of the attribute name in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub value: String,
    pub name_offset: usize,
}

/// A single node of the parse tree
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Tag name for elements, target for processing instructions
    pub name: String,
    /// Content for text, CDATA, comments, PIs and doctypes
    pub value: String,
    /// Attributes in source order
    pub attributes: IndexMap<String, XmlAttribute>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// For elements: byte offset just past the opening `<`.
    /// For everything else: byte offset where the node starts.
    pub offset: usize,
    /// Element was written as `<name/>` rather than `<name></name>`
    pub self_closing: bool,
}

impl XmlNode {
    fn new(kind: NodeKind, parent: Option<NodeId>, offset: usize) -> Self {
        Self {
            kind,
            name: String::new(),
            value: String::new(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent,
            offset,
            self_closing: false,
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }
}

/// Immutable parse result. Index 0 is always the document node.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    nodes: Vec<XmlNode>,
}

impl ParsedDocument {
    pub const ROOT: NodeId = NodeId(0);

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> &XmlNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.iter().copied()
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(move |c| self.node(*c).is_element())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    /// First element directly under the document node
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(Self::ROOT).next()
    }

    /// Concatenated direct text and CDATA content of a node
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            let node = self.node(child);
            if matches!(node.kind, NodeKind::Text | NodeKind::CData) {
                out.push_str(&node.value);
            }
        }
        out
    }

    /// Pre-order walk over the descendants of `id` (not `id` itself).
    ///
    /// Depth 0 means direct child of `id`, so walking from the document
    /// node yields the top-level element at depth 0.
    pub fn traverse(&self, id: NodeId) -> Descendants<'_> {
        let stack = self.node(id).children.iter().rev().map(|c| (*c, 0)).collect();
        Descendants { doc: self, stack }
    }

    /// Number of elements below `id` whose tag is `name`
    pub fn count_named_descendants(&self, id: NodeId, name: &str) -> usize {
        self.traverse(id)
            .filter(|(n, _)| {
                let node = self.node(*n);
                node.is_element() && node.name == name
            })
            .count()
    }

    fn push(&mut self, node: XmlNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }
}

/// Iterator returned by [`ParsedDocument::traverse`]
pub struct Descendants<'a> {
    doc: &'a ParsedDocument,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Descendants<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        for child in self.doc.node(id).children.iter().rev() {
            self.stack.push((*child, depth + 1));
        }
        Some((id, depth))
    }
}

/// Parses XML text into a [`ParsedDocument`]
///
/// # Arguments
/// * `text` - The complete document text
///
/// # Returns
/// * `Result<ParsedDocument>` - The node arena or the first error found.
///   No partial document is ever returned.
///
/// # Example
/// ```
/// let doc = xmlscope::parse_document("<a x=\"1\"><b/></a>").unwrap();
/// let a = doc.document_element().unwrap();
/// assert_eq!(doc.node(a).name, "a");
/// assert_eq!(doc.node(a).offset, 1);
/// ```
pub fn parse_document(text: &str) -> Result<ParsedDocument> {
    DocumentParser::new(text).parse()
}

struct DocumentParser<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    doc: ParsedDocument,
    /// Open elements, innermost last
    stack: Vec<NodeId>,
}

impl<'a> DocumentParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.trim_text(false);
        // End names are verified against our own stack for better errors
        reader.check_end_names(false);
        let document = XmlNode::new(NodeKind::Document, None, 0);
        Self {
            source,
            reader,
            doc: ParsedDocument {
                nodes: vec![document],
            },
            stack: Vec::new(),
        }
    }

    fn parent(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(ParsedDocument::ROOT)
    }

    fn parse(mut self) -> Result<ParsedDocument> {
        loop {
            let event_start = self.reader.buffer_position() as usize;
            let event = self.reader.read_event().map_err(|e| XmlError::Syntax {
                message: e.to_string(),
                position: self.reader.buffer_position() as usize,
            })?;

            match event {
                Event::Start(start) => {
                    let id = self.handle_element(&start, event_start, false)?;
                    self.stack.push(id);
                }
                Event::Empty(start) => {
                    self.handle_element(&start, event_start, true)?;
                }
                Event::End(end) => {
                    let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let Some(open) = self.stack.pop() else {
                        return Err(XmlError::UnexpectedEndTag {
                            name: found,
                            position: event_start,
                        });
                    };
                    let expected = &self.doc.node(open).name;
                    if *expected != found {
                        return Err(XmlError::MismatchedEndTag {
                            expected: expected.clone(),
                            found,
                            position: event_start,
                        });
                    }
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| XmlError::Syntax {
                        message: e.to_string(),
                        position: event_start,
                    })?;
                    // whitespace between tags is formatting, not content
                    if value.trim().is_empty() {
                        continue;
                    }
                    if self.stack.is_empty() {
                        tracing::debug!(offset = event_start, "ignoring text outside the document element");
                        continue;
                    }
                    let mut node = XmlNode::new(NodeKind::Text, Some(self.parent()), event_start);
                    node.value = value.into_owned();
                    self.doc.push(node);
                }
                Event::CData(cdata) => {
                    let raw: &[u8] = &cdata;
                    let mut node = XmlNode::new(NodeKind::CData, Some(self.parent()), event_start);
                    node.value = String::from_utf8_lossy(raw).into_owned();
                    self.doc.push(node);
                }
                Event::Comment(comment) => {
                    let raw: &[u8] = &comment;
                    let mut node = XmlNode::new(NodeKind::Comment, Some(self.parent()), event_start);
                    node.value = String::from_utf8_lossy(raw).into_owned();
                    self.doc.push(node);
                }
                Event::PI(pi) => {
                    let raw: &[u8] = &pi;
                    let content = String::from_utf8_lossy(raw);
                    let content = content.trim();
                    let (target, data) = content
                        .split_once(char::is_whitespace)
                        .unwrap_or((content, ""));
                    let mut node = XmlNode::new(
                        NodeKind::ProcessingInstruction,
                        Some(self.parent()),
                        event_start,
                    );
                    node.name = target.to_string();
                    node.value = data.trim().to_string();
                    self.doc.push(node);
                }
                Event::Decl(_) => {
                    let lt = tag_open_before(self.source, event_start);
                    let mut node = XmlNode::new(NodeKind::Declaration, Some(self.parent()), lt);
                    node.name = "xml".to_string();
                    // `<?xml` is five bytes; pseudo-attributes follow
                    for attr in scan_attributes(self.source, lt + 5) {
                        node.attributes.insert(
                            attr.name.to_string(),
                            XmlAttribute {
                                value: attr.value.to_string(),
                                name_offset: attr.name_offset,
                            },
                        );
                    }
                    self.doc.push(node);
                }
                Event::DocType(doctype) => {
                    let raw: &[u8] = &doctype;
                    let mut node = XmlNode::new(NodeKind::Doctype, Some(self.parent()), event_start);
                    node.value = String::from_utf8_lossy(raw).trim().to_string();
                    self.doc.push(node);
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = self.stack.last() {
            let node = self.doc.node(*open);
            return Err(XmlError::UnclosedElement {
                name: node.name.clone(),
                position: node.offset.saturating_sub(1),
            });
        }
        if self.doc.document_element().is_none() {
            return Err(XmlError::EmptyDocument);
        }

        Ok(self.doc)
    }

    fn handle_element(
        &mut self,
        start: &BytesStart<'_>,
        event_start: usize,
        self_closing: bool,
    ) -> Result<NodeId> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let offset = tag_open_before(self.source, event_start) + 1;
        let scanned = scan_attributes(self.source, offset + name.len());

        let mut node = XmlNode::new(NodeKind::Element, Some(self.parent()), offset);
        node.self_closing = self_closing;

        for (index, attr) in start.attributes().enumerate() {
            let attr = attr.map_err(|e| XmlError::Syntax {
                message: e.to_string(),
                position: offset,
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| XmlError::Syntax {
                message: e.to_string(),
                position: offset,
            })?;
            let name_offset = scanned
                .iter()
                .find(|s| s.name == key)
                .or_else(|| scanned.get(index))
                .map(|s| s.name_offset)
                .unwrap_or(offset);
            node.attributes.insert(
                key,
                XmlAttribute {
                    value: value.into_owned(),
                    name_offset,
                },
            );
        }

        node.name = name;
        Ok(self.doc.push(node))
    }
}

/// Position of the `<` that opens the markup at or just before `position`.
///
/// Depending on reader state the event start sits either on the `<` or one
/// byte past it.
fn tag_open_before(source: &str, position: usize) -> usize {
    let bytes = source.as_bytes();
    if bytes.is_empty() {
        return 0;
    }
    let upto = position.min(bytes.len() - 1);
    bytes[..=upto]
        .iter()
        .rposition(|b| *b == b'<')
        .unwrap_or(position)
}

#[derive(Debug)]
struct ScannedAttribute<'a> {
    name: &'a str,
    value: &'a str,
    name_offset: usize,
}

/// Walks the attribute list of a tag starting at byte `from` (just after the
/// tag name) and reports each attribute's name position. Stops at `>`, `/>`
/// or `?>`. Quoted values are skipped as a whole so `=` or names inside
/// them are never mistaken for attributes.
fn scan_attributes(source: &str, from: usize) -> Vec<ScannedAttribute<'_>> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = from;

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len || matches!(bytes[i], b'>' | b'/' | b'?') {
            break;
        }

        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
            i += 1;
        }
        if i == name_start {
            break;
        }
        let name = &source[name_start..i];

        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len || bytes[i] != b'=' {
            out.push(ScannedAttribute { name, value: "", name_offset: name_start });
            continue;
        }
        i += 1;
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len || !matches!(bytes[i], b'"' | b'\'') {
            break;
        }
        let quote = bytes[i];
        let value_start = i + 1;
        let value_end = bytes[value_start..]
            .iter()
            .position(|b| *b == quote)
            .map(|p| value_start + p)
            .unwrap_or(len);
        out.push(ScannedAttribute {
            name,
            value: &source[value_start..value_end],
            name_offset: name_start,
        });
        i = value_end + 1;
    }

    out
}
