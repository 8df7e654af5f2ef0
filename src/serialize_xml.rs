//! XML serialization module - re-indents a parsed document into canonical text
//!
//! The writer ignores the original formatting entirely: indentation,
//! attribute wrapping and line breaks all come from [`PrettyConfig`].
//! Whitespace-only text is already gone after parsing and the remaining
//! text is trimmed, so writing the result of a previous write is stable.

use crate::error::Result;
use crate::parse_xml::{NodeId, NodeKind, ParsedDocument};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Elements with more children than this are serialized in parallel
const PARALLEL_CHILD_THRESHOLD: usize = 64;

/// How attributes are laid out once an element has more than
/// `max_attributes_per_line` of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeLayout {
    /// Fill lines with up to `max_attributes_per_line` attributes each
    #[default]
    Wrap,
    /// Put every attribute on its own line
    OnePerLine,
}

/// Formatting options for [`PrettyWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrettyConfig {
    /// Spaces per level; ignored when indenting with tabs
    pub indent_size: usize,
    pub max_attributes_per_line: usize,
    pub use_spaces: bool,
    pub attribute_layout: AttributeLayout,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            max_attributes_per_line: 6,
            use_spaces: true,
            attribute_layout: AttributeLayout::Wrap,
        }
    }
}

pub struct PrettyWriter {
    config: PrettyConfig,
}

impl PrettyWriter {
    pub fn new(config: PrettyConfig) -> Self {
        Self { config }
    }

    fn max_per_line(&self) -> usize {
        self.config.max_attributes_per_line.max(1)
    }

    /// Serializes the whole document into `writer`
    pub fn write<W: Write>(&self, doc: &ParsedDocument, writer: &mut W) -> io::Result<()> {
        self.write_node(doc, doc.root(), writer, 0)
    }

    /// Serializes the whole document to a string
    pub fn write_to_string(&self, doc: &ParsedDocument) -> Result<String> {
        let mut buffer = Vec::with_capacity(1024);
        self.write(doc, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn write_node<W: Write>(&self, doc: &ParsedDocument, id: NodeId, writer: &mut W, depth: usize) -> io::Result<()> {
        let node = doc.node(id);
        match node.kind {
            NodeKind::Document => {
                let starts_with_element = doc
                    .first_child(id)
                    .is_some_and(|c| doc.node(c).is_element());
                if starts_with_element {
                    writer.write_all(b"<?xml version=\"1.0\"?>\n")?;
                }
                for child in doc.children(id) {
                    self.write_node(doc, child, writer, depth)?;
                }
            }
            NodeKind::Element => self.write_element(doc, id, writer, depth)?,
            NodeKind::Text => {
                self.write_text_block(writer, node.value.trim(), depth)?;
            }
            NodeKind::CData => {
                write_indent(writer, &self.config, depth)?;
                writer.write_all(b"<![CDATA[")?;
                writer.write_all(node.value.trim().as_bytes())?;
                writer.write_all(b"]]>\n")?;
            }
            NodeKind::Comment => {
                write_indent(writer, &self.config, depth)?;
                writer.write_all(b"<!-- ")?;
                writer.write_all(node.value.trim().as_bytes())?;
                writer.write_all(b" -->\n")?;
            }
            NodeKind::ProcessingInstruction => {
                write_indent(writer, &self.config, depth)?;
                writer.write_all(b"<?")?;
                writer.write_all(node.name.as_bytes())?;
                if !node.value.is_empty() {
                    writer.write_all(b" ")?;
                    writer.write_all(node.value.as_bytes())?;
                }
                writer.write_all(b"?>\n")?;
            }
            NodeKind::Declaration => {
                writer.write_all(b"<?xml")?;
                for (name, attr) in &node.attributes {
                    write_attribute(writer, name, &attr.value)?;
                }
                writer.write_all(b"?>\n")?;
            }
            NodeKind::Doctype => {
                writer.write_all(b"<!DOCTYPE ")?;
                writer.write_all(node.value.as_bytes())?;
                writer.write_all(b">\n")?;
            }
        }
        Ok(())
    }

    fn write_element<W: Write>(&self, doc: &ParsedDocument, id: NodeId, writer: &mut W, depth: usize) -> io::Result<()> {
        let node = doc.node(id);
        write_indent(writer, &self.config, depth)?;
        writer.write_all(b"<")?;
        writer.write_all(node.name.as_bytes())?;
        self.write_attributes(doc, id, writer, depth)?;

        if node.children.is_empty() {
            writer.write_all(b"/>\n")?;
            return Ok(());
        }

        // a lone text child stays on the tag line unless it spans lines
        if let [only] = node.children.as_slice() {
            let child = doc.node(*only);
            if child.kind == NodeKind::Text {
                let text = child.value.trim();
                writer.write_all(b">")?;
                if text.contains('\n') {
                    writer.write_all(b"\n")?;
                    self.write_text_block(writer, text, depth + 1)?;
                    write_indent(writer, &self.config, depth)?;
                } else {
                    write_escaped_text(writer, text)?;
                }
                return write_closing_tag(writer, &node.name);
            }
        }

        writer.write_all(b">\n")?;

        if node.children.len() > PARALLEL_CHILD_THRESHOLD {
            let child_buffers: io::Result<Vec<Vec<u8>>> = node
                .children
                .par_iter()
                .map(|child| {
                    let mut buf = Vec::with_capacity(4096);
                    self.write_node(doc, *child, &mut buf, depth + 1)?;
                    Ok(buf)
                })
                .collect();

            for buf in child_buffers? {
                writer.write_all(&buf)?;
            }
        } else {
            for child in doc.children(id) {
                self.write_node(doc, child, writer, depth + 1)?;
            }
        }

        write_indent(writer, &self.config, depth)?;
        write_closing_tag(writer, &node.name)
    }

    fn write_attributes<W: Write>(&self, doc: &ParsedDocument, id: NodeId, writer: &mut W, depth: usize) -> io::Result<()> {
        let attributes = &doc.node(id).attributes;
        let max = self.max_per_line();

        // one-per-line moves every attribute off the tag line
        let break_first =
            self.config.attribute_layout == AttributeLayout::OnePerLine && attributes.len() > max;
        let per_line = if break_first { 1 } else { max };

        for (index, (name, attr)) in attributes.iter().enumerate() {
            if (index > 0 && index % per_line == 0) || (index == 0 && break_first) {
                writer.write_all(b"\n")?;
                write_indent(writer, &self.config, depth + 1)?;
                writer.write_all(name.as_bytes())?;
                writer.write_all(b"=\"")?;
                write_escaped_attr(writer, &attr.value)?;
                writer.write_all(b"\"")?;
            } else {
                write_attribute(writer, name, &attr.value)?;
            }
        }
        Ok(())
    }

    /// Writes trimmed text, one indented line per source line
    fn write_text_block<W: Write>(&self, writer: &mut W, text: &str, depth: usize) -> io::Result<()> {
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            write_indent(writer, &self.config, depth)?;
            write_escaped_text(writer, line)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Pretty-prints a parsed document with the given options
///
/// # Arguments
/// * `doc` - The parsed document
/// * `config` - Indentation and attribute wrapping options
///
/// # Returns
/// The re-indented document text
pub fn pretty_print(doc: &ParsedDocument, config: &PrettyConfig) -> Result<String> {
    PrettyWriter::new(*config).write_to_string(doc)
}

fn write_indent<W: Write>(writer: &mut W, config: &PrettyConfig, depth: usize) -> io::Result<()> {
    if config.use_spaces {
        for _ in 0..depth * config.indent_size {
            writer.write_all(b" ")?;
        }
    } else {
        for _ in 0..depth {
            writer.write_all(b"\t")?;
        }
    }
    Ok(())
}

fn write_attribute<W: Write>(writer: &mut W, name: &str, value: &str) -> io::Result<()> {
    writer.write_all(b" ")?;
    writer.write_all(name.as_bytes())?;
    writer.write_all(b"=\"")?;
    write_escaped_attr(writer, value)?;
    writer.write_all(b"\"")
}

fn write_closing_tag<W: Write>(writer: &mut W, name: &str) -> io::Result<()> {
    writer.write_all(b"</")?;
    writer.write_all(name.as_bytes())?;
    writer.write_all(b">\n")
}

/// Escapes special XML characters in attribute values
fn write_escaped_attr<W: Write>(writer: &mut W, input: &str) -> io::Result<()> {
    write_escaped(writer, input, |ch| match ch {
        '&' => Some(b"&amp;" as &[u8]),
        '<' => Some(b"&lt;" as &[u8]),
        '>' => Some(b"&gt;" as &[u8]),
        '"' => Some(b"&quot;" as &[u8]),
        _ => None,
    })
}

fn write_escaped_text<W: Write>(writer: &mut W, input: &str) -> io::Result<()> {
    write_escaped(writer, input, |ch| match ch {
        '&' => Some(b"&amp;" as &[u8]),
        '<' => Some(b"&lt;" as &[u8]),
        '>' => Some(b"&gt;" as &[u8]),
        _ => None,
    })
}

fn write_escaped<W: Write>(
    writer: &mut W,
    input: &str,
    entity_for: impl Fn(char) -> Option<&'static [u8]>,
) -> io::Result<()> {
    let mut last = 0;
    for (idx, ch) in input.char_indices() {
        if let Some(bytes) = entity_for(ch) {
            if last < idx {
                writer.write_all(input[last..idx].as_bytes())?;
            }
            writer.write_all(bytes)?;
            last = idx + ch.len_utf8();
        }
    }

    if last < input.len() {
        writer.write_all(input[last..].as_bytes())?;
    }
    Ok(())
}
