//! Tabular summary of an element: its attributes, and one row per child
//!
//! Child tables of real-world XML tend to be wide and sparse: a few
//! repeated structural children and many one-off tags. Names that occur
//! only once among the children and grandchildren are "unique"; once there
//! are at least `threshold` of them they fold into a single synthetic
//! column instead of getting one column each.

use crate::parse_xml::{NodeId, NodeKind, ParsedDocument};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

pub const ELEMENT_HEADER: &str = "Element";
pub const TEXT_HEADER: &str = "Text";
pub const UNIQUE_SUBTAGS_HEADER: &str = "Unique Subtags";
pub const UNIQUE_ATTRIBUTES_HEADER: &str = "Unique Attributes";

/// One half of the table view: ordered headers and rows aligned to them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSection {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableSection {
    /// Sections without rows are hidden
    pub fn is_visible(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.column(header)?;
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableLayout {
    pub attributes: TableSection,
    pub children: TableSection,
}

impl TableLayout {
    /// Count of synthetic "unique" columns in the children section
    pub fn synthetic_column_count(&self) -> usize {
        self.children
            .headers
            .iter()
            .filter(|h| *h == UNIQUE_SUBTAGS_HEADER || *h == UNIQUE_ATTRIBUTES_HEADER)
            .count()
    }
}

/// Name occurrence counts over the children and grandchildren of a node
struct ScopeCounts {
    tags: IndexMap<String, usize>,
    attributes: IndexMap<String, usize>,
}

impl ScopeCounts {
    fn scan(doc: &ParsedDocument, node: NodeId) -> Self {
        let mut counts = Self {
            tags: IndexMap::new(),
            attributes: IndexMap::new(),
        };
        for child in doc.element_children(node) {
            counts.add(doc, child);
            for grandchild in doc.element_children(child) {
                counts.add(doc, grandchild);
            }
        }
        counts
    }

    fn add(&mut self, doc: &ParsedDocument, id: NodeId) {
        let node = doc.node(id);
        *self.tags.entry(node.name.clone()).or_default() += 1;
        for name in node.attributes.keys() {
            *self.attributes.entry(name.clone()).or_default() += 1;
        }
    }

    fn tag(&self, name: &str) -> usize {
        self.tags.get(name).copied().unwrap_or(0)
    }

    fn attribute(&self, name: &str) -> usize {
        self.attributes.get(name).copied().unwrap_or(0)
    }

    fn unique_tags(&self) -> usize {
        self.tags.values().filter(|c| **c == 1).count()
    }

    fn unique_attributes(&self) -> usize {
        self.attributes.values().filter(|c| **c == 1).count()
    }
}

/// Builds the table view for `node`
///
/// # Arguments
/// * `doc` - The parsed document
/// * `node` - Element to summarize
/// * `threshold` - Minimum number of unique names before they fold into a
///   synthetic column
///
/// # Returns
/// Both table sections; either may be empty
pub fn summarize(doc: &ParsedDocument, node: NodeId, threshold: usize) -> TableLayout {
    if !doc.get(node).is_some_and(|n| n.is_element()) {
        return TableLayout::default();
    }

    let layout = TableLayout {
        attributes: attribute_section(doc, node),
        children: children_section(doc, node, threshold),
    };
    tracing::debug!(
        element = %doc.node(node).name,
        rows = layout.children.rows.len(),
        columns = layout.children.headers.len(),
        "table summarized"
    );
    layout
}

fn attribute_section(doc: &ParsedDocument, node: NodeId) -> TableSection {
    let attributes = &doc.node(node).attributes;
    if attributes.is_empty() {
        return TableSection::default();
    }
    TableSection {
        headers: vec!["Attribute".to_string(), "Value".to_string()],
        rows: attributes
            .iter()
            .map(|(name, attr)| vec![name.clone(), attr.value.clone()])
            .collect(),
    }
}

fn children_section(doc: &ParsedDocument, node: NodeId, threshold: usize) -> TableSection {
    let children: Vec<NodeId> = doc.element_children(node).collect();
    if children.is_empty() {
        return TableSection::default();
    }

    let counts = ScopeCounts::scan(doc, node);
    let fold_tags = counts.unique_tags() >= threshold;
    let fold_attributes = counts.unique_attributes() >= threshold;

    let mut headers: IndexSet<String> = IndexSet::new();
    headers.insert(ELEMENT_HEADER.to_string());

    let mut cells: Vec<IndexMap<String, String>> = Vec::with_capacity(children.len());
    for child in children {
        let child_node = doc.node(child);
        let mut row = IndexMap::new();
        row.insert(ELEMENT_HEADER.to_string(), cell_value(doc, child, &counts));

        let mut folded_attributes = Vec::new();
        for (name, attr) in &child_node.attributes {
            if fold_attributes && counts.attribute(name) == 1 {
                folded_attributes.push(format!("{name} = \"{}\"", attr.value));
            } else {
                push_cell(&mut row, &mut headers, format!("@{name}"), attr.value.clone());
            }
        }
        push_folded(&mut row, &mut headers, UNIQUE_ATTRIBUTES_HEADER, "unique attributes", folded_attributes);

        let text = doc.text(child);
        let text = text.trim();
        if !text.is_empty() {
            push_cell(&mut row, &mut headers, TEXT_HEADER.to_string(), text.to_string());
        }

        let mut folded_tags = Vec::new();
        for grandchild in doc.element_children(child) {
            let name = &doc.node(grandchild).name;
            if fold_tags && counts.tag(name) == 1 {
                folded_tags.push(name.clone());
            } else {
                push_cell(&mut row, &mut headers, name.clone(), cell_value(doc, grandchild, &counts));
            }
        }
        push_folded(&mut row, &mut headers, UNIQUE_SUBTAGS_HEADER, "unique subtags", folded_tags);

        cells.push(row);
    }

    let rows = cells
        .into_iter()
        .map(|mut row| {
            headers
                .iter()
                .map(|h| row.swap_remove(h).unwrap_or_default())
                .collect()
        })
        .collect();

    TableSection {
        headers: headers.into_iter().collect(),
        rows,
    }
}

/// Cell text for an element, picked by its shape
fn cell_value(doc: &ParsedDocument, id: NodeId, counts: &ScopeCounts) -> String {
    let node = doc.node(id);
    match node.children.as_slice() {
        [only] => {
            let child = doc.node(*only);
            match child.kind {
                NodeKind::Text | NodeKind::CData => child.value.trim().to_string(),
                _ => child.name.clone(),
            }
        }
        [] => match counts.tag(&node.name) {
            k if k > 1 => format!("{} ({k} occurrences)", node.name),
            _ => node.name.clone(),
        },
        _ => node.name.clone(),
    }
}

/// Adds a cell, joining values when the same column repeats within a row
fn push_cell(row: &mut IndexMap<String, String>, headers: &mut IndexSet<String>, header: String, value: String) {
    headers.insert(header.clone());
    row.entry(header)
        .and_modify(|existing| {
            existing.push_str(", ");
            existing.push_str(&value);
        })
        .or_insert(value);
}

fn push_folded(
    row: &mut IndexMap<String, String>,
    headers: &mut IndexSet<String>,
    header: &str,
    noun: &str,
    folded: Vec<String>,
) {
    let value = match folded.len() {
        0 => return,
        1 => folded.into_iter().next().unwrap_or_default(),
        n => format!("{n} {noun}"),
    };
    push_cell(row, headers, header.to_string(), value);
}
