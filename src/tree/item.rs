//! Tree items - the structural projection of a parsed document

use crate::parse_xml::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Stable index of an item inside a [`TreeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeItemId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Element,
    Attribute,
}

/// One node of the structural tree.
///
/// `source` points into the parse arena and is only ever read. Attribute
/// items share their element's `source` and carry the attribute position
/// in `attribute`.
#[derive(Debug, Clone)]
pub struct TreeItem {
    pub label: String,
    pub kind: ItemKind,
    pub source: Option<NodeId>,
    pub attribute: Option<usize>,
    /// Tag name offset for elements, attribute name offset for attributes
    pub offset: usize,
    pub parent: Option<TreeItemId>,
    pub children: Vec<TreeItemId>,
}

impl TreeItem {
    pub fn element(label: impl Into<String>, source: NodeId, offset: usize) -> Self {
        Self {
            label: label.into(),
            kind: ItemKind::Element,
            source: Some(source),
            attribute: None,
            offset,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attribute(label: impl Into<String>, source: NodeId, index: usize, offset: usize) -> Self {
        Self {
            label: label.into(),
            kind: ItemKind::Attribute,
            source: Some(source),
            attribute: Some(index),
            offset,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_attribute(&self) -> bool {
        self.kind == ItemKind::Attribute
    }
}

/// Owns every item of one projection. Index 0 is the sentinel root.
#[derive(Debug, Clone)]
pub struct TreeArena {
    items: Vec<TreeItem>,
}

impl TreeArena {
    pub const ROOT: TreeItemId = TreeItemId(0);

    pub fn new() -> Self {
        let root = TreeItem {
            label: "ROOT".to_string(),
            kind: ItemKind::Element,
            source: None,
            attribute: None,
            offset: 0,
            parent: None,
            children: Vec::new(),
        };
        Self { items: vec![root] }
    }

    pub fn root(&self) -> TreeItemId {
        Self::ROOT
    }

    pub fn item(&self, id: TreeItemId) -> &TreeItem {
        &self.items[id.0]
    }

    pub fn get(&self, id: TreeItemId) -> Option<&TreeItem> {
        self.items.get(id.0)
    }

    /// Number of items including the sentinel root
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.len() <= 1
    }

    pub fn append_child(&mut self, parent: TreeItemId, mut item: TreeItem) -> TreeItemId {
        let id = TreeItemId(self.items.len());
        item.parent = Some(parent);
        self.items.push(item);
        self.items[parent.0].children.push(id);
        id
    }

    pub fn child(&self, parent: TreeItemId, row: usize) -> Option<TreeItemId> {
        self.get(parent)?.children.get(row).copied()
    }

    pub fn child_count(&self, id: TreeItemId) -> usize {
        self.get(id).map_or(0, |item| item.children.len())
    }

    pub fn parent(&self, id: TreeItemId) -> Option<TreeItemId> {
        self.get(id)?.parent
    }

    /// Position of `id` in its parent's child list; 0 for the root
    pub fn row(&self, id: TreeItemId) -> usize {
        self.parent(id)
            .and_then(|p| self.item(p).children.iter().position(|c| *c == id))
            .unwrap_or(0)
    }

    /// Pre-order ids below `id`, excluding `id`
    pub fn descendants(&self, id: TreeItemId) -> Vec<TreeItemId> {
        let mut out = Vec::new();
        let mut stack: Vec<TreeItemId> = self.item(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.item(next).children.iter().rev().copied());
        }
        out
    }

    /// Indented dump of the tree, attributes prefixed with `@`.
    /// Two trees with the same outline have the same shape and labels.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(TreeItemId, usize)> =
            self.item(Self::ROOT).children.iter().rev().map(|c| (*c, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let item = self.item(id);
            let marker = if item.is_attribute() { "@" } else { "" };
            let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), marker, item.label);
            stack.extend(item.children.iter().rev().map(|c| (*c, depth + 1)));
        }
        out
    }
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}
