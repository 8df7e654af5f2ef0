//! Builds a [`TreeArena`] from a parsed document
//!
//! Walks the parse tree in document order and decides for each element,
//! from its depth alone, whether it is the first child of the previous
//! element, its sibling, or belongs to an ancestor further up.

use crate::parse_xml::{NodeId, ParsedDocument};
use crate::tree::item::{TreeArena, TreeItem, TreeItemId};

struct TreeBuilder {
    arena: TreeArena,
    current_parent: TreeItemId,
    last_node: TreeItemId,
    last_depth: Option<usize>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            arena: TreeArena::new(),
            current_parent: TreeArena::ROOT,
            last_node: TreeArena::ROOT,
            last_depth: None,
        }
    }

    fn visit_element(&mut self, doc: &ParsedDocument, id: NodeId, depth: usize) {
        match self.last_depth {
            Some(last) if depth == last => {
                // sibling of the previous element
            }
            Some(last) if depth < last => {
                // climb back up to the branch this element belongs to
                let mut gap = last;
                while depth < gap {
                    self.current_parent = self
                        .arena
                        .parent(self.current_parent)
                        .unwrap_or(TreeArena::ROOT);
                    gap -= 1;
                }
            }
            _ => {
                // first child of the previous element
                self.current_parent = self.last_node;
            }
        }

        let node = doc.node(id);
        let item = self
            .arena
            .append_child(self.current_parent, TreeItem::element(&node.name, id, node.offset));

        for (index, (name, attr)) in node.attributes.iter().enumerate() {
            self.arena
                .append_child(item, TreeItem::attribute(name, id, index, attr.name_offset));
        }

        self.last_node = item;
        self.last_depth = Some(depth);
    }
}

/// Projects the elements of `doc` into a fresh [`TreeArena`].
///
/// Only elements become items; each gets its attributes as leading leaf
/// children in source order. Text, comments and the like are skipped.
pub fn build_tree(doc: &ParsedDocument) -> TreeArena {
    let mut builder = TreeBuilder::new();
    for (id, depth) in doc.traverse(doc.root()) {
        if doc.node(id).is_element() {
            builder.visit_element(doc, id, depth);
        }
    }
    builder.arena
}
