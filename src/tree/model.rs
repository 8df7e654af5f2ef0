//! Index-addressed tree model consumed by tree views
//!
//! Views never see arena pointers. They get [`ModelIndex`] handles that
//! carry the generation of the tree they were issued for, so a handle kept
//! across a rebuild resolves to nothing instead of to the wrong item.

use crate::config::ColorTheme;
use crate::parse_xml::ParsedDocument;
use crate::tree::builder::build_tree;
use crate::tree::item::{ItemKind, TreeArena, TreeItem, TreeItemId};
use serde::{Deserialize, Serialize};

/// Receives the bracketing notifications around a full model reset
pub trait ModelObserver {
    fn begin_reset(&mut self);
    fn end_reset(&mut self);
}

/// Opaque handle to one cell of the tree model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    item: TreeItemId,
    generation: u64,
}

impl ModelIndex {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Display,
    Decoration,
}

/// View-facing settings the model needs when answering `data` queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewConfig {
    pub color_theme: ColorTheme,
}

pub struct TreeModel {
    arena: TreeArena,
    generation: u64,
    view: ViewConfig,
    observers: Vec<Box<dyn ModelObserver>>,
}

impl TreeModel {
    pub fn new(view: ViewConfig) -> Self {
        Self {
            arena: TreeArena::new(),
            generation: 0,
            view,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ModelObserver>) {
        self.observers.push(observer);
    }

    pub fn arena(&self) -> &TreeArena {
        &self.arena
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view_config(&self) -> ViewConfig {
        self.view
    }

    /// Replace the whole tree with a projection of `doc`, as one reset
    pub fn rebuild(&mut self, doc: &ParsedDocument) {
        self.reset_with(build_tree(doc));
        tracing::debug!(
            items = self.arena.len() - 1,
            generation = self.generation,
            "tree model rebuilt"
        );
    }

    /// Drop every item, leaving only the sentinel root
    pub fn clear(&mut self) {
        self.reset_with(TreeArena::new());
    }

    fn reset_with(&mut self, arena: TreeArena) {
        for observer in &mut self.observers {
            observer.begin_reset();
        }
        self.arena = arena;
        self.generation += 1;
        for observer in &mut self.observers {
            observer.end_reset();
        }
    }

    pub fn on_settings_changed(&mut self, view: ViewConfig) {
        self.view = view;
    }

    fn parent_item(&self, parent: Option<ModelIndex>) -> Option<TreeItemId> {
        match parent {
            None => Some(TreeArena::ROOT),
            Some(index) => self.item_id(&index),
        }
    }

    pub fn index(&self, row: usize, column: usize, parent: Option<ModelIndex>) -> Option<ModelIndex> {
        if column >= self.column_count(parent) {
            return None;
        }
        let parent_item = self.parent_item(parent)?;
        let item = self.arena.child(parent_item, row)?;
        Some(ModelIndex {
            row,
            column,
            item,
            generation: self.generation,
        })
    }

    /// Parent handle, `None` when `index` is top level or stale
    pub fn parent(&self, index: &ModelIndex) -> Option<ModelIndex> {
        let item = self.item_id(index)?;
        let parent = self.arena.parent(item)?;
        if parent == TreeArena::ROOT {
            return None;
        }
        self.index_from_item(parent)
    }

    pub fn row_count(&self, parent: Option<ModelIndex>) -> usize {
        if parent.is_some_and(|p| p.column > 0) {
            return 0;
        }
        self.parent_item(parent)
            .map_or(0, |item| self.arena.child_count(item))
    }

    pub fn column_count(&self, _parent: Option<ModelIndex>) -> usize {
        1
    }

    pub fn data(&self, index: &ModelIndex, role: Role) -> Option<String> {
        let item = self.item(index)?;
        match role {
            Role::Display => Some(item.label.clone()),
            Role::Decoration => Some(self.decoration(item)),
        }
    }

    /// Icon resource for an item, picked by kind, child count and theme
    fn decoration(&self, item: &TreeItem) -> String {
        let icon = match item.kind {
            ItemKind::Attribute => "attribute",
            ItemKind::Element if item.children.is_empty() => "element-leaf",
            ItemKind::Element => "element",
        };
        format!("icons/{}/{}.png", self.view.color_theme.as_str(), icon)
    }

    pub fn item_id(&self, index: &ModelIndex) -> Option<TreeItemId> {
        if index.generation != self.generation {
            return None;
        }
        self.arena.get(index.item).map(|_| index.item)
    }

    pub fn item(&self, index: &ModelIndex) -> Option<&TreeItem> {
        self.item_id(index).map(|id| self.arena.item(id))
    }

    /// Handle for a known item; `None` for the sentinel root
    pub fn index_from_item(&self, item: TreeItemId) -> Option<ModelIndex> {
        if item == TreeArena::ROOT || self.arena.get(item).is_none() {
            return None;
        }
        Some(ModelIndex {
            row: self.arena.row(item),
            column: 0,
            item,
            generation: self.generation,
        })
    }

    /// Handles from the top level down to `index`, for expanding a view
    pub fn ancestry(&self, index: &ModelIndex) -> Vec<ModelIndex> {
        let mut path = vec![*index];
        let mut current = *index;
        while let Some(parent) = self.parent(&current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_xml::parse_document;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<&'static str>>>);

    impl ModelObserver for Recorder {
        fn begin_reset(&mut self) {
            self.0.borrow_mut().push("begin");
        }
        fn end_reset(&mut self) {
            self.0.borrow_mut().push("end");
        }
    }

    fn model_for(xml: &str) -> TreeModel {
        let mut model = TreeModel::default();
        model.rebuild(&parse_document(xml).unwrap());
        model
    }

    #[test]
    fn test_rebuild_and_clear_are_single_resets() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut model = TreeModel::default();
        model.add_observer(Box::new(Recorder(events.clone())));

        model.rebuild(&parse_document("<a><b/><c/><d/></a>").unwrap());
        assert_eq!(*events.borrow(), vec!["begin", "end"]);

        model.clear();
        assert_eq!(*events.borrow(), vec!["begin", "end", "begin", "end"]);
        assert_eq!(model.row_count(None), 0);
    }

    #[test]
    fn test_index_parent_round_trip() {
        let model = model_for(r#"<a k="v"><b/><c><d/></c></a>"#);
        let a = model.index(0, 0, None).unwrap();
        assert_eq!(model.row_count(Some(a)), 3);

        let c = model.index(2, 0, Some(a)).unwrap();
        assert_eq!(model.data(&c, Role::Display).as_deref(), Some("c"));
        assert_eq!(model.parent(&c), Some(a));
        assert_eq!(model.parent(&a), None);

        let d = model.index(0, 0, Some(c)).unwrap();
        let id = model.item_id(&d).unwrap();
        assert_eq!(model.index_from_item(id), Some(d));
        assert_eq!(model.ancestry(&d), vec![a, c, d]);
    }

    #[test]
    fn test_out_of_range_requests() {
        let model = model_for("<a/>");
        assert!(model.index(1, 0, None).is_none());
        assert!(model.index(0, 1, None).is_none());
        let a = model.index(0, 0, None).unwrap();
        assert_eq!(model.row_count(Some(a)), 0);
        assert_eq!(model.column_count(None), 1);
    }

    #[test]
    fn test_stale_handles_do_not_resolve() {
        let mut model = model_for("<a><b/></a>");
        let a = model.index(0, 0, None).unwrap();
        model.rebuild(&parse_document("<x/>").unwrap());
        assert!(model.item(&a).is_none());
        assert!(model.data(&a, Role::Display).is_none());
    }

    #[test]
    fn test_decoration_follows_theme_and_kind() {
        let mut model = model_for(r#"<a k="v"><b/></a>"#);
        let a = model.index(0, 0, None).unwrap();
        let k = model.index(0, 0, Some(a)).unwrap();
        let b = model.index(1, 0, Some(a)).unwrap();
        assert_eq!(model.data(&a, Role::Decoration).unwrap(), "icons/light/element.png");
        assert_eq!(model.data(&k, Role::Decoration).unwrap(), "icons/light/attribute.png");
        assert_eq!(model.data(&b, Role::Decoration).unwrap(), "icons/light/element-leaf.png");

        model.on_settings_changed(ViewConfig { color_theme: ColorTheme::Dark });
        assert_eq!(model.data(&a, Role::Decoration).unwrap(), "icons/dark/element.png");
    }
}
