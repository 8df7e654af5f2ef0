//! Editor session: the text buffer, its parse and the tree model
//!
//! The session is the only owner of the parsed document and the tree. Every
//! content change replaces both wholesale, so tree items never point into a
//! stale parse.

use crate::error::{Result, XmlError};
use crate::offsets::{self, TextRange};
use crate::parse_xml::{parse_document, ParsedDocument};
use crate::serialize_xml::{pretty_print, PrettyConfig};
use crate::table::{self, TableLayout};
use crate::tree::{ModelIndex, TreeModel, ViewConfig};

#[derive(Default)]
pub struct EditorSession {
    content: String,
    document: Option<ParsedDocument>,
    model: TreeModel,
}

impl EditorSession {
    pub fn new(view: ViewConfig) -> Self {
        Self {
            content: String::new(),
            document: None,
            model: TreeModel::new(view),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn document(&self) -> Option<&ParsedDocument> {
        self.document.as_ref()
    }

    pub fn tree_model(&self) -> &TreeModel {
        &self.model
    }

    /// Replaces the buffer and rebuilds the tree from it.
    ///
    /// On a parse error the tree is cleared and the error returned; the new
    /// text is still kept as the buffer content.
    pub fn set_content(&mut self, text: impl Into<String>) -> Result<()> {
        self.content = text.into();
        match parse_document(&self.content) {
            Ok(doc) => {
                self.model.rebuild(&doc);
                self.document = Some(doc);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "parse failed, clearing tree");
                self.document = None;
                self.model.clear();
                Err(err)
            }
        }
    }

    /// Range of the item behind `index` in the stored content
    pub fn selection_range(&self, index: &ModelIndex) -> TextRange {
        self.selection_range_in(index, &self.content)
    }

    /// Range of the item behind `index` in `text`, which may have been
    /// edited since the last parse
    pub fn selection_range_in(&self, index: &ModelIndex, text: &str) -> TextRange {
        let (Some(doc), Some(item)) = (self.document.as_ref(), self.model.item_id(index)) else {
            return TextRange::empty();
        };
        offsets::resolve_range(doc, self.model.arena(), item, text)
    }

    /// Tree handle for the deepest item whose name sits under `caret`
    pub fn locate_in_tree(&self, caret: usize) -> Option<ModelIndex> {
        let item = offsets::locate_in_tree(self.model.arena(), caret)?;
        self.model.index_from_item(item)
    }

    /// Table view for the element behind `index`. Attribute items show
    /// the table of the element that owns them.
    pub fn table_for(&self, index: &ModelIndex, threshold: usize) -> TableLayout {
        let (Some(doc), Some(item)) = (self.document.as_ref(), self.model.item(index)) else {
            return TableLayout::default();
        };
        match item.source {
            Some(source) => table::summarize(doc, source, threshold),
            None => TableLayout::default(),
        }
    }

    /// Pretty-prints the current document and makes the result the new
    /// content, reparsed so offsets match the new text.
    pub fn indent_document(&mut self, config: &PrettyConfig) -> Result<String> {
        let doc = self.document.as_ref().ok_or(XmlError::NoDocument)?;
        let text = pretty_print(doc, config)?;
        self.set_content(text.clone())?;
        Ok(text)
    }

    pub fn on_settings_changed(&mut self, view: ViewConfig) {
        self.model.on_settings_changed(view);
    }

    /// Drops the buffer and the tree
    pub fn close(&mut self) {
        self.content.clear();
        self.document = None;
        self.model.clear();
    }
}
