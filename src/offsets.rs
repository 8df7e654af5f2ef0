//! Maps tree items back to text ranges, and caret positions to tree items
//!
//! The live buffer may already differ from the text the tree was built
//! from, so every lookup re-searches the text from the recorded offset and
//! gives up quietly (empty range) when the expected markup is not there.
//!
//! Closing tags are found with a same-name counting heuristic rather than a
//! tag-matching stack: an element with N same-named descendants is assumed
//! to close at the (N+1)-th `</name>` after its start. This is exact for
//! nested same-name chains but can miss when same-named descendants are
//! self-closing, because those contribute no `</name>` to skip.

use crate::parse_xml::{NodeId, ParsedDocument};
use crate::tree::item::{ItemKind, TreeArena, TreeItemId};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` in a text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The "not found" result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.start..self.end)
    }

    /// Same range in character positions, for buffers addressed by char
    pub fn to_char_range(&self, text: &str) -> (usize, usize) {
        let chars_before = |pos: usize| text.get(..pos).map_or(0, |s| s.chars().count());
        (chars_before(self.start), chars_before(self.end))
    }
}

/// Byte offset of the `char_pos`-th character of `text`, clamped to the
/// end of the text. Inverse of [`TextRange::to_char_range`].
pub fn char_to_byte(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Text range covered by a tree item, or an empty range when the markup
/// can no longer be found in `text`
pub fn resolve_range(doc: &ParsedDocument, tree: &TreeArena, item: TreeItemId, text: &str) -> TextRange {
    let Some(tree_item) = tree.get(item) else {
        return TextRange::empty();
    };
    let Some(source) = tree_item.source.filter(|s| doc.get(*s).is_some()) else {
        return TextRange::empty();
    };

    let found = match tree_item.kind {
        ItemKind::Element => element_range(doc, source, text),
        ItemKind::Attribute => attribute_range(doc, source, &tree_item.label, tree_item.offset, text),
    };

    found.unwrap_or_else(|| {
        tracing::debug!(label = %tree_item.label, "markup not found in text, skipping highlight");
        TextRange::empty()
    })
}

fn find_from(text: &str, from: usize, pattern: &str) -> Option<usize> {
    text.get(from..)?.find(pattern).map(|pos| pos + from)
}

fn element_range(doc: &ParsedDocument, id: NodeId, text: &str) -> Option<TextRange> {
    let node = doc.node(id);
    let start = node.offset.checked_sub(1)?;

    let end = if doc.child_count(id) == 0 && node.self_closing {
        find_from(text, node.offset, "/>")? + 2
    } else {
        let closing = format!("</{}>", node.name);
        let nested = doc.count_named_descendants(id, &node.name);
        let mut end = node.offset;
        for _ in 0..=nested {
            end = find_from(text, end, &closing)? + closing.len();
        }
        end
    };

    Some(TextRange::new(start, end))
}

fn attribute_range(doc: &ParsedDocument, id: NodeId, name: &str, name_offset: usize, text: &str) -> Option<TextRange> {
    let node = doc.node(id);
    // start at the recorded name so earlier values can't shadow it,
    // and never inside the tag name
    let from = name_offset.max(node.offset + node.name.len());
    if from > text.len() || !text.is_char_boundary(from) {
        return None;
    }

    let escaped = regex::escape(name);
    let name_pattern = Regex::new(&format!(r"\b{escaped}\b")).ok()?;
    let start = name_pattern.find_at(text, from)?.start();

    let pair_pattern = Regex::new(&format!(r#"\b{escaped}\b\s*=\s*("[^"]*"|'[^']*')"#)).ok()?;
    let end = pair_pattern.find_at(text, start)?.end();

    Some(TextRange::new(start, end))
}

/// Deepest item whose name sits under `caret`.
///
/// Compares the caret with each item's stored offset and label length
/// instead of resolving full ranges, so it stays cheap on large trees.
pub fn locate_in_tree(tree: &TreeArena, caret: usize) -> Option<TreeItemId> {
    locate_below(tree, tree.root(), caret)
}

/// Post-order walk (children in order, then the item itself) returning the
/// first hit, so the deepest item wins. Iterative so deep documents can't
/// exhaust the stack.
fn locate_below(tree: &TreeArena, id: TreeItemId, caret: usize) -> Option<TreeItemId> {
    let mut stack = vec![(id, false)];
    while let Some((current, children_done)) = stack.pop() {
        let item = tree.item(current);
        if children_done {
            let hit = item.source.is_some() && item.offset <= caret && caret < item.offset + item.label.len();
            if hit {
                return Some(current);
            }
            continue;
        }
        stack.push((current, true));
        stack.extend(item.children.iter().rev().map(|c| (*c, false)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_xml::parse_document;
    use crate::tree::build_tree;

    fn setup(text: &str) -> (ParsedDocument, TreeArena) {
        let doc = parse_document(text).unwrap();
        let tree = build_tree(&doc);
        (doc, tree)
    }

    fn find_item(tree: &TreeArena, label: &str, nth: usize) -> TreeItemId {
        tree.descendants(tree.root())
            .into_iter()
            .filter(|id| tree.item(*id).label == label)
            .nth(nth)
            .unwrap()
    }

    #[test]
    fn test_self_closing_element_with_attributes() {
        let text = "<root>\n  <config debug=\"true\" verbose=\"false\"/>\n</root>";
        let (doc, tree) = setup(text);
        let config = find_item(&tree, "config", 0);
        let range = resolve_range(&doc, &tree, config, text);
        assert_eq!(range.slice(text), Some(r#"<config debug="true" verbose="false"/>"#));
    }

    #[test]
    fn test_nested_same_name_elements_skip_inner_closings() {
        let text = "<item><item><item>x</item></item></item><after/>";
        let (doc, tree) = setup(text);
        let outer = find_item(&tree, "item", 0);
        let range = resolve_range(&doc, &tree, outer, text);
        assert_eq!(range, TextRange::new(0, text.find("<after/>").unwrap()));

        let middle = find_item(&tree, "item", 1);
        assert_eq!(
            resolve_range(&doc, &tree, middle, text).slice(text),
            Some("<item><item>x</item></item>")
        );
    }

    #[test]
    fn test_explicit_empty_pair_uses_closing_tag() {
        let text = "<a><b></b><c/></a>";
        let (doc, tree) = setup(text);
        let b = find_item(&tree, "b", 0);
        assert_eq!(resolve_range(&doc, &tree, b, text).slice(text), Some("<b></b>"));
    }

    #[test]
    fn test_attribute_range_covers_name_and_value() {
        let text = r#"<server port="8080" host = 'example.org'/>"#;
        let (doc, tree) = setup(text);
        let port = find_item(&tree, "port", 0);
        let host = find_item(&tree, "host", 0);
        assert_eq!(resolve_range(&doc, &tree, port, text).slice(text), Some(r#"port="8080""#));
        assert_eq!(
            resolve_range(&doc, &tree, host, text).slice(text),
            Some("host = 'example.org'")
        );
    }

    #[test]
    fn test_attribute_named_like_its_element() {
        let text = r#"<id id="7"/>"#;
        let (doc, tree) = setup(text);
        let attr = find_item(&tree, "id", 1);
        assert_eq!(resolve_range(&doc, &tree, attr, text).slice(text), Some(r#"id="7""#));
    }

    #[test]
    fn test_diverged_text_gives_empty_range() {
        let text = "<a><b>1</b></a>";
        let (doc, tree) = setup(text);
        let a = find_item(&tree, "a", 0);
        let edited = "<a><b>1</b>";
        assert!(resolve_range(&doc, &tree, a, edited).is_empty());
        assert!(resolve_range(&doc, &tree, a, "").is_empty());
        assert!(resolve_range(&doc, &tree, tree.root(), text).is_empty());
    }

    #[test]
    fn test_locate_prefers_deepest_item() {
        let text = r#"<root><entry key="k1">v</entry></root>"#;
        let (_, tree) = setup(text);

        let entry_name = text.find("entry").unwrap();
        assert_eq!(locate_in_tree(&tree, entry_name + 2), Some(find_item(&tree, "entry", 0)));

        let key_name = text.find("key").unwrap();
        assert_eq!(locate_in_tree(&tree, key_name), Some(find_item(&tree, "key", 0)));

        assert_eq!(locate_in_tree(&tree, 1), Some(find_item(&tree, "root", 0)));
        assert_eq!(locate_in_tree(&tree, text.find('v').unwrap() + 3), None);
    }

    #[test]
    fn test_attribute_name_inside_earlier_value_is_skipped() {
        let text = r#"<a title="see id here" id="7"/>"#;
        let (doc, tree) = setup(text);
        let id = find_item(&tree, "id", 0);
        assert_eq!(resolve_range(&doc, &tree, id, text).slice(text), Some(r#"id="7""#));
        let title = find_item(&tree, "title", 0);
        assert_eq!(
            resolve_range(&doc, &tree, title, text).slice(text),
            Some(r#"title="see id here""#)
        );
    }

    #[test]
    fn test_self_closing_same_name_child_defeats_close_counting() {
        // the inner <item/> is counted but contributes no </item>, so the
        // outer element runs out of closing tags
        let text = "<item><item/></item>";
        let (doc, tree) = setup(text);
        let outer = find_item(&tree, "item", 0);
        assert!(resolve_range(&doc, &tree, outer, text).is_empty());

        let inner = find_item(&tree, "item", 1);
        assert_eq!(resolve_range(&doc, &tree, inner, text).slice(text), Some("<item/>"));
    }

    #[test]
    fn test_locate_in_deeply_nested_document() {
        let depth = 100_000;
        let mut text = "<a>".repeat(depth);
        text.push_str(&"</a>".repeat(depth));
        let (_, tree) = setup(&text);

        let innermost = text.rfind("<a>").unwrap() + 1;
        let found = locate_in_tree(&tree, innermost).unwrap();
        assert_eq!(tree.item(found).offset, innermost);
        assert!(tree.item(found).children.is_empty());
        assert_eq!(tree.len(), depth + 1);
    }

    #[test]
    fn test_char_to_byte_inverts_char_range() {
        let text = "<é><b/></é>";
        let b = text.find("<b").unwrap();
        let (char_start, _) = TextRange::new(b, b + 4).to_char_range(text);
        assert_eq!(char_to_byte(text, char_start), b);
        assert_eq!(char_to_byte(text, 0), 0);
        assert_eq!(char_to_byte(text, 1000), text.len());
    }

    #[test]
    fn test_char_range_conversion() {
        let text = "<é><b/></é>";
        let range = TextRange::new(text.find("<b").unwrap(), text.find("<b").unwrap() + 4);
        assert_eq!(range.to_char_range(text), (3, 7));
    }
}
