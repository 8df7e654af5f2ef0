use xmlscope::{build_tree, parse_document, EditorSession, ParsedDocument, Role, TreeArena};

const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- sample catalog -->
<catalog region="eu" currency="EUR">
    <book id="bk101" lang="en">
        <author>Gambardella, Matthew</author>
        <title>XML Developer's Guide</title>
        <price>44.95</price>
    </book>
    <book id="bk102">
        <author>Ralls, Kim</author>
        <notes><![CDATA[ratings < 3 are hidden]]></notes>
        <tags><tag>fantasy</tag><tag>fiction</tag></tags>
    </book>
    <magazine issue="7"/>
</catalog>"#;

/// Element nesting of the parse tree, written in the same outline format
/// as `TreeArena::outline`
fn source_outline(doc: &ParsedDocument) -> String {
    let mut out = String::new();
    for (id, depth) in doc.traverse(doc.root()) {
        let node = doc.node(id);
        if !node.is_element() {
            continue;
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(&node.name);
        out.push('\n');
        for name in node.attributes.keys() {
            out.push_str(&"  ".repeat(depth + 1));
            out.push('@');
            out.push_str(name);
            out.push('\n');
        }
    }
    out
}

fn compact(xml: &str) -> String {
    xml.lines().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_is_idempotent() {
        let doc = parse_document(CATALOG).unwrap();
        let first = build_tree(&doc);
        let second = build_tree(&doc);
        assert_eq!(first.outline(), second.outline());
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_tree_mirrors_element_nesting() {
        let doc = parse_document(CATALOG).unwrap();
        let tree = build_tree(&doc);
        assert_eq!(tree.outline(), source_outline(&doc));
    }

    #[test]
    fn test_nesting_independent_of_whitespace() {
        let indented = build_tree(&parse_document(CATALOG).unwrap());
        let flat = build_tree(&parse_document(&compact(CATALOG)).unwrap());
        assert_eq!(indented.outline(), flat.outline());
    }

    #[test]
    fn test_attribute_items_keep_source_order() {
        let doc = parse_document(r#"<e zeta="1" alpha="2" mid="3"><child/></e>"#).unwrap();
        let tree = build_tree(&doc);
        let e = tree.child(TreeArena::ROOT, 0).unwrap();
        let labels: Vec<&str> = tree
            .item(e)
            .children
            .iter()
            .map(|c| tree.item(*c).label.as_str())
            .collect();
        assert_eq!(labels, vec!["zeta", "alpha", "mid", "child"]);
    }

    #[test]
    fn test_malformed_xml_exposes_no_rows() {
        let mut session = EditorSession::default();
        session.set_content(CATALOG).unwrap();
        assert_eq!(session.tree_model().row_count(None), 1);

        let err = session.set_content("<a><b></a>").unwrap_err();
        println!("parse error: {}", err);
        assert_eq!(session.tree_model().row_count(None), 0);
        assert!(session.tree_model().index(0, 0, None).is_none());
    }

    #[test]
    fn test_model_walk_matches_outline() {
        let mut session = EditorSession::default();
        session.set_content(CATALOG).unwrap();
        let model = session.tree_model();

        fn walk(model: &xmlscope::TreeModel, parent: Option<xmlscope::ModelIndex>, depth: usize, out: &mut String) {
            for row in 0..model.row_count(parent) {
                let index = model.index(row, 0, parent).unwrap();
                let item = model.item(&index).unwrap();
                out.push_str(&"  ".repeat(depth));
                if item.is_attribute() {
                    out.push('@');
                }
                out.push_str(&model.data(&index, Role::Display).unwrap());
                out.push('\n');
                assert_eq!(model.parent(&index), parent);
                walk(model, Some(index), depth + 1, out);
            }
        }

        let mut walked = String::new();
        walk(model, None, 0, &mut walked);
        assert_eq!(walked, model.arena().outline());
    }
}
