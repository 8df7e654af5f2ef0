use xmlscope::{build_tree, parse_document, pretty_print, AttributeLayout, NodeKind, ParsedDocument, PrettyConfig};

const INVENTORY: &str = r#"<inventory site="north" updated="2024-03-01">
  <part sku="A-1" qty="4"><name>Bolt &amp; nut</name><bin/></part>
      <part sku="B-7" qty="0">
  <name>Washer</name>
  <note>
     discontinued
     see catalog
  </note>
  </part>
  <empty></empty>
  <!-- end of list -->
</inventory>"#;

fn config(indent_size: usize) -> PrettyConfig {
    PrettyConfig {
        indent_size,
        ..PrettyConfig::default()
    }
}

/// Element names, attributes and normalised text in document order
fn structure(doc: &ParsedDocument) -> Vec<String> {
    doc.traverse(doc.root())
        .filter(|(id, _)| doc.node(*id).kind == NodeKind::Element)
        .map(|(id, depth)| {
            let node = doc.node(id);
            let attributes: Vec<String> = node
                .attributes
                .iter()
                .map(|(name, attr)| format!("{}={}", name, attr.value))
                .collect();
            let text = doc.text(id);
            let words: Vec<&str> = text.split_whitespace().collect();
            format!("{} {} [{}] {}", depth, node.name, attributes.join(","), words.join(" "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_text_child_collapses_inline() {
        let doc = parse_document("<root><item>hello</item></root>").unwrap();
        let out = pretty_print(&doc, &config(2)).unwrap();
        let body = out.strip_prefix("<?xml version=\"1.0\"?>\n").unwrap();
        assert_eq!(body, "<root>\n  <item>hello</item>\n</root>\n");
    }

    #[test]
    fn test_round_trip_keeps_structure_and_text() {
        let original = parse_document(INVENTORY).unwrap();
        for config in [
            config(0),
            config(3),
            PrettyConfig {
                use_spaces: false,
                ..PrettyConfig::default()
            },
            PrettyConfig {
                max_attributes_per_line: 1,
                attribute_layout: AttributeLayout::OnePerLine,
                ..PrettyConfig::default()
            },
        ] {
            let printed = pretty_print(&original, &config).unwrap();
            let reparsed = parse_document(&printed).unwrap();
            assert_eq!(structure(&original), structure(&reparsed), "config {:?}", config);
            assert_eq!(
                build_tree(&original).outline(),
                build_tree(&reparsed).outline()
            );
        }
    }

    #[test]
    fn test_childless_elements_never_get_closing_tags() {
        let doc = parse_document(INVENTORY).unwrap();
        let out = pretty_print(&doc, &config(2)).unwrap();
        assert!(out.contains("<bin/>"));
        assert!(out.contains("<empty/>"));
        assert!(!out.contains("</empty>"));
        assert!(!out.contains("</bin>"));
    }

    #[test]
    fn test_inventory_snapshot() {
        let doc = parse_document(INVENTORY).unwrap();
        let out = pretty_print(&doc, &config(2)).unwrap();
        insta::assert_snapshot!(out, @r###"
        <?xml version="1.0"?>
        <inventory site="north" updated="2024-03-01">
          <part sku="A-1" qty="4">
            <name>Bolt &amp; nut</name>
            <bin/>
          </part>
          <part sku="B-7" qty="0">
            <name>Washer</name>
            <note>
              discontinued
              see catalog
            </note>
          </part>
          <empty/>
          <!-- end of list -->
        </inventory>
        "###);
    }

    #[test]
    fn test_wrapped_attributes_snapshot() {
        let doc = parse_document(r#"<svg width="10" height="10" x="0" y="0" fill="none"><rect/></svg>"#).unwrap();
        let out = pretty_print(
            &doc,
            &PrettyConfig {
                indent_size: 2,
                max_attributes_per_line: 2,
                ..PrettyConfig::default()
            },
        )
        .unwrap();
        insta::assert_snapshot!(out, @r###"
        <?xml version="1.0"?>
        <svg width="10" height="10"
          x="0" y="0"
          fill="none">
          <rect/>
        </svg>
        "###);
    }

    #[test]
    fn test_prolog_is_kept_when_present() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE note>\n<note/>";
        let out = pretty_print(&parse_document(xml).unwrap(), &config(2)).unwrap();
        assert_eq!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE note>\n<note/>\n");
    }
}
