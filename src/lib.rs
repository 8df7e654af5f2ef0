//! XML editor core: parsing with source offsets, a structural tree model,
//! selection mapping between tree and text, a tabular summarizer and a
//! re-indenting writer.
//!
//! Text flows in through [`EditorSession::set_content`], which parses it,
//! projects the elements into a [`TreeModel`] and keeps both until the next
//! content change. Everything else is derived on demand from that pair.
//!
//! # Example
//! ```
//! use xmlscope::{EditorSession, PrettyConfig};
//!
//! let mut session = EditorSession::default();
//! session.set_content(r#"<a><b x="1"/></a>"#).unwrap();
//!
//! let a = session.tree_model().index(0, 0, None).unwrap();
//! let b = session.tree_model().index(0, 0, Some(a)).unwrap();
//! let range = session.selection_range(&b);
//! assert_eq!(range.slice(session.content()), Some(r#"<b x="1"/>"#));
//!
//! let text = session.indent_document(&PrettyConfig::default()).unwrap();
//! assert!(text.starts_with("<?xml"));
//! ```

pub mod config;
pub mod error;
pub mod offsets;
pub mod parse_xml;
pub mod serialize_xml;
pub mod server;
pub mod session;
pub mod table;
pub mod tree;

pub use config::{ColorTheme, Settings};
pub use error::{Result, XmlError};
pub use offsets::{char_to_byte, locate_in_tree, resolve_range, TextRange};
pub use parse_xml::{parse_document, NodeId, NodeKind, ParsedDocument, XmlNode};
pub use serialize_xml::{pretty_print, AttributeLayout, PrettyConfig, PrettyWriter};
pub use session::EditorSession;
pub use table::{summarize, TableLayout, TableSection};
pub use tree::{build_tree, ModelIndex, ModelObserver, Role, TreeArena, TreeModel, ViewConfig};
