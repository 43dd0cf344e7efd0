#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Generic XML tree for layered-folia.
//!
//! The document model in `layered-folia` never talks to an XML parser
//! directly. It consumes and produces the small tree defined here: elements
//! with an ordered attribute list, ordered children and raw text, comment and
//! processing-instruction leaves. Every element remembers the (1-based) line
//! it started on so that diagnostics can point back into the source.
//!
//! ## Example
//!
//! ```
//! use layered_folia_xml::{parse, XmlChild};
//!
//! let doc = parse(r#"<s xml:id="s.1"><w><t>De</t></w></s>"#).unwrap();
//! assert_eq!(doc.root.name, "s");
//! assert_eq!(doc.root.attribute("xml:id"), Some("s.1"));
//!
//! let w = doc.root.elements().next().unwrap();
//! let t = w.elements().next().unwrap();
//! assert_eq!(t.children, vec![XmlChild::Text("De".to_string())]);
//! ```

mod error;
mod parser;
mod types;
mod writer;

pub use error::{XmlError, XmlResult};
pub use parser::parse;
pub use types::{XmlAttribute, XmlChild, XmlDocument, XmlElement};
pub use writer::{to_string, WriteOptions};
