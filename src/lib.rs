#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! In-memory model for FoLiA documents.
//!
//! A [`Document`] owns every node in an arena and hands out [`NodeId`]
//! handles. Nodes are typed by [`ElementKind`]; what a kind may contain,
//! which attributes it takes and how it renders text comes from the static
//! schema in [`schema`]. Annotations must belong to a declared (annotation
//! type, set) pair, and text redundantly stored at several levels is kept
//! consistent while the tree is edited.
//!
//! ## Core Types
//!
//! - [`Document`] - Node arena, id index, declarations and metadata
//! - [`Node`] / [`NodeId`] - Element data and the handle to it
//! - [`ElementKind`] / [`AnnotationType`] - Schema vocabulary
//! - [`TextPolicy`] - How text is rendered (class, corrections, hidden words)
//! - [`Selector`] - Recursive queries by kind and set
//! - [`Correct`] - Arguments for wrapping nodes in a correction
//!
//! ## Example
//!
//! ```
//! use layered_folia::{Document, ElementKind, KwArgs};
//!
//! let mut doc = Document::new("example").unwrap();
//! let body = doc.add_body(ElementKind::Text, KwArgs::new().id("example.text")).unwrap();
//! let s = doc.add(body, ElementKind::Sentence, KwArgs::new().id("example.s.1")).unwrap();
//! for word in ["De", "site", "staat", "online"] {
//!     doc.add(s, ElementKind::Word, KwArgs::new().text(word)).unwrap();
//! }
//! assert_eq!(doc.text_of(s).unwrap(), "De site staat online");
//!
//! let xml = doc.to_xml_string().unwrap();
//! let reread = Document::from_xml_str(&xml).unwrap();
//! assert_eq!(reread.words(reread.body().unwrap()).len(), 4);
//! ```

pub mod correction;
pub mod declaration;
pub mod display;
pub mod document;
pub mod error;
pub mod metadata;
pub mod node;
pub mod provenance;
pub mod query;
pub mod schema;
pub mod text;

// Document types
pub use document::{
    Document,
    DocumentConfig,
    DocumentMode,
    DocumentStats,
    Version,
    FOLIA_VERSION,
};

// Nodes and schema
pub use node::{
    AnnotatorType,
    KwArgs,
    Node,
    NodeId,
    Payload,
    SpacePreserve,
};
pub use schema::{
    AnnotationType,
    ElementKind,
};

// Declarations and document-level metadata
pub use declaration::{
    DeclarationKey,
    Declaration,
    DeclareArgs,
};
pub use metadata::Metadata;
pub use provenance::{
    Processor,
    Provenance,
};

// Text, queries and corrections
pub use correction::Correct;
pub use display::DocumentDisplay;
pub use query::{
    ExcludeSet,
    SelectFlag,
    Selector,
};
pub use text::{
    CorrectionHandling,
    TextPolicy,
};

pub use error::{
    FoliaError,
    FoliaResult,
    LookupError,
};
