//! The document: node arena, id index, declarations and mode flags.

mod config;
mod parse;
mod serialize;
mod tree;

pub use config::{text_check_override, DocumentConfig, TEXT_CHECK_ENV};

use crate::declaration::{DeclarationKey, Declarations, DeclareArgs};
use crate::error::{FoliaError, FoliaResult};
use crate::metadata::Metadata;
use crate::node::{is_valid_id, Node, NodeId};
use crate::provenance::Provenance;
use crate::schema::{AnnotationType, ElementKind};
use bitflags::bitflags;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Format version written by this library.
pub const FOLIA_VERSION: &str = "2.5.1";
pub const NAMESPACE: &str = "http://ilk.uvt.nl/folia";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

bitflags! {
    /// Document-wide behaviour switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DocumentMode: u32 {
        /// Unsupported attributes are logged and dropped instead of failing.
        const PERMISSIVE = 1 << 0;
        /// Omit generator and datetime attributes on output.
        const STRIP = 1 << 1;
        /// Sort declarations and children by kind on output.
        const CANONICAL = 1 << 2;
        const CHECK_TEXT = 1 << 3;
        /// Replace inconsistent parent text instead of failing.
        const FIX_TEXT = 1 << 4;
        /// Declare unknown (type, set) pairs on first use.
        const AUTODECLARE = 1 << 5;
        /// Write attributes even when they equal the declared defaults.
        const EXPLICIT = 1 << 6;
    }
}

/// A `major.minor.patch` format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version { major, minor, patch }
    }

    pub fn current() -> Version {
        Version::new(2, 5, 1)
    }

    /// Documents before 2.0 get the historical declaration rules.
    pub fn is_legacy(&self) -> bool {
        *self < Version::new(2, 0, 0)
    }
}

impl FromStr for Version {
    type Err = FoliaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.trim().split('.').map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u32>()
        });
        let mut next = || -> FoliaResult<u32> {
            match parts.next() {
                None => Ok(0),
                Some(part) => part.map_err(|_| FoliaError::value(format!("invalid version '{}'", value))),
            }
        };
        Ok(Version::new(next()?, next()?, next()?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Node counters, mainly for instrumentation in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub live: usize,
    pub freed: usize,
    /// Destroyed nodes kept alive by span references.
    pub pending: usize,
}

/// An annotated document.
///
/// Nodes live in an arena owned by the document and are addressed by
/// [`NodeId`]. Slots are never reused, so handles stay valid (or detectably
/// dead) for the lifetime of the document.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    version: Version,
    mode: DocumentMode,
    pub(crate) nodes: Vec<Option<Node>>,
    body: Option<NodeId>,
    pub(crate) id_index: HashMap<String, NodeId>,
    pub(crate) declarations: Declarations,
    metadata: Metadata,
    provenance: Provenance,
    /// Content nodes with explicit offsets awaiting validation.
    pub(crate) text_offsets: Vec<NodeId>,
    pub(crate) phon_offsets: Vec<NodeId>,
    pub(crate) pending: BTreeSet<NodeId>,
    /// Last generated number per (base id, tag).
    pub(crate) id_counters: HashMap<(String, String), usize>,
    warnings: usize,
    pub(crate) freed: usize,
    /// Set while a document is being read; relaxes append-time hooks.
    pub(crate) parsing: bool,
}

impl Document {
    /// A new, empty document. Text checking follows [`TEXT_CHECK_ENV`] when
    /// set and is on otherwise; undeclared sets are declared on first use.
    pub fn new(id: &str) -> FoliaResult<Document> {
        let mut mode = DocumentMode::AUTODECLARE;
        if text_check_override().unwrap_or(true) {
            mode |= DocumentMode::CHECK_TEXT;
        }
        Document::with_mode(id, Version::current(), mode)
    }

    pub fn with_mode(id: &str, version: Version, mode: DocumentMode) -> FoliaResult<Document> {
        if !is_valid_id(id) {
            return Err(FoliaError::value(format!("invalid document id '{}'", id)));
        }
        Ok(Document {
            id: id.to_string(),
            version,
            mode,
            nodes: Vec::new(),
            body: None,
            id_index: HashMap::new(),
            declarations: Declarations::new(),
            metadata: Metadata::default(),
            provenance: Provenance::default(),
            text_offsets: Vec::new(),
            phon_offsets: Vec::new(),
            pending: BTreeSet::new(),
            id_counters: HashMap::new(),
            warnings: 0,
            freed: 0,
            parsing: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn mode(&self) -> DocumentMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DocumentMode) {
        self.mode = mode;
    }

    pub fn has_mode(&self, mode: DocumentMode) -> bool {
        self.mode.contains(mode)
    }

    /// The top-level `text` or `speech` node.
    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    /// Create the body of the document. Only `text` and `speech` qualify,
    /// and only once.
    pub fn add_body(&mut self, kind: ElementKind, args: crate::KwArgs) -> FoliaResult<NodeId> {
        if !matches!(kind, ElementKind::Text | ElementKind::Speech) {
            return Err(FoliaError::value(format!("<{}> cannot be a document body", kind)));
        }
        if self.body.is_some() {
            return Err(FoliaError::value("document already has a body"));
        }
        let body = self.create(kind, args)?;
        self.body = Some(body);
        Ok(body)
    }

    pub(crate) fn set_body(&mut self, body: NodeId) {
        self.body = Some(body);
    }

    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    pub(crate) fn check_live(&self, node: NodeId) -> FoliaResult<()> {
        if self.is_live(node) {
            Ok(())
        } else {
            Err(FoliaError::value(format!("node {} no longer exists", node)))
        }
    }

    /// Panics on a dead handle, like slice indexing.
    pub(crate) fn node_mut(&mut self, node: NodeId) -> &mut Node {
        match self.nodes.get_mut(node.0).and_then(Option::as_mut) {
            Some(found) => found,
            None => panic!("node {} no longer exists", node),
        }
    }

    /// O(1) lookup by `xml:id`.
    pub fn index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    /// Declare an (annotation type, set) pair. Processors must already be
    /// part of the provenance block.
    pub fn declare(
        &mut self,
        annotation_type: AnnotationType,
        set: Option<&str>,
        args: DeclareArgs,
    ) -> FoliaResult<DeclarationKey> {
        if let Some(missing) = args
            .processors
            .iter()
            .find(|processor| !self.provenance.contains(processor))
        {
            return Err(FoliaError::declaration(format!(
                "processor '{}' is not declared in the provenance block",
                missing
            )));
        }
        self.declarations.declare(annotation_type, set, args)
    }

    pub fn undeclare(&mut self, annotation_type: AnnotationType, set: Option<&str>) -> FoliaResult<()> {
        self.declarations.undeclare(annotation_type, set)
    }

    pub fn declared(&self, annotation_type: AnnotationType, set: Option<&str>) -> bool {
        self.declarations.declared(annotation_type, set)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    /// Number of checks demoted to warnings so far.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub(crate) fn warn(&mut self, message: impl AsRef<str>) {
        log::warn!("{}", message.as_ref());
        self.warnings += 1;
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            live: self.nodes.iter().filter(|slot| slot.is_some()).count(),
            freed: self.freed,
            pending: self.pending.len(),
        }
    }

    /// Live nodes destroyed while still referenced by a span annotation.
    pub fn pending_deletions(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pending.iter().copied()
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, node: NodeId) -> &Node {
        match self.get(node) {
            Some(found) => found,
            None => panic!("node {} no longer exists", node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_parse_and_order() {
        let v: Version = "2.4.1".parse().unwrap();
        assert_eq!(v, Version::new(2, 4, 1));
        assert!(v < Version::current());
        assert_eq!("1.5".parse::<Version>().unwrap(), Version::new(1, 5, 0));
        assert!("x.y".parse::<Version>().is_err());
        assert!(Version::new(1, 9, 9).is_legacy());
        assert_eq!(Version::current().to_string(), FOLIA_VERSION);
    }

    #[test]
    fn new_documents_validate_their_id() {
        assert!(Document::new("1doc").is_err());
        let doc = Document::new("doc").unwrap();
        assert!(doc.has_mode(DocumentMode::AUTODECLARE));
        assert_eq!(doc.stats(), DocumentStats::default());
    }

    #[test]
    fn declarations_require_known_processors() {
        let mut doc = Document::new("doc").unwrap();
        let err = doc
            .declare(AnnotationType::Pos, Some("tags"), DeclareArgs::new().processor("p1"))
            .unwrap_err();
        assert!(matches!(err, FoliaError::Declaration(_)));
        doc.provenance_mut()
            .add(crate::provenance::Processor::new("p1", "tagger"))
            .unwrap();
        doc.declare(AnnotationType::Pos, Some("tags"), DeclareArgs::new().processor("p1"))
            .unwrap();
        assert!(doc.declared(AnnotationType::Pos, Some("tags")));
    }
}
