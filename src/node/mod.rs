//! Nodes: one per XML element, stored in the document arena.

mod args;
mod attributes;

pub use args::KwArgs;
pub(crate) use attributes::{apply_args, format_datetime, is_valid_id, parse_datetime};

use crate::schema::{self, AnnotationType, Capabilities, ElementKind, KindDescriptor};
use chrono::NaiveDateTime;
use layered_folia_xml::XmlElement;
use std::collections::BTreeMap;
use std::fmt;

/// Stable handle of a node inside its [`Document`](crate::Document).
///
/// Handles are never reused, so a stale handle can be detected instead of
/// silently aliasing a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// `xml:space` state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpacePreserve {
    /// Not set; inherited from the parent on append.
    #[default]
    Unset,
    Default,
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotatorType {
    Auto,
    Manual,
    Generator,
    Datasource,
}

impl AnnotatorType {
    pub fn parse(value: &str) -> Option<AnnotatorType> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Some(AnnotatorType::Auto),
            "manual" => Some(AnnotatorType::Manual),
            "generator" => Some(AnnotatorType::Generator),
            "datasource" => Some(AnnotatorType::Datasource),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnnotatorType::Auto => "auto",
            AnnotatorType::Manual => "manual",
            AnnotatorType::Generator => "generator",
            AnnotatorType::Datasource => "datasource",
        }
    }
}

impl fmt::Display for AnnotatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-child content of a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    /// Character data of `XmlText`, `XmlComment`, `desc`, `comment` and `content`.
    Value(String),
    /// Opaque XML kept verbatim inside `foreign-data`.
    Foreign(Vec<XmlElement>),
}

/// A single element of the annotation tree.
///
/// Nodes are created through [`Document::create`](crate::Document::create)
/// and only reachable through their [`NodeId`]; the owning parent link is
/// kept here, span references are counted in `refcount`.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: ElementKind,
    pub(crate) id: Option<String>,
    pub(crate) class: Option<String>,
    pub(crate) set: Option<String>,
    pub(crate) annotator: Option<String>,
    pub(crate) annotator_type: Option<AnnotatorType>,
    pub(crate) processor: Option<String>,
    pub(crate) confidence: Option<f64>,
    pub(crate) datetime: Option<NaiveDateTime>,
    pub(crate) begin_time: Option<String>,
    pub(crate) end_time: Option<String>,
    pub(crate) src: Option<String>,
    pub(crate) speaker: Option<String>,
    pub(crate) n: Option<String>,
    pub(crate) textclass: Option<String>,
    pub(crate) metadata: Option<String>,
    pub(crate) tag: Option<String>,
    /// False for words written as `space="no"`.
    pub(crate) space: bool,
    pub(crate) preserve: SpacePreserve,
    pub(crate) auth: bool,
    /// Kind-specific attributes (`offset`, `subset`, `xlink:href`, ...).
    pub(crate) extra: BTreeMap<String, String>,
    pub(crate) payload: Payload,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    /// Number of span annotations referencing this node without owning it.
    pub(crate) refcount: usize,
    pub(crate) line: usize,
}

impl Node {
    pub(crate) fn new(kind: ElementKind) -> Self {
        Node {
            kind,
            id: None,
            class: None,
            set: None,
            annotator: None,
            annotator_type: None,
            processor: None,
            confidence: None,
            datetime: None,
            begin_time: None,
            end_time: None,
            src: None,
            speaker: None,
            n: None,
            textclass: None,
            metadata: None,
            tag: None,
            space: true,
            preserve: SpacePreserve::Unset,
            auth: schema::descriptor_of(kind).has(Capabilities::AUTH),
            extra: BTreeMap::new(),
            payload: Payload::None,
            children: Vec::new(),
            parent: None,
            refcount: 0,
            line: 0,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn descriptor(&self) -> &'static KindDescriptor {
        schema::descriptor_of(self.kind)
    }

    pub fn annotation_type(&self) -> AnnotationType {
        self.descriptor().annotation_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn set(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn annotator(&self) -> Option<&str> {
        self.annotator.as_deref()
    }

    pub fn annotator_type(&self) -> Option<AnnotatorType> {
        self.annotator_type
    }

    pub fn processor(&self) -> Option<&str> {
        self.processor.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        self.datetime
    }

    pub fn begin_time(&self) -> Option<&str> {
        self.begin_time.as_deref()
    }

    pub fn end_time(&self) -> Option<&str> {
        self.end_time.as_deref()
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    pub fn n(&self) -> Option<&str> {
        self.n.as_deref()
    }

    /// Text class this node's content is taken from; `current` when unset.
    pub fn textclass(&self) -> &str {
        self.textclass.as_deref().unwrap_or("current")
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// False when the node is glued to its successor (`space="no"`).
    pub fn space(&self) -> bool {
        self.space
    }

    pub fn preserve(&self) -> SpacePreserve {
        self.preserve
    }

    /// Authoritative: not inside an original, suggestion or alternative.
    pub fn auth(&self) -> bool {
        self.auth
    }

    pub fn extra(&self, name: &str) -> Option<&str> {
        self.extra.get(name).map(String::as_str)
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Character data of value-carrying kinds.
    pub fn value(&self) -> Option<&str> {
        match &self.payload {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn refcount(&self) -> usize {
        self.refcount
    }

    /// Source line of the element, 0 for nodes built in memory.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Explicit one-based offset of a `t`/`ph` inside its reference text.
    pub fn offset(&self) -> Option<usize> {
        self.extra("offset").and_then(|offset| offset.parse().ok())
    }

    /// Class of a `t`/`ph` node; content classes default to `current`.
    pub(crate) fn content_class(&self) -> &str {
        self.class.as_deref().unwrap_or("current")
    }

    pub fn is(&self, kind: ElementKind) -> bool {
        schema::is_subtype(self.kind, kind)
    }

    pub fn has(&self, caps: Capabilities) -> bool {
        self.descriptor().has(caps)
    }
}
