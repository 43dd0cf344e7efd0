//! Recursive selection of nodes by kind and set.
//!
//! ## Usage
//!
//! ```
//! use layered_folia::{Document, ElementKind, KwArgs, Selector};
//!
//! let mut doc = Document::new("doc").unwrap();
//! let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
//! let p = doc.add(body, ElementKind::Paragraph, KwArgs::new()).unwrap();
//! let s = doc.add(p, ElementKind::Sentence, KwArgs::new()).unwrap();
//! doc.add(s, ElementKind::Word, KwArgs::new().text("hi")).unwrap();
//!
//! assert_eq!(doc.select(body, &Selector::kind(ElementKind::Word)).len(), 1);
//! assert_eq!(doc.select(body, &Selector::kind(ElementKind::Word).local()).len(), 0);
//! ```

use crate::document::Document;
use crate::error::LookupError;
use crate::node::NodeId;
use crate::schema::{self, ElementKind};

/// How far below the start node a selection searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectFlag {
    /// The whole subtree.
    #[default]
    Recursive,
    /// Direct children only.
    Local,
    /// The whole subtree, but never inside a match.
    TopHit,
}

/// Kinds whose subtrees a selection does not descend into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeSet(Vec<ElementKind>);

impl ExcludeSet {
    pub fn none() -> Self {
        ExcludeSet(Vec::new())
    }

    /// Alternative versions of the document: originals, suggestions,
    /// alternatives and foreign data.
    pub fn alternatives() -> Self {
        ExcludeSet(vec![
            ElementKind::Original,
            ElementKind::Suggestion,
            ElementKind::Alternative,
            ElementKind::AlternativeLayers,
            ElementKind::ForeignData,
        ])
    }

    /// For structure queries: also skip annotation layers.
    pub fn structure() -> Self {
        Self::alternatives().with(ElementKind::AbstractAnnotationLayer)
    }

    /// For inline annotation queries: also skip morphology and phonology.
    pub fn annotations() -> Self {
        Self::alternatives()
            .with(ElementKind::MorphologyLayer)
            .with(ElementKind::PhonologyLayer)
    }

    pub fn with(mut self, kind: ElementKind) -> Self {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
        self
    }

    pub fn contains(&self, kind: ElementKind) -> bool {
        self.0.iter().any(|excluded| schema::is_subtype(kind, *excluded))
    }
}

impl Default for ExcludeSet {
    fn default() -> Self {
        Self::alternatives()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub kind: ElementKind,
    pub set: Option<String>,
    pub exclude: ExcludeSet,
    pub flag: SelectFlag,
}

impl Selector {
    /// Recursive selection of `kind` (or any subtype) in any set, with the
    /// exclusions fitting that kind.
    pub fn kind(kind: ElementKind) -> Self {
        let exclude = if schema::is_subtype(kind, ElementKind::AbstractStructure) {
            ExcludeSet::structure()
        } else if schema::is_subtype(kind, ElementKind::AbstractInlineAnnotation) {
            ExcludeSet::annotations()
        } else {
            ExcludeSet::default()
        };
        Selector {
            kind,
            set: None,
            exclude,
            flag: SelectFlag::Recursive,
        }
    }

    pub fn set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    pub fn exclude(mut self, exclude: ExcludeSet) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn local(mut self) -> Self {
        self.flag = SelectFlag::Local;
        self
    }

    pub fn top_hit(mut self) -> Self {
        self.flag = SelectFlag::TopHit;
        self
    }
}

impl Document {
    /// Depth-first, pre-order selection below `node` (excluding `node`).
    pub fn select(&self, node: NodeId, selector: &Selector) -> Vec<NodeId> {
        let set = selector.set.as_deref().map(|set| {
            let annotation_type = schema::descriptor_of(selector.kind).annotation_type;
            self.declarations.unalias(annotation_type, set).to_string()
        });
        let mut out = Vec::new();
        self.select_into(node, selector, set.as_deref(), selector.flag, &mut out);
        out
    }

    fn select_into(
        &self,
        node: NodeId,
        selector: &Selector,
        set: Option<&str>,
        flag: SelectFlag,
        out: &mut Vec<NodeId>,
    ) {
        for child in &self[node].children {
            let found = &self[*child];
            let matched = found.is(selector.kind) && (set.is_none() || found.set.as_deref() == set);
            if matched {
                out.push(*child);
            }
            let descend = match flag {
                SelectFlag::Recursive => true,
                SelectFlag::Local => false,
                SelectFlag::TopHit => !matched,
            };
            if descend && !selector.exclude.contains(found.kind) && found.parent == Some(node) {
                self.select_into(*child, selector, set, flag, out);
            }
        }
    }

    /// The single annotation of `kind` (and `set`) on `node`, searching
    /// direct children only.
    pub fn annotation(&self, node: NodeId, kind: ElementKind, set: Option<&str>) -> Result<NodeId, LookupError> {
        self.annotations(node, kind, set)
            .into_iter()
            .next()
            .ok_or_else(|| {
                LookupError::NoSuchAnnotation(format!(
                    "no <{}>{} on {}",
                    kind,
                    set.map(|set| format!(" of set '{}'", set)).unwrap_or_default(),
                    self[node].id.as_deref().unwrap_or(self[node].kind.tag())
                ))
            })
    }

    /// Annotations of `kind` directly on `node`, plus those inside its
    /// corrections' current versions.
    pub fn annotations(&self, node: NodeId, kind: ElementKind, set: Option<&str>) -> Vec<NodeId> {
        let mut selector = Selector::kind(kind).local();
        if let Some(set) = set {
            selector = selector.set(set);
        }
        let mut found = self.select(node, &selector);
        for correction in self.select(node, &Selector::kind(ElementKind::Correction).local()) {
            for wrapper in self[correction].children() {
                if matches!(self[*wrapper].kind, ElementKind::New | ElementKind::Current) {
                    found.extend(self.select(*wrapper, &selector));
                }
            }
        }
        found
    }

    pub fn has_annotation(&self, node: NodeId, kind: ElementKind, set: Option<&str>) -> bool {
        !self.annotations(node, kind, set).is_empty()
    }

    /// Words below `node`, in document order.
    pub fn words(&self, node: NodeId) -> Vec<NodeId> {
        self.select(node, &Selector::kind(ElementKind::Word))
    }

    pub fn sentences(&self, node: NodeId) -> Vec<NodeId> {
        self.select(node, &Selector::kind(ElementKind::Sentence))
    }

    pub fn paragraphs(&self, node: NodeId) -> Vec<NodeId> {
        self.select(node, &Selector::kind(ElementKind::Paragraph))
    }

    /// Nearest strict ancestor of `node` that is a `kind`.
    pub fn ancestor(&self, node: NodeId, kind: ElementKind) -> Option<NodeId> {
        self.ancestors(node).find(|ancestor| self[*ancestor].is(kind))
    }

    /// Class of the annotation of `kind` on `node`, if any.
    pub fn class_of(&self, node: NodeId, kind: ElementKind, set: Option<&str>) -> Option<&str> {
        let annotation = self.annotation(node, kind, set).ok()?;
        self[annotation].class()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::Correct;
    use crate::node::KwArgs;

    fn doc_with_paragraph() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("doc").unwrap();
        let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
        let p = doc.add(body, ElementKind::Paragraph, KwArgs::new().id("p1")).unwrap();
        for (i, words) in [["a", "b"], ["c", "d"]].iter().enumerate() {
            let s = doc
                .add(p, ElementKind::Sentence, KwArgs::new().id(format!("p1.s{}", i + 1)))
                .unwrap();
            for word in words {
                doc.add(s, ElementKind::Word, KwArgs::new().text(*word)).unwrap();
            }
        }
        (doc, body, p)
    }

    #[test]
    fn flags_limit_depth() {
        let (mut doc, body, p) = doc_with_paragraph();
        assert_eq!(doc.words(body).len(), 4);
        assert_eq!(doc.sentences(body).len(), 2);
        assert_eq!(doc.select(p, &Selector::kind(ElementKind::Sentence).local()).len(), 2);
        assert!(doc.select(body, &Selector::kind(ElementKind::Sentence).local()).is_empty());

        // a sentence nested in a quote inside the first sentence
        let s1 = doc.index("p1.s1").unwrap();
        let quote = doc.add(s1, ElementKind::Quote, KwArgs::new()).unwrap();
        doc.add(quote, ElementKind::Sentence, KwArgs::new()).unwrap();
        assert_eq!(doc.sentences(body).len(), 3);
        assert_eq!(doc.select(body, &Selector::kind(ElementKind::Sentence).top_hit()).len(), 2);
    }

    #[test]
    fn abstract_kinds_match_subtypes() {
        let (doc, body, _) = doc_with_paragraph();
        // paragraph, two sentences and four words
        assert_eq!(doc.select(body, &Selector::kind(ElementKind::AbstractStructure)).len(), 7);
    }

    #[test]
    fn originals_are_excluded_by_default() {
        let (mut doc, body, _) = doc_with_paragraph();
        let s1 = doc.index("p1.s1").unwrap();
        let old = doc.words(s1)[0];
        let new = doc.create(ElementKind::Word, KwArgs::new().text("A")).unwrap();
        doc.correct(s1, Correct::default().original(old).replacement(new))
            .unwrap();
        let words = doc.words(body);
        assert_eq!(words.len(), 4);
        assert!(words.contains(&new));
        assert!(!words.contains(&old));
        let everything = Selector::kind(ElementKind::Word).exclude(ExcludeSet::none());
        assert_eq!(doc.select(body, &everything).len(), 5);
    }

    #[test]
    fn annotation_lookup_by_set() {
        let (mut doc, body, _) = doc_with_paragraph();
        let w = doc.words(body)[0];
        doc.add(w, ElementKind::PosAnnotation, KwArgs::new().class("N").set("tags"))
            .unwrap();
        assert_eq!(doc.class_of(w, ElementKind::PosAnnotation, Some("tags")), Some("N"));
        assert!(doc.has_annotation(w, ElementKind::PosAnnotation, None));
        let miss = doc.annotation(w, ElementKind::LemmaAnnotation, None).unwrap_err();
        assert!(matches!(miss, LookupError::NoSuchAnnotation(_)));
        assert_eq!(doc.ancestor(w, ElementKind::Paragraph), doc.index("p1"));
    }

    #[test]
    fn span_references_are_not_descended() {
        let (mut doc, body, _) = doc_with_paragraph();
        let s1 = doc.index("p1.s1").unwrap();
        let w = doc.words(s1)[0];
        let layer = doc.add(s1, ElementKind::EntitiesLayer, KwArgs::new()).unwrap();
        let entity = doc.add(layer, ElementKind::Entity, KwArgs::new().class("per")).unwrap();
        doc.append(entity, w).unwrap();
        let words = Selector::kind(ElementKind::Word).exclude(ExcludeSet::none());
        // the reference is listed under the entity, not walked twice
        assert_eq!(doc.select(body, &words).len(), 5);
        assert_eq!(doc.select(entity, &Selector::kind(ElementKind::Word)), vec![w]);
    }
}
