//! Corrections: edit history kept inside the tree.
//!
//! A `correction` holds at most one `original`, one `new` and one
//! `current`, plus any number of `suggestion`s. `current` excludes both
//! `original` and `new`.

use crate::document::Document;
use crate::error::{FoliaError, FoliaResult, LookupError};
use crate::node::{KwArgs, NodeId};
use crate::schema::{self, ElementKind};

/// Arguments of [`Document::correct`].
///
/// ```
/// use layered_folia::{Correct, Document, ElementKind, KwArgs};
///
/// let mut doc = Document::new("doc").unwrap();
/// let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
/// let s = doc.add(body, ElementKind::Sentence, KwArgs::new().id("s1")).unwrap();
/// let foo = doc.add(s, ElementKind::Word, KwArgs::new().text("foo")).unwrap();
/// let bar = doc.create(ElementKind::Word, KwArgs::new().text("bar")).unwrap();
///
/// let correction = doc
///     .correct(s, Correct::default().original(foo).replacement(bar))
///     .unwrap();
/// assert_eq!(doc.text_of(s).unwrap(), "bar");
/// assert_eq!(doc.get_original(correction, 0).unwrap(), foo);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Correct {
    pub originals: Vec<NodeId>,
    pub currents: Vec<NodeId>,
    pub news: Vec<NodeId>,
    pub suggestions: Vec<NodeId>,
    /// Extend this correction instead of creating one.
    pub reuse: Option<NodeId>,
    /// Attributes of a newly created correction.
    pub args: KwArgs,
}

impl Correct {
    pub fn original(mut self, node: NodeId) -> Self {
        self.originals.push(node);
        self
    }

    pub fn current(mut self, node: NodeId) -> Self {
        self.currents.push(node);
        self
    }

    pub fn replacement(mut self, node: NodeId) -> Self {
        self.news.push(node);
        self
    }

    pub fn suggestion(mut self, node: NodeId) -> Self {
        self.suggestions.push(node);
        self
    }

    pub fn reuse(mut self, correction: NodeId) -> Self {
        self.reuse = Some(correction);
        self
    }

    pub fn args(mut self, args: KwArgs) -> Self {
        self.args = args;
        self
    }
}

fn compatible(a: ElementKind, b: ElementKind) -> bool {
    a == b || matches!((schema::nearest_abstract(a), schema::nearest_abstract(b)), (Some(x), Some(y)) if x == y)
}

impl Document {
    /// Record a correction below `parent`.
    ///
    /// Originals and currents are detached from where they are; the
    /// correction takes the place of the first of them, or is appended when
    /// there are none. New nodes must be unattached. When only new inline
    /// annotations are given, existing annotations of the same kind and set
    /// on `parent` become the originals.
    pub fn correct(&mut self, parent: NodeId, mut spec: Correct) -> FoliaResult<NodeId> {
        self.check_live(parent)?;
        if !spec.currents.is_empty() && !(spec.originals.is_empty() && spec.news.is_empty()) {
            return Err(FoliaError::value(
                "a correction cannot combine current with original or new",
            ));
        }
        for node in spec
            .originals
            .iter()
            .chain(&spec.currents)
            .chain(&spec.news)
            .chain(&spec.suggestions)
        {
            self.check_live(*node)?;
        }
        if let Some(reuse) = spec.reuse {
            self.check_live(reuse)?;
            if self[reuse].kind != ElementKind::Correction {
                return Err(FoliaError::value(format!("{} is not a correction", reuse)));
            }
        }
        if let Some(attached) = spec.news.iter().find(|node| self[**node].parent.is_some()) {
            return Err(FoliaError::value(format!("new node {} already has a parent", attached)));
        }

        if spec.originals.is_empty()
            && spec.currents.is_empty()
            && spec.reuse.is_none()
            && !spec.news.is_empty()
            && spec
                .news
                .iter()
                .all(|node| self[*node].is(ElementKind::AbstractInlineAnnotation))
        {
            spec.originals = self.infer_originals(parent, &spec.news);
        }

        let mut carried = Vec::new();
        for group in [&spec.originals, &spec.currents, &spec.news] {
            for node in group {
                self.carried_kinds(*node, &mut carried);
            }
        }
        self.check_kinds(&carried)?;

        if spec.reuse.is_none() && !schema::accepts(self[parent].kind, ElementKind::Correction) {
            return Err(FoliaError::value(format!(
                "<{}> does not accept <{}>",
                self[parent].kind,
                ElementKind::Correction
            )));
        }

        // where the correction lands once the originals and currents are gone
        let position = spec
            .originals
            .iter()
            .chain(&spec.currents)
            .find(|node| self[**node].parent == Some(parent))
            .and_then(|anchor| self.position(*anchor))
            .map(|index| {
                self[parent].children[..index]
                    .iter()
                    .filter(|sibling| !spec.originals.contains(*sibling) && !spec.currents.contains(*sibling))
                    .count()
            });

        let correction = match spec.reuse {
            Some(correction) => correction,
            None => self.create(ElementKind::Correction, std::mem::take(&mut spec.args))?,
        };

        if spec.reuse.is_some() && !spec.news.is_empty() {
            self.demote_current(correction)?;
        }

        for node in spec.originals.iter().chain(&spec.currents) {
            if let Some(owner) = self[*node].parent {
                self.remove(owner, *node)?;
            }
        }

        self.wrap(correction, ElementKind::Original, &spec.originals)?;
        self.wrap(correction, ElementKind::Current, &spec.currents)?;
        self.wrap(correction, ElementKind::New, &spec.news)?;
        for suggestion in &spec.suggestions {
            let wrapper = self.create(ElementKind::Suggestion, KwArgs::new())?;
            self.append(wrapper, *suggestion)?;
            self.append(correction, wrapper)?;
        }

        if spec.reuse.is_none() {
            self.insert(parent, position, correction)?;
        }
        log::debug!(
            "correction {} under {}",
            self[correction].id.as_deref().unwrap_or("(no id)"),
            parent
        );
        Ok(correction)
    }

    fn infer_originals(&self, parent: NodeId, news: &[NodeId]) -> Vec<NodeId> {
        self.owned_children(parent)
            .filter(|child| {
                let existing = &self[*child];
                news.iter().any(|node| {
                    let replacement = &self[*node];
                    replacement.kind == existing.kind && replacement.set == existing.set
                })
            })
            .collect()
    }

    /// Move `nodes` into the wrapper of `kind` below `correction`, creating
    /// the wrapper when needed.
    fn wrap(&mut self, correction: NodeId, kind: ElementKind, nodes: &[NodeId]) -> FoliaResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        let existing = self[correction]
            .children
            .iter()
            .copied()
            .find(|child| self[*child].kind == kind);
        let wrapper = match existing {
            Some(wrapper) => wrapper,
            None => {
                let wrapper = self.create(kind, KwArgs::new())?;
                self.append(correction, wrapper)?;
                wrapper
            }
        };
        for node in nodes {
            self.append(wrapper, *node)?;
        }
        Ok(())
    }

    /// Turn the `current` of a reused correction into its `original`.
    fn demote_current(&mut self, correction: NodeId) -> FoliaResult<()> {
        let Some(current) = self[correction]
            .children
            .iter()
            .copied()
            .find(|child| self[*child].kind == ElementKind::Current)
        else {
            return Ok(());
        };
        let position = self.position(current);
        let moved: Vec<NodeId> = self.owned_children(current).collect();
        for node in &moved {
            self.remove(current, *node)?;
        }
        self.destroy(current)?;
        let original = self.create(ElementKind::Original, KwArgs::new())?;
        self.insert(correction, position, original)?;
        for node in moved {
            self.append(original, node)?;
        }
        Ok(())
    }

    fn carried_kinds(&self, node: NodeId, out: &mut Vec<ElementKind>) {
        let found = &self[node];
        match found.kind {
            ElementKind::Correction => {
                for wrapper in &found.children {
                    if matches!(
                        self[*wrapper].kind,
                        ElementKind::New | ElementKind::Original | ElementKind::Current
                    ) {
                        for child in &self[*wrapper].children {
                            self.carried_kinds(*child, out);
                        }
                    }
                }
            }
            ElementKind::Description | ElementKind::Comment | ElementKind::XmlComment | ElementKind::ForeignData => {}
            kind => out.push(kind),
        }
    }

    fn check_kinds(&self, kinds: &[ElementKind]) -> FoliaResult<()> {
        for (i, a) in kinds.iter().enumerate() {
            if let Some(b) = kinds[i + 1..].iter().find(|b| !compatible(*a, **b)) {
                return Err(FoliaError::xml(
                    None,
                    format!("correction mixes incompatible kinds <{}> and <{}>", a, b),
                ));
            }
        }
        Ok(())
    }

    /// Check that the new, original and current versions of `correction`
    /// carry compatible kinds, looking through nested corrections.
    pub fn check_type_consistency(&self, correction: NodeId) -> FoliaResult<()> {
        self.check_live(correction)?;
        if self[correction].kind != ElementKind::Correction {
            return Err(FoliaError::value(format!("{} is not a correction", correction)));
        }
        let mut kinds = Vec::new();
        self.carried_kinds(correction, &mut kinds);
        self.check_kinds(&kinds)
    }

    fn version_child(&self, correction: NodeId, kind: ElementKind, index: usize) -> Result<NodeId, LookupError> {
        self[correction]
            .children
            .iter()
            .copied()
            .find(|child| self[*child].kind == kind)
            .and_then(|wrapper| self[wrapper].children.get(index).copied())
            .ok_or_else(|| {
                LookupError::NoSuchAnnotation(format!("correction {} has no <{}> item {}", correction, kind, index))
            })
    }

    /// Item `index` of the `new` version.
    pub fn get_new(&self, correction: NodeId, index: usize) -> Result<NodeId, LookupError> {
        self.version_child(correction, ElementKind::New, index)
    }

    pub fn get_original(&self, correction: NodeId, index: usize) -> Result<NodeId, LookupError> {
        self.version_child(correction, ElementKind::Original, index)
    }

    pub fn get_current(&self, correction: NodeId, index: usize) -> Result<NodeId, LookupError> {
        self.version_child(correction, ElementKind::Current, index)
    }

    /// The `suggestion` wrapper at `index`.
    pub fn get_suggestion(&self, correction: NodeId, index: usize) -> Result<NodeId, LookupError> {
        self.suggestions(correction).nth(index).ok_or_else(|| {
            LookupError::NoSuchAnnotation(format!("correction {} has no suggestion {}", correction, index))
        })
    }

    pub fn suggestions(&self, correction: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self[correction]
            .children
            .iter()
            .copied()
            .filter(move |child| self[*child].kind == ElementKind::Suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{CorrectionHandling, TextPolicy};

    fn sentence() -> (Document, NodeId) {
        let mut doc = Document::new("doc").unwrap();
        let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
        let s = doc
            .add(body, ElementKind::Sentence, KwArgs::new().id("doc.s.1"))
            .unwrap();
        (doc, s)
    }

    #[test]
    fn replacing_a_word() {
        let (mut doc, s) = sentence();
        doc.add(s, ElementKind::Word, KwArgs::new().text("the")).unwrap();
        let foo = doc.add(s, ElementKind::Word, KwArgs::new().id("w.foo").text("foo")).unwrap();
        doc.add(s, ElementKind::Word, KwArgs::new().text("end")).unwrap();
        let bar = doc.create(ElementKind::Word, KwArgs::new().text("bar")).unwrap();

        let correction = doc
            .correct(
                s,
                Correct::default()
                    .original(foo)
                    .replacement(bar)
                    .args(KwArgs::new().class("spelling")),
            )
            .unwrap();

        assert_eq!(doc[s].children()[1], correction);
        assert_eq!(doc[correction].id(), Some("doc.s.1.correction.1"));
        let original = doc.get_original(correction, 0).unwrap();
        assert_eq!(doc.text_of(original).unwrap(), "foo");
        assert_eq!(doc.text_of(doc.get_new(correction, 0).unwrap()).unwrap(), "bar");
        assert!(!doc[foo].auth());
        doc.check_type_consistency(correction).unwrap();

        assert_eq!(doc.text_of(s).unwrap(), "the bar end");
        let policy = TextPolicy::default().correction(CorrectionHandling::Original);
        assert_eq!(doc.text(s, &policy).unwrap(), "the foo end");
        assert!(doc.get_current(correction, 0).unwrap_err().to_string().contains("no <current>"));
    }

    #[test]
    fn current_excludes_original_and_new() {
        let (mut doc, s) = sentence();
        let w = doc.add(s, ElementKind::Word, KwArgs::new().text("x")).unwrap();
        let y = doc.create(ElementKind::Word, KwArgs::new().text("y")).unwrap();
        let err = doc
            .correct(s, Correct::default().current(w).replacement(y))
            .unwrap_err();
        assert!(matches!(err, FoliaError::Value(_)));
        assert_eq!(doc[w].parent(), Some(s));
    }

    #[test]
    fn suggestions_then_accepting_one() {
        let (mut doc, s) = sentence();
        let w = doc.add(s, ElementKind::Word, KwArgs::new().text("teh")).unwrap();
        let hint = doc.create(ElementKind::Word, KwArgs::new().text("the")).unwrap();
        let correction = doc
            .correct(s, Correct::default().current(w).suggestion(hint))
            .unwrap();
        assert_eq!(doc.text_of(s).unwrap(), "teh");
        let suggestion = doc.get_suggestion(correction, 0).unwrap();
        assert_eq!(doc[suggestion].children(), &[hint]);
        assert!(doc.get_suggestion(correction, 1).is_err());

        let fixed = doc.create(ElementKind::Word, KwArgs::new().text("the")).unwrap();
        doc.correct(s, Correct::default().reuse(correction).replacement(fixed))
            .unwrap();
        assert_eq!(doc.get_original(correction, 0).unwrap(), w);
        assert!(doc.get_current(correction, 0).is_err());
        assert_eq!(doc.text_of(s).unwrap(), "the");
    }

    #[test]
    fn inline_originals_are_inferred() {
        let (mut doc, s) = sentence();
        let w = doc.add(s, ElementKind::Word, KwArgs::new().text("run")).unwrap();
        let old = doc
            .add(w, ElementKind::PosAnnotation, KwArgs::new().class("N").set("tags"))
            .unwrap();
        let new = doc
            .create(ElementKind::PosAnnotation, KwArgs::new().class("V").set("tags"))
            .unwrap();
        let correction = doc.correct(w, Correct::default().replacement(new)).unwrap();
        assert_eq!(doc.get_original(correction, 0).unwrap(), old);
        assert_eq!(doc.get_new(correction, 0).unwrap(), new);
        assert_eq!(doc.text_of(w).unwrap(), "run");
    }

    #[test]
    fn incompatible_kinds_are_rejected() {
        let (mut doc, s) = sentence();
        let w = doc.add(s, ElementKind::Word, KwArgs::new().text("x")).unwrap();
        let sentence = doc.create(ElementKind::Sentence, KwArgs::new()).unwrap();
        let err = doc
            .correct(s, Correct::default().original(w).replacement(sentence))
            .unwrap_err();
        assert!(matches!(err, FoliaError::Xml { .. }));
        assert_eq!(doc[w].parent(), Some(s));
    }

    #[test]
    fn originals_out_of_document_order() {
        let (mut doc, s) = sentence();
        let a = doc.add(s, ElementKind::Word, KwArgs::new().text("a")).unwrap();
        let b = doc.add(s, ElementKind::Word, KwArgs::new().text("b")).unwrap();
        let c = doc.add(s, ElementKind::Word, KwArgs::new().text("c")).unwrap();
        let x = doc.create(ElementKind::Word, KwArgs::new().text("x")).unwrap();

        let correction = doc
            .correct(s, Correct::default().original(c).original(a).replacement(x))
            .unwrap();

        assert_eq!(doc[s].children(), &[b, correction]);
        assert_eq!(doc.get_original(correction, 0).unwrap(), c);
        assert_eq!(doc.get_original(correction, 1).unwrap(), a);
        assert_eq!(doc.text_of(s).unwrap(), "b x");
    }
}
