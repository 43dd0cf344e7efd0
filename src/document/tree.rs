//! Tree surgery: creating, attaching, detaching and destroying nodes.

use super::{Document, DocumentMode};
use crate::declaration::{DeclarationKey, DeclareArgs, UNDEFINED_SET};
use crate::error::{FoliaError, FoliaResult};
use crate::node::{apply_args, KwArgs, Node, NodeId, SpacePreserve};
use crate::schema::{self, AnnotationType, Capabilities, ElementKind};

impl Document {
    /// Create an unattached node of `kind`.
    ///
    /// Attributes are validated against the kind's descriptor, the id is
    /// registered in the index, and the (annotation type, set) pair is
    /// resolved against the declarations, filling in declared defaults.
    pub fn create(&mut self, kind: ElementKind, args: KwArgs) -> FoliaResult<NodeId> {
        let desc = schema::descriptor_of(kind);
        if desc.is_abstract() {
            return Err(FoliaError::value(format!("cannot instantiate abstract kind {}", kind)));
        }

        let mut node = Node::new(kind);
        let convenience = apply_args(&mut node, args, self.has_mode(DocumentMode::PERMISSIVE))?;

        if let Some(base) = &convenience.generate_id {
            let base = self
                .index(base)
                .ok_or_else(|| FoliaError::value(format!("generate_id: unknown id '{}'", base)))?;
            node.id = Some(self.generate_id(base, kind.tag())?);
        }
        if let Some(id) = &node.id {
            if self.id_index.contains_key(id) {
                return Err(FoliaError::DuplicateId(id.clone()));
            }
        }
        if let Some(processor) = &node.processor {
            if !self.provenance().contains(processor) {
                return Err(FoliaError::value(format!(
                    "processor '{}' is not declared in the provenance block",
                    processor
                )));
            }
        }

        let key = self.resolve_declaration(&mut node)?;

        let handle = NodeId(self.nodes.len());
        if let Some(id) = node.id.clone() {
            self.register_id(id, handle);
        }
        self.nodes.push(Some(node));
        if let Some(key) = &key {
            self.declarations.increment_usage(key);
        }

        let textclass = self[handle].textclass().to_string();
        let mut attached = Ok(());
        if let Some(text) = &convenience.text {
            attached = self.set_text(handle, text, &textclass).map(|_| ());
        }
        if let Some(phon) = convenience.phon.as_deref().filter(|_| attached.is_ok()) {
            attached = self.set_phon(handle, phon, &textclass).map(|_| ());
        }
        if let Err(err) = attached {
            self.destroy(handle)?;
            return Err(err);
        }
        Ok(handle)
    }

    /// Create a node and append it to `parent`.
    ///
    /// Nothing is left behind when the append is rejected.
    pub fn add(&mut self, parent: NodeId, kind: ElementKind, args: KwArgs) -> FoliaResult<NodeId> {
        self.check_live(parent)?;
        let parent_kind = self[parent].kind;
        if !schema::accepts(parent_kind, kind) {
            return Err(FoliaError::value(format!("<{}> does not accept <{}>", parent_kind, kind)));
        }
        let child = self.create(kind, args)?;
        if let Err(err) = self.append(parent, child) {
            self.destroy(child)?;
            return Err(err);
        }
        Ok(child)
    }

    /// Find the declaration a node belongs to, declaring it on the fly in
    /// autodeclare mode, and copy the declared defaults onto the node.
    fn resolve_declaration(&mut self, node: &mut Node) -> FoliaResult<Option<DeclarationKey>> {
        let annotation_type = node.annotation_type();
        if annotation_type == AnnotationType::NoAnn {
            return Ok(None);
        }
        let legacy = self.version().is_legacy();
        let autodeclare = legacy || self.has_mode(DocumentMode::AUTODECLARE);

        let set = match node.set.take() {
            Some(set) => Some(self.declarations.unalias(annotation_type, &set).to_string()),
            None if !self.declarations.declared(annotation_type, None) => {
                legacy.then(|| UNDEFINED_SET.to_string())
            }
            None => {
                let mut sets = self.declarations.sets(annotation_type);
                match (sets.next(), sets.next()) {
                    (Some(set), None) => set.map(str::to_string),
                    _ => {
                        return Err(FoliaError::declaration(format!(
                            "ambiguous default set: more than one {} set declared",
                            annotation_type
                        )))
                    }
                }
            }
        };

        if self.declarations.get(annotation_type, set.as_deref()).is_none() {
            if !autodeclare {
                return Err(FoliaError::declaration(format!(
                    "{} set {:?} is not declared",
                    annotation_type,
                    set.as_deref().unwrap_or("")
                )));
            }
            log::debug!(
                "auto-declaring {} set {:?}",
                annotation_type,
                set.as_deref().unwrap_or("")
            );
            self.declarations.declare(annotation_type, set.as_deref(), DeclareArgs::new())?;
        }

        let decls = &self.declarations;
        let set_ref = set.as_deref();
        if node.annotator.is_none() {
            node.annotator = decls.default_annotator(annotation_type, set_ref).map(str::to_string);
            if node.annotator_type.is_none() {
                node.annotator_type = decls.default_annotator_type(annotation_type, set_ref);
            }
        }
        if node.datetime.is_none() {
            node.datetime = decls.default_datetime(annotation_type, set_ref);
        }
        if node.processor.is_none() {
            node.processor = decls.default_processor(annotation_type, set_ref)?.map(str::to_string);
        }
        node.set = set.clone();
        Ok(Some(DeclarationKey {
            annotation_type,
            set,
        }))
    }

    pub(crate) fn declaration_key(&self, node: NodeId) -> Option<DeclarationKey> {
        let found = &self[node];
        let annotation_type = found.annotation_type();
        (annotation_type != AnnotationType::NoAnn).then(|| DeclarationKey {
            annotation_type,
            set: found.set.clone(),
        })
    }

    fn register_id(&mut self, id: String, node: NodeId) {
        // keep generated ids ahead of explicit ones following the same scheme
        if let Some((rest, number)) = id.rsplit_once('.') {
            if let (Ok(number), Some((base, tag))) = (number.parse::<usize>(), rest.rsplit_once('.')) {
                let counter = self
                    .id_counters
                    .entry((base.to_string(), tag.to_string()))
                    .or_insert(0);
                *counter = (*counter).max(number);
            }
        }
        self.id_index.insert(id, node);
    }

    /// Generate `<ancestor id>.<tag>.<n>` from the nearest identified
    /// ancestor-or-self of `node`.
    pub fn generate_id(&mut self, node: NodeId, tag: &str) -> FoliaResult<String> {
        self.check_live(node)?;
        let base = self
            .ancestors_or_self(node)
            .find_map(|ancestor| self[ancestor].id.clone())
            .ok_or_else(|| FoliaError::value(format!("cannot generate an id for <{}>: no ancestor has an id", tag)))?;
        loop {
            let counter = self
                .id_counters
                .entry((base.clone(), tag.to_string()))
                .or_insert(0);
            *counter += 1;
            let candidate = format!("{}.{}.{}", base, tag, counter);
            if !self.id_index.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
    }

    /// Give a node without id a generated one.
    pub fn assign_id(&mut self, node: NodeId) -> FoliaResult<String> {
        if let Some(id) = &self[node].id {
            return Ok(id.clone());
        }
        let tag = self[node].kind.tag();
        let start = self[node].parent.unwrap_or(node);
        let id = self.generate_id(start, tag)?;
        self.node_mut(node).id = Some(id.clone());
        self.register_id(id.clone(), node);
        Ok(id)
    }

    /// `node`, its parent, grandparent and so on.
    pub fn ancestors_or_self(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |current| self[*current].parent)
    }

    /// Strict ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.ancestors_or_self(node).skip(1)
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> FoliaResult<NodeId> {
        self.insert(parent, None, child)
    }

    /// Insert `child` at `index` (or last) among the children of `parent`.
    ///
    /// A referable node (word, morpheme, phoneme, hidden word) that already
    /// has an owner becomes a non-owning reference when attached to a span
    /// annotation. Every check happens before the tree is touched.
    pub fn insert(&mut self, parent: NodeId, index: Option<usize>, child: NodeId) -> FoliaResult<NodeId> {
        self.check_live(parent)?;
        self.check_live(child)?;
        if parent == child {
            return Err(FoliaError::value("a node cannot contain itself"));
        }
        let reference = self.validate_insert(parent, index, child)?;
        if !reference && self.has_mode(DocumentMode::CHECK_TEXT) && !self.parsing {
            self.check_append_text(parent, child)?;
        }

        let children = &mut self.node_mut(parent).children;
        match index {
            Some(index) => children.insert(index, child),
            None => children.push(child),
        }

        if reference {
            self.node_mut(child).refcount += 1;
            return Ok(child);
        }

        self.node_mut(child).parent = Some(parent);
        let (parent_preserve, parent_auth) = {
            let owner = &self[parent];
            (owner.preserve, owner.auth)
        };
        if self[child].preserve == SpacePreserve::Unset {
            self.node_mut(child).preserve = parent_preserve;
        }
        if !parent_auth {
            self.mark_non_authoritative(child);
        }

        if !self.parsing && self[child].id.is_none() && self[child].has(Capabilities::AUTO_ID) {
            let tag = self[child].kind.tag();
            if let Ok(id) = self.generate_id(parent, tag) {
                self.node_mut(child).id = Some(id.clone());
                self.register_id(id, child);
            }
        }

        let kind = self[child].kind;
        if self[child].extra.contains_key("offset") {
            match kind {
                ElementKind::TextContent => self.text_offsets.push(child),
                ElementKind::PhonContent => self.phon_offsets.push(child),
                _ => {}
            }
        }
        Ok(child)
    }

    /// Returns whether the insert is a span reference.
    fn validate_insert(&self, parent: NodeId, index: Option<usize>, child: NodeId) -> FoliaResult<bool> {
        let owner = &self[parent];
        let node = &self[child];
        if !schema::accepts(owner.kind, node.kind) {
            return Err(FoliaError::value(format!(
                "<{}> does not accept <{}>",
                owner.kind, node.kind
            )));
        }
        if let Some(index) = index {
            if index > owner.children.len() {
                return Err(FoliaError::value(format!(
                    "insert position {} out of range for <{}>",
                    index, owner.kind
                )));
            }
        }

        let reference = node.parent.is_some()
            && node.has(Capabilities::WREFABLE)
            && owner.is(ElementKind::AbstractSpanAnnotation);
        if node.parent.is_some() && !reference {
            return Err(FoliaError::value(format!(
                "<{}> {} already has a parent",
                node.kind,
                node.id.as_deref().unwrap_or("")
            )));
        }
        if reference {
            if owner.children.contains(&child) {
                return Err(FoliaError::value(format!(
                    "<{}> already references {}",
                    owner.kind,
                    node.id.as_deref().unwrap_or("node")
                )));
            }
            return Ok(true);
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(FoliaError::value("cannot append a node below itself"));
        }

        let desc = node.descriptor();
        let same_kind: Vec<&Node> = owner
            .children
            .iter()
            .map(|sibling| &self[*sibling])
            .filter(|sibling| sibling.kind == node.kind && sibling.parent == Some(parent))
            .collect();
        if desc.occurrences > 0 && same_kind.len() >= desc.occurrences {
            return Err(FoliaError::DuplicateAnnotation(format!(
                "<{}> allows at most {} <{}>",
                owner.kind, desc.occurrences, node.kind
            )));
        }
        if desc.occurrences_per_set > 0
            && same_kind.iter().filter(|sibling| sibling.set == node.set).count() >= desc.occurrences_per_set
        {
            return Err(FoliaError::DuplicateAnnotation(format!(
                "<{}> allows at most {} <{}> of set {:?}",
                owner.kind,
                desc.occurrences_per_set,
                node.kind,
                node.set.as_deref().unwrap_or("")
            )));
        }
        if matches!(node.kind, ElementKind::TextContent | ElementKind::PhonContent)
            && same_kind
                .iter()
                .any(|sibling| sibling.content_class() == node.content_class())
        {
            return Err(FoliaError::DuplicateAnnotation(format!(
                "<{}> already has <{}> of class '{}'",
                owner.kind,
                node.kind,
                node.content_class()
            )));
        }

        if owner.kind == ElementKind::Correction {
            let has = |kind: ElementKind| owner.children.iter().any(|sibling| self[*sibling].kind == kind);
            let conflict = match node.kind {
                ElementKind::New => has(ElementKind::Current),
                ElementKind::Original => has(ElementKind::Current),
                ElementKind::Current => has(ElementKind::New) || has(ElementKind::Original),
                _ => false,
            };
            if conflict {
                return Err(FoliaError::value(format!(
                    "<correction> cannot hold <{}> together with {}",
                    node.kind,
                    if node.kind == ElementKind::Current {
                        "<new> or <original>"
                    } else {
                        "<current>"
                    }
                )));
            }
        }
        Ok(false)
    }

    fn mark_non_authoritative(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let found = self.node_mut(current);
            found.auth = false;
            let owned: Vec<NodeId> = found.children.clone();
            for child in owned {
                if self[child].parent == Some(current) {
                    stack.push(child);
                }
            }
        }
    }

    /// Detach `child` from `parent` without destroying it. Detaching a span
    /// reference releases it.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> FoliaResult<()> {
        self.check_live(parent)?;
        self.check_live(child)?;
        let position = self[parent]
            .children
            .iter()
            .position(|candidate| *candidate == child)
            .ok_or_else(|| FoliaError::value(format!("{} is not a child of {}", child, parent)))?;
        self.node_mut(parent).children.remove(position);
        if self[child].parent == Some(parent) {
            self.node_mut(child).parent = None;
        } else {
            self.release_reference(child);
        }
        Ok(())
    }

    /// Replace `old` by `new` at the same position; `old` is detached.
    pub fn replace(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> FoliaResult<()> {
        let position = self[parent]
            .children
            .iter()
            .position(|candidate| *candidate == old)
            .ok_or_else(|| FoliaError::value(format!("{} is not a child of {}", old, parent)))?;
        self.remove(parent, old)?;
        if let Err(err) = self.insert(parent, Some(position), new) {
            self.insert(parent, Some(position), old)?;
            return Err(err);
        }
        Ok(())
    }

    /// Destroy `node` and its owned subtree.
    ///
    /// A node still referenced by a span annotation is only detached and
    /// parked as a pending deletion; it is freed once the last reference is
    /// released.
    pub fn destroy(&mut self, node: NodeId) -> FoliaResult<()> {
        self.check_live(node)?;
        if self.pending.contains(&node) {
            return Err(FoliaError::value(format!("{} is already awaiting deletion", node)));
        }
        self.destroy_node(node, true);
        Ok(())
    }

    fn destroy_node(&mut self, node: NodeId, release_declaration: bool) {
        if release_declaration {
            if let Some(key) = self.declaration_key(node) {
                self.declarations.decrement_usage(&key);
            }
        }
        if let Some(parent) = self[node].parent {
            self.node_mut(parent).children.retain(|child| *child != node);
            self.node_mut(node).parent = None;
        }
        if self[node].refcount > 0 {
            log::debug!("{} is still referenced, deferring deletion", node);
            self.pending.insert(node);
            return;
        }

        let children = std::mem::take(&mut self.node_mut(node).children);
        for child in children {
            if !self.is_live(child) {
                continue;
            }
            if self[child].parent == Some(node) {
                self.node_mut(child).parent = None;
                self.destroy_node(child, true);
            } else {
                // a span reference; the node lives on elsewhere
                self.release_reference(child);
            }
        }
        self.free(node);
    }

    fn release_reference(&mut self, node: NodeId) {
        let remaining = {
            let found = self.node_mut(node);
            found.refcount = found.refcount.saturating_sub(1);
            found.refcount
        };
        if remaining == 0 && self.pending.remove(&node) {
            self.destroy_node(node, false);
        }
    }

    fn free(&mut self, node: NodeId) {
        if let Some(freed) = self.nodes[node.0].take() {
            if let Some(id) = freed.id {
                if self.id_index.get(&id) == Some(&node) {
                    self.id_index.remove(&id);
                }
            }
            self.pending.remove(&node);
            self.freed += 1;
            if self.body == Some(node) {
                self.body = None;
            }
        }
    }

    /// Index of `child` among the children of its owner.
    pub fn position(&self, child: NodeId) -> Option<usize> {
        let parent = self[child].parent?;
        self[parent].children.iter().position(|candidate| *candidate == child)
    }

    /// Children owned by `node`, skipping span references.
    pub fn owned_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self[node]
            .children
            .iter()
            .copied()
            .filter(move |child| self[*child].parent == Some(node))
    }

    /// Check that every required child kind is present.
    pub fn check_required_children(&self, node: NodeId) -> FoliaResult<()> {
        let found = &self[node];
        for required in &found.descriptor().required_children {
            if !found.children.iter().any(|child| self[*child].is(*required)) {
                return Err(FoliaError::xml(
                    (found.line > 0).then_some(found.line),
                    format!("<{}> requires at least one <{}>", found.kind, required),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::Processor;
    use crate::schema::AnnotationType as A;

    fn sentence_doc() -> (Document, NodeId) {
        let mut doc = Document::new("doc").unwrap();
        let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
        let s = doc
            .add(body, ElementKind::Sentence, KwArgs::new().id("doc.s.1"))
            .unwrap();
        (doc, s)
    }

    #[test]
    fn rejected_appends_leave_the_tree_untouched() {
        let (mut doc, s) = sentence_doc();
        let w = doc.add(s, ElementKind::Word, KwArgs::new().id("w1")).unwrap();
        let para = doc.create(ElementKind::Paragraph, KwArgs::new().id("p1")).unwrap();
        assert!(matches!(doc.append(w, para), Err(FoliaError::Value(_))));
        assert_eq!(doc[w].children().len(), 0);
        assert_eq!(doc[para].parent(), None);

        doc.add(w, ElementKind::PosAnnotation, KwArgs::new().class("N").set("tags"))
            .unwrap();
        let err = doc
            .add(w, ElementKind::PosAnnotation, KwArgs::new().class("V").set("tags"))
            .unwrap_err();
        assert!(matches!(err, FoliaError::DuplicateAnnotation(_)));
        assert_eq!(doc[w].children().len(), 1);
        // another set is fine
        doc.add(w, ElementKind::PosAnnotation, KwArgs::new().class("NOUN").set("ud"))
            .unwrap();
        assert_eq!(doc[w].children().len(), 2);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let (mut doc, s) = sentence_doc();
        doc.add(s, ElementKind::Word, KwArgs::new().id("w1")).unwrap();
        let err = doc.create(ElementKind::Word, KwArgs::new().id("w1")).unwrap_err();
        assert!(matches!(err, FoliaError::DuplicateId(_)));
        assert_eq!(doc.index("w1").map(|w| doc[w].parent()), Some(Some(s)));
    }

    #[test]
    fn generated_ids_skip_taken_numbers() {
        let (mut doc, s) = sentence_doc();
        doc.add(s, ElementKind::Word, KwArgs::new().id("doc.s.1.w.2")).unwrap();
        let w = doc
            .add(s, ElementKind::Word, KwArgs::new().generate_id("doc.s.1"))
            .unwrap();
        assert_eq!(doc[w].id(), Some("doc.s.1.w.3"));
        let orphan = doc.create(ElementKind::Word, KwArgs::new()).unwrap();
        assert!(doc.generate_id(orphan, "w").is_err());
    }

    #[test]
    fn corrections_get_ids_on_append() {
        let (mut doc, s) = sentence_doc();
        let correction = doc.add(s, ElementKind::Correction, KwArgs::new()).unwrap();
        assert_eq!(doc[correction].id(), Some("doc.s.1.correction.1"));
    }

    #[test]
    fn undeclared_sets_fail_without_autodeclare() {
        let (mut doc, s) = sentence_doc();
        doc.set_mode(doc.mode() - DocumentMode::AUTODECLARE);
        let w = doc.add(s, ElementKind::Word, KwArgs::new()).unwrap_err();
        assert!(matches!(w, FoliaError::Declaration(_)));
        doc.declare(A::Token, None, DeclareArgs::new()).unwrap();
        doc.add(s, ElementKind::Word, KwArgs::new()).unwrap();
    }

    #[test]
    fn ambiguous_default_sets_are_declaration_errors() {
        let (mut doc, s) = sentence_doc();
        let w = doc.add(s, ElementKind::Word, KwArgs::new()).unwrap();
        doc.declare(A::Pos, Some("a"), DeclareArgs::new()).unwrap();
        doc.declare(A::Pos, Some("b"), DeclareArgs::new()).unwrap();
        let err = doc
            .add(w, ElementKind::PosAnnotation, KwArgs::new().class("N"))
            .unwrap_err();
        assert!(matches!(err, FoliaError::Declaration(_)));
    }

    #[test]
    fn several_processors_need_an_explicit_choice() {
        let (mut doc, s) = sentence_doc();
        for id in ["p1", "p2"] {
            doc.provenance_mut().add(Processor::new(id, "tagger")).unwrap();
        }
        doc.declare(A::Pos, Some("tags"), DeclareArgs::new().processor("p1").processor("p2"))
            .unwrap();
        let w = doc.add(s, ElementKind::Word, KwArgs::new()).unwrap();
        let err = doc
            .add(w, ElementKind::PosAnnotation, KwArgs::new().class("N"))
            .unwrap_err();
        assert!(matches!(err, FoliaError::NoDefault(_)), "{}", err);
        assert!(doc[w].children().is_empty());

        let pos = doc
            .add(w, ElementKind::PosAnnotation, KwArgs::new().class("N").processor("p2"))
            .unwrap();
        assert_eq!(doc[pos].processor(), Some("p2"));
    }

    #[test]
    fn declared_defaults_fill_nodes() {
        let (mut doc, s) = sentence_doc();
        doc.declare(A::Pos, Some("tags"), DeclareArgs::new().annotator("frog"))
            .unwrap();
        let w = doc.add(s, ElementKind::Word, KwArgs::new()).unwrap();
        let pos = doc
            .add(w, ElementKind::PosAnnotation, KwArgs::new().class("N"))
            .unwrap();
        assert_eq!(doc[pos].set(), Some("tags"));
        assert_eq!(doc[pos].annotator(), Some("frog"));
    }

    #[test]
    fn preserve_and_auth_are_inherited() {
        let (mut doc, s) = sentence_doc();
        let alt = doc.create(ElementKind::Alternative, KwArgs::new()).unwrap();
        let pos = doc
            .create(ElementKind::PosAnnotation, KwArgs::new().class("N"))
            .unwrap();
        doc.append(alt, pos).unwrap();
        let w = doc
            .add(s, ElementKind::Word, KwArgs::new().with("xml:space", "preserve"))
            .unwrap();
        doc.append(w, alt).unwrap();
        assert!(!doc[pos].auth());
        assert!(doc[w].auth());
        let t = doc.set_text(w, "x", "current").unwrap();
        assert_eq!(doc[t].preserve(), SpacePreserve::Preserve);
    }

    #[test]
    fn references_keep_their_owner() {
        let (mut doc, s) = sentence_doc();
        let w = doc.add(s, ElementKind::Word, KwArgs::new().id("w1")).unwrap();
        let layer = doc.add(s, ElementKind::EntitiesLayer, KwArgs::new()).unwrap();
        let entity = doc
            .add(layer, ElementKind::Entity, KwArgs::new().class("per"))
            .unwrap();
        doc.append(entity, w).unwrap();
        assert_eq!(doc[w].parent(), Some(s));
        assert_eq!(doc[w].refcount(), 1);
        assert!(doc.append(entity, w).is_err());

        // a non-referable node cannot get a second parent
        let p = doc.create(ElementKind::Paragraph, KwArgs::new()).unwrap();
        let s2 = doc.add(p, ElementKind::Sentence, KwArgs::new()).unwrap();
        assert!(doc.append(layer, s2).is_err());

        doc.remove(entity, w).unwrap();
        assert_eq!(doc[w].refcount(), 0);
        assert_eq!(doc[w].parent(), Some(s));
    }

    #[test]
    fn destroying_a_referenced_word_defers_until_released() {
        let (mut doc, s) = sentence_doc();
        let w = doc.add(s, ElementKind::Word, KwArgs::new().id("w1").text("Jan")).unwrap();
        let layer = doc.add(s, ElementKind::EntitiesLayer, KwArgs::new()).unwrap();
        let entity = doc
            .add(layer, ElementKind::Entity, KwArgs::new().class("per"))
            .unwrap();
        doc.append(entity, w).unwrap();
        let before = doc.stats();

        doc.destroy(w).unwrap();
        assert!(doc.is_live(w));
        assert_eq!(doc.stats().pending, 1);
        assert_eq!(doc.stats().freed, before.freed);
        assert!(!doc[s].children().contains(&w));
        assert!(doc.destroy(w).is_err());

        doc.destroy(entity).unwrap();
        assert!(!doc.is_live(w));
        assert_eq!(doc.stats().pending, 0);
        // entity, word, its t and the raw text leaf
        assert_eq!(doc.stats().freed, before.freed + 4);
        assert_eq!(doc.index("w1"), None);
    }

    #[test]
    fn required_children() {
        let (mut doc, s) = sentence_doc();
        let layer = doc.add(s, ElementKind::DependenciesLayer, KwArgs::new()).unwrap();
        let dep = doc
            .add(layer, ElementKind::Dependency, KwArgs::new().class("su"))
            .unwrap();
        assert!(doc.check_required_children(dep).is_err());
        doc.add(dep, ElementKind::Headspan, KwArgs::new()).unwrap();
        doc.add(dep, ElementKind::DependencyDependent, KwArgs::new()).unwrap();
        doc.check_required_children(dep).unwrap();
    }
}
