//! Offset validation and text consistency between nodes and their ancestors.

use super::{Channel, CorrectionHandling, TextPolicy};
use crate::document::{Document, DocumentMode, Version};
use crate::error::{FoliaError, FoliaResult};
use crate::node::NodeId;
use crate::schema::{self, Capabilities, ElementKind};

/// Collapse runs of whitespace and control characters to one space,
/// optionally trimming both ends.
///
/// ```
/// use layered_folia::text::normalize_spaces;
///
/// assert_eq!(normalize_spaces("  a\n\tb  ", true), "a b");
/// assert_eq!(normalize_spaces("  a\n\tb  ", false), " a b ");
/// ```
pub fn normalize_spaces(text: &str, trim: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() || c.is_control() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    if trim {
        out.trim().to_string()
    } else {
        out
    }
}

/// Documents before this version were written with untrimmed offsets.
const TRIMMED_OFFSETS: Version = Version::new(2, 4, 1);

/// Offsets count characters from 1, so offset 1 is the first character.
fn slice_matches(target: &str, offset: usize, text: &str) -> bool {
    let Some(start) = offset.checked_sub(1) else {
        return false;
    };
    let len = text.chars().count();
    if start + len > target.chars().count() {
        return false;
    }
    target.chars().skip(start).take(len).eq(text.chars())
}

fn in_correction_family(kind: ElementKind) -> bool {
    kind == ElementKind::Correction || schema::is_subtype(kind, ElementKind::AbstractCorrectionChild)
}

impl Document {
    /// Validate every buffered content node carrying an explicit offset.
    ///
    /// The buffers are drained, so each claim is checked once.
    pub fn validate_offsets(&mut self) -> FoliaResult<()> {
        for (buffer, channel) in [
            (std::mem::take(&mut self.text_offsets), Channel::Text),
            (std::mem::take(&mut self.phon_offsets), Channel::Phon),
        ] {
            let mut seen = std::collections::HashSet::new();
            for content in buffer {
                if !seen.insert(content) || !self.is_live(content) {
                    continue;
                }
                self.check_offset(content, channel)?;
            }
        }
        Ok(())
    }

    /// The node whose text a content node claims to be a substring of.
    ///
    /// An explicit `ref` wins; otherwise it is the nearest ancestor above
    /// the content's own parent that holds content of the same class.
    pub fn offset_reference(&self, content: NodeId) -> FoliaResult<NodeId> {
        let found = &self[content];
        if let Some(reference) = found.extra("ref") {
            return self.index(reference).ok_or_else(|| {
                FoliaError::UnresolvableTextContent(format!("reference '{}' does not exist", reference))
            });
        }
        let channel = if found.kind == ElementKind::PhonContent {
            Channel::Phon
        } else {
            Channel::Text
        };
        let class = found.content_class();
        found
            .parent
            .into_iter()
            .flat_map(|parent| self.ancestors(parent))
            .find(|ancestor| {
                schema::accepts(self[*ancestor].kind, channel.content_kind())
                    && self.content_node(*ancestor, class, channel).is_ok()
            })
            .ok_or_else(|| {
                FoliaError::UnresolvableTextContent(format!(
                    "no ancestor of {} carries {} of class '{}'",
                    content,
                    channel.content_kind(),
                    class
                ))
            })
    }

    fn check_offset(&mut self, content: NodeId, channel: Channel) -> FoliaResult<()> {
        let Some(offset) = self[content].offset() else {
            return Ok(());
        };
        let class = self[content].content_class().to_string();
        let target = self.offset_reference(content)?;
        let policy = TextPolicy::class(class.as_str());
        let own = normalize_spaces(&self.content_string(content, &policy), true);
        let reference = self.own_content(target, &class, channel)?;

        if slice_matches(&normalize_spaces(&reference, true), offset, &own) {
            return Ok(());
        }
        if slice_matches(&normalize_spaces(&reference, false), offset, &own) {
            let label = self[target].id.clone().unwrap_or_else(|| target.to_string());
            let message = format!(
                "{} of {} at offset {} only matches with untrimmed offsets (written before {})",
                channel.content_kind(),
                label,
                offset,
                TRIMMED_OFFSETS
            );
            self.warn(message);
            return Ok(());
        }
        Err(FoliaError::UnresolvableTextContent(format!(
            "'{}' not found at offset {} of '{}' ({})",
            own,
            offset,
            reference,
            self[target].id.as_deref().unwrap_or(self[target].kind.tag())
        )))
    }

    /// Check that the explicit text of `node` agrees with the text derived
    /// from its children, for every class it carries.
    ///
    /// Inside corrections the explicit text only needs to contain the derived
    /// text. With [`DocumentMode::FIX_TEXT`] mismatches are repaired by
    /// overwriting the explicit text.
    pub fn check_text_consistency(&mut self, node: NodeId) -> FoliaResult<()> {
        self.check_live(node)?;
        let found = &self[node];
        if !found.has(Capabilities::PRINTABLE)
            || found.has(Capabilities::TEXT_CONTAINER)
            || in_correction_family(found.kind)
        {
            return Ok(());
        }
        let correction_context = self
            .ancestors(node)
            .any(|ancestor| in_correction_family(self[ancestor].kind));

        for class in self.text_classes(node) {
            let policy = TextPolicy::class(class.as_str());
            let own = normalize_spaces(&self.own_content(node, &class, Channel::Text)?, true);
            let deep = normalize_spaces(&self.deep_render(node, &policy, Channel::Text), true);
            if deep.is_empty() || own == deep {
                continue;
            }
            if correction_context && own.contains(&deep) {
                continue;
            }
            let original = policy.clone().correction(CorrectionHandling::Original);
            if normalize_spaces(&self.deep_render(node, &original, Channel::Text), true) == own {
                continue;
            }
            if self.has_mode(DocumentMode::FIX_TEXT) {
                log::info!(
                    "fixing text of {} in class '{}': '{}' -> '{}'",
                    self[node].id.as_deref().unwrap_or(self[node].kind.tag()),
                    class,
                    own,
                    deep
                );
                self.set_text(node, &deep, &class)?;
                continue;
            }
            return Err(FoliaError::InconsistentText(format!(
                "text of <{}> {} in class '{}' is '{}' but its children read '{}'",
                self[node].kind,
                self[node].id.as_deref().unwrap_or(""),
                class,
                own,
                deep
            )));
        }
        Ok(())
    }

    /// Append-time guard: the text brought in by `child` must fit inside the
    /// text already present above `parent`.
    pub(crate) fn check_append_text(&self, parent: NodeId, child: NodeId) -> FoliaResult<()> {
        let node = &self[child];
        if in_correction_family(node.kind)
            || self
                .ancestors_or_self(parent)
                .any(|ancestor| in_correction_family(self[ancestor].kind))
            || self[parent].has(Capabilities::HIDDEN)
            || node.has(Capabilities::HIDDEN)
        {
            return Ok(());
        }

        match node.kind {
            ElementKind::TextContent | ElementKind::PhonContent => {
                let channel = if node.kind == ElementKind::TextContent {
                    Channel::Text
                } else {
                    Channel::Phon
                };
                let class = node.content_class();
                let text = self.content_string(child, &TextPolicy::class(class));
                self.check_contained(self.ancestors(parent), &text, class, channel)
            }
            _ if node.has(Capabilities::PRINTABLE) && !node.has(Capabilities::TEXT_CONTAINER) => {
                for content in &node.children {
                    let found = &self[*content];
                    let channel = match found.kind {
                        ElementKind::TextContent => Channel::Text,
                        ElementKind::PhonContent => Channel::Phon,
                        _ => continue,
                    };
                    let class = found.content_class();
                    let text = self.content_string(*content, &TextPolicy::class(class));
                    self.check_contained(self.ancestors_or_self(parent), &text, class, channel)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn check_contained(
        &self,
        mut candidates: impl Iterator<Item = NodeId>,
        text: &str,
        class: &str,
        channel: Channel,
    ) -> FoliaResult<()> {
        let text = normalize_spaces(text, true);
        if text.is_empty() {
            return Ok(());
        }
        let Some((holder, reference)) = candidates.find_map(|candidate| {
            self.own_content(candidate, class, channel)
                .ok()
                .map(|reference| (candidate, reference))
        }) else {
            return Ok(());
        };
        if normalize_spaces(&reference, true).contains(&text) {
            return Ok(());
        }
        Err(FoliaError::InconsistentText(format!(
            "'{}' ({}) does not occur in '{}' of <{}> {}",
            text,
            class,
            reference,
            self[holder].kind,
            self[holder].id.as_deref().unwrap_or("")
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Document, DocumentMode};
    use crate::error::FoliaError;
    use crate::node::{KwArgs, NodeId};
    use crate::schema::ElementKind;

    fn sentence_with_text(text: &str) -> (Document, NodeId) {
        let mut doc = Document::new("doc").unwrap();
        let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
        let s = doc
            .add(body, ElementKind::Sentence, KwArgs::new().id("s1").text(text))
            .unwrap();
        (doc, s)
    }

    fn word_at(doc: &mut Document, s: NodeId, text: &str, offset: usize) -> NodeId {
        content_at(doc, s, ElementKind::TextContent, text, offset)
    }

    fn content_at(doc: &mut Document, s: NodeId, kind: ElementKind, text: &str, offset: usize) -> NodeId {
        let w = doc.add(s, ElementKind::Word, KwArgs::new()).unwrap();
        let t = doc
            .create(kind, KwArgs::new().with("offset", offset.to_string()))
            .unwrap();
        let leaf = doc.create(ElementKind::XmlText, KwArgs::new().value(text)).unwrap();
        doc.append(t, leaf).unwrap();
        doc.append(w, t).unwrap();
        w
    }

    #[test]
    fn offsets_resolve_against_the_sentence() {
        let (mut doc, s) = sentence_with_text("abcdef");
        let w = word_at(&mut doc, s, "cde", 3);
        let t = doc.text_content(w, "current").unwrap();
        assert_eq!(doc.offset_reference(t).unwrap(), s);
        doc.validate_offsets().unwrap();
        assert_eq!(doc.warnings(), 0);
    }

    #[test]
    fn wrong_offsets_are_unresolvable() {
        let (mut doc, s) = sentence_with_text("abcdef");
        word_at(&mut doc, s, "cde", 4);
        let err = doc.validate_offsets().unwrap_err();
        assert!(matches!(err, FoliaError::UnresolvableTextContent(_)));
        // the buffer is consumed
        doc.validate_offsets().unwrap();
    }

    #[test]
    fn phon_offsets_resolve_against_the_sentence() {
        let mut doc = Document::new("doc").unwrap();
        let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
        let s = doc
            .add(body, ElementKind::Sentence, KwArgs::new().id("s1").phon("abcdef"))
            .unwrap();

        let w = content_at(&mut doc, s, ElementKind::PhonContent, "cde", 3);
        let ph = doc.phon_content(w, "current").unwrap();
        assert_eq!(doc.offset_reference(ph).unwrap(), s);
        doc.validate_offsets().unwrap();

        content_at(&mut doc, s, ElementKind::PhonContent, "cde", 4);
        let err = doc.validate_offsets().unwrap_err();
        assert!(matches!(err, FoliaError::UnresolvableTextContent(_)), "{}", err);
    }

    #[test]
    fn untrimmed_offsets_only_warn() {
        let (mut doc, s) = sentence_with_text(" abc def");
        word_at(&mut doc, s, "def", 6);
        doc.validate_offsets().unwrap();
        assert_eq!(doc.warnings(), 1);
    }

    #[test]
    fn appended_text_must_occur_in_the_ancestor() {
        let (mut doc, s) = sentence_with_text("Hello world");
        doc.add(s, ElementKind::Word, KwArgs::new().text("world")).unwrap();
        let err = doc
            .add(s, ElementKind::Word, KwArgs::new().text("moon"))
            .unwrap_err();
        assert!(matches!(err, FoliaError::InconsistentText(_)));
        assert_eq!(doc[s].children().len(), 2);

        doc.set_mode(doc.mode() - DocumentMode::CHECK_TEXT);
        doc.add(s, ElementKind::Word, KwArgs::new().text("moon")).unwrap();
    }

    #[test]
    fn consistency_compares_own_and_derived_text() {
        let (mut doc, s) = sentence_with_text("Hello world");
        doc.add(s, ElementKind::Word, KwArgs::new().text("Hello")).unwrap();
        doc.add(s, ElementKind::Word, KwArgs::new().text("world")).unwrap();
        doc.check_text_consistency(s).unwrap();

        doc.add(s, ElementKind::Word, KwArgs::new().text("world")).unwrap();
        let err = doc.check_text_consistency(s).unwrap_err();
        assert!(matches!(err, FoliaError::InconsistentText(_)));

        doc.set_mode(doc.mode() | DocumentMode::FIX_TEXT);
        doc.check_text_consistency(s).unwrap();
        assert_eq!(
            doc.text(s, &crate::TextPolicy::default().strict()).unwrap(),
            "Hello world world"
        );
    }
}
