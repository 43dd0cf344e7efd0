//! Rendering text and phonetic content.
//!
//! Text is either explicit (a `t` child of some class) or derived from the
//! children of a structure node, joined by per-kind delimiters. Corrections
//! expose one of their versions depending on the [`TextPolicy`].

mod consistency;

pub use consistency::normalize_spaces;

use crate::document::Document;
use crate::error::{FoliaError, FoliaResult, LookupError};
use crate::node::{KwArgs, NodeId};
use crate::schema::{self, Capabilities, ElementKind};

/// Which version of a correction text is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionHandling {
    /// New, falling back to current, then original.
    #[default]
    Current,
    /// Original only.
    Original,
    /// New, current or original, whichever exists first.
    Either,
}

/// Options for [`Document::text`] and [`Document::phon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPolicy {
    pub class: String,
    /// Only the node's own `t`/`ph`, never text derived from children.
    pub strict: bool,
    /// Keep tokenisation: ignore `space="no"` on words.
    pub retain: bool,
    /// Include hidden words.
    pub hidden: bool,
    pub correction: CorrectionHandling,
}

impl Default for TextPolicy {
    fn default() -> Self {
        TextPolicy {
            class: "current".to_string(),
            strict: false,
            retain: false,
            hidden: false,
            correction: CorrectionHandling::Current,
        }
    }
}

impl TextPolicy {
    pub fn class(class: impl Into<String>) -> Self {
        TextPolicy {
            class: class.into(),
            ..TextPolicy::default()
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn retain(mut self) -> Self {
        self.retain = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn correction(mut self, correction: CorrectionHandling) -> Self {
        self.correction = correction;
        self
    }
}

/// Text or phonetic content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Channel {
    Text,
    Phon,
}

impl Channel {
    pub(crate) fn content_kind(self) -> ElementKind {
        match self {
            Channel::Text => ElementKind::TextContent,
            Channel::Phon => ElementKind::PhonContent,
        }
    }

    fn capability(self) -> Capabilities {
        match self {
            Channel::Text => Capabilities::PRINTABLE,
            Channel::Phon => Capabilities::SPEAKABLE,
        }
    }

    fn miss(self, message: String) -> LookupError {
        match self {
            Channel::Text => LookupError::NoSuchText(message),
            Channel::Phon => LookupError::NoSuchPhon(message),
        }
    }
}

impl Document {
    /// Text of `node` under `policy`.
    pub fn text(&self, node: NodeId, policy: &TextPolicy) -> Result<String, LookupError> {
        self.render(node, policy, Channel::Text)
    }

    /// Text of `node` in class `current` with default options.
    pub fn text_of(&self, node: NodeId) -> Result<String, LookupError> {
        self.text(node, &TextPolicy::default())
    }

    pub fn phon(&self, node: NodeId, policy: &TextPolicy) -> Result<String, LookupError> {
        self.render(node, policy, Channel::Phon)
    }

    pub fn has_text(&self, node: NodeId, policy: &TextPolicy) -> bool {
        matches!(self.text(node, policy), Ok(text) if !text.is_empty())
    }

    pub fn has_phon(&self, node: NodeId, policy: &TextPolicy) -> bool {
        matches!(self.phon(node, policy), Ok(phon) if !phon.is_empty())
    }

    /// The `t` child of `node` with class `class`.
    pub fn text_content(&self, node: NodeId, class: &str) -> Result<NodeId, LookupError> {
        self.content_node(node, class, Channel::Text)
    }

    /// The `ph` child of `node` with class `class`.
    pub fn phon_content(&self, node: NodeId, class: &str) -> Result<NodeId, LookupError> {
        self.content_node(node, class, Channel::Phon)
    }

    /// Classes of the `t` children of `node`, in document order.
    pub fn text_classes(&self, node: NodeId) -> Vec<String> {
        self[node]
            .children
            .iter()
            .map(|child| &self[*child])
            .filter(|child| child.kind == ElementKind::TextContent)
            .map(|child| child.content_class().to_string())
            .collect()
    }

    /// Set the text of `node` in `class`, replacing an existing `t` of that
    /// class. Returns the `t` node.
    pub fn set_text(&mut self, node: NodeId, text: &str, class: &str) -> FoliaResult<NodeId> {
        self.set_content(node, text, class, Channel::Text)
    }

    pub fn set_phon(&mut self, node: NodeId, phon: &str, class: &str) -> FoliaResult<NodeId> {
        self.set_content(node, phon, class, Channel::Phon)
    }

    fn set_content(&mut self, node: NodeId, value: &str, class: &str, channel: Channel) -> FoliaResult<NodeId> {
        self.check_live(node)?;
        let kind = channel.content_kind();
        if !schema::accepts(self[node].kind, kind) {
            return Err(FoliaError::value(format!("<{}> cannot hold <{}>", self[node].kind, kind)));
        }

        if let Ok(existing) = self.content_node(node, class, channel) {
            let old: Vec<NodeId> = self[existing].children.clone();
            for child in old {
                self.destroy(child)?;
            }
            let leaf = self.create(ElementKind::XmlText, KwArgs::new().value(value))?;
            self.append(existing, leaf)?;
            return Ok(existing);
        }

        let mut args = KwArgs::new();
        if class != "current" {
            args = args.class(class);
        }
        let content = self.create(kind, args)?;
        let leaf = self.create(ElementKind::XmlText, KwArgs::new().value(value))?;
        self.append(content, leaf)?;
        if let Err(err) = self.append(node, content) {
            self.destroy(content)?;
            return Err(err);
        }
        Ok(content)
    }

    fn content_node(&self, node: NodeId, class: &str, channel: Channel) -> Result<NodeId, LookupError> {
        let kind = channel.content_kind();
        self[node]
            .children
            .iter()
            .copied()
            .find(|child| {
                let found = &self[*child];
                found.kind == kind && found.content_class() == class
            })
            .ok_or_else(|| channel.miss(format!("no {} of class '{}' on <{}>", kind, class, self[node].kind)))
    }

    pub(crate) fn render(&self, node: NodeId, policy: &TextPolicy, channel: Channel) -> Result<String, LookupError> {
        let found = &self[node];
        match found.kind {
            ElementKind::TextContent | ElementKind::PhonContent => return Ok(self.content_string(node, policy)),
            ElementKind::XmlText => return Ok(found.value().unwrap_or_default().to_string()),
            kind if schema::is_subtype(kind, ElementKind::AbstractTextMarkup) => {
                return Ok(self.content_string(node, policy))
            }
            _ => {}
        }
        if !found.has(channel.capability()) {
            return Err(channel.miss(format!("<{}> carries no {}", found.kind, channel.content_kind())));
        }
        if found.kind == ElementKind::Correction {
            return self.render_correction(node, policy, channel);
        }
        if policy.strict {
            return self.own_content(node, &policy.class, channel);
        }
        let deep = self.deep_render(node, policy, channel);
        if !deep.is_empty() {
            return Ok(deep);
        }
        self.own_content(node, &policy.class, channel)
    }

    pub(crate) fn own_content(&self, node: NodeId, class: &str, channel: Channel) -> Result<String, LookupError> {
        let content = self.content_node(node, class, channel)?;
        Ok(self.content_string(content, &TextPolicy::class(class)))
    }

    /// Text derived from the children of `node`, joined by delimiters.
    pub(crate) fn deep_render(&self, node: NodeId, policy: &TextPolicy, channel: Channel) -> String {
        let mut out = String::new();
        let mut delimiter: Option<&str> = None;
        for child in &self[node].children {
            let found = &self[*child];
            if matches!(
                found.kind,
                ElementKind::TextContent | ElementKind::PhonContent | ElementKind::String | ElementKind::XmlComment
            ) || !found.has(channel.capability())
            {
                continue;
            }
            if found.has(Capabilities::HIDDEN) && !policy.hidden {
                continue;
            }
            let Ok(part) = self.render(*child, policy, channel) else {
                continue;
            };
            if part.is_empty() {
                continue;
            }
            if let Some(delimiter) = delimiter {
                out.push_str(delimiter);
            }
            out.push_str(&part);
            delimiter = Some(self.delimiter(*child, policy));
        }
        out
    }

    fn render_correction(&self, node: NodeId, policy: &TextPolicy, channel: Channel) -> Result<String, LookupError> {
        for wrapper in self.visible_versions(node, policy) {
            if let Ok(text) = self.render(wrapper, policy, channel) {
                return Ok(text);
            }
        }
        Err(channel.miss(format!("correction {} has no visible {}", node, channel.content_kind())))
    }

    /// Correction versions readable under `policy`, in preference order.
    pub(crate) fn visible_versions(&self, correction: NodeId, policy: &TextPolicy) -> Vec<NodeId> {
        let order: &[ElementKind] = match policy.correction {
            CorrectionHandling::Current | CorrectionHandling::Either => {
                &[ElementKind::New, ElementKind::Current, ElementKind::Original]
            }
            CorrectionHandling::Original => &[ElementKind::Original],
        };
        order
            .iter()
            .filter_map(|kind| {
                self[correction]
                    .children
                    .iter()
                    .copied()
                    .find(|child| self[*child].kind == *kind)
            })
            .collect()
    }

    /// Delimiter placed after `node` when joining sibling texts.
    pub(crate) fn delimiter(&self, node: NodeId, policy: &TextPolicy) -> &'static str {
        let found = &self[node];
        if !found.space && !policy.retain {
            return "";
        }
        if found.kind == ElementKind::Correction {
            let visible = self
                .visible_versions(node, policy)
                .into_iter()
                .find_map(|wrapper| {
                    self[wrapper]
                        .children
                        .iter()
                        .rev()
                        .copied()
                        .find(|child| self[*child].has(Capabilities::PRINTABLE) && !self[*child].is(ElementKind::AbstractContentAnnotation))
                });
            if let Some(content) = visible {
                return self.delimiter(content, policy);
            }
        }
        found.descriptor().text_delimiter
    }

    /// Flattened content of a `t`, `ph` or markup node.
    pub(crate) fn content_string(&self, node: NodeId, policy: &TextPolicy) -> String {
        let mut out = String::new();
        for child in &self[node].children {
            let found = &self[*child];
            match found.kind {
                ElementKind::XmlText => out.push_str(found.value().unwrap_or_default()),
                ElementKind::Linebreak => out.push('\n'),
                ElementKind::TextMarkupCorrection
                    if policy.correction == CorrectionHandling::Original && found.extra("original").is_some() =>
                {
                    out.push_str(found.extra("original").unwrap_or_default());
                }
                kind if schema::is_subtype(kind, ElementKind::AbstractTextMarkup) => {
                    out.push_str(&self.content_string(*child, policy));
                }
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn sentence(words: &[(&str, bool)]) -> (Document, NodeId) {
        let mut doc = Document::new("doc").unwrap();
        let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
        let s = doc.add(body, ElementKind::Sentence, KwArgs::new().id("s1")).unwrap();
        for (text, space) in words {
            let mut args = KwArgs::new().text(*text);
            if !space {
                args = args.with("space", "no");
            }
            doc.add(s, ElementKind::Word, args).unwrap();
        }
        (doc, s)
    }

    #[test]
    fn words_join_with_spaces() {
        let (doc, s) = sentence(&[("De", true), ("site", true), ("staat", true), ("online", false), (".", true)]);
        assert_eq!(doc.text_of(s).unwrap(), "De site staat online.");
        assert_eq!(doc.text(s, &TextPolicy::default().retain()).unwrap(), "De site staat online .");
    }

    #[test]
    fn strict_text_needs_an_own_t() {
        let (mut doc, s) = sentence(&[("a", true)]);
        let err = doc.text(s, &TextPolicy::default().strict()).unwrap_err();
        assert!(matches!(err, LookupError::NoSuchText(_)));
        doc.set_text(s, "a", "current").unwrap();
        assert_eq!(doc.text(s, &TextPolicy::default().strict()).unwrap(), "a");
        assert_eq!(doc.text_classes(s), vec!["current".to_string()]);
    }

    #[test]
    fn set_text_replaces_in_place() {
        let (mut doc, s) = sentence(&[]);
        let w = doc.add(s, ElementKind::Word, KwArgs::new().text("old")).unwrap();
        let t = doc.text_content(w, "current").unwrap();
        let again = doc.set_text(w, "new", "current").unwrap();
        assert_eq!(t, again);
        assert_eq!(doc.text_of(w).unwrap(), "new");
        doc.set_text(w, "NEW", "normalized").unwrap();
        assert_eq!(doc.text(w, &TextPolicy::class("normalized")).unwrap(), "NEW");
        assert_eq!(doc[w].children().len(), 2);
    }

    #[test]
    fn markup_and_linebreaks_render_inside_t() {
        let (mut doc, s) = sentence(&[]);
        let t = doc.set_text(s, "Hello", "current").unwrap();
        let style = doc
            .add(t, ElementKind::TextMarkupStyle, KwArgs::new().class("bold"))
            .unwrap();
        let leaf = doc.create(ElementKind::XmlText, KwArgs::new().value(" world")).unwrap();
        doc.append(style, leaf).unwrap();
        let br = doc.create(ElementKind::Linebreak, KwArgs::new()).unwrap();
        doc.append(t, br).unwrap();
        assert_eq!(doc.text_of(s).unwrap(), "Hello world\n");
    }

    #[test]
    fn hidden_words_are_skipped_by_default() {
        let (mut doc, s) = sentence(&[("a", true)]);
        doc.add(s, ElementKind::Hiddenword, KwArgs::new().text("PRO")).unwrap();
        doc.add(s, ElementKind::Word, KwArgs::new().text("b")).unwrap();
        assert_eq!(doc.text_of(s).unwrap(), "a b");
        assert_eq!(doc.text(s, &TextPolicy::default().hidden()).unwrap(), "a PRO b");
    }

    #[test]
    fn non_printable_nodes_have_no_text() {
        let (mut doc, s) = sentence(&[("a", true)]);
        let w = doc[s].children()[0];
        let pos = doc.add(w, ElementKind::PosAnnotation, KwArgs::new().class("N")).unwrap();
        assert!(matches!(doc.text_of(pos), Err(LookupError::NoSuchText(_))));
        assert!(!doc.has_text(pos, &TextPolicy::default()));
        assert!(matches!(doc.phon_content(w, "current"), Err(LookupError::NoSuchPhon(_))));
        doc.set_phon(w, "a:", "current").unwrap();
        assert_eq!(doc.phon(w, &TextPolicy::default()).unwrap(), "a:");
    }
}
