//! Tree outline of a document for debugging and snapshot tests.
//!
//! ```text
//! s#s1             De site staat online .
//! ├─ w#s1.w.1      De
//! │  └─ pos[LID]
//! ├─ w#s1.w.2 [A]  site
//! └─ entities
//!    └─ entity[loc] ─> [A]
//! ```

use crate::document::Document;
use crate::node::NodeId;
use crate::schema::{self, Capabilities, ElementKind};
use crate::text::TextPolicy;
use std::collections::HashMap;
use std::fmt::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ...
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

struct Row {
    head: String,
    text: Option<String>,
}

pub struct DocumentDisplay<'a> {
    doc: &'a Document,
    root: NodeId,
    include: Vec<ElementKind>,
    policy: TextPolicy,
    show_text: bool,
}

impl<'a> DocumentDisplay<'a> {
    /// Structure, corrections and text below `root`; annotations only once
    /// included.
    pub fn new(doc: &'a Document, root: NodeId) -> Self {
        DocumentDisplay {
            doc,
            root,
            include: Vec::new(),
            policy: TextPolicy::default(),
            show_text: true,
        }
    }

    /// Also show annotations of `kind` (or a subtype).
    pub fn include(&mut self, kind: ElementKind) {
        if !self.include.contains(&kind) {
            self.include.push(kind);
        }
    }

    pub fn with(mut self, kind: ElementKind) -> Self {
        self.include(kind);
        self
    }

    pub fn policy(mut self, policy: TextPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn without_text(mut self) -> Self {
        self.show_text = false;
        self
    }

    fn is_correction_part(kind: ElementKind) -> bool {
        matches!(
            kind,
            ElementKind::Correction
                | ElementKind::New
                | ElementKind::Original
                | ElementKind::Current
                | ElementKind::Suggestion
        )
    }

    fn shown(&self, node: NodeId) -> bool {
        let found = &self.doc[node];
        let kind = found.kind();
        if kind.is_internal() || matches!(kind, ElementKind::TextContent | ElementKind::PhonContent) {
            return false;
        }
        if schema::is_subtype(kind, ElementKind::AbstractStructure)
            || Self::is_correction_part(kind)
            || self.include.iter().any(|included| found.is(*included))
        {
            return true;
        }
        // layers and other containers appear when something inside them does
        self.owned(node).any(|child| self.shown(child))
    }

    fn owned(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.doc[node]
            .children()
            .iter()
            .copied()
            .filter(move |child| self.doc[*child].parent() == Some(node))
    }

    /// Labels for nodes referenced by the shown span annotations, in order
    /// of first reference.
    fn reference_labels(&self) -> HashMap<NodeId, String> {
        let mut targets = Vec::new();
        self.collect_references(self.root, &mut targets);
        targets
            .into_iter()
            .enumerate()
            .map(|(i, node)| (node, format!("[{}]", index_to_base26_label(i))))
            .collect()
    }

    fn collect_references(&self, node: NodeId, targets: &mut Vec<NodeId>) {
        for child in self.doc[node].children() {
            if self.doc[*child].parent() != Some(node) {
                if self.shown(node) && !targets.contains(child) {
                    targets.push(*child);
                }
            } else {
                self.collect_references(*child, targets);
            }
        }
    }

    fn label(&self, node: NodeId, labels: &HashMap<NodeId, String>) -> String {
        let found = &self.doc[node];
        let mut label = found.kind().tag().to_string();
        if let Some(id) = found.id() {
            write!(label, "#{}", id).ok();
        }
        if let Some(class) = found.class() {
            write!(label, "[{}]", class).ok();
        }
        if let Some(own) = labels.get(&node) {
            write!(label, " {}", own).ok();
        }
        let references: Vec<&str> = found
            .children()
            .iter()
            .filter(|child| self.doc[**child].parent() != Some(node))
            .filter_map(|child| labels.get(child).map(String::as_str))
            .collect();
        if !references.is_empty() {
            write!(label, " ─> {}", references.join(" ")).ok();
        }
        label
    }

    fn text(&self, node: NodeId) -> Option<String> {
        let found = &self.doc[node];
        let kind = found.kind();
        if !self.show_text
            || !found.has(Capabilities::PRINTABLE)
            || !(schema::is_subtype(kind, ElementKind::AbstractStructure) || Self::is_correction_part(kind))
        {
            return None;
        }
        self.doc.text(node, &self.policy).ok().filter(|text| !text.is_empty())
    }

    fn collect(&self, node: NodeId, lead: &str, rest: &str, labels: &HashMap<NodeId, String>, rows: &mut Vec<Row>) {
        rows.push(Row {
            head: format!("{}{}", lead, self.label(node, labels)),
            text: self.text(node),
        });
        let children: Vec<NodeId> = self.owned(node).filter(|child| self.shown(*child)).collect();
        for (i, child) in children.iter().enumerate() {
            let (branch, indent) = if i + 1 == children.len() {
                ("└─ ", "   ")
            } else {
                ("├─ ", "│  ")
            };
            self.collect(
                *child,
                &format!("{}{}", rest, branch),
                &format!("{}{}", rest, indent),
                labels,
                rows,
            );
        }
    }
}

impl<'a> fmt::Display for DocumentDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SPACE_PADDING: usize = 2;
        let labels = self.reference_labels();
        let mut rows = Vec::new();
        self.collect(self.root, "", "", &labels, &mut rows);

        let column = rows
            .iter()
            .filter(|row| row.text.is_some())
            .map(|row| UnicodeWidthStr::width(row.head.as_str()))
            .max()
            .unwrap_or(0)
            + SPACE_PADDING;

        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            f.write_str(&row.head)?;
            if let Some(text) = &row.text {
                for _ in UnicodeWidthStr::width(row.head.as_str())..column {
                    f.write_char(' ')?;
                }
                f.write_str(text)?;
            }
        }
        Ok(())
    }
}

impl Document {
    /// Outline of the subtree at `node`.
    pub fn display(&self, node: NodeId) -> DocumentDisplay<'_> {
        DocumentDisplay::new(self, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::KwArgs;

    #[test]
    fn test_index_to_base26_label() {
        assert_eq!(index_to_base26_label(0), "A");
        assert_eq!(index_to_base26_label(25), "Z");
        assert_eq!(index_to_base26_label(26), "AA");
        assert_eq!(index_to_base26_label(51), "AZ");
        assert_eq!(index_to_base26_label(702), "AAA");
    }

    #[test]
    fn outline_with_annotations_and_references() {
        let mut doc = Document::new("doc").unwrap();
        let body = doc.add_body(ElementKind::Text, KwArgs::new().id("doc.text")).unwrap();
        let s = doc.add(body, ElementKind::Sentence, KwArgs::new().id("s1")).unwrap();
        let mut words = Vec::new();
        for (i, word) in ["Jan", "loopt"].iter().enumerate() {
            let w = doc
                .add(s, ElementKind::Word, KwArgs::new().id(format!("s1.w.{}", i + 1)).text(*word))
                .unwrap();
            words.push(w);
        }
        doc.add(words[1], ElementKind::PosAnnotation, KwArgs::new().class("WW").set("tags"))
            .unwrap();
        let layer = doc.add(s, ElementKind::EntitiesLayer, KwArgs::new().set("ner")).unwrap();
        let entity = doc.add(layer, ElementKind::Entity, KwArgs::new().class("per")).unwrap();
        doc.append(entity, words[0]).unwrap();

        let display = doc.display(s).without_text();
        insta::assert_snapshot!(display, @r###"
        s#s1
        ├─ w#s1.w.1
        └─ w#s1.w.2
        "###);

        let display = doc
            .display(s)
            .with(ElementKind::PosAnnotation)
            .with(ElementKind::Entity);
        insta::assert_snapshot!(display, @r###"
        s#s1             Jan loopt
        ├─ w#s1.w.1 [A]  Jan
        ├─ w#s1.w.2      loopt
        │  └─ pos[WW]
        └─ entities
           └─ entity[per] ─> [A]
        "###);
    }
}
