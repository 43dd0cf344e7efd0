//! Building documents from XML.

use super::{Document, DocumentConfig, DocumentMode, Version};
use crate::declaration::{DeclareArgs, UNDEFINED_SET};
use crate::error::{FoliaError, FoliaResult};
use crate::metadata::Metadata;
use crate::node::{parse_datetime, AnnotatorType, KwArgs, NodeId, Payload, SpacePreserve};
use crate::provenance::Provenance;
use crate::schema::{self, AnnotationType, Capabilities, ElementKind};
use crate::text::normalize_spaces;
use layered_folia_xml::{XmlChild, XmlDocument, XmlElement};
use std::fs;
use std::path::Path;

/// A `wref` waiting for the whole tree to exist.
#[derive(Debug)]
struct PendingRef {
    span: NodeId,
    position: usize,
    id: String,
    line: usize,
}

/// Attach the source line to an error raised while building an element.
fn at_line(err: FoliaError, line: usize) -> FoliaError {
    let located = |message: String| format!("{} (line {})", message, line);
    match err {
        FoliaError::Xml { line: None, message } => FoliaError::Xml {
            line: Some(line),
            message,
        },
        FoliaError::Value(message) => FoliaError::Value(located(message)),
        FoliaError::Declaration(message) => FoliaError::Declaration(located(message)),
        FoliaError::DuplicateId(message) => FoliaError::DuplicateId(located(message)),
        FoliaError::DuplicateAnnotation(message) => FoliaError::DuplicateAnnotation(located(message)),
        other => other,
    }
}

impl Document {
    /// Parse a document with the default configuration.
    pub fn from_xml_str(input: &str) -> FoliaResult<Document> {
        Self::from_xml_str_with(input, &DocumentConfig::default())
    }

    pub fn from_xml_str_with(input: &str, config: &DocumentConfig) -> FoliaResult<Document> {
        let xml = layered_folia_xml::parse(input)?;
        Self::from_xml(&xml, config)
    }

    pub fn from_file(path: &Path, config: &DocumentConfig) -> FoliaResult<Document> {
        let input = fs::read_to_string(path)?;
        log::debug!("reading {}", path.display());
        Self::from_xml_str_with(&input, config)
    }

    /// Build a document from a parsed XML tree.
    ///
    /// Offsets are validated once the body is complete; with text checking
    /// on, every node is then checked bottom-up for text consistency.
    pub fn from_xml(xml: &XmlDocument, config: &DocumentConfig) -> FoliaResult<Document> {
        let root = &xml.root;
        if root.local_name() != "FoLiA" {
            return Err(FoliaError::xml(
                Some(root.line),
                format!("expected <FoLiA> root, found <{}>", root.name),
            ));
        }
        let id = root
            .attribute("xml:id")
            .ok_or_else(|| FoliaError::xml(Some(root.line), "<FoLiA> without xml:id"))?;
        let version = match root.attribute("version") {
            Some(version) => version.parse()?,
            None => Version::new(1, 0, 0),
        };
        let mut doc = Document::with_mode(id, version, config.mode_for(&version))?;
        doc.parsing = true;

        let mut body = None;
        for child in root.elements() {
            match child.local_name() {
                "metadata" => doc.read_metadata(child)?,
                "text" | "speech" if body.is_none() => body = Some(child),
                other => doc.unexpected(child.line, format!("unexpected <{}> below <FoLiA>", other))?,
            }
        }

        if let Some(body) = body {
            let mut pending = Vec::new();
            let node = doc.parse_element(body, SpacePreserve::Unset, &mut pending)?;
            doc.set_body(node);
            doc.resolve_references(pending)?;
        }
        doc.parsing = false;

        doc.validate_offsets()?;
        if doc.has_mode(DocumentMode::CHECK_TEXT) {
            if let Some(body) = doc.body() {
                doc.check_subtree_text(body)?;
            }
        }
        log::debug!(
            "parsed document {} (version {}, {} nodes)",
            doc.id(),
            doc.version(),
            doc.stats().live
        );
        Ok(doc)
    }

    /// Raise an XML error, or only warn in permissive mode.
    fn unexpected(&mut self, line: usize, message: String) -> FoliaResult<()> {
        if self.has_mode(DocumentMode::PERMISSIVE) {
            self.warn(format!("{} (line {})", message, line));
            Ok(())
        } else {
            Err(FoliaError::xml(Some(line), message))
        }
    }

    fn read_metadata(&mut self, element: &XmlElement) -> FoliaResult<()> {
        if let Some(provenance) = element.element("provenance") {
            *self.provenance_mut() = Provenance::from_xml(provenance)?;
        }
        if let Some(annotations) = element.element("annotations") {
            self.read_declarations(annotations)?;
        }
        *self.metadata_mut() = Metadata::from_xml(element);
        Ok(())
    }

    fn read_declarations(&mut self, element: &XmlElement) -> FoliaResult<()> {
        let legacy = self.version().is_legacy();
        for decl in element.elements() {
            let line = decl.line;
            let Some(annotation_type) = AnnotationType::from_declaration_tag(decl.local_name(), legacy) else {
                self.unexpected(line, format!("unknown declaration <{}>", decl.name))?;
                continue;
            };
            let set = match decl.attribute("set") {
                Some(set) => Some(set.to_string()),
                None if legacy && annotation_type != AnnotationType::Text => Some(UNDEFINED_SET.to_string()),
                None => None,
            };

            let mut args = DeclareArgs::new();
            if let Some(annotator) = decl.attribute("annotator") {
                args = args.annotator(annotator);
            }
            if let Some(value) = decl.attribute("annotatortype") {
                let annotator_type = AnnotatorType::parse(value)
                    .ok_or_else(|| FoliaError::xml(Some(line), format!("invalid annotatortype '{}'", value)))?;
                args = args.annotator_type(annotator_type);
            }
            if let Some(datetime) = decl.attribute("datetime") {
                args = args.datetime(parse_datetime(datetime).map_err(|err| at_line(err, line))?);
            }
            if let Some(format) = decl.attribute("format") {
                args = args.format(format);
            }
            if let Some(alias) = decl.attribute("alias") {
                args = args.alias(alias);
            }
            for annotator in decl.elements().filter(|child| child.local_name() == "annotator") {
                if let Some(processor) = annotator.attribute("processor") {
                    args = args.processor(processor);
                }
            }
            self.declare(annotation_type, set.as_deref(), args)
                .map_err(|err| at_line(err, line))?;
        }
        Ok(())
    }

    fn parse_element(
        &mut self,
        xml: &XmlElement,
        inherited: SpacePreserve,
        pending: &mut Vec<PendingRef>,
    ) -> FoliaResult<NodeId> {
        let line = xml.line;
        let legacy = self.version().is_legacy();
        let kind = schema::kind_for_tag(xml.local_name(), legacy)
            .ok_or_else(|| FoliaError::xml(Some(line), format!("unknown element <{}>", xml.name)))?;

        let mut args = KwArgs::new();
        let mut features = Vec::new();
        for attr in &xml.attributes {
            let name = attr.name.as_str();
            if name == "xmlns" || name.starts_with("xmlns:") {
                continue;
            }
            match schema::foldable_feature(kind, name) {
                Some(feature) => features.push((feature, attr.value.clone())),
                None => args.insert(name, attr.value.as_str()),
            }
        }
        let desc = schema::descriptor_of(kind);
        let holds_value = desc.has(Capabilities::VALUE);
        if holds_value {
            args.insert("value", xml.text());
        }

        let node = self.create(kind, args).map_err(|err| at_line(err, line))?;
        self.node_mut(node).line = line;

        if kind == ElementKind::ForeignData {
            self.node_mut(node).payload = Payload::Foreign(xml.elements().cloned().collect());
            return Ok(node);
        }

        let preserve = match self[node].preserve {
            SpacePreserve::Unset => inherited,
            own => own,
        };
        let container = desc.has(Capabilities::TEXT_CONTAINER) || desc.has(Capabilities::PHON_CONTAINER);
        let last = xml.children.len().saturating_sub(1);

        for (index, child) in xml.children.iter().enumerate() {
            match child {
                XmlChild::Element(element) if element.local_name() == "wref" => {
                    if !self[node].is(ElementKind::AbstractSpanAnnotation) {
                        self.unexpected(element.line, format!("<wref> inside <{}>", kind))?;
                        continue;
                    }
                    let id = element
                        .attribute("id")
                        .ok_or_else(|| FoliaError::xml(Some(element.line), "<wref> without id"))?;
                    let queued = pending.iter().filter(|entry| entry.span == node).count();
                    pending.push(PendingRef {
                        span: node,
                        position: self[node].children.len() + queued,
                        id: id.to_string(),
                        line: element.line,
                    });
                }
                XmlChild::Element(element) => {
                    let item = self.parse_element(element, preserve, pending)?;
                    self.append(node, item).map_err(|err| at_line(err, element.line))?;
                }
                XmlChild::Text(text) if container => {
                    let text = if preserve == SpacePreserve::Preserve {
                        text.clone()
                    } else {
                        let mut collapsed = normalize_spaces(text, false);
                        if index == last {
                            collapsed.truncate(collapsed.trim_end().len());
                        }
                        if index == 0 {
                            collapsed = collapsed.trim_start().to_string();
                        }
                        collapsed
                    };
                    if text.is_empty() {
                        continue;
                    }
                    let leaf = self
                        .create(ElementKind::XmlText, KwArgs::new().value(text))
                        .map_err(|err| at_line(err, line))?;
                    self.append(node, leaf).map_err(|err| at_line(err, line))?;
                }
                XmlChild::Text(text) => {
                    if !holds_value && !text.trim().is_empty() {
                        self.unexpected(line, format!("unexpected text '{}' in <{}>", text.trim(), kind))?;
                    }
                }
                XmlChild::Comment(comment) => {
                    if schema::accepts(kind, ElementKind::XmlComment) {
                        let leaf = self.create(ElementKind::XmlComment, KwArgs::new().value(comment.as_str()))?;
                        self.append(node, leaf)?;
                    }
                }
                XmlChild::ProcessingInstruction(_) => {}
            }
        }

        for (feature, class) in features {
            let item = self
                .create(feature, KwArgs::new().class(class))
                .map_err(|err| at_line(err, line))?;
            self.append(node, item).map_err(|err| at_line(err, line))?;
        }
        self.check_required_children(node)?;
        Ok(node)
    }

    /// Insert the `wref` targets into their spans, in recorded order.
    fn resolve_references(&mut self, pending: Vec<PendingRef>) -> FoliaResult<()> {
        for entry in pending {
            let target = self.index(&entry.id).ok_or_else(|| {
                FoliaError::xml(Some(entry.line), format!("<wref> to unknown id '{}'", entry.id))
            })?;
            let position = entry.position.min(self[entry.span].children.len());
            self.insert(entry.span, Some(position), target)
                .map_err(|err| at_line(err, entry.line))?;
        }
        Ok(())
    }

    /// Text consistency of every node below (and including) `node`,
    /// children before parents.
    fn check_subtree_text(&mut self, node: NodeId) -> FoliaResult<()> {
        let children: Vec<NodeId> = self.owned_children(node).collect();
        for child in children {
            self.check_subtree_text(child)?;
        }
        if self.is_live(node) {
            self.check_text_consistency(node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FoLiA xmlns="http://ilk.uvt.nl/folia" xml:id="example" version="2.5.0">
  <metadata type="native">
    <annotations>
      <text-annotation/>
      <sentence-annotation/>
      <token-annotation/>
      <pos-annotation set="tags" annotator="frog"/>
      <entity-annotation set="ner"/>
    </annotations>
    <meta id="language">nld</meta>
  </metadata>
  <text xml:id="example.text">
    <s xml:id="example.s.1">
      <t>De site staat online.</t>
      <w xml:id="example.s.1.w.1"><t>De</t><pos class="LID" head="LID"/></w>
      <w xml:id="example.s.1.w.2"><t>site</t></w>
      <w xml:id="example.s.1.w.3"><t>staat</t></w>
      <w xml:id="example.s.1.w.4" space="no"><t>online</t></w>
      <w xml:id="example.s.1.w.5"><t>.</t></w>
      <entities>
        <entity class="loc"><wref id="example.s.1.w.2" t="site"/></entity>
      </entities>
    </s>
  </text>
</FoLiA>"#;

    #[test]
    fn reads_a_document() {
        let doc = Document::from_xml_str(SAMPLE).unwrap();
        assert_eq!(doc.id(), "example");
        assert_eq!(doc.version(), Version::new(2, 5, 0));
        assert_eq!(doc.metadata().get("language"), Some("nld"));
        let s = doc.index("example.s.1").unwrap();
        assert_eq!(doc.text_of(s).unwrap(), "De site staat online.");
        assert_eq!(doc.words(s).len(), 5);

        let w1 = doc.index("example.s.1.w.1").unwrap();
        let pos = doc.annotation(w1, ElementKind::PosAnnotation, None).unwrap();
        assert_eq!(doc[pos].annotator(), Some("frog"));
        assert_eq!(doc[pos].children().len(), 1);
        assert_eq!(doc[pos].line(), 16);

        let w2 = doc.index("example.s.1.w.2").unwrap();
        assert_eq!(doc[w2].refcount(), 1);
        assert_eq!(doc[w2].parent(), Some(s));
    }

    #[test]
    fn inconsistent_text_is_rejected() {
        let input = SAMPLE.replace("<t>De site staat online.</t>", "<t>Het site staat online.</t>");
        let err = Document::from_xml_str(&input).unwrap_err();
        assert!(matches!(err, FoliaError::InconsistentText(_)), "{}", err);

        let config = DocumentConfig {
            fix_text: true,
            ..DocumentConfig::default()
        };
        let doc = Document::from_xml_str_with(&input, &config).unwrap();
        let s = doc.index("example.s.1").unwrap();
        let strict = crate::text::TextPolicy::default().strict();
        assert_eq!(doc.text(s, &strict).unwrap(), "De site staat online.");
    }

    #[test]
    fn undeclared_annotations_fail_in_current_documents() {
        let input = SAMPLE.replace(r#"<entity-annotation set="ner"/>"#, "");
        let err = Document::from_xml_str(&input).unwrap_err();
        assert!(matches!(err, FoliaError::Declaration(_)), "{}", err);
        assert!(err.to_string().contains("line 21"), "{}", err);
    }

    #[test]
    fn stray_text_is_an_error_unless_permissive() {
        let input = SAMPLE.replace("<w xml:id=\"example.s.1.w.2\">", "<w xml:id=\"example.s.1.w.2\">oops");
        assert!(matches!(Document::from_xml_str(&input), Err(FoliaError::Xml { .. })));
        let config = DocumentConfig {
            permissive: true,
            ..DocumentConfig::default()
        };
        let doc = Document::from_xml_str_with(&input, &config).unwrap();
        assert_eq!(doc.warnings(), 1);
    }

    #[test]
    fn legacy_documents_get_undefined_sets() {
        let input = r#"<FoLiA xml:id="old" version="1.4">
  <metadata type="native"><annotations><pos-annotation/></annotations></metadata>
  <text xml:id="old.text"><s xml:id="old.s"><w xml:id="old.w"><t>x</t><pos class="N"/></w></s></text>
</FoLiA>"#;
        let doc = Document::from_xml_str(input).unwrap();
        let w = doc.index("old.w").unwrap();
        let pos = doc.annotation(w, ElementKind::PosAnnotation, None).unwrap();
        assert_eq!(doc[pos].set(), Some(UNDEFINED_SET));
        assert!(doc.has_mode(DocumentMode::AUTODECLARE));
    }

    #[test]
    fn whitespace_in_text_is_collapsed_unless_preserved() {
        let input = SAMPLE.replace("<t>De</t>", "<t>\n  De\n  </t>");
        let doc = Document::from_xml_str(&input).unwrap();
        let w1 = doc.index("example.s.1.w.1").unwrap();
        assert_eq!(doc.text_of(w1).unwrap(), "De");

        let input = SAMPLE.replace(r#"<t>De</t>"#, r#"<t xml:space="preserve"> De</t>"#);
        let config = DocumentConfig {
            check_text: Some(false),
            ..DocumentConfig::default()
        };
        let doc = Document::from_xml_str_with(&input, &config).unwrap();
        let w1 = doc.index("example.s.1.w.1").unwrap();
        assert_eq!(doc.text_of(w1).unwrap(), " De");
    }
}
