//! Writing documents back to XML.

use super::{Document, DocumentMode, FOLIA_VERSION, NAMESPACE, XLINK_NAMESPACE};
use crate::declaration::{Declaration, DeclarationKey};
use crate::error::{FoliaError, FoliaResult};
use crate::node::{format_datetime, Node, NodeId, Payload, SpacePreserve};
use crate::schema::{self, Capabilities, ElementKind};
use layered_folia_xml::{WriteOptions, XmlChild, XmlDocument, XmlElement};
use std::fs;
use std::path::Path;

const GENERATOR: &str = concat!("layered-folia-", env!("CARGO_PKG_VERSION"));

impl Document {
    /// Build the XML tree of the document.
    ///
    /// Fails when a span references a node without an id.
    pub fn to_xml(&self) -> FoliaResult<XmlDocument> {
        let mut root = XmlElement::new("FoLiA")
            .with_attribute("xmlns", NAMESPACE)
            .with_attribute("xmlns:xlink", XLINK_NAMESPACE)
            .with_attribute("xml:id", self.id())
            .with_attribute("version", FOLIA_VERSION);
        if !self.has_mode(DocumentMode::STRIP) {
            root.set_attribute("generator", GENERATOR);
        }

        let mut metadata = self.metadata().to_xml();
        let mut blocks = vec![XmlChild::Element(self.declarations_xml())];
        if !self.provenance().is_empty() {
            blocks.push(XmlChild::Element(self.provenance().to_xml()));
        }
        blocks.append(&mut metadata.children);
        metadata.children = blocks;
        root.push_element(metadata);

        if let Some(body) = self.body() {
            root.push_element(self.node_xml(body, SpacePreserve::Unset)?);
        }
        Ok(XmlDocument::new(root))
    }

    /// Indented XML text with an XML declaration.
    pub fn to_xml_string(&self) -> FoliaResult<String> {
        Ok(layered_folia_xml::to_string(&self.to_xml()?, &WriteOptions::default()))
    }

    pub fn save(&self, path: &Path) -> FoliaResult<()> {
        let xml = self.to_xml_string()?;
        fs::write(path, xml)?;
        log::debug!("wrote document {} to {}", self.id(), path.display());
        Ok(())
    }

    fn declarations_xml(&self) -> XmlElement {
        let mut element = XmlElement::new("annotations");
        let entries: Vec<(&DeclarationKey, &Declaration)> = if self.has_mode(DocumentMode::CANONICAL) {
            self.declarations().iter_canonical().collect()
        } else {
            self.declarations().iter().collect()
        };
        for (key, declaration) in entries {
            let mut decl = XmlElement::new(key.annotation_type.declaration_tag());
            if let Some(set) = &key.set {
                decl.set_attribute("set", set.as_str());
            }
            if let Some(alias) = &declaration.alias {
                decl.set_attribute("alias", alias.as_str());
            }
            if let Some(annotator) = &declaration.annotator {
                decl.set_attribute("annotator", annotator.as_str());
            }
            if let Some(annotator_type) = declaration.annotator_type {
                decl.set_attribute("annotatortype", annotator_type.as_str());
            }
            if let Some(datetime) = &declaration.datetime {
                if !self.has_mode(DocumentMode::STRIP) {
                    decl.set_attribute("datetime", format_datetime(datetime));
                }
            }
            if let Some(format) = &declaration.format {
                decl.set_attribute("format", format.as_str());
            }
            for processor in &declaration.processors {
                decl.push_element(XmlElement::new("annotator").with_attribute("processor", processor.as_str()));
            }
            element.push_element(decl);
        }
        element
    }

    /// Attributes of `node` that differ from what its declaration implies.
    fn write_attributes(&self, node: &Node, element: &mut XmlElement, parent_preserve: SpacePreserve) {
        let explicit = self.has_mode(DocumentMode::EXPLICIT);
        let annotation_type = node.annotation_type();
        let set = node.set.as_deref();
        let decls = self.declarations();

        if let Some(id) = &node.id {
            element.set_attribute("xml:id", id.as_str());
        }
        if let Some(node_set) = set {
            let implied = decls.default_set(annotation_type) == Some(node_set);
            if explicit || !implied {
                element.set_attribute("set", node_set);
            }
        }
        if let Some(class) = &node.class {
            let implied = matches!(node.kind, ElementKind::TextContent | ElementKind::PhonContent) && class == "current";
            if explicit || !implied {
                element.set_attribute("class", class.as_str());
            }
        }
        if let Some(annotator) = &node.annotator {
            if explicit || decls.default_annotator(annotation_type, set) != Some(annotator.as_str()) {
                element.set_attribute("annotator", annotator.as_str());
            }
        }
        if let Some(annotator_type) = node.annotator_type {
            if explicit || decls.default_annotator_type(annotation_type, set) != Some(annotator_type) {
                element.set_attribute("annotatortype", annotator_type.as_str());
            }
        }
        if let Some(processor) = &node.processor {
            let implied = matches!(decls.default_processor(annotation_type, set), Ok(Some(default)) if default == processor);
            if explicit || !implied {
                element.set_attribute("processor", processor.as_str());
            }
        }
        if let Some(confidence) = node.confidence {
            element.set_attribute("confidence", confidence.to_string());
        }
        if let Some(datetime) = &node.datetime {
            let implied = decls.default_datetime(annotation_type, set).as_ref() == Some(datetime);
            if !self.has_mode(DocumentMode::STRIP) && (explicit || !implied) {
                element.set_attribute("datetime", format_datetime(datetime));
            }
        }
        for (name, value) in [
            ("begintime", &node.begin_time),
            ("endtime", &node.end_time),
            ("src", &node.src),
            ("speaker", &node.speaker),
            ("n", &node.n),
            ("textclass", &node.textclass),
            ("metadata", &node.metadata),
            ("tag", &node.tag),
        ] {
            if let Some(value) = value {
                element.set_attribute(name, value.as_str());
            }
        }
        if !node.space {
            element.set_attribute("space", "no");
        }
        if node.preserve != SpacePreserve::Unset && node.preserve != parent_preserve {
            let value = if node.preserve == SpacePreserve::Preserve {
                "preserve"
            } else {
                "default"
            };
            element.set_attribute("xml:space", value);
        }
        for (name, value) in &node.extra {
            element.set_attribute(name.as_str(), value.as_str());
        }
    }

    /// Typed features written as attributes of `node` instead of children.
    fn folded_features(&self, node: NodeId) -> Vec<NodeId> {
        let owner = &self[node];
        owner
            .children
            .iter()
            .copied()
            .filter(|child| {
                let feature = &self[*child];
                let Some(subset) = feature.descriptor().subset else {
                    return false;
                };
                schema::foldable_feature(owner.kind, subset) == Some(feature.kind)
                    && feature.id.is_none()
                    && feature.children.is_empty()
                    && owner
                        .children
                        .iter()
                        .filter(|sibling| self[**sibling].kind == feature.kind)
                        .count()
                        == 1
            })
            .collect()
    }

    /// Children in output order: `t` of class `current`, other `t`, then the
    /// rest, sorted by kind in canonical mode.
    fn output_order(&self, node: NodeId, skip: &[NodeId]) -> Vec<NodeId> {
        let owner = &self[node];
        let children: Vec<NodeId> = owner
            .children
            .iter()
            .copied()
            .filter(|child| !skip.contains(child))
            .collect();
        if owner.has(Capabilities::TEXT_CONTAINER) || owner.has(Capabilities::PHON_CONTAINER) {
            return children;
        }
        let rank = |child: &NodeId| {
            let found = &self[*child];
            match found.kind {
                ElementKind::TextContent if found.content_class() == "current" => 0,
                ElementKind::TextContent => 1,
                _ => 2,
            }
        };
        let mut ordered = children;
        if self.has_mode(DocumentMode::CANONICAL) {
            ordered.sort_by_key(|child| (rank(child), self[*child].kind.ordinal()));
        } else {
            ordered.sort_by_key(rank);
        }
        ordered
    }

    fn node_xml(&self, node: NodeId, parent_preserve: SpacePreserve) -> FoliaResult<XmlElement> {
        let found = &self[node];
        let mut element = XmlElement::new(found.kind.tag());
        self.write_attributes(found, &mut element, parent_preserve);

        let folded = self.folded_features(node);
        for feature in &folded {
            let feature = &self[*feature];
            if let (Some(subset), Some(class)) = (feature.descriptor().subset, feature.class.as_deref()) {
                element.set_attribute(subset, class);
            }
        }

        match &found.payload {
            Payload::Value(value) => element.push_text(value.as_str()),
            Payload::Foreign(elements) => {
                for foreign in elements {
                    element.push_element(foreign.clone());
                }
            }
            Payload::None => {}
        }

        let preserve = match found.preserve {
            SpacePreserve::Unset => parent_preserve,
            own => own,
        };
        for child in self.output_order(node, &folded) {
            let item = &self[child];
            if item.parent != Some(node) {
                element.push_element(self.reference_xml(child)?);
                continue;
            }
            match item.kind {
                ElementKind::XmlText => element.push_text(item.value().unwrap_or_default()),
                ElementKind::XmlComment => element
                    .children
                    .push(XmlChild::Comment(item.value().unwrap_or_default().to_string())),
                _ => element.push_element(self.node_xml(child, preserve)?),
            }
        }

        // keep text containers on one line so indentation does not become text
        if (found.has(Capabilities::TEXT_CONTAINER) || found.has(Capabilities::PHON_CONTAINER))
            && !element.children.is_empty()
            && !element.has_text_children()
        {
            element.children.insert(0, XmlChild::Text(String::new()));
        }
        Ok(element)
    }

    fn reference_xml(&self, node: NodeId) -> FoliaResult<XmlElement> {
        let found = &self[node];
        let id = found.id.as_deref().ok_or_else(|| {
            FoliaError::value(format!("cannot write a reference to <{}> {} without an id", found.kind, node))
        })?;
        let mut element = XmlElement::new("wref").with_attribute("id", id);
        if let Ok(text) = self.text_of(node) {
            element.set_attribute("t", text);
        }
        Ok(element)
    }
}
