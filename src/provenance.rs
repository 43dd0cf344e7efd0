//! Provenance: the ordered, nestable record of processors that touched a document.

use crate::error::{FoliaError, FoliaResult};
use crate::node::AnnotatorType;
use layered_folia_xml::{XmlChild, XmlElement};

/// One processor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processor {
    pub id: String,
    pub name: String,
    pub processor_type: AnnotatorType,
    pub version: Option<String>,
    pub folia_version: Option<String>,
    pub document_version: Option<String>,
    pub command: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub begin_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub src: Option<String>,
    pub format: Option<String>,
    pub resourcelink: Option<String>,
    /// Id of the enclosing processor.
    pub parent: Option<String>,
    pub metadata: Vec<(String, String)>,
}

impl Processor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Processor {
            id: id.into(),
            name: name.into(),
            processor_type: AnnotatorType::Auto,
            version: None,
            folia_version: None,
            document_version: None,
            command: None,
            host: None,
            user: None,
            begin_datetime: None,
            end_datetime: None,
            src: None,
            format: None,
            resourcelink: None,
            parent: None,
            metadata: Vec::new(),
        }
    }

    pub fn with_type(mut self, processor_type: AnnotatorType) -> Self {
        self.processor_type = processor_type;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    fn optional_fields(&self) -> [(&'static str, &Option<String>); 11] {
        [
            ("version", &self.version),
            ("folia_version", &self.folia_version),
            ("document_version", &self.document_version),
            ("command", &self.command),
            ("host", &self.host),
            ("user", &self.user),
            ("begindatetime", &self.begin_datetime),
            ("enddatetime", &self.end_datetime),
            ("src", &self.src),
            ("format", &self.format),
            ("resourcelink", &self.resourcelink),
        ]
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        Some(match name {
            "version" => &mut self.version,
            "folia_version" => &mut self.folia_version,
            "document_version" => &mut self.document_version,
            "command" => &mut self.command,
            "host" => &mut self.host,
            "user" => &mut self.user,
            "begindatetime" => &mut self.begin_datetime,
            "enddatetime" => &mut self.end_datetime,
            "src" => &mut self.src,
            "format" => &mut self.format,
            "resourcelink" => &mut self.resourcelink,
            _ => return None,
        })
    }
}

/// All processors of a document in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    processors: Vec<Processor>,
}

impl Provenance {
    /// Register a processor. Ids are unique; a parent must be registered first.
    pub fn add(&mut self, processor: Processor) -> FoliaResult<()> {
        if self.contains(&processor.id) {
            return Err(FoliaError::DuplicateId(processor.id));
        }
        if let Some(parent) = &processor.parent {
            if !self.contains(parent) {
                return Err(FoliaError::value(format!(
                    "parent processor '{}' of '{}' is not registered",
                    parent, processor.id
                )));
            }
        }
        self.processors.push(processor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Processor> {
        self.processors.iter().find(|processor| processor.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Top-level processors.
    pub fn roots(&self) -> impl Iterator<Item = &Processor> {
        self.processors.iter().filter(|processor| processor.parent.is_none())
    }

    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Processor> + 'a {
        self.processors
            .iter()
            .filter(move |processor| processor.parent.as_deref() == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Processor> {
        self.processors.iter()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub(crate) fn from_xml(element: &XmlElement) -> FoliaResult<Provenance> {
        let mut provenance = Provenance::default();
        for child in element.elements().filter(|child| child.name == "processor") {
            provenance.read_processor(child, None)?;
        }
        Ok(provenance)
    }

    fn read_processor(&mut self, element: &XmlElement, parent: Option<&str>) -> FoliaResult<()> {
        let line = Some(element.line);
        let id = element
            .attribute("xml:id")
            .ok_or_else(|| FoliaError::xml(line, "processor without xml:id"))?;
        let name = element
            .attribute("name")
            .ok_or_else(|| FoliaError::xml(line, format!("processor '{}' without name", id)))?;
        let mut processor = Processor::new(id, name);
        processor.parent = parent.map(str::to_string);
        for attr in &element.attributes {
            match attr.name.as_str() {
                "xml:id" | "name" => {}
                "type" => {
                    processor.processor_type = AnnotatorType::parse(&attr.value).ok_or_else(|| {
                        FoliaError::xml(line, format!("invalid processor type '{}'", attr.value))
                    })?
                }
                other => match processor.field_mut(other) {
                    Some(field) => *field = Some(attr.value.clone()),
                    None => log::debug!("ignoring processor attribute '{}'", other),
                },
            }
        }
        for meta in element.elements().filter(|child| child.name == "meta") {
            if let Some(key) = meta.attribute("id") {
                processor.metadata.push((key.to_string(), meta.text()));
            }
        }
        let id = processor.id.clone();
        self.add(processor)?;
        for child in element.elements().filter(|child| child.name == "processor") {
            self.read_processor(child, Some(&id))?;
        }
        Ok(())
    }

    pub(crate) fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new("provenance");
        for root in self.roots() {
            element.push_element(self.processor_xml(root));
        }
        element
    }

    fn processor_xml(&self, processor: &Processor) -> XmlElement {
        let mut element = XmlElement::new("processor")
            .with_attribute("xml:id", processor.id.as_str())
            .with_attribute("name", processor.name.as_str())
            .with_attribute("type", processor.processor_type.as_str());
        for (name, value) in processor.optional_fields() {
            if let Some(value) = value {
                element.set_attribute(name, value.as_str());
            }
        }
        for (key, value) in &processor.metadata {
            let mut meta = XmlElement::new("meta").with_attribute("id", key.as_str());
            meta.children.push(XmlChild::Text(value.clone()));
            element.push_element(meta);
        }
        for child in self.children(&processor.id) {
            element.push_element(self.processor_xml(child));
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_processors_round_trip() {
        let mut provenance = Provenance::default();
        provenance
            .add(Processor::new("p1", "frog").with_version("0.20"))
            .unwrap();
        provenance
            .add(Processor::new("p1.1", "mbt").with_parent("p1"))
            .unwrap();
        provenance
            .add(Processor::new("p2", "editor").with_type(AnnotatorType::Manual))
            .unwrap();

        let element = provenance.to_xml();
        assert_eq!(element.elements().count(), 2);
        let reread = Provenance::from_xml(&element).unwrap();
        assert_eq!(reread, provenance);
        assert_eq!(reread.children("p1").count(), 1);
    }

    #[test]
    fn rejects_duplicates_and_orphans() {
        let mut provenance = Provenance::default();
        provenance.add(Processor::new("p1", "a")).unwrap();
        assert!(matches!(
            provenance.add(Processor::new("p1", "b")),
            Err(FoliaError::DuplicateId(_))
        ));
        assert!(provenance.add(Processor::new("p2", "b").with_parent("nope")).is_err());
    }
}
