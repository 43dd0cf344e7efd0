//! The free-form metadata block: ordered `<meta id="key">value</meta>` entries.

use layered_folia_xml::{XmlChild, XmlElement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// `type` attribute of the metadata element; `native` unless read otherwise.
    pub kind: String,
    pub src: Option<String>,
    entries: Vec<(String, String)>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            kind: "native".to_string(),
            src: None,
            entries: Vec::new(),
        }
    }
}

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key`, keeping its position when it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the attributes and `meta` children of a `metadata` element.
    pub(crate) fn from_xml(element: &XmlElement) -> Metadata {
        let mut metadata = Metadata {
            kind: element.attribute("type").unwrap_or("native").to_string(),
            src: element.attribute("src").map(str::to_string),
            entries: Vec::new(),
        };
        for meta in element.elements().filter(|child| child.name == "meta") {
            if let Some(key) = meta.attribute("id") {
                metadata.set(key, meta.text());
            }
        }
        metadata
    }

    /// The `metadata` element with only the `meta` entries filled in.
    pub(crate) fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new("metadata").with_attribute("type", self.kind.as_str());
        if let Some(src) = &self.src {
            element.set_attribute("src", src.as_str());
        }
        for (key, value) in &self.entries {
            let mut meta = XmlElement::new("meta").with_attribute("id", key.as_str());
            meta.children.push(XmlChild::Text(value.clone()));
            element.push_element(meta);
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_their_order() {
        let mut metadata = Metadata::default();
        metadata.set("language", "nld");
        metadata.set("genre", "news");
        metadata.set("language", "eng");
        let keys: Vec<_> = metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["language", "genre"]);
        assert_eq!(metadata.get("language"), Some("eng"));
        assert_eq!(metadata.remove("genre").as_deref(), Some("news"));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn xml_round_trip() {
        let mut metadata = Metadata::default();
        metadata.set("title", "Een & ander");
        let element = metadata.to_xml();
        assert_eq!(Metadata::from_xml(&element), metadata);
    }
}
