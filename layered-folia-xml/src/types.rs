//! Tree types.

/// A parsed XML document: the root element plus anything that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Comments and processing instructions found before the root element.
    pub prolog: Vec<XmlChild>,
    /// The document element.
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self {
            prolog: Vec::new(),
            root,
        }
    }
}

/// A single `name="value"` pair. Names keep their prefix (`xml:id`, `xlink:href`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    Element(XmlElement),
    /// Unescaped character data (CDATA sections are folded in here).
    Text(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl XmlChild {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlChild::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlChild::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// An element with its attributes in source order and its children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Qualified name as written, e.g. `w` or `xlink:simple`.
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlChild>,
    /// 1-based line of the start tag; 0 for elements built in memory.
    pub line: usize,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter. Replaces an existing attribute of the same name.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(XmlAttribute { name, value }),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Local part of the element name (`simple` for `xlink:simple`).
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn push_element(&mut self, child: XmlElement) {
        self.children.push(XmlChild::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlChild::Text(text.into()));
    }

    /// Child elements, skipping text, comments and processing instructions.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> + '_ {
        self.children.iter().filter_map(XmlChild::as_element)
    }

    /// First child element with the given name.
    pub fn element(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenation of the direct text children.
    pub fn text(&self) -> String {
        self.children.iter().filter_map(XmlChild::as_text).collect()
    }

    /// True when any direct child is character data.
    pub fn has_text_children(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, XmlChild::Text(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut element = XmlElement::new("w")
            .with_attribute("xml:id", "w.1")
            .with_attribute("class", "WORD");
        element.set_attribute("xml:id", "w.2");

        assert_eq!(element.attributes.len(), 2);
        assert_eq!(element.attributes[0], XmlAttribute::new("xml:id", "w.2"));
        assert_eq!(element.attribute("class"), Some("WORD"));
        assert_eq!(element.attribute("set"), None);
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(XmlElement::new("xlink:simple").local_name(), "simple");
        assert_eq!(XmlElement::new("t").local_name(), "t");
    }

    #[test]
    fn text_only_joins_direct_text() {
        let mut element = XmlElement::new("t");
        element.push_text("hello ");
        let mut style = XmlElement::new("t-style");
        style.push_text("big");
        element.push_element(style);
        element.push_text(" world");

        assert_eq!(element.text(), "hello  world");
        assert!(element.has_text_children());
        assert_eq!(element.elements().count(), 1);
    }
}
