//! Serialization of the tree back into XML text.

use crate::{XmlChild, XmlDocument, XmlElement};
use quick_xml::escape::escape;

/// Output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
    /// Emit the `<?xml ...?>` declaration.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: Some(2),
            declaration: true,
        }
    }
}

impl WriteOptions {
    pub fn compact() -> Self {
        Self {
            indent: None,
            declaration: false,
        }
    }
}

/// Serialize a document.
///
/// Elements with character data among their children are written inline so
/// that indentation never leaks into text content.
pub fn to_string(doc: &XmlDocument, options: &WriteOptions) -> String {
    let mut out = String::new();
    if options.declaration {
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
        newline(&mut out, options);
    }
    for child in &doc.prolog {
        write_leaf(&mut out, child);
        newline(&mut out, options);
    }
    write_element(&mut out, &doc.root, 0, options, false);
    if options.indent.is_some() {
        out.push('\n');
    }
    out
}

fn newline(out: &mut String, options: &WriteOptions) {
    if options.indent.is_some() {
        out.push('\n');
    }
}

fn pad(out: &mut String, depth: usize, options: &WriteOptions) {
    if let Some(width) = options.indent {
        out.extend(std::iter::repeat(' ').take(width * depth));
    }
}

fn write_element(out: &mut String, element: &XmlElement, depth: usize, options: &WriteOptions, inline: bool) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let mixed = inline || element.has_text_children();
    for child in &element.children {
        match child {
            XmlChild::Element(child) => {
                if !mixed {
                    newline(out, options);
                    pad(out, depth + 1, options);
                }
                write_element(out, child, depth + 1, options, mixed);
            }
            leaf => {
                if !mixed {
                    newline(out, options);
                    pad(out, depth + 1, options);
                }
                write_leaf(out, leaf);
            }
        }
    }
    if !mixed {
        newline(out, options);
        pad(out, depth, options);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn write_leaf(out: &mut String, child: &XmlChild) {
    match child {
        XmlChild::Text(text) => out.push_str(&escape(text.as_str())),
        XmlChild::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        XmlChild::ProcessingInstruction(instruction) => {
            out.push_str("<?");
            out.push_str(instruction);
            out.push_str("?>");
        }
        XmlChild::Element(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn sample() -> XmlDocument {
        let mut w = XmlElement::new("w").with_attribute("xml:id", "w.1");
        let mut t = XmlElement::new("t");
        t.push_text("De ");
        let mut style = XmlElement::new("t-style").with_attribute("class", "bold");
        style.push_text("site");
        t.push_element(style);
        w.push_element(t);
        w.push_element(XmlElement::new("pos").with_attribute("class", "N & V"));
        let mut s = XmlElement::new("s");
        s.push_element(w);
        XmlDocument::new(s)
    }

    #[test]
    fn indents_element_content_but_not_mixed_content() {
        let out = to_string(&sample(), &WriteOptions::default());
        insta::assert_snapshot!(out, @r###"
        <?xml version="1.0" encoding="utf-8"?>
        <s>
          <w xml:id="w.1">
            <t>De <t-style class="bold">site</t-style></t>
            <pos class="N &amp; V"/>
          </w>
        </s>
        "###);
    }

    #[test]
    fn compact_output_parses_back_to_the_same_tree() {
        let doc = sample();
        let out = to_string(&doc, &WriteOptions::compact());
        assert_eq!(
            out,
            r#"<s><w xml:id="w.1"><t>De <t-style class="bold">site</t-style></t><pos class="N &amp; V"/></w></s>"#
        );

        let mut reparsed = parse(&out).unwrap();
        clear_lines(&mut reparsed.root);
        assert_eq!(reparsed.root, doc.root);
    }

    fn clear_lines(element: &mut XmlElement) {
        element.line = 0;
        for child in element.children.iter_mut() {
            if let XmlChild::Element(child) = child {
                clear_lines(child);
            }
        }
    }
}
