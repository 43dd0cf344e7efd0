//! quick-xml backed tree builder with line tracking.

use crate::{XmlAttribute, XmlChild, XmlDocument, XmlElement, XmlError, XmlResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parse XML text into an [`XmlDocument`].
///
/// Whitespace is kept verbatim; interpreting it (e.g. `xml:space`) is left
/// to the consumer. Entity references are resolved, CDATA becomes text.
pub fn parse(input: &str) -> XmlResult<XmlDocument> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().check_end_names = false;

    let mut lines = LineCounter::new(input);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut prolog = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|err| XmlError::Syntax {
            line: lines.line_at(reader.error_position() as usize),
            message: err.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                let element = open_element(&start, lines.line_at(position))?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&start, lines.line_at(position))?;
                attach(element, &mut stack, &mut root, lines.line_at(position))?;
            }
            Event::End(end) => {
                let line = lines.line_at(position);
                let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| XmlError::Syntax {
                    line,
                    message: format!("closing tag </{}> without open element", found),
                })?;
                if element.name != found {
                    return Err(XmlError::Unbalanced {
                        line,
                        expected: element.name,
                        found,
                    });
                }
                attach(element, &mut stack, &mut root, line)?;
            }
            Event::Text(text) => {
                let line = lines.line_at(position);
                let text = text.unescape().map_err(|err| XmlError::Syntax {
                    line,
                    message: err.to_string(),
                })?;
                push_text(&mut stack, &text, line, root.is_some())?;
            }
            Event::CData(data) => {
                let line = lines.line_at(position);
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                push_text(&mut stack, &text, line, root.is_some())?;
            }
            Event::Comment(comment) => {
                let comment = XmlChild::Comment(String::from_utf8_lossy(&comment.into_inner()).into_owned());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(comment),
                    None if root.is_none() => prolog.push(comment),
                    None => {}
                }
            }
            Event::PI(instruction) => {
                let instruction = XmlChild::ProcessingInstruction(String::from_utf8_lossy(&instruction).into_owned());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(instruction),
                    None if root.is_none() => prolog.push(instruction),
                    None => {}
                }
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Syntax {
            line: open.line,
            message: format!("element <{}> is never closed", open.name),
        });
    }

    let root = root.ok_or(XmlError::NoRoot)?;
    Ok(XmlDocument { prolog, root })
}

fn open_element(start: &BytesStart<'_>, line: usize) -> XmlResult<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    element.line = line;
    for attr in start.attributes() {
        let attr = attr.map_err(|err| XmlError::Syntax {
            line,
            message: err.to_string(),
        })?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| XmlError::Syntax {
            line,
            message: err.to_string(),
        })?;
        element.attributes.push(XmlAttribute {
            name,
            value: value.into_owned(),
        });
    }
    Ok(element)
}

fn attach(
    element: XmlElement,
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    line: usize,
) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Syntax {
            line,
            message: format!("second root element <{}>", element.name),
        }),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str, line: usize, after_root: bool) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            // adjacent text events (text + CDATA) are merged
            if let Some(XmlChild::Text(previous)) = parent.children.last_mut() {
                previous.push_str(text);
            } else {
                parent.push_text(text);
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::Syntax {
            line,
            message: if after_root {
                "text after the root element".to_string()
            } else {
                "text before the root element".to_string()
            },
        }),
    }
}

/// Maps byte offsets to 1-based line numbers.
///
/// Offsets arrive in increasing order during a parse, so the counter only
/// scans forward from the last position it saw.
struct LineCounter<'a> {
    input: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.input.len());
        if offset < self.offset {
            return 1 + self.input[..offset].iter().filter(|b| **b == b'\n').count();
        }
        self.line += self.input[self.offset..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.offset = offset;
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_with_lines() {
        let doc = parse("<?xml version=\"1.0\"?>\n<p xml:id=\"p.1\">\n  <s>\n    <w/>\n  </s>\n</p>\n").unwrap();

        assert_eq!(doc.root.name, "p");
        assert_eq!(doc.root.line, 2);
        let s = doc.root.element("s").unwrap();
        assert_eq!(s.line, 3);
        let w = s.element("w").unwrap();
        assert_eq!(w.line, 4);
    }

    #[test]
    fn unescapes_text_and_attributes() {
        let doc = parse(r#"<t class="a&amp;b">x &lt; y<![CDATA[ & z]]></t>"#).unwrap();

        assert_eq!(doc.root.attribute("class"), Some("a&b"));
        assert_eq!(doc.root.children, vec![XmlChild::Text("x < y & z".to_string())]);
    }

    #[test]
    fn keeps_comments_and_mixed_content() {
        let doc = parse("<t>hello <!-- note --><t-style>big</t-style> world</t>").unwrap();

        assert_eq!(doc.root.children.len(), 4);
        assert_eq!(doc.root.children[1], XmlChild::Comment(" note ".to_string()));
        assert_eq!(doc.root.text(), "hello  world");
    }

    #[test]
    fn reports_mismatched_end_tag() {
        let err = parse("<s>\n<w></s>").unwrap_err();

        assert_eq!(
            err,
            XmlError::Unbalanced {
                line: 2,
                expected: "w".to_string(),
                found: "s".to_string(),
            }
        );
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn rejects_unclosed_and_empty_input() {
        assert!(matches!(parse("<s><w>"), Err(XmlError::Syntax { .. })));
        assert_eq!(parse("   "), Err(XmlError::NoRoot));
    }
}
