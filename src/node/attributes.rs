//! Attribute validation: the single path from [`KwArgs`] to node state.

use super::{AnnotatorType, KwArgs, Node, Payload, SpacePreserve};
use crate::error::{FoliaError, FoliaResult};
use crate::schema::{AttrFlags, Capabilities, ElementKind};
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static NCNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_.\-]*$").expect("valid NCName pattern"));

static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}:\d{2}(\.\d{1,3})?$").expect("valid time pattern"));

/// Arguments that create children or depend on the tree position, applied
/// by the document after the node itself exists.
#[derive(Debug, Default)]
pub(crate) struct Convenience {
    pub text: Option<String>,
    pub phon: Option<String>,
    pub generate_id: Option<String>,
}

pub(crate) fn is_valid_id(id: &str) -> bool {
    NCNAME.is_match(id)
}

pub(crate) fn parse_datetime(value: &str) -> FoliaResult<NaiveDateTime> {
    if value == "now" {
        let now = Local::now().naive_local();
        return Ok(now.with_nanosecond(0).unwrap_or(now));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| FoliaError::value(format!("invalid datetime: {}", value)))
}

pub(crate) fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Flag guarding a generic attribute name, `None` for non-generic names.
fn flag_for(name: &str) -> Option<AttrFlags> {
    Some(match name {
        "xml:id" => AttrFlags::ID,
        "class" => AttrFlags::CLASS,
        "annotator" | "annotatortype" | "processor" => AttrFlags::ANNOTATOR,
        "confidence" => AttrFlags::CONFIDENCE,
        "datetime" => AttrFlags::DATETIME,
        "n" => AttrFlags::N,
        "src" => AttrFlags::SRC,
        "begintime" => AttrFlags::BEGINTIME,
        "endtime" => AttrFlags::ENDTIME,
        "speaker" => AttrFlags::SPEAKER,
        "textclass" => AttrFlags::TEXTCLASS,
        "metadata" => AttrFlags::METADATA,
        "tag" => AttrFlags::TAG,
        "space" => AttrFlags::SPACE,
        _ => return None,
    })
}

/// Validate `args` against the node's descriptor and store them.
///
/// Unsupported attributes raise [`FoliaError::Value`]; in permissive mode
/// they are logged and dropped instead.
pub(crate) fn apply_args(node: &mut Node, args: KwArgs, permissive: bool) -> FoliaResult<Convenience> {
    let desc = node.descriptor();
    let allowed = desc.allowed_attributes();
    let mut convenience = Convenience::default();

    for (key, value) in args.iter() {
        let key = match key {
            "id" if !desc.allows_extra("id") => "xml:id",
            other => other,
        };

        let supported = match key {
            "set" => allowed.contains(AttrFlags::CLASS) || desc.has(Capabilities::SETONLY),
            "xml:space" => true,
            "text" => crate::schema::accepts(node.kind, ElementKind::TextContent),
            "phon" => crate::schema::accepts(node.kind, ElementKind::PhonContent),
            "value" => desc.has(Capabilities::VALUE),
            "generate_id" => allowed.contains(AttrFlags::ID),
            name if name.starts_with("xlink:") => {
                allowed.contains(AttrFlags::XLINK) || desc.has(Capabilities::XLINK)
            }
            name => match flag_for(name) {
                Some(flag) => allowed.contains(flag),
                None => desc.allows_extra(name),
            },
        };
        if !supported {
            let message = format!("attribute '{}' is not supported on <{}>", key, node.kind);
            if permissive {
                log::warn!("{}, ignoring", message);
                continue;
            }
            return Err(FoliaError::Value(message));
        }

        match key {
            "xml:id" => {
                if !is_valid_id(value) {
                    return Err(FoliaError::value(format!("invalid id '{}': not an NCName", value)));
                }
                node.id = Some(value.to_string());
            }
            "class" => node.class = Some(value.to_string()),
            "set" => node.set = Some(value.to_string()),
            "annotator" => node.annotator = Some(value.to_string()),
            "annotatortype" => {
                node.annotator_type = Some(AnnotatorType::parse(value).ok_or_else(|| {
                    FoliaError::value(format!("invalid annotatortype '{}'", value))
                })?)
            }
            "processor" => node.processor = Some(value.to_string()),
            "confidence" => {
                let confidence: f64 = value
                    .parse()
                    .map_err(|_| FoliaError::value(format!("invalid confidence '{}'", value)))?;
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(FoliaError::value(format!(
                        "confidence must be in [0,1], got {}",
                        confidence
                    )));
                }
                node.confidence = Some(confidence);
            }
            "datetime" => node.datetime = Some(parse_datetime(value)?),
            "begintime" | "endtime" => {
                if !TIME.is_match(value) {
                    return Err(FoliaError::value(format!(
                        "invalid {} '{}', expected HH:MM:SS(.mmm)",
                        key, value
                    )));
                }
                if key == "begintime" {
                    node.begin_time = Some(value.to_string());
                } else {
                    node.end_time = Some(value.to_string());
                }
            }
            "src" => node.src = Some(value.to_string()),
            "speaker" => node.speaker = Some(value.to_string()),
            "n" => node.n = Some(value.to_string()),
            "textclass" => node.textclass = Some(value.to_string()),
            "metadata" => node.metadata = Some(value.to_string()),
            "tag" => node.tag = Some(value.to_string()),
            "space" => {
                node.space = match value {
                    "yes" => true,
                    "no" => false,
                    other => {
                        return Err(FoliaError::value(format!("invalid space value '{}'", other)))
                    }
                }
            }
            "xml:space" => {
                node.preserve = match value {
                    "preserve" => SpacePreserve::Preserve,
                    "default" => SpacePreserve::Default,
                    other => {
                        return Err(FoliaError::value(format!("invalid xml:space value '{}'", other)))
                    }
                }
            }
            "text" => convenience.text = Some(value.to_string()),
            "phon" => convenience.phon = Some(value.to_string()),
            "generate_id" => convenience.generate_id = Some(value.to_string()),
            "value" => node.payload = Payload::Value(value.to_string()),
            "offset" => {
                if value.parse::<usize>().is_err() {
                    return Err(FoliaError::value(format!("invalid offset '{}'", value)));
                }
                node.extra.insert(key.to_string(), value.to_string());
            }
            other => {
                node.extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    if desc.required_attributes.contains(AttrFlags::CLASS) && node.class.is_none() {
        return Err(FoliaError::value(format!("<{}> requires a class", node.kind)));
    }
    if desc.required_attributes.contains(AttrFlags::ID) && node.id.is_none() && convenience.generate_id.is_none() {
        return Err(FoliaError::value(format!("<{}> requires an id", node.kind)));
    }

    Ok(convenience)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with(kind: ElementKind, args: &str, permissive: bool) -> FoliaResult<Node> {
        let mut node = Node::new(kind);
        apply_args(&mut node, KwArgs::parse(args)?, permissive)?;
        Ok(node)
    }

    #[test]
    fn generic_attributes() {
        let node = node_with(
            ElementKind::Word,
            "id='s.1.w.1', class='WORD', confidence='0.5', space='no', datetime='2020-01-02T03:04:05'",
            false,
        )
        .unwrap();
        assert_eq!(node.id(), Some("s.1.w.1"));
        assert_eq!(node.class(), Some("WORD"));
        assert_eq!(node.confidence(), Some(0.5));
        assert!(!node.space());
        assert_eq!(
            node.datetime().map(|dt| format_datetime(&dt)).as_deref(),
            Some("2020-01-02T03:04:05")
        );
    }

    #[test]
    fn id_is_an_extra_on_references() {
        let node = node_with(ElementKind::LinkReference, "id='w1', type='w'", false).unwrap();
        assert_eq!(node.id(), None);
        assert_eq!(node.extra("id"), Some("w1"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(node_with(ElementKind::Word, "id='1abc'", false).is_err());
        assert!(node_with(ElementKind::Word, "confidence='1.5'", false).is_err());
        assert!(node_with(ElementKind::Word, "datetime='yesterday'", false).is_err());
        assert!(node_with(ElementKind::Utterance, "begintime='1:00'", false).is_err());
        assert!(node_with(ElementKind::PosAnnotation, "set='x'", false).is_err());
    }

    #[test]
    fn permissive_mode_drops_unknown_attributes() {
        assert!(node_with(ElementKind::Word, "bogus='x'", false).is_err());
        let node = node_with(ElementKind::Word, "bogus='x', class='W'", true).unwrap();
        assert_eq!(node.class(), Some("W"));
        assert_eq!(node.extra("bogus"), None);
    }

    #[test]
    fn now_expands_to_the_current_time() {
        assert!(parse_datetime("now").is_ok());
        assert!(parse_datetime("2021-05-06").is_ok());
    }
}
