//! Ordered key/value arguments for node construction.

use crate::error::{FoliaError, FoliaResult};

/// Keyword arguments passed to [`Document::create`](crate::Document::create).
///
/// Keys are XML attribute names (`xml:id`, `class`, `set`, ...) plus a few
/// convenience keys (`text`, `phon`, `generate_id`, `value`). The parser
/// builds the same structure from element attributes, so programmatic and
/// parsed nodes go through one validation path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KwArgs {
    entries: Vec<(String, String)>,
}

impl KwArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key='value', other="value"` pairs.
    ///
    /// ```
    /// use layered_folia::KwArgs;
    ///
    /// let args = KwArgs::parse("id='s1.w1', class=\"N\"").unwrap();
    /// assert_eq!(args.get("id"), Some("s1.w1"));
    /// assert_eq!(args.get("class"), Some("N"));
    /// ```
    pub fn parse(input: &str) -> FoliaResult<KwArgs> {
        let mut args = KwArgs::new();
        let mut chars = input.chars().peekable();
        loop {
            while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
                chars.next();
            }
            if chars.peek().is_none() {
                return Ok(args);
            }

            let mut key = String::new();
            while let Some(c) = chars.peek().copied() {
                if c == '=' || c.is_whitespace() {
                    break;
                }
                key.push(c);
                chars.next();
            }
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            if chars.next() != Some('=') || key.is_empty() {
                return Err(FoliaError::value(format!(
                    "malformed argument list near '{}' in: {}",
                    key, input
                )));
            }
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            let quote = match chars.next() {
                Some(q @ ('\'' | '"')) => q,
                _ => {
                    return Err(FoliaError::value(format!(
                        "value of '{}' must be quoted in: {}",
                        key, input
                    )))
                }
            };

            let mut value = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    c if c == quote => {
                        closed = true;
                        break;
                    }
                    c => value.push(c),
                }
            }
            if !closed {
                return Err(FoliaError::value(format!(
                    "unterminated value of '{}' in: {}",
                    key, input
                )));
            }
            args.entries.push((key, value));
        }
    }

    /// Add or replace `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.with("xml:id", id)
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.with("class", class)
    }

    pub fn set(self, set: impl Into<String>) -> Self {
        self.with("set", set)
    }

    pub fn annotator(self, annotator: impl Into<String>) -> Self {
        self.with("annotator", annotator)
    }

    pub fn processor(self, processor: impl Into<String>) -> Self {
        self.with("processor", processor)
    }

    /// Attach a `t` child with this text.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.with("text", text)
    }

    pub fn phon(self, phon: impl Into<String>) -> Self {
        self.with("phon", phon)
    }

    /// Character data of `desc`, `comment`, `content` and raw text leaves.
    pub fn value(self, value: impl Into<String>) -> Self {
        self.with("value", value)
    }

    /// Generate the id from the nearest identified ancestor of `parent_id`.
    pub fn generate_id(self, parent_id: impl Into<String>) -> Self {
        self.with("generate_id", parent_id)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KwArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = KwArgs::new();
        for (key, value) in iter {
            args.insert(key, value);
        }
        args
    }
}
