//! Per-document annotation declarations.
//!
//! A declaration registers an (annotation type, set) pair together with the
//! defaults nodes of that pair inherit. Usage counters track how many live
//! nodes rely on a declaration; a declaration in use cannot be removed.

use crate::error::{FoliaError, FoliaResult};
use crate::node::AnnotatorType;
use crate::schema::AnnotationType;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Set name used for setless declarations of pre-2.0 documents.
pub const UNDEFINED_SET: &str = "undefined";

/// Key of a declaration. `set` is `None` for setless declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationKey {
    pub annotation_type: AnnotationType,
    pub set: Option<String>,
}

impl DeclarationKey {
    pub fn new(annotation_type: AnnotationType, set: Option<&str>) -> Self {
        Self {
            annotation_type,
            set: set.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declaration {
    pub annotator: Option<String>,
    pub annotator_type: Option<AnnotatorType>,
    pub datetime: Option<NaiveDateTime>,
    pub format: Option<String>,
    /// Processors allowed to produce this pair, in registration order.
    pub processors: Vec<String>,
    pub alias: Option<String>,
}

/// Optional arguments of [`Declarations::declare`].
#[derive(Debug, Clone, Default)]
pub struct DeclareArgs {
    pub annotator: Option<String>,
    pub annotator_type: Option<AnnotatorType>,
    pub datetime: Option<NaiveDateTime>,
    pub format: Option<String>,
    pub processors: Vec<String>,
    pub alias: Option<String>,
}

impl DeclareArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotator(mut self, annotator: impl Into<String>) -> Self {
        self.annotator = Some(annotator.into());
        self
    }

    pub fn annotator_type(mut self, annotator_type: AnnotatorType) -> Self {
        self.annotator_type = Some(annotator_type);
        self
    }

    pub fn datetime(mut self, datetime: NaiveDateTime) -> Self {
        self.datetime = Some(datetime);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn processor(mut self, processor: impl Into<String>) -> Self {
        self.processors.push(processor.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// The declaration registry of one document.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    entries: HashMap<DeclarationKey, Declaration>,
    /// Declaration order, replayed on output.
    order: Vec<DeclarationKey>,
    /// (type, alias) -> set
    aliases: HashMap<(AnnotationType, String), String>,
    usage: HashMap<DeclarationKey, usize>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `set` through the alias table of `annotation_type`.
    pub fn unalias<'a>(&'a self, annotation_type: AnnotationType, set: &'a str) -> &'a str {
        self.aliases
            .get(&(annotation_type, set.to_string()))
            .map(String::as_str)
            .unwrap_or(set)
    }

    /// Alias of a declared set, if any.
    pub fn alias_of(&self, annotation_type: AnnotationType, set: &str) -> Option<&str> {
        self.entries
            .get(&DeclarationKey::new(annotation_type, Some(set)))
            .and_then(|decl| decl.alias.as_deref())
    }

    /// Register (or update) a declaration.
    ///
    /// An existing entry only receives the given processors when any are
    /// supplied; without processors its scalar defaults are replaced
    /// wholesale.
    pub fn declare(
        &mut self,
        annotation_type: AnnotationType,
        set: Option<&str>,
        args: DeclareArgs,
    ) -> FoliaResult<DeclarationKey> {
        if annotation_type == AnnotationType::NoAnn {
            return Err(FoliaError::declaration("cannot declare the 'none' annotation type"));
        }
        let set = set.map(|set| self.unalias(annotation_type, set).to_string());
        let key = DeclarationKey {
            annotation_type,
            set: set.clone(),
        };

        if let Some(alias) = &args.alias {
            let Some(set) = &set else {
                return Err(FoliaError::declaration(format!(
                    "alias '{}' given for a setless {} declaration",
                    alias, annotation_type
                )));
            };
            if alias != set
                && self
                    .entries
                    .contains_key(&DeclarationKey::new(annotation_type, Some(alias)))
            {
                return Err(FoliaError::declaration(format!(
                    "alias '{}' collides with a declared {} set",
                    alias, annotation_type
                )));
            }
            if let Some(existing) = self.aliases.get(&(annotation_type, alias.clone())) {
                if existing != set {
                    return Err(FoliaError::declaration(format!(
                        "alias '{}' already refers to set '{}'",
                        alias, existing
                    )));
                }
            }
            if let Some(previous) = self.alias_of(annotation_type, set) {
                if previous != alias.as_str() {
                    return Err(FoliaError::declaration(format!(
                        "set '{}' already has alias '{}'",
                        set, previous
                    )));
                }
            }
        }

        match self.entries.get_mut(&key) {
            Some(existing) => {
                if args.processors.is_empty() {
                    existing.annotator = args.annotator;
                    existing.annotator_type = args.annotator_type;
                    existing.datetime = args.datetime;
                    existing.format = args.format;
                } else {
                    for processor in args.processors {
                        if !existing.processors.contains(&processor) {
                            existing.processors.push(processor);
                        }
                    }
                }
                if let Some(alias) = args.alias {
                    existing.alias = Some(alias);
                }
            }
            None => {
                let mut processors: Vec<String> = Vec::new();
                for processor in args.processors {
                    if !processors.contains(&processor) {
                        processors.push(processor);
                    }
                }
                self.entries.insert(
                    key.clone(),
                    Declaration {
                        annotator: args.annotator,
                        annotator_type: args.annotator_type,
                        datetime: args.datetime,
                        format: args.format,
                        processors,
                        alias: args.alias,
                    },
                );
                self.order.push(key.clone());
            }
        }

        if let (Some(set), Some(alias)) = (&key.set, self.entries.get(&key).and_then(|d| d.alias.clone())) {
            self.aliases.insert((annotation_type, alias), set.clone());
        }
        Ok(key)
    }

    /// Remove a declaration. Without a set, every set of the type is removed.
    ///
    /// Fails when any affected declaration is still used by a node.
    pub fn undeclare(&mut self, annotation_type: AnnotationType, set: Option<&str>) -> FoliaResult<()> {
        let keys: Vec<DeclarationKey> = match set {
            Some(set) => {
                let set = self.unalias(annotation_type, set).to_string();
                vec![DeclarationKey::new(annotation_type, Some(&set))]
            }
            None => self
                .order
                .iter()
                .filter(|key| key.annotation_type == annotation_type)
                .cloned()
                .collect(),
        };
        for key in &keys {
            let used = self.usage(key);
            if used > 0 {
                return Err(FoliaError::declaration(format!(
                    "{} set {:?} is still used by {} node(s)",
                    annotation_type,
                    key.set.as_deref().unwrap_or(""),
                    used
                )));
            }
        }
        for key in keys {
            self.entries.remove(&key);
            self.order.retain(|entry| *entry != key);
            self.usage.remove(&key);
            if let Some(set) = &key.set {
                self.aliases
                    .retain(|(ty, _), target| !(*ty == annotation_type && *target == *set));
            }
        }
        Ok(())
    }

    pub fn get(&self, annotation_type: AnnotationType, set: Option<&str>) -> Option<&Declaration> {
        let set = set.map(|set| self.unalias(annotation_type, set));
        self.entries.get(&DeclarationKey::new(annotation_type, set))
    }

    /// True for `NoAnn`; for an empty set true when any set of the type is
    /// declared; otherwise an exact match after alias resolution.
    pub fn declared(&self, annotation_type: AnnotationType, set: Option<&str>) -> bool {
        if annotation_type == AnnotationType::NoAnn {
            return true;
        }
        match set {
            None | Some("") => self.order.iter().any(|key| key.annotation_type == annotation_type),
            Some(set) => self.get(annotation_type, Some(set)).is_some(),
        }
    }

    /// Sets declared for `annotation_type`, in declaration order.
    pub fn sets(&self, annotation_type: AnnotationType) -> impl Iterator<Item = Option<&str>> {
        self.order
            .iter()
            .filter(move |key| key.annotation_type == annotation_type)
            .map(|key| key.set.as_deref())
    }

    /// The set of `annotation_type` when exactly one declaration exists.
    ///
    /// `None` when there is no declaration, several, or a single setless one.
    pub fn default_set(&self, annotation_type: AnnotationType) -> Option<&str> {
        let mut sets = self.sets(annotation_type);
        match (sets.next(), sets.next()) {
            (Some(set), None) => set,
            _ => None,
        }
    }

    pub fn default_annotator(&self, annotation_type: AnnotationType, set: Option<&str>) -> Option<&str> {
        self.get(annotation_type, set)?.annotator.as_deref()
    }

    pub fn default_annotator_type(
        &self,
        annotation_type: AnnotationType,
        set: Option<&str>,
    ) -> Option<AnnotatorType> {
        self.get(annotation_type, set)?.annotator_type
    }

    pub fn default_datetime(&self, annotation_type: AnnotationType, set: Option<&str>) -> Option<NaiveDateTime> {
        self.get(annotation_type, set)?.datetime
    }

    pub fn default_format(&self, annotation_type: AnnotationType, set: Option<&str>) -> Option<&str> {
        self.get(annotation_type, set)?.format.as_deref()
    }

    /// The single processor registered for the pair.
    ///
    /// `Ok(None)` when none is registered; [`FoliaError::NoDefault`] when
    /// several are, since picking one would be arbitrary.
    pub fn default_processor(&self, annotation_type: AnnotationType, set: Option<&str>) -> FoliaResult<Option<&str>> {
        let Some(decl) = self.get(annotation_type, set) else {
            return Ok(None);
        };
        match decl.processors.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(single.as_str())),
            _ => Err(FoliaError::NoDefault(format!(
                "{} processors registered for {} set {:?}",
                decl.processors.len(),
                annotation_type,
                set.unwrap_or("")
            ))),
        }
    }

    /// Number of live nodes using the pair.
    pub fn usage(&self, key: &DeclarationKey) -> usize {
        self.usage.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn increment_usage(&mut self, key: &DeclarationKey) {
        *self.usage.entry(key.clone()).or_insert(0) += 1;
    }

    pub(crate) fn decrement_usage(&mut self, key: &DeclarationKey) {
        if let Some(count) = self.usage.get_mut(key) {
            *count = count.saturating_sub(1);
        }
    }

    /// Declarations in the order they were made.
    pub fn iter(&self) -> impl Iterator<Item = (&DeclarationKey, &Declaration)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|decl| (key, decl)))
    }

    /// Declarations sorted by annotation type, then set.
    pub fn iter_canonical(&self) -> impl Iterator<Item = (&DeclarationKey, &Declaration)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
        sorted.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
