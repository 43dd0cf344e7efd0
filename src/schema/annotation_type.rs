//! Annotation types: the semantic category an element kind realizes.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

macro_rules! annotation_types {
    ($( $variant:ident => $name:expr ),* $(,)?) => {
        /// Semantic category of an annotation, distinct from the element kind.
        ///
        /// Declarations are keyed by annotation type and set; several element
        /// kinds may share one type (e.g. `entity` and the `entities` layer).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum AnnotationType {
            $( $variant, )*
        }

        impl AnnotationType {
            pub const ALL: &'static [AnnotationType] = &[ $( AnnotationType::$variant, )* ];

            /// Short name as used in declaration tags (`pos` for `pos-annotation`).
            pub fn name(self) -> &'static str {
                match self {
                    $( AnnotationType::$variant => $name, )*
                }
            }
        }
    };
}

annotation_types! {
    NoAnn => "none",
    Text => "text",
    Token => "token",
    Division => "division",
    Paragraph => "paragraph",
    Head => "head",
    List => "list",
    Figure => "figure",
    Whitespace => "whitespace",
    Linebreak => "linebreak",
    Sentence => "sentence",
    Pos => "pos",
    Lemma => "lemma",
    Domain => "domain",
    Sense => "sense",
    Syntax => "syntax",
    Chunking => "chunking",
    Entity => "entity",
    Subjectivity => "subjectivity",
    Correction => "correction",
    ErrorDetection => "errordetection",
    Phon => "phon",
    Metric => "metric",
    Dependency => "dependency",
    Timesegment => "timesegment",
    Gap => "gap",
    Quote => "quote",
    Note => "note",
    Reference => "reference",
    Relation => "relation",
    SpanRelation => "spanrelation",
    Coreference => "coreference",
    SemRole => "semrole",
    Morphological => "morphological",
    Phonological => "phonological",
    Event => "event",
    Lang => "lang",
    Style => "style",
    String => "string",
    Table => "table",
    Term => "term",
    Definition => "definition",
    Example => "example",
    Predicate => "predicate",
    Observation => "observation",
    Sentiment => "sentiment",
    Statement => "statement",
    Alternative => "alternative",
    RawContent => "rawcontent",
    Comment => "comment",
    Description => "description",
    Hyphenation => "hyphenation",
    HiddenToken => "hiddentoken",
    Modality => "modality",
    External => "external",
    HSpace => "hspace",
    Utterance => "utterance",
    Entry => "entry",
    Part => "part",
}

static BY_NAME: Lazy<HashMap<&'static str, AnnotationType>> = Lazy::new(|| {
    AnnotationType::ALL
        .iter()
        .filter(|ty| **ty != AnnotationType::NoAnn)
        .map(|ty| (ty.name(), *ty))
        .collect()
});

/// Declaration tags renamed between format generations.
const LEGACY_DECLARATIONS: &[(&str, &str)] = &[
    ("alignment", "relation"),
    ("complexalignment", "spanrelation"),
    ("subentity", "entity"),
];

impl AnnotationType {
    /// Element name used in the `annotations` block.
    pub fn declaration_tag(self) -> String {
        format!("{}-annotation", self.name())
    }

    /// Resolve a declaration element name (`pos-annotation`).
    ///
    /// Legacy names are only honoured when `legacy` is set.
    pub fn from_declaration_tag(tag: &str, legacy: bool) -> Option<AnnotationType> {
        let name = tag.strip_suffix("-annotation")?;
        if let Some(found) = BY_NAME.get(name) {
            return Some(*found);
        }
        if legacy {
            return LEGACY_DECLARATIONS
                .iter()
                .find(|(old, _)| *old == name)
                .and_then(|(_, new)| BY_NAME.get(new).copied());
        }
        None
    }

    pub fn from_name(name: &str) -> Option<AnnotationType> {
        BY_NAME.get(name).copied()
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
