//! The closed set of element kinds.

use std::fmt;

macro_rules! element_kinds {
    ($( $(#[$meta:meta])* $variant:ident => $tag:expr ),* $(,)?) => {
        /// Every element kind the model knows about, abstract kinds included.
        ///
        /// Declaration order doubles as the canonical serialization order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ElementKind {
            $( $(#[$meta])* $variant, )*
        }

        impl ElementKind {
            pub const ALL: &'static [ElementKind] = &[ $( ElementKind::$variant, )* ];

            /// XML element name. Abstract and internal kinds start with `_`.
            pub fn tag(self) -> &'static str {
                match self {
                    $( ElementKind::$variant => $tag, )*
                }
            }
        }
    };
}

element_kinds! {
    Base => "_Base",
    AbstractStructure => "_AbstractStructure",
    AbstractWord => "_AbstractWord",
    AbstractInlineAnnotation => "_AbstractInlineAnnotation",
    AbstractSpanAnnotation => "_AbstractSpanAnnotation",
    AbstractSpanRole => "_AbstractSpanRole",
    AbstractAnnotationLayer => "_AbstractAnnotationLayer",
    AbstractCorrectionChild => "_AbstractCorrectionChild",
    AbstractTextMarkup => "_AbstractTextMarkup",
    AbstractContentAnnotation => "_AbstractContentAnnotation",
    AbstractHigherOrderAnnotation => "_AbstractHigherOrderAnnotation",
    /// Raw character data inside a text container.
    XmlText => "_XmlText",
    XmlComment => "_XmlComment",

    Description => "desc",
    Comment => "comment",
    Feature => "feat",
    SynsetFeature => "synset",
    ActorFeature => "actor",
    HeadFeature => "headfeature",
    ValueFeature => "value",
    TimeFeature => "time",
    FunctionFeature => "function",
    LevelFeature => "level",
    PolarityFeature => "polarity",
    StrengthFeature => "strength",
    StyleFeature => "style",
    BegindatetimeFeature => "begindatetime",
    EnddatetimeFeature => "enddatetime",
    ForeignData => "foreign-data",

    TextContent => "t",
    PhonContent => "ph",
    RawContent => "content",

    TextMarkupString => "t-str",
    TextMarkupGap => "t-gap",
    TextMarkupCorrection => "t-correction",
    TextMarkupError => "t-error",
    TextMarkupStyle => "t-style",
    TextMarkupHSpace => "t-hspace",
    TextMarkupLanguage => "t-lang",
    TextMarkupReference => "t-ref",
    TextMarkupWhitespace => "t-whitespace",
    TextMarkupHyphbreak => "t-hbr",

    Text => "text",
    Speech => "speech",
    Division => "div",
    Head => "head",
    Paragraph => "p",
    Sentence => "s",
    Utterance => "utt",
    Word => "w",
    Hiddenword => "hiddenw",
    Morpheme => "morpheme",
    Phoneme => "phoneme",
    Part => "part",
    Linebreak => "br",
    Whitespace => "whitespace",
    Figure => "figure",
    Caption => "caption",
    Label => "label",
    List => "list",
    ListItem => "item",
    Table => "table",
    TableHead => "tablehead",
    Row => "row",
    Cell => "cell",
    Event => "event",
    Quote => "quote",
    Gap => "gap",
    Note => "note",
    Reference => "ref",
    Entry => "entry",
    Term => "term",
    Definition => "def",
    Example => "ex",
    String => "str",

    PosAnnotation => "pos",
    LemmaAnnotation => "lemma",
    SenseAnnotation => "sense",
    DomainAnnotation => "domain",
    LangAnnotation => "lang",
    SubjectivityAnnotation => "subjectivity",
    ErrorDetection => "errordetection",

    MorphologyLayer => "morphology",
    PhonologyLayer => "phonology",
    ChunkingLayer => "chunking",
    EntitiesLayer => "entities",
    SyntaxLayer => "syntax",
    DependenciesLayer => "dependencies",
    CoreferenceLayer => "coreferences",
    SemanticRolesLayer => "semroles",
    SentimentLayer => "sentiments",
    StatementLayer => "statements",
    ObservationLayer => "observations",
    ModalitiesLayer => "modalities",
    TimingLayer => "timing",
    SpanRelationLayer => "spanrelations",

    Chunk => "chunk",
    Entity => "entity",
    SyntacticUnit => "su",
    Dependency => "dependency",
    CoreferenceChain => "coreferencechain",
    SemanticRole => "semrole",
    Predicate => "predicate",
    Sentiment => "sentiment",
    Statement => "statement",
    Observation => "observation",
    Modality => "modality",
    TimeSegment => "timesegment",

    Headspan => "hd",
    DependencyDependent => "dep",
    CoreferenceLink => "coreferencelink",
    Source => "source",
    Target => "target",
    Holder => "holder",
    StatementRelation => "rel",
    Scope => "scope",
    Cue => "cue",

    Metric => "metric",
    Relation => "relation",
    LinkReference => "xref",
    SpanRelation => "spanrelation",
    External => "external",
    Alternative => "alt",
    AlternativeLayers => "altlayers",

    Correction => "correction",
    New => "new",
    Original => "original",
    Current => "current",
    Suggestion => "suggestion",
}

/// Element names renamed between format generations.
pub(crate) const LEGACY_TAGS: &[(&str, &str)] = &[
    ("alignment", "relation"),
    ("aref", "xref"),
    ("complexalignment", "spanrelation"),
    ("complexalignments", "spanrelations"),
    ("listitem", "item"),
];

impl ElementKind {
    /// Position in [`ElementKind::ALL`]; also the canonical ordering rank.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// True for internal kinds without an XML element of their own.
    pub fn is_internal(self) -> bool {
        self.tag().starts_with('_')
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_position() {
        for (idx, kind) in ElementKind::ALL.iter().enumerate() {
            assert_eq!(kind.ordinal(), idx);
        }
    }

    #[test]
    fn concrete_tags_are_unique() {
        let mut tags: Vec<_> = ElementKind::ALL
            .iter()
            .filter(|kind| !kind.is_internal())
            .map(|kind| kind.tag())
            .collect();
        let total = tags.len();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), total);
    }
}
