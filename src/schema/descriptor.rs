//! Kind descriptors and the static table that defines them.

use super::{AnnotationType, AttrFlags, Capabilities, ElementKind};
use ElementKind as K;

/// Immutable description of one element kind.
#[derive(Debug, Clone)]
pub struct KindDescriptor {
    pub kind: ElementKind,
    /// Nearest supertype; `None` only for [`ElementKind::Base`].
    pub parent: Option<ElementKind>,
    pub annotation_type: AnnotationType,
    /// Kinds (possibly abstract) that may appear as children.
    pub accepted: Vec<ElementKind>,
    /// Kinds that must appear at least once among the children.
    pub required_children: Vec<ElementKind>,
    pub required_attributes: AttrFlags,
    pub optional_attributes: AttrFlags,
    /// Kind-specific attribute names, stored verbatim on the node.
    pub extra_attributes: &'static [&'static str],
    pub text_delimiter: &'static str,
    pub capabilities: Capabilities,
    /// Maximum number of children of this kind under one parent; 0 is unbounded.
    pub occurrences: usize,
    /// Maximum number of children of this kind per set under one parent; 0 is unbounded.
    pub occurrences_per_set: usize,
    /// Fixed subset for typed features (`synset`, `head`, ...).
    pub subset: Option<&'static str>,
}

impl KindDescriptor {
    fn new(kind: ElementKind, parent: ElementKind) -> Self {
        Self {
            kind,
            parent: Some(parent),
            annotation_type: AnnotationType::NoAnn,
            accepted: vec![K::XmlComment],
            required_children: Vec::new(),
            required_attributes: AttrFlags::empty(),
            optional_attributes: AttrFlags::empty(),
            extra_attributes: &[],
            text_delimiter: "",
            capabilities: Capabilities::AUTH,
            occurrences: 0,
            occurrences_per_set: 0,
            subset: None,
        }
    }

    fn annotation(mut self, ty: AnnotationType) -> Self {
        self.annotation_type = ty;
        self
    }

    fn accepts(mut self, kinds: &[ElementKind]) -> Self {
        for kind in kinds {
            if !self.accepted.contains(kind) {
                self.accepted.push(*kind);
            }
        }
        self
    }

    fn requires_children(mut self, kinds: &[ElementKind]) -> Self {
        self.required_children.extend_from_slice(kinds);
        self
    }

    fn required(mut self, flags: AttrFlags) -> Self {
        self.required_attributes |= flags;
        self.optional_attributes -= flags;
        self
    }

    fn optional(mut self, flags: AttrFlags) -> Self {
        self.optional_attributes = flags - self.required_attributes;
        self
    }

    fn extras(mut self, extras: &'static [&'static str]) -> Self {
        self.extra_attributes = extras;
        self
    }

    fn delimiter(mut self, delimiter: &'static str) -> Self {
        self.text_delimiter = delimiter;
        self
    }

    fn with(mut self, caps: Capabilities) -> Self {
        self.capabilities |= caps;
        self
    }

    fn without(mut self, caps: Capabilities) -> Self {
        self.capabilities -= caps;
        self
    }

    fn occurrences(mut self, max: usize) -> Self {
        self.occurrences = max;
        self
    }

    fn per_set(mut self, max: usize) -> Self {
        self.occurrences_per_set = max;
        self
    }

    fn subset(mut self, subset: &'static str) -> Self {
        self.subset = Some(subset);
        self
    }

    /// All attribute flags that may appear on this kind.
    pub fn allowed_attributes(&self) -> AttrFlags {
        self.required_attributes | self.optional_attributes
    }

    pub fn has(&self, caps: Capabilities) -> bool {
        self.capabilities.contains(caps)
    }

    pub fn is_abstract(&self) -> bool {
        self.has(Capabilities::ABSTRACT)
    }

    pub fn allows_extra(&self, name: &str) -> bool {
        self.extra_attributes.contains(&name)
    }
}

const ANNOTATION_BASE: &[ElementKind] = &[K::Description, K::Comment, K::ForeignData];

const STRUCTURE_BASE: &[ElementKind] = &[
    K::Description,
    K::Comment,
    K::ForeignData,
    K::Feature,
    K::Metric,
    K::Relation,
    K::Alternative,
    K::AlternativeLayers,
    K::AbstractAnnotationLayer,
    K::AbstractInlineAnnotation,
    K::Correction,
    K::External,
    K::String,
];

const SPAN_BASE: &[ElementKind] = &[
    K::Description,
    K::Comment,
    K::ForeignData,
    K::Feature,
    K::Metric,
    K::Word,
    K::Hiddenword,
    K::Morpheme,
    K::Phoneme,
];

const CORRECTABLE: &[ElementKind] = &[
    K::Description,
    K::Comment,
    K::ForeignData,
    K::Feature,
    K::Metric,
    K::AbstractStructure,
    K::AbstractInlineAnnotation,
    K::AbstractSpanAnnotation,
    K::AbstractAnnotationLayer,
    K::TextContent,
    K::PhonContent,
    K::String,
    K::Correction,
];

const INLINE_TEXT: &[ElementKind] = &[
    K::Linebreak,
    K::Whitespace,
    K::Part,
    K::Reference,
    K::Gap,
    K::Note,
    K::TextContent,
    K::PhonContent,
];

const BLOCK_CONTENT: &[ElementKind] = &[
    K::Paragraph,
    K::Sentence,
    K::Word,
    K::Hiddenword,
    K::List,
    K::Figure,
    K::Table,
    K::Utterance,
    K::Quote,
    K::Event,
];

fn abstract_kind(kind: ElementKind, parent: ElementKind) -> KindDescriptor {
    KindDescriptor::new(kind, parent).with(Capabilities::ABSTRACT)
}

fn structure(kind: ElementKind, ty: AnnotationType) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractStructure)
        .annotation(ty)
        .accepts(STRUCTURE_BASE)
        .optional(AttrFlags::ALL)
        .delimiter("\n\n")
        .with(Capabilities::PRINTABLE | Capabilities::SPEAKABLE)
}

fn word_like(kind: ElementKind, ty: AnnotationType) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractWord)
        .annotation(ty)
        .accepts(STRUCTURE_BASE)
        .optional(AttrFlags::ALL)
        .with(Capabilities::PRINTABLE | Capabilities::SPEAKABLE | Capabilities::WREFABLE)
}

fn inline(kind: ElementKind, ty: AnnotationType) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractInlineAnnotation)
        .annotation(ty)
        .accepts(ANNOTATION_BASE)
        .accepts(&[K::Feature, K::Metric])
        .optional(AttrFlags::ALL)
        .required(AttrFlags::CLASS)
        .per_set(1)
}

fn span(kind: ElementKind, ty: AnnotationType) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractSpanAnnotation)
        .annotation(ty)
        .accepts(SPAN_BASE)
        .optional(AttrFlags::ALL)
}

fn role(kind: ElementKind) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractSpanRole)
        .accepts(SPAN_BASE)
        .optional(AttrFlags::ID | AttrFlags::N | AttrFlags::TEXTCLASS | AttrFlags::METADATA | AttrFlags::TAG)
}

fn layer(kind: ElementKind, ty: AnnotationType, members: &[ElementKind]) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractAnnotationLayer)
        .annotation(ty)
        .accepts(ANNOTATION_BASE)
        .accepts(&[K::Correction])
        .accepts(members)
        .optional(
            AttrFlags::ID
                | AttrFlags::ANNOTATOR
                | AttrFlags::CONFIDENCE
                | AttrFlags::DATETIME
                | AttrFlags::N
                | AttrFlags::METADATA
                | AttrFlags::TAG,
        )
        .with(Capabilities::SETONLY)
        .per_set(1)
}

fn feature(kind: ElementKind, subset: &'static str) -> KindDescriptor {
    KindDescriptor::new(kind, K::Feature)
        .required(AttrFlags::CLASS)
        .subset(subset)
}

fn markup(kind: ElementKind, ty: AnnotationType) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractTextMarkup)
        .annotation(ty)
        .accepts(&[K::XmlText, K::AbstractTextMarkup, K::Linebreak])
        .optional(
            AttrFlags::ID
                | AttrFlags::CLASS
                | AttrFlags::ANNOTATOR
                | AttrFlags::CONFIDENCE
                | AttrFlags::DATETIME
                | AttrFlags::N
                | AttrFlags::TAG
                | AttrFlags::METADATA
                | AttrFlags::XLINK,
        )
        .with(Capabilities::PRINTABLE | Capabilities::TEXT_CONTAINER | Capabilities::XLINK)
}

fn correction_child(kind: ElementKind) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractCorrectionChild)
        .accepts(CORRECTABLE)
        .with(Capabilities::PRINTABLE | Capabilities::SPEAKABLE)
        .occurrences(1)
}

fn higher_order(kind: ElementKind, ty: AnnotationType) -> KindDescriptor {
    KindDescriptor::new(kind, K::AbstractHigherOrderAnnotation).annotation(ty)
}

/// Build the descriptor of `kind`.
pub(super) fn describe(kind: ElementKind) -> KindDescriptor {
    use AnnotationType as A;
    match kind {
        K::Base => KindDescriptor {
            parent: None,
            ..abstract_kind(K::Base, K::Base)
        },
        K::AbstractStructure
        | K::AbstractInlineAnnotation
        | K::AbstractSpanAnnotation
        | K::AbstractAnnotationLayer
        | K::AbstractCorrectionChild
        | K::AbstractTextMarkup
        | K::AbstractContentAnnotation
        | K::AbstractHigherOrderAnnotation => abstract_kind(kind, K::Base),
        K::AbstractWord => abstract_kind(kind, K::AbstractStructure),
        K::AbstractSpanRole => abstract_kind(kind, K::AbstractSpanAnnotation),
        K::XmlText => KindDescriptor {
            accepted: Vec::new(),
            ..KindDescriptor::new(kind, K::Base).with(Capabilities::PRINTABLE | Capabilities::VALUE)
        },
        K::XmlComment => KindDescriptor {
            accepted: Vec::new(),
            ..KindDescriptor::new(kind, K::Base).with(Capabilities::VALUE)
        },

        // higher order: descriptive leaves and features
        K::Description => higher_order(kind, A::Description)
            .optional(AttrFlags::ID | AttrFlags::ANNOTATOR | AttrFlags::DATETIME | AttrFlags::N | AttrFlags::METADATA | AttrFlags::TAG)
            .with(Capabilities::VALUE)
            .occurrences(1),
        K::Comment => higher_order(kind, A::Comment)
            .optional(AttrFlags::ID | AttrFlags::ANNOTATOR | AttrFlags::DATETIME | AttrFlags::N | AttrFlags::METADATA | AttrFlags::TAG)
            .with(Capabilities::VALUE),
        K::Feature => higher_order(kind, A::NoAnn)
            .required(AttrFlags::CLASS)
            .extras(&["subset"]),
        K::SynsetFeature => feature(kind, "synset"),
        K::ActorFeature => feature(kind, "actor"),
        K::HeadFeature => feature(kind, "head"),
        K::ValueFeature => feature(kind, "value"),
        K::TimeFeature => feature(kind, "time"),
        K::FunctionFeature => feature(kind, "function"),
        K::LevelFeature => feature(kind, "level"),
        K::PolarityFeature => feature(kind, "polarity"),
        K::StrengthFeature => feature(kind, "strength"),
        K::StyleFeature => feature(kind, "style"),
        K::BegindatetimeFeature => feature(kind, "begindatetime"),
        K::EnddatetimeFeature => feature(kind, "enddatetime"),
        K::ForeignData => KindDescriptor {
            accepted: Vec::new(),
            ..higher_order(kind, A::NoAnn)
        },

        // content
        K::TextContent => KindDescriptor::new(kind, K::AbstractContentAnnotation)
            .annotation(A::Text)
            .accepts(&[K::XmlText, K::AbstractTextMarkup, K::Linebreak])
            .optional(AttrFlags::CLASS | AttrFlags::ANNOTATOR | AttrFlags::CONFIDENCE | AttrFlags::DATETIME | AttrFlags::METADATA | AttrFlags::TAG | AttrFlags::XLINK)
            .extras(&["offset", "ref"])
            .with(Capabilities::PRINTABLE | Capabilities::TEXT_CONTAINER | Capabilities::XLINK),
        K::PhonContent => KindDescriptor::new(kind, K::AbstractContentAnnotation)
            .annotation(A::Phon)
            .accepts(&[K::XmlText])
            .optional(AttrFlags::CLASS | AttrFlags::ANNOTATOR | AttrFlags::CONFIDENCE | AttrFlags::DATETIME | AttrFlags::METADATA | AttrFlags::TAG)
            .extras(&["offset", "ref"])
            .with(Capabilities::SPEAKABLE | Capabilities::PHON_CONTAINER),
        K::RawContent => KindDescriptor {
            accepted: Vec::new(),
            ..KindDescriptor::new(kind, K::AbstractContentAnnotation)
                .annotation(A::RawContent)
                .with(Capabilities::VALUE)
                .occurrences(1)
        },

        // text markup
        K::TextMarkupString => markup(kind, A::String),
        K::TextMarkupGap => markup(kind, A::Gap),
        K::TextMarkupCorrection => markup(kind, A::Correction).extras(&["original"]),
        K::TextMarkupError => markup(kind, A::ErrorDetection),
        K::TextMarkupStyle => markup(kind, A::Style),
        K::TextMarkupHSpace => markup(kind, A::HSpace),
        K::TextMarkupLanguage => markup(kind, A::Lang),
        K::TextMarkupReference => markup(kind, A::Reference).extras(&["id", "type", "format"]),
        K::TextMarkupWhitespace => markup(kind, A::Whitespace),
        K::TextMarkupHyphbreak => markup(kind, A::Hyphenation),

        // structure
        K::Text => structure(kind, A::NoAnn)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .accepts(&[K::Division, K::Head, K::Entry, K::Example])
            .delimiter("\n\n")
            .optional(AttrFlags::ID | AttrFlags::N | AttrFlags::METADATA | AttrFlags::SPEAKER | AttrFlags::SRC),
        K::Speech => structure(kind, A::NoAnn)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .accepts(&[K::Division])
            .delimiter("\n\n")
            .optional(
                AttrFlags::ID
                    | AttrFlags::N
                    | AttrFlags::METADATA
                    | AttrFlags::SPEAKER
                    | AttrFlags::SRC
                    | AttrFlags::BEGINTIME
                    | AttrFlags::ENDTIME,
            ),
        K::Division => structure(kind, A::Division)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .accepts(&[K::Division, K::Head, K::Entry, K::Example])
            .delimiter("\n\n"),
        K::Head => structure(kind, A::Head)
            .accepts(&[K::Sentence, K::Paragraph, K::Word, K::Hiddenword, K::Quote, K::Event])
            .accepts(INLINE_TEXT)
            .delimiter("\n\n")
            .occurrences(1),
        K::Paragraph => structure(kind, A::Paragraph)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .accepts(&[K::Entry, K::Example])
            .delimiter("\n\n"),
        K::Sentence => structure(kind, A::Sentence)
            .accepts(&[K::Word, K::Hiddenword, K::Quote, K::Event, K::Entry, K::Utterance])
            .accepts(INLINE_TEXT)
            .delimiter(" "),
        K::Utterance => structure(kind, A::Utterance)
            .accepts(&[K::Sentence, K::Word, K::Hiddenword, K::Quote])
            .accepts(INLINE_TEXT)
            .delimiter(" "),
        K::Word => word_like(kind, A::Token)
            .accepts(&[K::Reference, K::Part, K::TextContent, K::PhonContent])
            .optional(AttrFlags::ALL | AttrFlags::SPACE)
            .delimiter(" "),
        K::Hiddenword => word_like(kind, A::HiddenToken)
            .accepts(&[K::Reference, K::TextContent, K::PhonContent])
            .optional(AttrFlags::ALL | AttrFlags::SPACE)
            .delimiter(" ")
            .with(Capabilities::HIDDEN),
        K::Morpheme => word_like(kind, A::Morphological)
            .accepts(&[K::Morpheme, K::TextContent, K::PhonContent]),
        K::Phoneme => word_like(kind, A::Phonological)
            .accepts(&[K::Phoneme, K::TextContent, K::PhonContent]),
        K::Part => structure(kind, A::Part)
            .accepts(&[K::Word, K::Hiddenword, K::Sentence])
            .accepts(INLINE_TEXT)
            .delimiter(" "),
        K::Linebreak => structure(kind, A::Linebreak)
            .accepts(ANNOTATION_BASE)
            .optional(AttrFlags::ALL | AttrFlags::XLINK)
            .extras(&["pagenr", "linenr", "newpage"])
            .delimiter("")
            .without(Capabilities::PRINTABLE | Capabilities::SPEAKABLE)
            .with(Capabilities::XLINK),
        K::Whitespace => structure(kind, A::Whitespace)
            .delimiter("")
            .without(Capabilities::PRINTABLE | Capabilities::SPEAKABLE),
        K::Figure => structure(kind, A::Figure)
            .accepts(&[K::Caption, K::Sentence, K::Word, K::TextContent, K::Linebreak])
            .delimiter("\n\n"),
        K::Caption => structure(kind, A::NoAnn)
            .accepts(&[K::Sentence, K::Word, K::Hiddenword, K::Paragraph])
            .accepts(INLINE_TEXT)
            .delimiter("\n\n")
            .occurrences(1),
        K::Label => structure(kind, A::NoAnn)
            .accepts(&[K::Word, K::Hiddenword])
            .accepts(INLINE_TEXT)
            .delimiter(""),
        K::List => structure(kind, A::List)
            .accepts(&[K::ListItem, K::Caption, K::Label, K::Note, K::Reference, K::Linebreak, K::Event])
            .delimiter("\n\n"),
        K::ListItem => structure(kind, A::List)
            .accepts(&[K::Sentence, K::Word, K::Hiddenword, K::Paragraph, K::List, K::Label, K::Figure, K::Quote, K::Event])
            .accepts(INLINE_TEXT)
            .delimiter("\n"),
        K::Table => structure(kind, A::Table)
            .accepts(&[K::TableHead, K::Row])
            .delimiter("\n\n"),
        K::TableHead => structure(kind, A::Table)
            .accepts(&[K::Row])
            .delimiter("\n")
            .occurrences(1),
        K::Row => structure(kind, A::Table).accepts(&[K::Cell]).delimiter("\n"),
        K::Cell => structure(kind, A::Table)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .accepts(&[K::Head, K::Entry])
            .delimiter(" | "),
        K::Event => structure(kind, A::Event)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .accepts(&[K::Head, K::ActorFeature, K::BegindatetimeFeature, K::EnddatetimeFeature])
            .delimiter("\n\n"),
        K::Quote => structure(kind, A::Quote)
            .accepts(&[K::Division, K::Paragraph, K::Sentence, K::Word, K::Hiddenword, K::Quote, K::List])
            .accepts(INLINE_TEXT)
            .delimiter(" "),
        K::Gap => structure(kind, A::Gap)
            .accepts(&[K::RawContent])
            .delimiter(" ")
            .without(Capabilities::PRINTABLE | Capabilities::SPEAKABLE),
        K::Note => structure(kind, A::Note)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .accepts(&[K::Head, K::Example, K::Entry])
            .delimiter("\n\n"),
        K::Reference => structure(kind, A::Reference)
            .accepts(&[K::Word, K::Hiddenword, K::Linebreak, K::Whitespace, K::Part, K::TextContent, K::PhonContent])
            .optional(AttrFlags::ALL | AttrFlags::XLINK)
            .extras(&["id", "type", "format"])
            .delimiter(" ")
            .with(Capabilities::XLINK),
        K::Entry => structure(kind, A::Entry)
            .accepts(&[K::Term, K::Definition, K::Example])
            .delimiter("\n\n"),
        K::Term => structure(kind, A::Term)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .delimiter("\n\n"),
        K::Definition => structure(kind, A::Definition)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .delimiter("\n\n"),
        K::Example => structure(kind, A::Example)
            .accepts(BLOCK_CONTENT)
            .accepts(INLINE_TEXT)
            .delimiter("\n\n"),
        K::String => higher_order(kind, A::String)
            .accepts(ANNOTATION_BASE)
            .accepts(&[K::TextContent, K::PhonContent, K::Feature, K::Metric, K::Relation, K::AbstractInlineAnnotation, K::Correction])
            .optional(AttrFlags::ALL)
            .with(Capabilities::PRINTABLE),

        // inline annotations
        K::PosAnnotation => inline(kind, A::Pos).accepts(&[K::HeadFeature]),
        K::LemmaAnnotation => inline(kind, A::Lemma),
        K::SenseAnnotation => inline(kind, A::Sense).accepts(&[K::SynsetFeature]),
        K::DomainAnnotation => inline(kind, A::Domain),
        K::LangAnnotation => inline(kind, A::Lang),
        K::SubjectivityAnnotation => inline(kind, A::Subjectivity),
        K::ErrorDetection => inline(kind, A::ErrorDetection).optional(AttrFlags::ALL).per_set(0),

        // layers
        K::MorphologyLayer => layer(kind, A::Morphological, &[K::Morpheme]),
        K::PhonologyLayer => layer(kind, A::Phonological, &[K::Phoneme]),
        K::ChunkingLayer => layer(kind, A::Chunking, &[K::Chunk]),
        K::EntitiesLayer => layer(kind, A::Entity, &[K::Entity]),
        K::SyntaxLayer => layer(kind, A::Syntax, &[K::SyntacticUnit]),
        K::DependenciesLayer => layer(kind, A::Dependency, &[K::Dependency]),
        K::CoreferenceLayer => layer(kind, A::Coreference, &[K::CoreferenceChain]),
        K::SemanticRolesLayer => layer(kind, A::SemRole, &[K::SemanticRole, K::Predicate]),
        K::SentimentLayer => layer(kind, A::Sentiment, &[K::Sentiment]),
        K::StatementLayer => layer(kind, A::Statement, &[K::Statement]),
        K::ObservationLayer => layer(kind, A::Observation, &[K::Observation]),
        K::ModalitiesLayer => layer(kind, A::Modality, &[K::Modality]),
        K::TimingLayer => layer(kind, A::Timesegment, &[K::TimeSegment]),
        K::SpanRelationLayer => layer(kind, A::SpanRelation, &[K::SpanRelation]),

        // span annotations
        K::Chunk => span(kind, A::Chunking),
        K::Entity => span(kind, A::Entity),
        K::SyntacticUnit => span(kind, A::Syntax).accepts(&[K::SyntacticUnit]),
        K::Dependency => KindDescriptor {
            accepted: vec![K::XmlComment],
            ..span(kind, A::Dependency)
        }
        .accepts(ANNOTATION_BASE)
        .accepts(&[K::Headspan, K::DependencyDependent, K::Feature, K::Metric])
        .requires_children(&[K::Headspan, K::DependencyDependent]),
        K::CoreferenceChain => KindDescriptor {
            accepted: vec![K::XmlComment],
            ..span(kind, A::Coreference)
        }
        .accepts(ANNOTATION_BASE)
        .accepts(&[K::CoreferenceLink, K::Feature, K::Metric])
        .requires_children(&[K::CoreferenceLink]),
        K::SemanticRole => span(kind, A::SemRole).accepts(&[K::Headspan]),
        K::Predicate => span(kind, A::Predicate).accepts(&[K::SemanticRole]),
        K::Sentiment => span(kind, A::Sentiment).accepts(&[
            K::Headspan,
            K::Source,
            K::Target,
            K::Holder,
            K::PolarityFeature,
            K::StrengthFeature,
        ]),
        K::Statement => span(kind, A::Statement).accepts(&[K::Headspan, K::Source, K::StatementRelation]),
        K::Observation => span(kind, A::Observation),
        K::Modality => span(kind, A::Modality).accepts(&[K::Scope, K::Cue, K::Source, K::Target]),
        K::TimeSegment => span(kind, A::Timesegment).accepts(&[
            K::ActorFeature,
            K::BegindatetimeFeature,
            K::EnddatetimeFeature,
        ]),

        // span roles
        K::Headspan | K::DependencyDependent | K::Source | K::Target | K::Holder | K::StatementRelation | K::Cue => {
            role(kind)
        }
        K::CoreferenceLink => role(kind).accepts(&[K::Headspan, K::LevelFeature]),
        K::Scope => role(kind).accepts(&[K::Cue, K::Source, K::Target]),

        // remaining higher order
        K::Metric => higher_order(kind, A::Metric)
            .accepts(ANNOTATION_BASE)
            .accepts(&[K::Feature])
            .optional(AttrFlags::ALL)
            .required(AttrFlags::CLASS)
            .extras(&["value"]),
        K::Relation => higher_order(kind, A::Relation)
            .accepts(ANNOTATION_BASE)
            .accepts(&[K::LinkReference, K::Feature, K::Metric])
            .optional(AttrFlags::ALL | AttrFlags::XLINK)
            .extras(&["format"])
            .with(Capabilities::XLINK),
        K::LinkReference => KindDescriptor {
            accepted: Vec::new(),
            ..higher_order(kind, A::NoAnn).extras(&["id", "type", "t"])
        },
        K::SpanRelation => higher_order(kind, A::SpanRelation)
            .accepts(ANNOTATION_BASE)
            .accepts(&[K::Relation, K::Feature, K::Metric])
            .optional(AttrFlags::ALL),
        K::External => higher_order(kind, A::External)
            .optional(AttrFlags::ID | AttrFlags::ANNOTATOR | AttrFlags::DATETIME | AttrFlags::SRC | AttrFlags::METADATA)
            .extras(&["include"]),
        K::Alternative => higher_order(kind, A::Alternative)
            .accepts(ANNOTATION_BASE)
            .accepts(&[K::AbstractInlineAnnotation, K::Feature, K::Metric])
            .optional(AttrFlags::ALL)
            .with(Capabilities::AUTO_ID)
            .without(Capabilities::AUTH),
        K::AlternativeLayers => higher_order(kind, A::Alternative)
            .accepts(ANNOTATION_BASE)
            .accepts(&[K::AbstractAnnotationLayer, K::Feature])
            .optional(AttrFlags::ALL)
            .with(Capabilities::AUTO_ID)
            .without(Capabilities::AUTH),

        // corrections
        K::Correction => KindDescriptor::new(kind, K::Base)
            .annotation(A::Correction)
            .accepts(ANNOTATION_BASE)
            .accepts(&[K::New, K::Original, K::Current, K::Suggestion, K::ErrorDetection, K::Feature, K::Metric])
            .optional(AttrFlags::ALL)
            .with(Capabilities::PRINTABLE | Capabilities::SPEAKABLE | Capabilities::AUTO_ID),
        K::New | K::Current => correction_child(kind),
        K::Original => correction_child(kind).without(Capabilities::AUTH),
        K::Suggestion => correction_child(kind)
            .optional(
                AttrFlags::ID
                    | AttrFlags::ANNOTATOR
                    | AttrFlags::CONFIDENCE
                    | AttrFlags::DATETIME
                    | AttrFlags::N
                    | AttrFlags::METADATA
                    | AttrFlags::TAG,
            )
            .extras(&["split", "merge"])
            .occurrences(0)
            .without(Capabilities::AUTH),
    }
}
