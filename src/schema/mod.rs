//! Static schema registry: one immutable [`KindDescriptor`] per element kind.
//!
//! The registry is computed once on first use and shared read-only for the
//! lifetime of the process. Subtype queries go through a precomputed
//! ancestor table instead of any runtime type identity.

mod annotation_type;
mod descriptor;
mod flags;
mod kind;

pub use annotation_type::AnnotationType;
pub use descriptor::KindDescriptor;
pub use flags::{AttrFlags, Capabilities};
pub use kind::ElementKind;

use once_cell::sync::Lazy;
use std::collections::HashMap;

struct Schema {
    descriptors: Vec<KindDescriptor>,
    /// Ancestor chain per kind, starting with the kind itself and ending at `Base`.
    ancestors: Vec<Vec<ElementKind>>,
    by_tag: HashMap<&'static str, ElementKind>,
    by_subset: HashMap<&'static str, ElementKind>,
}

static SCHEMA: Lazy<Schema> = Lazy::new(Schema::build);

impl Schema {
    fn build() -> Schema {
        let descriptors: Vec<KindDescriptor> = ElementKind::ALL
            .iter()
            .map(|kind| descriptor::describe(*kind))
            .collect();

        let ancestors = ElementKind::ALL
            .iter()
            .map(|kind| {
                let mut chain = vec![*kind];
                let mut current = descriptors[kind.ordinal()].parent;
                while let Some(parent) = current {
                    assert!(
                        !chain.contains(&parent) && chain.len() <= ElementKind::ALL.len(),
                        "cyclic supertype chain at {}",
                        kind
                    );
                    chain.push(parent);
                    current = descriptors[parent.ordinal()].parent;
                }
                chain
            })
            .collect();

        let by_tag = ElementKind::ALL
            .iter()
            .filter(|kind| !kind.is_internal())
            .map(|kind| (kind.tag(), *kind))
            .collect();

        let by_subset = descriptors
            .iter()
            .filter_map(|desc| desc.subset.map(|subset| (subset, desc.kind)))
            .collect();

        Schema {
            descriptors,
            ancestors,
            by_tag,
            by_subset,
        }
    }
}

/// Descriptor of `kind`.
pub fn descriptor_of(kind: ElementKind) -> &'static KindDescriptor {
    &SCHEMA.descriptors[kind.ordinal()]
}

/// `kind` followed by its supertypes, nearest first.
pub fn ancestors(kind: ElementKind) -> &'static [ElementKind] {
    &SCHEMA.ancestors[kind.ordinal()]
}

/// True when `kind` is `of` or one of its (abstract) subtypes.
pub fn is_subtype(kind: ElementKind, of: ElementKind) -> bool {
    ancestors(kind).contains(&of)
}

/// True when `parent` accepts `child`, directly or through one of the
/// child's supertypes.
pub fn accepts(parent: ElementKind, child: ElementKind) -> bool {
    let accepted = &descriptor_of(parent).accepted;
    ancestors(child).iter().any(|kind| accepted.contains(kind))
}

/// Nearest abstract supertype of `kind` other than `Base`.
pub fn nearest_abstract(kind: ElementKind) -> Option<ElementKind> {
    ancestors(kind)
        .iter()
        .skip(1)
        .copied()
        .find(|ancestor| *ancestor != ElementKind::Base && descriptor_of(*ancestor).is_abstract())
}

/// Resolve an XML element name.
///
/// Legacy names are translated only when `legacy` is set.
pub fn kind_for_tag(tag: &str, legacy: bool) -> Option<ElementKind> {
    if let Some(kind) = SCHEMA.by_tag.get(tag) {
        return Some(*kind);
    }
    if legacy {
        let (_, current) = kind::LEGACY_TAGS.iter().find(|(old, _)| *old == tag)?;
        log::debug!("translating legacy element <{}> to <{}>", tag, current);
        return SCHEMA.by_tag.get(current).copied();
    }
    None
}

/// Typed feature kind for an attribute-foldable subset (`synset`, `head`, ...).
pub fn feature_kind_for_subset(subset: &str) -> Option<ElementKind> {
    SCHEMA.by_subset.get(subset).copied()
}

/// Feature subsets that may be written as an attribute of their owner.
pub const FOLDABLE_SUBSETS: &[&str] = &[
    "synset",
    "actor",
    "head",
    "value",
    "time",
    "function",
    "level",
    "polarity",
    "strength",
    "begindatetime",
    "enddatetime",
];

/// Typed feature kind that attribute `name` on `owner` stands for.
///
/// `None` when the name is not foldable, is a regular attribute of the
/// owner, or the owner does not take that feature.
pub fn foldable_feature(owner: ElementKind, name: &str) -> Option<ElementKind> {
    if !FOLDABLE_SUBSETS.contains(&name) || descriptor_of(owner).allows_extra(name) {
        return None;
    }
    let feature = feature_kind_for_subset(name)?;
    accepts(owner, feature).then_some(feature)
}

/// Concrete kinds realizing `ty`.
pub fn kinds_for_annotation_type(ty: AnnotationType) -> impl Iterator<Item = ElementKind> {
    ElementKind::ALL
        .iter()
        .copied()
        .filter(move |kind| {
            let desc = descriptor_of(*kind);
            !desc.is_abstract() && desc.annotation_type == ty
        })
}
