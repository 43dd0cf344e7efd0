//! Attribute and capability bitsets carried by every kind descriptor.

use bitflags::bitflags;

bitflags! {
    /// Generic attributes an element kind may (or must) carry.
    ///
    /// Kind-specific attributes such as `subset` or `offset` are listed
    /// separately as extras on the descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttrFlags: u32 {
        const ID = 1 << 0;
        const CLASS = 1 << 1;
        /// `annotator`, `annotatortype` and `processor`.
        const ANNOTATOR = 1 << 2;
        const CONFIDENCE = 1 << 3;
        const DATETIME = 1 << 4;
        const N = 1 << 5;
        const SRC = 1 << 6;
        const BEGINTIME = 1 << 7;
        const ENDTIME = 1 << 8;
        const SPEAKER = 1 << 9;
        const TEXTCLASS = 1 << 10;
        const METADATA = 1 << 11;
        const TAG = 1 << 12;
        /// Word-level `space="no"`.
        const SPACE = 1 << 13;
        /// `xlink:href` and friends.
        const XLINK = 1 << 14;

        const ALL = Self::ID.bits()
            | Self::CLASS.bits()
            | Self::ANNOTATOR.bits()
            | Self::CONFIDENCE.bits()
            | Self::DATETIME.bits()
            | Self::N.bits()
            | Self::SRC.bits()
            | Self::BEGINTIME.bits()
            | Self::ENDTIME.bits()
            | Self::SPEAKER.bits()
            | Self::TEXTCLASS.bits()
            | Self::METADATA.bits()
            | Self::TAG.bits();
    }
}

bitflags! {
    /// Behavioural capabilities of an element kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Contributes to rendered text.
        const PRINTABLE = 1 << 0;
        /// Contributes to rendered phonetic content.
        const SPEAKABLE = 1 << 1;
        /// Holds raw text leaves directly (`t`, `t-*`).
        const TEXT_CONTAINER = 1 << 2;
        /// Holds raw phonetic leaves directly (`ph`).
        const PHON_CONTAINER = 1 << 3;
        /// Not part of the visible text unless explicitly requested.
        const HIDDEN = 1 << 4;
        /// Authoritative: content counts as the document's own annotation.
        const AUTH = 1 << 5;
        const XLINK = 1 << 6;
        /// Carries a set but never a class (annotation layers).
        const SETONLY = 1 << 7;
        /// Receives a generated id when appended below an identified ancestor.
        const AUTO_ID = 1 << 8;
        /// May be referenced (without being owned) by span annotations.
        const WREFABLE = 1 << 9;
        /// Exists only for subtype queries; never instantiated.
        const ABSTRACT = 1 << 10;
        /// Holds a free text value instead of child nodes.
        const VALUE = 1 << 11;
    }
}
