//! Combining mark placement classes.

use std::{collections::BTreeSet, fmt};

use unicode_normalization::char::canonical_combining_class;

/// Canonical combining classes placed below the base by default.
pub const DEFAULT_BELOW_CLASSES: [u8; 9] = [202, 214, 218, 220, 222, 223, 224, 225, 226];

/// Canonical combining classes treated as overlays by default. Overlay marks
/// are never moved vertically.
pub const DEFAULT_OVERLAY_CLASSES: [u8; 2] = [1, 200];

/// Where a combining mark attaches relative to its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkClass {
    Above,
    Below,
    Overlay,
}

impl MarkClass {
    /// Stable numeric key, used as the class key of synthesized lookups.
    pub fn key(self) -> u16 {
        match self {
            Self::Above => 0,
            Self::Below => 1,
            Self::Overlay => 2,
        }
    }
}

impl fmt::Display for MarkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Overlay => "overlay",
        })
    }
}

/// Unicode canonical combining class of a codepoint, 0 for invalid scalars.
pub fn combining_class(codepoint: u32) -> u8 {
    char::from_u32(codepoint).map(canonical_combining_class).unwrap_or(0)
}

/// Whether a codepoint is a combining mark (nonzero combining class).
pub fn is_combining(codepoint: u32) -> bool {
    combining_class(codepoint) != 0
}

/// Maps codepoints to a [`MarkClass`] through two override sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkClassifier {
    below: BTreeSet<u8>,
    overlay: BTreeSet<u8>,
}

impl Default for MarkClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BELOW_CLASSES, DEFAULT_OVERLAY_CLASSES)
    }
}

impl MarkClassifier {
    pub fn new(below: impl IntoIterator<Item = u8>, overlay: impl IntoIterator<Item = u8>) -> Self {
        Self { below: below.into_iter().collect(), overlay: overlay.into_iter().collect() }
    }

    /// Classify by combining class value. Below wins over overlay.
    pub fn classify_class(&self, class: u8) -> MarkClass {
        if self.below.contains(&class) {
            MarkClass::Below
        } else if self.overlay.contains(&class) {
            MarkClass::Overlay
        } else {
            MarkClass::Above
        }
    }

    /// Classify a codepoint. Codepoints outside both sets, including
    /// non-combining ones, are [`MarkClass::Above`].
    pub fn classify(&self, codepoint: u32) -> MarkClass {
        self.classify_class(combining_class(codepoint))
    }
}
