use super::{color::Color, kind::EffectKind};
use crate::timeline::EffectWindow;

/// The active effects for one tick, folded in list order
///
/// Each transform reads the previous transform's output, so
/// `[Sepia, Invert]` yields `invert(sepia(c))`. A kind that appears
/// in several overlapping windows is applied once per occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectChain {
    kinds: Vec<EffectKind>,
}

impl EffectChain {
    pub fn new(kinds: Vec<EffectKind>) -> Self {
        Self { kinds }
    }

    /// Build a chain from already-resolved active windows
    pub fn from_windows<'a, I>(windows: I) -> Self
    where
        I: IntoIterator<Item = &'a EffectWindow>,
    {
        Self {
            kinds: windows.into_iter().map(|w| w.kind).collect(),
        }
    }

    pub fn apply(&self, original: Color) -> Color {
        self.kinds.iter().fold(original, |color, kind| kind.apply(color))
    }

    pub fn kinds(&self) -> &[EffectKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
