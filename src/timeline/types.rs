use serde::{Deserialize, Serialize};

use crate::effects::EffectKind;
use crate::video::MediaTime;

/// End-time sentinel meaning "until the end of the media"
pub const UNBOUNDED_END: MediaTime = -1.0;

/// One scheduled effect: `kind` is active for `start <= t <= end`
///
/// Any negative `end` means the window never closes. The value is kept
/// verbatim so the store's sentinel round-trips unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectWindow {
    pub kind: EffectKind,
    pub start: MediaTime,
    pub end: MediaTime,
}

impl EffectWindow {
    pub fn new(kind: EffectKind, start: MediaTime, end: MediaTime) -> Self {
        Self { kind, start, end }
    }

    /// A window that stays active from `start` to the end of the media
    pub fn open_ended(kind: EffectKind, start: MediaTime) -> Self {
        Self::new(kind, start, UNBOUNDED_END)
    }

    pub fn is_unbounded(&self) -> bool {
        self.end < 0.0
    }

    /// The end time for interval arithmetic; unbounded windows end at +∞
    pub fn effective_end(&self) -> MediaTime {
        if self.is_unbounded() {
            MediaTime::INFINITY
        } else {
            self.end
        }
    }

    /// Inclusive on both ends
    pub fn contains(&self, t: MediaTime) -> bool {
        self.start <= t && t <= self.effective_end()
    }
}
