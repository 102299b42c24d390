use super::types::EffectWindow;
use crate::video::MediaTime;

/// Return every window active at `t`, in original list order
///
/// Later entries take precedence when they overlap, so callers must not
/// reorder the result.
pub fn active_windows(all: &[EffectWindow], t: MediaTime) -> Vec<EffectWindow> {
    all.iter().filter(|window| window.contains(t)).copied().collect()
}

/// Whether any window is active at `t`, without allocating
pub fn any_active(all: &[EffectWindow], t: MediaTime) -> bool {
    all.iter().any(|window| window.contains(t))
}
