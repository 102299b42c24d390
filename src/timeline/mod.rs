//! # Effect Timeline
//!
//! Effect windows and the resolver that picks the active ones for a
//! playback timestamp.

pub mod resolver;
pub mod types;

pub use resolver::{active_windows, any_active};
pub use types::{EffectWindow, UNBOUNDED_END};
