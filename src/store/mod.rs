//! # Effect Store
//!
//! Read-only mirror of the project's effect list, fetched over HTTP or read
//! from a JSON file, mapped to [`EffectWindow`](crate::timeline::EffectWindow)s.

mod mirror;
pub mod types;

pub use mirror::{load_windows_from_file, records_to_windows, EffectStoreClient};
pub use types::{EffectRecord, ProjectRecord};
