//! # Segmentation
//!
//! The mask provider and the model seam behind it. Models are opaque: a
//! [`ModelLoader`] turns a [`ModelSpec`] into a [`SegmentationModel`] on a
//! blocking worker, and the [`MaskProvider`] reports `Loading` until that
//! finishes.

mod chroma;
mod provider;
mod resize;
pub mod types;

pub use chroma::{ChromaKeyLoader, ChromaKeyModel, ChromaKeyParams, CHROMA_SCHEME};
pub use provider::{MaskProvider, MaskStatus};
pub use resize::resize_mask;
pub use types::{ConfidenceMask, Delegate, ModelLoader, ModelSpec, SegmentationModel};
