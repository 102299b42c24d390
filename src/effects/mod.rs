//! # Background Effects
//!
//! Per-pixel color transforms applied to the background of a frame.
//!
//! ## Built-in Effects
//!
//! - **Grayscale**: Rec. 601 luminance
//! - **Sepia**: classic sepia matrix
//! - **Invert**: color negative
//! - **Blur**: darkening placeholder (no convolution)
//! - **Segmentation**: legacy name, same as grayscale
//!
//! Several effects can be active at once; an [`EffectChain`] folds them over
//! a color in the order their windows appear in the effect list.
//!
//! ```rust
//! use backdrop_compositor::effects::{Color, EffectChain, EffectKind};
//!
//! let chain = EffectChain::new(vec![EffectKind::Grayscale, EffectKind::Invert]);
//! let out = chain.apply(Color::from_rgb([200, 150, 100]));
//! assert_eq!(out.to_rgb(), [96, 96, 96]);
//! ```

pub mod chain;
pub mod color;
pub mod kind;
pub mod registry;

pub use chain::EffectChain;
pub use color::Color;
pub use kind::EffectKind;
pub use registry::EffectRegistry;
