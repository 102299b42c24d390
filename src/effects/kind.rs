use std::fmt;

use serde::{Deserialize, Serialize};

use super::color::Color;

/// Rec. 601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Classic sepia tone matrix, one row per output channel
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Darkening factor standing in for a real blur
const BLUR_DARKEN: f32 = 0.8;

/// A background effect that can be scheduled in an effect window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Grayscale,
    Sepia,
    Invert,
    Blur,
    /// Legacy name for a grayscale background
    Segmentation,
}

impl EffectKind {
    /// Every built-in kind, in registry order
    pub const ALL: [EffectKind; 5] = [
        EffectKind::Grayscale,
        EffectKind::Sepia,
        EffectKind::Invert,
        EffectKind::Blur,
        EffectKind::Segmentation,
    ];

    /// Name used by the effect store
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
            Self::Blur => "blur",
            Self::Segmentation => "segmentation",
        }
    }

    /// Apply this effect's color transform
    pub fn apply(&self, color: Color) -> Color {
        match self {
            Self::Grayscale | Self::Segmentation => grayscale(color),
            Self::Sepia => sepia(color),
            Self::Invert => invert(color),
            Self::Blur => darken(color),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set all channels to the rounded luminance
pub fn grayscale(c: Color) -> Color {
    let gray = (LUMA_R * c.r + LUMA_G * c.g + LUMA_B * c.b).round();
    Color::new(gray, gray, gray)
}

/// Sepia matrix, each output channel capped at 255
pub fn sepia(c: Color) -> Color {
    let row = |m: [f32; 3]| (m[0] * c.r + m[1] * c.g + m[2] * c.b).min(255.0);
    Color::new(row(SEPIA[0]), row(SEPIA[1]), row(SEPIA[2]))
}

pub fn invert(c: Color) -> Color {
    Color::new(255.0 - c.r, 255.0 - c.g, 255.0 - c.b)
}

/// Scale every channel down; placeholder for a convolution blur
pub fn darken(c: Color) -> Color {
    Color::new(c.r * BLUR_DARKEN, c.g * BLUR_DARKEN, c.b * BLUR_DARKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_uses_rounded_luminance() {
        let gray = grayscale(Color::new(200.0, 150.0, 100.0));
        // 59.8 + 88.05 + 11.4 = 159.25
        assert_eq!(gray, Color::new(159.0, 159.0, 159.0));
    }

    #[test]
    fn test_sepia_caps_at_255() {
        let out = sepia(Color::new(255.0, 255.0, 255.0));
        assert_eq!(out.r, 255.0);
        assert_eq!(out.g, 255.0);
        assert!((out.b - 238.935).abs() < 1e-3);
    }

    #[test]
    fn test_invert_and_darken() {
        assert_eq!(invert(Color::new(0.0, 100.0, 255.0)), Color::new(255.0, 155.0, 0.0));
        assert_eq!(darken(Color::new(100.0, 50.0, 0.0)), Color::new(80.0, 40.0, 0.0));
    }

    #[test]
    fn test_segmentation_is_grayscale() {
        let c = Color::new(12.0, 200.0, 77.0);
        assert_eq!(EffectKind::Segmentation.apply(c), EffectKind::Grayscale.apply(c));
    }

    #[test]
    fn test_serde_uses_store_names() {
        let json = serde_json::to_string(&EffectKind::Sepia).unwrap();
        assert_eq!(json, "\"sepia\"");

        let kind: EffectKind = serde_json::from_str("\"blur\"").unwrap();
        assert_eq!(kind, EffectKind::Blur);
    }
}
