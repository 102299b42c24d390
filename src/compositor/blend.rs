//! Mask shaping and blend weights.
//!
//! The constants here are fixed; they are tuned together and are not part of
//! the runtime configuration.

use crate::effects::{Color, EffectChain};

/// Exponent applied to raw mask confidence
pub const GAMMA: f32 = 3.0;

/// Shaped confidence below this is pure background
pub const LOW_THRESHOLD: f32 = 0.1;

/// Shaped confidence above this is pure subject
pub const HIGH_THRESHOLD: f32 = 0.8;

/// Sharpen a confidence value: low and mid values collapse toward 0
pub fn gamma_shape(confidence: f32) -> f32 {
    confidence.clamp(0.0, 1.0).powf(GAMMA)
}

/// Cubic ease `t²(3 − 2t)`, clamped to [0, 1]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// How a pixel is treated, decided from its shaped confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    /// Keep the original pixel
    Foreground,
    /// Mix original and effect; the weight is the original's share
    Transition(f32),
    /// Replace with the effect color
    Background,
}

pub fn classify(shaped: f32) -> Zone {
    if shaped > HIGH_THRESHOLD {
        Zone::Foreground
    } else if shaped < LOW_THRESHOLD {
        Zone::Background
    } else {
        let t = (shaped - LOW_THRESHOLD) / (HIGH_THRESHOLD - LOW_THRESHOLD);
        Zone::Transition(smoothstep(t))
    }
}

/// Composite one pixel's RGB from its raw mask confidence
pub fn composite_pixel(original: [u8; 3], confidence: f32, chain: &EffectChain) -> [u8; 3] {
    match classify(gamma_shape(confidence)) {
        Zone::Foreground => original,
        Zone::Background => chain.apply(Color::from_rgb(original)).to_rgb(),
        Zone::Transition(alpha) => {
            let color = Color::from_rgb(original);
            color.mix(chain.apply(color), alpha).to_rgb()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;

    fn grayscale_chain() -> EffectChain {
        EffectChain::new(vec![EffectKind::Grayscale])
    }

    #[test]
    fn test_gamma_is_monotonic() {
        let mut previous = gamma_shape(0.0);
        for step in 1..=1000 {
            let shaped = gamma_shape(step as f32 / 1000.0);
            assert!(shaped > previous, "not increasing at step {}", step);
            previous = shaped;
        }
        assert_eq!(gamma_shape(1.0), 1.0);
        assert!((gamma_shape(0.5) - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_endpoints_and_monotonicity() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);

        let mut previous = 0.0;
        for step in 0..=1000 {
            let alpha = smoothstep(step as f32 / 1000.0);
            assert!(alpha >= previous);
            previous = alpha;
        }
    }

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(classify(0.0999), Zone::Background);
        assert_eq!(classify(LOW_THRESHOLD), Zone::Transition(0.0));
        assert_eq!(classify(HIGH_THRESHOLD), Zone::Transition(1.0));
        assert_eq!(classify(0.8001), Zone::Foreground);
    }

    #[test]
    fn test_foreground_keeps_original() {
        let chain = EffectChain::new(vec![EffectKind::Invert, EffectKind::Sepia]);
        let original = [200, 150, 100];

        // Cube root of 0.8 ≈ 0.9283; 0.93^3 ≈ 0.804
        for confidence in [0.93, 0.95, 0.97, 1.0] {
            assert_eq!(composite_pixel(original, confidence, &chain), original);
        }
    }

    #[test]
    fn test_background_grayscale_channels_equal_luminance() {
        let chain = grayscale_chain();
        let original = [200, 150, 100];

        // Cube root of 0.1 ≈ 0.464
        for confidence in [0.0, 0.05, 0.2, 0.4, 0.46] {
            assert_eq!(composite_pixel(original, confidence, &chain), [159, 159, 159]);
        }
    }

    #[test]
    fn test_transition_is_nearly_full_effect_near_low_threshold() {
        let chain = grayscale_chain();

        // 0.5^3 = 0.125; t ≈ 0.0357; alpha ≈ 0.0037
        let Zone::Transition(alpha) = classify(gamma_shape(0.5)) else {
            panic!("0.5 should land in the transition zone");
        };
        assert!((alpha - 0.00372).abs() < 1e-4);
        assert_eq!(composite_pixel([200, 150, 100], 0.5, &chain), [159, 159, 159]);
    }

    #[test]
    fn test_transition_midpoint_mixes_evenly() {
        let chain = EffectChain::new(vec![EffectKind::Invert]);
        // Shaped confidence 0.45 sits halfway between the thresholds
        let confidence = 0.45f32.powf(1.0 / 3.0);

        let out = composite_pixel([200, 100, 0], confidence, &chain);
        // 200 * 0.5 + 55 * 0.5 = 127.5; 100 * 0.5 + 155 * 0.5 = 127.5; 0 * 0.5 + 255 * 0.5 = 127.5
        for channel in out {
            assert!((127..=128).contains(&channel));
        }
    }
}
