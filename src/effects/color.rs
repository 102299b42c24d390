/// An RGB color in floating point, 0.0-255.0 per channel
///
/// Effect transforms work on unrounded values so that stacked transforms do
/// not accumulate quantization error; only the compositor's final write
/// rounds and clamps back to bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32)
    }

    /// Round each channel to the nearest integer and clamp to 0-255
    pub fn to_rgb(self) -> [u8; 3] {
        [to_channel(self.r), to_channel(self.g), to_channel(self.b)]
    }

    /// Linear mix: `self * weight + other * (1 - weight)`
    pub fn mix(self, other: Color, weight: f32) -> Color {
        let inv = 1.0 - weight;
        Color {
            r: self.r * weight + other.r * inv,
            g: self.g * weight + other.g * inv,
            b: self.b * weight + other.b * inv,
        }
    }
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgb_rounds_and_clamps() {
        let color = Color::new(-3.0, 127.5, 300.2);
        assert_eq!(color.to_rgb(), [0, 128, 255]);
    }

    #[test]
    fn test_mix_weights() {
        let a = Color::new(200.0, 100.0, 0.0);
        let b = Color::new(0.0, 100.0, 200.0);

        assert_eq!(a.mix(b, 1.0), a);
        assert_eq!(a.mix(b, 0.0), b);
        assert_eq!(a.mix(b, 0.5), Color::new(100.0, 100.0, 100.0));
    }
}
