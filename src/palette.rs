//! Neon color palette shared by the shape field and the bursts.

use rand::seq::SliceRandom;
use rand::Rng;

/// Opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Fixed set of colors entities draw from
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Build a palette; an empty list falls back to white so picks never fail
    pub fn new(colors: Vec<Color>) -> Self {
        if colors.is_empty() {
            return Self {
                colors: vec![Color::WHITE],
            };
        }
        Self { colors }
    }

    /// Cyan, aqua, magenta, orange and violet
    pub fn neon() -> Self {
        Self::new(vec![
            Color::rgb(0x00, 0xff, 0xc6),
            Color::rgb(0x00, 0xe5, 0xff),
            Color::rgb(0xff, 0x2e, 0x63),
            Color::rgb(0xff, 0x9f, 0x1c),
            Color::rgb(0x7c, 0x5c, 0xff),
        ])
    }

    /// Uniformly pick one color
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        self.colors.choose(rng).copied().unwrap_or(Color::WHITE)
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::neon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#ff2e63"), Some(Color::rgb(0xff, 0x2e, 0x63)));
        assert_eq!(Color::from_hex("7c5cff"), Some(Color::rgb(0x7c, 0x5c, 0xff)));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_empty_palette_falls_back_to_white() {
        let palette = Palette::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(palette.pick(&mut rng), Color::WHITE);
    }

    #[test]
    fn test_picks_stay_in_palette() {
        let palette = Palette::neon();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(palette.len(), 5);
        for _ in 0..200 {
            assert!(palette.contains(palette.pick(&mut rng)));
        }
    }
}
