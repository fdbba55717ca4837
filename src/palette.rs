//! Colors and block palettes
//!
//! Colors travel through config files and save data as `#rrggbb` hex strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Linear RGBA color, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::from_u32(0xffffff);
    pub const GOLD: Rgba = Rgba::from_u32(0xffd700);
    pub const MISS_RED: Rgba = Rgba::from_u32(0xff4757);
    pub const SHIELD_BLUE: Rgba = Rgba::from_u32(0x54a0ff);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a packed `0xRRGGBB` value
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` string for canvas sinks
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            channel_u8(self.r),
            channel_u8(self.g),
            channel_u8(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque
    pub fn to_hex(&self) -> String {
        let rgb = format!(
            "#{:02x}{:02x}{:02x}",
            channel_u8(self.r),
            channel_u8(self.g),
            channel_u8(self.b)
        );
        if self.a < 1.0 {
            format!("{}{:02x}", rgb, channel_u8(self.a))
        } else {
            rgb
        }
    }
}

fn channel_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
pub fn parse_hex(s: &str) -> Result<Rgba, PaletteError> {
    let hex = s.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PaletteError::InvalidHex(s.to_string()));
    }
    let byte = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| PaletteError::InvalidHex(s.to_string()))
    };
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok(Rgba::new(
        byte(0)? as f32 / 255.0,
        byte(2)? as f32 / 255.0,
        byte(4)? as f32 / 255.0,
        a as f32 / 255.0,
    ))
}

impl TryFrom<String> for Rgba {
    type Error = PaletteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_hex()
    }
}

/// Top/bottom colors of a block's vertical gradient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorPair {
    pub top: Rgba,
    pub bottom: Rgba,
}

impl ColorPair {
    pub const fn from_u32(top: u32, bottom: u32) -> Self {
        Self {
            top: Rgba::from_u32(top),
            bottom: Rgba::from_u32(bottom),
        }
    }
}

/// Default palette, cycled by tower height
pub const CLASSIC: &[ColorPair] = &[
    ColorPair::from_u32(0xff6b6b, 0xee5a5a),
    ColorPair::from_u32(0xff8e53, 0xe67d42),
    ColorPair::from_u32(0xfeca57, 0xe5b346),
    ColorPair::from_u32(0x48dbfb, 0x37caeb),
    ColorPair::from_u32(0x1dd1a1, 0x0cc090),
    ColorPair::from_u32(0x5f27cd, 0x4e16bc),
    ColorPair::from_u32(0xff9ff3, 0xee8ee2),
    ColorPair::from_u32(0x54a0ff, 0x4390ee),
    ColorPair::from_u32(0x00d2d3, 0x00c1c2),
    ColorPair::from_u32(0xff6b81, 0xee5a70),
];

pub const NEON: &[ColorPair] = &[
    ColorPair::from_u32(0x39ff14, 0x2bd60e),
    ColorPair::from_u32(0xff073a, 0xd9002c),
    ColorPair::from_u32(0x00f0ff, 0x00c3d0),
    ColorPair::from_u32(0xfe019a, 0xd10080),
    ColorPair::from_u32(0xfff01f, 0xd8cb10),
];

pub const PASTEL: &[ColorPair] = &[
    ColorPair::from_u32(0xffd1dc, 0xf2bccb),
    ColorPair::from_u32(0xc1e1c1, 0xaed3ae),
    ColorPair::from_u32(0xaec6cf, 0x9ab5bf),
    ColorPair::from_u32(0xfdfd96, 0xeaea80),
    ColorPair::from_u32(0xcbaacb, 0xb898b8),
];

pub const SUNSET: &[ColorPair] = &[
    ColorPair::from_u32(0xff5e62, 0xe84a4e),
    ColorPair::from_u32(0xff9966, 0xe88450),
    ColorPair::from_u32(0xffc371, 0xe8ad5c),
    ColorPair::from_u32(0xc06c84, 0xa85a70),
    ColorPair::from_u32(0x6c5b7b, 0x5a4a68),
];

pub const OCEAN: &[ColorPair] = &[
    ColorPair::from_u32(0x006994, 0x00587c),
    ColorPair::from_u32(0x0099cc, 0x0084b0),
    ColorPair::from_u32(0x40e0d0, 0x2fc8b9),
    ColorPair::from_u32(0x7fdbff, 0x66c6eb),
    ColorPair::from_u32(0x1e90ff, 0x157ae0),
];

pub const ROYAL: &[ColorPair] = &[
    ColorPair::from_u32(0xffd700, 0xe6c200),
    ColorPair::from_u32(0x8e44ad, 0x7a3895),
    ColorPair::from_u32(0xf5f5f5, 0xdedede),
    ColorPair::from_u32(0xc0392b, 0xa93226),
];

/// Color pair for the block at `index` in a palette (cycles)
pub fn cycle(palette: &[ColorPair], index: usize) -> ColorPair {
    if palette.is_empty() {
        return CLASSIC[index % CLASSIC.len()];
    }
    palette[index % palette.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c = parse_hex("#ff8000").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);

        let c = parse_hex("00ff0080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert_eq!(
            parse_hex("#12345"),
            Err(PaletteError::InvalidHex("#12345".to_string()))
        );
        assert!(parse_hex("#gg0000").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn test_hex_string_serde() {
        let json = serde_json::to_string(&Rgba::GOLD).unwrap();
        assert_eq!(json, "\"#ffd700\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgba::GOLD);
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(CLASSIC, 0), CLASSIC[0]);
        assert_eq!(cycle(CLASSIC, CLASSIC.len() + 2), CLASSIC[2]);
        assert_eq!(cycle(&[], 1), CLASSIC[1]);
    }

    #[test]
    fn test_css() {
        assert_eq!(Rgba::WHITE.with_alpha(0.5).to_css(), "rgba(255, 255, 255, 0.5)");
    }
}
