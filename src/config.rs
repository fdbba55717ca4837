//! Game balance and variant presets
//!
//! Everything tunable lives here so the simulation reads no magic numbers for
//! anything a designer might want to change. Loaded configs are validated
//! before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::BLOCK_HEIGHT;
use crate::sim::combo::ComboScorer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("combo tiers must start at streak 1 with strictly increasing thresholds")]
    TierOrder,
    #[error("base block width {base} does not fit a canvas {canvas} wide")]
    BaseTooWide { base: f32, canvas: f32 },
}

/// Game variant presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Score only: five combo tiers, no currency
    Classic,
    /// Coins, skins, powerups and a sixth combo tier
    #[default]
    Deluxe,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Deluxe => "Deluxe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "deluxe" | "rich" => Some(Variant::Deluxe),
            _ => None,
        }
    }

    /// Whether drops award coins and coin effects are shown
    pub fn tracks_rewards(&self) -> bool {
        matches!(self, Variant::Deluxe)
    }

    /// Widest allowed base block
    pub fn max_base_width(&self) -> f32 {
        match self {
            Variant::Classic => 180.0,
            Variant::Deluxe => 200.0,
        }
    }

    /// Base block width as a fraction of canvas width
    pub fn base_width_fraction(&self) -> f32 {
        match self {
            Variant::Classic => 0.45,
            Variant::Deluxe => 0.5,
        }
    }

    /// Blocks narrower than this end the game
    pub fn min_block_width(&self) -> f32 {
        match self {
            Variant::Classic => 15.0,
            Variant::Deluxe => 20.0,
        }
    }
}

/// Tunable game parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,

    // === Canvas ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Blocks ===
    pub base_block_width: f32,
    pub block_height: f32,
    /// Absolute pixel tolerance for a perfect drop (inclusive)
    pub perfect_tolerance: f32,
    pub min_block_width: f32,
    /// Width a shield gives an undersized block
    pub shield_rescue_width: f32,

    // === Difficulty (pixels per tick) ===
    pub base_speed: f32,
    /// Speed gained per point of score
    pub speed_acceleration: f32,
    /// Maximum speed gained from score
    pub speed_cap: f32,

    // === Rewards ===
    pub scorer: ComboScorer,
    /// Coins for a shield rescue
    pub shield_save_coins: u32,
    /// Slow motion lasts this many placed blocks
    pub slow_motion_blocks: u32,

    // === Monetization ===
    /// Interstitial checkpoint every N finished games (0 disables)
    pub interstitial_every: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_variant(Variant::Deluxe, 400.0, 700.0)
    }
}

impl GameConfig {
    /// Preset values for a variant on a canvas of the given size
    pub fn from_variant(variant: Variant, canvas_width: f32, canvas_height: f32) -> Self {
        let mut config = Self {
            variant,
            canvas_width,
            canvas_height,
            base_block_width: 0.0,
            block_height: BLOCK_HEIGHT,
            perfect_tolerance: 8.0,
            min_block_width: variant.min_block_width(),
            shield_rescue_width: 40.0,
            base_speed: 4.0,
            speed_acceleration: 0.15,
            speed_cap: 6.0,
            scorer: match variant {
                Variant::Classic => ComboScorer::classic(),
                Variant::Deluxe => ComboScorer::deluxe(),
            },
            shield_save_coins: 1,
            slow_motion_blocks: 10,
            interstitial_every: 3,
        };
        config.resize(canvas_width, canvas_height);
        config
    }

    /// Parse and validate a JSON config; missing fields take Deluxe defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Adapt to a new canvas size (recomputes the base block width)
    pub fn resize(&mut self, canvas_width: f32, canvas_height: f32) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.base_block_width = self
            .variant
            .max_base_width()
            .min(canvas_width * self.variant.base_width_fraction());
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("base_block_width", self.base_block_width),
            ("block_height", self.block_height),
            ("min_block_width", self.min_block_width),
            ("shield_rescue_width", self.shield_rescue_width),
            ("base_speed", self.base_speed),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "positive",
                    value,
                });
            }
        }
        let non_negative = [
            ("perfect_tolerance", self.perfect_tolerance),
            ("speed_acceleration", self.speed_acceleration),
            ("speed_cap", self.speed_cap),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "non-negative",
                    value,
                });
            }
        }
        if self.base_block_width > self.canvas_width {
            return Err(ConfigError::BaseTooWide {
                base: self.base_block_width,
                canvas: self.canvas_width,
            });
        }
        if self.min_block_width >= self.base_block_width {
            return Err(ConfigError::OutOfRange {
                field: "min_block_width",
                expected: "smaller than base_block_width",
                value: self.min_block_width,
            });
        }
        self.scorer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!(Variant::from_str("Classic"), Some(Variant::Classic));
        assert_eq!(Variant::from_str("DELUXE"), Some(Variant::Deluxe));
        assert_eq!(Variant::from_str("arcade"), None);
    }

    #[test]
    fn test_base_width_follows_canvas() {
        let config = GameConfig::from_variant(Variant::Deluxe, 400.0, 700.0);
        assert_eq!(config.base_block_width, 200.0);

        let config = GameConfig::from_variant(Variant::Deluxe, 320.0, 600.0);
        assert_eq!(config.base_block_width, 160.0);

        let config = GameConfig::from_variant(Variant::Classic, 1200.0, 800.0);
        assert_eq!(config.base_block_width, 180.0);
        assert_eq!(config.min_block_width, 15.0);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(
            GameConfig::from_variant(Variant::Classic, 400.0, 700.0)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_from_json_partial() {
        let config = GameConfig::from_json(r#"{ "perfect_tolerance": 4.0 }"#).unwrap();
        assert_eq!(config.perfect_tolerance, 4.0);
        assert_eq!(config.base_speed, 4.0);
        assert_eq!(config.variant, Variant::Deluxe);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "base_speed": -1.0 }"#),
            Err(ConfigError::OutOfRange { field: "base_speed", .. })
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "canvas_width": 100.0 }"#),
            Err(ConfigError::BaseTooWide { .. })
        ));
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
