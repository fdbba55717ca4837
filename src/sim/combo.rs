//! Combo streaks and scoring tiers
//!
//! Consecutive perfect drops build a streak. Each streak length maps to a
//! fixed tier bundle (score, coins, message, shake, glow); the highest tier
//! whose threshold the streak reaches wins.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::palette::Rgba;

/// One row of the combo table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTier {
    /// Minimum streak for this tier (0 for the neutral tier)
    pub threshold: u32,
    pub score_bonus: u32,
    pub coin_bonus: u32,
    /// Popup text ("" for none)
    pub message: String,
    /// Screen shake magnitude in pixels
    pub screen_shake: f32,
    /// Glow under the tower top, 0..=1
    pub glow_intensity: f32,
    pub particle_color: Rgba,
}

impl ComboTier {
    fn new(
        threshold: u32,
        score_bonus: u32,
        coin_bonus: u32,
        message: &str,
        screen_shake: f32,
        glow_intensity: f32,
        particle_color: u32,
    ) -> Self {
        Self {
            threshold,
            score_bonus,
            coin_bonus,
            message: message.to_string(),
            screen_shake,
            glow_intensity,
            particle_color: Rgba::from_u32(particle_color),
        }
    }
}

/// Streak bookkeeping for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    pub streak: u32,
    pub max_streak: u32,
}

impl ComboState {
    /// Count a perfect drop, returning the new streak
    pub fn register_perfect(&mut self) -> u32 {
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
        self.streak
    }

    /// Break the streak (imperfect drop, miss, revive)
    pub fn reset(&mut self) {
        self.streak = 0;
    }
}

/// Maps streaks to tiers. Pure: same streak, same tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboScorer {
    /// Sorted by strictly increasing threshold, first threshold is 1
    pub tiers: Vec<ComboTier>,
    /// Used for streak 0 and every non-perfect drop
    pub neutral: ComboTier,
}

impl ComboScorer {
    /// Five tiers topping out at LEGENDARY, no coins
    pub fn classic() -> Self {
        Self {
            tiers: base_tiers(false),
            neutral: ComboTier::new(0, 1, 0, "", 2.0, 0.0, 0xfeca57),
        }
    }

    /// Six tiers including GODLIKE at 15, with coin rewards
    pub fn deluxe() -> Self {
        let mut tiers = base_tiers(true);
        tiers.push(ComboTier::new(15, 8, 12, "GODLIKE!", 18.0, 1.0, 0xffffff));
        Self {
            tiers,
            neutral: ComboTier::new(0, 1, 1, "", 2.0, 0.0, 0xfeca57),
        }
    }

    /// Tier for a streak after incrementing; streak 0 gets the neutral tier
    pub fn tier_for(&self, streak: u32) -> &ComboTier {
        self.tiers
            .iter()
            .rev()
            .find(|t| streak >= t.threshold && t.threshold > 0)
            .unwrap_or(&self.neutral)
    }

    pub fn neutral(&self) -> &ComboTier {
        &self.neutral
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.tiers.first() {
            Some(first) if first.threshold == 1 => {}
            _ => return Err(ConfigError::TierOrder),
        }
        if self
            .tiers
            .windows(2)
            .any(|w| w[1].threshold <= w[0].threshold)
        {
            return Err(ConfigError::TierOrder);
        }
        for tier in self.tiers.iter().chain(std::iter::once(&self.neutral)) {
            if !(0.0..=1.0).contains(&tier.glow_intensity) {
                return Err(ConfigError::OutOfRange {
                    field: "glow_intensity",
                    expected: "within 0..=1",
                    value: tier.glow_intensity,
                });
            }
            if tier.screen_shake < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "screen_shake",
                    expected: "non-negative",
                    value: tier.screen_shake,
                });
            }
        }
        Ok(())
    }
}

fn base_tiers(with_coins: bool) -> Vec<ComboTier> {
    let coins = |n: u32| if with_coins { n } else { 0 };
    vec![
        ComboTier::new(1, 1, coins(1), "PERFECT!", 5.0, 0.2, 0xfeca57),
        ComboTier::new(3, 2, coins(2), "GREAT!", 8.0, 0.4, 0x48dbfb),
        ComboTier::new(5, 3, coins(3), "AMAZING!", 10.0, 0.6, 0xff9ff3),
        ComboTier::new(7, 4, coins(5), "INSANE!", 12.0, 0.8, 0xff6b6b),
        ComboTier::new(10, 5, coins(8), "LEGENDARY!", 15.0, 1.0, 0xffd700),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_thresholds() {
        let scorer = ComboScorer::deluxe();
        assert_eq!(scorer.tier_for(1).message, "PERFECT!");
        assert_eq!(scorer.tier_for(2).message, "PERFECT!");
        assert_eq!(scorer.tier_for(3).message, "GREAT!");
        assert_eq!(scorer.tier_for(4).score_bonus, 2);
        assert_eq!(scorer.tier_for(5).message, "AMAZING!");
        assert_eq!(scorer.tier_for(9).message, "INSANE!");
        assert_eq!(scorer.tier_for(14).message, "LEGENDARY!");
        assert_eq!(scorer.tier_for(15).message, "GODLIKE!");
        assert_eq!(scorer.tier_for(400).message, "GODLIKE!");
    }

    #[test]
    fn test_classic_caps_at_legendary() {
        let scorer = ComboScorer::classic();
        assert_eq!(scorer.tier_for(15).message, "LEGENDARY!");
        assert!(scorer.tiers.iter().all(|t| t.coin_bonus == 0));
    }

    #[test]
    fn test_streak_zero_is_neutral() {
        let scorer = ComboScorer::deluxe();
        let tier = scorer.tier_for(0);
        assert_eq!(tier, scorer.neutral());
        assert_eq!(tier.glow_intensity, 0.0);
        assert!(tier.message.is_empty());
    }

    #[test]
    fn test_combo_state() {
        let mut combo = ComboState::default();
        assert_eq!(combo.register_perfect(), 1);
        assert_eq!(combo.register_perfect(), 2);
        combo.reset();
        assert_eq!(combo.streak, 0);
        assert_eq!(combo.max_streak, 2);
        assert_eq!(combo.register_perfect(), 1);
        assert_eq!(combo.max_streak, 2);
    }

    #[test]
    fn test_validate() {
        assert!(ComboScorer::classic().validate().is_ok());
        assert!(ComboScorer::deluxe().validate().is_ok());

        let mut bad = ComboScorer::deluxe();
        bad.tiers.swap(1, 2);
        assert!(matches!(bad.validate(), Err(ConfigError::TierOrder)));

        let mut bad = ComboScorer::deluxe();
        bad.tiers.remove(0);
        assert!(matches!(bad.validate(), Err(ConfigError::TierOrder)));

        let mut bad = ComboScorer::classic();
        bad.tiers[2].glow_intensity = 1.5;
        assert!(matches!(bad.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    proptest! {
        #[test]
        fn prop_tier_lookup_is_pure(streak in 0u32..1000) {
            let scorer = ComboScorer::deluxe();
            prop_assert_eq!(scorer.tier_for(streak), scorer.tier_for(streak));
        }

        #[test]
        fn prop_bonus_never_decreases_with_streak(streak in 1u32..1000) {
            let scorer = ComboScorer::deluxe();
            prop_assert!(scorer.tier_for(streak + 1).score_bonus >= scorer.tier_for(streak).score_bonus);
        }
    }
}
