//! Player progression
//!
//! Coins, gems, skins, achievements, daily rewards and the powerup inventory.
//! This is the in-memory view; `persistence` turns it into snapshots.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::palette::{self, ColorPair};

/// Coins per day of daily streak
pub const DAILY_BASE_COINS: u32 = 10;
/// Daily reward stops growing after this many consecutive days
pub const DAILY_STREAK_CAP: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: u64, available: u64 },
    #[error("not enough gems: need {needed}, have {available}")]
    InsufficientGems { needed: u32, available: u32 },
    #[error("skin {0:?} is locked")]
    SkinLocked(SkinId),
    #[error("skin {0:?} is already unlocked")]
    AlreadyUnlocked(SkinId),
    #[error("no {0:?} powerup owned")]
    NoPowerup(PowerupKind),
    #[error("{0:?} is already active")]
    PowerupActive(PowerupKind),
    #[error("daily reward already claimed today")]
    DailyAlreadyClaimed,
}

/// What something costs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Price {
    Free,
    Coins(u32),
    Gems(u32),
}

/// Block color skins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkinId {
    Classic,
    Neon,
    Pastel,
    Sunset,
    Ocean,
    Royal,
}

impl SkinId {
    pub const ALL: [Self; 6] = [
        Self::Classic,
        Self::Neon,
        Self::Pastel,
        Self::Sunset,
        Self::Ocean,
        Self::Royal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Neon => "neon",
            Self::Pastel => "pastel",
            Self::Sunset => "sunset",
            Self::Ocean => "ocean",
            Self::Royal => "royal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|skin| skin.as_str() == s)
    }

    pub fn price(&self) -> Price {
        match self {
            Self::Classic => Price::Free,
            Self::Neon => Price::Coins(200),
            Self::Pastel => Price::Coins(300),
            Self::Sunset => Price::Coins(500),
            Self::Ocean => Price::Coins(750),
            Self::Royal => Price::Gems(10),
        }
    }

    pub fn palette(&self) -> &'static [ColorPair] {
        match self {
            Self::Classic => palette::CLASSIC,
            Self::Neon => palette::NEON,
            Self::Pastel => palette::PASTEL,
            Self::Sunset => palette::SUNSET,
            Self::Ocean => palette::OCEAN,
            Self::Royal => palette::ROYAL,
        }
    }

    /// Colors for the block at tower index `index`
    pub fn colors(&self, index: usize) -> ColorPair {
        palette::cycle(self.palette(), index)
    }
}

/// Stats a finished session is judged on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u64,
    pub max_streak: u32,
}

/// One-time goals that pay out gems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    FirstStack,
    Tower10,
    Tower25,
    Tower50,
    Tower100,
    Combo5,
    Combo10,
    Combo15,
    Perfectionist,
    Veteran,
    Tycoon,
}

impl AchievementId {
    pub const ALL: [Self; 11] = [
        Self::FirstStack,
        Self::Tower10,
        Self::Tower25,
        Self::Tower50,
        Self::Tower100,
        Self::Combo5,
        Self::Combo10,
        Self::Combo15,
        Self::Perfectionist,
        Self::Veteran,
        Self::Tycoon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstStack => "first_stack",
            Self::Tower10 => "tower_10",
            Self::Tower25 => "tower_25",
            Self::Tower50 => "tower_50",
            Self::Tower100 => "tower_100",
            Self::Combo5 => "combo_5",
            Self::Combo10 => "combo_10",
            Self::Combo15 => "combo_15",
            Self::Perfectionist => "perfectionist",
            Self::Veteran => "veteran",
            Self::Tycoon => "tycoon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::FirstStack => "First Stack",
            Self::Tower10 => "Getting Tall",
            Self::Tower25 => "Skyscraper",
            Self::Tower50 => "Cloud Piercer",
            Self::Tower100 => "Space Elevator",
            Self::Combo5 => "In The Zone",
            Self::Combo10 => "Unstoppable",
            Self::Combo15 => "Godlike",
            Self::Perfectionist => "Perfectionist",
            Self::Veteran => "Veteran",
            Self::Tycoon => "Tycoon",
        }
    }

    pub fn gem_reward(&self) -> u32 {
        match self {
            Self::FirstStack | Self::Tower10 | Self::Combo5 => 1,
            Self::Tower25 | Self::Combo10 | Self::Veteran => 2,
            Self::Tower50 | Self::Combo15 | Self::Perfectionist | Self::Tycoon => 3,
            Self::Tower100 => 5,
        }
    }

    fn is_met(&self, session: &SessionSummary, progress: &Progress) -> bool {
        match self {
            Self::FirstStack => session.score >= 1,
            Self::Tower10 => session.score >= 10,
            Self::Tower25 => session.score >= 25,
            Self::Tower50 => session.score >= 50,
            Self::Tower100 => session.score >= 100,
            Self::Combo5 => session.max_streak >= 5,
            Self::Combo10 => session.max_streak >= 10,
            Self::Combo15 => session.max_streak >= 15,
            Self::Perfectionist => progress.total_perfects >= 100,
            Self::Veteran => progress.total_games >= 25,
            Self::Tycoon => progress.total_coins_earned >= 1000,
        }
    }
}

/// Consumables bought with coins and armed before a drop goes wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Turns one failed drop into a safe placement
    Shield,
    /// Halves block speed for a number of blocks
    SlowMotion,
}

impl PowerupKind {
    pub const ALL: [Self; 2] = [Self::Shield, Self::SlowMotion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shield => "shield",
            Self::SlowMotion => "slow_motion",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn price(&self) -> u32 {
        match self {
            Self::Shield => 50,
            Self::SlowMotion => 30,
        }
    }
}

/// Day index (days since the Unix epoch) for a millisecond timestamp
pub fn day_number(unix_ms: f64) -> u32 {
    (unix_ms.max(0.0) / 86_400_000.0).floor() as u32
}

/// Persistent player progress
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub coins: u64,
    pub gems: u32,
    pub high_score: u64,
    pub total_games: u32,
    pub current_skin: SkinId,
    /// Always contains `SkinId::Classic`
    pub unlocked_skins: BTreeSet<SkinId>,
    pub achievements: BTreeSet<AchievementId>,
    /// Day number of the last claimed daily reward
    pub last_daily: Option<u32>,
    pub daily_streak: u32,
    pub total_coins_earned: u64,
    pub total_perfects: u64,
    pub powerups: BTreeMap<PowerupKind, u32>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            coins: 0,
            gems: 0,
            high_score: 0,
            total_games: 0,
            current_skin: SkinId::Classic,
            unlocked_skins: BTreeSet::from([SkinId::Classic]),
            achievements: BTreeSet::new(),
            last_daily: None,
            daily_streak: 0,
            total_coins_earned: 0,
            total_perfects: 0,
            powerups: BTreeMap::new(),
        }
    }
}

impl Progress {
    pub fn earn_coins(&mut self, amount: u32) {
        self.coins += amount as u64;
        self.total_coins_earned += amount as u64;
    }

    pub fn spend_coins(&mut self, amount: u32) -> Result<(), ProgressError> {
        let needed = amount as u64;
        if self.coins < needed {
            return Err(ProgressError::InsufficientCoins {
                needed,
                available: self.coins,
            });
        }
        self.coins -= needed;
        Ok(())
    }

    pub fn spend_gems(&mut self, amount: u32) -> Result<(), ProgressError> {
        if self.gems < amount {
            return Err(ProgressError::InsufficientGems {
                needed: amount,
                available: self.gems,
            });
        }
        self.gems -= amount;
        Ok(())
    }

    fn pay(&mut self, price: Price) -> Result<(), ProgressError> {
        match price {
            Price::Free => Ok(()),
            Price::Coins(n) => self.spend_coins(n),
            Price::Gems(n) => self.spend_gems(n),
        }
    }

    pub fn record_perfect(&mut self) {
        self.total_perfects += 1;
    }

    /// Count a finished game; returns true on a new high score
    pub fn record_game(&mut self, score: u64) -> bool {
        self.total_games += 1;
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    /// Unlock every newly met achievement, paying out its gems
    pub fn check_achievements(&mut self, session: &SessionSummary) -> Vec<AchievementId> {
        let newly: Vec<AchievementId> = AchievementId::ALL
            .into_iter()
            .filter(|a| !self.achievements.contains(a) && a.is_met(session, self))
            .collect();
        for achievement in &newly {
            self.achievements.insert(*achievement);
            self.gems += achievement.gem_reward();
        }
        newly
    }

    pub fn is_unlocked(&self, skin: SkinId) -> bool {
        self.unlocked_skins.contains(&skin)
    }

    /// Buy a skin and equip it
    pub fn unlock_skin(&mut self, skin: SkinId) -> Result<(), ProgressError> {
        if self.is_unlocked(skin) {
            return Err(ProgressError::AlreadyUnlocked(skin));
        }
        self.pay(skin.price())?;
        self.unlocked_skins.insert(skin);
        self.current_skin = skin;
        Ok(())
    }

    pub fn select_skin(&mut self, skin: SkinId) -> Result<(), ProgressError> {
        if !self.is_unlocked(skin) {
            return Err(ProgressError::SkinLocked(skin));
        }
        self.current_skin = skin;
        Ok(())
    }

    pub fn powerup_count(&self, kind: PowerupKind) -> u32 {
        self.powerups.get(&kind).copied().unwrap_or(0)
    }

    pub fn buy_powerup(&mut self, kind: PowerupKind) -> Result<(), ProgressError> {
        self.spend_coins(kind.price())?;
        *self.powerups.entry(kind).or_insert(0) += 1;
        Ok(())
    }

    pub fn consume_powerup(&mut self, kind: PowerupKind) -> Result<(), ProgressError> {
        match self.powerups.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.powerups.remove(&kind);
                }
                Ok(())
            }
            _ => Err(ProgressError::NoPowerup(kind)),
        }
    }

    /// Claim today's reward; consecutive days grow the streak
    pub fn claim_daily(&mut self, today: u32) -> Result<u32, ProgressError> {
        match self.last_daily {
            Some(last) if last >= today => return Err(ProgressError::DailyAlreadyClaimed),
            Some(last) if last + 1 == today => self.daily_streak += 1,
            _ => self.daily_streak = 1,
        }
        self.last_daily = Some(today);
        let reward = DAILY_BASE_COINS * self.daily_streak.min(DAILY_STREAK_CAP);
        self.earn_coins(reward);
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let progress = Progress::default();
        assert_eq!(progress.current_skin, SkinId::Classic);
        assert!(progress.is_unlocked(SkinId::Classic));
        assert_eq!(progress.coins, 0);
        assert_eq!(progress.powerup_count(PowerupKind::Shield), 0);
    }

    #[test]
    fn test_earn_and_spend() {
        let mut progress = Progress::default();
        progress.earn_coins(40);
        assert_eq!(
            progress.spend_coins(50),
            Err(ProgressError::InsufficientCoins {
                needed: 50,
                available: 40
            })
        );
        progress.spend_coins(15).unwrap();
        assert_eq!(progress.coins, 25);
        // Spending never lowers the lifetime total
        assert_eq!(progress.total_coins_earned, 40);
    }

    #[test]
    fn test_skins() {
        let mut progress = Progress::default();
        assert_eq!(
            progress.select_skin(SkinId::Neon),
            Err(ProgressError::SkinLocked(SkinId::Neon))
        );
        progress.earn_coins(250);
        progress.unlock_skin(SkinId::Neon).unwrap();
        assert_eq!(progress.coins, 50);
        assert_eq!(progress.current_skin, SkinId::Neon);
        assert_eq!(
            progress.unlock_skin(SkinId::Neon),
            Err(ProgressError::AlreadyUnlocked(SkinId::Neon))
        );
        assert!(matches!(
            progress.unlock_skin(SkinId::Royal),
            Err(ProgressError::InsufficientGems { needed: 10, .. })
        ));
        progress.select_skin(SkinId::Classic).unwrap();
        assert_eq!(progress.current_skin, SkinId::Classic);
    }

    #[test]
    fn test_skin_ids_round_trip_names() {
        for skin in SkinId::ALL {
            assert_eq!(SkinId::from_str(skin.as_str()), Some(skin));
            assert!(!skin.palette().is_empty());
        }
        assert_eq!(SkinId::from_str("plaid"), None);
    }

    #[test]
    fn test_powerups() {
        let mut progress = Progress::default();
        assert!(progress.buy_powerup(PowerupKind::Shield).is_err());
        progress.earn_coins(100);
        progress.buy_powerup(PowerupKind::Shield).unwrap();
        progress.buy_powerup(PowerupKind::SlowMotion).unwrap();
        assert_eq!(progress.coins, 20);
        assert_eq!(progress.powerup_count(PowerupKind::Shield), 1);

        progress.consume_powerup(PowerupKind::Shield).unwrap();
        assert_eq!(progress.powerup_count(PowerupKind::Shield), 0);
        assert_eq!(
            progress.consume_powerup(PowerupKind::Shield),
            Err(ProgressError::NoPowerup(PowerupKind::Shield))
        );
    }

    #[test]
    fn test_record_game_high_score() {
        let mut progress = Progress::default();
        assert!(progress.record_game(12));
        assert!(!progress.record_game(12));
        assert!(!progress.record_game(3));
        assert!(progress.record_game(13));
        assert_eq!(progress.high_score, 13);
        assert_eq!(progress.total_games, 4);
    }

    #[test]
    fn test_achievements_unlock_once() {
        let mut progress = Progress::default();
        let session = SessionSummary {
            score: 27,
            max_streak: 5,
        };
        let unlocked = progress.check_achievements(&session);
        assert_eq!(
            unlocked,
            vec![
                AchievementId::FirstStack,
                AchievementId::Tower10,
                AchievementId::Tower25,
                AchievementId::Combo5,
            ]
        );
        assert_eq!(progress.gems, 1 + 1 + 2 + 1);
        assert!(progress.check_achievements(&session).is_empty());
    }

    #[test]
    fn test_lifetime_achievements() {
        let mut progress = Progress::default();
        progress.total_perfects = 100;
        progress.earn_coins(1000);
        let unlocked = progress.check_achievements(&SessionSummary::default());
        assert_eq!(
            unlocked,
            vec![AchievementId::Perfectionist, AchievementId::Tycoon]
        );
    }

    #[test]
    fn test_daily_streak() {
        let mut progress = Progress::default();
        assert_eq!(progress.claim_daily(100), Ok(10));
        assert_eq!(
            progress.claim_daily(100),
            Err(ProgressError::DailyAlreadyClaimed)
        );
        assert_eq!(progress.claim_daily(101), Ok(20));
        assert_eq!(progress.claim_daily(102), Ok(30));
        // Missed a day: streak restarts
        assert_eq!(progress.claim_daily(104), Ok(10));
        assert_eq!(progress.daily_streak, 1);

        for day in 105..115 {
            progress.claim_daily(day).unwrap();
        }
        assert_eq!(progress.claim_daily(115), Ok(DAILY_BASE_COINS * DAILY_STREAK_CAP));
    }

    #[test]
    fn test_day_number() {
        assert_eq!(day_number(0.0), 0);
        assert_eq!(day_number(86_400_000.0 * 3.5), 3);
        assert_eq!(day_number(-5.0), 0);
    }
}
