//! On-disk shape of `Progress`
//!
//! Ids are stored by name so the enums can grow without breaking old saves.
//! Names this build does not know are dropped on load.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::progression::{AchievementId, PowerupKind, Progress, SkinId};

/// Snapshot format version
pub const CURRENT_VERSION: u32 = 1;

/// Versioned wrapper around a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub data: ProgressRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressRecord {
    pub coins: u64,
    pub gems: u32,
    pub high_score: u64,
    pub total_games: u32,
    pub current_skin: String,
    pub unlocked_skins: Vec<String>,
    pub achievements: Vec<String>,
    pub last_daily: Option<u32>,
    pub daily_streak: u32,
    pub total_coins_earned: u64,
    pub total_perfects: u64,
    pub powerup_counts: BTreeMap<String, u32>,
}

impl From<&Progress> for ProgressRecord {
    fn from(progress: &Progress) -> Self {
        Self {
            coins: progress.coins,
            gems: progress.gems,
            high_score: progress.high_score,
            total_games: progress.total_games,
            current_skin: progress.current_skin.as_str().to_string(),
            unlocked_skins: progress
                .unlocked_skins
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            achievements: progress
                .achievements
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
            last_daily: progress.last_daily,
            daily_streak: progress.daily_streak,
            total_coins_earned: progress.total_coins_earned,
            total_perfects: progress.total_perfects,
            powerup_counts: progress
                .powerups
                .iter()
                .map(|(kind, count)| (kind.as_str().to_string(), *count))
                .collect(),
        }
    }
}

fn known<T>(names: &[String], what: &str, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    names
        .iter()
        .filter_map(|name| {
            let parsed = parse(name);
            if parsed.is_none() {
                log::warn!("Dropping unknown {what} '{name}' from saved progress");
            }
            parsed
        })
        .collect()
}

impl ProgressRecord {
    pub fn into_progress(self) -> Progress {
        let mut unlocked_skins: BTreeSet<SkinId> =
            known(&self.unlocked_skins, "skin", SkinId::from_str)
                .into_iter()
                .collect();
        unlocked_skins.insert(SkinId::Classic);

        let current_skin = SkinId::from_str(&self.current_skin)
            .filter(|skin| unlocked_skins.contains(skin))
            .unwrap_or(SkinId::Classic);

        let mut powerups = BTreeMap::new();
        for (name, count) in &self.powerup_counts {
            match PowerupKind::from_str(name) {
                Some(kind) if *count > 0 => {
                    powerups.insert(kind, *count);
                }
                Some(_) => {}
                None => log::warn!("Dropping unknown powerup '{name}' from saved progress"),
            }
        }

        Progress {
            coins: self.coins,
            gems: self.gems,
            high_score: self.high_score,
            total_games: self.total_games,
            current_skin,
            unlocked_skins,
            achievements: known(&self.achievements, "achievement", AchievementId::from_str)
                .into_iter()
                .collect(),
            last_daily: self.last_daily,
            daily_streak: self.daily_streak,
            total_coins_earned: self.total_coins_earned,
            total_perfects: self.total_perfects,
            powerups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_camel_case() {
        let mut progress = Progress::default();
        progress.high_score = 12;
        progress.powerups.insert(PowerupKind::SlowMotion, 2);
        let json = serde_json::to_string(&ProgressRecord::from(&progress)).unwrap();

        for key in [
            "\"coins\"",
            "\"highScore\"",
            "\"totalGames\"",
            "\"currentSkin\"",
            "\"unlockedSkins\"",
            "\"lastDaily\"",
            "\"dailyStreak\"",
            "\"totalCoinsEarned\"",
            "\"totalPerfects\"",
            "\"powerupCounts\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        assert!(json.contains("\"slow_motion\":2"));
    }

    #[test]
    fn test_unknown_ids_dropped() {
        let record = ProgressRecord {
            current_skin: "plaid".to_string(),
            unlocked_skins: vec!["neon".to_string(), "plaid".to_string()],
            achievements: vec!["tower_10".to_string(), "moonwalk".to_string()],
            powerup_counts: BTreeMap::from([
                ("shield".to_string(), 3),
                ("teleport".to_string(), 1),
            ]),
            ..Default::default()
        };
        let progress = record.into_progress();
        assert_eq!(progress.current_skin, SkinId::Classic);
        assert_eq!(
            progress.unlocked_skins,
            BTreeSet::from([SkinId::Classic, SkinId::Neon])
        );
        assert_eq!(
            progress.achievements,
            BTreeSet::from([AchievementId::Tower10])
        );
        assert_eq!(progress.powerup_count(PowerupKind::Shield), 3);
        assert_eq!(progress.powerups.len(), 1);
    }

    #[test]
    fn test_locked_current_skin_falls_back() {
        let record = ProgressRecord {
            current_skin: "royal".to_string(),
            ..Default::default()
        };
        assert_eq!(record.into_progress().current_skin, SkinId::Classic);
    }
}
