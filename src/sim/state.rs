//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here. Operations that move the
//! state machine are in `tower`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboState;
use super::effects::Effects;
use crate::config::GameConfig;
use crate::consts::{SETTLE_BOUNCE_ACCEL, SETTLE_BOUNCE_VELOCITY};
use crate::palette::ColorPair;
use crate::progression::{AchievementId, Progress};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the first tap
    Start,
    /// A block is moving (or about to be spawned)
    Playing,
    /// Tower toppled; waiting for revive or restart
    GameOver,
}

/// A stacked or moving block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Left edge
    pub x: f32,
    /// Top edge; decreases as the tower grows
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub colors: ColorPair,
    /// Vertical draw offset of the settle bounce (negative is up)
    pub bounce_offset: f32,
    pub bounce_velocity: f32,
    pub settled: bool,
}

impl Block {
    pub fn new(x: f32, y: f32, width: f32, height: f32, colors: ColorPair) -> Self {
        Self {
            x,
            y,
            width,
            height,
            colors,
            bounce_offset: 0.0,
            bounce_velocity: 0.0,
            settled: true,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Kick off the little hop a block does when it lands
    pub fn start_settle(&mut self) {
        self.bounce_offset = 0.0;
        self.bounce_velocity = SETTLE_BOUNCE_VELOCITY;
        self.settled = false;
    }

    pub fn update_settle(&mut self) {
        if self.settled {
            return;
        }
        self.bounce_offset += self.bounce_velocity;
        self.bounce_velocity += SETTLE_BOUNCE_ACCEL;
        if self.bounce_offset >= 0.0 {
            self.bounce_offset = 0.0;
            self.bounce_velocity = 0.0;
            self.settled = true;
        }
    }
}

/// The stacked blocks plus the one in flight
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tower {
    /// Index 0 is the base
    pub blocks: Vec<Block>,
    /// The moving block, if any
    pub current: Option<Block>,
    /// +1 moving right, -1 moving left
    pub direction: f32,
    /// Pixels per tick
    pub speed: f32,
}

impl Tower {
    pub fn top(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn base(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn height(&self) -> usize {
        self.blocks.len()
    }

    /// Slide the moving block one tick, bouncing off the canvas edges
    pub fn advance(&mut self, canvas_width: f32) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        current.x += self.speed * self.direction;
        if current.right() > canvas_width {
            self.direction = -1.0;
        } else if current.x < 0.0 {
            self.direction = 1.0;
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.current = None;
    }
}

/// Powerups armed for the running session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerups {
    /// Absorbs the next failed drop
    pub shield: bool,
    /// Placed blocks left at reduced speed
    pub slow_motion_blocks: u32,
}

/// Notable transitions, drained by the host each frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Perfect { streak: u32, score_bonus: u32 },
    Cut { kept_width: f32, cut_width: f32 },
    ShieldSaved,
    CoinsAwarded(u32),
    GameOver {
        score: u64,
        high_score: u64,
        new_record: bool,
    },
    AchievementUnlocked(AchievementId),
    /// The game-over screen may be shown now
    GameOverUiReady {
        can_revive: bool,
        show_interstitial: bool,
    },
    Revived,
    Restarted,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub config: GameConfig,
    pub phase: GamePhase,
    pub tower: Tower,
    pub combo: ComboState,
    /// Score for the running session
    pub score: u64,
    /// Coins awarded during the running session
    pub session_coins: u64,
    /// Cleared once the single revive has been used
    pub can_revive: bool,
    pub powerups: ActivePowerups,
    pub effects: Effects,
    pub progress: Progress,
    /// Set whenever `progress` changes; cleared by the host after saving
    pub progress_dirty: bool,
    /// Games finished since launch (drives interstitial cadence)
    pub games_played: u32,
    /// Ticks left before the game-over screen
    pub game_over_ticks: Option<u32>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state on the start screen
    pub fn new(seed: u64, config: GameConfig, progress: Progress) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            phase: GamePhase::Start,
            tower: Tower::default(),
            combo: ComboState::default(),
            score: 0,
            session_coins: 0,
            can_revive: true,
            powerups: ActivePowerups::default(),
            effects: Effects::default(),
            progress,
            progress_dirty: false,
            games_played: 0,
            game_over_ticks: None,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns true (once) if progress changed since the last call
    pub fn take_progress_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.progress_dirty, false)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Game over and the countdown to the game-over screen has run out
    pub fn game_over_ui_ready(&self) -> bool {
        self.phase == GamePhase::GameOver && self.game_over_ticks.is_none()
    }
}
