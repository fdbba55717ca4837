//! Stack Tower - A block-stacking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tower geometry, combos, effects, game state)
//! - `renderer`: Turns simulation state into drawable primitives
//! - `platform`: Fixed-step clock and storage backends
//! - `persistence`: Versioned progress snapshots with corruption recovery
//! - `progression`: Coins, skins, achievements, daily rewards and powerups
//! - `ads`: Monetization capability driven over a worker channel
//! - `config`: Data-driven game balance

pub mod ads;
pub mod app;
pub mod config;
pub mod palette;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod renderer;
pub mod sim;

pub use app::StackTower;
pub use config::{GameConfig, Variant};
pub use progression::Progress;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap the driver will try to catch up on (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Block defaults
    pub const BLOCK_HEIGHT: f32 = 35.0;
    /// Distance from the bottom of the canvas to the base block's top edge
    pub const BASE_BOTTOM_MARGIN: f32 = 120.0;

    /// Settle bounce: initial upward velocity and per-tick acceleration
    pub const SETTLE_BOUNCE_VELOCITY: f32 = -8.0;
    pub const SETTLE_BOUNCE_ACCEL: f32 = 1.5;

    /// Camera easing factor (fraction of remaining distance per tick)
    pub const CAMERA_EASING: f32 = 0.08;
    /// Multiplicative decay per tick
    pub const SCREEN_SHAKE_DECAY: f32 = 0.9;
    pub const GLOW_DECAY: f32 = 0.95;

    /// Shake magnitudes (pixels)
    pub const GAME_OVER_SHAKE: f32 = 20.0;

    /// Ticks between game over and the game-over screen (800 ms)
    pub const GAME_OVER_UI_DELAY_TICKS: u32 = 48;
    /// Width added to the top block when reviving
    pub const REVIVE_WIDTH_BONUS: f32 = 30.0;
}
