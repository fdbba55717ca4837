//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod combo;
pub mod effects;
pub mod geometry;
pub mod state;
pub mod tick;
pub mod tower;

pub use combo::{ComboScorer, ComboState, ComboTier};
pub use effects::{CoinPopup, Effects, FallingPiece, Particle, TextPopup};
pub use geometry::{CutSide, Overlap, resolve_overlap};
pub use state::{ActivePowerups, Block, GameEvent, GamePhase, GameState, Tower};
pub use tick::{TickInput, tick};
pub use tower::next_block_speed;
