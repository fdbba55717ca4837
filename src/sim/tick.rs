//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::state::{GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tap / click / space: start on the title screen, drop while playing
    pub tap: bool,
    /// Game-over screen: back to the title screen
    pub restart: bool,
    /// Game-over screen: continue (the reward has already been granted)
    pub revive: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    // Inputs first so a drop resolves completely inside this tick
    if input.tap {
        match state.phase {
            GamePhase::Start => state.start_game(),
            GamePhase::Playing if state.tower.current.is_some() => state.drop_block(),
            _ => {}
        }
    }
    if input.revive {
        state.revive();
    }
    if input.restart {
        state.restart();
    }

    match state.phase {
        GamePhase::Playing => {
            state.tower.advance(state.config.canvas_width);
            state.effects.ease_camera();
            for block in &mut state.tower.blocks {
                block.update_settle();
            }
            state.effects.decay_glow();
        }
        GamePhase::GameOver => state.update_game_over(),
        GamePhase::Start => {}
    }

    state.effects.update(state.config.canvas_height);
}
