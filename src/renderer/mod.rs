//! Frame building
//!
//! Turns a `GameState` into a flat list of screen-space draw commands. The
//! sink (canvas, test, headless log) decides how to rasterize them.

pub mod frame;
pub mod shapes;
pub mod stars;

use glam::Vec2;
use rand::Rng;

pub use frame::{Align, DrawCommand, Fill, Frame, Hud};
pub use stars::Starfield;

use crate::config::GameConfig;
use crate::palette::Rgba;
use crate::sim::{GamePhase, GameState};

pub const BACKGROUND: [Rgba; 3] = [
    Rgba::from_u32(0x0f0f23),
    Rgba::from_u32(0x1a1a2e),
    Rgba::from_u32(0x16213e),
];

/// Combo glow is skipped below this intensity
const GLOW_THRESHOLD: f32 = 0.05;
const GLOW_RADIUS: f32 = 200.0;
/// Combo counter is shown from this streak on
const COMBO_COUNTER_MIN: u32 = 2;
/// Combo counter turns gold from this streak on
const COMBO_COUNTER_HOT: u32 = 5;
const REVIVE_BUTTON_SIZE: Vec2 = Vec2::new(160.0, 48.0);

/// Center and size of the revive button on the game-over screen
pub fn revive_button(config: &GameConfig) -> (Vec2, Vec2) {
    let center = Vec2::new(config.canvas_width / 2.0, config.canvas_height * 0.4 + 100.0);
    (center, REVIVE_BUTTON_SIZE)
}

/// Whether a screen position lands on the revive button
pub fn hits_revive_button(config: &GameConfig, pos: Vec2) -> bool {
    let (center, size) = revive_button(config);
    let d = (pos - center).abs();
    d.x <= size.x / 2.0 && d.y <= size.y / 2.0
}

/// Build the frame for `state`; `rng` only feeds the shake jitter
pub fn build_frame<R: Rng>(state: &GameState, stars: &Starfield, rng: &mut R) -> Frame {
    let config = &state.config;
    let effects = &state.effects;
    let mut commands = Vec::new();

    // Screen space, behind the world
    stars.draw(&mut commands, effects.camera_y, config.canvas_height);

    // World space: shake plus camera
    let offset = effects.shake_offset(rng) + Vec2::new(0.0, effects.camera_y);
    let to_screen = |p: Vec2| p + offset;

    if effects.glow > GLOW_THRESHOLD
        && let Some(top) = state.tower.top()
    {
        commands.push(DrawCommand::Glow {
            center: to_screen(Vec2::new(top.center().x, top.y)),
            radius: GLOW_RADIUS,
            color: Rgba::GOLD.with_alpha(effects.glow * 0.3),
        });
    }

    for block in &state.tower.blocks {
        let center = block.center() + Vec2::new(0.0, block.bounce_offset);
        shapes::block(
            &mut commands,
            to_screen(center),
            Vec2::new(block.width, block.height),
            block.colors,
            0.0,
            1.0,
        );
    }

    if let Some(current) = &state.tower.current {
        shapes::block(
            &mut commands,
            to_screen(current.center()),
            Vec2::new(current.width, current.height),
            current.colors,
            0.0,
            1.0,
        );

        // Guide lines down to the edges of the top block
        if let Some(top) = state.tower.top() {
            for x in [top.x, top.right()] {
                commands.push(DrawCommand::Line {
                    from: to_screen(Vec2::new(x, current.y + current.height)),
                    to: to_screen(Vec2::new(x, top.y)),
                    color: Rgba::WHITE.with_alpha(0.1),
                    width: 1.0,
                    dashed: true,
                });
            }
        }
    }

    for piece in &effects.falling_pieces {
        let center = piece.pos + Vec2::new(piece.width, piece.height) / 2.0;
        shapes::block(
            &mut commands,
            to_screen(center),
            Vec2::new(piece.width, piece.height),
            piece.colors,
            piece.rotation,
            piece.alpha,
        );
    }

    for particle in &effects.particles {
        commands.push(DrawCommand::Circle {
            center: to_screen(particle.pos),
            radius: particle.size,
            color: particle
                .color
                .with_alpha(particle.color.a * particle.life.clamp(0.0, 1.0)),
            glow: particle.glow,
        });
    }

    for popup in &effects.text_popups {
        let alpha = popup.life.clamp(0.0, 1.0);
        let pos = to_screen(popup.pos);
        commands.push(DrawCommand::Text {
            text: popup.text.clone(),
            pos,
            size: 24.0,
            scale: popup.scale,
            color: Rgba::WHITE.with_alpha(alpha),
            align: Align::Center,
            shadow: Some(popup.color),
        });
        if let Some(detail) = &popup.detail {
            commands.push(DrawCommand::Text {
                text: detail.clone(),
                pos: pos + Vec2::new(0.0, 25.0 * popup.scale),
                size: 18.0,
                scale: popup.scale,
                color: Rgba::GOLD.with_alpha(alpha),
                align: Align::Center,
                shadow: None,
            });
        }
    }

    for popup in &effects.coin_popups {
        commands.push(DrawCommand::Text {
            text: format!("+{}", popup.amount),
            pos: to_screen(popup.pos),
            size: 16.0,
            scale: 1.0,
            color: Rgba::GOLD.with_alpha(popup.life.clamp(0.0, 1.0)),
            align: Align::Center,
            shadow: None,
        });
    }

    // Screen space
    let streak = state.combo.streak;
    if state.phase == GamePhase::Playing && streak >= COMBO_COUNTER_MIN {
        let color = if streak >= COMBO_COUNTER_HOT {
            Rgba::GOLD
        } else {
            Rgba::WHITE
        };
        commands.push(DrawCommand::Text {
            text: format!("{streak}x COMBO"),
            pos: Vec2::new(config.canvas_width / 2.0, 100.0),
            size: 20.0,
            scale: 1.0,
            color,
            align: Align::Center,
            shadow: Some(color),
        });
    }

    if state.game_over_ui_ready() {
        game_over_overlay(&mut commands, state);
    }

    Frame {
        width: config.canvas_width,
        height: config.canvas_height,
        background: BACKGROUND,
        commands,
        hud: Hud {
            phase: state.phase,
            score: state.score,
            high_score: state.progress.high_score,
            coins: config
                .variant
                .tracks_rewards()
                .then_some(state.progress.coins),
            gems: state.progress.gems,
            combo: streak,
        },
    }
}

fn centered_text(text: String, pos: Vec2, size: f32, color: Rgba) -> DrawCommand {
    DrawCommand::Text {
        text,
        pos,
        size,
        scale: 1.0,
        color,
        align: Align::Center,
        shadow: None,
    }
}

fn game_over_overlay(out: &mut Vec<DrawCommand>, state: &GameState) {
    let config = &state.config;
    let at = |y: f32| Vec2::new(config.canvas_width / 2.0, y);
    let top = config.canvas_height * 0.4;

    out.push(centered_text("GAME OVER".to_string(), at(top), 36.0, Rgba::WHITE));
    out.push(centered_text(
        format!("Score {}", state.score),
        at(top + 36.0),
        20.0,
        Rgba::GOLD,
    ));
    out.push(centered_text(
        "Tap to play again".to_string(),
        at(top + 64.0),
        16.0,
        Rgba::WHITE.with_alpha(0.7),
    ));

    if state.can_revive {
        let (center, size) = revive_button(config);
        out.push(DrawCommand::Rect {
            anchor: center,
            rotation: 0.0,
            offset: -size / 2.0,
            size,
            fill: Fill::VerticalGradient {
                top: Rgba::SHIELD_BLUE,
                bottom: Rgba::from_u32(0x4390ee),
            },
            corner_radius: 8.0,
        });
        out.push(centered_text(
            "REVIVE".to_string(),
            center + Vec2::new(0.0, 7.0),
            20.0,
            Rgba::WHITE,
        ));
    }
}
