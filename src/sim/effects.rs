//! Transient visual effects
//!
//! Particles, falling block fragments, text and coin popups, plus the camera,
//! screen shake and combo glow. Nothing here feeds back into gameplay; every
//! entity integrates with fixed per-tick constants and is dropped once its
//! liveness check fails.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::CutSide;
use super::state::Block;
use crate::consts::{CAMERA_EASING, GLOW_DECAY, SCREEN_SHAKE_DECAY};
use crate::palette::{ColorPair, Rgba};

/// Maximum live particles; the oldest are evicted first
pub const MAX_PARTICLES: usize = 512;

pub const PARTICLE_GRAVITY: f32 = 0.25;
pub const PARTICLE_FRICTION: f32 = 0.99;
pub const PARTICLE_DECAY: f32 = 0.025;
pub const PARTICLE_SHRINK: f32 = 0.98;
pub const PARTICLE_MIN_SIZE: f32 = 0.5;

pub const PIECE_GRAVITY: f32 = 0.6;
pub const PIECE_FADE: f32 = 0.01;
/// How far below the canvas a falling piece may drop before removal
pub const PIECE_DEPTH_MARGIN: f32 = 200.0;

pub const TEXT_RISE: f32 = -2.0;
pub const TEXT_DECAY: f32 = 0.03;
pub const TEXT_SCALE_STEP: f32 = 0.15;

pub const COIN_POPUP_RISE: f32 = 1.5;
pub const COIN_POPUP_DECAY: f32 = 0.02;

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgba,
    pub life: f32,
    pub size: f32,
    pub gravity: f32,
    /// Drawn with a soft halo
    pub glow: bool,
    /// Coin particles keep their size
    pub shrinks: bool,
}

impl Particle {
    fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.vel.x *= PARTICLE_FRICTION;
        self.life -= PARTICLE_DECAY;
        if self.shrinks {
            self.size *= PARTICLE_SHRINK;
        }
    }

    fn is_alive(&self) -> bool {
        self.life > 0.0 && self.size > PARTICLE_MIN_SIZE
    }
}

/// A block fragment tumbling off the tower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingPiece {
    /// Top-left corner in world space
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub alpha: f32,
    pub colors: ColorPair,
}

impl FallingPiece {
    fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += PIECE_GRAVITY;
        self.rotation += self.rotation_speed;
        self.alpha -= PIECE_FADE;
    }

    fn is_alive(&self, camera_y: f32, canvas_height: f32) -> bool {
        self.alpha > 0.0 && self.pos.y + camera_y < canvas_height + PIECE_DEPTH_MARGIN
    }
}

/// Floating text (combo messages)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPopup {
    pub text: String,
    /// Second line, e.g. "+3"
    pub detail: Option<String>,
    pub pos: Vec2,
    pub life: f32,
    pub scale: f32,
    pub color: Rgba,
}

impl TextPopup {
    fn update(&mut self) {
        self.pos.y += TEXT_RISE;
        self.life -= TEXT_DECAY;
        self.scale = (self.scale + TEXT_SCALE_STEP).min(1.0);
    }
}

/// Floating "+N" coin reward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinPopup {
    pub amount: u32,
    pub pos: Vec2,
    pub life: f32,
}

impl CoinPopup {
    fn update(&mut self) {
        self.pos.y -= COIN_POPUP_RISE;
        self.life -= COIN_POPUP_DECAY;
    }
}

/// All transient visuals plus camera state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub falling_pieces: Vec<FallingPiece>,
    pub text_popups: Vec<TextPopup>,
    pub coin_popups: Vec<CoinPopup>,
    /// Current shake magnitude (pixels)
    pub screen_shake: f32,
    /// Combo glow intensity, 0..=1
    pub glow: f32,
    /// Vertical camera offset added to world y when drawing
    pub camera_y: f32,
    pub camera_target: f32,
}

impl Effects {
    /// Drop every entity and recentre the camera
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        self.particles.is_empty()
            && self.falling_pieces.is_empty()
            && self.text_popups.is_empty()
            && self.coin_popups.is_empty()
    }

    /// Integrate every entity one tick and remove the dead ones
    pub fn update(&mut self, canvas_height: f32) {
        self.screen_shake *= SCREEN_SHAKE_DECAY;

        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);

        let camera_y = self.camera_y;
        for piece in &mut self.falling_pieces {
            piece.update();
        }
        self.falling_pieces
            .retain(|p| p.is_alive(camera_y, canvas_height));

        for popup in &mut self.text_popups {
            popup.update();
        }
        self.text_popups.retain(|t| t.life > 0.0);

        for popup in &mut self.coin_popups {
            popup.update();
        }
        self.coin_popups.retain(|c| c.life > 0.0);
    }

    /// Ease the camera toward its target (never snaps)
    pub fn ease_camera(&mut self) {
        self.camera_y += (self.camera_target - self.camera_y) * CAMERA_EASING;
    }

    pub fn decay_glow(&mut self) {
        self.glow *= GLOW_DECAY;
    }

    /// Set the shake magnitude; the latest event wins
    pub fn shake(&mut self, magnitude: f32) {
        self.screen_shake = magnitude;
    }

    /// Random jitter for this frame, bounded by the current magnitude
    pub fn shake_offset<R: Rng>(&self, rng: &mut R) -> Vec2 {
        if self.screen_shake <= 0.5 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (rng.random::<f32>() - 0.5) * self.screen_shake,
            (rng.random::<f32>() - 0.5) * self.screen_shake,
        )
    }

    pub fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            // Remove oldest particles to make room
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Radial burst and sparkle ring for a perfect drop
    pub fn spawn_perfect_burst<R: Rng>(
        &mut self,
        rng: &mut R,
        block: &Block,
        streak: u32,
        color: Rgba,
    ) {
        let center = block.center();
        let count = (30 + streak as usize * 5).min(60);

        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            let speed = 4.0 + rng.random::<f32>() * 4.0 + streak as f32;
            self.push_particle(Particle {
                pos: center,
                vel: Vec2::new(angle.cos() * speed, angle.sin() * speed - 2.0),
                color,
                life: 1.0,
                size: rng.random::<f32>() * 6.0 + 3.0,
                gravity: 0.15,
                glow: streak >= 5,
                shrinks: true,
            });
        }

        // Sparkle ring
        for i in 0..12 {
            let angle = std::f32::consts::TAU * i as f32 / 12.0;
            let dir = Vec2::new(angle.cos(), angle.sin());
            self.push_particle(Particle {
                pos: center + Vec2::new(dir.x * 50.0, dir.y * 30.0),
                vel: dir * 2.0,
                color: Rgba::WHITE,
                life: 0.8,
                size: 4.0,
                gravity: 0.0,
                glow: true,
                shrinks: true,
            });
        }
    }

    /// Small upward shower of gold coin particles
    pub fn spawn_coin_flourish<R: Rng>(&mut self, rng: &mut R, origin: Vec2) {
        for _ in 0..6 {
            self.push_particle(Particle {
                pos: origin,
                vel: Vec2::new(
                    (rng.random::<f32>() - 0.5) * 3.0,
                    -3.0 - rng.random::<f32>() * 2.0,
                ),
                color: Rgba::GOLD,
                life: 1.0,
                size: 4.0,
                gravity: 0.1,
                glow: true,
                shrinks: false,
            });
        }
    }

    /// Cut-away fragment plus debris where it broke off
    pub fn spawn_cut<R: Rng>(
        &mut self,
        rng: &mut R,
        block: &Block,
        side: CutSide,
        x: f32,
        width: f32,
    ) {
        let outward = side.outward();
        let piece = FallingPiece {
            pos: Vec2::new(x, block.y),
            width,
            height: block.height,
            vel: Vec2::new(outward * (3.0 + rng.random::<f32>() * 2.0), -3.0),
            rotation: 0.0,
            rotation_speed: outward * (0.05 + rng.random::<f32>() * 0.1),
            alpha: 1.0,
            colors: block.colors,
        };
        let debris_origin = piece.pos + Vec2::new(width / 2.0, block.height / 2.0);
        self.falling_pieces.push(piece);

        for _ in 0..8 {
            self.push_particle(Particle {
                pos: debris_origin,
                vel: Vec2::new(
                    outward * (rng.random::<f32>() * 5.0 + 2.0),
                    -rng.random::<f32>() * 6.0 - 2.0,
                ),
                color: block.colors.top,
                life: 1.0,
                size: rng.random::<f32>() * 4.0 + 2.0,
                gravity: 0.3,
                glow: false,
                shrinks: true,
            });
        }
    }

    /// Red debris scattered across a block that missed the tower
    pub fn spawn_miss_debris<R: Rng>(&mut self, rng: &mut R, block: &Block) {
        for _ in 0..20 {
            self.push_particle(Particle {
                pos: Vec2::new(
                    block.x + rng.random::<f32>() * block.width,
                    block.y + rng.random::<f32>() * block.height,
                ),
                vel: Vec2::new(
                    (rng.random::<f32>() - 0.5) * 8.0,
                    -rng.random::<f32>() * 5.0,
                ),
                color: Rgba::MISS_RED,
                life: 1.0,
                size: rng.random::<f32>() * 5.0 + 2.0,
                gravity: 0.4,
                glow: false,
                shrinks: true,
            });
        }
    }

    /// Whole block falling away in its direction of travel (game over)
    pub fn spawn_falling_block(&mut self, block: &Block, direction: f32) {
        self.falling_pieces.push(FallingPiece {
            pos: Vec2::new(block.x, block.y),
            width: block.width,
            height: block.height,
            vel: Vec2::new(direction * 4.0, -5.0),
            rotation: 0.0,
            rotation_speed: direction * 0.15,
            alpha: 1.0,
            colors: block.colors,
        });
    }

    pub fn show_text(&mut self, text: &str, detail: Option<String>, pos: Vec2, color: Rgba) {
        self.text_popups.push(TextPopup {
            text: text.to_string(),
            detail,
            pos,
            life: 1.0,
            scale: 0.0,
            color,
        });
    }

    pub fn show_coins(&mut self, amount: u32, pos: Vec2) {
        self.coin_popups.push(CoinPopup {
            amount,
            pos,
            life: 1.0,
        });
    }
}
