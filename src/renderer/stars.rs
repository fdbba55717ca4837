//! Background starfield
//!
//! Purely decorative: twinkles with the frame RNG and drifts with the camera
//! at a per-star parallax rate. Never touches the simulation.

use glam::Vec2;
use rand::Rng;

use super::frame::DrawCommand;
use crate::palette::Rgba;

pub const STAR_COUNT: usize = 50;
const TWINKLE_STEP: f32 = 0.1;
const MIN_BRIGHTNESS: f32 = 0.2;
/// Stars are drawn at this fraction of their brightness
const STAR_ALPHA: f32 = 0.6;
/// Camera movement is scaled by this on top of each star's own rate
const PARALLAX: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Position on a canvas-sized tile
    pub pos: Vec2,
    pub size: f32,
    /// Parallax rate
    pub speed: f32,
    pub brightness: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Starfield {
    pub stars: Vec<Star>,
}

impl Starfield {
    /// Scatter stars over a `width` by `height` canvas
    pub fn new<R: Rng>(rng: &mut R, width: f32, height: f32) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height),
                size: rng.random::<f32>() * 2.0 + 0.5,
                speed: rng.random::<f32>() * 0.5 + 0.1,
                brightness: rng.random::<f32>(),
            })
            .collect();
        Self { stars }
    }

    /// Random-walk every star's brightness
    pub fn twinkle<R: Rng>(&mut self, rng: &mut R) {
        for star in &mut self.stars {
            star.brightness += (rng.random::<f32>() - 0.5) * TWINKLE_STEP;
            star.brightness = star.brightness.clamp(MIN_BRIGHTNESS, 1.0);
        }
    }

    /// Screen-space circles, wrapped vertically as the camera rises
    pub fn draw(&self, out: &mut Vec<DrawCommand>, camera_y: f32, height: f32) {
        for star in &self.stars {
            let y = (star.pos.y + camera_y * star.speed * PARALLAX).rem_euclid(height);
            out.push(DrawCommand::Circle {
                center: Vec2::new(star.pos.x, y),
                radius: star.size,
                color: Rgba::WHITE.with_alpha(star.brightness * STAR_ALPHA),
                glow: false,
            });
        }
    }
}
