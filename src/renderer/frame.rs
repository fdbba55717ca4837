//! Drawable primitives handed to the rendering sink

use glam::Vec2;
use serde::Serialize;

use crate::palette::Rgba;
use crate::sim::GamePhase;

/// How a rectangle is filled
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Fill {
    Solid(Rgba),
    /// Top-to-bottom linear gradient
    VerticalGradient { top: Rgba, bottom: Rgba },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
}

/// One draw call, in screen pixels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Rectangle at `anchor + offset`, rotated by `rotation` about `anchor`
    Rect {
        anchor: Vec2,
        rotation: f32,
        offset: Vec2,
        size: Vec2,
        fill: Fill,
        corner_radius: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        /// Soft halo in the same color
        glow: bool,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
        dashed: bool,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        scale: f32,
        color: Rgba,
        align: Align,
        shadow: Option<Rgba>,
    },
    /// Radial glow fading from `color` at the center to transparent
    Glow {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
}

/// Numbers the host shows around the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    /// None when the variant has no currency
    pub coins: Option<u64>,
    pub gems: u32,
    pub combo: u32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    /// Vertical background gradient stops, top to bottom
    pub background: [Rgba; 3],
    pub commands: Vec<DrawCommand>,
    pub hud: Hud,
}

impl Frame {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
