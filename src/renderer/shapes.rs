//! Shape generation for composite primitives

use glam::Vec2;

use super::frame::{DrawCommand, Fill};
use crate::palette::{ColorPair, Rgba};

const CORNER_RADIUS: f32 = 4.0;
const SHADOW_OFFSET: f32 = 3.0;

fn rect(anchor: Vec2, rotation: f32, offset: Vec2, size: Vec2, fill: Fill, radius: f32) -> DrawCommand {
    DrawCommand::Rect {
        anchor,
        rotation,
        offset,
        size,
        fill,
        corner_radius: radius,
    }
}

/// A block: drop shadow, gradient body, top highlight, darker bottom edge
/// and a thin shine on the left side.
///
/// `center` is the block's center on screen; layers rotate with it.
pub fn block(
    out: &mut Vec<DrawCommand>,
    center: Vec2,
    size: Vec2,
    colors: ColorPair,
    rotation: f32,
    alpha: f32,
) {
    let alpha = alpha.clamp(0.0, 1.0);
    let shade = |c: Rgba| c.with_alpha(c.a * alpha);
    let min = -size / 2.0;

    out.push(rect(
        center,
        rotation,
        min + Vec2::splat(SHADOW_OFFSET),
        size,
        Fill::Solid(shade(Rgba::new(0.0, 0.0, 0.0, 0.4))),
        CORNER_RADIUS,
    ));
    out.push(rect(
        center,
        rotation,
        min,
        size,
        Fill::VerticalGradient {
            top: shade(colors.top),
            bottom: shade(colors.bottom),
        },
        CORNER_RADIUS,
    ));
    out.push(rect(
        center,
        rotation,
        min + Vec2::splat(2.0),
        Vec2::new((size.x - 4.0).max(0.0), size.y * 0.4),
        Fill::Solid(shade(Rgba::new(1.0, 1.0, 1.0, 0.25))),
        3.0,
    ));
    out.push(rect(
        center,
        rotation,
        Vec2::new(min.x, min.y + size.y - 4.0),
        Vec2::new(size.x, 4.0),
        Fill::Solid(shade(Rgba::new(0.0, 0.0, 0.0, 0.15))),
        0.0,
    ));
    out.push(rect(
        center,
        rotation,
        min,
        Vec2::new(size.x.min(3.0), size.y),
        Fill::Solid(shade(Rgba::new(1.0, 1.0, 1.0, 0.1))),
        0.0,
    ));
}

/// Layers emitted per block
pub const BLOCK_LAYERS: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::CLASSIC;

    #[test]
    fn test_block_layers() {
        let mut out = Vec::new();
        block(
            &mut out,
            Vec2::new(200.0, 100.0),
            Vec2::new(100.0, 35.0),
            CLASSIC[0],
            0.0,
            1.0,
        );
        assert_eq!(out.len(), BLOCK_LAYERS);

        match &out[1] {
            DrawCommand::Rect {
                anchor,
                offset,
                size,
                fill,
                ..
            } => {
                assert_eq!(*anchor + *offset, Vec2::new(150.0, 82.5));
                assert_eq!(*size, Vec2::new(100.0, 35.0));
                assert_eq!(
                    *fill,
                    Fill::VerticalGradient {
                        top: CLASSIC[0].top,
                        bottom: CLASSIC[0].bottom
                    }
                );
            }
            other => panic!("expected body rect, got {other:?}"),
        }
    }

    #[test]
    fn test_faded_block_scales_alpha() {
        let mut out = Vec::new();
        block(
            &mut out,
            Vec2::ZERO,
            Vec2::new(50.0, 35.0),
            CLASSIC[2],
            0.3,
            0.5,
        );
        for command in &out {
            let DrawCommand::Rect { fill, rotation, .. } = command else {
                panic!("blocks are made of rects");
            };
            assert_eq!(*rotation, 0.3);
            let alpha = match fill {
                Fill::Solid(c) => c.a,
                Fill::VerticalGradient { top, .. } => top.a,
            };
            assert!(alpha <= 0.5);
        }
    }
}
