//! Overlap and cut geometry between stacked blocks
//!
//! Blocks share a fixed height, so stacking reduces to 1D interval math on
//! the x axis: how much of the dropped block rests on the one below, and
//! which edge hangs over.

use serde::{Deserialize, Serialize};

use super::state::Block;

/// Which edge of the dropped block is cut away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutSide {
    Left,
    Right,
}

impl CutSide {
    /// Horizontal sign pointing away from the tower on this side
    #[inline]
    pub fn outward(self) -> f32 {
        match self {
            CutSide::Left => -1.0,
            CutSide::Right => 1.0,
        }
    }
}

/// Result of resolving a dropped block against its support
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub start: f32,
    pub end: f32,
    /// `end - start`; zero or negative means a complete miss
    pub width: f32,
    /// Absolute distance between the two left edges
    pub offset: f32,
    pub side: CutSide,
}

impl Overlap {
    #[inline]
    pub fn is_miss(&self) -> bool {
        self.width <= 0.0
    }

    /// Midpoint of the overlapping interval
    #[inline]
    pub fn center(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    /// The discarded fragment of `current` as `(x, width)`, if any
    pub fn cut_piece(&self, current: &Block) -> Option<(f32, f32)> {
        if self.is_miss() {
            return None;
        }
        let width = current.width - self.width;
        if width <= 0.0 {
            return None;
        }
        let x = match self.side {
            CutSide::Left => current.x,
            CutSide::Right => self.end,
        };
        Some((x, width))
    }
}

/// Resolve `current` against the `reference` block it lands on
pub fn resolve_overlap(current: &Block, reference: &Block) -> Overlap {
    let start = current.x.max(reference.x);
    let end = current.right().min(reference.right());
    let side = if current.x < reference.x {
        CutSide::Left
    } else {
        CutSide::Right
    };

    Overlap {
        start,
        end,
        width: end - start,
        offset: (current.x - reference.x).abs(),
        side,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::CLASSIC;
    use proptest::prelude::*;

    fn block(x: f32, width: f32) -> Block {
        Block::new(x, 0.0, width, 35.0, CLASSIC[0])
    }

    #[test]
    fn test_partial_overlap_right_cut() {
        let base = block(100.0, 200.0);
        let current = block(230.0, 200.0);

        let overlap = resolve_overlap(&current, &base);
        assert_eq!(overlap.start, 230.0);
        assert_eq!(overlap.end, 300.0);
        assert_eq!(overlap.width, 70.0);
        assert_eq!(overlap.offset, 130.0);
        assert_eq!(overlap.side, CutSide::Right);
        assert_eq!(overlap.cut_piece(&current), Some((300.0, 130.0)));
    }

    #[test]
    fn test_partial_overlap_left_cut() {
        let base = block(100.0, 200.0);
        let current = block(60.0, 200.0);

        let overlap = resolve_overlap(&current, &base);
        assert_eq!(overlap.width, 160.0);
        assert_eq!(overlap.side, CutSide::Left);
        assert_eq!(overlap.cut_piece(&current), Some((60.0, 40.0)));
    }

    #[test]
    fn test_complete_miss() {
        let base = block(100.0, 200.0);
        let current = block(450.0, 200.0);

        let overlap = resolve_overlap(&current, &base);
        assert!(overlap.is_miss());
        assert_eq!(overlap.cut_piece(&current), None);
    }

    #[test]
    fn test_touching_edges_is_a_miss() {
        let base = block(100.0, 200.0);
        let current = block(300.0, 200.0);
        assert!(resolve_overlap(&current, &base).is_miss());
    }

    #[test]
    fn test_exact_alignment_has_no_cut() {
        let base = block(100.0, 200.0);
        let overlap = resolve_overlap(&base, &base);
        assert_eq!(overlap.offset, 0.0);
        assert_eq!(overlap.width, 200.0);
        assert_eq!(overlap.cut_piece(&base), None);
    }

    proptest! {
        #[test]
        fn prop_overlap_never_exceeds_either_block(
            cx in -400.0f32..800.0,
            cw in 1.0f32..300.0,
            rx in 0.0f32..400.0,
            rw in 1.0f32..300.0,
        ) {
            let current = block(cx, cw);
            let reference = block(rx, rw);
            let overlap = resolve_overlap(&current, &reference);

            prop_assert!(overlap.width <= cw + 1e-3);
            prop_assert!(overlap.width <= rw + 1e-3);
            if !overlap.is_miss() {
                prop_assert!(overlap.start >= rx - 1e-3);
                prop_assert!(overlap.end <= rx + rw + 1e-3);
            }
        }

        #[test]
        fn prop_kept_plus_cut_is_whole_block(
            cx in 0.0f32..400.0,
            cw in 1.0f32..300.0,
            rx in 0.0f32..400.0,
            rw in 1.0f32..300.0,
        ) {
            let current = block(cx, cw);
            let reference = block(rx, rw);
            let overlap = resolve_overlap(&current, &reference);
            if let Some((_, cut)) = overlap.cut_piece(&current) {
                prop_assert!((overlap.width + cut - cw).abs() < 1e-2);
            }
        }
    }
}
