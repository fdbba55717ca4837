//! Fixed-step driver
//!
//! Converts wall-clock frame time into a bounded number of simulation ticks.

use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone)]
pub struct FixedStepDriver {
    step: f32,
    max_substeps: u32,
    max_frame_time: f32,
    accumulator: f32,
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS, MAX_FRAME_TIME)
    }
}

impl FixedStepDriver {
    pub fn new(step: f32, max_substeps: u32, max_frame_time: f32) -> Self {
        Self {
            step,
            max_substeps,
            max_frame_time,
            accumulator: 0.0,
        }
    }

    /// Add `elapsed` seconds and return how many ticks to run now
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed.clamp(0.0, self.max_frame_time);

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_substeps {
            self.accumulator -= self.step;
            ticks += 1;
        }
        // Drop backlog the substep cap could not absorb
        if ticks == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        ticks
    }

    /// Fraction of a tick left over, for interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_partial_frames() {
        let mut driver = FixedStepDriver::new(0.01, 8, 0.1);
        assert_eq!(driver.advance(0.004), 0);
        assert_eq!(driver.advance(0.004), 0);
        assert_eq!(driver.advance(0.004), 1);
        assert!((driver.alpha() - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_sixty_hz_frame_is_one_tick() {
        let mut driver = FixedStepDriver::default();
        let ticks: u32 = (0..60).map(|_| driver.advance(1.0 / 60.0 + 1e-6)).sum();
        assert_eq!(ticks, 60);
    }

    #[test]
    fn test_long_frame_is_bounded() {
        let mut driver = FixedStepDriver::default();
        // A 5 s stall is clamped to 0.1 s, about six ticks at 60 Hz
        let ticks = driver.advance(5.0);
        assert!((5..=MAX_SUBSTEPS).contains(&ticks));

        let mut driver = FixedStepDriver::new(0.01, 4, 0.1);
        assert_eq!(driver.advance(0.1), 4);
        // Backlog beyond the cap is dropped
        assert!(driver.alpha() <= 1.0 + 1e-4);
        assert!(driver.advance(0.0) <= 1);
    }

    #[test]
    fn test_negative_elapsed_ignored() {
        let mut driver = FixedStepDriver::default();
        assert_eq!(driver.advance(-1.0), 0);
        driver.reset();
        assert_eq!(driver.alpha(), 0.0);
    }
}
