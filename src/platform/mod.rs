//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks
//! - Storage (files natively, LocalStorage on web)

pub mod clock;
pub mod storage;

pub use clock::FixedStepDriver;
