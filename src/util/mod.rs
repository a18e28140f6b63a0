//! Shared utilities for the orchestrator.
//!
//! Helpers for easing curves, color parsing/interpolation, and frame timing.

pub mod color;
pub mod easing;
pub mod frame_timing;
