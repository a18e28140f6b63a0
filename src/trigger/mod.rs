//! Scroll-region triggers.
//!
//! A [`ScrollRegion`] names a span of the page relative to an anchor
//! element. A binding ties one region to one timeline by identifier, with a
//! [`DrivingMode`] saying how the timeline consumes the region's progress.
//! The [`TriggerRegistry`] recomputes every binding's progress from a single
//! metrics snapshot and reports enter / update / exit transitions.

mod region;
mod registry;

pub use region::{DrivingMode, RegionMode, ScrollRegion};
pub use registry::{
    scroll_progress, BindingId, ScrollDirection, TriggerBinding, TriggerEvent,
    TriggerPhase, TriggerRegistry,
};
