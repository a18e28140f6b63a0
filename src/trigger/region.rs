//! Scroll regions and the ways a binding can be driven by one.

use serde::{Deserialize, Serialize};

use crate::viewport::{
    resolve_bounds, LayoutSource, ResolvedRegion, ScrollOffset,
    ViewportMetrics,
};

/// How a region reports progress.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RegionMode {
    /// Progress latches to 1 the first time the region is entered.
    OneShot,
    /// Progress follows scroll in both directions.
    #[default]
    Scrubbed,
}

/// How a bound timeline consumes region progress.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DrivingMode {
    /// Progress maps directly onto timeline position.
    #[default]
    Scrub,
    /// The timeline plays forward once, in time, on first entry.
    OnceOnEnter,
    /// The timeline loops in time while the region is visible.
    Loop,
}

impl DrivingMode {
    /// Whether progress latches instead of tracking scroll.
    #[must_use]
    pub fn latches(self) -> bool {
        matches!(self, Self::OnceOnEnter)
    }
}

fn default_start() -> ScrollOffset {
    ScrollOffset::DEFAULT_START
}

fn default_end() -> ScrollOffset {
    ScrollOffset::DEFAULT_END
}

/// A named span of the page, delimited relative to an anchor element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollRegion {
    /// Region identifier, referenced by bindings.
    pub id: String,
    /// Selector of the element the offsets are measured against.
    pub anchor: String,
    /// Where progress is 0.
    #[serde(default = "default_start")]
    pub start: ScrollOffset,
    /// Where progress is 1.
    #[serde(default = "default_end")]
    pub end: ScrollOffset,
    /// Latching behavior.
    #[serde(default)]
    pub mode: RegionMode,
}

impl ScrollRegion {
    /// Region with the default `top bottom` → `bottom top` span.
    #[must_use]
    pub fn new(id: &str, anchor: &str) -> Self {
        Self {
            id: id.to_owned(),
            anchor: anchor.to_owned(),
            start: ScrollOffset::DEFAULT_START,
            end: ScrollOffset::DEFAULT_END,
            mode: RegionMode::Scrubbed,
        }
    }

    /// Replace both boundaries.
    #[must_use]
    pub fn between(mut self, start: ScrollOffset, end: ScrollOffset) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the latching behavior.
    #[must_use]
    pub fn with_mode(mut self, mode: RegionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve against the current layout; `None` while the anchor is not
    /// mounted.
    #[must_use]
    pub fn resolve(
        &self,
        metrics: &ViewportMetrics,
        layout: &dyn LayoutSource,
    ) -> Option<ResolvedRegion> {
        resolve_bounds(&self.anchor, &self.start, &self.end, metrics, layout)
    }
}
