//! Viewport metrics: scroll offset, viewport size, and trigger boundary
//! resolution.
//!
//! Measurement is a pure read of the layout. Before the document has been
//! laid out, [`measure`] returns [`ViewportMetrics::NOT_READY`] and callers
//! skip the update instead of dividing by a zero-sized viewport.

mod layout;
mod offset;

pub use layout::{AnchorRect, LayoutSource, SimulatedLayout};
pub use offset::{Edge, ScrollOffset};

/// One consistent snapshot of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Vertical scroll offset.
    pub scroll_y: f64,
    /// Viewport height.
    pub viewport_height: f64,
    /// Full document height.
    pub document_height: f64,
}

impl ViewportMetrics {
    /// Sentinel returned while the layout is unavailable.
    pub const NOT_READY: ViewportMetrics = ViewportMetrics {
        scroll_y: 0.0,
        viewport_height: 0.0,
        document_height: 0.0,
    };

    /// Whether this snapshot can drive an update.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.viewport_height > 0.0
            && self.document_height > 0.0
            && self.scroll_y.is_finite()
    }
}

/// Absolute scroll positions of a region's boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRegion {
    /// Scroll offset at which progress is 0.
    pub start: f64,
    /// Scroll offset at which progress is 1.
    pub end: f64,
}

impl ResolvedRegion {
    /// Collapsed or inverted range.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.end - self.start <= 0.0
    }

    /// Whether `scroll_y` lies within `[start, end]`.
    #[must_use]
    pub fn contains(&self, scroll_y: f64) -> bool {
        scroll_y >= self.start && scroll_y <= self.end
    }
}

/// Take one metrics snapshot from the layout.
///
/// Idempotent; returns [`ViewportMetrics::NOT_READY`] when the layout has no
/// usable measurement.
#[must_use]
pub fn measure(layout: &dyn LayoutSource) -> ViewportMetrics {
    layout
        .metrics()
        .filter(ViewportMetrics::is_ready)
        .unwrap_or(ViewportMetrics::NOT_READY)
}

/// Resolve a pair of boundaries against the current layout.
///
/// Returns `None` while the anchor is not mounted; the caller keeps the
/// region inert and retries on a later pass.
#[must_use]
pub fn resolve_bounds(
    anchor: &str,
    start: &ScrollOffset,
    end: &ScrollOffset,
    metrics: &ViewportMetrics,
    layout: &dyn LayoutSource,
) -> Option<ResolvedRegion> {
    if !metrics.is_ready() {
        return None;
    }
    let rect = layout.anchor_rect(anchor)?;
    let start = start.resolve(rect, metrics.viewport_height, rect.top);
    let end = end.resolve(rect, metrics.viewport_height, start);
    Some(ResolvedRegion { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_returns_sentinel_before_layout() {
        let mut layout = SimulatedLayout::new(800.0, 3000.0);
        layout.laid_out = false;
        let metrics = measure(&layout);
        assert_eq!(metrics, ViewportMetrics::NOT_READY);
        assert!(!metrics.is_ready());
    }

    #[test]
    fn measure_is_idempotent() {
        let mut layout = SimulatedLayout::new(800.0, 3000.0);
        layout.scroll_to(420.0);
        assert_eq!(measure(&layout), measure(&layout));
        assert_eq!(measure(&layout).scroll_y, 420.0);
    }

    #[test]
    fn zero_viewport_is_not_ready() {
        let layout = SimulatedLayout::new(0.0, 3000.0);
        assert!(!measure(&layout).is_ready());
    }

    #[test]
    fn resolve_bounds_waits_for_anchor() {
        let layout = SimulatedLayout::new(800.0, 3000.0);
        let metrics = measure(&layout);
        let resolved = resolve_bounds(
            "#later",
            &ScrollOffset::DEFAULT_START,
            &ScrollOffset::DEFAULT_END,
            &metrics,
            &layout,
        );
        assert!(resolved.is_none());
    }

    #[test]
    fn resolve_bounds_follows_resize() {
        let mut layout =
            SimulatedLayout::new(800.0, 4000.0).with_anchor("#s", 2000.0, 500.0);
        let start: ScrollOffset = "top 80%".parse().unwrap();
        let end: ScrollOffset = "top 40%".parse().unwrap();

        let before =
            resolve_bounds("#s", &start, &end, &measure(&layout), &layout)
                .unwrap();
        assert_eq!(before, ResolvedRegion { start: 1360.0, end: 1680.0 });

        layout.resize(1000.0);
        let after =
            resolve_bounds("#s", &start, &end, &measure(&layout), &layout)
                .unwrap();
        assert_eq!(after, ResolvedRegion { start: 1200.0, end: 1600.0 });
    }

    #[test]
    fn degenerate_detection() {
        assert!(ResolvedRegion { start: 10.0, end: 10.0 }.is_degenerate());
        assert!(ResolvedRegion { start: 10.0, end: 5.0 }.is_degenerate());
        assert!(!ResolvedRegion { start: 10.0, end: 11.0 }.is_degenerate());
    }
}
