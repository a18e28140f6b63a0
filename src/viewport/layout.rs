//! Layout collaborator: where anchors are and how large the viewport is.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ViewportMetrics;

/// Document-absolute vertical extent of an anchor element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorRect {
    /// Distance from the document top to the element's top edge.
    pub top: f64,
    /// Element height.
    pub height: f64,
}

/// Read-only view of the page layout.
///
/// Implementations must be side-effect free: the pipeline may call them
/// several times per event.
pub trait LayoutSource {
    /// Current scroll and viewport sizes, or `None` before first layout.
    fn metrics(&self) -> Option<ViewportMetrics>;

    /// Bounding box of the first element matching `selector`, or `None`
    /// when nothing matching is mounted yet.
    fn anchor_rect(&self, selector: &str) -> Option<AnchorRect>;

    /// Number of elements matching `selector` (stagger group size).
    fn target_count(&self, selector: &str) -> usize;
}

/// In-memory layout used by tests and the replay binary.
///
/// Deserializes from TOML so reference layouts can live next to page
/// declarations:
///
/// ```toml
/// viewport_height = 900.0
/// document_height = 6000.0
///
/// [anchors."#features"]
/// top = 1400.0
/// height = 900.0
///
/// [targets]
/// ".feature-card" = 6
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedLayout {
    /// Whether the document has been laid out yet.
    pub laid_out: bool,
    /// Current vertical scroll offset.
    pub scroll_y: f64,
    /// Viewport height.
    pub viewport_height: f64,
    /// Full document height.
    pub document_height: f64,
    /// Anchor boxes by selector.
    pub anchors: FxHashMap<String, AnchorRect>,
    /// Group sizes by selector. Selectors absent here count as one element
    /// when they have an anchor box and zero otherwise.
    pub targets: FxHashMap<String, usize>,
}

impl Default for SimulatedLayout {
    fn default() -> Self {
        Self {
            laid_out: true,
            scroll_y: 0.0,
            viewport_height: 900.0,
            document_height: 900.0,
            anchors: FxHashMap::default(),
            targets: FxHashMap::default(),
        }
    }
}

impl SimulatedLayout {
    /// Laid-out document of the given size, scrolled to the top.
    #[must_use]
    pub fn new(viewport_height: f64, document_height: f64) -> Self {
        Self {
            viewport_height,
            document_height,
            ..Self::default()
        }
    }

    /// Add or move an anchor.
    #[must_use]
    pub fn with_anchor(mut self, selector: &str, top: f64, height: f64) -> Self {
        let _ = self
            .anchors
            .insert(selector.to_owned(), AnchorRect { top, height });
        self
    }

    /// Declare how many elements match `selector`.
    #[must_use]
    pub fn with_targets(mut self, selector: &str, count: usize) -> Self {
        let _ = self.targets.insert(selector.to_owned(), count);
        self
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Scroll to `y`, clamped to the scrollable range like a browser would.
    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    /// Change the viewport height, re-clamping the scroll offset.
    pub fn resize(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
        self.scroll_to(self.scroll_y);
    }

    /// Remove an anchor, as when its element unmounts.
    pub fn remove_anchor(&mut self, selector: &str) {
        let _ = self.anchors.remove(selector);
    }
}

impl LayoutSource for SimulatedLayout {
    fn metrics(&self) -> Option<ViewportMetrics> {
        self.laid_out.then_some(ViewportMetrics {
            scroll_y: self.scroll_y,
            viewport_height: self.viewport_height,
            document_height: self.document_height,
        })
    }

    fn anchor_rect(&self, selector: &str) -> Option<AnchorRect> {
        if !self.laid_out {
            return None;
        }
        self.anchors.get(selector).copied()
    }

    fn target_count(&self, selector: &str) -> usize {
        match self.targets.get(selector) {
            Some(&count) => count,
            None => usize::from(self.anchors.contains_key(selector)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_is_clamped_to_document() {
        let mut layout = SimulatedLayout::new(800.0, 3000.0);
        layout.scroll_to(10_000.0);
        assert_eq!(layout.scroll_y, 2200.0);
        layout.scroll_to(-50.0);
        assert_eq!(layout.scroll_y, 0.0);
    }

    #[test]
    fn not_laid_out_reports_nothing() {
        let mut layout =
            SimulatedLayout::new(800.0, 3000.0).with_anchor("#a", 10.0, 10.0);
        layout.laid_out = false;
        assert!(layout.metrics().is_none());
        assert!(layout.anchor_rect("#a").is_none());
    }

    #[test]
    fn target_count_falls_back_to_anchor_presence() {
        let layout = SimulatedLayout::new(800.0, 3000.0)
            .with_anchor("#hero", 0.0, 900.0)
            .with_targets(".hero-text", 3);
        assert_eq!(layout.target_count(".hero-text"), 3);
        assert_eq!(layout.target_count("#hero"), 1);
        assert_eq!(layout.target_count(".missing"), 0);
    }

    #[test]
    fn deserializes_from_toml() {
        let layout: SimulatedLayout = toml::from_str(
            r##"
viewport_height = 900.0
document_height = 6000.0

[anchors."#features"]
top = 1400.0
height = 900.0

[targets]
".feature-card" = 6
"##,
        )
        .unwrap();
        assert!(layout.laid_out);
        assert_eq!(layout.anchor_rect("#features").unwrap().top, 1400.0);
        assert_eq!(layout.target_count(".feature-card"), 6);
    }
}
