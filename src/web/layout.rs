use web_sys::Window;

use super::scope::DomScope;
use crate::viewport::{AnchorRect, LayoutSource, ViewportMetrics};

/// Layout read from the live DOM.
///
/// Selectors are resolved inside the container element when one is set,
/// so a page only ever sees its own elements.
pub struct DomLayout {
    window: Window,
    scope: DomScope,
}

impl DomLayout {
    /// Layout of `window` read through `scope`.
    #[must_use]
    pub fn new(window: Window, scope: DomScope) -> Self {
        Self { window, scope }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }
}

impl LayoutSource for DomLayout {
    fn metrics(&self) -> Option<ViewportMetrics> {
        let viewport_height = self.window.inner_height().ok()?.as_f64()?;
        let root = self.scope.document().document_element()?;
        let document_height = f64::from(root.scroll_height());
        Some(ViewportMetrics {
            scroll_y: self.scroll_y(),
            viewport_height,
            document_height,
        })
    }

    fn anchor_rect(&self, selector: &str) -> Option<AnchorRect> {
        let element = self.scope.nth(selector, 0)?;
        let rect = element.get_bounding_client_rect();
        Some(AnchorRect {
            top: rect.top() + self.scroll_y(),
            height: rect.height(),
        })
    }

    fn target_count(&self, selector: &str) -> usize {
        self.scope.count(selector)
    }
}
