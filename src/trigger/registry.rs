//! Binding registry: computes per-binding progress from one metrics snapshot.

use std::fmt;

use rustc_hash::FxHashMap;

use super::region::{DrivingMode, RegionMode, ScrollRegion};
use crate::error::ScrollweaveError;
use crate::viewport::{LayoutSource, ResolvedRegion, ViewportMetrics};

/// Normalized position of `scroll_y` within `[start, end]`.
///
/// A collapsed or inverted range counts as already complete.
#[must_use]
pub fn scroll_progress(scroll_y: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if span.is_nan() || span <= 0.0 {
        return 1.0;
    }
    let t = (scroll_y - start) / span;
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, 1.0)
}

/// Opaque handle to a registered binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u32);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding#{}", self.0)
    }
}

/// Association of one region with one timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerBinding {
    /// Handle assigned at registration.
    pub id: BindingId,
    /// Region identifier.
    pub region: String,
    /// Timeline identifier.
    pub timeline: String,
    /// How the timeline consumes progress.
    pub driving: DrivingMode,
    /// Catch-up time for scrubbed rendering; 0 renders immediately.
    pub scrub_lag_ms: f64,
}

/// What changed for a binding during a metrics pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPhase {
    /// Scroll position moved into the region.
    Enter,
    /// Progress changed while inside the region.
    Update,
    /// Scroll position left the region.
    Exit,
}

/// Scroll direction between two passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Toward the end of the document.
    Forward,
    /// Toward the top.
    Backward,
    /// No movement (resize, first pass).
    Still,
}

/// Notification produced by [`TriggerRegistry::on_metrics_update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    /// Binding concerned.
    pub binding: BindingId,
    /// The binding's driving mode.
    pub driving: DrivingMode,
    /// Transition kind.
    pub phase: TriggerPhase,
    /// Progress after this pass, in [0, 1].
    pub progress: f64,
    /// True exactly once per latching binding: on the pass that latched it.
    pub latched_now: bool,
    /// Direction of travel.
    pub direction: ScrollDirection,
}

#[derive(Debug)]
struct BindingSlot {
    binding: TriggerBinding,
    resolved: Option<ResolvedRegion>,
    progress: f64,
    latched: bool,
    inside: bool,
    last_scroll: Option<f64>,
}

impl BindingSlot {
    fn new(binding: TriggerBinding) -> Self {
        Self {
            binding,
            resolved: None,
            progress: 0.0,
            latched: false,
            inside: false,
            last_scroll: None,
        }
    }
}

/// Holds named regions and the bindings that reference them.
///
/// Bindings are evaluated in registration order so passes are
/// deterministic.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    regions: FxHashMap<String, ScrollRegion>,
    bindings: Vec<BindingSlot>,
    next_id: u32,
}

impl TriggerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or redefine a region. Bindings that reference it re-resolve on
    /// the next pass.
    pub fn define_region(&mut self, region: ScrollRegion) {
        for slot in &mut self.bindings {
            if slot.binding.region == region.id {
                slot.resolved = None;
            }
        }
        let _ = self.regions.insert(region.id.clone(), region);
    }

    /// Look up a region definition.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<&ScrollRegion> {
        self.regions.get(id)
    }

    /// Bind a region to a timeline.
    pub fn register(
        &mut self,
        region: &str,
        timeline: &str,
        driving: DrivingMode,
    ) -> Result<BindingId, ScrollweaveError> {
        self.register_with_lag(region, timeline, driving, 0.0)
    }

    /// Bind a region to a timeline with a scrub catch-up time.
    pub fn register_with_lag(
        &mut self,
        region: &str,
        timeline: &str,
        driving: DrivingMode,
        scrub_lag_ms: f64,
    ) -> Result<BindingId, ScrollweaveError> {
        if !self.regions.contains_key(region) {
            return Err(ScrollweaveError::UnknownRegion(region.to_owned()));
        }
        let id = BindingId(self.next_id);
        self.next_id += 1;
        self.bindings.push(BindingSlot::new(TriggerBinding {
            id,
            region: region.to_owned(),
            timeline: timeline.to_owned(),
            driving,
            scrub_lag_ms: scrub_lag_ms.max(0.0),
        }));
        log::debug!("registered {id}: {region} -> {timeline} ({driving:?})");
        Ok(id)
    }

    /// Remove a binding. Returns whether it existed.
    pub fn unregister(&mut self, id: BindingId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|slot| slot.binding.id != id);
        before != self.bindings.len()
    }

    /// Drop every binding and region.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.regions.clear();
    }

    /// Look up a binding.
    #[must_use]
    pub fn binding(&self, id: BindingId) -> Option<&TriggerBinding> {
        self.slot(id).map(|slot| &slot.binding)
    }

    /// All bindings in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = &TriggerBinding> + '_ {
        self.bindings.iter().map(|slot| &slot.binding)
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Current progress of a binding.
    #[must_use]
    pub fn progress(&self, id: BindingId) -> Option<f64> {
        self.slot(id).map(|slot| slot.progress)
    }

    /// Resolved boundaries of a binding, `None` while inert.
    #[must_use]
    pub fn resolved(&self, id: BindingId) -> Option<ResolvedRegion> {
        self.slot(id).and_then(|slot| slot.resolved)
    }

    /// Recompute every binding's boundaries (mount, resize).
    pub fn resolve(
        &mut self,
        metrics: &ViewportMetrics,
        layout: &dyn LayoutSource,
    ) {
        self.resolve_where(metrics, layout, |_| true);
    }

    /// Resolve only bindings that are still inert.
    pub fn resolve_pending(
        &mut self,
        metrics: &ViewportMetrics,
        layout: &dyn LayoutSource,
    ) {
        self.resolve_where(metrics, layout, |slot| slot.resolved.is_none());
    }

    fn resolve_where(
        &mut self,
        metrics: &ViewportMetrics,
        layout: &dyn LayoutSource,
        pick: impl Fn(&BindingSlot) -> bool,
    ) {
        if !metrics.is_ready() {
            return;
        }
        for slot in &mut self.bindings {
            if !pick(slot) {
                continue;
            }
            let Some(region) = self.regions.get(&slot.binding.region) else {
                slot.resolved = None;
                continue;
            };
            slot.resolved = region.resolve(metrics, layout);
            if slot.resolved.is_none() {
                log::debug!(
                    "{}: anchor '{}' not mounted, binding inert",
                    slot.binding.id,
                    region.anchor
                );
            }
        }
    }

    /// Recompute progress for every resolved binding from one snapshot.
    ///
    /// Returns the transitions in registration order. A sentinel snapshot
    /// yields no events and leaves state untouched.
    pub fn on_metrics_update(
        &mut self,
        metrics: &ViewportMetrics,
    ) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        if !metrics.is_ready() {
            return events;
        }
        let scroll_y = metrics.scroll_y;

        for slot in &mut self.bindings {
            let Some(resolved) = slot.resolved else {
                continue;
            };
            let latching = slot.binding.driving.latches()
                || self
                    .regions
                    .get(&slot.binding.region)
                    .is_some_and(|r| r.mode == RegionMode::OneShot);

            let degenerate = resolved.is_degenerate();
            let reached = scroll_y >= resolved.start;
            let inside = if degenerate {
                reached
            } else {
                resolved.contains(scroll_y)
            };

            let latched_now = latching && reached && !slot.latched;
            slot.latched |= latched_now;

            let progress = if degenerate || (latching && slot.latched) {
                1.0
            } else if latching {
                0.0
            } else {
                scroll_progress(scroll_y, resolved.start, resolved.end)
            };

            let direction = match slot.last_scroll {
                Some(prev) if scroll_y > prev => ScrollDirection::Forward,
                Some(prev) if scroll_y < prev => ScrollDirection::Backward,
                _ => ScrollDirection::Still,
            };

            let mut emit = |phase| {
                events.push(TriggerEvent {
                    binding: slot.binding.id,
                    driving: slot.binding.driving,
                    phase,
                    progress,
                    latched_now,
                    direction,
                });
            };

            let changed = progress != slot.progress;
            match (slot.inside, inside) {
                (false, true) => emit(TriggerPhase::Enter),
                (true, true) if changed || latched_now => {
                    emit(TriggerPhase::Update);
                }
                (true, false) => emit(TriggerPhase::Exit),
                (false, false) if changed || latched_now => {
                    // Jumped across the whole region in one pass.
                    emit(TriggerPhase::Enter);
                    emit(TriggerPhase::Exit);
                }
                _ => {}
            }

            slot.inside = inside;
            slot.progress = progress;
            slot.last_scroll = Some(scroll_y);
        }

        events
    }

    fn slot(&self, id: BindingId) -> Option<&BindingSlot> {
        self.bindings.iter().find(|slot| slot.binding.id == id)
    }
}
