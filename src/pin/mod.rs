//! Pinning: hold an element in place while the page scrolls through a
//! fixed distance.
//!
//! Each pin belongs to a trigger binding. The engine only needs the
//! binding's resolved start; the pinned span is always
//! `[start, start + distance]`. Phases move
//! `Unpinned → Pinning → Pinned → Unpinned`:
//!
//! - the first update inside the span enters `Pinning`,
//! - the next update still inside settles into `Pinned`,
//! - any update outside returns to `Unpinned`.
//!
//! Progress is recomputed from scratch on every update and is the boundary
//! value (0 before, 1 after) once outside.

use crate::timeline::TargetKey;
use crate::trigger::{scroll_progress, BindingId};

/// Where a pin is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinPhase {
    /// Scrolling normally.
    #[default]
    Unpinned,
    /// First update inside the span.
    Pinning,
    /// Held in place.
    Pinned,
}

/// Observable state of one pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinState {
    /// Owning binding.
    pub binding: BindingId,
    /// Lifecycle phase.
    pub phase: PinPhase,
    /// Whether the element is held (`Pinning` or `Pinned`).
    pub is_pinned: bool,
    /// Position through the pinned span, in [0, 1].
    pub progress: f64,
    /// Offset that cancels the scroll while held: 0 before the span,
    /// `scroll_y - start` inside it, `distance` after it.
    pub hold_offset: f64,
}

/// A pin whose state changed during [`PinningEngine::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct PinUpdate {
    /// Element being held.
    pub target: TargetKey,
    /// State after the update.
    pub state: PinState,
}

#[derive(Debug)]
struct PinSlot {
    binding: BindingId,
    target: TargetKey,
    distance: f64,
    start: Option<f64>,
    state: PinState,
    reported: bool,
}

/// Tracks every pin of a page context.
#[derive(Debug, Default)]
pub struct PinningEngine {
    slots: Vec<PinSlot>,
}

impl PinningEngine {
    /// No pins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `target` for `distance` pixels of scroll once `binding`'s region
    /// starts. Re-registering a binding replaces its pin.
    pub fn register(&mut self, binding: BindingId, target: TargetKey, distance: f64) {
        self.slots.retain(|slot| slot.binding != binding);
        if distance <= 0.0 {
            log::warn!("{binding}: pin distance {distance} never pins");
        }
        self.slots.push(PinSlot {
            binding,
            target,
            distance,
            start: None,
            state: PinState {
                binding,
                phase: PinPhase::Unpinned,
                is_pinned: false,
                progress: 0.0,
                hold_offset: 0.0,
            },
            reported: false,
        });
    }

    /// Set (or clear, while the anchor is missing) the scroll offset where
    /// the pin starts. Returns whether the binding has a pin.
    pub fn resolve(&mut self, binding: BindingId, start: Option<f64>) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.binding == binding)
        else {
            return false;
        };
        slot.start = start;
        true
    }

    /// Remove a pin. Returns whether it existed.
    pub fn unregister(&mut self, binding: BindingId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.binding != binding);
        before != self.slots.len()
    }

    /// Drop every pin.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of pins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no pins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Elements that have a pin.
    pub fn targets(&self) -> impl Iterator<Item = &TargetKey> + '_ {
        self.slots.iter().map(|slot| &slot.target)
    }

    /// Current state of a pin.
    #[must_use]
    pub fn state(&self, binding: BindingId) -> Option<PinState> {
        self.slots
            .iter()
            .find(|slot| slot.binding == binding)
            .map(|slot| slot.state)
    }

    /// Step every resolved pin to `scroll_y`.
    ///
    /// Returns the pins whose state changed, plus every pin on its first
    /// resolved update.
    pub fn update(&mut self, scroll_y: f64) -> Vec<PinUpdate> {
        let mut updates = Vec::new();
        for slot in &mut self.slots {
            let Some(start) = slot.start else {
                continue;
            };
            let next = step(slot.binding, slot.state.phase, start, slot.distance, scroll_y);
            if slot.reported && next == slot.state {
                continue;
            }
            if next.phase != slot.state.phase {
                log::debug!(
                    "{}: {:?} -> {:?} at {scroll_y}",
                    slot.binding,
                    slot.state.phase,
                    next.phase
                );
            }
            slot.state = next;
            slot.reported = true;
            updates.push(PinUpdate {
                target: slot.target.clone(),
                state: next,
            });
        }
        updates
    }
}

fn step(
    binding: BindingId,
    phase: PinPhase,
    start: f64,
    distance: f64,
    scroll_y: f64,
) -> PinState {
    if distance <= 0.0 {
        return PinState {
            binding,
            phase: PinPhase::Unpinned,
            is_pinned: false,
            progress: if scroll_y >= start { 1.0 } else { 0.0 },
            hold_offset: 0.0,
        };
    }

    let end = start + distance;
    let inside = scroll_y >= start && scroll_y <= end;
    let phase = match (phase, inside) {
        (_, false) => PinPhase::Unpinned,
        (PinPhase::Unpinned, true) => PinPhase::Pinning,
        (PinPhase::Pinning | PinPhase::Pinned, true) => PinPhase::Pinned,
    };
    PinState {
        binding,
        phase,
        is_pinned: phase != PinPhase::Unpinned,
        progress: scroll_progress(scroll_y, start, end),
        hold_offset: (scroll_y - start).clamp(0.0, distance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{DrivingMode, ScrollRegion, TriggerRegistry};

    fn binding() -> BindingId {
        let mut registry = TriggerRegistry::new();
        registry.define_region(ScrollRegion::new("dash", ".dashboard-preview"));
        registry.register("dash", "pin", DrivingMode::Scrub).unwrap()
    }

    fn engine(distance: f64) -> (PinningEngine, BindingId) {
        let id = binding();
        let mut engine = PinningEngine::new();
        engine.register(id, TargetKey::new(".dashboard-preview", 0), distance);
        assert!(engine.resolve(id, Some(1000.0)));
        (engine, id)
    }

    fn phase_at(engine: &mut PinningEngine, id: BindingId, y: f64) -> PinPhase {
        let _ = engine.update(y);
        engine.state(id).unwrap().phase
    }

    #[test]
    fn walks_through_every_phase() {
        let (mut engine, id) = engine(1500.0);
        assert_eq!(phase_at(&mut engine, id, 500.0), PinPhase::Unpinned);
        assert_eq!(phase_at(&mut engine, id, 1100.0), PinPhase::Pinning);
        assert_eq!(phase_at(&mut engine, id, 1800.0), PinPhase::Pinned);
        assert_eq!(phase_at(&mut engine, id, 2400.0), PinPhase::Pinned);
        assert_eq!(phase_at(&mut engine, id, 2600.0), PinPhase::Unpinned);
        // Scrolling back in starts over.
        assert_eq!(phase_at(&mut engine, id, 2000.0), PinPhase::Pinning);
    }

    #[test]
    fn progress_spans_the_distance() {
        let (mut engine, id) = engine(1500.0);
        let _ = engine.update(1000.0);
        assert_eq!(engine.state(id).unwrap().progress, 0.0);
        let _ = engine.update(1750.0);
        assert_eq!(engine.state(id).unwrap().progress, 0.5);
        let _ = engine.update(2500.0);
        let state = engine.state(id).unwrap();
        assert_eq!(state.progress, 1.0);
        assert!(state.is_pinned);
    }

    #[test]
    fn exit_reports_boundary_values() {
        let (mut engine, id) = engine(1500.0);
        let _ = engine.update(1200.0);
        let _ = engine.update(9000.0);
        let after = engine.state(id).unwrap();
        assert_eq!(after.progress, 1.0);
        assert_eq!(after.hold_offset, 1500.0);
        assert!(!after.is_pinned);

        let _ = engine.update(0.0);
        let before = engine.state(id).unwrap();
        assert_eq!(before.progress, 0.0);
        assert_eq!(before.hold_offset, 0.0);
    }

    #[test]
    fn progress_ignores_history() {
        let (mut a, id_a) = engine(1500.0);
        let (mut b, id_b) = engine(1500.0);
        for y in [0.0, 3000.0, 1100.0, 1300.0] {
            let _ = a.update(y);
        }
        let _ = b.update(1300.0);
        assert_eq!(
            a.state(id_a).unwrap().progress,
            b.state(id_b).unwrap().progress
        );
    }

    #[test]
    fn zero_distance_never_pins() {
        let (mut engine, id) = engine(0.0);
        let _ = engine.update(900.0);
        assert_eq!(engine.state(id).unwrap().progress, 0.0);
        let _ = engine.update(1000.0);
        let state = engine.state(id).unwrap();
        assert!(!state.is_pinned);
        assert_eq!(state.progress, 1.0);
    }

    #[test]
    fn unresolved_pins_stay_quiet() {
        let id = binding();
        let mut engine = PinningEngine::new();
        engine.register(id, TargetKey::new(".dashboard-preview", 0), 500.0);
        assert!(engine.update(100.0).is_empty());
        assert!(engine.resolve(id, Some(0.0)));
        assert_eq!(engine.update(100.0).len(), 1);
        // Pinning settles into Pinned, then nothing changes.
        assert_eq!(engine.update(100.0).len(), 1);
        assert!(engine.update(100.0).is_empty());
    }
}
