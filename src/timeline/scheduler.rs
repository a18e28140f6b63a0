//! Owns compiled timelines and drives them by scroll progress or by time.

use super::keyframe::AnimationTimeline;
use super::sink::PropertySink;

/// Playback state of a time-driven timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Never played, or stopped.
    #[default]
    Idle,
    /// Advancing on every tick.
    Playing,
    /// Holding its position until resumed.
    Paused,
    /// Every keyframe has completed its runs.
    Finished,
}

#[derive(Debug)]
struct Slot {
    timeline: AnimationTimeline,
    state: PlaybackState,
    elapsed_ms: f64,
}

/// Drives compiled timelines.
///
/// Scrub-driven timelines are sampled on demand from a progress value;
/// time-driven ones advance on [`tick`](Self::tick). Timelines are kept in
/// definition order so ticks write in a stable order.
#[derive(Debug, Default)]
pub struct TimelineScheduler {
    slots: Vec<Slot>,
}

impl TimelineScheduler {
    /// Empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a timeline, replacing any with the same id.
    pub fn define(&mut self, timeline: AnimationTimeline) {
        if let Some(slot) = self.slot_mut(&timeline.id) {
            log::debug!("redefining timeline '{}'", timeline.id);
            slot.timeline = timeline;
            slot.state = PlaybackState::Idle;
            slot.elapsed_ms = 0.0;
            return;
        }
        self.slots.push(Slot {
            timeline,
            state: PlaybackState::Idle,
            elapsed_ms: 0.0,
        });
    }

    /// Swap in a recompiled version of a defined timeline, keeping its
    /// playback position.
    ///
    /// A finished timeline plays again from where it stopped, so members
    /// that were not there before land on their end values at the next
    /// tick. Returns `false` when the id is unknown.
    pub fn recompile(&mut self, timeline: AnimationTimeline) -> bool {
        let Some(slot) = self.slot_mut(&timeline.id) else {
            return false;
        };
        log::debug!(
            "recompiled timeline '{}': {} keyframe(s)",
            timeline.id,
            timeline.keyframes().len()
        );
        slot.timeline = timeline;
        if slot.state == PlaybackState::Finished {
            slot.state = PlaybackState::Playing;
        }
        true
    }

    /// Drop a timeline. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.timeline.id != id);
        before != self.slots.len()
    }

    /// Drop every timeline.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Whether a timeline with this id is defined.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.slot(id).is_some()
    }

    /// Look up a timeline.
    #[must_use]
    pub fn timeline(&self, id: &str) -> Option<&AnimationTimeline> {
        self.slot(id).map(|slot| &slot.timeline)
    }

    /// All timelines in definition order.
    pub fn timelines(&self) -> impl Iterator<Item = &AnimationTimeline> + '_ {
        self.slots.iter().map(|slot| &slot.timeline)
    }

    /// Number of defined timelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no timelines are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sample a timeline at scroll progress `progress`.
    ///
    /// Returns `false` when the id is unknown.
    pub fn advance(
        &self,
        id: &str,
        progress: f64,
        sink: &mut dyn PropertySink,
    ) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        slot.timeline.sample_scrub(progress, sink);
        true
    }

    /// Start time-driven playback from the beginning.
    pub fn play(&mut self, id: &str) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.state = PlaybackState::Playing;
        slot.elapsed_ms = 0.0;
        log::debug!("playing timeline '{id}'");
        true
    }

    /// Hold a playing timeline at its current position.
    pub fn pause(&mut self, id: &str) -> bool {
        match self.slot_mut(id) {
            Some(slot) if slot.state == PlaybackState::Playing => {
                slot.state = PlaybackState::Paused;
                true
            }
            _ => false,
        }
    }

    /// Continue a paused timeline where it stopped.
    pub fn resume(&mut self, id: &str) -> bool {
        match self.slot_mut(id) {
            Some(slot) if slot.state == PlaybackState::Paused => {
                slot.state = PlaybackState::Playing;
                true
            }
            _ => false,
        }
    }

    /// Advance every playing timeline by `delta_ms` and write its values.
    ///
    /// Returns the number of timelines sampled.
    pub fn tick(&mut self, delta_ms: f64, sink: &mut dyn PropertySink) -> usize {
        let delta_ms = delta_ms.max(0.0);
        let mut sampled = 0;
        for slot in &mut self.slots {
            if slot.state != PlaybackState::Playing {
                continue;
            }
            slot.elapsed_ms += delta_ms;
            sampled += 1;
            if slot.timeline.sample_time(slot.elapsed_ms, sink) {
                slot.state = PlaybackState::Finished;
                log::debug!("timeline '{}' finished", slot.timeline.id);
            }
        }
        sampled
    }

    /// Stop every time-driven playback. Stopped timelines never write
    /// again until replayed.
    pub fn stop_all(&mut self) {
        for slot in &mut self.slots {
            if matches!(
                slot.state,
                PlaybackState::Playing | PlaybackState::Paused
            ) {
                slot.state = PlaybackState::Idle;
            }
        }
    }

    /// Playback state of a timeline.
    #[must_use]
    pub fn state(&self, id: &str) -> Option<PlaybackState> {
        self.slot(id).map(|slot| slot.state)
    }

    /// Time played so far.
    #[must_use]
    pub fn elapsed_ms(&self, id: &str) -> Option<f64> {
        self.slot(id).map(|slot| slot.elapsed_ms)
    }

    /// Whether any timeline is playing.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.state == PlaybackState::Playing)
    }

    fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.timeline.id == id)
    }

    fn slot_mut(&mut self, id: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.timeline.id == id)
    }
}

/// Smoothed scrub position that trails the scroll progress.
///
/// With a lag of `L` ms the follower covers about 98% of the remaining
/// distance every `L` ms of frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubFollower {
    current: f64,
    target: f64,
    lag_ms: f64,
}

impl ScrubFollower {
    /// Follower resting at `initial`.
    #[must_use]
    pub fn new(lag_ms: f64, initial: f64) -> Self {
        Self {
            current: initial,
            target: initial,
            lag_ms: lag_ms.max(0.0),
        }
    }

    /// Progress currently rendered.
    #[must_use]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Progress being approached.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Move the goal. Without lag the follower jumps straight to it.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
        if self.lag_ms <= 0.0 {
            self.current = target;
        }
    }

    /// Whether the rendered progress has reached the target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advance by `delta_ms` of frame time. Returns the new position when it
    /// moved; snaps to the target once within `epsilon`.
    pub fn step(&mut self, delta_ms: f64, epsilon: f64) -> Option<f64> {
        if self.is_settled() {
            return None;
        }
        if self.lag_ms <= 0.0 {
            self.current = self.target;
            return Some(self.current);
        }
        let blend = 1.0 - (-4.0 * delta_ms.max(0.0) / self.lag_ms).exp();
        self.current += (self.target - self.current) * blend;
        if (self.target - self.current).abs() <= epsilon {
            self.current = self.target;
        }
        Some(self.current)
    }
}
