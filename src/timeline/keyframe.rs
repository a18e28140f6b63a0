//! Compiled keyframes and timelines.
//!
//! A compiled [`AnimationTimeline`] is a flat list of [`Keyframe`]s, one per
//! `(member, property)` pair, each carrying its absolute delay on the
//! timeline. Sampling is stateless: a scrub position or an elapsed time maps
//! to values without reference to earlier samples.

use serde::{Deserialize, Serialize};

use super::sink::{PropertySink, TargetKey};
use super::value::PropertyValue;
use crate::util::easing::EasingFunction;

/// How many times a keyframe plays after its first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RepeatRepr", into = "RepeatRepr")]
pub enum Repeat {
    /// Play once, then repeat this many extra times.
    Count(u32),
    /// Never stop (until teardown).
    Infinite,
}

/// Wire form: `repeat = 2`, `repeat = -1`, or `repeat = "infinite"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RepeatRepr {
    Count(i64),
    Word(String),
}

impl TryFrom<RepeatRepr> for Repeat {
    type Error = String;

    fn try_from(repr: RepeatRepr) -> Result<Self, Self::Error> {
        match repr {
            RepeatRepr::Count(-1) => Ok(Self::Infinite),
            RepeatRepr::Count(n) => u32::try_from(n)
                .map(Self::Count)
                .map_err(|_| format!("invalid repeat count {n}")),
            RepeatRepr::Word(w) if w.eq_ignore_ascii_case("infinite") => {
                Ok(Self::Infinite)
            }
            RepeatRepr::Word(w) => Err(format!("invalid repeat {w:?}")),
        }
    }
}

impl From<Repeat> for RepeatRepr {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::Count(n) => Self::Count(i64::from(n)),
            Repeat::Infinite => Self::Word("infinite".to_owned()),
        }
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl Repeat {
    /// Total number of runs, `None` when infinite.
    #[must_use]
    pub fn iterations(self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(n.saturating_add(1)),
            Self::Infinite => None,
        }
    }
}

/// One property transition on one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Element being animated.
    pub target: TargetKey,
    /// Property name handed to the sink.
    pub property: String,
    /// Value at local t = 0.
    pub from: PropertyValue,
    /// Value at local t = 1.
    pub to: PropertyValue,
    /// Curve applied to local t.
    pub easing: EasingFunction,
    /// Length of one run.
    pub duration_ms: f64,
    /// Absolute start on the timeline (tween position + delay + stagger).
    pub delay_ms: f64,
    /// Extra runs after the first (time-driven only).
    pub repeat: Repeat,
    /// Alternate direction on every other run (time-driven only).
    pub yoyo: bool,
    /// Stagger group this keyframe belongs to, if any.
    pub group: Option<usize>,
}

impl Keyframe {
    /// Where the first run ends on the timeline.
    #[must_use]
    pub fn end_ms(&self) -> f64 {
        self.delay_ms + self.duration_ms
    }

    /// Local t for a scrub position `position_ms` on a timeline whose
    /// overall progress is `progress`. Repeats are ignored when scrubbing.
    #[must_use]
    pub fn scrub_t(&self, position_ms: f64, progress: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return if position_ms > self.delay_ms || progress >= 1.0 {
                1.0
            } else {
                0.0
            };
        }
        ((position_ms - self.delay_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Local t after `elapsed_ms` of playback, and whether this keyframe
    /// has finished every run.
    #[must_use]
    pub fn time_t(&self, elapsed_ms: f64) -> (f64, bool) {
        let local = elapsed_ms - self.delay_ms;
        if local < 0.0 {
            return (0.0, false);
        }
        let iterations = self.repeat.iterations();
        let final_t = |n: u32| {
            if self.yoyo && n % 2 == 0 {
                0.0
            } else {
                1.0
            }
        };

        if self.duration_ms <= 0.0 {
            return match iterations {
                Some(n) => (final_t(n), true),
                None => (1.0, false),
            };
        }

        let cycles = local / self.duration_ms;
        if let Some(n) = iterations {
            if cycles >= f64::from(n) {
                return (final_t(n), true);
            }
        }
        let run = cycles.floor();
        let frac = cycles - run;
        let reversed = self.yoyo && (run as u64) % 2 == 1;
        (if reversed { 1.0 - frac } else { frac }, false)
    }

    /// Interpolated value at local t.
    #[must_use]
    pub fn value_at(&self, local_t: f64) -> PropertyValue {
        self.from.lerp(&self.to, self.easing.evaluate(local_t))
    }
}

/// An ordered, compiled sequence of keyframes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTimeline {
    /// Timeline identifier, referenced by bindings.
    pub id: String,
    keyframes: Vec<Keyframe>,
    span_ms: f64,
}

impl AnimationTimeline {
    /// Timeline from already-positioned keyframes.
    ///
    /// The scrub span is the latest end of any keyframe's first run.
    #[must_use]
    pub fn new(id: &str, keyframes: Vec<Keyframe>) -> Self {
        let span_ms = keyframes
            .iter()
            .map(Keyframe::end_ms)
            .fold(0.0, f64::max);
        Self {
            id: id.to_owned(),
            keyframes,
            span_ms,
        }
    }

    /// Keyframes in timeline order.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Length of the timeline when driven by scroll.
    #[must_use]
    pub fn span_ms(&self) -> f64 {
        self.span_ms
    }

    /// Whether any keyframe repeats forever.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.keyframes
            .iter()
            .any(|k| k.repeat == Repeat::Infinite)
    }

    /// Write every keyframe's value at scroll progress `progress`.
    pub fn sample_scrub(&self, progress: f64, sink: &mut dyn PropertySink) {
        let progress = progress.clamp(0.0, 1.0);
        let position = progress * self.span_ms;
        for key in &self.keyframes {
            let t = if self.span_ms > 0.0 {
                key.scrub_t(position, progress)
            } else {
                progress
            };
            sink.write(&key.target, &key.property, key.value_at(t));
        }
    }

    /// Write every keyframe's value after `elapsed_ms` of playback.
    ///
    /// Returns `true` once every keyframe has finished.
    pub fn sample_time(&self, elapsed_ms: f64, sink: &mut dyn PropertySink) -> bool {
        let mut done = true;
        for key in &self.keyframes {
            let (t, finished) = key.time_t(elapsed_ms);
            done &= finished;
            sink.write(&key.target, &key.property, key.value_at(t));
        }
        done
    }

    /// Every `(target, property)` this timeline writes, one per keyframe.
    pub fn touched(&self) -> impl Iterator<Item = (&TargetKey, &str)> + '_ {
        self.keyframes
            .iter()
            .map(|k| (&k.target, k.property.as_str()))
    }
}
