//! Declarative timelines and their compilation into keyframes.
//!
//! A [`TimelineSpec`] is what a page declares: tweens over selectors, with
//! optional stagger, repeat and yoyo. [`TimelineSpec::compile`] expands each
//! tween into one keyframe per matched element and property, positioning
//! every keyframe absolutely on the timeline.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::keyframe::{AnimationTimeline, Keyframe, Repeat};
use super::sink::TargetKey;
use super::value::PropertyValue;
use crate::error::ScrollweaveError;
use crate::options::TimingOptions;
use crate::util::easing::EasingFunction;
use crate::viewport::LayoutSource;

/// One animated property of a tween.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    /// Property name handed to the sink.
    pub name: String,
    /// Start value.
    pub from: PropertyValue,
    /// End value.
    pub to: PropertyValue,
}

/// Which member of a group starts first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StaggerFrom {
    /// Document order.
    #[default]
    Start,
    /// Reverse document order.
    End,
    /// Middle members first, spreading outward.
    Center,
    /// A seeded shuffle, fixed at compile time.
    Random,
}

/// Per-member offset across a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaggerSpec {
    /// Delay between consecutive members.
    pub each_ms: f64,
    /// Ordering of members.
    #[serde(default)]
    pub from: StaggerFrom,
}

/// Where a tween starts relative to its predecessors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenPosition {
    /// When everything placed so far has ended.
    #[default]
    After,
    /// Together with the previous tween.
    WithPrevious,
    /// At a fixed time on the timeline.
    At(f64),
}

/// A transition of one or more properties across the elements matching a
/// selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    /// Selector of the animated elements.
    pub targets: String,
    /// Properties to animate.
    pub props: Vec<PropSpec>,
    /// Curve; the configured default when absent.
    #[serde(default)]
    pub easing: Option<EasingFunction>,
    /// Run length; the configured default when absent.
    #[serde(default)]
    pub duration_ms: Option<f64>,
    /// Extra offset after the tween's position.
    #[serde(default)]
    pub delay_ms: f64,
    /// Per-member offsets.
    #[serde(default)]
    pub stagger: Option<StaggerSpec>,
    /// Extra runs after the first.
    #[serde(default)]
    pub repeat: Repeat,
    /// Alternate direction every run.
    #[serde(default)]
    pub yoyo: bool,
    /// Placement on the timeline.
    #[serde(default)]
    pub position: TweenPosition,
}

impl TweenSpec {
    /// Tween of `targets` with no properties yet.
    #[must_use]
    pub fn new(targets: &str) -> Self {
        Self {
            targets: targets.to_owned(),
            props: Vec::new(),
            easing: None,
            duration_ms: None,
            delay_ms: 0.0,
            stagger: None,
            repeat: Repeat::default(),
            yoyo: false,
            position: TweenPosition::default(),
        }
    }

    /// Add an animated property.
    #[must_use]
    pub fn prop(
        mut self,
        name: &str,
        from: impl Into<PropertyValue>,
        to: impl Into<PropertyValue>,
    ) -> Self {
        self.props.push(PropSpec {
            name: name.to_owned(),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Set the run length.
    #[must_use]
    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// Set the easing.
    #[must_use]
    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Stagger members by `each_ms`.
    #[must_use]
    pub fn stagger(mut self, each_ms: f64, from: StaggerFrom) -> Self {
        self.stagger = Some(StaggerSpec { each_ms, from });
        self
    }

    /// Repeat forever, optionally alternating direction.
    #[must_use]
    pub fn looping(mut self, yoyo: bool) -> Self {
        self.repeat = Repeat::Infinite;
        self.yoyo = yoyo;
        self
    }

    /// Set the placement.
    #[must_use]
    pub fn at(mut self, position: TweenPosition) -> Self {
        self.position = position;
        self
    }

    fn validate(&self, timeline: &str) -> Result<(), ScrollweaveError> {
        let fail = |reason: String| {
            Err(ScrollweaveError::InvalidTween {
                timeline: timeline.to_owned(),
                reason,
            })
        };
        if self.props.is_empty() {
            return fail(format!("tween on '{}' animates nothing", self.targets));
        }
        if let Some(prop) =
            self.props.iter().find(|p| !p.from.same_kind(&p.to))
        {
            return fail(format!(
                "'{}' mixes a number and a color",
                prop.name
            ));
        }
        if self.delay_ms.is_nan() || self.delay_ms < 0.0 {
            return fail(format!("negative delay on '{}'", self.targets));
        }
        if self.duration_ms.is_some_and(|d| d.is_nan() || d < 0.0) {
            return fail(format!("negative duration on '{}'", self.targets));
        }
        if self
            .stagger
            .is_some_and(|s| s.each_ms.is_nan() || s.each_ms < 0.0)
        {
            return fail(format!("negative stagger on '{}'", self.targets));
        }
        Ok(())
    }
}

/// A declared timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSpec {
    /// Timeline identifier, referenced by bindings.
    pub id: String,
    /// Tweens in declaration order.
    #[serde(default)]
    pub tweens: Vec<TweenSpec>,
}

impl TimelineSpec {
    /// Empty timeline.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            tweens: Vec::new(),
        }
    }

    /// Append a tween.
    #[must_use]
    pub fn tween(mut self, tween: TweenSpec) -> Self {
        self.tweens.push(tween);
        self
    }

    /// Number of elements each tween currently animates, in tween order.
    ///
    /// Compiling again only changes the keyframes when this changes.
    #[must_use]
    pub fn group_sizes(&self, layout: &dyn LayoutSource) -> Vec<usize> {
        self.tweens
            .iter()
            .map(|tween| layout.target_count(&tween.targets))
            .collect()
    }

    /// Expand into positioned keyframes.
    ///
    /// Group sizes come from the layout at call time. Random stagger order
    /// is drawn here, once, from a seed derived from `timing.stagger_seed`,
    /// the timeline id and the tween index, so recompiling with the same
    /// inputs reproduces the same order.
    pub fn compile(
        &self,
        layout: &dyn LayoutSource,
        timing: &TimingOptions,
    ) -> Result<AnimationTimeline, ScrollweaveError> {
        let mut keyframes = Vec::new();
        let mut cursor = 0.0_f64;
        let mut prev_start = 0.0_f64;
        let mut next_group = 0;

        for (tween_idx, tween) in self.tweens.iter().enumerate() {
            tween.validate(&self.id)?;

            let duration = tween.duration_ms.unwrap_or(timing.default_duration_ms);
            let easing = tween.easing.unwrap_or(timing.default_easing);
            let start = match tween.position {
                TweenPosition::After => cursor,
                TweenPosition::WithPrevious => prev_start,
                TweenPosition::At(ms) => ms.max(0.0),
            };

            let members = layout.target_count(&tween.targets);
            if members == 0 {
                log::warn!(
                    "timeline '{}': no elements match '{}'",
                    self.id,
                    tween.targets
                );
            }
            let shifts: Vec<f64> = match tween.stagger {
                Some(stagger) => {
                    let seed = stagger_seed(timing.stagger_seed, &self.id, tween_idx);
                    stagger_ranks(stagger.from, members, seed)
                        .into_iter()
                        .map(|rank| rank * stagger.each_ms)
                        .collect()
                }
                None => vec![0.0; members],
            };

            // Members in firing order so delays within a group ascend.
            let mut order: Vec<usize> = (0..members).collect();
            order.sort_by(|&a, &b| shifts[a].total_cmp(&shifts[b]).then(a.cmp(&b)));

            for prop in &tween.props {
                let group = tween.stagger.map(|_| {
                    next_group += 1;
                    next_group - 1
                });
                for &member in &order {
                    keyframes.push(Keyframe {
                        target: TargetKey::new(&tween.targets, member),
                        property: prop.name.clone(),
                        from: prop.from,
                        to: prop.to,
                        easing,
                        duration_ms: duration,
                        delay_ms: start + tween.delay_ms + shifts[member],
                        repeat: tween.repeat,
                        yoyo: tween.yoyo,
                        group,
                    });
                }
            }

            let max_shift = shifts.iter().copied().fold(0.0, f64::max);
            let runs = tween.repeat.iterations().unwrap_or(1);
            let end = start + tween.delay_ms + max_shift + duration * f64::from(runs);
            cursor = cursor.max(end);
            prev_start = start;
        }

        Ok(AnimationTimeline::new(&self.id, keyframes))
    }
}

/// Per-tween shuffle seed. 64-bit FNV-1a over fixed-width input, so the
/// browser build and native builds draw the same order.
fn stagger_seed(base: u64, timeline: &str, tween_idx: usize) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let idx = (tween_idx as u64).to_le_bytes();
    let hash = timeline
        .as_bytes()
        .iter()
        .chain(&[0xff])
        .chain(&idx)
        .fold(FNV_OFFSET, |hash, &byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        });
    base ^ hash
}

/// Firing rank of each member (member index → rank).
fn stagger_ranks(from: StaggerFrom, n: usize, seed: u64) -> Vec<f64> {
    match from {
        StaggerFrom::Start => (0..n).map(|i| i as f64).collect(),
        StaggerFrom::End => (0..n).map(|i| (n - 1 - i) as f64).collect(),
        StaggerFrom::Center => {
            let mid = (n as f64 - 1.0) / 2.0;
            (0..n).map(|i| (i as f64 - mid).abs()).collect()
        }
        StaggerFrom::Random => {
            let mut firing: Vec<usize> = (0..n).collect();
            firing.shuffle(&mut StdRng::seed_from_u64(seed));
            let mut ranks = vec![0.0; n];
            for (rank, &member) in firing.iter().enumerate() {
                ranks[member] = rank as f64;
            }
            ranks
        }
    }
}
