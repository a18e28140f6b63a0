//! Timelines: declaration, compilation, and playback.
//!
//! A page declares [`TimelineSpec`]s. At mount they compile into
//! [`AnimationTimeline`]s, flat lists of absolutely positioned
//! [`Keyframe`]s, which the [`TimelineScheduler`] samples either from
//! scroll progress (scrub) or from accumulated frame time (play / loop).
//! Every resolved value leaves through a [`PropertySink`].

mod keyframe;
mod scheduler;
mod sink;
mod spec;
mod value;

pub use keyframe::{AnimationTimeline, Keyframe, Repeat};
pub use scheduler::{PlaybackState, ScrubFollower, TimelineScheduler};
pub use sink::{PropertySink, PropertyTable, TargetKey};
pub use spec::{
    PropSpec, StaggerFrom, StaggerSpec, TimelineSpec, TweenPosition, TweenSpec,
};
pub use value::PropertyValue;
