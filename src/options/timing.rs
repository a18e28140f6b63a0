use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::util::easing::EasingFunction;

/// Defaults applied when compiling timelines, and scrub settling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Timing", inline)]
#[serde(default)]
pub struct TimingOptions {
    /// Run length of a tween that declares none.
    #[schemars(title = "Default Duration (ms)", range(min = 0.0, max = 10000.0), extend("step" = 50.0))]
    pub default_duration_ms: f64,
    /// Curve of a tween that declares none.
    #[schemars(title = "Default Easing", with = "String")]
    pub default_easing: EasingFunction,
    /// Base seed for random stagger order.
    #[schemars(skip)]
    pub stagger_seed: u64,
    /// Distance below which a lagging scrub snaps to its target progress.
    #[schemars(skip)]
    pub scrub_epsilon: f64,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            default_duration_ms: 500.0,
            default_easing: EasingFunction::DEFAULT,
            stagger_seed: 0x5eed_cafe,
            scrub_epsilon: 1.0e-4,
        }
    }
}
