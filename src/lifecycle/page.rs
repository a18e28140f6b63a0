//! Page declarations: everything a page context mounts, in one TOML file.

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::ScrollweaveError;
use crate::timeline::TimelineSpec;
use crate::trigger::{DrivingMode, ScrollRegion};
use crate::viewport::{Edge, ScrollOffset};

/// Declaration shipped with the crate for the reference landing page.
const LANDING: &str = include_str!("../../assets/pages/landing.toml");

/// Prefix of the region a pin creates for itself.
pub const PIN_REGION_PREFIX: &str = "pin:";

/// One region → timeline binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSpec {
    /// Region id.
    pub region: String,
    /// Timeline id.
    pub timeline: String,
    /// How the timeline follows the region.
    #[serde(default)]
    pub driving: DrivingMode,
    /// Catch-up time for scrubbed rendering.
    #[serde(default)]
    pub scrub_lag_ms: f64,
}

fn default_pin_start() -> ScrollOffset {
    ScrollOffset::Anchored {
        element: Edge::Top,
        viewport: Edge::Top,
    }
}

/// An element held in place for a distance of scroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinSpec {
    /// Pin id.
    pub id: String,
    /// Element the start offset is measured against.
    pub anchor: String,
    /// Where holding begins.
    #[serde(default = "default_pin_start")]
    pub start: ScrollOffset,
    /// Scroll distance the element stays held for.
    pub distance: f64,
    /// Element held; the anchor itself when absent.
    #[serde(default)]
    pub target: Option<String>,
}

impl PinSpec {
    /// Id of the region this pin is tracked through.
    #[must_use]
    pub fn region_id(&self) -> String {
        format!("{PIN_REGION_PREFIX}{}", self.id)
    }

    /// Selector of the held element.
    #[must_use]
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.anchor)
    }

    /// Region spanning `[start, start + distance]`.
    #[must_use]
    pub fn region(&self) -> ScrollRegion {
        ScrollRegion::new(&self.region_id(), &self.anchor)
            .between(self.start, ScrollOffset::Relative(self.distance))
    }
}

/// Everything one page mounts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    /// Root element the page's selectors are scoped to.
    pub container: Option<String>,
    /// Scroll regions.
    pub regions: Vec<ScrollRegion>,
    /// Timelines.
    pub timelines: Vec<TimelineSpec>,
    /// Region → timeline bindings.
    pub bindings: Vec<BindingSpec>,
    /// Pins.
    pub pins: Vec<PinSpec>,
}

impl PageSpec {
    /// The reference landing page.
    pub fn landing() -> Result<Self, ScrollweaveError> {
        Self::from_toml(LANDING)
    }

    /// Parse a page declaration.
    pub fn from_toml(content: &str) -> Result<Self, ScrollweaveError> {
        toml::from_str(content).map_err(|e| ScrollweaveError::PageParse(e.to_string()))
    }

    /// Load a page declaration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ScrollweaveError> {
        let content = std::fs::read_to_string(path).map_err(ScrollweaveError::Io)?;
        Self::from_toml(&content)
    }

    /// Check ids are unique and every binding reference resolves, so a bad
    /// declaration fails before anything is registered.
    pub fn validate(&self) -> Result<(), ScrollweaveError> {
        let mut regions = FxHashSet::default();
        let region_ids = self
            .regions
            .iter()
            .map(|r| r.id.clone())
            .chain(self.pins.iter().map(PinSpec::region_id));
        for id in region_ids {
            if !regions.insert(id.clone()) {
                return Err(ScrollweaveError::DuplicateId(id));
            }
        }

        let mut timelines = FxHashSet::default();
        for timeline in &self.timelines {
            if !timelines.insert(timeline.id.as_str()) {
                return Err(ScrollweaveError::DuplicateId(timeline.id.clone()));
            }
        }

        for binding in &self.bindings {
            if !regions.contains(&binding.region) {
                return Err(ScrollweaveError::UnknownRegion(binding.region.clone()));
            }
            if !timelines.contains(binding.timeline.as_str()) {
                return Err(ScrollweaveError::UnknownTimeline(
                    binding.timeline.clone(),
                ));
            }
        }
        Ok(())
    }
}
