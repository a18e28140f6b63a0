//! Scroll offset expressions.
//!
//! A trigger boundary is written the way page authors think about it:
//! `"top 80%"` means "when the anchor's top edge reaches 80% down the
//! viewport". Resolution turns that into an absolute scroll position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::layout::AnchorRect;
use crate::error::ScrollweaveError;

/// A position along an element or along the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// Leading edge (offset 0).
    Top,
    /// Midpoint.
    Center,
    /// Trailing edge (offset = full extent).
    Bottom,
    /// Fraction of the extent, in percent.
    Percent(f64),
    /// Fixed pixel distance from the leading edge.
    Pixels(f64),
}

impl Edge {
    /// Distance of this edge from the leading edge of a span of `extent`.
    #[must_use]
    pub fn along(self, extent: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => extent / 2.0,
            Self::Bottom => extent,
            Self::Percent(p) => extent * p / 100.0,
            Self::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollweaveError::InvalidOffset(s.to_owned());
        match s {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            _ => {
                if let Some(p) = s.strip_suffix('%') {
                    p.parse().map(Self::Percent).map_err(|_| invalid())
                } else {
                    let px = s.strip_suffix("px").unwrap_or(s);
                    px.parse().map(Self::Pixels).map_err(|_| invalid())
                }
            }
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Center => f.write_str("center"),
            Self::Bottom => f.write_str("bottom"),
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// One boundary of a scroll region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScrollOffset {
    /// `"<element-edge> <viewport-edge>"`: the scroll position at which the
    /// element edge meets the viewport edge.
    Anchored {
        /// Edge on the anchor element.
        element: Edge,
        /// Edge on the viewport.
        viewport: Edge,
    },
    /// `"+=N"`: N pixels past the base position (the anchor top for a start
    /// boundary, the resolved start for an end boundary).
    Relative(f64),
    /// `"@N"`: a fixed scroll position.
    Absolute(f64),
}

impl ScrollOffset {
    /// Default region start: anchor top meets viewport bottom.
    pub const DEFAULT_START: ScrollOffset = ScrollOffset::Anchored {
        element: Edge::Top,
        viewport: Edge::Bottom,
    };

    /// Default region end: anchor bottom meets viewport top.
    pub const DEFAULT_END: ScrollOffset = ScrollOffset::Anchored {
        element: Edge::Bottom,
        viewport: Edge::Top,
    };

    /// Absolute scroll position for this offset.
    ///
    /// `base` is what a [`Relative`](Self::Relative) offset is measured from.
    #[must_use]
    pub fn resolve(
        &self,
        anchor: AnchorRect,
        viewport_height: f64,
        base: f64,
    ) -> f64 {
        match *self {
            Self::Anchored { element, viewport } => {
                anchor.top + element.along(anchor.height)
                    - viewport.along(viewport_height)
            }
            Self::Relative(delta) => base + delta,
            Self::Absolute(pos) => pos,
        }
    }
}

impl FromStr for ScrollOffset {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollweaveError::InvalidOffset(s.to_owned());
        let trimmed = s.trim();

        if let Some(delta) = trimmed.strip_prefix("+=") {
            return delta
                .trim()
                .parse()
                .map(Self::Relative)
                .map_err(|_| invalid());
        }
        if let Some(delta) = trimmed.strip_prefix("-=") {
            return delta
                .trim()
                .parse::<f64>()
                .map(|d| Self::Relative(-d))
                .map_err(|_| invalid());
        }
        if let Some(pos) = trimmed.strip_prefix('@') {
            return pos
                .trim()
                .parse()
                .map(Self::Absolute)
                .map_err(|_| invalid());
        }

        let mut parts = trimmed.split_whitespace();
        let element: Edge = parts.next().ok_or_else(invalid)?.parse()?;
        let viewport: Edge = match parts.next() {
            Some(token) => token.parse()?,
            None => element,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::Anchored { element, viewport })
    }
}

impl TryFrom<String> for ScrollOffset {
    type Error = ScrollweaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScrollOffset> for String {
    fn from(offset: ScrollOffset) -> Self {
        offset.to_string()
    }
}

impl fmt::Display for ScrollOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchored { element, viewport } => {
                write!(f, "{element} {viewport}")
            }
            Self::Relative(delta) => write!(f, "+={delta}"),
            Self::Absolute(pos) => write!(f, "@{pos}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: AnchorRect = AnchorRect {
        top: 2000.0,
        height: 600.0,
    };

    #[test]
    fn parse_anchored_pairs() {
        let offset: ScrollOffset = "top 80%".parse().unwrap();
        assert_eq!(
            offset,
            ScrollOffset::Anchored {
                element: Edge::Top,
                viewport: Edge::Percent(80.0),
            }
        );

        let offset: ScrollOffset = "center 120px".parse().unwrap();
        assert_eq!(
            offset,
            ScrollOffset::Anchored {
                element: Edge::Center,
                viewport: Edge::Pixels(120.0),
            }
        );
    }

    #[test]
    fn parse_relative_and_absolute() {
        assert_eq!(
            "+=1500".parse::<ScrollOffset>().unwrap(),
            ScrollOffset::Relative(1500.0)
        );
        assert_eq!(
            "-=20".parse::<ScrollOffset>().unwrap(),
            ScrollOffset::Relative(-20.0)
        );
        assert_eq!(
            "@300".parse::<ScrollOffset>().unwrap(),
            ScrollOffset::Absolute(300.0)
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<ScrollOffset>().is_err());
        assert!("top middle".parse::<ScrollOffset>().is_err());
        assert!("top top top".parse::<ScrollOffset>().is_err());
        assert!("+=far".parse::<ScrollOffset>().is_err());
    }

    #[test]
    fn resolve_top_top_is_anchor_top() {
        let offset: ScrollOffset = "top top".parse().unwrap();
        assert_eq!(offset.resolve(ANCHOR, 800.0, 0.0), 2000.0);
    }

    #[test]
    fn resolve_top_percent_subtracts_viewport_fraction() {
        let offset: ScrollOffset = "top 80%".parse().unwrap();
        assert_eq!(offset.resolve(ANCHOR, 1000.0, 0.0), 1200.0);
    }

    #[test]
    fn resolve_defaults_span_full_visibility() {
        let start = ScrollOffset::DEFAULT_START.resolve(ANCHOR, 800.0, 0.0);
        let end = ScrollOffset::DEFAULT_END.resolve(ANCHOR, 800.0, start);
        assert_eq!(start, 1200.0);
        assert_eq!(end, 2600.0);
    }

    #[test]
    fn resolve_relative_uses_base() {
        let offset = ScrollOffset::Relative(1500.0);
        assert_eq!(offset.resolve(ANCHOR, 800.0, 2000.0), 3500.0);
    }

    #[test]
    fn display_parses_back() {
        for text in ["top 80%", "bottom top", "+=1500", "@42", "center 10px"] {
            let offset: ScrollOffset = text.parse().unwrap();
            let again: ScrollOffset = offset.to_string().parse().unwrap();
            assert_eq!(offset, again);
        }
    }
}
