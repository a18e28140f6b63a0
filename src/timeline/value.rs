//! Animatable property values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::color::Rgba;

/// A value a keyframe interpolates between.
///
/// In page declarations numbers become scalars and `#hex` strings become
/// colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Plain number (offsets, opacity, scale).
    Scalar(f64),
    /// RGBA color.
    Color(Rgba),
}

impl PropertyValue {
    /// Whether two values can be interpolated into each other.
    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Scalar(_), Self::Scalar(_)) | (Self::Color(_), Self::Color(_))
        )
    }

    /// `self + t * (other - self)`.
    ///
    /// `t` comes out of an easing curve and may overshoot [0, 1]. Values of
    /// different kinds step from `self` to `other` at `t = 1`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        match (*self, *other) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(a + (b - a) * t),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.lerp(b, t)),
            (from, to) => {
                if t >= 1.0 {
                    to
                } else {
                    from
                }
            }
        }
    }

    /// Scalar payload, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Color(_) => None,
        }
    }

    /// Color payload, if this is a color.
    #[must_use]
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Scalar(_) => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Rgba> for PropertyValue {
    fn from(c: Rgba) -> Self {
        Self::Color(c)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Color(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Pair {
        from: PropertyValue,
        to: PropertyValue,
    }

    #[test]
    fn scalars_and_colors_from_toml() {
        let pair: Pair = toml::from_str("from = 100\nto = 0.5").unwrap();
        assert_eq!(pair.from, PropertyValue::Scalar(100.0));
        assert_eq!(pair.to, PropertyValue::Scalar(0.5));

        let pair: Pair =
            toml::from_str("from = \"#1e293b\"\nto = \"#ffffff\"").unwrap();
        assert!(pair.from.as_color().is_some());
        assert_eq!(pair.to, PropertyValue::Color(Rgba::WHITE));
    }

    #[test]
    fn scalar_lerp_follows_overshoot() {
        let a = PropertyValue::Scalar(0.0);
        let b = PropertyValue::Scalar(10.0);
        assert_eq!(a.lerp(&b, 0.5), PropertyValue::Scalar(5.0));
        assert_eq!(a.lerp(&b, 1.1).as_scalar().unwrap().round(), 11.0);
    }

    #[test]
    fn mismatched_kinds_step() {
        let a = PropertyValue::Scalar(0.0);
        let b = PropertyValue::Color(Rgba::WHITE);
        assert!(!a.same_kind(&b));
        assert_eq!(a.lerp(&b, 0.99), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }
}
