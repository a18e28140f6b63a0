//! Easing functions for keyframe interpolation.
//!
//! Curves are addressed by name in page declarations (`"power4.out"`,
//! `"back.out(1.7)"`, `"sine.inOut"`, ...). All functions are designed for
//! <100ns evaluation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScrollweaveError;

/// Overshoot used by `back.out` when none is given.
const DEFAULT_OVERSHOOT: f64 = 1.70158;

/// Easing function variants for animation curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    QuadraticIn,
    /// Quadratic ease-out (fast start, slow end).
    QuadraticOut,
    /// Square root ease-out (fast start, gradual slow).
    SqrtOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First inner control value.
        c1: f64,
        /// Second inner control value.
        c2: f64,
    },
    /// Polynomial ease-in of degree `n + 1` (`power1.in` is quadratic).
    PowerIn(u8),
    /// Polynomial ease-out of degree `n + 1`.
    PowerOut(u8),
    /// Symmetric polynomial ease-in-out of degree `n + 1`.
    PowerInOut(u8),
    /// Ease-out that overshoots the target before settling.
    ///
    /// Output leaves [0, 1] briefly; callers must not clamp it.
    BackOut {
        /// Overshoot amount (1.70158 gives a ~10% overshoot).
        overshoot: f64,
    },
    /// Sinusoidal ease-in-out.
    SineInOut,
}

impl EasingFunction {
    /// Default easing function: a gentle quadratic ease-out.
    pub const DEFAULT: EasingFunction = EasingFunction::PowerOut(1);

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0]. Every curve maps 0 to 0 and 1 to 1.
    ///
    /// Target performance: <100ns
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticIn => t * t,
            EasingFunction::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            EasingFunction::SqrtOut => t.sqrt(),
            EasingFunction::CubicHermite { c1, c2 } => {
                // c0 = 0, c3 = 1
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
            EasingFunction::PowerIn(n) => t.powi(i32::from(n) + 1),
            EasingFunction::PowerOut(n) => {
                1.0 - (1.0 - t).powi(i32::from(n) + 1)
            }
            EasingFunction::PowerInOut(n) => {
                let p = i32::from(n) + 1;
                if t < 0.5 {
                    (2.0 * t).powi(p) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(p) / 2.0
                }
            }
            EasingFunction::BackOut { overshoot } => {
                let c3 = overshoot + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + overshoot * u * u
            }
            EasingFunction::SineInOut => {
                -((std::f64::consts::PI * t).cos() - 1.0) / 2.0
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Split `"name(a, b)"` into `("name", Some("a, b"))`.
fn split_args(s: &str) -> Option<(&str, Option<&str>)> {
    match s.find('(') {
        None => Some((s, None)),
        Some(open) => {
            let inner = s[open + 1..].strip_suffix(')')?;
            Some((&s[..open], Some(inner)))
        }
    }
}

fn parse_power(name: &str) -> Option<EasingFunction> {
    let rest = name.strip_prefix("power")?;
    let (degree, mode) = rest.split_once('.').unwrap_or((rest, "out"));
    let n: u8 = degree.parse().ok()?;
    if n == 0 {
        return Some(EasingFunction::Linear);
    }
    match mode {
        "in" => Some(EasingFunction::PowerIn(n)),
        "out" => Some(EasingFunction::PowerOut(n)),
        "inout" => Some(EasingFunction::PowerInOut(n)),
        _ => None,
    }
}

impl FromStr for EasingFunction {
    type Err = ScrollweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollweaveError::InvalidEasing(s.to_owned());
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let (name, args) = split_args(&normalized).ok_or_else(invalid)?;

        let easing = match (name, args) {
            ("linear" | "none", None) => EasingFunction::Linear,
            ("quad.in", None) => EasingFunction::QuadraticIn,
            ("quad.out", None) => EasingFunction::QuadraticOut,
            ("sqrt.out", None) => EasingFunction::SqrtOut,
            ("sine.inout", None) => EasingFunction::SineInOut,
            ("back.out", None) => EasingFunction::BackOut {
                overshoot: DEFAULT_OVERSHOOT,
            },
            ("back.out", Some(arg)) => EasingFunction::BackOut {
                overshoot: arg.parse().map_err(|_| invalid())?,
            },
            ("hermite", Some(arg)) => {
                let (c1, c2) = arg.split_once(',').ok_or_else(invalid)?;
                EasingFunction::CubicHermite {
                    c1: c1.parse().map_err(|_| invalid())?,
                    c2: c2.parse().map_err(|_| invalid())?,
                }
            }
            (other, None) => parse_power(other).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        Ok(easing)
    }
}

impl TryFrom<String> for EasingFunction {
    type Error = ScrollweaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EasingFunction> for String {
    fn from(easing: EasingFunction) -> Self {
        easing.to_string()
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::QuadraticIn => f.write_str("quad.in"),
            Self::QuadraticOut => f.write_str("quad.out"),
            Self::SqrtOut => f.write_str("sqrt.out"),
            Self::CubicHermite { c1, c2 } => write!(f, "hermite({c1},{c2})"),
            Self::PowerIn(n) => write!(f, "power{n}.in"),
            Self::PowerOut(n) => write!(f, "power{n}.out"),
            Self::PowerInOut(n) => write!(f, "power{n}.inOut"),
            Self::BackOut { overshoot } => write!(f, "back.out({overshoot})"),
            Self::SineInOut => f.write_str("sine.inOut"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingFunction; 10] = [
        EasingFunction::Linear,
        EasingFunction::QuadraticIn,
        EasingFunction::QuadraticOut,
        EasingFunction::SqrtOut,
        EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 },
        EasingFunction::PowerIn(2),
        EasingFunction::PowerOut(4),
        EasingFunction::PowerInOut(1),
        EasingFunction::BackOut { overshoot: 1.7 },
        EasingFunction::SineInOut,
    ];

    #[test]
    fn test_every_curve_hits_endpoints() {
        for easing in ALL {
            assert!(easing.evaluate(0.0).abs() < 1e-9, "{easing} at 0");
            assert!((easing.evaluate(1.0) - 1.0).abs() < 1e-9, "{easing} at 1");
        }
    }

    #[test]
    fn test_input_clamping() {
        let linear = EasingFunction::Linear;
        assert_eq!(linear.evaluate(-0.5), 0.0);
        assert_eq!(linear.evaluate(1.5), 1.0);

        let power = EasingFunction::PowerOut(4);
        assert_eq!(power.evaluate(-3.0), 0.0);
        assert!((power.evaluate(7.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_quadratic_in_out() {
        assert_eq!(EasingFunction::QuadraticIn.evaluate(0.5), 0.25);
        assert_eq!(EasingFunction::QuadraticOut.evaluate(0.5), 0.75);
    }

    #[test]
    fn test_power_out_is_front_loaded() {
        let ease = EasingFunction::PowerOut(4);
        assert!(ease.evaluate(0.25) > 0.25);
    }

    #[test]
    fn test_power_in_out_is_symmetric() {
        let ease = EasingFunction::PowerInOut(1);
        assert!((ease.evaluate(0.5) - 0.5).abs() < 1e-9);
        let a = ease.evaluate(0.2);
        let b = 1.0 - ease.evaluate(0.8);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_back_out_overshoots() {
        let ease = EasingFunction::BackOut { overshoot: 1.7 };
        let peak = (1..100)
            .map(|i| ease.evaluate(f64::from(i) / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0, "expected overshoot, peak was {peak}");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "power4.out".parse::<EasingFunction>().unwrap(),
            EasingFunction::PowerOut(4)
        );
        assert_eq!(
            "power1.inOut".parse::<EasingFunction>().unwrap(),
            EasingFunction::PowerInOut(1)
        );
        assert_eq!(
            "back.out(1.7)".parse::<EasingFunction>().unwrap(),
            EasingFunction::BackOut { overshoot: 1.7 }
        );
        assert_eq!(
            "power2".parse::<EasingFunction>().unwrap(),
            EasingFunction::PowerOut(2)
        );
        assert_eq!(
            "none".parse::<EasingFunction>().unwrap(),
            EasingFunction::Linear
        );
        assert!("bounce.out".parse::<EasingFunction>().is_err());
        assert!("back.out(x)".parse::<EasingFunction>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for easing in ALL {
            let parsed: EasingFunction = easing.to_string().parse().unwrap();
            assert_eq!(parsed, easing);
        }
    }

    #[test]
    fn test_default_is_power1_out() {
        assert_eq!(EasingFunction::default(), EasingFunction::PowerOut(1));
    }
}
