//! Crate-level error types.
//!
//! Only declarations and configuration can fail. Runtime conditions (anchors
//! not yet laid out, collapsed regions, events racing a teardown) are absorbed
//! by the pipeline and never surface here.

use std::fmt;

/// Errors produced by the scrollweave crate.
#[derive(Debug)]
pub enum ScrollweaveError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// TOML page declaration parsing failure.
    PageParse(String),
    /// A scroll offset expression could not be parsed.
    InvalidOffset(String),
    /// An easing name could not be parsed.
    InvalidEasing(String),
    /// A color literal could not be parsed.
    InvalidColor(String),
    /// A binding or pin names a region that was never defined.
    UnknownRegion(String),
    /// A binding or pin names a timeline that was never defined.
    UnknownTimeline(String),
    /// Two declarations share one identifier.
    DuplicateId(String),
    /// A tween declaration is malformed.
    InvalidTween {
        /// Timeline the tween belongs to.
        timeline: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The event host refused to attach a listener.
    Listener(String),
}

impl fmt::Display for ScrollweaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::PageParse(msg) => write!(f, "page parse error: {msg}"),
            Self::InvalidOffset(expr) => {
                write!(f, "invalid scroll offset: {expr:?}")
            }
            Self::InvalidEasing(name) => write!(f, "invalid easing: {name:?}"),
            Self::InvalidColor(lit) => write!(f, "invalid color: {lit:?}"),
            Self::UnknownRegion(id) => write!(f, "unknown region '{id}'"),
            Self::UnknownTimeline(id) => write!(f, "unknown timeline '{id}'"),
            Self::DuplicateId(id) => write!(f, "duplicate id '{id}'"),
            Self::InvalidTween { timeline, reason } => {
                write!(f, "invalid tween in timeline '{timeline}': {reason}")
            }
            Self::Listener(msg) => {
                write!(f, "failed to attach listener: {msg}")
            }
        }
    }
}

impl std::error::Error for ScrollweaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScrollweaveError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
