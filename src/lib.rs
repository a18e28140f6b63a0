// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Scroll-synchronized animation timeline orchestrator.
//!
//! Scrollweave maps the scroll position of a page onto declaratively
//! defined animation timelines: scrubbed parallax, one-shot reveals,
//! visibility-gated loops, pinned sections, and a single-slot notification.
//!
//! # Key entry points
//!
//! - [`lifecycle::LifecycleManager`] - mounts pages and dispatches events
//! - [`lifecycle::PageSpec`] - TOML page declaration (regions, timelines,
//!   bindings, pins)
//! - [`trigger::TriggerRegistry`] - region → timeline bindings and progress
//! - [`timeline::TimelineScheduler`] - scrub and time-driven playback
//! - [`options::Options`] - runtime configuration (timing, toast, pinning)
//!
//! # Architecture
//!
//! Every scroll or resize event takes one
//! [`viewport::ViewportMetrics`] snapshot from a
//! [`viewport::LayoutSource`], updates every binding and pin from it, and
//! only then writes values to a [`timeline::PropertySink`]. Frame events
//! advance time-driven timelines, smoothed scrubs and the notification
//! timer. The layout, the sink and event subscription
//! ([`lifecycle::EventHost`]) are traits, so the same pipeline runs against
//! the DOM (feature `web`) or a simulated page in tests and the replay
//! binary.

pub mod error;
pub mod lifecycle;
pub mod options;
pub mod pin;
pub mod timeline;
pub mod toast;
pub mod trigger;
pub mod util;
pub mod viewport;
#[cfg(feature = "web")]
pub mod web;

pub use error::ScrollweaveError;
pub use lifecycle::{ContextHandle, LifecycleManager, PageSpec, StageEvent};
pub use options::Options;
