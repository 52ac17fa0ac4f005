#![forbid(unsafe_code)]

//! Core: geometry, raw pointer/touch input, and gesture tracking.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod pointer_tracker;
pub mod script;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace};
