#![forbid(unsafe_code)]

//! Logging shim.
//!
//! Gesture code logs through `crate::trace!`, `crate::debug!` and
//! `crate::debug_span!`. With the `tracing` feature these are the `tracing`
//! macros; without it they swallow their arguments and the span macro yields
//! an inert [`NoopSpan`], so call sites need no `cfg` of their own.
//!
//! Only the levels the gesture pipeline emits are provided. Downstream crates
//! that log more (the widgets crate warns on forced loss) depend on `tracing`
//! directly behind their own feature.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discards a trace-level event.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discards a debug-level event.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Yields an inert span.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in for `tracing::Span` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `tracing::Span::entered`; the guard does nothing on drop.
    #[must_use]
    pub fn entered(self) -> NoopSpan {
        self
    }
}

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// For embedders that want gesture logs in production without wiring their
/// own subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
}
