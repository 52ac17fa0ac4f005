#![forbid(unsafe_code)]

//! rowdrag public facade crate.
//!
//! Drag-to-reorder gestures for vertical lists: a press on a row's handle,
//! vertical travel past a threshold, a live candidate slot computed from row
//! midpoints, and a single `{from, to}` report when the pointer is released.
//! Rows are never moved; callers apply the delta to their own data.
//!
//! This crate re-exports the stable surface of the internal crates and
//! offers a small prelude.
//!
//! ```
//! use std::rc::Rc;
//! use rowdrag::prelude::*;
//!
//! let layout = Rc::new(StackLayout::uniform(4, 20.0));
//! let mut list = DraggableList::new(layout, DragConfig::default());
//! for i in 0..4u64 {
//!     list.add_row(RowId(i), DraggableHandle::new(Rect::new(0.0, i as f32 * 20.0, 16.0, 20.0)));
//! }
//!
//! let script = PointerScript::mouse().press(8.0, 10.0).drag_to(70.0, 4).release();
//! let outcome = script.events().iter().filter_map(|e| list.dispatch(e)).last();
//! assert_eq!(outcome, Some(DragOutcome::Reordered(ReorderResult::new(0, 3))));
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use rowdrag_core::event::{
    InputEvent, PointerButtons, PointerInput, PointerKey, PointerKind, PointerPhase, TouchInput,
    TouchPhase, TouchPoint,
};
pub use rowdrag_core::geometry::{GesturePoint, Rect, RowBounds};
pub use rowdrag_core::pointer_tracker::{EndReason, PointerTracker, TrackerEvent};
pub use rowdrag_core::script::{PointerScript, ScriptError};

#[cfg(feature = "tracing-json")]
pub use rowdrag_core::logging::init_json_subscriber;

// --- Widget re-exports -----------------------------------------------------

pub use rowdrag_widgets::{
    ACTIVATION_THRESHOLD, ConfigError, DragAnchor, DragConfig, DragGestureEngine, DragOutcome,
    DragState, DraggableHandle, DraggableList, ListDragLock, ReorderResult, RowAffordances,
    RowBinding, RowId, RowLayout, RowRoot, RowSlot, StackLayout, Travel, nearest_midpoint,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for rowdrag.
#[derive(Debug)]
pub enum Error {
    /// A `ROWDRAG_*` setting could not be parsed.
    Config(ConfigError),
    /// A recorded pointer script could not be read or written.
    Script(ScriptError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Script(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Script(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ScriptError> for Error {
    fn from(err: ScriptError) -> Self {
        Self::Script(err)
    }
}

/// Standard result type for rowdrag APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Load a [`DragConfig`] from the environment.
///
/// # Errors
///
/// Returns [`Error::Config`] when a `ROWDRAG_*` variable is set to an
/// unparseable value.
pub fn config_from_env() -> Result<DragConfig> {
    Ok(DragConfig::from_env()?)
}

/// Replay a JSON Lines recording into `list`, returning every gesture
/// outcome in order.
///
/// # Errors
///
/// Returns [`Error::Script`] if the recording cannot be decoded. Nothing is
/// dispatched in that case.
pub fn replay(list: &mut DraggableList, recording: &str) -> Result<Vec<DragOutcome>> {
    let script = PointerScript::from_json_lines(recording)?;
    Ok(script
        .events()
        .iter()
        .filter_map(|event| list.dispatch(event))
        .collect())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DragConfig, DragOutcome, DraggableHandle, DraggableList, EndReason, Error, GesturePoint,
        InputEvent, ListDragLock, PointerInput, PointerPhase, PointerScript, Rect, ReorderResult,
        Result, RowBinding, RowId, RowLayout, StackLayout,
    };

    pub use crate::{core, widgets};
}

pub use rowdrag_core as core;
pub use rowdrag_widgets as widgets;
