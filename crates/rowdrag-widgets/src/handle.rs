#![forbid(unsafe_code)]

//! Grab handle that originates pointer capture for one row.

use rowdrag_core::event::PointerInput;
use rowdrag_core::geometry::Rect;
use rowdrag_core::pointer_tracker::{PointerTracker, TrackerEvent};

/// Fixed-size interactive affordance bound 1:1 to a row.
///
/// Only the press has to land inside the handle. Everything after it is
/// tracked at list level, so the drag continues once the pointer leaves
/// [`bounds`](Self::bounds). Where the handle sits in the row (leading or
/// trailing edge) is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DraggableHandle {
    bounds: Rect,
    enabled: bool,
    label: Option<String>,
}

impl DraggableHandle {
    /// An enabled handle covering `bounds`.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            enabled: true,
            label: None,
        }
    }

    /// Set whether presses on the handle start gestures.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Accessible label, e.g. "Reorder".
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Move the handle, e.g. after the host laid the row out again.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether a press at `(x, y)` belongs to this handle.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32) -> bool {
        self.enabled && self.bounds.contains(x, y)
    }

    /// Forward a press to `tracker` if it lands on the handle.
    ///
    /// Returns the tracker's `Start` event, or `None` when the press missed,
    /// the handle is disabled, or the tracker refused it.
    pub fn pointer_down(
        &self,
        tracker: &mut PointerTracker,
        input: &PointerInput,
    ) -> Option<TrackerEvent> {
        if !self.hit_test(input.x, input.y) {
            return None;
        }
        tracker.start(input)
    }
}
