#![forbid(unsafe_code)]

//! Pointer capture and gesture stream normalization.
//!
//! [`PointerTracker`] turns raw [`PointerInput`] into a single continuous
//! stream of [`GesturePoint`]s framed by [`TrackerEvent::Start`] and exactly
//! one [`TrackerEvent::End`].
//!
//! # Invariants
//!
//! 1. A gesture is well-formed: one `Start`, zero or more `Move`, then one
//!    `End`.
//! 2. While a gesture is active, only events of the captured pointer are
//!    accepted; every accepted event yields exactly one `Move` or the
//!    terminal `End`.
//! 3. Capture is released unconditionally on `End`, whatever the reason.
//! 4. No event is produced while idle except `Start`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Second finger / pen lands mid-gesture | Multi-touch | Ignored |
//! | Duplicate `Down` from the captured pointer | Host replays the press | Delivered as `Move` |
//! | Capture revoked by the platform | Element removed, window blur | `End(Lost)` |
//! | Mouse moves with the primary button up | Host missed the `Up` | `End(Lost)` |
//! | Owner torn down mid-gesture | Row unmounted | [`PointerTracker::lose`] emits `End(Lost)` |

use crate::event::{PointerButtons, PointerInput, PointerKey, PointerKind, PointerPhase};
use crate::geometry::GesturePoint;

/// Why a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The pointer was lifted normally.
    Released,
    /// The platform cancelled the interaction (touchcancel, pointercancel).
    Cancelled,
    /// The pointer or its owner went away without a terminal event.
    Lost,
}

/// Normalized gesture event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerEvent {
    Start(GesturePoint),
    Move(GesturePoint),
    End {
        reason: EndReason,
        /// Last known position of the pointer.
        last: GesturePoint,
    },
}

impl TrackerEvent {
    /// Position carried by the event.
    #[must_use]
    pub fn point(&self) -> GesturePoint {
        match *self {
            Self::Start(p) | Self::Move(p) => p,
            Self::End { last, .. } => last,
        }
    }
}

/// Exclusive capture of one pointer for the duration of a gesture.
#[derive(Debug, Default)]
pub struct PointerTracker {
    capture: Option<PointerKey>,
    last: Option<GesturePoint>,
    /// Diagnostic: events dropped because they belonged to another pointer.
    ignored: u64,
}

impl PointerTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is active.
    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.capture.is_some()
    }

    /// The pointer currently captured, if any.
    #[inline]
    #[must_use]
    pub fn captured(&self) -> Option<PointerKey> {
        self.capture
    }

    /// Last accepted position of the active gesture.
    #[inline]
    #[must_use]
    pub fn last_point(&self) -> Option<GesturePoint> {
        self.last
    }

    /// Number of events ignored because another pointer held capture.
    #[inline]
    #[must_use]
    pub fn ignored_count(&self) -> u64 {
        self.ignored
    }

    /// Begin a gesture from a pointer-down and capture that pointer.
    ///
    /// Returns `None` (and changes nothing) when a gesture is already active
    /// or the event cannot originate a gesture (not a primary press).
    pub fn start(&mut self, input: &PointerInput) -> Option<TrackerEvent> {
        if self.capture.is_some() {
            self.ignored += 1;
            crate::trace!(id = input.id, "pointer down ignored: capture held");
            return None;
        }
        if !input.can_start_gesture() {
            crate::trace!(id = input.id, kind = ?input.kind, "pointer down cannot start gesture");
            return None;
        }
        let point = sample(input);
        self.capture = Some(input.key());
        self.last = Some(point);
        crate::debug!(id = input.id, kind = ?input.kind, y = point.y, "pointer captured");
        Some(TrackerEvent::Start(point))
    }

    /// Feed a document-level event.
    ///
    /// Only events of the captured pointer are accepted; everything else
    /// (including any event while idle) is ignored.
    pub fn handle(&mut self, input: &PointerInput) -> Option<TrackerEvent> {
        let captured = self.capture?;
        if input.key() != captured {
            self.ignored += 1;
            crate::trace!(id = input.id, kind = ?input.kind, "event from uncaptured pointer ignored");
            return None;
        }
        let point = sample(input);
        match input.phase {
            PointerPhase::Move if input.kind == PointerKind::Mouse
                && !input.buttons.contains(PointerButtons::PRIMARY) =>
            {
                crate::trace!(id = input.id, "mouse moved without primary button");
                Some(self.finish(EndReason::Lost, point))
            }
            PointerPhase::Down | PointerPhase::Move => {
                self.last = Some(point);
                Some(TrackerEvent::Move(point))
            }
            PointerPhase::Up => Some(self.finish(EndReason::Released, point)),
            PointerPhase::Cancel => Some(self.finish(EndReason::Cancelled, point)),
            PointerPhase::CaptureLost => Some(self.finish(EndReason::Lost, point)),
        }
    }

    /// Force the active gesture to end with [`EndReason::Lost`].
    ///
    /// Used by owners that are torn down mid-gesture. No-op while idle.
    pub fn lose(&mut self) -> Option<TrackerEvent> {
        self.capture?;
        let last = self.last.unwrap_or_default();
        Some(self.finish(EndReason::Lost, last))
    }

    fn finish(&mut self, reason: EndReason, point: GesturePoint) -> TrackerEvent {
        self.capture = None;
        self.last = None;
        crate::debug!(?reason, y = point.y, "pointer capture released");
        TrackerEvent::End {
            reason,
            last: point,
        }
    }
}

fn sample(input: &PointerInput) -> GesturePoint {
    GesturePoint::new(input.x, input.y, input.timestamp_ms)
}
