#![forbid(unsafe_code)]

//! Drag-to-reorder gesture engine.
//!
//! [`DragGestureEngine`] is the per-row state machine behind a draggable list
//! row. It consumes the normalized gesture stream of a
//! [`PointerTracker`](rowdrag_core::pointer_tracker::PointerTracker), decides
//! when motion becomes a drag, converts vertical displacement into a
//! candidate row index, and reports a [`ReorderResult`] when the gesture
//! ends. It never moves rows itself.
//!
//! # Design
//!
//! ```text
//!            begin               |dy| >= threshold
//!   Idle ───────────▶ Pending ───────────────────▶ Dragging ──┐ update:
//!    ▲                  │                           │   ▲      │ recompute
//!    │     end (tap)    │              end          │   └──────┘ candidate
//!    └──────────────────┴───────────────────────────┘
//! ```
//!
//! Both indices are derived from geometry on every update, at `end`, and
//! when offsets are rendered: the dragged row's index is looked up by its
//! [`RowId`] and the candidate is the row midpoint nearest the probe
//! position. Nothing is accumulated, so rows inserted or removed mid-drag
//! cannot corrupt either.
//!
//! ## Invariants
//!
//! 1. Exactly one [`DragState`] per engine; only `begin`, `update` and `end`
//!    change it.
//! 2. The list lock is raised exactly while this engine is `Dragging`.
//! 3. A gesture that never left `Pending` emits nothing.
//! 4. `end` is idempotent: a second call while `Idle` returns
//!    [`DragOutcome::Idle`] and touches nothing.
//! 5. Activation is refused while the lock is already raised, so at most one
//!    row per list is `Dragging`.
//!
//! ## Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | `begin` while not `Idle` | Second press races the first | No-op |
//! | `end` while `Idle` | Duplicate terminal event | No-op |
//! | Lock already raised at threshold | Another row is dragging | Stay `Pending` |
//! | Row missing from layout at threshold | Unmounted between press and move | Stay `Pending` |
//! | Layout empty mid-drag | All rows removed | Keep last candidate |
//! | Dragged row missing from layout mid-drag | Layout updated before unmount | Keep last known index |
//! | Non-finite pointer sample | Host bug, bad recording | Sample ignored |
//! | Row unmounted mid-drag | Owner torn down | `end(Lost)`: lock lowered, nothing emitted |

use std::fmt;
use std::rc::Rc;

use rowdrag_core::geometry::GesturePoint;
use rowdrag_core::pointer_tracker::EndReason;
use serde::{Deserialize, Serialize};

use crate::layout::{RowId, RowLayout, RowSlot};
use crate::lock::ListDragLock;

// ---------------------------------------------------------------------------
// DragConfig
// ---------------------------------------------------------------------------

/// Default minimum vertical travel, in logical pixels, before a press
/// becomes a drag.
pub const ACTIVATION_THRESHOLD: f32 = 8.0;

/// Environment variable overriding [`DragConfig::activation_threshold`].
pub const ENV_ACTIVATION_THRESHOLD: &str = "ROWDRAG_ACTIVATION_THRESHOLD";
/// Environment variable overriding [`DragConfig::anchor`].
pub const ENV_ANCHOR: &str = "ROWDRAG_ANCHOR";
/// Environment variable overriding [`DragConfig::commit_on_cancel`].
pub const ENV_COMMIT_ON_CANCEL: &str = "ROWDRAG_COMMIT_ON_CANCEL";

/// Which vertical position is compared against row midpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragAnchor {
    /// The raw pointer `y`.
    #[default]
    Pointer,
    /// The dragged row's projected midpoint: its midpoint at activation
    /// plus the pointer's vertical displacement.
    RowCenter,
}

/// Configuration for drag gesture detection.
#[derive(Clone, Debug, PartialEq)]
pub struct DragConfig {
    /// Minimum vertical movement before a press becomes a drag
    /// (default: [`ACTIVATION_THRESHOLD`]). Horizontal movement never counts.
    pub activation_threshold: f32,
    /// Probe position used for the nearest-midpoint rule (default: pointer).
    pub anchor: DragAnchor,
    /// Whether a platform cancel still commits the reorder (default: false).
    pub commit_on_cancel: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_threshold: ACTIVATION_THRESHOLD,
            anchor: DragAnchor::Pointer,
            commit_on_cancel: false,
        }
    }
}

impl DragConfig {
    /// Set the activation threshold. Negative or non-finite values clamp to 0.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.activation_threshold = if threshold.is_finite() {
            threshold.max(0.0)
        } else {
            0.0
        };
        self
    }

    /// Set the probe anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: DragAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Commit the reorder when the platform cancels a drag.
    #[must_use]
    pub fn commit_on_cancel(mut self) -> Self {
        self.commit_on_cancel = true;
        self
    }

    /// Defaults overlaid with `ROWDRAG_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first variable that is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by the `ROWDRAG_*`
    /// variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first value that cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ACTIVATION_THRESHOLD) {
            let value = raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| ConfigError::invalid(ENV_ACTIVATION_THRESHOLD, &raw))?;
            config.activation_threshold = value;
        }

        if let Some(raw) = lookup(ENV_ANCHOR) {
            config.anchor = match raw.trim().to_ascii_lowercase().as_str() {
                "pointer" => DragAnchor::Pointer,
                "row-center" | "row_center" => DragAnchor::RowCenter,
                _ => return Err(ConfigError::invalid(ENV_ANCHOR, &raw)),
            };
        }

        if let Some(raw) = lookup(ENV_COMMIT_ON_CANCEL) {
            config.commit_on_cancel = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::invalid(ENV_COMMIT_ON_CANCEL, &raw)),
            };
        }

        Ok(config)
    }
}

/// A configuration value could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value as found.
        value: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// ReorderResult / DragOutcome
// ---------------------------------------------------------------------------

/// Logical reorder reported once per committed drag.
///
/// Rows are never moved by the engine; callers apply the delta to their own
/// data (see [`apply`](ReorderResult::apply)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReorderResult {
    pub from: usize,
    pub to: usize,
}

impl ReorderResult {
    #[must_use]
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Move `items[from]` to position `to`.
    ///
    /// Returns `false` (and leaves `items` untouched) when either index is
    /// out of range.
    pub fn apply<T>(&self, items: &mut Vec<T>) -> bool {
        if self.from >= items.len() || self.to >= items.len() {
            return false;
        }
        let item = items.remove(self.from);
        items.insert(self.to, item);
        true
    }
}

/// What [`DragGestureEngine::end`] concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// No gesture was active.
    Idle,
    /// Released before the threshold: a tap. Click handlers stay live.
    Tap,
    /// A drag was released over its own slot.
    Unchanged,
    /// A gesture ended without committing (cancelled or lost).
    Aborted,
    /// A drag committed a move.
    Reordered(ReorderResult),
}

impl DragOutcome {
    /// The reorder carried by this outcome, if any.
    #[must_use]
    pub fn reorder(&self) -> Option<ReorderResult> {
        match self {
            Self::Reordered(result) => Some(*result),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DragState
// ---------------------------------------------------------------------------

/// Gesture state of one row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    /// No active gesture.
    #[default]
    Idle,
    /// Pointer down on the handle, threshold not yet crossed.
    Pending { origin: GesturePoint, row: RowId },
    /// Threshold crossed; the lock is raised.
    Dragging {
        origin: GesturePoint,
        current: GesturePoint,
        row: RowId,
        /// Current layout index of the dragged row.
        from_index: usize,
        /// Index the row would land on if released now.
        candidate_index: usize,
    },
}

impl DragState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Row of the active gesture.
    #[must_use]
    pub fn row(&self) -> Option<RowId> {
        match self {
            Self::Idle => None,
            Self::Pending { row, .. } | Self::Dragging { row, .. } => Some(*row),
        }
    }
}

// ---------------------------------------------------------------------------
// Nearest-midpoint rule
// ---------------------------------------------------------------------------

/// Vertical direction of travel relative to the gesture origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Travel {
    Up,
    Down,
}

impl Travel {
    /// Direction of `dy` (downward when positive). Zero counts as up.
    #[must_use]
    pub fn from_dy(dy: f32) -> Self {
        if dy > 0.0 { Self::Down } else { Self::Up }
    }
}

/// Index of the midpoint nearest to `y`.
///
/// `midpoints` are in top-to-bottom order. When `y` is exactly equidistant
/// from two midpoints, the one in the direction of `travel` wins: the lower
/// row when moving down, the upper row when moving up. Returns `None` for an
/// empty slice.
#[must_use]
pub fn nearest_midpoint(midpoints: &[f32], y: f32, travel: Travel) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &mid) in midpoints.iter().enumerate() {
        let distance = (mid - y).abs();
        best = match best {
            None => Some((index, distance)),
            Some((_, d)) if distance < d => Some((index, distance)),
            Some((_, d)) if distance == d && travel == Travel::Down => Some((index, distance)),
            keep => keep,
        };
    }
    best.map(|(index, _)| index)
}

// ---------------------------------------------------------------------------
// DragGestureEngine
// ---------------------------------------------------------------------------

/// Geometry of the dragged row captured at activation.
#[derive(Clone, Copy, Debug)]
struct DraggedRow {
    mid_y: f32,
    height: f32,
}

/// Layout snapshot reused while the layout generation is unchanged.
#[derive(Debug, Default)]
struct GeometryCache {
    generation: Option<u64>,
    rows: Vec<RowSlot>,
    valid: bool,
}

/// Per-row drag-to-reorder state machine.
pub struct DragGestureEngine {
    config: DragConfig,
    state: DragState,
    lock: Rc<ListDragLock>,
    layout: Rc<dyn RowLayout>,
    cache: GeometryCache,
    dragged: Option<DraggedRow>,
    /// Diagnostic: activations refused (lock held elsewhere, row missing).
    refused: u64,
}

impl fmt::Debug for DragGestureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragGestureEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("lock", &self.lock)
            .field("layout", &"..")
            .field("refused", &self.refused)
            .finish()
    }
}

impl DragGestureEngine {
    /// Create an idle engine bound to a list's lock and layout.
    #[must_use]
    pub fn new(lock: Rc<ListDragLock>, layout: Rc<dyn RowLayout>, config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
            lock,
            layout,
            cache: GeometryCache::default(),
            dragged: None,
            refused: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    /// Candidate index while dragging.
    #[must_use]
    pub fn candidate_index(&self) -> Option<usize> {
        match self.state {
            DragState::Dragging {
                candidate_index, ..
            } => Some(candidate_index),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// The list lock this engine raises.
    #[inline]
    #[must_use]
    pub fn lock(&self) -> &Rc<ListDragLock> {
        &self.lock
    }

    /// Number of activations refused so far.
    #[inline]
    #[must_use]
    pub fn refused_count(&self) -> u64 {
        self.refused
    }

    /// Start a gesture on `row`. No-op (returns `false`) unless `Idle`.
    ///
    /// A non-finite origin is rejected the same way.
    pub fn begin(&mut self, row: RowId, origin: GesturePoint) -> bool {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("drag_gesture", op = "begin", row = row.0).entered();

        if !self.state.is_idle() {
            #[cfg(feature = "tracing")]
            tracing::trace!(state = ?self.state, "re-entrant begin ignored");
            return false;
        }
        if !origin.y.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::trace!(y = origin.y, "non-finite origin ignored");
            return false;
        }
        self.state = DragState::Pending { origin, row };
        #[cfg(feature = "tracing")]
        tracing::debug!(y = origin.y, "gesture pending");
        true
    }

    /// Feed a pointer sample.
    ///
    /// Returns `true` when the drag activated or its candidate index changed.
    /// Samples with a non-finite `y` are ignored.
    pub fn update(&mut self, point: GesturePoint) -> bool {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("drag_gesture", op = "update", y = point.y).entered();

        if !point.y.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::trace!(y = point.y, "non-finite sample ignored");
            return false;
        }
        match self.state {
            DragState::Idle => false,
            DragState::Pending { origin, row } => self.try_activate(origin, row, point),
            DragState::Dragging {
                origin,
                row,
                from_index,
                candidate_index,
                ..
            } => {
                self.state = DragState::Dragging {
                    origin,
                    current: point,
                    row,
                    from_index,
                    candidate_index,
                };
                self.refresh();
                self.candidate_index() != Some(candidate_index)
            }
        }
    }

    /// End the gesture and report what it amounted to.
    ///
    /// From `Dragging` the lock is lowered before returning. Only
    /// [`EndReason::Released`] commits (and [`EndReason::Cancelled`] when
    /// configured); a commit over the original slot is
    /// [`DragOutcome::Unchanged`].
    pub fn end(&mut self, reason: EndReason) -> DragOutcome {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("drag_gesture", op = "end", ?reason).entered();

        self.refresh();
        let state = std::mem::take(&mut self.state);
        let outcome = match state {
            DragState::Idle => return DragOutcome::Idle,
            DragState::Pending { .. } => match reason {
                EndReason::Released => DragOutcome::Tap,
                EndReason::Cancelled | EndReason::Lost => DragOutcome::Aborted,
            },
            DragState::Dragging {
                from_index,
                candidate_index,
                ..
            } => {
                self.lock.lower();
                let commit = match reason {
                    EndReason::Released => true,
                    EndReason::Cancelled => self.config.commit_on_cancel,
                    EndReason::Lost => false,
                };
                if !commit {
                    DragOutcome::Aborted
                } else if from_index == candidate_index {
                    DragOutcome::Unchanged
                } else {
                    DragOutcome::Reordered(ReorderResult::new(from_index, candidate_index))
                }
            }
        };
        self.dragged = None;
        self.cache.valid = false;
        #[cfg(feature = "tracing")]
        tracing::debug!(?outcome, "gesture ended");
        outcome
    }

    /// Per-row vertical translation to render while dragging.
    ///
    /// Indexed like the current layout. The dragged row follows the probe
    /// displacement; rows between the original slot and the candidate shift
    /// by the dragged row's height toward the vacated slot; all others (and
    /// every row while not dragging) get `0.0`.
    pub fn visual_offsets(&mut self) -> Vec<f32> {
        self.refresh();
        let DragState::Dragging {
            origin,
            current,
            from_index,
            candidate_index,
            ..
        } = self.state
        else {
            return vec![0.0; self.layout.rows().len()];
        };
        let height = self.dragged.map_or(0.0, |d| d.height);
        let dy = current.dy_from(&origin);
        let count = self.rows().len();
        (0..count)
            .map(|i| {
                if i == from_index {
                    dy
                } else if from_index < candidate_index && i > from_index && i <= candidate_index {
                    -height
                } else if candidate_index < from_index && i >= candidate_index && i < from_index {
                    height
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn try_activate(&mut self, origin: GesturePoint, row: RowId, point: GesturePoint) -> bool {
        let dy = point.dy_from(&origin);
        if dy.is_nan() || dy.abs() < self.config.activation_threshold {
            return false;
        }
        if self.lock.is_raised() {
            self.refused += 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(row = row.0, "activation refused: list lock held");
            return false;
        }
        let Some((from_index, bounds)) = self
            .rows()
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.id == row)
            .map(|(i, slot)| (i, slot.bounds))
        else {
            self.refused += 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(row = row.0, "activation refused: row not in layout");
            return false;
        };

        self.lock.raise();
        self.dragged = Some(DraggedRow {
            mid_y: bounds.mid_y(),
            height: bounds.height,
        });
        let candidate_index = self.candidate_for(origin, point).unwrap_or(from_index);
        self.state = DragState::Dragging {
            origin,
            current: point,
            row,
            from_index,
            candidate_index,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(row = row.0, from_index, candidate_index, "drag activated");
        true
    }

    /// Re-derive both indices of an active drag from the current layout.
    ///
    /// The dragged row keeps its last known index while it is missing from
    /// the layout, and the candidate keeps its value while the layout is
    /// empty.
    fn refresh(&mut self) {
        let DragState::Dragging {
            origin,
            current,
            row,
            from_index,
            candidate_index,
        } = self.state
        else {
            return;
        };
        let from = self
            .rows()
            .iter()
            .position(|slot| slot.id == row)
            .unwrap_or(from_index);
        let candidate = self.candidate_for(origin, current).unwrap_or(candidate_index);
        #[cfg(feature = "tracing")]
        if from != from_index {
            tracing::trace!(row = row.0, from_index, from, "dragged row moved in layout");
        }
        self.state = DragState::Dragging {
            origin,
            current,
            row,
            from_index: from,
            candidate_index: candidate,
        };
    }

    fn candidate_for(&mut self, origin: GesturePoint, point: GesturePoint) -> Option<usize> {
        let dy = point.dy_from(&origin);
        let probe = match (self.config.anchor, self.dragged) {
            (DragAnchor::RowCenter, Some(dragged)) => dragged.mid_y + dy,
            _ => point.y,
        };
        let midpoints: Vec<f32> = self.rows().iter().map(|s| s.bounds.mid_y()).collect();
        nearest_midpoint(&midpoints, probe, Travel::from_dy(dy))
    }

    /// Current layout rows, re-read whenever the generation moves (or always
    /// when the layout publishes none).
    fn rows(&mut self) -> &[RowSlot] {
        let generation = self.layout.generation();
        if !self.cache.valid || generation.is_none() || generation != self.cache.generation {
            self.cache.rows = self.layout.rows();
            self.cache.generation = generation;
            self.cache.valid = true;
        }
        &self.cache.rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
