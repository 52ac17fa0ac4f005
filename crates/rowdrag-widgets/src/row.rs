#![forbid(unsafe_code)]

//! Per-row integration of handle, tracker and gesture engine.
//!
//! A [`RowBinding`] wires one row's [`DraggableHandle`] to its own
//! [`PointerTracker`] and [`DragGestureEngine`], and turns engine outcomes
//! into caller callbacks. It never moves the row: the caller receives a
//! [`ReorderResult`] and decides what to do with its own data.
//!
//! # Invariants
//!
//! 1. [`dragging`](RowBinding::dragging) is true exactly while the engine is
//!    `Dragging`.
//! 2. `on_drag_finish` runs synchronously inside the call that ended the
//!    gesture, at most once per gesture.
//! 3. Dropping a binding mid-gesture ends it with `Lost` before the binding
//!    is gone, so the list lock is never left raised.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use rowdrag_core::event::PointerInput;
use rowdrag_core::geometry::RowBounds;
use rowdrag_core::pointer_tracker::{EndReason, PointerTracker, TrackerEvent};

use crate::drag::{DragConfig, DragGestureEngine, DragOutcome, DragState, ReorderResult};
use crate::handle::DraggableHandle;
use crate::layout::{RowId, RowLayout};
use crate::lock::ListDragLock;

bitflags! {
    /// Interaction states a row may currently show.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RowAffordances: u8 {
        const HOVER     = 0b001;
        const ACTIVE    = 0b010;
        const CLICKABLE = 0b100;
    }
}

/// Reference to a row's rendered root, for geometry queries.
#[derive(Clone)]
pub struct RowRoot {
    id: RowId,
    layout: Rc<dyn RowLayout>,
}

impl RowRoot {
    #[must_use]
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Current bounds of the row, `None` once it left the layout.
    #[must_use]
    pub fn bounds(&self) -> Option<RowBounds> {
        self.layout.bounds_of(self.id)
    }

    /// Current ordinal position of the row.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.layout.index_of(self.id)
    }
}

impl fmt::Debug for RowRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowRoot").field("id", &self.id).finish()
    }
}

type FinishCallback = Box<dyn FnMut(ReorderResult)>;
type TapCallback = Box<dyn FnMut(RowId)>;

/// Drag-to-reorder glue for one list row.
pub struct RowBinding {
    id: RowId,
    handle: DraggableHandle,
    tracker: PointerTracker,
    engine: DragGestureEngine,
    root: RowRoot,
    disabled: bool,
    on_drag_finish: Option<FinishCallback>,
    on_tap: Option<TapCallback>,
}

impl RowBinding {
    /// Bind row `id` to its list's lock and layout.
    #[must_use]
    pub fn new(
        id: RowId,
        handle: DraggableHandle,
        lock: Rc<ListDragLock>,
        layout: Rc<dyn RowLayout>,
        config: DragConfig,
    ) -> Self {
        let root = RowRoot {
            id,
            layout: Rc::clone(&layout),
        };
        Self {
            id,
            handle,
            tracker: PointerTracker::new(),
            engine: DragGestureEngine::new(lock, layout, config),
            root,
            disabled: false,
            on_drag_finish: None,
            on_tap: None,
        }
    }

    /// Called with `{from, to}` whenever a drag of this row commits a move.
    #[must_use]
    pub fn on_drag_finish(mut self, f: impl FnMut(ReorderResult) + 'static) -> Self {
        self.on_drag_finish = Some(Box::new(f));
        self
    }

    /// Called when a press is released before it became a drag.
    #[must_use]
    pub fn on_tap(mut self, f: impl FnMut(RowId) + 'static) -> Self {
        self.on_tap = Some(Box::new(f));
        self
    }

    /// Disabled rows neither start drags nor accept clicks.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> RowId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether this row is being dragged right now.
    #[inline]
    #[must_use]
    pub fn dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    /// Whether a gesture (pending or dragging) is in progress on this row.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.tracker.is_tracking()
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        self.engine.state()
    }

    #[must_use]
    pub fn engine(&self) -> &DragGestureEngine {
        &self.engine
    }

    #[must_use]
    pub fn root(&self) -> &RowRoot {
        &self.root
    }

    #[must_use]
    pub fn handle(&self) -> &DraggableHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut DraggableHandle {
        &mut self.handle
    }

    /// Interaction states the row should render.
    ///
    /// Everything is suppressed while any row of the list drags, including
    /// this one. Disabled rows are never clickable.
    #[must_use]
    pub fn affordances(&self) -> RowAffordances {
        if self.engine.lock().is_raised() || self.dragging() {
            return RowAffordances::empty();
        }
        let mut affordances = RowAffordances::all();
        if self.disabled {
            affordances.remove(RowAffordances::CLICKABLE);
        }
        affordances
    }

    /// Per-row translations while this row drags (see
    /// [`DragGestureEngine::visual_offsets`]).
    pub fn visual_offsets(&mut self) -> Vec<f32> {
        self.engine.visual_offsets()
    }

    /// Offer a press to the row. Returns `true` if it started a gesture.
    pub fn pointer_down(&mut self, input: &PointerInput) -> bool {
        if self.disabled {
            return false;
        }
        match self.handle.pointer_down(&mut self.tracker, input) {
            Some(TrackerEvent::Start(origin)) => self.engine.begin(self.id, origin),
            _ => false,
        }
    }

    /// Feed a document-level event while this row holds capture.
    ///
    /// Returns the outcome when the event ended the gesture.
    pub fn pointer_event(&mut self, input: &PointerInput) -> Option<DragOutcome> {
        match self.tracker.handle(input)? {
            TrackerEvent::Start(_) => None,
            TrackerEvent::Move(point) => {
                self.engine.update(point);
                None
            }
            TrackerEvent::End { reason, .. } => Some(self.finish(reason)),
        }
    }

    /// End any gesture as `Lost`, as on unmount or capture revocation.
    pub fn lose(&mut self) -> DragOutcome {
        self.tracker.lose();
        self.finish(EndReason::Lost)
    }

    fn finish(&mut self, reason: EndReason) -> DragOutcome {
        let outcome = self.engine.end(reason);
        match outcome {
            DragOutcome::Reordered(result) => {
                if let Some(callback) = self.on_drag_finish.as_mut() {
                    callback(result);
                }
            }
            DragOutcome::Tap => {
                if let Some(callback) = self.on_tap.as_mut() {
                    callback(self.id);
                }
            }
            DragOutcome::Idle | DragOutcome::Unchanged | DragOutcome::Aborted => {}
        }
        outcome
    }
}

impl Drop for RowBinding {
    fn drop(&mut self) {
        if self.tracker.is_tracking() || !self.engine.state().is_idle() {
            #[cfg(feature = "tracing")]
            tracing::warn!(row = self.id.0, state = ?self.engine.state(), "row dropped mid-gesture, forcing loss");
            self.lose();
        }
    }
}

impl fmt::Debug for RowBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowBinding")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .field("tracker", &self.tracker)
            .field("engine", &self.engine)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StackLayout;
    use rowdrag_core::event::PointerPhase;
    use rowdrag_core::geometry::Rect;
    use std::cell::RefCell;

    struct Fixture {
        lock: Rc<ListDragLock>,
        layout: Rc<StackLayout>,
        finished: Rc<RefCell<Vec<ReorderResult>>>,
        taps: Rc<RefCell<Vec<RowId>>>,
    }

    fn fixture() -> Fixture {
        Fixture {
            lock: ListDragLock::shared(),
            layout: Rc::new(StackLayout::uniform(4, 20.0)),
            finished: Rc::default(),
            taps: Rc::default(),
        }
    }

    impl Fixture {
        fn row(&self, index: u64) -> RowBinding {
            let top = index as f32 * 20.0;
            let finished = Rc::clone(&self.finished);
            let taps = Rc::clone(&self.taps);
            RowBinding::new(
                RowId(index),
                DraggableHandle::new(Rect::new(0.0, top, 16.0, 20.0)),
                Rc::clone(&self.lock),
                self.layout.clone(),
                DragConfig::default(),
            )
            .on_drag_finish(move |r| finished.borrow_mut().push(r))
            .on_tap(move |id| taps.borrow_mut().push(id))
        }
    }

    fn input(phase: PointerPhase, y: f32) -> PointerInput {
        PointerInput::mouse(phase, 8.0, y)
    }

    #[test]
    fn drag_reports_result_once() {
        let fx = fixture();
        let mut row = fx.row(0);
        assert!(row.pointer_down(&input(PointerPhase::Down, 10.0)));
        assert!(!row.dragging());
        row.pointer_event(&input(PointerPhase::Move, 40.0));
        assert!(row.dragging());
        assert!(fx.lock.is_raised());
        row.pointer_event(&input(PointerPhase::Move, 70.0));
        let outcome = row.pointer_event(&input(PointerPhase::Up, 70.0));

        assert_eq!(outcome, Some(DragOutcome::Reordered(ReorderResult::new(0, 3))));
        assert_eq!(*fx.finished.borrow(), vec![ReorderResult::new(0, 3)]);
        assert!(!row.dragging());
        assert!(!fx.lock.is_raised());
        assert!(fx.taps.borrow().is_empty());
    }

    #[test]
    fn tap_fires_tap_not_finish() {
        let fx = fixture();
        let mut row = fx.row(1);
        row.pointer_down(&input(PointerPhase::Down, 30.0));
        row.pointer_event(&input(PointerPhase::Move, 33.0));
        assert_eq!(row.pointer_event(&input(PointerPhase::Up, 33.0)), Some(DragOutcome::Tap));
        assert_eq!(*fx.taps.borrow(), vec![RowId(1)]);
        assert!(fx.finished.borrow().is_empty());
    }

    #[test]
    fn drag_continues_outside_handle() {
        let fx = fixture();
        let mut row = fx.row(0);
        row.pointer_down(&input(PointerPhase::Down, 10.0));
        let far = PointerInput::mouse(PointerPhase::Move, 400.0, 50.0);
        row.pointer_event(&far);
        assert_eq!(row.engine().candidate_index(), Some(2));
    }

    #[test]
    fn disabled_row_does_not_start() {
        let fx = fixture();
        let mut row = fx.row(0).with_disabled(true);
        assert!(!row.pointer_down(&input(PointerPhase::Down, 10.0)));
        assert!(!row.is_active());
        assert!(!row.affordances().contains(RowAffordances::CLICKABLE));
        assert!(row.affordances().contains(RowAffordances::HOVER));
    }

    #[test]
    fn affordances_suppressed_while_lock_raised() {
        let fx = fixture();
        let mut dragged = fx.row(0);
        let sibling = fx.row(1);
        assert_eq!(sibling.affordances(), RowAffordances::all());

        dragged.pointer_down(&input(PointerPhase::Down, 10.0));
        assert_eq!(sibling.affordances(), RowAffordances::all());
        dragged.pointer_event(&input(PointerPhase::Move, 50.0));
        assert_eq!(sibling.affordances(), RowAffordances::empty());
        assert_eq!(dragged.affordances(), RowAffordances::empty());

        dragged.pointer_event(&input(PointerPhase::Up, 50.0));
        assert_eq!(sibling.affordances(), RowAffordances::all());
    }

    #[test]
    fn drop_mid_drag_lowers_lock() {
        let fx = fixture();
        let mut row = fx.row(0);
        row.pointer_down(&input(PointerPhase::Down, 10.0));
        row.pointer_event(&input(PointerPhase::Move, 70.0));
        assert!(fx.lock.is_raised());

        drop(row);
        assert!(!fx.lock.is_raised());
        assert!(fx.finished.borrow().is_empty());
    }

    #[test]
    fn lose_while_idle_is_idle() {
        let fx = fixture();
        let mut row = fx.row(2);
        assert_eq!(row.lose(), DragOutcome::Idle);
    }

    #[test]
    fn root_reads_live_geometry() {
        let fx = fixture();
        let row = fx.row(2);
        assert_eq!(row.root().index(), Some(2));
        assert_eq!(row.root().bounds(), Some(RowBounds::new(40.0, 20.0)));
        fx.layout.remove(RowId(0));
        assert_eq!(row.root().index(), Some(1));
        fx.layout.remove(RowId(2));
        assert_eq!(row.root().bounds(), None);
    }
}
