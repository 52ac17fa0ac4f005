#![forbid(unsafe_code)]

//! Event router for one reorderable list.
//!
//! [`DraggableList`] owns the list's [`ListDragLock`], its layout and one
//! [`RowBinding`] per row. A press goes to the row whose handle it hits;
//! every later event goes to the row holding capture, wherever the pointer
//! is. Bindings stay in mount order: a committed drag is reported to the
//! row's callback and nothing here moves.
//!
//! # Invariants
//!
//! 1. At most one row is active (pending or dragging) at a time.
//! 2. `dragging_count()` is 0 or 1.
//! 3. Removing the active row ends its gesture as `Lost` before returning.

use std::fmt;
use std::rc::Rc;

use rowdrag_core::event::{InputEvent, PointerInput, PointerPhase};

use crate::drag::{DragConfig, DragOutcome};
use crate::handle::DraggableHandle;
use crate::layout::{RowId, RowLayout};
use crate::lock::ListDragLock;
use crate::row::RowBinding;

/// Rows of one list sharing a lock and a layout.
pub struct DraggableList {
    lock: Rc<ListDragLock>,
    layout: Rc<dyn RowLayout>,
    config: DragConfig,
    rows: Vec<RowBinding>,
    active: Option<RowId>,
}

impl DraggableList {
    /// Empty list over `layout`.
    #[must_use]
    pub fn new(layout: Rc<dyn RowLayout>, config: DragConfig) -> Self {
        Self {
            lock: ListDragLock::shared(),
            layout,
            config,
            rows: Vec::new(),
            active: None,
        }
    }

    #[must_use]
    pub fn lock(&self) -> &Rc<ListDragLock> {
        &self.lock
    }

    #[must_use]
    pub fn layout(&self) -> &Rc<dyn RowLayout> {
        &self.layout
    }

    #[must_use]
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Mount a row and return its binding for further configuration.
    ///
    /// A row already mounted under `id` is removed first.
    pub fn add_row(&mut self, id: RowId, handle: DraggableHandle) -> &mut RowBinding {
        self.remove_row(id);
        let binding = RowBinding::new(
            id,
            handle,
            Rc::clone(&self.lock),
            Rc::clone(&self.layout),
            self.config.clone(),
        );
        let index = self.rows.len();
        self.rows.push(binding);
        &mut self.rows[index]
    }

    /// Mount a pre-built binding.
    ///
    /// Returns `false` (dropping the binding) when it was built against
    /// another list's lock.
    pub fn push_row(&mut self, binding: RowBinding) -> bool {
        if !Rc::ptr_eq(binding.engine().lock(), &self.lock) {
            return false;
        }
        self.remove_row(binding.id());
        self.rows.push(binding);
        true
    }

    /// Unmount a row. An active gesture on it ends as `Lost`.
    ///
    /// Returns `false` if no row was mounted under `id`.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        let Some(index) = self.rows.iter().position(|row| row.id() == id) else {
            return false;
        };
        if self.active == Some(id) {
            self.active = None;
        }
        drop(self.rows.remove(index));
        true
    }

    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&RowBinding> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut RowBinding> {
        self.rows.iter_mut().find(|row| row.id() == id)
    }

    /// Bindings in mount order.
    #[must_use]
    pub fn rows(&self) -> &[RowBinding] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with a gesture in progress.
    #[must_use]
    pub fn active_row(&self) -> Option<RowId> {
        self.active
    }

    /// Number of rows currently dragging.
    #[must_use]
    pub fn dragging_count(&self) -> usize {
        self.rows.iter().filter(|row| row.dragging()).count()
    }

    /// Route a host event. Returns the last gesture outcome it produced.
    pub fn dispatch(&mut self, event: &InputEvent) -> Option<DragOutcome> {
        let mut outcome = None;
        for input in event.pointer_inputs() {
            if let Some(o) = self.dispatch_pointer(&input) {
                outcome = Some(o);
            }
        }
        outcome
    }

    /// Route a single pointer event.
    pub fn dispatch_pointer(&mut self, input: &PointerInput) -> Option<DragOutcome> {
        if let Some(active) = self.active {
            let Some(row) = self.rows.iter_mut().find(|row| row.id() == active) else {
                self.active = None;
                return None;
            };
            let outcome = row.pointer_event(input);
            if !row.is_active() {
                self.active = None;
            }
            return outcome;
        }

        if input.phase != PointerPhase::Down {
            return None;
        }
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.handle().hit_test(input.x, input.y))?;
        if row.pointer_down(input) {
            self.active = Some(row.id());
        }
        None
    }

    /// Per-row translations in layout order; all zero while nothing drags.
    pub fn visual_offsets(&mut self) -> Vec<f32> {
        match self.active.and_then(|id| self.rows.iter_mut().find(|row| row.id() == id)) {
            Some(row) => row.visual_offsets(),
            None => vec![0.0; self.layout.rows().len()],
        }
    }
}

impl fmt::Debug for DraggableList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraggableList")
            .field("lock", &self.lock)
            .field("config", &self.config)
            .field("rows", &self.rows)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::ReorderResult;
    use crate::layout::StackLayout;
    use rowdrag_core::geometry::Rect;

    fn list(count: u64) -> (DraggableList, Rc<StackLayout>) {
        let layout = Rc::new(StackLayout::uniform(count as usize, 20.0));
        let mut list = DraggableList::new(layout.clone(), DragConfig::default());
        for i in 0..count {
            list.add_row(RowId(i), DraggableHandle::new(Rect::new(0.0, i as f32 * 20.0, 16.0, 20.0)));
        }
        (list, layout)
    }

    fn mouse(phase: PointerPhase, y: f32) -> PointerInput {
        PointerInput::mouse(phase, 8.0, y)
    }

    #[test]
    fn press_routes_to_hit_row() {
        let (mut list, _) = list(4);
        list.dispatch_pointer(&mouse(PointerPhase::Down, 45.0));
        assert_eq!(list.active_row(), Some(RowId(2)));
    }

    #[test]
    fn press_outside_handles_does_nothing() {
        let (mut list, _) = list(4);
        list.dispatch_pointer(&PointerInput::mouse(PointerPhase::Down, 100.0, 45.0));
        assert_eq!(list.active_row(), None);
    }

    #[test]
    fn moves_follow_capture() {
        let (mut list, _) = list(4);
        list.dispatch_pointer(&mouse(PointerPhase::Down, 10.0));
        list.dispatch_pointer(&PointerInput::mouse(PointerPhase::Move, 300.0, 70.0));
        assert_eq!(list.dragging_count(), 1);
        let outcome = list.dispatch_pointer(&PointerInput::mouse(PointerPhase::Up, 300.0, 70.0));
        assert_eq!(outcome.and_then(|o| o.reorder()), Some(ReorderResult::new(0, 3)));
        assert_eq!(list.active_row(), None);
        assert_eq!(list.dragging_count(), 0);
    }

    #[test]
    fn rows_keep_mount_order_after_reorder() {
        let (mut list, _) = list(3);
        list.dispatch_pointer(&mouse(PointerPhase::Down, 10.0));
        list.dispatch_pointer(&mouse(PointerPhase::Move, 50.0));
        list.dispatch_pointer(&mouse(PointerPhase::Up, 50.0));
        let ids: Vec<u64> = list.rows().iter().map(|r| r.id().0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn remove_active_row_releases_lock() {
        let (mut list, _) = list(4);
        list.dispatch_pointer(&mouse(PointerPhase::Down, 10.0));
        list.dispatch_pointer(&mouse(PointerPhase::Move, 60.0));
        assert!(list.lock().is_raised());

        assert!(list.remove_row(RowId(0)));
        assert!(!list.lock().is_raised());
        assert_eq!(list.active_row(), None);
        assert!(!list.remove_row(RowId(0)));
    }

    #[test]
    fn add_row_replaces_existing_id() {
        let (mut list, _) = list(2);
        list.add_row(RowId(1), DraggableHandle::new(Rect::new(0.0, 100.0, 16.0, 20.0)));
        assert_eq!(list.len(), 2);
        assert!(list.row(RowId(1)).is_some_and(|r| r.handle().bounds().y == 100.0));
    }

    #[test]
    fn push_row_rejects_foreign_lock() {
        let (mut list, layout) = list(1);
        let foreign = RowBinding::new(
            RowId(5),
            DraggableHandle::new(Rect::new(0.0, 20.0, 16.0, 20.0)),
            ListDragLock::shared(),
            layout.clone(),
            DragConfig::default(),
        );
        assert!(!list.push_row(foreign));

        let own = RowBinding::new(
            RowId(5),
            DraggableHandle::new(Rect::new(0.0, 20.0, 16.0, 20.0)),
            Rc::clone(list.lock()),
            layout,
            DragConfig::default(),
        );
        assert!(list.push_row(own));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn visual_offsets_follow_active_row() {
        let (mut list, _) = list(4);
        assert_eq!(list.visual_offsets(), vec![0.0; 4]);
        list.dispatch_pointer(&mouse(PointerPhase::Down, 70.0));
        list.dispatch_pointer(&mouse(PointerPhase::Move, 30.0));
        assert_eq!(list.visual_offsets(), vec![0.0, 20.0, 20.0, -40.0]);
    }
}
