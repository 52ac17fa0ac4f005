#![forbid(unsafe_code)]

//! Row order and geometry as seen by the gesture engine.
//!
//! The engine never stores row positions across layout changes. It asks a
//! [`RowLayout`] for the current top-to-bottom order and bounds, and may
//! cache the answer only while [`RowLayout::generation`] stays the same.

use std::cell::{Cell, RefCell};

use rowdrag_core::geometry::RowBounds;
use serde::{Deserialize, Serialize};

/// Stable opaque identifier of a list row, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

/// One row of a layout snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSlot {
    pub id: RowId,
    pub bounds: RowBounds,
}

impl RowSlot {
    #[must_use]
    pub const fn new(id: RowId, bounds: RowBounds) -> Self {
        Self { id, bounds }
    }
}

/// Source of current row order and geometry.
pub trait RowLayout {
    /// Rows in current visual order, top to bottom.
    fn rows(&self) -> Vec<RowSlot>;

    /// Layout version, bumped on every confirmed layout change.
    ///
    /// `None` means the layout cannot tell, and callers must re-read
    /// [`rows`](RowLayout::rows) every time.
    fn generation(&self) -> Option<u64> {
        None
    }

    /// Current ordinal position of `id`.
    fn index_of(&self, id: RowId) -> Option<usize> {
        self.rows().iter().position(|slot| slot.id == id)
    }

    /// Current bounds of `id`.
    fn bounds_of(&self, id: RowId) -> Option<RowBounds> {
        self.rows()
            .into_iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.bounds)
    }
}

/// Rows stacked top to bottom without gaps, each with its own height.
///
/// Every mutation re-stacks the rows and bumps the generation.
#[derive(Debug, Default)]
pub struct StackLayout {
    top: f32,
    rows: RefCell<Vec<(RowId, f32)>>,
    generation: Cell<u64>,
}

impl StackLayout {
    /// Empty layout starting at `top`.
    #[must_use]
    pub fn new(top: f32) -> Self {
        Self {
            top,
            ..Self::default()
        }
    }

    /// `count` rows of equal `height`, with ids `0..count`.
    #[must_use]
    pub fn uniform(count: usize, height: f32) -> Self {
        let layout = Self::new(0.0);
        layout
            .rows
            .borrow_mut()
            .extend((0..count as u64).map(|i| (RowId(i), height)));
        layout
    }

    /// Append a row at the bottom.
    pub fn push(&self, id: RowId, height: f32) {
        self.rows.borrow_mut().push((id, height));
        self.bump();
    }

    /// Insert a row at `index` (clamped to the row count).
    pub fn insert(&self, index: usize, id: RowId, height: f32) {
        {
            let mut rows = self.rows.borrow_mut();
            let index = index.min(rows.len());
            rows.insert(index, (id, height));
        }
        self.bump();
    }

    /// Remove a row. Returns `false` if it was not present.
    pub fn remove(&self, id: RowId) -> bool {
        let removed = {
            let mut rows = self.rows.borrow_mut();
            let before = rows.len();
            rows.retain(|(row, _)| *row != id);
            rows.len() != before
        };
        if removed {
            self.bump();
        }
        removed
    }

    /// Change the height of a row. Returns `false` if it was not present.
    pub fn set_height(&self, id: RowId, height: f32) -> bool {
        let changed = {
            let mut rows = self.rows.borrow_mut();
            match rows.iter_mut().find(|(row, _)| *row == id) {
                Some(entry) => {
                    entry.1 = height;
                    true
                }
                None => false,
            }
        };
        if changed {
            self.bump();
        }
        changed
    }

    /// Replace the visual order, e.g. after the caller applied a reorder.
    pub fn reorder(&self, from: usize, to: usize) {
        {
            let mut rows = self.rows.borrow_mut();
            if from >= rows.len() || to >= rows.len() {
                return;
            }
            let row = rows.remove(from);
            rows.insert(to, row);
        }
        self.bump();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    fn bump(&self) {
        self.generation.set(self.generation.get() + 1);
    }
}

impl RowLayout for StackLayout {
    fn rows(&self) -> Vec<RowSlot> {
        let mut top = self.top;
        self.rows
            .borrow()
            .iter()
            .map(|&(id, height)| {
                let slot = RowSlot::new(id, RowBounds::new(top, height));
                top += height;
                slot
            })
            .collect()
    }

    fn generation(&self) -> Option<u64> {
        Some(self.generation.get())
    }
}
