#![forbid(unsafe_code)]

//! Drag-to-reorder widgets: list lock, gesture engine, handle and row glue.

pub mod drag;
pub mod handle;
pub mod layout;
pub mod list;
pub mod lock;
pub mod row;

pub use drag::{
    ACTIVATION_THRESHOLD, ConfigError, DragAnchor, DragConfig, DragGestureEngine, DragOutcome,
    DragState, ReorderResult, Travel, nearest_midpoint,
};
pub use handle::DraggableHandle;
pub use layout::{RowId, RowLayout, RowSlot, StackLayout};
pub use list::DraggableList;
pub use lock::ListDragLock;
pub use row::{RowAffordances, RowBinding, RowRoot};
