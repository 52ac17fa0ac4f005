#![forbid(unsafe_code)]

//! List-scoped "a row is being dragged" signal.
//!
//! One [`ListDragLock`] exists per list and is shared by every row through
//! `Rc`. The row whose engine enters `Dragging` raises it; the same engine
//! lowers it when it returns to `Idle`. Sibling rows read
//! [`is_raised`](ListDragLock::is_raised) to suppress their own hover/active
//! states and make their primary action non-clickable.
//!
//! # Invariants
//!
//! 1. `raise` and `lower` are idempotent.
//! 2. Reads are synchronous: a row observes a raise in the same turn it
//!    happened.
//! 3. The lock does not enforce exclusivity. At most one raiser per list is
//!    guaranteed by the gesture engine, which refuses to activate while the
//!    lock is already raised.

use std::cell::Cell;
use std::rc::Rc;

/// Shared boolean signal owned collectively by the rows of one list.
#[derive(Debug, Default)]
pub struct ListDragLock {
    raised: Cell<bool>,
    /// Diagnostic: number of lowered -> raised transitions.
    raises: Cell<u64>,
}

impl ListDragLock {
    /// Create a lowered lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lowered lock ready to be handed to rows.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Raise the lock. Returns `true` if it was lowered before.
    pub fn raise(&self) -> bool {
        let was_raised = self.raised.replace(true);
        if !was_raised {
            self.raises.set(self.raises.get() + 1);
        }
        !was_raised
    }

    /// Lower the lock. Returns `true` if it was raised before.
    pub fn lower(&self) -> bool {
        self.raised.replace(false)
    }

    /// Whether some row of the list is currently dragging.
    #[inline]
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.get()
    }

    /// Number of times the lock went from lowered to raised.
    #[inline]
    #[must_use]
    pub fn raise_count(&self) -> u64 {
        self.raises.get()
    }
}
