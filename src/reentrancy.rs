//! Debug-only guard against nested calls into one dictionary.
//!
//! Dictionaries call user code (`Eq`, `Hash`, `Ord`) while their storage is
//! mid-update. A key whose comparison calls back into the same dictionary
//! would observe that state. Debug builds panic on such a call; release
//! builds compile the guard away.
//!
//! The guard shares the flag instead of borrowing the tracker, so a method
//! holding it can still call `&mut self` helpers on the owning dictionary.

use core::marker::PhantomData;
#[cfg(debug_assertions)]
use std::{cell::Cell, rc::Rc};

/// Embedded once per dictionary; every probing or mutating entry point
/// starts with `let _g = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Rc<Cell<bool>>,
    // Single-threaded containers: this marker makes the owner !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Rc::new(Cell::new(false)),
            _single_thread: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn enter(&self) -> OperationGuard {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrant call into a dictionary while another operation is in progress"
            );
            OperationGuard {
                active: Rc::clone(&self.active),
            }
        }

        #[cfg(not(debug_assertions))]
        {
            OperationGuard {}
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

// A cloned dictionary gets its own idle tracker.
impl Clone for DebugReentrancy {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Clears the flag on drop.
pub(crate) struct OperationGuard {
    #[cfg(debug_assertions)]
    active: Rc<Cell<bool>>,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.active.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sequential_operations_are_allowed() {
        let r = DebugReentrancy::new();
        {
            let _g = r.enter();
        }
        let _g = r.enter();
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_operation_panics_in_debug() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter();
            let _inner = r.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_operation_is_noop_in_release() {
        let r = DebugReentrancy::new();
        let _outer = r.enter();
        let _inner = r.enter();
    }

    #[test]
    fn clone_starts_idle() {
        let r = DebugReentrancy::new();
        let _g = r.enter();
        let c = r.clone();
        let _g2 = c.enter();
    }
}
