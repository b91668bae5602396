//! Single-slot mailbox for `no_std` environments.
//!
//! Hands a value from the main loop to the interrupt handler. Posting
//! replaces whatever is waiting, so the reader always sees the latest
//! value. Interrupt safe via critical sections.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::planner::TimingPlan;

/// Mailbox carrying recomputed timing plans to the scheduler
pub type PlanMailbox = Mailbox<TimingPlan>;

/// A single-slot, latest-wins mailbox.
pub struct Mailbox<T> {
    slot: Mutex<RefCell<Option<T>>>,
}

impl<T> Mailbox<T> {
    /// Create an empty mailbox.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Post `value`, returning the value it replaced if it was never taken.
    pub fn post(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.slot.borrow(cs).borrow_mut().replace(value))
    }

    /// Take the waiting value, if any.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.slot.borrow(cs).borrow_mut().take())
    }

    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).borrow().is_none())
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
