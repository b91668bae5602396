//! Interrupt glue
//!
//! The timer interrupt has no arguments, so the scheduler lives in a
//! static [`SchedulerSlot`]:
//!
//! ```ignore
//! static DISPLAY: SchedulerSlot<BoardScheduler> = SchedulerSlot::new();
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn TIMER2_OVF() {
//!     DISPLAY.on_interrupt();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::PinBus;
use crate::framebuffer::PlaneSource;
use crate::scheduler::{Scheduler, TickTimer, Watchdog};

/// Anything that can run one interrupt tick
pub trait TickHandler {
    fn on_tick(&mut self);
}

impl<F, B, T, W> TickHandler for Scheduler<'_, F, B, T, W>
where
    F: PlaneSource + ?Sized,
    B: PinBus,
    T: TickTimer,
    W: Watchdog,
{
    #[inline]
    fn on_tick(&mut self) {
        self.tick();
    }
}

/// Interrupt-shared home of a tick handler
pub struct SchedulerSlot<S> {
    inner: Mutex<RefCell<Option<S>>>,
}

impl<S> SchedulerSlot<S> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install `handler`, returning the one it replaces.
    pub fn install(&self, handler: S) -> Option<S> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().replace(handler))
    }

    /// Remove the installed handler.
    pub fn take(&self) -> Option<S> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().take())
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().is_some())
    }

    /// Run `f` on the installed handler.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }
}

impl<S: TickHandler> SchedulerSlot<S> {
    /// Run one tick. Returns `false` when nothing is installed yet.
    pub fn on_interrupt(&self) -> bool {
        self.with(TickHandler::on_tick).is_some()
    }
}

impl<S> Default for SchedulerSlot<S> {
    fn default() -> Self {
        Self::new()
    }
}
