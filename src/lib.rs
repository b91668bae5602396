#![no_std]

pub mod board;
pub mod canvas;
pub mod composer;
pub mod config;
pub mod display;
pub mod framebuffer;
pub mod gamma;
pub mod isr;
pub mod mailbox;
pub mod planner;
pub mod scheduler;
pub mod sim;
pub mod topology;

pub use canvas::Canvas;
pub use composer::Composer;
pub use config::{ConfigError, DisplayConfig, MAX_BRIGHTNESS};
pub use display::{FramebufferScheduler, Hardware, MatrixDisplay};
pub use framebuffer::{Framebuffer, PlaneSource, compute_line_bytes};
pub use isr::{SchedulerSlot, TickHandler};
pub use mailbox::{Mailbox, PlanMailbox};
pub use planner::{
    PlanEntry, PlanParams, Prescaler, PrescalerPair, TimerFamily, TimingPlan, compute_plan,
};
pub use scheduler::{Scheduler, SchedulerState, TickTimer, Watchdog};
pub use topology::{
    DriveCycle, LOL_SHIELD, LedTap, PinGroup, PinGroupSet, Topology, TopologyError,
};

pub use embassy_time::Duration;
pub use embedded_graphics::prelude::Point;

/// Pin-group capability of a matrix backend
///
/// Implement this trait to drive the matrix from different hardware.
/// The composer and scheduler are generic over it.
pub trait PinBus {
    /// Drive every pin of `group` high (current source)
    fn assert_high(&mut self, group: PinGroup);

    /// Drive every pin of `group` low (current sink)
    fn assert_low(&mut self, group: PinGroup);

    /// Return every pin of `group` to a pulled-up input
    fn release(&mut self, group: PinGroup);
}

impl<B: PinBus + ?Sized> PinBus for &mut B {
    fn assert_high(&mut self, group: PinGroup) {
        (**self).assert_high(group);
    }

    fn assert_low(&mut self, group: PinGroup) {
        (**self).assert_low(group);
    }

    fn release(&mut self, group: PinGroup) {
        (**self).release(group);
    }
}
