//! Interrupt-driven display scheduler.
//!
//! The scheduler walks the `(cycle, plane)` state machine, one step per
//! timer interrupt. Each step programs the timer with the plan slot of the
//! plane about to be shown, composes that plane, advances the state and
//! feeds the watchdog. The caller decides where ticks come from: a timer
//! interrupt on the target, a loop in tests.
//!
//! Slot lengths come from the static [`TimingPlan`], never from measured
//! time, so a late tick skews only the plane it delays.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::PinBus;
use crate::composer::Composer;
use crate::config::ConfigError;
use crate::framebuffer::PlaneSource;
use crate::mailbox::PlanMailbox;
use crate::planner::{PlanEntry, TimerFamily, TimingPlan};
use crate::topology::Topology;

/// Hardware timer that paces the scheduler
pub trait TickTimer {
    /// Divider set the timer implements; `None` runs any plan.
    const FAMILY: Option<TimerFamily>;

    /// Configure the timer and fire the first tick as soon as possible.
    ///
    /// `first` selects the divider the timer starts on.
    fn start(&mut self, first: PlanEntry);

    /// Set the length of the slot that begins with the current tick.
    fn program(&mut self, entry: PlanEntry);
}

/// Independent timer that resets the device unless fed
pub trait Watchdog {
    fn start(&mut self, timeout: Duration);

    fn feed(&mut self);
}

/// Position of the scheduler: drive cycle and plane slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerState {
    /// Drive cycle, `0..cycles`
    pub cycle: usize,
    /// Plane slot, `0..=planes`; `planes` is the off slot
    pub plane: usize,
}

impl SchedulerState {
    /// State at power-up
    pub const START: Self = Self { cycle: 0, plane: 0 };

    /// State after one tick with `planes` lit planes and `cycles` drive cycles
    pub const fn next(self, planes: usize, cycles: usize) -> Self {
        if self.plane < planes {
            return Self {
                cycle: self.cycle,
                plane: self.plane + 1,
            };
        }
        let cycle = self.cycle + 1;
        Self {
            cycle: if cycle >= cycles { 0 } else { cycle },
            plane: 0,
        }
    }

    /// Whether this state starts a new sweep over the matrix
    pub const fn is_sweep_start(self) -> bool {
        self.cycle == 0 && self.plane == 0
    }
}

/// Display scheduler
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = Scheduler::new(&LOL_SHIELD, &FRAMEBUFFER, plan, bus, timer, watchdog)?;
/// scheduler.start(Duration::from_millis(15));
///
/// // timer interrupt
/// scheduler.tick();
/// ```
pub struct Scheduler<'a, F, B, T, W>
where
    F: PlaneSource + ?Sized,
    B: PinBus,
    T: TickTimer,
    W: Watchdog,
{
    topology: &'a Topology,
    frame: &'a F,
    plan: TimingPlan,
    mailbox: Option<&'a PlanMailbox>,
    composer: Composer<B>,
    timer: T,
    watchdog: W,
    state: SchedulerState,
}

impl<'a, F, B, T, W> Scheduler<'a, F, B, T, W>
where
    F: PlaneSource + ?Sized,
    B: PinBus,
    T: TickTimer,
    W: Watchdog,
{
    /// Create a stopped scheduler at state `(0, 0)`.
    ///
    /// Fails when `plan` was computed for another plane count than `frame`
    /// holds, or for dividers `timer` does not have.
    pub fn new(
        topology: &'a Topology,
        frame: &'a F,
        plan: TimingPlan,
        bus: B,
        timer: T,
        watchdog: W,
    ) -> Result<Self, ConfigError> {
        if plan.planes() != frame.planes() {
            return Err(ConfigError::PlaneMismatch {
                plan: plan.planes(),
                framebuffer: frame.planes(),
            });
        }
        if let Some(supported) = T::FAMILY {
            let configured = plan.params().timer;
            if configured != supported {
                return Err(ConfigError::TimerMismatch {
                    configured,
                    supported,
                });
            }
        }

        Ok(Self {
            topology,
            frame,
            plan,
            mailbox: None,
            composer: Composer::new(bus),
            timer,
            watchdog,
            state: SchedulerState::START,
        })
    }

    /// Pick up plans posted to `mailbox` at sweep boundaries.
    #[must_use]
    pub fn with_mailbox(mut self, mailbox: &'a PlanMailbox) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    /// Arm the first tick and start the watchdog.
    pub fn start(&mut self, watchdog_timeout: Duration) {
        self.timer.start(self.slot(0));
        self.watchdog.start(watchdog_timeout);

        #[cfg(feature = "esp32-log")]
        println!(
            "[Scheduler.start] cycles={} planes={} watchdog={}us",
            self.topology.cycle_count(),
            self.plan.planes(),
            watchdog_timeout.as_micros()
        );
    }

    /// Run one step of the state machine and return the slot it programmed.
    ///
    /// Bounded and allocation free; safe to call from the timer interrupt.
    pub fn tick(&mut self) -> PlanEntry {
        if self.state.is_sweep_start() {
            self.adopt_posted_plan();
        }

        let SchedulerState { cycle, plane } = self.state;
        let entry = self.slot(plane);
        self.timer.program(entry);
        self.composer.compose(self.topology, cycle, plane, self.frame);

        self.state = self
            .state
            .next(self.plan.planes(), self.topology.cycle_count());
        self.watchdog.feed();

        entry
    }

    /// Swap in a plan waiting in the mailbox. A plan for a different plane
    /// count or timer cannot drive this display and is dropped.
    fn adopt_posted_plan(&mut self) {
        let Some(mailbox) = self.mailbox else {
            return;
        };
        if let Some(plan) = mailbox.take() {
            if plan.planes() == self.plan.planes()
                && plan.params().timer == self.plan.params().timer
            {
                self.plan = plan;
            }
        }
    }

    fn slot(&self, plane: usize) -> PlanEntry {
        self.plan
            .entry(plane)
            .unwrap_or_else(|| self.plan.off_entry())
    }

    /// State of the next tick
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Plan in effect
    pub const fn plan(&self) -> &TimingPlan {
        &self.plan
    }

    pub const fn topology(&self) -> &'a Topology {
        self.topology
    }

    pub const fn composer(&self) -> &Composer<B> {
        &self.composer
    }

    pub const fn bus(&self) -> &B {
        self.composer.bus()
    }

    pub const fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub const fn watchdog(&self) -> &W {
        &self.watchdog
    }

    pub fn watchdog_mut(&mut self) -> &mut W {
        &mut self.watchdog
    }
}
