//! In-memory hardware for tests and the desktop preview
//!
//! Every piece implements the same trait as its silicon counterpart, so
//! the scheduler and composer run unchanged against it.

use embassy_time::Duration;
use heapless::{Deque, Vec};

use crate::PinBus;
use crate::board::RegisterIo;
use crate::planner::{PlanEntry, TimerFamily};
use crate::scheduler::{TickTimer, Watchdog};
use crate::topology::{PinGroup, Topology};

/// Drive state of one pin group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PinState {
    /// Pulled-up input
    #[default]
    Released,
    /// Output low, sinking current
    Low,
    /// Output high, sourcing current
    High,
}

/// Tri-state pin groups with hazard counters
///
/// Counts every time a second sink goes low while another is still low,
/// and every time a source goes high with no sink to return through.
#[derive(Debug, Clone)]
pub struct SimulatedPins<const GROUPS: usize> {
    states: [PinState; GROUPS],
    double_sinks: usize,
    unsunk_sources: usize,
}

impl<const GROUPS: usize> SimulatedPins<GROUPS> {
    pub const fn new() -> Self {
        Self {
            states: [PinState::Released; GROUPS],
            double_sinks: 0,
            unsunk_sources: 0,
        }
    }

    pub fn state(&self, group: PinGroup) -> PinState {
        self.states
            .get(group.index())
            .copied()
            .unwrap_or_default()
    }

    pub fn states(&self) -> &[PinState; GROUPS] {
        &self.states
    }

    /// Groups currently low
    pub fn sinks(&self) -> usize {
        self.count(PinState::Low)
    }

    /// Groups currently high
    pub fn sources(&self) -> usize {
        self.count(PinState::High)
    }

    pub const fn double_sinks(&self) -> usize {
        self.double_sinks
    }

    pub const fn unsunk_sources(&self) -> usize {
        self.unsunk_sources
    }

    /// Whether the LED at `(x, y)` conducts: its sink low, its source high
    pub fn is_lit(&self, topology: &Topology, x: usize, y: usize) -> bool {
        topology
            .locate(x, y)
            .is_some_and(|(_, cycle, tap)| self.conducts(cycle.sink, tap.source))
    }

    /// Call `f` with the coordinates of every conducting LED
    pub fn for_each_lit(&self, topology: &Topology, mut f: impl FnMut(usize, usize)) {
        for cycle in topology.cycles {
            if self.state(cycle.sink) != PinState::Low {
                continue;
            }
            for tap in cycle.taps {
                if self.state(tap.source) == PinState::High {
                    f(usize::from(tap.x), usize::from(tap.y));
                }
            }
        }
    }

    fn conducts(&self, sink: PinGroup, source: PinGroup) -> bool {
        self.state(sink) == PinState::Low && self.state(source) == PinState::High
    }

    fn count(&self, state: PinState) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }

    fn set(&mut self, group: PinGroup, state: PinState) {
        if let Some(slot) = self.states.get_mut(group.index()) {
            *slot = state;
        }
    }
}

impl<const GROUPS: usize> PinBus for SimulatedPins<GROUPS> {
    fn assert_high(&mut self, group: PinGroup) {
        if self.sinks() == 0 {
            self.unsunk_sources += 1;
        }
        self.set(group, PinState::High);
    }

    fn assert_low(&mut self, group: PinGroup) {
        let others = self
            .states
            .iter()
            .enumerate()
            .any(|(index, state)| index != group.index() && *state == PinState::Low);
        if others {
            self.double_sinks += 1;
        }
        self.set(group, PinState::Low);
    }

    fn release(&mut self, group: PinGroup) {
        self.set(group, PinState::Released);
    }
}

impl<const GROUPS: usize> Default for SimulatedPins<GROUPS> {
    fn default() -> Self {
        Self::new()
    }
}

/// One call on a [`PinBus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    High(PinGroup),
    Low(PinGroup),
    Release(PinGroup),
}

/// [`PinBus`] that records up to `CAP` calls
#[derive(Debug, Clone, Default)]
pub struct RecordingBus<const CAP: usize> {
    events: Vec<PinEvent, CAP>,
    dropped: usize,
}

impl<const CAP: usize> RecordingBus<CAP> {
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            dropped: 0,
        }
    }

    pub fn events(&self) -> &[PinEvent] {
        &self.events
    }

    /// Calls that did not fit
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    fn push(&mut self, event: PinEvent) {
        if self.events.push(event).is_err() {
            self.dropped += 1;
        }
    }
}

impl<const CAP: usize> PinBus for RecordingBus<CAP> {
    fn assert_high(&mut self, group: PinGroup) {
        self.push(PinEvent::High(group));
    }

    fn assert_low(&mut self, group: PinGroup) {
        self.push(PinEvent::Low(group));
    }

    fn release(&mut self, group: PinGroup) {
        self.push(PinEvent::Release(group));
    }
}

/// [`TickTimer`] that remembers what it was told
#[derive(Debug, Clone, Copy, Default)]
pub struct SimTimer {
    started: Option<PlanEntry>,
    last: Option<PlanEntry>,
    programmed: usize,
}

impl SimTimer {
    pub const fn new() -> Self {
        Self {
            started: None,
            last: None,
            programmed: 0,
        }
    }

    /// Entry passed to [`TickTimer::start`]
    pub const fn started(&self) -> Option<PlanEntry> {
        self.started
    }

    /// Entry of the running slot
    pub const fn last(&self) -> Option<PlanEntry> {
        self.last
    }

    pub const fn programmed(&self) -> usize {
        self.programmed
    }
}

impl TickTimer for SimTimer {
    const FAMILY: Option<TimerFamily> = None;

    fn start(&mut self, first: PlanEntry) {
        self.started = Some(first);
    }

    fn program(&mut self, entry: PlanEntry) {
        self.last = Some(entry);
        self.programmed += 1;
    }
}

/// [`Watchdog`] with a manually advanced clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SimWatchdog {
    timeout: Option<Duration>,
    since_feed: Duration,
    feeds: usize,
    expired: bool,
}

impl SimWatchdog {
    pub const fn new() -> Self {
        Self {
            timeout: None,
            since_feed: Duration::from_ticks(0),
            feeds: 0,
            expired: false,
        }
    }

    /// Let `elapsed` pass; returns whether the watchdog has fired
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.since_feed += elapsed;
        if let Some(timeout) = self.timeout {
            if self.since_feed > timeout {
                self.expired = true;
            }
        }
        self.expired
    }

    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub const fn feeds(&self) -> usize {
        self.feeds
    }

    /// Whether the device would have been reset
    pub const fn expired(&self) -> bool {
        self.expired
    }
}

impl Watchdog for SimWatchdog {
    fn start(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
        self.since_feed = Duration::from_ticks(0);
    }

    fn feed(&mut self) {
        self.since_feed = Duration::from_ticks(0);
        self.feeds += 1;
    }
}

/// Size of the simulated data space, enough for every register in `board`
pub const DATA_SPACE: usize = 0x110;

/// Writes kept by [`MemoryIo`]
pub const WRITE_LOG: usize = 32;

/// One register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u16,
    pub value: u8,
}

/// [`RegisterIo`] over plain memory, keeping the latest writes
#[derive(Debug, Clone)]
pub struct MemoryIo {
    registers: [u8; DATA_SPACE],
    log: Deque<RegisterWrite, WRITE_LOG>,
}

impl MemoryIo {
    pub const fn new() -> Self {
        Self {
            registers: [0; DATA_SPACE],
            log: Deque::new(),
        }
    }

    /// Current value of a register; unmapped addresses read zero
    pub fn get(&self, address: u16) -> u8 {
        self.registers
            .get(usize::from(address))
            .copied()
            .unwrap_or(0)
    }

    /// Latest writes, oldest first
    pub fn writes(&self) -> impl Iterator<Item = &RegisterWrite> {
        self.log.iter()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl RegisterIo for MemoryIo {
    fn read(&mut self, address: u16) -> u8 {
        self.get(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        if let Some(register) = self.registers.get_mut(usize::from(address)) {
            *register = value;
        }
        if self.log.is_full() {
            self.log.pop_front();
        }
        let _ = self.log.push_back(RegisterWrite { address, value });
    }
}

impl Default for MemoryIo {
    fn default() -> Self {
        Self::new()
    }
}

/// Integrates how long every LED conducts
///
/// Call [`record`](Self::record) after each tick with the slot that tick
/// programmed; the pins then hold the state that lasts for that slot.
#[derive(Debug, Clone)]
pub struct OnTimeMeter<const WIDTH: usize, const HEIGHT: usize> {
    lit: [[u64; WIDTH]; HEIGHT],
    total: u64,
    cycles: usize,
}

impl<const WIDTH: usize, const HEIGHT: usize> OnTimeMeter<WIDTH, HEIGHT> {
    pub const fn new() -> Self {
        Self {
            lit: [[0; WIDTH]; HEIGHT],
            total: 0,
            cycles: 1,
        }
    }

    /// Account one slot of `entry` length for the current pin state
    pub fn record<const GROUPS: usize>(
        &mut self,
        pins: &SimulatedPins<GROUPS>,
        topology: &Topology,
        entry: PlanEntry,
    ) {
        let clocks = u64::from(entry.clock_cycles());
        self.total += clocks;
        self.cycles = topology.cycle_count().max(1);

        let lit = &mut self.lit;
        pins.for_each_lit(topology, |x, y| {
            if let Some(cell) = lit.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell += clocks;
            }
        });
    }

    /// Clock cycles `(x, y)` has been lit
    pub fn lit_clocks(&self, x: usize, y: usize) -> u64 {
        self.lit
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(0)
    }

    /// Clock cycles recorded in total
    pub const fn total_clocks(&self) -> u64 {
        self.total
    }

    /// Fraction of its own drive cycles that `(x, y)` was lit
    ///
    /// An LED can only conduct during one of the topology's cycles, so
    /// this is the plain on-time ratio scaled by the cycle count.
    #[allow(clippy::cast_precision_loss)]
    pub fn duty(&self, x: usize, y: usize) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.lit_clocks(x, y) * self.cycles as u64) as f32 / self.total as f32
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<const WIDTH: usize, const HEIGHT: usize> Default for OnTimeMeter<WIDTH, HEIGHT> {
    fn default() -> Self {
        Self::new()
    }
}
