//! Brightness planner
//!
//! Turns the global brightness, plane count, frame rate and CPU clock into
//! a [`TimingPlan`]: one timer slot per plane plus a trailing "all off" slot.
//! Every drive cycle of the matrix replays the same plan.
//!
//! Lit planes run on the fine divider of the selected [`PrescalerPair`],
//! the off slot on the coarse one. A lit plane that outgrows the 8-bit
//! counter moves to the coarse divider.

mod prescaler;

use embassy_time::Duration;
use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

pub use prescaler::{
    MAX_CYCLE_TICKS, Prescaler, PrescalerPair, TimerFamily, band_cutoff, cycle_ticks,
};

use crate::config::{ConfigError, MAX_BRIGHTNESS};
use crate::gamma::{brightness_q10, gamma_q10};

/// Largest supported number of grayscale planes
pub const MAX_PLANES: usize = 16;

/// Plan slots: every plane plus the off interval
pub const MAX_SLOTS: usize = MAX_PLANES + 1;

/// Ticks the 8-bit counter can count before it overflows
pub const COUNTER_RANGE: u32 = 256;

/// One timer slot: which divider to run and for how many of its ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlanEntry {
    pub prescaler: Prescaler,
    /// Timer ticks, `1..=COUNTER_RANGE`
    pub ticks: u16,
}

impl PlanEntry {
    /// Counter value to load so the timer overflows after `ticks`
    #[allow(clippy::cast_possible_truncation)]
    pub const fn reload(self) -> u8 {
        (COUNTER_RANGE - self.ticks as u32) as u8
    }

    /// Slot length in CPU clock cycles
    pub const fn clock_cycles(self) -> u32 {
        self.ticks as u32 * self.prescaler.divisor()
    }

    /// Slot length in fine ticks of `pair`
    pub const fn fine_ticks(self, pair: PrescalerPair) -> u32 {
        (self.ticks as u32) << (self.prescaler.shift() - pair.fine.shift())
    }

    /// Wall-clock length of this slot at `clock_hz`
    pub fn duration(self, clock_hz: u32) -> Duration {
        clock_duration(u64::from(self.clock_cycles()), clock_hz)
    }
}

/// Inputs of the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanParams {
    /// Global brightness, 0-127
    pub brightness: u8,
    /// Number of grayscale planes (N)
    pub planes: usize,
    pub frame_rate_hz: u32,
    pub clock_hz: u32,
    /// Drive cycles per frame (C)
    pub cycles: usize,
    pub timer: TimerFamily,
}

/// Timer budget of one drive cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub prescalers: PrescalerPair,
    /// Coarse ticks in one drive cycle
    pub cycle_ticks: u32,
}

impl PlanParams {
    /// Validate the parameters and derive the cycle budget.
    ///
    /// Everything that can make a plan unrepresentable is decided here, so
    /// this runs in constant evaluation as well.
    pub const fn check(&self) -> Result<Budget, ConfigError> {
        if self.brightness > MAX_BRIGHTNESS {
            return Err(ConfigError::BrightnessOutOfRange(self.brightness));
        }
        if self.planes == 0 || self.planes > MAX_PLANES {
            return Err(ConfigError::InvalidPlaneCount(self.planes));
        }
        if self.cycles == 0 {
            return Err(ConfigError::NoCycles);
        }
        if self.frame_rate_hz == 0 || self.clock_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }

        let prescalers = match self.timer.select(self.clock_hz, self.frame_rate_hz, self.cycles) {
            Ok(prescalers) => prescalers,
            Err(err) => return Err(err),
        };
        let cycle_ticks = cycle_ticks(
            self.clock_hz,
            self.frame_rate_hz,
            self.cycles,
            prescalers.coarse,
        );
        let fine_budget = (cycle_ticks as u64) << prescalers.shift();
        if cycle_ticks == 0 || fine_budget < 2 * self.planes as u64 {
            return Err(ConfigError::ClockTooSlow { cycle_ticks });
        }

        Ok(Budget {
            prescalers,
            cycle_ticks,
        })
    }
}

/// Per-plane timer slots for one drive cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingPlan {
    entries: Vec<PlanEntry, MAX_SLOTS>,
    budget: Budget,
    params: PlanParams,
}

impl TimingPlan {
    /// Compute the plan for `params`.
    pub fn compute(params: &PlanParams) -> Result<Self, ConfigError> {
        let budget = params.check()?;
        let pair = budget.prescalers;
        let shift = pair.shift();

        let fine_budget = u64::from(budget.cycle_ticks) << shift;
        let scale = fine_budget * u64::from(brightness_q10(params.brightness));
        let threshold = |index: usize| -> u32 {
            let q10 = u64::from(gamma_q10(index, params.planes));
            #[allow(clippy::cast_possible_truncation)]
            let ticks = ((scale * q10 + (1 << 19)) >> 20) as u32;
            ticks
        };

        let mut entries = Vec::new();
        let mut lower = threshold(0);
        let mut previous = 0;
        let mut lit_fine = 0;
        for plane in 0..params.planes {
            let upper = threshold(plane + 1);
            let interval = upper.saturating_sub(lower).max(1).max(previous);
            lower = upper;

            let entry = fit(interval, pair).ok_or(ConfigError::DurationOverflow { slot: plane })?;
            previous = entry.fine_ticks(pair);
            lit_fine += previous;
            entries
                .push(entry)
                .map_err(|_| ConfigError::InvalidPlaneCount(params.planes))?;
        }

        let lit_coarse = (lit_fine + half(shift)) >> shift;
        let off = budget.cycle_ticks.saturating_sub(lit_coarse).max(1);
        if off > COUNTER_RANGE {
            return Err(ConfigError::DurationOverflow {
                slot: params.planes,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let off = PlanEntry {
            prescaler: pair.coarse,
            ticks: off as u16,
        };
        entries
            .push(off)
            .map_err(|_| ConfigError::InvalidPlaneCount(params.planes))?;

        #[cfg(feature = "esp32-log")]
        println!(
            "[TimingPlan.compute] brightness={} planes={} cycle_ticks={} fine={:?} coarse={:?}",
            params.brightness, params.planes, budget.cycle_ticks, pair.fine, pair.coarse
        );

        Ok(Self {
            entries,
            budget,
            params: *params,
        })
    }

    /// All slots, lit planes first, off slot last
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Slot for `plane`; `plane == planes()` is the off slot
    pub fn entry(&self, plane: usize) -> Option<PlanEntry> {
        self.entries.get(plane).copied()
    }

    /// Slot of the "all off" interval
    pub fn off_entry(&self) -> PlanEntry {
        self.entries[self.params.planes]
    }

    /// Number of lit planes (N)
    pub const fn planes(&self) -> usize {
        self.params.planes
    }

    pub const fn params(&self) -> &PlanParams {
        &self.params
    }

    pub const fn budget(&self) -> Budget {
        self.budget
    }

    /// Actual length of one drive cycle in CPU clock cycles
    pub fn cycle_clocks(&self) -> u32 {
        self.entries.iter().map(|entry| entry.clock_cycles()).sum()
    }

    /// Ideal length of one drive cycle in CPU clock cycles
    pub const fn target_cycle_clocks(&self) -> u32 {
        self.budget.cycle_ticks * self.budget.prescalers.coarse.divisor()
    }

    /// Clock cycles a pixel at `level` stays lit during one drive cycle
    pub fn lit_clocks(&self, level: usize) -> u32 {
        self.entries
            .iter()
            .take(level.min(self.params.planes))
            .map(|entry| entry.clock_cycles())
            .sum()
    }

    /// Clock cycles of a full sweep over all drive cycles
    pub fn sweep_clocks(&self) -> u64 {
        u64::from(self.cycle_clocks()) * self.params.cycles as u64
    }

    /// Wall-clock length of a full sweep
    pub fn period(&self) -> Duration {
        clock_duration(self.sweep_clocks(), self.params.clock_hz)
    }
}

/// Compute a timing plan, see [`TimingPlan::compute`].
pub fn compute_plan(params: &PlanParams) -> Result<TimingPlan, ConfigError> {
    TimingPlan::compute(params)
}

/// Place `fine_ticks` on the fine divider, or the coarse one when it
/// does not fit the counter.
fn fit(fine_ticks: u32, pair: PrescalerPair) -> Option<PlanEntry> {
    if fine_ticks <= COUNTER_RANGE {
        #[allow(clippy::cast_possible_truncation)]
        return Some(PlanEntry {
            prescaler: pair.fine,
            ticks: fine_ticks as u16,
        });
    }

    let shift = pair.shift();
    let coarse = ((fine_ticks + half(shift)) >> shift).max(1);
    #[allow(clippy::cast_possible_truncation)]
    (coarse <= COUNTER_RANGE).then_some(PlanEntry {
        prescaler: pair.coarse,
        ticks: coarse as u16,
    })
}

const fn half(shift: u32) -> u32 {
    if shift == 0 { 0 } else { 1 << (shift - 1) }
}

fn clock_duration(clocks: u64, clock_hz: u32) -> Duration {
    if clock_hz == 0 {
        return Duration::from_ticks(0);
    }
    Duration::from_micros(clocks * 1_000_000 / u64::from(clock_hz))
}
