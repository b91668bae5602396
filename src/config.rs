//! Build-time display configuration
//!
//! Everything here is fixed per firmware image. [`DisplayConfig::validated`]
//! lets a board crate reject a bad combination while compiling:
//!
//! ```ignore
//! const CONFIG: DisplayConfig = DisplayConfig {
//!     frame_rate_hz: 80,
//!     ..DisplayConfig::DEFAULT
//! }
//! .validated(PLANES, LOL_SHIELD.cycle_count());
//! ```

use core::fmt;

use embassy_time::Duration;

use crate::planner::{PlanParams, TimerFamily};
use crate::topology::TopologyError;

/// Highest global brightness
pub const MAX_BRIGHTNESS: u8 = 127;

/// Why a configuration cannot drive the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Global brightness above [`MAX_BRIGHTNESS`]
    BrightnessOutOfRange(u8),
    /// Plane count is zero or above [`crate::planner::MAX_PLANES`]
    InvalidPlaneCount(usize),
    /// The topology has no drive cycles
    NoCycles,
    /// Frame rate or clock frequency is zero
    ZeroFrequency,
    /// Even the coarsest divider cannot slow the timer down enough
    FrameRateTooLow { clock_hz: u32, frame_rate_hz: u32 },
    /// Not enough timer ticks per drive cycle to show every plane
    ClockTooSlow { cycle_ticks: u32 },
    /// A slot does not fit the counter with either divider
    DurationOverflow { slot: usize },
    /// One drive cycle outlasts the watchdog timeout
    WatchdogTooShort { cycle_clocks: u32 },
    /// The board timer lacks the dividers of the configured family
    TimerMismatch {
        configured: TimerFamily,
        supported: TimerFamily,
    },
    /// Plan and framebuffer disagree on the plane count
    PlaneMismatch { plan: usize, framebuffer: usize },
    /// Framebuffer and topology disagree on the matrix size
    DimensionMismatch,
    Topology(TopologyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrightnessOutOfRange(brightness) => {
                write!(f, "brightness {brightness} is above {MAX_BRIGHTNESS}")
            }
            Self::InvalidPlaneCount(planes) => write!(f, "unsupported plane count {planes}"),
            Self::NoCycles => f.write_str("topology has no drive cycles"),
            Self::ZeroFrequency => f.write_str("frame rate and clock must be non-zero"),
            Self::FrameRateTooLow {
                clock_hz,
                frame_rate_hz,
            } => write!(
                f,
                "frame rate {frame_rate_hz} Hz is too low for a {clock_hz} Hz clock"
            ),
            Self::ClockTooSlow { cycle_ticks } => {
                write!(f, "only {cycle_ticks} timer ticks per drive cycle")
            }
            Self::DurationOverflow { slot } => {
                write!(f, "slot {slot} does not fit the timer counter")
            }
            Self::WatchdogTooShort { cycle_clocks } => {
                write!(f, "a {cycle_clocks}-clock drive cycle outlasts the watchdog")
            }
            Self::TimerMismatch {
                configured,
                supported,
            } => write!(
                f,
                "configured for {configured:?} but the board timer is {supported:?}"
            ),
            Self::PlaneMismatch { plan, framebuffer } => write!(
                f,
                "plan has {plan} planes, framebuffer has {framebuffer}"
            ),
            Self::DimensionMismatch => f.write_str("framebuffer does not match the topology"),
            Self::Topology(err) => write!(f, "invalid topology: {err}"),
        }
    }
}

impl From<TopologyError> for ConfigError {
    fn from(err: TopologyError) -> Self {
        Self::Topology(err)
    }
}

/// Display configuration, fixed per image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Global brightness, 0-127
    pub brightness: u8,
    /// Full sweeps over the matrix per second
    pub frame_rate_hz: u32,
    /// CPU clock frequency
    pub clock_hz: u32,
    /// Timer that paces the display
    pub timer: TimerFamily,
    /// Watchdog timeout; must exceed one drive cycle
    pub watchdog_timeout: Duration,
}

impl DisplayConfig {
    /// Full brightness, 80 Hz on a 16 MHz ATmega328P with a 15 ms watchdog
    pub const DEFAULT: Self = Self {
        brightness: MAX_BRIGHTNESS,
        frame_rate_hz: 80,
        clock_hz: 16_000_000,
        timer: TimerFamily::Timer2,
        watchdog_timeout: Duration::from_millis(15),
    };

    /// Planner inputs for a matrix with `planes` planes and `cycles` drive cycles
    pub const fn plan_params(&self, planes: usize, cycles: usize) -> PlanParams {
        PlanParams {
            brightness: self.brightness,
            planes,
            frame_rate_hz: self.frame_rate_hz,
            clock_hz: self.clock_hz,
            cycles,
            timer: self.timer,
        }
    }

    /// Check that a plan exists for this configuration and that the
    /// watchdog outlasts a drive cycle, the upper bound of every plan slot.
    pub const fn check(&self, planes: usize, cycles: usize) -> Result<(), ConfigError> {
        let budget = match self.plan_params(planes, cycles).check() {
            Ok(budget) => budget,
            Err(err) => return Err(err),
        };

        let cycle_clocks = budget.cycle_ticks * budget.prescalers.coarse.divisor();
        let timeout_clocks = self.watchdog_timeout.as_micros() * self.clock_hz as u64;
        if cycle_clocks as u64 * 1_000_000 >= timeout_clocks {
            return Err(ConfigError::WatchdogTooShort { cycle_clocks });
        }
        Ok(())
    }

    /// Return `self`, failing constant evaluation when no plan exists.
    pub const fn validated(self, planes: usize, cycles: usize) -> Self {
        match self.check(planes, cycles) {
            Ok(()) => self,
            Err(ConfigError::BrightnessOutOfRange(_)) => {
                panic!("brightness must be between 0 and 127")
            }
            Err(ConfigError::InvalidPlaneCount(_)) => panic!("unsupported plane count"),
            Err(ConfigError::NoCycles) => panic!("topology has no drive cycles"),
            Err(ConfigError::ZeroFrequency) => panic!("frame rate and clock must be non-zero"),
            Err(ConfigError::FrameRateTooLow { .. }) => panic!("frame rate is too low"),
            Err(ConfigError::ClockTooSlow { .. }) => {
                panic!("clock is too slow for the requested frame rate and plane count")
            }
            Err(ConfigError::WatchdogTooShort { .. }) => {
                panic!("watchdog timeout is shorter than one drive cycle")
            }
            Err(_) => panic!("invalid display configuration"),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
