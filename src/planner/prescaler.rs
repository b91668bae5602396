//! Timer clock dividers and the band rule that picks them.

use crate::config::ConfigError;

/// Upper bound (exclusive) for coarse ticks in one drive cycle.
///
/// Keeps the fine-divider budget of a cycle small enough for the 8-bit
/// reload arithmetic.
pub const MAX_CYCLE_TICKS: u32 = 128;

/// Clock divider of the display timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    Div1,
    Div8,
    Div32,
    Div64,
    Div128,
    Div256,
    Div1024,
}

impl Prescaler {
    /// Division factor applied to the CPU clock
    pub const fn divisor(self) -> u32 {
        1 << self.shift()
    }

    /// Base-two logarithm of the divisor
    pub const fn shift(self) -> u32 {
        match self {
            Self::Div1 => 0,
            Self::Div8 => 3,
            Self::Div32 => 5,
            Self::Div64 => 6,
            Self::Div128 => 7,
            Self::Div256 => 8,
            Self::Div1024 => 10,
        }
    }
}

/// Fine divider for lit planes and coarse divider for the off interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrescalerPair {
    pub fine: Prescaler,
    pub coarse: Prescaler,
}

impl PrescalerPair {
    const fn new(fine: Prescaler, coarse: Prescaler) -> Self {
        Self { fine, coarse }
    }

    /// How many bits one coarse tick is wider than a fine tick
    pub const fn shift(self) -> u32 {
        self.coarse.shift() - self.fine.shift()
    }
}

const TIMER2_BANDS: [PrescalerPair; 6] = [
    PrescalerPair::new(Prescaler::Div1, Prescaler::Div8),
    PrescalerPair::new(Prescaler::Div8, Prescaler::Div32),
    PrescalerPair::new(Prescaler::Div8, Prescaler::Div64),
    PrescalerPair::new(Prescaler::Div32, Prescaler::Div128),
    PrescalerPair::new(Prescaler::Div32, Prescaler::Div256),
    PrescalerPair::new(Prescaler::Div128, Prescaler::Div1024),
];

const TIMER1_BANDS: [PrescalerPair; 4] = [
    PrescalerPair::new(Prescaler::Div1, Prescaler::Div8),
    PrescalerPair::new(Prescaler::Div8, Prescaler::Div64),
    PrescalerPair::new(Prescaler::Div64, Prescaler::Div256),
    PrescalerPair::new(Prescaler::Div256, Prescaler::Div1024),
];

/// Family of the hardware timer that paces the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerFamily {
    /// 8-bit Timer2 with overflow interrupt (ATmega8/48/88/168/328/1280/2560)
    Timer2,
    /// 16-bit Timer1 in CTC mode with compare value 256 (ATmega32U4)
    Timer1,
}

impl TimerFamily {
    /// Divider pairs in ascending clock order
    pub const fn bands(self) -> &'static [PrescalerPair] {
        match self {
            Self::Timer2 => &TIMER2_BANDS,
            Self::Timer1 => &TIMER1_BANDS,
        }
    }

    /// Clock-select bits for the timer control register
    ///
    /// Returns `None` for dividers the timer does not have.
    pub const fn clock_select(self, prescaler: Prescaler) -> Option<u8> {
        match (self, prescaler) {
            (_, Prescaler::Div1) => Some(0b001),
            (_, Prescaler::Div8) => Some(0b010),
            (Self::Timer2, Prescaler::Div32) => Some(0b011),
            (Self::Timer2, Prescaler::Div64) => Some(0b100),
            (Self::Timer2, Prescaler::Div128) => Some(0b101),
            (Self::Timer2, Prescaler::Div256) => Some(0b110),
            (Self::Timer2, Prescaler::Div1024) => Some(0b111),
            (Self::Timer1, Prescaler::Div64) => Some(0b011),
            (Self::Timer1, Prescaler::Div256) => Some(0b100),
            (Self::Timer1, Prescaler::Div1024) => Some(0b101),
            (Self::Timer1, Prescaler::Div32 | Prescaler::Div128) => None,
        }
    }

    /// Pick the first band whose coarse divider keeps a drive cycle below
    /// [`MAX_CYCLE_TICKS`].
    pub const fn select(
        self,
        clock_hz: u32,
        frame_rate_hz: u32,
        cycles: usize,
    ) -> Result<PrescalerPair, ConfigError> {
        let bands = self.bands();
        let mut i = 0;
        while i < bands.len() {
            if (clock_hz as u64) < band_cutoff(bands[i].coarse, frame_rate_hz, cycles) {
                return Ok(bands[i]);
            }
            i += 1;
        }
        Err(ConfigError::FrameRateTooLow {
            clock_hz,
            frame_rate_hz,
        })
    }
}

/// Lowest clock frequency that no longer fits a band with this coarse divider
pub const fn band_cutoff(coarse: Prescaler, frame_rate_hz: u32, cycles: usize) -> u64 {
    let cycles = cycles as u64;
    (MAX_CYCLE_TICKS as u64 * cycles - cycles / 2) * frame_rate_hz as u64 * coarse.divisor() as u64
}

/// Coarse ticks available to one drive cycle, rounded to nearest
pub const fn cycle_ticks(clock_hz: u32, frame_rate_hz: u32, cycles: usize, coarse: Prescaler) -> u32 {
    let per_cycle = cycles as u64 * frame_rate_hz as u64 * coarse.divisor() as u64;
    if per_cycle == 0 {
        return 0;
    }
    ((clock_hz as u64 + per_cycle / 2) / per_cycle) as u32
}
