//! AVR watchdog timer
//!
//! The watchdog runs in system reset mode. Changing its prescaler takes the
//! timed sequence: set `WDCE | WDE`, then write the new configuration within
//! four cycles, with interrupts off.

use embassy_time::Duration;

use super::RegisterIo;
use crate::scheduler::Watchdog;

const MCUSR: u16 = 0x54;
const WDTCSR: u16 = 0x60;

const WDRF: u8 = 1 << 3;
const WDP3: u8 = 1 << 5;
const WDCE: u8 = 1 << 4;
const WDE: u8 = 1 << 3;

/// Watchdog periods and their `WDP3..0` bits, shortest first
const PERIODS: [(Duration, u8); 10] = [
    (Duration::from_millis(15), 0),
    (Duration::from_millis(30), 1),
    (Duration::from_millis(60), 2),
    (Duration::from_millis(120), 3),
    (Duration::from_millis(250), 4),
    (Duration::from_millis(500), 5),
    (Duration::from_secs(1), 6),
    (Duration::from_secs(2), 7),
    (Duration::from_secs(4), WDP3),
    (Duration::from_secs(8), WDP3 | 1),
];

/// Longest period that does not exceed `timeout`, at least 15 ms
fn period_for(timeout: Duration) -> (Duration, u8) {
    PERIODS
        .iter()
        .rev()
        .find(|(period, _)| *period <= timeout)
        .copied()
        .unwrap_or(PERIODS[0])
}

/// [`Watchdog`] on the AVR watchdog timer
///
/// `reset` executes the `wdr` instruction. With the `avr` feature,
/// [`Wdt::with_wdr`] wires it to [`avr_device::asm::wdr`].
pub struct Wdt<R: RegisterIo> {
    io: R,
    reset: fn(),
    period: Option<Duration>,
}

impl<R: RegisterIo> Wdt<R> {
    pub const fn new(io: R, reset: fn()) -> Self {
        Self {
            io,
            reset,
            period: None,
        }
    }

    /// Hardware period chosen by [`Watchdog::start`]
    pub const fn period(&self) -> Option<Duration> {
        self.period
    }

    pub const fn io(&self) -> &R {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut R {
        &mut self.io
    }
}

#[cfg(feature = "avr")]
impl<R: RegisterIo> Wdt<R> {
    pub const fn with_wdr(io: R) -> Self {
        Self::new(io, avr_device::asm::wdr)
    }
}

impl<R: RegisterIo> Watchdog for Wdt<R> {
    fn start(&mut self, timeout: Duration) {
        let (period, prescaler) = period_for(timeout);
        critical_section::with(|_| {
            (self.reset)();
            // WDE cannot be cleared while WDRF is set
            self.io.modify(MCUSR, |v| v & !WDRF);
            self.io.write(WDTCSR, WDCE | WDE);
            self.io.write(WDTCSR, WDE | prescaler);
        });
        self.period = Some(period);
    }

    #[inline]
    fn feed(&mut self) {
        (self.reset)();
    }
}
