//! Display timers
//!
//! Both timers count to 256 and interrupt on wrap-around: Timer2 through
//! its overflow, the 16-bit Timer1 of the ATmega32U4 through compare match
//! A at 256 in CTC mode. A slot of `ticks` loads the counter with
//! `256 - ticks`.

use super::RegisterIo;
use crate::planner::{PlanEntry, TimerFamily};
use crate::scheduler::TickTimer;

const TIMSK2: u16 = 0x70;
const TCCR2A: u16 = 0xB0;
const TCCR2B: u16 = 0xB1;
const TCNT2: u16 = 0xB2;
const ASSR: u16 = 0xB6;

const TOIE2: u8 = 1 << 0;
const OCIE2A: u8 = 1 << 1;
const WGM20: u8 = 1 << 0;
const WGM21: u8 = 1 << 1;
const WGM22: u8 = 1 << 3;
const AS2: u8 = 1 << 5;

const TIMSK1: u16 = 0x6F;
const TCCR1A: u16 = 0x80;
const TCCR1B: u16 = 0x81;
const TCNT1L: u16 = 0x84;
const TCNT1H: u16 = 0x85;
const OCR1AL: u16 = 0x88;
const OCR1AH: u16 = 0x89;

const TOIE1: u8 = 1 << 0;
const OCIE1A: u8 = 1 << 1;
const WGM10: u8 = 1 << 0;
const WGM11: u8 = 1 << 1;
const WGM12: u8 = 1 << 3;

/// Counter value that wraps on the next timer tick
const FIRE_NOW: u8 = 255;

/// 8-bit Timer2 in normal mode, overflow interrupt
pub struct Timer2Overflow<R: RegisterIo> {
    io: R,
}

impl<R: RegisterIo> Timer2Overflow<R> {
    pub const fn new(io: R) -> Self {
        Self { io }
    }

    pub const fn io(&self) -> &R {
        &self.io
    }

    pub fn into_io(self) -> R {
        self.io
    }

    /// [`crate::Scheduler::new`] rejects plans for the other family, so
    /// every divider reaching this point exists on the timer.
    fn select(&mut self, entry: PlanEntry) {
        let cs = TimerFamily::Timer2.clock_select(entry.prescaler);
        debug_assert!(cs.is_some(), "Timer2 has no {:?} divider", entry.prescaler);
        if let Some(cs) = cs {
            self.io.write(TCCR2B, cs);
        }
    }
}

impl<R: RegisterIo> TickTimer for Timer2Overflow<R> {
    const FAMILY: Option<TimerFamily> = Some(TimerFamily::Timer2);

    fn start(&mut self, first: PlanEntry) {
        self.io.modify(TIMSK2, |v| v & !(TOIE2 | OCIE2A));
        self.io.modify(TCCR2A, |v| v & !(WGM21 | WGM20));
        self.io.modify(TCCR2B, |v| v & !WGM22);
        self.io.modify(ASSR, |v| v & !AS2);

        self.io.modify(TIMSK2, |v| v | TOIE2);
        self.select(first);
        self.io.write(TCNT2, FIRE_NOW);
    }

    #[inline]
    fn program(&mut self, entry: PlanEntry) {
        self.select(entry);
        self.io.write(TCNT2, entry.reload());
    }
}

/// 16-bit Timer1 in CTC mode with compare value 256
pub struct Timer1Compare<R: RegisterIo> {
    io: R,
}

impl<R: RegisterIo> Timer1Compare<R> {
    pub const fn new(io: R) -> Self {
        Self { io }
    }

    pub const fn io(&self) -> &R {
        &self.io
    }

    pub fn into_io(self) -> R {
        self.io
    }

    /// [`crate::Scheduler::new`] rejects plans for the other family, so
    /// every divider reaching this point exists on the timer.
    fn select(&mut self, entry: PlanEntry) {
        let cs = TimerFamily::Timer1.clock_select(entry.prescaler);
        debug_assert!(cs.is_some(), "Timer1 has no {:?} divider", entry.prescaler);
        if let Some(cs) = cs {
            self.io.write(TCCR1B, WGM12 | cs);
        }
    }

    /// 16-bit writes go high byte first through the shared temp register
    fn write_counter(&mut self, value: u8) {
        self.io.write(TCNT1H, 0);
        self.io.write(TCNT1L, value);
    }
}

impl<R: RegisterIo> TickTimer for Timer1Compare<R> {
    const FAMILY: Option<TimerFamily> = Some(TimerFamily::Timer1);

    fn start(&mut self, first: PlanEntry) {
        self.io.modify(TIMSK1, |v| v & !(TOIE1 | OCIE1A));
        self.io.modify(TCCR1A, |v| v & !(WGM10 | WGM11));
        self.io.write(OCR1AH, 0x01);
        self.io.write(OCR1AL, 0x00);

        self.io.modify(TIMSK1, |v| v | OCIE1A);
        self.select(first);
        self.write_counter(FIRE_NOW);
    }

    #[inline]
    fn program(&mut self, entry: PlanEntry) {
        self.select(entry);
        self.write_counter(entry.reload());
    }
}
