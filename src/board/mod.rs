//! AVR register backend
//!
//! A [`Pinout`] maps every pin group of a topology to one I/O port bit.
//! [`PortBus`] drives those bits through a [`RegisterIo`], which is either
//! the real data space ([`VolatileIo`]) or memory in tests. The display
//! timers and the watchdog ([`Wdt`]) go through the same trait.
//!
//! Pin states follow the charlieplexing convention:
//!
//! | state    | DDR | PORT |
//! |----------|-----|------|
//! | released | 0   | 1    |
//! | sink     | 1   | 0    |
//! | source   | 1   | 1    |
//!
//! Releasing clears DDR before PORT is touched, and asserting sets PORT
//! before DDR, so a pin never passes through the opposite drive level.

mod leonardo;
mod mega;
mod timer;
mod uno;
mod wdt;

pub use leonardo::LEONARDO;
pub use mega::MEGA;
pub use timer::{Timer1Compare, Timer2Overflow};
pub use uno::UNO;
pub use wdt::Wdt;

use crate::PinBus;
use crate::topology::PinGroup;

/// I/O port of an AVR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    B,
    C,
    D,
    E,
    G,
    H,
}

impl Port {
    /// Data-space address of the `PINx` register; `DDRx` and `PORTx` follow it
    pub const fn pin_address(self) -> u16 {
        match self {
            Self::B => 0x23,
            Self::C => 0x26,
            Self::D => 0x29,
            Self::E => 0x2C,
            Self::G => 0x32,
            Self::H => 0x100,
        }
    }

    pub const fn ddr_address(self) -> u16 {
        self.pin_address() + 1
    }

    pub const fn port_address(self) -> u16 {
        self.pin_address() + 2
    }
}

/// One bit of an I/O port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortPin {
    pub port: Port,
    pub bit: u8,
}

impl PortPin {
    pub const fn new(port: Port, bit: u8) -> Self {
        Self { port, bit }
    }

    pub const fn mask(self) -> u8 {
        1 << self.bit
    }
}

/// Pin group to port bit assignment of one board
#[derive(Debug, Clone, Copy)]
pub struct Pinout {
    pub name: &'static str,
    /// Indexed by pin group id
    pub pins: &'static [PortPin],
}

impl Pinout {
    pub fn pin(&self, group: PinGroup) -> Option<PortPin> {
        self.pins.get(group.index()).copied()
    }

    /// Number of pin groups the board can drive
    pub const fn groups(&self) -> usize {
        self.pins.len()
    }
}

/// Byte-wide access to the data space
pub trait RegisterIo {
    fn read(&mut self, address: u16) -> u8;

    fn write(&mut self, address: u16, value: u8);

    /// Read-modify-write one register
    #[inline]
    fn modify(&mut self, address: u16, f: impl FnOnce(u8) -> u8) {
        let value = self.read(address);
        self.write(address, f(value));
    }
}

/// Register access through volatile pointers
pub struct VolatileIo {
    _private: (),
}

impl VolatileIo {
    /// # Safety
    ///
    /// Only for the target the addresses in this module belong to, and only
    /// one instance may touch the display registers. Port writes must not
    /// race with other code modifying the same ports.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterIo for VolatileIo {
    #[inline]
    fn read(&mut self, address: u16) -> u8 {
        // SAFETY: the constructor contract makes `address` a valid I/O register
        unsafe { core::ptr::read_volatile(usize::from(address) as *const u8) }
    }

    #[inline]
    fn write(&mut self, address: u16, value: u8) {
        // SAFETY: the constructor contract makes `address` a valid I/O register
        unsafe { core::ptr::write_volatile(usize::from(address) as *mut u8, value) }
    }
}

/// [`PinBus`] over AVR port registers
pub struct PortBus<'p, R: RegisterIo> {
    io: R,
    pinout: &'p Pinout,
}

impl<'p, R: RegisterIo> PortBus<'p, R> {
    pub const fn new(io: R, pinout: &'p Pinout) -> Self {
        Self { io, pinout }
    }

    /// Release every pin of the pinout
    pub fn release_all(&mut self) {
        for pin in self.pinout.pins {
            self.release_pin(*pin);
        }
    }

    pub const fn pinout(&self) -> &'p Pinout {
        self.pinout
    }

    pub const fn io(&self) -> &R {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut R {
        &mut self.io
    }

    fn release_pin(&mut self, pin: PortPin) {
        let mask = pin.mask();
        self.io.modify(pin.port.ddr_address(), |ddr| ddr & !mask);
        self.io.modify(pin.port.port_address(), |port| port | mask);
    }
}

impl<R: RegisterIo> PinBus for PortBus<'_, R> {
    fn assert_high(&mut self, group: PinGroup) {
        let Some(pin) = self.pinout.pin(group) else {
            return;
        };
        let mask = pin.mask();
        self.io.modify(pin.port.port_address(), |port| port | mask);
        self.io.modify(pin.port.ddr_address(), |ddr| ddr | mask);
    }

    fn assert_low(&mut self, group: PinGroup) {
        let Some(pin) = self.pinout.pin(group) else {
            return;
        };
        let mask = pin.mask();
        self.io.modify(pin.port.port_address(), |port| port & !mask);
        self.io.modify(pin.port.ddr_address(), |ddr| ddr | mask);
    }

    fn release(&mut self, group: PinGroup) {
        if let Some(pin) = self.pinout.pin(group) {
            self.release_pin(pin);
        }
    }
}
