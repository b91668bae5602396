//! Arduino Mega (ATmega1280/2560)
//!
//! The header pins are scattered over four ports.

use super::{Pinout, Port, PortPin};

/// Header pins D2..D13 as pin groups 0..11
pub const MEGA: Pinout = Pinout {
    name: "Arduino Mega",
    pins: &[
        PortPin::new(Port::E, 4),
        PortPin::new(Port::E, 5),
        PortPin::new(Port::G, 5),
        PortPin::new(Port::E, 3),
        PortPin::new(Port::H, 3),
        PortPin::new(Port::H, 4),
        PortPin::new(Port::H, 5),
        PortPin::new(Port::H, 6),
        PortPin::new(Port::B, 4),
        PortPin::new(Port::B, 5),
        PortPin::new(Port::B, 6),
        PortPin::new(Port::B, 7),
    ],
};
