//! Arduino Leonardo (ATmega32U4)

use super::{Pinout, Port, PortPin};

/// Header pins D2..D13 as pin groups 0..11
pub const LEONARDO: Pinout = Pinout {
    name: "Arduino Leonardo",
    pins: &[
        PortPin::new(Port::D, 1),
        PortPin::new(Port::D, 0),
        PortPin::new(Port::D, 4),
        PortPin::new(Port::C, 6),
        PortPin::new(Port::D, 7),
        PortPin::new(Port::E, 6),
        PortPin::new(Port::B, 4),
        PortPin::new(Port::B, 5),
        PortPin::new(Port::B, 6),
        PortPin::new(Port::B, 7),
        PortPin::new(Port::D, 6),
        PortPin::new(Port::C, 7),
    ],
};
