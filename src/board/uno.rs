//! Arduino Uno and Diavolino (ATmega328P)

use super::{Pinout, Port, PortPin};

/// Header pins D2..D13 as pin groups 0..11
pub const UNO: Pinout = Pinout {
    name: "Arduino Uno",
    pins: &[
        PortPin::new(Port::D, 2),
        PortPin::new(Port::D, 3),
        PortPin::new(Port::D, 4),
        PortPin::new(Port::D, 5),
        PortPin::new(Port::D, 6),
        PortPin::new(Port::D, 7),
        PortPin::new(Port::B, 0),
        PortPin::new(Port::B, 1),
        PortPin::new(Port::B, 2),
        PortPin::new(Port::B, 3),
        PortPin::new(Port::B, 4),
        PortPin::new(Port::B, 5),
    ],
};
