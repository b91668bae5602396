//! Jimmie Rodgers' LoL Shield: 14x9 charlieplexed LEDs on Arduino pins D2-D13
//!
//! Pin groups are the Arduino header pins, so the same table serves every
//! Arduino-footprint board; [`crate::board`] maps the pins to port bits.
//! Drive cycle `c` sinks through pin `D(c + 2)`.
//!
//! Pixel (0, 0) is the upper right corner of the shield.

use super::{DriveCycle, LedTap, PinGroup, Topology};

pub const LOL_SHIELD_WIDTH: usize = 14;
pub const LOL_SHIELD_HEIGHT: usize = 9;

/// Arduino header pins used by the shield
pub mod pins {
    use super::PinGroup;

    pub const D2: PinGroup = PinGroup(0);
    pub const D3: PinGroup = PinGroup(1);
    pub const D4: PinGroup = PinGroup(2);
    pub const D5: PinGroup = PinGroup(3);
    pub const D6: PinGroup = PinGroup(4);
    pub const D7: PinGroup = PinGroup(5);
    pub const D8: PinGroup = PinGroup(6);
    pub const D9: PinGroup = PinGroup(7);
    pub const D10: PinGroup = PinGroup(8);
    pub const D11: PinGroup = PinGroup(9);
    pub const D12: PinGroup = PinGroup(10);
    pub const D13: PinGroup = PinGroup(11);

    /// Number of header pins the shield uses
    pub const COUNT: usize = 12;
}

use pins::*;

const fn tap(x: u8, y: u8, source: PinGroup) -> LedTap {
    LedTap::new(x, y, source)
}

/// LoL Shield wiring
pub const LOL_SHIELD: Topology = Topology {
    name: "lolshield",
    width: LOL_SHIELD_WIDTH,
    height: LOL_SHIELD_HEIGHT,
    pin_groups: pins::COUNT,
    cycles: &[
        DriveCycle {
            sink: D2,
            taps: &[
                tap(1, 0, D13),
                tap(1, 1, D12),
                tap(1, 2, D11),
                tap(1, 3, D10),
                tap(1, 4, D9),
                tap(1, 5, D8),
                tap(1, 6, D7),
                tap(1, 7, D6),
                tap(1, 8, D5),
            ],
        },
        DriveCycle {
            sink: D3,
            taps: &[
                tap(3, 0, D13),
                tap(3, 1, D12),
                tap(3, 2, D11),
                tap(3, 3, D10),
                tap(3, 4, D9),
                tap(3, 5, D8),
                tap(3, 6, D7),
                tap(3, 7, D6),
                tap(3, 8, D5),
            ],
        },
        DriveCycle {
            sink: D4,
            taps: &[
                tap(5, 0, D13),
                tap(5, 1, D12),
                tap(5, 2, D11),
                tap(5, 3, D10),
                tap(5, 4, D9),
                tap(5, 5, D8),
                tap(5, 6, D7),
                tap(5, 7, D6),
                tap(5, 8, D5),
            ],
        },
        DriveCycle {
            sink: D5,
            taps: &[
                tap(13, 0, D13),
                tap(13, 1, D12),
                tap(13, 2, D11),
                tap(13, 3, D10),
                tap(13, 4, D9),
                tap(13, 5, D8),
                tap(13, 6, D7),
                tap(13, 7, D6),
                tap(4, 8, D4),
                tap(2, 8, D3),
                tap(0, 8, D2),
            ],
        },
        DriveCycle {
            sink: D6,
            taps: &[
                tap(12, 0, D13),
                tap(12, 1, D12),
                tap(12, 2, D11),
                tap(12, 3, D10),
                tap(12, 4, D9),
                tap(12, 5, D8),
                tap(12, 6, D7),
                tap(13, 8, D5),
                tap(4, 7, D4),
                tap(2, 7, D3),
                tap(0, 7, D2),
            ],
        },
        DriveCycle {
            sink: D7,
            taps: &[
                tap(11, 0, D13),
                tap(11, 1, D12),
                tap(11, 2, D11),
                tap(11, 3, D10),
                tap(11, 4, D9),
                tap(11, 5, D8),
                tap(12, 7, D6),
                tap(12, 8, D5),
                tap(4, 6, D4),
                tap(2, 6, D3),
                tap(0, 6, D2),
            ],
        },
        DriveCycle {
            sink: D8,
            taps: &[
                tap(10, 0, D13),
                tap(10, 1, D12),
                tap(10, 2, D11),
                tap(10, 3, D10),
                tap(10, 4, D9),
                tap(11, 6, D7),
                tap(11, 7, D6),
                tap(11, 8, D5),
                tap(4, 5, D4),
                tap(2, 5, D3),
                tap(0, 5, D2),
            ],
        },
        DriveCycle {
            sink: D9,
            taps: &[
                tap(9, 0, D13),
                tap(9, 1, D12),
                tap(9, 2, D11),
                tap(9, 3, D10),
                tap(10, 5, D8),
                tap(10, 6, D7),
                tap(10, 7, D6),
                tap(10, 8, D5),
                tap(4, 4, D4),
                tap(2, 4, D3),
                tap(0, 4, D2),
            ],
        },
        DriveCycle {
            sink: D10,
            taps: &[
                tap(8, 0, D13),
                tap(8, 1, D12),
                tap(8, 2, D11),
                tap(9, 4, D9),
                tap(9, 5, D8),
                tap(9, 6, D7),
                tap(9, 7, D6),
                tap(9, 8, D5),
                tap(4, 3, D4),
                tap(2, 3, D3),
                tap(0, 3, D2),
            ],
        },
        DriveCycle {
            sink: D11,
            taps: &[
                tap(7, 0, D13),
                tap(7, 1, D12),
                tap(8, 3, D10),
                tap(8, 4, D9),
                tap(8, 5, D8),
                tap(8, 6, D7),
                tap(8, 7, D6),
                tap(8, 8, D5),
                tap(4, 2, D4),
                tap(2, 2, D3),
                tap(0, 2, D2),
            ],
        },
        DriveCycle {
            sink: D12,
            taps: &[
                tap(6, 0, D13),
                tap(7, 2, D11),
                tap(7, 3, D10),
                tap(7, 4, D9),
                tap(7, 5, D8),
                tap(7, 6, D7),
                tap(7, 7, D6),
                tap(7, 8, D5),
                tap(4, 1, D4),
                tap(2, 1, D3),
                tap(0, 1, D2),
            ],
        },
        DriveCycle {
            sink: D13,
            taps: &[
                tap(6, 1, D12),
                tap(6, 2, D11),
                tap(6, 3, D10),
                tap(6, 4, D9),
                tap(6, 5, D8),
                tap(6, 6, D7),
                tap(6, 7, D6),
                tap(6, 8, D5),
                tap(4, 0, D4),
                tap(2, 0, D3),
                tap(0, 0, D2),
            ],
        },
    ],
};

const _: () = assert!(LOL_SHIELD.validate().is_ok(), "LoL Shield table is inconsistent");
