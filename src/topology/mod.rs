//! Matrix topology tables
//!
//! A [`Topology`] splits the matrix into drive cycles. During one cycle a
//! single pin group sinks current and every lit LED of that cycle is fed by
//! its own source group. The tables are plain data; the composer walks
//! them generically, so a new board is a new table.

mod lolshield;

use core::fmt;

pub use lolshield::{LOL_SHIELD, LOL_SHIELD_HEIGHT, LOL_SHIELD_WIDTH, pins};

/// Most pin groups a topology can address
pub const MAX_PIN_GROUPS: usize = 32;

/// Largest matrix side a topology can describe
pub const MAX_SIDE: usize = 32;

/// Abstract pin group, resolved to real pins by a board pinout
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinGroup(pub u8);

impl PinGroup {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    const fn bit(self) -> u32 {
        1 << self.0
    }
}

/// Set of pin groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinGroupSet(u32);

impl PinGroupSet {
    pub const EMPTY: Self = Self(0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, group: PinGroup) -> bool {
        group.index() < MAX_PIN_GROUPS && self.0 & group.bit() != 0
    }

    /// Add `group`; groups past [`MAX_PIN_GROUPS`] are ignored
    pub fn insert(&mut self, group: PinGroup) {
        if group.index() < MAX_PIN_GROUPS {
            self.0 |= group.bit();
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Groups in ascending order
    pub fn iter(self) -> impl Iterator<Item = PinGroup> {
        let mut bits = self.0;
        core::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            #[allow(clippy::cast_possible_truncation)]
            let index = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(PinGroup(index))
        })
    }
}

/// One LED: its framebuffer pixel and the group that sources it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedTap {
    pub x: u8,
    pub y: u8,
    pub source: PinGroup,
}

impl LedTap {
    pub const fn new(x: u8, y: u8, source: PinGroup) -> Self {
        Self { x, y, source }
    }

    /// Byte offset of the pixel inside one plane bitmap
    pub const fn offset(self, line_bytes: usize) -> usize {
        self.y as usize * line_bytes + self.x as usize / 8
    }

    /// Bit of the pixel inside its byte
    pub const fn mask(self) -> u8 {
        1 << (self.x % 8)
    }
}

/// Everything driven during one multiplexing phase
#[derive(Debug, Clone, Copy)]
pub struct DriveCycle {
    pub sink: PinGroup,
    pub taps: &'static [LedTap],
}

/// Static wiring of one hardware variant
#[derive(Debug, Clone, Copy)]
pub struct Topology {
    pub name: &'static str,
    pub width: usize,
    pub height: usize,
    /// Pin groups used, ids `0..pin_groups`
    pub pin_groups: usize,
    pub cycles: &'static [DriveCycle],
}

/// Inconsistency found by [`Topology::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopologyError {
    TooManyPinGroups(usize),
    MatrixTooLarge,
    NoCycles,
    /// A sink or source refers to a group past `pin_groups`
    UnknownPinGroup { cycle: usize, group: u8 },
    /// The sink of a cycle is also one of its sources
    SinkAsSource { cycle: usize },
    /// Two LEDs of one cycle share a source group
    SharedSource { cycle: usize, group: u8 },
    PixelOutOfRange { cycle: usize, x: u8, y: u8 },
    DuplicatePixel { x: u8, y: u8 },
    MissingPixel { x: u8, y: u8 },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyPinGroups(count) => write!(f, "{count} pin groups"),
            Self::MatrixTooLarge => f.write_str("matrix is too large"),
            Self::NoCycles => f.write_str("no drive cycles"),
            Self::UnknownPinGroup { cycle, group } => {
                write!(f, "cycle {cycle} uses unknown pin group {group}")
            }
            Self::SinkAsSource { cycle } => write!(f, "cycle {cycle} sources from its sink"),
            Self::SharedSource { cycle, group } => {
                write!(f, "cycle {cycle} sources two LEDs from group {group}")
            }
            Self::PixelOutOfRange { cycle, x, y } => {
                write!(f, "cycle {cycle} maps ({x}, {y}) outside the matrix")
            }
            Self::DuplicatePixel { x, y } => write!(f, "({x}, {y}) is driven twice"),
            Self::MissingPixel { x, y } => write!(f, "({x}, {y}) is never driven"),
        }
    }
}

impl Topology {
    pub const fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    pub fn cycle(&self, index: usize) -> Option<&DriveCycle> {
        self.cycles.get(index)
    }

    /// Number of LEDs over all cycles
    pub fn led_count(&self) -> usize {
        self.cycles.iter().map(|cycle| cycle.taps.len()).sum()
    }

    /// Find the cycle that drives pixel `(x, y)` and its source group
    pub fn locate(&self, x: usize, y: usize) -> Option<(usize, &DriveCycle, LedTap)> {
        self.cycles.iter().enumerate().find_map(|(index, cycle)| {
            cycle
                .taps
                .iter()
                .find(|tap| tap.x as usize == x && tap.y as usize == y)
                .map(|tap| (index, cycle, *tap))
        })
    }

    /// Check the table: every cycle has one sink, its sources are distinct
    /// and never the sink, and the cycles cover every pixel exactly once.
    pub const fn validate(&self) -> Result<(), TopologyError> {
        if self.pin_groups > MAX_PIN_GROUPS {
            return Err(TopologyError::TooManyPinGroups(self.pin_groups));
        }
        if self.width == 0 || self.width > MAX_SIDE || self.height > MAX_SIDE {
            return Err(TopologyError::MatrixTooLarge);
        }
        if self.cycles.is_empty() {
            return Err(TopologyError::NoCycles);
        }

        let mut covered = [0u32; MAX_SIDE];
        let mut c = 0;
        while c < self.cycles.len() {
            let cycle = &self.cycles[c];
            if cycle.sink.index() >= self.pin_groups {
                return Err(TopologyError::UnknownPinGroup {
                    cycle: c,
                    group: cycle.sink.0,
                });
            }

            let mut sources = 0u32;
            let mut t = 0;
            while t < cycle.taps.len() {
                let tap = cycle.taps[t];
                if tap.source.index() >= self.pin_groups {
                    return Err(TopologyError::UnknownPinGroup {
                        cycle: c,
                        group: tap.source.0,
                    });
                }
                if tap.source.0 == cycle.sink.0 {
                    return Err(TopologyError::SinkAsSource { cycle: c });
                }
                if sources & tap.source.bit() != 0 {
                    return Err(TopologyError::SharedSource {
                        cycle: c,
                        group: tap.source.0,
                    });
                }
                sources |= tap.source.bit();

                let (x, y) = (tap.x as usize, tap.y as usize);
                if x >= self.width || y >= self.height {
                    return Err(TopologyError::PixelOutOfRange {
                        cycle: c,
                        x: tap.x,
                        y: tap.y,
                    });
                }
                if covered[y] & (1 << x) != 0 {
                    return Err(TopologyError::DuplicatePixel { x: tap.x, y: tap.y });
                }
                covered[y] |= 1 << x;
                t += 1;
            }
            c += 1;
        }

        let mut y = 0;
        while y < self.height {
            let mut x = 0;
            while x < self.width {
                if covered[y] & (1 << x) == 0 {
                    #[allow(clippy::cast_possible_truncation)]
                    return Err(TopologyError::MissingPixel {
                        x: x as u8,
                        y: y as u8,
                    });
                }
                x += 1;
            }
            y += 1;
        }

        Ok(())
    }
}
