//! Pixel composer
//!
//! Turns one `(cycle, plane)` step into pin-group assertions. The order is
//! fixed: release everything the previous step asserted, pull the new sink
//! low, then raise the sources of the lit LEDs. Sources are never raised
//! before their sink, and two sinks are never low at the same time.

use crate::PinBus;
use crate::framebuffer::PlaneSource;
use crate::topology::{PinGroup, PinGroupSet, Topology};

/// Drives a [`PinBus`] from a topology and a framebuffer
pub struct Composer<B: PinBus> {
    bus: B,
    sink: Option<PinGroup>,
    sources: PinGroupSet,
}

impl<B: PinBus> Composer<B> {
    /// Wrap `bus`; nothing is asserted until the first [`compose`](Self::compose)
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            sink: None,
            sources: PinGroupSet::EMPTY,
        }
    }

    /// Show `plane` of drive cycle `cycle`.
    ///
    /// `plane` equal to the plane count is the off slot: the sink is still
    /// cycled but no source is raised. An unknown cycle leaves every group
    /// released.
    pub fn compose<F: PlaneSource + ?Sized>(
        &mut self,
        topology: &Topology,
        cycle: usize,
        plane: usize,
        frame: &F,
    ) {
        self.release_all();

        let Some(drive) = topology.cycle(cycle) else {
            return;
        };

        self.bus.assert_low(drive.sink);
        self.sink = Some(drive.sink);

        if plane >= frame.planes() {
            return;
        }
        for tap in drive.taps {
            if frame.is_lit(plane, usize::from(tap.x), usize::from(tap.y)) {
                self.bus.assert_high(tap.source);
                self.sources.insert(tap.source);
            }
        }
    }

    /// Release the previous sink and every previous source.
    ///
    /// The sink goes first so no source can find a return path while the
    /// groups are being released.
    pub fn release_all(&mut self) {
        if let Some(sink) = self.sink.take() {
            self.bus.release(sink);
        }
        for source in self.sources.iter() {
            self.bus.release(source);
        }
        self.sources.clear();
    }

    /// Sink asserted by the last step
    pub const fn active_sink(&self) -> Option<PinGroup> {
        self.sink
    }

    /// Sources asserted by the last step
    pub const fn active_sources(&self) -> PinGroupSet {
        self.sources
    }

    pub const fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release everything and hand the bus back
    pub fn into_bus(mut self) -> B {
        self.release_all();
        self.bus
    }
}
