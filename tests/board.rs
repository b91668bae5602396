mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use embassy_time::Duration;
    use myrtio_matrix_composer::PinBus;
    use myrtio_matrix_composer::board::{
        LEONARDO, MEGA, Pinout, Port, PortBus, PortPin, RegisterIo, Timer1Compare,
        Timer2Overflow, UNO, Wdt,
    };
    use myrtio_matrix_composer::planner::{PlanEntry, Prescaler};
    use myrtio_matrix_composer::scheduler::{TickTimer, Watchdog};
    use myrtio_matrix_composer::sim::{MemoryIo, RegisterWrite};
    use myrtio_matrix_composer::topology::{LOL_SHIELD, pins};

    /// Sink pin of every drive cycle as (port, mask), one entry per cycle
    fn sinks(pinout: &Pinout) -> Vec<(Port, u8)> {
        LOL_SHIELD
            .cycles
            .iter()
            .map(|cycle| {
                let pin = pinout.pin(cycle.sink).unwrap();
                (pin.port, pin.mask())
            })
            .collect()
    }

    fn writes(io: &MemoryIo) -> Vec<(u16, u8)> {
        io.writes()
            .map(|RegisterWrite { address, value }| (*address, *value))
            .collect()
    }

    #[test]
    fn test_register_addresses() {
        assert_eq!(Port::B.pin_address(), 0x23);
        assert_eq!(Port::B.ddr_address(), 0x24);
        assert_eq!(Port::B.port_address(), 0x25);
        assert_eq!(Port::D.port_address(), 0x2B);
        assert_eq!(Port::H.ddr_address(), 0x101);
        assert_eq!(PortPin::new(Port::G, 5).mask(), 0x20);
    }

    #[test]
    fn test_uno_sinks() {
        use Port::{B, D};
        assert_eq!(
            sinks(&UNO),
            vec![
                (D, 0x04),
                (D, 0x08),
                (D, 0x10),
                (D, 0x20),
                (D, 0x40),
                (D, 0x80),
                (B, 0x01),
                (B, 0x02),
                (B, 0x04),
                (B, 0x08),
                (B, 0x10),
                (B, 0x20),
            ]
        );
    }

    #[test]
    fn test_mega_sinks() {
        use Port::{B, E, G, H};
        assert_eq!(
            sinks(&MEGA),
            vec![
                (E, 0x10),
                (E, 0x20),
                (G, 0x20),
                (E, 0x08),
                (H, 0x08),
                (H, 0x10),
                (H, 0x20),
                (H, 0x40),
                (B, 0x10),
                (B, 0x20),
                (B, 0x40),
                (B, 0x80),
            ]
        );
    }

    #[test]
    fn test_leonardo_sinks() {
        use Port::{B, C, D, E};
        assert_eq!(
            sinks(&LEONARDO),
            vec![
                (D, 0x02),
                (D, 0x01),
                (D, 0x10),
                (C, 0x40),
                (D, 0x80),
                (E, 0x40),
                (B, 0x10),
                (B, 0x20),
                (B, 0x40),
                (B, 0x80),
                (D, 0x40),
                (C, 0x80),
            ]
        );
    }

    #[test]
    fn test_pinouts_cover_shield() {
        for pinout in [&UNO, &MEGA, &LEONARDO] {
            assert_eq!(pinout.groups(), pins::COUNT, "{}", pinout.name);
            for (index, a) in pinout.pins.iter().enumerate() {
                assert!(pinout.pins[index + 1..].iter().all(|b| a != b));
            }
        }
    }

    #[test]
    fn test_sink_drives_low() {
        let mut bus = PortBus::new(MemoryIo::new(), &UNO);
        bus.assert_low(pins::D2);

        assert_eq!(bus.io().get(Port::D.ddr_address()), 0x04);
        assert_eq!(bus.io().get(Port::D.port_address()), 0x00);
        // PORT is written before DDR
        assert_eq!(writes(bus.io()), vec![(0x2B, 0x00), (0x2A, 0x04)]);
    }

    #[test]
    fn test_source_drives_high() {
        let mut bus = PortBus::new(MemoryIo::new(), &UNO);
        bus.assert_high(pins::D8);

        assert_eq!(bus.io().get(Port::B.ddr_address()), 0x01);
        assert_eq!(bus.io().get(Port::B.port_address()), 0x01);
        assert_eq!(writes(bus.io()), vec![(0x25, 0x01), (0x24, 0x01)]);
    }

    #[test]
    fn test_release_pulls_up() {
        let mut bus = PortBus::new(MemoryIo::new(), &MEGA);
        bus.assert_low(pins::D6);
        bus.io_mut().clear_log();
        bus.release(pins::D6);

        let (ddr, port) = (Port::H.ddr_address(), Port::H.port_address());
        assert_eq!(bus.io().get(ddr), 0x00);
        assert_eq!(bus.io().get(port), 0x08);
        // DDR is cleared before PORT goes high
        assert_eq!(writes(bus.io()), vec![(ddr, 0x00), (port, 0x08)]);
    }

    #[test]
    fn test_other_bits_preserved() {
        let mut io = MemoryIo::new();
        io.write(Port::D.ddr_address(), 0x03);
        io.write(Port::D.port_address(), 0x03);
        let mut bus = PortBus::new(io, &UNO);

        bus.assert_low(pins::D7);
        assert_eq!(bus.io().get(Port::D.ddr_address()), 0x83);
        assert_eq!(bus.io().get(Port::D.port_address()), 0x03);

        bus.release_all();
        assert_eq!(bus.io().get(Port::D.ddr_address()), 0x03);
        assert_eq!(bus.io().get(Port::D.port_address()), 0xFF);
        assert_eq!(bus.io().get(Port::B.port_address()), 0x3F);
    }

    #[test]
    fn test_unknown_group_ignored() {
        let mut bus = PortBus::new(MemoryIo::new(), &UNO);
        bus.assert_high(pins::D2);
        bus.io_mut().clear_log();

        bus.assert_low(myrtio_matrix_composer::PinGroup(12));
        assert_eq!(bus.io().writes().count(), 0);
    }

    #[test]
    fn test_timer2_start() {
        let mut io = MemoryIo::new();
        io.write(0x70, 0x07);
        io.write(0xB0, 0x03);
        io.write(0xB1, 0x08);
        io.write(0xB6, 0x20);
        let mut timer = Timer2Overflow::new(io);

        timer.start(PlanEntry {
            prescaler: Prescaler::Div32,
            ticks: 42,
        });

        let io = timer.io();
        assert_eq!(io.get(0x70), 0x05);
        assert_eq!(io.get(0xB0), 0x00);
        assert_eq!(io.get(0xB1), 0b011);
        assert_eq!(io.get(0xB6), 0x00);
        assert_eq!(io.get(0xB2), 255);
    }

    #[test]
    fn test_timer2_program() {
        let mut timer = Timer2Overflow::new(MemoryIo::new());

        timer.program(PlanEntry {
            prescaler: Prescaler::Div32,
            ticks: 42,
        });
        assert_eq!(timer.io().get(0xB1), 0b011);
        assert_eq!(timer.io().get(0xB2), 214);

        timer.program(PlanEntry {
            prescaler: Prescaler::Div256,
            ticks: 1,
        });
        assert_eq!(timer.io().get(0xB1), 0b110);
        assert_eq!(timer.io().get(0xB2), 255);
    }

    #[test]
    fn test_timer1_start() {
        let mut timer = Timer1Compare::new(MemoryIo::new());

        timer.start(PlanEntry {
            prescaler: Prescaler::Div64,
            ticks: 21,
        });

        let io = timer.into_io();
        assert_eq!(io.get(0x6F), 0x02);
        assert_eq!(io.get(0x81), 0x08 | 0b011);
        assert_eq!((io.get(0x89), io.get(0x88)), (0x01, 0x00));
        assert_eq!((io.get(0x85), io.get(0x84)), (0x00, 255));

        let counter: Vec<_> = writes(&io)
            .into_iter()
            .filter(|(address, _)| matches!(address, 0x84 | 0x85))
            .collect();
        assert_eq!(counter, vec![(0x85, 0), (0x84, 255)]);
    }

    #[test]
    fn test_timer1_program() {
        let mut timer = Timer1Compare::new(MemoryIo::new());
        timer.program(PlanEntry {
            prescaler: Prescaler::Div256,
            ticks: 1,
        });

        assert_eq!(timer.io().get(0x81), 0x08 | 0b100);
        assert_eq!(timer.io().get(0x84), 255);
    }

    static WDT_RESETS: AtomicUsize = AtomicUsize::new(0);

    fn count_wdr() {
        WDT_RESETS.fetch_add(1, Ordering::Relaxed);
    }

    fn no_wdr() {}

    #[test]
    fn test_wdt_start_sequence() {
        let mut io = MemoryIo::new();
        // watchdog reset flag and power-on flag left over from boot
        io.write(0x54, 0x09);
        io.clear_log();
        let mut wdt = Wdt::new(io, no_wdr);

        wdt.start(Duration::from_millis(15));

        assert_eq!(wdt.period(), Some(Duration::from_millis(15)));
        assert_eq!(wdt.io().get(0x54), 0x01);
        // timed sequence: change enable, then reset mode with the 15 ms prescaler
        assert_eq!(
            writes(wdt.io()),
            vec![(0x54, 0x01), (0x60, 0x18), (0x60, 0x08)]
        );
    }

    #[test]
    fn test_wdt_period_never_exceeds_timeout() {
        let cases = [
            (Duration::from_millis(1), Duration::from_millis(15), 0x08),
            (Duration::from_millis(100), Duration::from_millis(60), 0x0A),
            (Duration::from_millis(250), Duration::from_millis(250), 0x0C),
            (Duration::from_secs(10), Duration::from_secs(8), 0x29),
        ];
        for (timeout, period, wdtcsr) in cases {
            let mut wdt = Wdt::new(MemoryIo::new(), no_wdr);
            wdt.start(timeout);
            assert_eq!(wdt.period(), Some(period), "{timeout:?}");
            assert_eq!(wdt.io().get(0x60), wdtcsr, "{timeout:?}");
        }
    }

    #[test]
    fn test_wdt_feed_resets() {
        let mut wdt = Wdt::new(MemoryIo::new(), count_wdr);
        wdt.start(Duration::from_millis(15));
        assert_eq!(WDT_RESETS.load(Ordering::Relaxed), 1);

        for _ in 0..5 {
            wdt.feed();
        }
        assert_eq!(WDT_RESETS.load(Ordering::Relaxed), 6);
        // feeding never touches the registers
        assert_eq!(writes(wdt.io()).len(), 3);
    }
}
