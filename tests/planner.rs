mod tests {
    use embassy_time::Duration;
    use myrtio_matrix_composer::config::{ConfigError, DisplayConfig};
    use myrtio_matrix_composer::gamma::{brightness_q10, gamma_q10};
    use myrtio_matrix_composer::planner::{
        PlanEntry, PlanParams, Prescaler, PrescalerPair, TimerFamily, TimingPlan, cycle_ticks,
    };

    const LOL_CYCLES: usize = 12;

    fn params(brightness: u8, planes: usize, frame_rate_hz: u32, clock_hz: u32) -> PlanParams {
        PlanParams {
            brightness,
            planes,
            frame_rate_hz,
            clock_hz,
            cycles: LOL_CYCLES,
            timer: TimerFamily::Timer2,
        }
    }

    fn ticks(plan: &TimingPlan) -> Vec<(Prescaler, u16)> {
        plan.entries()
            .iter()
            .map(|entry| (entry.prescaler, entry.ticks))
            .collect()
    }

    #[test]
    fn test_gamma_curve() {
        assert_eq!(gamma_q10(0, 4), 0);
        assert_eq!(gamma_q10(4, 4), 1024);
        assert_eq!(gamma_q10(9, 4), 1024);
        // (1/2)^1.8 = 0.287
        assert_eq!(gamma_q10(2, 4), 294);
        for planes in 1..=16 {
            for index in 0..planes {
                assert!(gamma_q10(index, planes) < gamma_q10(index + 1, planes));
            }
        }
    }

    #[test]
    fn test_brightness_scale() {
        assert_eq!(brightness_q10(0), 0);
        assert_eq!(brightness_q10(127), 1008);
        assert_eq!(brightness_q10(64), 256);
    }

    #[test]
    fn test_full_brightness_four_planes() {
        let plan = TimingPlan::compute(&params(127, 4, 80, 16_000_000)).unwrap();

        assert_eq!(
            plan.budget().prescalers,
            PrescalerPair {
                fine: Prescaler::Div32,
                coarse: Prescaler::Div256,
            }
        );
        assert_eq!(plan.budget().cycle_ticks, 65);
        assert_eq!(plan.entries().len(), 5);
        assert_eq!(
            ticks(&plan),
            vec![
                (Prescaler::Div32, 42),
                (Prescaler::Div32, 105),
                (Prescaler::Div32, 158),
                (Prescaler::Div32, 207),
                (Prescaler::Div256, 1),
            ]
        );
        assert_eq!(plan.cycle_clocks(), 16_640);
        assert_eq!(plan.target_cycle_clocks(), 16_640);
    }

    #[test]
    fn test_full_sweep_fits_frame_period() {
        let plan = TimingPlan::compute(&params(127, 4, 80, 16_000_000)).unwrap();
        let frame_clocks = 16_000_000 / 80;
        let coarse = u64::from(plan.budget().prescalers.coarse.divisor());

        assert_eq!(plan.sweep_clocks(), 199_680);
        assert!(plan.sweep_clocks() <= frame_clocks);
        // Rounding the cycle budget costs at most half a coarse tick per cycle
        assert!(frame_clocks - plan.sweep_clocks() <= LOL_CYCLES as u64 * coarse / 2);
        assert_eq!(plan.period(), Duration::from_micros(12_480));
    }

    #[test]
    fn test_zero_brightness_clamps_to_one_tick() {
        let plan = TimingPlan::compute(&params(0, 4, 80, 16_000_000)).unwrap();

        for plane in 0..4 {
            assert_eq!(
                plan.entry(plane),
                Some(PlanEntry {
                    prescaler: Prescaler::Div32,
                    ticks: 1,
                })
            );
        }
        assert_eq!(plan.off_entry().prescaler, Prescaler::Div256);
        assert_eq!(plan.off_entry().ticks, 64);
        assert_eq!(plan.cycle_clocks(), 16_512);
    }

    #[test]
    fn test_eight_planes() {
        let plan = TimingPlan::compute(&params(127, 8, 80, 16_000_000)).unwrap();
        let lit: Vec<u16> = plan.entries()[..8].iter().map(|e| e.ticks).collect();

        assert_eq!(lit, vec![12, 30, 45, 60, 72, 86, 97, 110]);
        assert_eq!(plan.off_entry().ticks, 1);
    }

    #[test]
    fn test_single_plane_moves_to_coarse_divider() {
        let plan = TimingPlan::compute(&params(127, 1, 80, 16_000_000)).unwrap();

        assert_eq!(
            ticks(&plan),
            vec![(Prescaler::Div256, 64), (Prescaler::Div256, 1)]
        );
    }

    #[test]
    fn test_long_plane_moves_to_coarse_divider() {
        let plan = TimingPlan::compute(&params(127, 4, 60, 16_000_000)).unwrap();

        assert_eq!(plan.budget().cycle_ticks, 87);
        assert_eq!(
            ticks(&plan),
            vec![
                (Prescaler::Div32, 56),
                (Prescaler::Div32, 141),
                (Prescaler::Div32, 211),
                (Prescaler::Div256, 35),
                (Prescaler::Div256, 1),
            ]
        );
    }

    #[test]
    fn test_timer1_bands() {
        let plan = TimingPlan::compute(&PlanParams {
            timer: TimerFamily::Timer1,
            ..params(127, 4, 80, 16_000_000)
        })
        .unwrap();

        assert_eq!(plan.budget().prescalers.fine, Prescaler::Div64);
        assert_eq!(plan.budget().prescalers.coarse, Prescaler::Div256);
        assert_eq!(
            ticks(&plan),
            vec![
                (Prescaler::Div64, 21),
                (Prescaler::Div64, 52),
                (Prescaler::Div64, 79),
                (Prescaler::Div64, 104),
                (Prescaler::Div256, 1),
            ]
        );
        for entry in plan.entries() {
            assert!(TimerFamily::Timer1.clock_select(entry.prescaler).is_some());
        }
    }

    #[test]
    fn test_band_selection() {
        let select = |clock_hz| TimerFamily::Timer2.select(clock_hz, 80, LOL_CYCLES).unwrap();

        assert_eq!(select(1_000_000).coarse, Prescaler::Div32);
        assert_eq!(select(8_000_000).coarse, Prescaler::Div128);
        assert_eq!(select(16_000_000).coarse, Prescaler::Div256);
        assert_eq!(select(20_000_000).coarse, Prescaler::Div256);
        assert_eq!(cycle_ticks(8_000_000, 80, LOL_CYCLES, Prescaler::Div128), 65);
    }

    #[test]
    fn test_cycle_sum_within_tolerance() {
        let clocks = [1_000_000, 4_000_000, 8_000_000, 12_000_000, 16_000_000, 20_000_000];
        let frame_rates = [30, 50, 60, 80, 100, 120, 200];
        let mut checked = 0;

        for timer in [TimerFamily::Timer2, TimerFamily::Timer1] {
            for clock_hz in clocks {
                for frame_rate_hz in frame_rates {
                    for planes in 1..=16 {
                        for brightness in (0..=127).step_by(3) {
                            let plan = TimingPlan::compute(&PlanParams {
                                timer,
                                ..params(brightness, planes, frame_rate_hz, clock_hz)
                            })
                            .unwrap();

                            let coarse = plan.budget().prescalers.coarse.divisor();
                            let diff = plan.cycle_clocks().abs_diff(plan.target_cycle_clocks());
                            assert!(
                                diff <= planes as u32 * coarse,
                                "{brightness}/{planes} at {clock_hz} Hz, {frame_rate_hz} fps: off by {diff}"
                            );
                            checked += 1;
                        }
                    }
                }
            }
        }
        assert_eq!(checked, 2 * 6 * 7 * 16 * 43);
    }

    #[test]
    fn test_durations_never_decrease() {
        for planes in 1..=16 {
            for brightness in 0..=127 {
                for clock_hz in [1_000_000, 16_000_000] {
                    let plan = TimingPlan::compute(&params(brightness, planes, 80, clock_hz)).unwrap();
                    let lit = &plan.entries()[..planes];
                    for pair in lit.windows(2) {
                        assert!(pair[1].clock_cycles() >= pair[0].clock_cycles());
                    }
                    assert!(plan.entries().iter().all(|e| (1..=256).contains(&e.ticks)));
                }
            }
        }
    }

    #[test]
    fn test_lit_clocks_follow_gamma() {
        let plan = TimingPlan::compute(&params(127, 4, 80, 16_000_000)).unwrap();
        let full = plan.lit_clocks(4);

        assert_eq!(plan.lit_clocks(0), 0);
        assert_eq!(full, 512 * 32);
        // (2/4)^1.8 of the lit budget
        assert_eq!(plan.lit_clocks(2), 147 * 32);
        assert_eq!(plan.lit_clocks(9), full);
    }

    #[test]
    fn test_reload_values() {
        let entry = PlanEntry {
            prescaler: Prescaler::Div32,
            ticks: 42,
        };
        assert_eq!(entry.reload(), 214);
        assert_eq!(entry.clock_cycles(), 1344);
        assert_eq!(
            PlanEntry {
                prescaler: Prescaler::Div256,
                ticks: 256,
            }
            .reload(),
            0
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert_eq!(
            TimingPlan::compute(&params(128, 4, 80, 16_000_000)),
            Err(ConfigError::BrightnessOutOfRange(128))
        );
        assert_eq!(
            TimingPlan::compute(&params(127, 0, 80, 16_000_000)),
            Err(ConfigError::InvalidPlaneCount(0))
        );
        assert_eq!(
            TimingPlan::compute(&params(127, 17, 80, 16_000_000)),
            Err(ConfigError::InvalidPlaneCount(17))
        );
        assert_eq!(
            TimingPlan::compute(&params(127, 4, 0, 16_000_000)),
            Err(ConfigError::ZeroFrequency)
        );
        assert_eq!(
            TimingPlan::compute(&params(127, 4, 1, 16_000_000)),
            Err(ConfigError::FrameRateTooLow {
                clock_hz: 16_000_000,
                frame_rate_hz: 1,
            })
        );
        assert_eq!(
            TimingPlan::compute(&params(127, 16, 200, 10_000)),
            Err(ConfigError::ClockTooSlow { cycle_ticks: 1 })
        );
        assert_eq!(
            TimingPlan::compute(&params(127, 4, 200, 1_000)),
            Err(ConfigError::ClockTooSlow { cycle_ticks: 0 })
        );
        assert_eq!(
            TimingPlan::compute(&PlanParams {
                cycles: 0,
                ..params(127, 4, 80, 16_000_000)
            }),
            Err(ConfigError::NoCycles)
        );
    }

    #[test]
    fn test_config_validation() {
        const CONFIG: DisplayConfig = DisplayConfig::DEFAULT.validated(4, LOL_CYCLES);

        assert_eq!(CONFIG.brightness, 127);
        assert_eq!(CONFIG.check(4, LOL_CYCLES), Ok(()));
        assert!(
            DisplayConfig {
                frame_rate_hz: 1,
                ..DisplayConfig::DEFAULT
            }
            .check(4, LOL_CYCLES)
            .is_err()
        );
        assert_eq!(DisplayConfig::default(), DisplayConfig::DEFAULT);
    }

    #[test]
    fn test_watchdog_bound_in_config_check() {
        // 65 coarse ticks of 256 clocks, 1.04 ms per drive cycle
        let config = |frame_rate_hz, millis| DisplayConfig {
            frame_rate_hz,
            watchdog_timeout: Duration::from_millis(millis),
            ..DisplayConfig::DEFAULT
        };
        assert_eq!(
            config(80, 1).check(4, LOL_CYCLES),
            Err(ConfigError::WatchdogTooShort {
                cycle_clocks: 16_640
            })
        );
        assert_eq!(config(80, 2).check(4, LOL_CYCLES), Ok(()));

        // 30 Hz moves to the 1024 divider: 43 ticks, 2.75 ms
        assert_eq!(
            config(30, 2).check(4, LOL_CYCLES),
            Err(ConfigError::WatchdogTooShort {
                cycle_clocks: 44_032
            })
        );
        const SLOW: DisplayConfig = DisplayConfig {
            frame_rate_hz: 30,
            ..DisplayConfig::DEFAULT
        }
        .validated(4, LOL_CYCLES);
        assert_eq!(SLOW.check(4, LOL_CYCLES), Ok(()));
    }
}
