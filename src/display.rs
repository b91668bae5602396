use embedded_graphics::prelude::Point;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::PinBus;
use crate::canvas::Canvas;
use crate::config::{ConfigError, DisplayConfig};
use crate::framebuffer::Framebuffer;
use crate::mailbox::PlanMailbox;
use crate::planner::TimingPlan;
use crate::scheduler::{Scheduler, TickTimer, Watchdog};
use crate::topology::Topology;

/// Board resources handed to the scheduler
pub struct Hardware<B, T, D> {
    pub bus: B,
    pub timer: T,
    pub watchdog: D,
}

/// Scheduler type driving a [`Framebuffer`]
pub type FramebufferScheduler<
    'a,
    B,
    T,
    D,
    const PLANES: usize,
    const WIDTH: usize,
    const HEIGHT: usize,
    const LINE_BYTES: usize,
> = Scheduler<'a, Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>, B, T, D>;

/// Renderer-facing side of the display engine
///
/// Owns nothing but references: the framebuffer and plan mailbox are
/// statics shared with the scheduler, which runs in the timer interrupt.
pub struct MatrixDisplay<
    'a,
    const PLANES: usize,
    const WIDTH: usize,
    const HEIGHT: usize,
    const LINE_BYTES: usize,
> {
    framebuffer: &'a Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>,
    topology: &'a Topology,
    plans: &'a PlanMailbox,
    config: DisplayConfig,
}

impl<'a, const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize>
    MatrixDisplay<'a, PLANES, WIDTH, HEIGHT, LINE_BYTES>
{
    /// Bring the display up.
    ///
    /// Validates the topology against the framebuffer and the configured
    /// timer family against `T`, clears the framebuffer, computes the
    /// initial plan and starts the scheduler's timer and watchdog. The returned scheduler must be ticked from the
    /// timer interrupt, usually through a [`crate::SchedulerSlot`].
    pub fn init<B, T, D>(
        config: DisplayConfig,
        topology: &'a Topology,
        framebuffer: &'a Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>,
        plans: &'a PlanMailbox,
        hardware: Hardware<B, T, D>,
    ) -> Result<
        (
            Self,
            FramebufferScheduler<'a, B, T, D, PLANES, WIDTH, HEIGHT, LINE_BYTES>,
        ),
        ConfigError,
    >
    where
        B: PinBus,
        T: TickTimer,
        D: Watchdog,
    {
        topology.validate()?;
        if (topology.width, topology.height) != (WIDTH, HEIGHT) {
            return Err(ConfigError::DimensionMismatch);
        }

        let display = Self {
            framebuffer,
            topology,
            plans,
            config,
        };
        let plan = display.plan(config.brightness)?;

        let Hardware {
            bus,
            timer,
            watchdog,
        } = hardware;
        let mut scheduler =
            Scheduler::new(topology, framebuffer, plan, bus, timer, watchdog)?.with_mailbox(plans);

        framebuffer.clear();
        plans.take();
        scheduler.start(config.watchdog_timeout);

        #[cfg(feature = "esp32-log")]
        println!(
            "[MatrixDisplay.init] topology={} size={}x{} planes={} sweep={}us",
            topology.name,
            WIDTH,
            HEIGHT,
            PLANES,
            scheduler.plan().period().as_micros()
        );

        Ok((display, scheduler))
    }

    /// Set the brightness level (`0..=PLANES`) of one pixel
    pub fn set_pixel(&self, point: Point, level: u8) {
        self.framebuffer.set_pixel(point, level);
    }

    pub fn get_pixel(&self, point: Point) -> u8 {
        self.framebuffer.get_pixel(point)
    }

    /// Turn every pixel off
    pub fn clear(&self) {
        self.framebuffer.clear();
    }

    pub fn fill(&self, level: u8) {
        self.framebuffer.fill(level);
    }

    /// `(width, height)` in pixels
    pub const fn dimensions(&self) -> (usize, usize) {
        (WIDTH, HEIGHT)
    }

    /// Highest pixel level
    pub const fn levels(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let levels = PLANES as u8;
        levels
    }

    /// Change the global brightness.
    ///
    /// The new plan takes effect at the start of the next sweep. On error
    /// the current plan stays in effect.
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), ConfigError> {
        let plan = self.plan(brightness)?;
        self.plans.post(plan);
        self.config.brightness = brightness;

        #[cfg(feature = "esp32-log")]
        println!("[MatrixDisplay.set_brightness] brightness={}", brightness);

        Ok(())
    }

    pub const fn brightness(&self) -> u8 {
        self.config.brightness
    }

    pub const fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub const fn topology(&self) -> &'a Topology {
        self.topology
    }

    pub const fn framebuffer(&self) -> &'a Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES> {
        self.framebuffer
    }

    /// Drawing surface for `embedded-graphics`
    pub const fn canvas(&self) -> Canvas<'a, PLANES, WIDTH, HEIGHT, LINE_BYTES> {
        Canvas::new(self.framebuffer)
    }

    /// Plan for `brightness`, checked against the watchdog timeout
    fn plan(&self, brightness: u8) -> Result<TimingPlan, ConfigError> {
        let config = DisplayConfig {
            brightness,
            ..self.config
        };
        let cycles = self.topology.cycle_count();
        config.check(PLANES, cycles)?;
        TimingPlan::compute(&config.plan_params(PLANES, cycles))
    }
}
