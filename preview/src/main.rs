//! Desktop preview for myrtio-matrix-composer
//!
//! Runs the real scheduler against simulated pins and paints every LED of
//! a LoL Shield with the on-time it actually received. Brightness changes
//! go through the same plan mailbox the firmware uses.

use std::time::Instant as StdInstant;

use eframe::egui::{self};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_5X7;
use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use myrtio_matrix_composer::sim::{OnTimeMeter, SimTimer, SimWatchdog, SimulatedPins};
use myrtio_matrix_composer::topology::{LOL_SHIELD, LOL_SHIELD_HEIGHT, LOL_SHIELD_WIDTH, pins};
use myrtio_matrix_composer::{
    DisplayConfig, Framebuffer, FramebufferScheduler, Hardware, MAX_BRIGHTNESS, MatrixDisplay,
    PlanMailbox, compute_line_bytes,
};

/// Grayscale planes of the simulated shield
const PLANES: usize = 3;

const LINE_BYTES: usize = compute_line_bytes(LOL_SHIELD_WIDTH);

/// Size of each LED in pixels
const LED_SIZE: f32 = 28.0;

/// Gap between LEDs
const LED_GAP: f32 = 6.0;

/// Langton's ant moves this often
const ANT_STEP_MS: u64 = 100;

/// Steps before the ant starts over
const ANT_STEPS: u32 = 500;

/// Scrolling text advances one column this often
const SCROLL_STEP_MS: u64 = 80;

type LolFramebuffer = Framebuffer<PLANES, LOL_SHIELD_WIDTH, LOL_SHIELD_HEIGHT, LINE_BYTES>;
type LolDisplay = MatrixDisplay<'static, PLANES, LOL_SHIELD_WIDTH, LOL_SHIELD_HEIGHT, LINE_BYTES>;
type LolScheduler = FramebufferScheduler<
    'static,
    SimulatedPins<{ pins::COUNT }>,
    SimTimer,
    SimWatchdog,
    PLANES,
    LOL_SHIELD_WIDTH,
    LOL_SHIELD_HEIGHT,
    LINE_BYTES,
>;

static FRAMEBUFFER: LolFramebuffer = LolFramebuffer::new();
static PLANS: PlanMailbox = PlanMailbox::new();

const CONFIG: DisplayConfig = DisplayConfig::DEFAULT.validated(PLANES, 12);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    /// Every brightness level side by side
    Gradient,
    /// Langton's ant on a torus
    Ant,
    /// Text scrolling through the canvas
    Text,
}

impl Pattern {
    fn as_str(self) -> &'static str {
        match self {
            Self::Gradient => "gradient",
            Self::Ant => "langton's ant",
            Self::Text => "scrolling text",
        }
    }
}

/// Langton's ant: turns right on dark cells, left on lit ones
struct Ant {
    x: i32,
    y: i32,
    heading: usize,
    trail: Option<Point>,
    steps: u32,
}

impl Ant {
    const HEADINGS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

    fn new() -> Self {
        Self {
            x: 7,
            y: 4,
            heading: 0,
            trail: None,
            steps: 0,
        }
    }

    fn step(&mut self, display: &LolDisplay) {
        if self.steps == 0 {
            display.clear();
        }

        let here = Point::new(self.x, self.y);
        let top = display.levels();
        if display.get_pixel(here) == 0 {
            display.set_pixel(here, top);
            self.heading = (self.heading + 1) % 4;
            if let Some(trail) = self.trail.filter(|trail| *trail != here) {
                display.set_pixel(trail, top - 1);
            }
            self.trail = Some(here);
        } else {
            display.set_pixel(here, 0);
            self.heading = (self.heading + 3) % 4;
        }

        let (dx, dy) = Self::HEADINGS[self.heading];
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        {
            self.x = (self.x + dx).rem_euclid(LOL_SHIELD_WIDTH as i32);
            self.y = (self.y + dy).rem_euclid(LOL_SHIELD_HEIGHT as i32);
        }

        self.steps += 1;
        if self.steps >= ANT_STEPS {
            *self = Self::new();
        }
    }
}

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 560.0])
            .with_title("Matrix Composer Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "myrtio-matrix-preview",
        options,
        Box::new(|_cc| match PreviewApp::new() {
            Ok(app) => Ok(Box::new(app) as Box<dyn eframe::App>),
            Err(err) => Err(format!("display init failed: {err}").into()),
        }),
    )
}

struct PreviewApp {
    display: LolDisplay,
    scheduler: LolScheduler,
    meter: OnTimeMeter<LOL_SHIELD_WIDTH, LOL_SHIELD_HEIGHT>,

    pattern: Pattern,
    ant: Ant,
    message: String,

    /// Synthetic time in milliseconds
    t_ms: u64,
    /// Time of the last pattern step
    last_step_ms: u64,
    /// Wall-clock reference for delta time
    last_frame: StdInstant,
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
    brightness: u8,
    led_size: f32,
}

impl PreviewApp {
    fn new() -> Result<Self, myrtio_matrix_composer::ConfigError> {
        let hardware = Hardware {
            bus: SimulatedPins::new(),
            timer: SimTimer::new(),
            watchdog: SimWatchdog::new(),
        };
        let (display, scheduler) =
            MatrixDisplay::init(CONFIG, &LOL_SHIELD, &FRAMEBUFFER, &PLANS, hardware)?;

        let mut app = Self {
            display,
            scheduler,
            meter: OnTimeMeter::new(),
            pattern: Pattern::Gradient,
            ant: Ant::new(),
            message: String::from("LoL Shield"),
            t_ms: 0,
            last_step_ms: 0,
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 1.0,
            brightness: CONFIG.brightness,
            led_size: LED_SIZE,
        };
        app.render_pattern();
        Ok(app)
    }

    fn reset_time(&mut self) {
        self.t_ms = 0;
        self.last_step_ms = 0;
        self.last_frame = StdInstant::now();
        self.ant = Ant::new();
        self.display.clear();
    }

    /// Update synthetic time based on wall clock and time scale
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.playing {
            let delta_ms = delta.as_secs_f64() * 1000.0 * f64::from(self.time_scale);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let delta_ms = if delta_ms.is_finite() {
                delta_ms.max(0.0) as u64
            } else {
                0
            };
            self.t_ms = self.t_ms.wrapping_add(delta_ms);
        }
    }

    /// Advance the active pattern to the current time
    fn render_pattern(&mut self) {
        match self.pattern {
            Pattern::Gradient => self.render_gradient(),
            Pattern::Ant => {
                while self.t_ms >= self.last_step_ms + ANT_STEP_MS {
                    self.ant.step(&self.display);
                    self.last_step_ms += ANT_STEP_MS;
                }
            }
            Pattern::Text => self.render_text(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn render_gradient(&self) {
        let levels = u64::from(self.display.levels()) + 1;
        let shift = self.t_ms / 250;
        for y in 0..LOL_SHIELD_HEIGHT as i32 {
            for x in 0..LOL_SHIELD_WIDTH as i32 {
                let level = (x as u64 + shift) % (2 * levels);
                let level = if level < levels { level } else { 2 * levels - 1 - level };
                self.display.set_pixel(Point::new(x, y), level as u8);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn render_text(&self) {
        let style = MonoTextStyle::new(&FONT_5X7, Gray8::WHITE);
        let glyph = FONT_5X7.character_size.width as i32 + FONT_5X7.character_spacing as i32;
        let span = self.message.chars().count() as i32 * glyph + LOL_SHIELD_WIDTH as i32;
        let offset = (self.t_ms / SCROLL_STEP_MS) as i32 % span.max(1);

        let mut canvas = self.display.canvas();
        let _ = canvas.clear(Gray8::BLACK);
        let _ = Text::with_baseline(
            &self.message,
            Point::new(LOL_SHIELD_WIDTH as i32 - offset, 1),
            style,
            Baseline::Top,
        )
        .draw(&mut canvas);
    }

    /// Run one full sweep of the scheduler and meter what the LEDs saw
    fn run_sweep(&mut self) {
        self.meter.reset();
        let slots = LOL_SHIELD.cycle_count() * (PLANES + 1);
        for _ in 0..slots {
            let entry = self.scheduler.tick();
            self.meter.record(self.scheduler.bus(), &LOL_SHIELD, entry);
        }
    }

    fn set_pattern(&mut self, pattern: Pattern) {
        self.pattern = pattern;
        self.last_step_ms = self.t_ms;
        self.ant = Ant::new();
        self.display.clear();
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_time();
        self.render_pattern();
        self.run_sweep();

        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                // <PlaybackControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        if ui.button("⏮ Reset").clicked() {
                            self.reset_time();
                        }
                        if ui
                            .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                            .clicked()
                        {
                            self.playing = !self.playing;
                        }
                    });

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        let secs = self.t_ms / 1000;
                        let ms = self.t_ms % 1000;
                        ui.label(format!("Time: {secs}.{ms:03}s"));
                    });

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Speed:");
                        ui.add(egui::Slider::new(&mut self.time_scale, 0.1..=5.0).logarithmic(true));
                    });
                });
                // </PlaybackControls>
                ui.add_space(16.0);
                // <PatternControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label("Pattern:");
                        let mut selected = self.pattern;
                        egui::ComboBox::from_id_salt("pattern_selector")
                            .selected_text(self.pattern.as_str())
                            .show_ui(ui, |ui| {
                                for pattern in [Pattern::Gradient, Pattern::Ant, Pattern::Text] {
                                    ui.selectable_value(&mut selected, pattern, pattern.as_str());
                                }
                            });
                        if selected != self.pattern {
                            self.set_pattern(selected);
                        }
                    });

                    ui.add_space(4.0);

                    if self.pattern == Pattern::Text {
                        ui.horizontal(|ui| {
                            ui.label("Text:");
                            ui.text_edit_singleline(&mut self.message);
                        });
                        ui.add_space(4.0);
                    }

                    ui.horizontal(|ui| {
                        ui.label("Brightness:");
                        let old_brightness = self.brightness;
                        ui.add(egui::Slider::new(&mut self.brightness, 0..=MAX_BRIGHTNESS));
                        if self.brightness != old_brightness
                            && self.display.set_brightness(self.brightness).is_err()
                        {
                            self.brightness = old_brightness;
                        }
                    });

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Size:");
                        ui.add(egui::Slider::new(&mut self.led_size, 8.0..=48.0));
                    });
                });
                // </PatternControls>
            });

            ui.add_space(8.0);

            let plan = self.scheduler.plan();
            ui.label(format!(
                "Sweep: {} us, cycle slots: {:?}",
                plan.period().as_micros(),
                plan.entries()
                    .iter()
                    .map(|entry| entry.ticks)
                    .collect::<Vec<_>>()
            ));

            ui.add_space(16.0);

            // === LED Matrix ===
            let pitch = self.led_size + LED_GAP;
            #[allow(clippy::cast_precision_loss)]
            let size = egui::vec2(
                LOL_SHIELD_WIDTH as f32 * pitch,
                LOL_SHIELD_HEIGHT as f32 * pitch,
            );
            let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
            let origin = response.rect.min;

            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            for y in 0..LOL_SHIELD_HEIGHT {
                for x in 0..LOL_SHIELD_WIDTH {
                    // (0, 0) is the upper right corner of the shield
                    let column = LOL_SHIELD_WIDTH - 1 - x;
                    let center = egui::pos2(
                        origin.x + column as f32 * pitch + pitch / 2.0,
                        origin.y + y as f32 * pitch + pitch / 2.0,
                    );
                    let duty = self.meter.duty(x, y).clamp(0.0, 1.0);
                    let red = 40 + (duty * 215.0) as u8;
                    let glow = (duty * 160.0) as u8;
                    let color = egui::Color32::from_rgb(red, glow / 3, glow / 4);
                    painter.circle_filled(center, self.led_size / 2.0, color);
                }
            }
        });
    }
}
