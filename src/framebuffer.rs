//! Multi-plane framebuffer
//!
//! The framebuffer holds `PLANES` one-bit bitmaps. A pixel at brightness
//! level `L` has its bit set in planes `0..L`, so its on-time over one drive
//! cycle is the sum of the first `L` plane slots of the timing plan.
//!
//! Renderers write from the main loop while the tick handler reads from
//! interrupt context. Every byte is an [`AtomicU8`] accessed with relaxed
//! loads and stores: a tick never blocks, and a half-written pixel is at
//! worst visible for a single plane slot. Writes are read-modify-store, so
//! the framebuffer expects a single writer.

use core::sync::atomic::{AtomicU8, Ordering};

use embedded_graphics::prelude::Point;

use crate::canvas::Canvas;
use crate::planner::MAX_PLANES;

/// Bytes needed to store one row of `width` pixels
///
/// Use it to fill the `LINE_BYTES` parameter of [`Framebuffer`].
pub const fn compute_line_bytes(width: usize) -> usize {
    width.div_ceil(8)
}

/// Read access to plane bitmaps, as seen by the composer
pub trait PlaneSource {
    /// Number of lit planes (N)
    fn planes(&self) -> usize;

    /// `(width, height)` in pixels
    fn dimensions(&self) -> (usize, usize);

    /// Whether pixel `(x, y)` is set in `plane`; out of range reads `false`
    fn is_lit(&self, plane: usize, x: usize, y: usize) -> bool;
}

/// Framebuffer with `PLANES` bitmaps of `WIDTH` x `HEIGHT` pixels
///
/// `LINE_BYTES` must equal [`compute_line_bytes`]`(WIDTH)`.
pub struct Framebuffer<
    const PLANES: usize,
    const WIDTH: usize,
    const HEIGHT: usize,
    const LINE_BYTES: usize,
> {
    bitmaps: [[[AtomicU8; LINE_BYTES]; HEIGHT]; PLANES],
}

impl<const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize>
    Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>
{
    const LAYOUT: () = {
        assert!(PLANES > 0 && PLANES <= MAX_PLANES, "unsupported plane count");
        assert!(
            LINE_BYTES == compute_line_bytes(WIDTH),
            "LINE_BYTES must be compute_line_bytes(WIDTH)"
        );
    };

    /// Create a cleared framebuffer
    pub const fn new() -> Self {
        let () = Self::LAYOUT;
        Self {
            bitmaps: [const { [const { [const { AtomicU8::new(0) }; LINE_BYTES] }; HEIGHT] };
                PLANES],
        }
    }

    pub const fn width(&self) -> usize {
        WIDTH
    }

    pub const fn height(&self) -> usize {
        HEIGHT
    }

    /// `(width, height)` in pixels
    pub const fn dimensions(&self) -> (usize, usize) {
        (WIDTH, HEIGHT)
    }

    /// Number of planes, which is also the highest brightness level
    pub const fn planes(&self) -> usize {
        PLANES
    }

    /// Set the brightness level of a pixel
    ///
    /// Levels above `PLANES` are clamped; coordinates outside the matrix
    /// are ignored.
    pub fn set_pixel(&self, point: Point, level: u8) {
        let Some((y, byte, mask)) = Self::locate(point) else {
            return;
        };
        let level = usize::from(level).min(PLANES);

        for (plane, bitmap) in self.bitmaps.iter().enumerate() {
            let cell = &bitmap[y][byte];
            let bits = cell.load(Ordering::Relaxed);
            let bits = if plane < level {
                bits | mask
            } else {
                bits & !mask
            };
            cell.store(bits, Ordering::Relaxed);
        }
    }

    /// Brightness level of a pixel: the number of planes it is set in
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_pixel(&self, point: Point) -> u8 {
        let Some((y, byte, mask)) = Self::locate(point) else {
            return 0;
        };
        self.bitmaps
            .iter()
            .filter(|bitmap| bitmap[y][byte].load(Ordering::Relaxed) & mask != 0)
            .count() as u8
    }

    /// Zero every plane
    pub fn clear(&self) {
        self.fill(0);
    }

    /// Set every pixel to `level`
    pub fn fill(&self, level: u8) {
        let level = usize::from(level).min(PLANES);
        for (plane, bitmap) in self.bitmaps.iter().enumerate() {
            for row in bitmap {
                for (byte, cell) in row.iter().enumerate() {
                    cell.store(
                        if plane < level { row_mask(WIDTH, byte) } else { 0 },
                        Ordering::Relaxed,
                    );
                }
            }
        }
    }

    /// Drawing surface for `embedded-graphics`
    pub const fn canvas(&self) -> Canvas<'_, PLANES, WIDTH, HEIGHT, LINE_BYTES> {
        Canvas::new(self)
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn locate(point: Point) -> Option<(usize, usize, u8)> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as usize, point.y as usize);
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        Some((y, x / 8, 1 << (x % 8)))
    }
}

impl<const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize>
    PlaneSource for Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>
{
    fn planes(&self) -> usize {
        PLANES
    }

    fn dimensions(&self) -> (usize, usize) {
        (WIDTH, HEIGHT)
    }

    #[inline]
    fn is_lit(&self, plane: usize, x: usize, y: usize) -> bool {
        if x >= WIDTH {
            return false;
        }
        self.bitmaps
            .get(plane)
            .and_then(|bitmap| bitmap.get(y))
            .and_then(|row| row.get(x / 8))
            .is_some_and(|cell| cell.load(Ordering::Relaxed) & (1 << (x % 8)) != 0)
    }
}

impl<const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize> Default
    for Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

/// Bits of row byte `byte` that hold real pixels
#[allow(clippy::cast_possible_truncation)]
const fn row_mask(width: usize, byte: usize) -> u8 {
    let first = byte * 8;
    if first + 8 <= width {
        0xff
    } else if first >= width {
        0
    } else {
        ((1u16 << (width - first)) - 1) as u8
    }
}
