//! Gamma curve used to space plane durations.
//!
//! Plane thresholds are fractions of the lit budget raised to [`GAMMA`]
//! and quantised to Q10 (1024 = the whole budget).

/// Gamma exponent applied to the plane fractions.
///
/// Changing it reshapes every timing plan.
pub const GAMMA: f32 = 1.8;

/// Q10 representation of 1.0
pub const Q10_ONE: u32 = 1024;

/// Largest Q10 brightness level, reached at global brightness 127
pub const MAX_BRIGHTNESS_Q10: u32 = brightness_q10(127);

/// Cumulative gamma fraction of `index / planes` in Q10.
///
/// The result is truncated, so `gamma_q10(i, n)` never exceeds the exact
/// value. Index 0 is always 0 and `index >= planes` is always [`Q10_ONE`].
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gamma_q10(index: usize, planes: usize) -> u32 {
    if index == 0 || planes == 0 {
        return 0;
    }
    if index >= planes {
        return Q10_ONE;
    }

    let fraction = index as f32 / planes as f32;
    (libm::powf(fraction, GAMMA) * Q10_ONE as f32) as u32
}

/// Global brightness (0-127) mapped to a Q10 scale factor.
///
/// The square gives a perceptually even brightness knob.
#[inline]
pub const fn brightness_q10(brightness: u8) -> u32 {
    let brightness = brightness as u32;
    (brightness * brightness + 8) / 16
}
