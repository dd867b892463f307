//! Fixed-point formats and the handful of saturating primitives used by the
//! DSP core.
//!
//! Audio samples are always [Fract32] (32 bit signed, 31 fractional bits),
//! control values (frequencies, durations, gains that may reach unity) are
//! [Fix16] (16.16), and positions within a buffer are [TapIndex] (32.32) so
//! that a playback head can move at fractional rates without accumulating
//! error.

pub use fixed::types::*;

/// A 32 bit signed fractional number in the interval `[-1, 1)`.  This is the
/// format of every audio sample inside the engine.
pub type Fract32 = I1F31;
/// A 32 bit signed fixed point number with 16 integral and 16 fractional bits.
pub type Fix16 = I16F16;
/// A signed frame index with a 32 bit fractional part, used by interpolated
/// buffer taps for both position and per-step increment.
pub type TapIndex = I32F32;

/// Saturating fractional multiply.  `-1 * -1` saturates to [Fract32::MAX].
#[inline]
pub fn mul_fr32(a: Fract32, b: Fract32) -> Fract32 {
    a.saturating_mul(b)
}

/// Saturating fractional addition
#[inline]
pub fn add_fr32(a: Fract32, b: Fract32) -> Fract32 {
    a.saturating_add(b)
}

/// Saturating fractional subtraction
#[inline]
pub fn sub_fr32(a: Fract32, b: Fract32) -> Fract32 {
    a.saturating_sub(b)
}

/// Multiply a sample by a 16.16 gain, saturating the result.  A gain of
/// exactly [Fix16::ONE] returns the sample unchanged.
#[inline]
pub fn scale_fr32(a: Fract32, gain: Fix16) -> Fract32 {
    Fract32::saturating_from_num(a.wide_mul(gain))
}

/// Reinterpret a 16.16 value in `[-1, 1)` as a fractional value.  Values
/// outside that range saturate.
#[inline]
pub fn fix16_to_fract_trunc(x: Fix16) -> Fract32 {
    Fract32::saturating_from_num(x)
}

/// Absolute value of a 16.16 number, saturating `MIN` to `MAX`
#[inline]
pub fn fix16_abs(x: Fix16) -> Fix16 {
    x.saturating_abs()
}

/// Convert a host floating point sample into the internal format.  Out of
/// range values saturate and NaN maps to silence.
#[inline]
pub fn f32_to_fract(x: f32) -> Fract32 {
    if x.is_nan() {
        Fract32::ZERO
    } else {
        Fract32::saturating_from_num(x)
    }
}

/// Convert an internal sample to a host floating point sample
#[inline]
pub fn fract_to_f32(x: Fract32) -> f32 {
    x.to_num::<f32>()
}

/// Multiply the raw bits of a (possibly wide) difference by a coefficient with
/// `frac_bits` fractional bits, rounding the magnitude toward zero.
///
/// For `coeff < 1.0` the result is strictly smaller in magnitude than `diff`
/// whenever `diff != 0`, so repeated application reaches zero in a finite
/// number of steps.  Callers keep `|diff| < 2^33` and `coeff < 2^31`.
#[inline]
pub(crate) fn decay_toward_zero(diff: i64, coeff: i64, frac_bits: u32) -> i64 {
    // i64 division truncates toward zero, a shift would round toward -inf
    diff * coeff / (1i64 << frac_bits)
}
