//! One-pole exponential lag filters with convergence detection.
//!
//! These are used everywhere a value should glide rather than jump: parameter
//! smoothing (gains, delay times) as well as simple audio-rate lowpassing.
//! Two numeric variants share a single state machine:
//!
//!  - [OnePoleFr32] works on [Fract32] values in `[-1, 1)`
//!  - [OnePoleFix16] works on [Fix16] values (Hz, seconds, ...)
//!
//! Once the output is within a small threshold of the target the filter snaps
//! to the target and is marked *settled*.  A settled filter does no arithmetic
//! at all in [OnePole::next], so idle smoothers are free in the frame callback.

use crate::context::Context;
use crate::fixedmath::{decay_toward_zero, Fix16, Fract32};

pub(crate) mod detail {
    pub trait OnePoleOps: Copy + Default + PartialEq {
        /// The largest difference from the target (in raw bits) that snaps
        const SNAP_THRESHOLD: i64;
        /// Fractional bits of the coefficient
        const COEFF_FRAC_BITS: u32;
        /// Map an exponential decay factor in `[0, 1]` to a coefficient
        /// strictly below unity
        fn coeff_from_decay(decay: f64) -> Self;
        fn wide_bits(self) -> i64;
        /// Caller guarantees the bits are in range for the type
        fn from_wide_bits(bits: i64) -> Self;
    }
}

use detail::OnePoleOps;

impl OnePoleOps for Fract32 {
    const SNAP_THRESHOLD: i64 = 0x7;
    const COEFF_FRAC_BITS: u32 = 31;
    fn coeff_from_decay(decay: f64) -> Self {
        // saturates at MAX, which is already below 1.0
        Fract32::saturating_from_num(decay.max(0.0))
    }
    fn wide_bits(self) -> i64 {
        i64::from(self.to_bits())
    }
    fn from_wide_bits(bits: i64) -> Self {
        Fract32::from_bits(bits as i32)
    }
}

impl OnePoleOps for Fix16 {
    // 16 LSB rather than a whole unit, so glides in Hz or seconds land on
    // the target instead of stopping up to 1.0 short of it
    const SNAP_THRESHOLD: i64 = 0x10;
    const COEFF_FRAC_BITS: u32 = 16;
    fn coeff_from_decay(decay: f64) -> Self {
        const BELOW_ONE: Fix16 = Fix16::from_bits(0xFFFF);
        Fix16::saturating_from_num(decay.max(0.0)).min(BELOW_ONE)
    }
    fn wide_bits(self) -> i64 {
        i64::from(self.to_bits())
    }
    fn from_wide_bits(bits: i64) -> Self {
        Fix16::from_bits(bits as i32)
    }
}

/// A one-pole lowpass/lag filter.  See the [module docs](self).
#[derive(Clone, Debug)]
pub struct OnePole<T: OnePoleOps> {
    coeff: T,
    y: T,
    x: T,
    settled: bool,
    context: Context,
}

/// A one-pole filter over audio-format values
pub type OnePoleFr32 = OnePole<Fract32>;
/// A one-pole filter over 16.16 values
pub type OnePoleFix16 = OnePole<Fix16>;

impl<T: OnePoleOps> OnePole<T> {
    /// A zeroed, settled filter with a coefficient of zero (no lag)
    pub fn new(context: &Context) -> Self {
        Self {
            coeff: T::default(),
            y: T::default(),
            x: T::default(),
            settled: true,
            context: *context,
        }
    }
    /// Set the cutoff frequency: the coefficient becomes
    /// `exp(-2 * pi * hz / sample_rate)`, clamped below unity.  Negative
    /// frequencies are treated as zero.
    pub fn set_hz(&mut self, hz: Fix16) {
        use num_traits::Float;
        let hz = hz.max(Fix16::ZERO).to_num::<f64>();
        let sr = f64::from(self.context.sample_rate());
        self.coeff = T::coeff_from_decay((-core::f64::consts::TAU * hz / sr).exp());
    }
    /// Set the decay coefficient directly (0 = no lag).  The coefficient is
    /// clamped to `[0, 1)` so the filter always converges without
    /// overshooting.
    pub fn set_coeff(&mut self, coeff: T) {
        let min = T::coeff_from_decay(0.0);
        let max = T::coeff_from_decay(1.0);
        self.coeff = if coeff.wide_bits() > max.wide_bits() {
            max
        } else if coeff.wide_bits() < min.wide_bits() {
            min
        } else {
            coeff
        };
    }
    /// Set a new target.  Setting the value the filter already rests at
    /// leaves it settled.
    pub fn set_target(&mut self, value: T) {
        self.x = value;
        self.settled = value == self.y;
    }
    /// Jump straight to `value` with no glide
    pub fn reset(&mut self, value: T) {
        self.x = value;
        self.y = value;
        self.settled = true;
    }
    /// Compute and return the next output value
    pub fn next(&mut self) -> T {
        if self.settled {
            return self.y;
        }
        let target = self.x.wide_bits();
        let diff = decay_toward_zero(
            self.y.wide_bits() - target,
            self.coeff.wide_bits(),
            T::COEFF_FRAC_BITS,
        );
        if diff.abs() <= T::SNAP_THRESHOLD {
            self.y = self.x;
            self.settled = true;
        } else {
            // |diff| shrank, so target + diff lies between target and the
            // previous output and is in range
            self.y = T::from_wide_bits(target + diff);
        }
        self.y
    }
    /// The last output value
    pub fn current(&self) -> T {
        self.y
    }
    /// The value being approached
    pub fn target(&self) -> T {
        self.x
    }
    /// The decay coefficient
    pub fn coefficient(&self) -> T {
        self.coeff
    }
    /// True once the output has reached the target
    pub fn is_settled(&self) -> bool {
        self.settled
    }
}
