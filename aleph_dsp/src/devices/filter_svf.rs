use crate::context::Context;
use crate::fixedmath::{add_fr32, sub_fr32, Fix16, Fract32, I2F30};

/// Lowest cutoff accepted by [FilterSvf::set_hz]
pub const SVF_HZ_MIN: Fix16 = Fix16::lit("32");
/// Highest cutoff accepted by [FilterSvf::set_hz]
pub const SVF_HZ_MAX: Fix16 = Fix16::lit("16384");

/// A Chamberlin state-variable filter in the fractional domain
///
/// The filter computes low, high, band, notch and peak responses each frame
/// and returns a weighted sum of them.  The weights default to a pure lowpass.
/// All arithmetic saturates, so a filter driven to instability clips instead
/// of wrapping.
#[derive(Clone, Debug)]
pub struct FilterSvf {
    freq: I2F30,
    damp: I2F30,
    low_z: Fract32,
    band_z: Fract32,
    low_mix: Fract32,
    high_mix: Fract32,
    band_mix: Fract32,
    notch_mix: Fract32,
    peak_mix: Fract32,
}

impl FilterSvf {
    /// A lowpass at 220 Hz with moderate damping
    pub fn new(context: &Context) -> Self {
        let mut filt = Self {
            freq: I2F30::ZERO,
            damp: I2F30::ONE,
            low_z: Fract32::ZERO,
            band_z: Fract32::ZERO,
            low_mix: Fract32::MAX,
            high_mix: Fract32::ZERO,
            band_mix: Fract32::ZERO,
            notch_mix: Fract32::ZERO,
            peak_mix: Fract32::ZERO,
        };
        filt.set_hz(context, Fix16::lit("220"));
        filt
    }
    /// Set the cutoff frequency in Hz, clamped to `[32, 16384]`.  The
    /// tuning coefficient is `2 sin(pi * hz / sample_rate)`.
    pub fn set_hz(&mut self, context: &Context, hz: Fix16) {
        use num_traits::Float;
        let hz = hz.clamp(SVF_HZ_MIN, SVF_HZ_MAX).to_num::<f64>();
        let sr = f64::from(context.sample_rate());
        let freq = 2.0 * (core::f64::consts::PI * hz / sr).sin();
        self.freq = I2F30::saturating_from_num(freq);
    }
    /// Set the reciprocal of the resonance.  The damping applied is twice
    /// this value, so `rq` in `[0, 1)` spans self-oscillation to heavy damping.
    pub fn set_rq(&mut self, rq: Fract32) {
        self.damp = I2F30::from_num(rq.max(Fract32::ZERO)) * 2;
    }
    /// Level of the lowpass response in the output
    pub fn set_low(&mut self, level: Fract32) {
        self.low_mix = level;
    }
    /// Level of the highpass response in the output
    pub fn set_high(&mut self, level: Fract32) {
        self.high_mix = level;
    }
    /// Level of the bandpass response in the output
    pub fn set_band(&mut self, level: Fract32) {
        self.band_mix = level;
    }
    /// Level of the notch (low + high) response in the output
    pub fn set_notch(&mut self, level: Fract32) {
        self.notch_mix = level;
    }
    /// Level of the peak (low - high) response in the output
    pub fn set_peak(&mut self, level: Fract32) {
        self.peak_mix = level;
    }
    /// Clear the filter memory
    pub fn reset(&mut self) {
        self.low_z = Fract32::ZERO;
        self.band_z = Fract32::ZERO;
    }
    /// Filter one sample
    pub fn next(&mut self, input: Fract32) -> Fract32 {
        let low = add_fr32(self.low_z, gain(self.band_z, self.freq));
        let high = sub_fr32(sub_fr32(input, low), gain(self.band_z, self.damp));
        let band = add_fr32(self.band_z, gain(high, self.freq));
        self.low_z = low;
        self.band_z = band;
        let notch = add_fr32(low, high);
        let peak = sub_fr32(low, high);
        [
            (low, self.low_mix),
            (high, self.high_mix),
            (band, self.band_mix),
            (notch, self.notch_mix),
            (peak, self.peak_mix),
        ]
        .into_iter()
        .fold(Fract32::ZERO, |acc, (x, level)| {
            add_fr32(acc, x.saturating_mul(level))
        })
    }
}

#[inline]
fn gain(x: Fract32, g: I2F30) -> Fract32 {
    Fract32::saturating_from_num(x.wide_mul(g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn settle(filt: &mut FilterSvf, input: Fract32, frames: usize) -> Fract32 {
        let mut out = Fract32::ZERO;
        for _ in 0..frames {
            out = filt.next(input);
        }
        out
    }

    #[test]
    fn lowpass_passes_dc() {
        let ctx = Context::new_480();
        let mut filt = FilterSvf::new(&ctx);
        filt.set_rq(Fract32::lit("0.5"));
        let out = settle(&mut filt, Fract32::lit("0.25"), 48000);
        assert_approx_eq!(out.to_num::<f64>(), 0.25, 1e-3);
    }
    #[test]
    fn highpass_blocks_dc() {
        let ctx = Context::new_480();
        let mut filt = FilterSvf::new(&ctx);
        filt.set_rq(Fract32::lit("0.5"));
        filt.set_low(Fract32::ZERO);
        filt.set_high(Fract32::MAX);
        let out = settle(&mut filt, Fract32::lit("0.25"), 48000);
        assert_approx_eq!(out.to_num::<f64>(), 0.0, 1e-3);
    }
    #[test]
    fn silent_mix_is_silent() {
        let ctx = Context::new_441();
        let mut filt = FilterSvf::new(&ctx);
        filt.set_low(Fract32::ZERO);
        assert_eq!(settle(&mut filt, Fract32::lit("0.5"), 100), Fract32::ZERO);
    }
    #[test]
    fn cutoff_is_clamped() {
        let ctx = Context::new_480();
        let mut low = FilterSvf::new(&ctx);
        let mut clamped = FilterSvf::new(&ctx);
        low.set_hz(&ctx, SVF_HZ_MIN);
        clamped.set_hz(&ctx, Fix16::ONE);
        assert_eq!(low.freq, clamped.freq);
        low.set_hz(&ctx, SVF_HZ_MAX);
        clamped.set_hz(&ctx, Fix16::MAX);
        assert_eq!(low.freq, clamped.freq);
    }
    #[test]
    fn unstable_settings_do_not_overflow() {
        let ctx = Context::new_480();
        let mut filt = FilterSvf::new(&ctx);
        filt.set_hz(&ctx, SVF_HZ_MAX);
        filt.set_rq(Fract32::ZERO);
        filt.set_band(Fract32::MAX);
        for i in 0..10000 {
            let input = if i % 2 == 0 { Fract32::MAX } else { Fract32::MIN };
            filt.next(input);
        }
        filt.reset();
        assert_eq!(filt.next(Fract32::ZERO), Fract32::ZERO);
    }
}
