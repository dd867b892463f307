//! This module provides objects to reason about the processing context.
//! Currently, the only information wrapped is the current audio sample rate,
//! along with the conversions between time (in seconds) and frame counts that
//! depend on it.

use crate::fixedmath::{Fix16, TapIndex, I48F16};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// An enum representing all of the supported sample rates.  Parameters that
/// are expressed in seconds or Hz are converted against this rate, so it is a
/// closed set rather than an arbitrary integer.
pub enum FixedSampleRate {
    /// 44.1kHz sample rate
    Khz44_1,
    /// 48kHz sample rate, the rate of the audio codec on hardware
    #[default]
    Khz48_0,
}

impl FixedSampleRate {
    /// Converts this sample rate to a u16
    pub const fn value(&self) -> u16 {
        match self {
            Self::Khz44_1 => 44100u16,
            Self::Khz48_0 => 48000u16,
        }
    }
}

impl TryFrom<u32> for FixedSampleRate {
    type Error = &'static str;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            44100 => Ok(Self::Khz44_1),
            48000 => Ok(Self::Khz48_0),
            _ => Err("Unsupported Sample Rate"),
        }
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
/// A fixed-point processing context
pub struct Context {
    /// The sample rate, as one of the supported FixedSampleRates:
    pub sample_rate: FixedSampleRate,
}

impl Context {
    /// Create a new context with a sample rate of 44.1kHz
    pub const fn new_441() -> Self {
        Self {
            sample_rate: FixedSampleRate::Khz44_1,
        }
    }
    /// Create a new context with a sample rate of 48kHz
    pub const fn new_480() -> Self {
        Self {
            sample_rate: FixedSampleRate::Khz48_0,
        }
    }
    /// Create a processing context if the sample rate provided is a
    /// supported sample rate, or return `None` otherwise.
    pub fn maybe_create(value: u32) -> Option<Self> {
        FixedSampleRate::try_from(value)
            .ok()
            .map(|sample_rate| Self { sample_rate })
    }
    /// The sample rate, in Hz
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate.value() as u32
    }
    /// Convert a (possibly negative) duration to a fractional frame count.
    /// Saturates at the range of [TapIndex].
    pub fn seconds_to_frames(&self, secs: Fix16) -> TapIndex {
        TapIndex::from_num(secs).saturating_mul_int(i64::from(self.sample_rate.value()))
    }
    /// Convert a duration to a whole number of frames, truncating.  Negative
    /// durations give zero frames.
    pub fn seconds_to_frames_trunc(&self, secs: Fix16) -> u32 {
        self.seconds_to_frames(secs).saturating_to_num::<u32>()
    }
    /// Convert a frame count to a duration in seconds, saturating at the
    /// range of [Fix16]
    pub fn frames_to_seconds(&self, frames: u32) -> Fix16 {
        let secs = I48F16::from_num(frames) / i64::from(self.sample_rate.value());
        Fix16::saturating_from_num(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_rates_are_rejected() {
        assert!(Context::maybe_create(96000).is_none());
        assert_eq!(
            Context::maybe_create(44100).map(|c| c.sample_rate()),
            Some(44100)
        );
        assert_eq!(
            FixedSampleRate::try_from(22050),
            Err("Unsupported Sample Rate")
        );
    }
    #[test]
    fn second_frame_conversions() {
        let ctx = Context::new_480();
        assert_eq!(ctx.seconds_to_frames_trunc(Fix16::ONE), 48000);
        assert_eq!(ctx.seconds_to_frames_trunc(Fix16::lit("0.5")), 24000);
        assert_eq!(ctx.seconds_to_frames_trunc(Fix16::from_num(-1)), 0);
        assert_eq!(
            ctx.seconds_to_frames(Fix16::from_num(-1)),
            TapIndex::from_num(-48000)
        );
        assert_eq!(ctx.frames_to_seconds(96000), Fix16::from_num(2));
        assert_eq!(ctx.frames_to_seconds(u32::MAX), Fix16::MAX);
    }
}
