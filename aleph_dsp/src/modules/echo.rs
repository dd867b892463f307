use crate::buffer::AudioBuffer;
use crate::context::Context;
use crate::filter_1p::OnePoleFix16;
use crate::fixedmath::{add_fr32, fix16_to_fract_trunc, mul_fr32, sub_fr32, Fix16, Fract32};
use crate::module::{Frame, Module, NUM_CHANNELS};
use crate::params::{ParamDesc, ParamKind, ParamValue};
use crate::tap::BufferTap;
use crate::tap_n::BufferTapN;

const BELOW_ONE: Fix16 = Fix16::from_bits(0xFFFF);

/// Longest delay time accepted by the `time` parameter, in seconds
pub const ECHO_MAX_TIME: Fix16 = Fix16::lit("2");

/// Parameter indices of [Echo]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum EchoParam {
    /// Delay time in seconds
    Time,
    /// Amount of the delayed signal written back into the line
    Feedback,
    /// Dry/wet balance
    Mix,
    /// Playback rate of the delayed head
    Rate,
    /// Cutoff of the delay time glide in Hz (0 jumps immediately)
    TimeSlew,
    /// Clock divisor of the downsampled head
    CrushDiv,
    /// Level of the downsampled head
    CrushAmp,
}

impl TryFrom<u32> for EchoParam {
    type Error = &'static str;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Time),
            1 => Ok(Self::Feedback),
            2 => Ok(Self::Mix),
            3 => Ok(Self::Rate),
            4 => Ok(Self::TimeSlew),
            5 => Ok(Self::CrushDiv),
            6 => Ok(Self::CrushAmp),
            _ => Err("Invalid echo parameter"),
        }
    }
}

/// Descriptor table of [Echo], indexed by [EchoParam]
pub static ECHO_PARAMS: [ParamDesc; 7] = [
    ParamDesc::fix("time", ParamKind::Seconds, Fix16::lit("0.001"), ECHO_MAX_TIME),
    ParamDesc::fix("feedback", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("mix", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("rate", ParamKind::Rate, Fix16::from_bits(-0x2_0000), Fix16::lit("2")),
    ParamDesc::fix("timeSlew", ParamKind::Hz, Fix16::ZERO, Fix16::lit("100")),
    ParamDesc::int("crushDiv", ParamKind::Divisor, 1, 64),
    ParamDesc::fix("crushAmp", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
];

/// A feedback delay line built from buffer taps.
///
/// A record head writes input plus feedback into the line at native rate.  An
/// interpolated playback head is phase locked to the record head at minus
/// the delay time; while the delay time glides, the playback head is re-synced
/// every frame.  A clock-divided head reads the same line in steps of
/// `crushDiv` frames for a sample-and-hold flavoured echo.
///
/// The first input channel is processed and the result is copied to every
/// output channel.
pub struct Echo<'a> {
    buf: AudioBuffer<'a>,
    record: BufferTap,
    play: BufferTap,
    crush: BufferTapN,
    time: OnePoleFix16,
    feedback: Fract32,
    mix: Fract32,
    crush_amp: Fract32,
}

impl<'a> Echo<'a> {
    /// Frames of storage needed to reach [ECHO_MAX_TIME]
    pub fn storage_frames(context: &Context) -> usize {
        context.seconds_to_frames_trunc(ECHO_MAX_TIME) as usize + 1
    }
    /// Build an echo over `storage`, which is cleared.  Delay times longer
    /// than the storage wrap around it.
    pub fn new(context: &Context, storage: &'a mut [Fract32]) -> Self {
        let mut buf = AudioBuffer::new(context, storage);
        buf.clear();
        let record = BufferTap::new(&buf);
        let mut play = BufferTap::new(&buf);
        let mut crush = BufferTapN::new(&buf);
        let mut time = OnePoleFix16::new(context);
        time.set_hz(Fix16::lit("2"));
        time.reset(Fix16::lit("0.25"));
        play.sync(&record, -time.current());
        crush.set_div(4);
        crush.set_inc(4);
        crush.set_pos_frames(play.position().saturating_to_num::<u32>());
        log::debug!(
            "Echo module at {} Hz over {} frames",
            context.sample_rate(),
            buf.frames()
        );
        Self {
            buf,
            record,
            play,
            crush,
            time,
            feedback: Fract32::lit("0.5"),
            mix: Fract32::lit("0.5"),
            crush_amp: Fract32::ZERO,
        }
    }
    /// The delay line
    pub fn buffer(&self) -> &AudioBuffer<'a> {
        &self.buf
    }
    /// The current (possibly gliding) delay time
    pub fn delay_time(&self) -> Fix16 {
        self.time.current()
    }
    /// Convenience wrapper around [Module::set_param] using a typed index
    pub fn set(&mut self, param: EchoParam, value: impl Into<ParamValue>) {
        self.set_param(param as u32, value.into());
    }
}

impl Module for Echo<'_> {
    fn descriptors(&self) -> &'static [ParamDesc] {
        &ECHO_PARAMS
    }
    fn apply_param(&mut self, idx: u32, value: ParamValue) {
        let Ok(param) = EchoParam::try_from(idx) else {
            return;
        };
        match param {
            EchoParam::Time => self.time.set_target(value.as_fix()),
            EchoParam::Feedback => self.feedback = fix16_to_fract_trunc(value.as_fix()),
            EchoParam::Mix => self.mix = fix16_to_fract_trunc(value.as_fix()),
            EchoParam::Rate => self.play.set_rate(value.as_fix()),
            EchoParam::TimeSlew => {
                let hz = value.as_fix();
                if hz == Fix16::ZERO {
                    self.time.set_coeff(Fix16::ZERO);
                } else {
                    self.time.set_hz(hz);
                }
            }
            EchoParam::CrushDiv => {
                let div = value.as_int();
                self.crush.set_div(div as u32);
                self.crush.set_inc(div);
            }
            EchoParam::CrushAmp => self.crush_amp = fix16_to_fract_trunc(value.as_fix()),
        }
    }
    fn next(&mut self, input: &Frame) -> Frame {
        let gliding = !self.time.is_settled();
        let time = self.time.next();
        if gliding {
            self.play.sync(&self.record, -time);
            self.crush
                .set_pos_frames(self.play.position().saturating_to_num::<u32>());
        }
        let dry = input[0];
        let wet = self.play.read(&self.buf);
        let crushed = self.crush.read(&self.buf);
        self.record
            .write(&mut self.buf, add_fr32(dry, mul_fr32(wet, self.feedback)));
        let out = add_fr32(
            add_fr32(
                mul_fr32(dry, sub_fr32(Fract32::MAX, self.mix)),
                mul_fr32(wet, self.mix),
            ),
            mul_fr32(crushed, self.crush_amp),
        );
        self.record.next();
        self.play.next();
        self.crush.next();
        [out; NUM_CHANNELS]
    }
}
