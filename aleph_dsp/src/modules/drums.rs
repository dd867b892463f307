use crate::context::Context;
use crate::devices::{EnvAsr, FilterSvf, Noise};
use crate::filter_1p::OnePoleFr32;
use crate::fixedmath::{add_fr32, fix16_abs, fix16_to_fract_trunc, mul_fr32, Fix16, Fract32};
use crate::module::{Frame, Module, NUM_CHANNELS};
use crate::params::{ParamDesc, ParamKind, ParamValue};

const BELOW_ONE: Fix16 = Fix16::from_bits(0xFFFF);
const NEG_ONE: Fix16 = Fix16::from_bits(-0x1_0000);
const AMP_SLEW_HZ: Fix16 = Fix16::lit("50");
const NOISE_SEED: u64 = 0x5EED_0D00;

/// Parameter indices of [Drums]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum DrumsParam {
    /// Envelope gate
    Gate,
    /// Filter cutoff
    SvfHz,
    /// Filter damping
    SvfRq,
    /// Lowpass level
    SvfLow,
    /// Highpass level
    SvfHigh,
    /// Bandpass level
    SvfBand,
    /// Notch level
    SvfNotch,
    /// Peak level
    SvfPeak,
    /// Noise level
    NoiseAmp,
    /// Input 0 level
    InAmp0,
    /// Input 1 level
    InAmp1,
    /// Input 2 level
    InAmp2,
    /// Input 3 level
    InAmp3,
    /// Attack time
    AtkDur,
    /// Release time
    RelDur,
    /// Attack curvature
    AtkCurve,
    /// Release curvature
    RelCurve,
}

impl TryFrom<u32> for DrumsParam {
    type Error = &'static str;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        use DrumsParam::*;
        const ALL: [DrumsParam; 17] = [
            Gate, SvfHz, SvfRq, SvfLow, SvfHigh, SvfBand, SvfNotch, SvfPeak, NoiseAmp, InAmp0,
            InAmp1, InAmp2, InAmp3, AtkDur, RelDur, AtkCurve, RelCurve,
        ];
        ALL.get(value as usize)
            .copied()
            .ok_or("Invalid drums parameter")
    }
}

/// Descriptor table of [Drums], indexed by [DrumsParam]
pub static DRUMS_PARAMS: [ParamDesc; 17] = [
    ParamDesc::int("gate", ParamKind::Gate, 0, 1),
    ParamDesc::fix("svfHz", ParamKind::Hz, Fix16::lit("32"), Fix16::lit("16384")),
    ParamDesc::fix("svfRq", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("svfLow", ParamKind::Amp, NEG_ONE, BELOW_ONE),
    ParamDesc::fix("svfHigh", ParamKind::Amp, NEG_ONE, BELOW_ONE),
    ParamDesc::fix("svfBand", ParamKind::Amp, NEG_ONE, BELOW_ONE),
    ParamDesc::fix("svfNotch", ParamKind::Amp, NEG_ONE, BELOW_ONE),
    ParamDesc::fix("svfPeak", ParamKind::Amp, NEG_ONE, BELOW_ONE),
    ParamDesc::fix("noiseAmp", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("inAmp0", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("inAmp1", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("inAmp2", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("inAmp3", ParamKind::Amp, Fix16::ZERO, BELOW_ONE),
    ParamDesc::fix("atkDur", ParamKind::Seconds, Fix16::ZERO, Fix16::lit("30")),
    ParamDesc::fix("relDur", ParamKind::Seconds, Fix16::ZERO, Fix16::lit("30")),
    ParamDesc::fix("atkCurve", ParamKind::Curve, NEG_ONE, BELOW_ONE),
    ParamDesc::fix("relCurve", ParamKind::Curve, NEG_ONE, BELOW_ONE),
];

/// Noise and four external inputs, mixed, filtered by a state-variable
/// filter and shaped by a gated amplitude envelope.
///
/// The mono result is copied to every output channel.  Gain changes glide
/// through one-pole smoothers so they never click.
#[derive(Clone, Debug)]
pub struct Drums {
    context: Context,
    noise: Noise,
    svf: FilterSvf,
    env: EnvAsr,
    noise_amp: OnePoleFr32,
    in_amp: [OnePoleFr32; NUM_CHANNELS],
}

impl Drums {
    /// A module with default settings and the default noise seed
    pub fn new(context: &Context) -> Self {
        Self::with_seed(context, NOISE_SEED)
    }
    /// A module with default settings whose noise source starts from `seed`
    pub fn with_seed(context: &Context, seed: u64) -> Self {
        let smoother = |level: Fract32| {
            let mut filt = OnePoleFr32::new(context);
            filt.set_hz(AMP_SLEW_HZ);
            filt.reset(level);
            filt
        };
        let mut svf = FilterSvf::new(context);
        svf.set_rq(Fract32::lit("0.5"));
        svf.set_low(Fract32::lit("0.5"));
        let mut env = EnvAsr::new();
        env.set_atk_shape(Fract32::lit("0.5"));
        env.set_rel_shape(Fract32::lit("0.5"));
        env.set_atk_dur(1000);
        env.set_rel_dur(10000);
        log::debug!(
            "Drums module at {} Hz, noise seed {:#x}",
            context.sample_rate(),
            seed
        );
        Self {
            context: *context,
            noise: Noise::new(seed),
            svf,
            env,
            noise_amp: smoother(Fract32::lit("0.25")),
            in_amp: core::array::from_fn(|_| smoother(Fract32::ZERO)),
        }
    }
    /// The amplitude envelope
    pub fn envelope(&self) -> &EnvAsr {
        &self.env
    }
    /// The level the noise gain is gliding toward
    pub fn noise_gain(&self) -> Fract32 {
        self.noise_amp.target()
    }
    /// The level input `channel`'s gain is gliding toward
    pub fn input_gain(&self, channel: usize) -> Option<Fract32> {
        self.in_amp.get(channel).map(|amp| amp.target())
    }
    /// Convenience wrapper around [Module::set_param] using a typed index
    pub fn set(&mut self, param: DrumsParam, value: impl Into<ParamValue>) {
        self.set_param(param as u32, value.into());
    }
}

impl Module for Drums {
    fn descriptors(&self) -> &'static [ParamDesc] {
        &DRUMS_PARAMS
    }
    fn apply_param(&mut self, idx: u32, value: ParamValue) {
        let Ok(param) = DrumsParam::try_from(idx) else {
            return;
        };
        let level = fix16_to_fract_trunc(value.as_fix());
        match param {
            DrumsParam::Gate => self.env.set_gate(value.as_int() > 0),
            DrumsParam::SvfHz => self.svf.set_hz(&self.context, value.as_fix()),
            DrumsParam::SvfRq => self.svf.set_rq(level),
            DrumsParam::SvfLow => self.svf.set_low(level),
            DrumsParam::SvfHigh => self.svf.set_high(level),
            DrumsParam::SvfBand => self.svf.set_band(level),
            DrumsParam::SvfNotch => self.svf.set_notch(level),
            DrumsParam::SvfPeak => self.svf.set_peak(level),
            DrumsParam::NoiseAmp => self.noise_amp.set_target(level),
            DrumsParam::InAmp0 => self.in_amp[0].set_target(level),
            DrumsParam::InAmp1 => self.in_amp[1].set_target(level),
            DrumsParam::InAmp2 => self.in_amp[2].set_target(level),
            DrumsParam::InAmp3 => self.in_amp[3].set_target(level),
            DrumsParam::AtkDur => self
                .env
                .set_atk_dur(self.context.seconds_to_frames_trunc(value.as_fix())),
            DrumsParam::RelDur => self
                .env
                .set_rel_dur(self.context.seconds_to_frames_trunc(value.as_fix())),
            DrumsParam::AtkCurve => self
                .env
                .set_atk_shape(fix16_to_fract_trunc(fix16_abs(value.as_fix()))),
            DrumsParam::RelCurve => self
                .env
                .set_rel_shape(fix16_to_fract_trunc(fix16_abs(value.as_fix()))),
        }
    }
    fn next(&mut self, input: &Frame) -> Frame {
        let mut sum = mul_fr32(self.noise.next(), self.noise_amp.next());
        for (x, amp) in input.iter().zip(self.in_amp.iter_mut()) {
            sum = add_fr32(sum, mul_fr32(*x, amp.next()));
        }
        let out = mul_fr32(self.svf.next(sum), self.env.next());
        [out; NUM_CHANNELS]
    }
}
