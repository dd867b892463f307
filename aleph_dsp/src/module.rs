//! Synthesis modules and the engine that drives them.
//!
//! A [Module] is one self-contained synthesis graph (for example
//! [crate::modules::Drums]).  It owns all of its generators, filters and taps
//! and does a fixed amount of work per frame in [Module::next].
//!
//! The [Engine] wraps a module together with the [ParamTable] written by the
//! control path, and exposes the two calling conventions used by the targets:
//! a single frame per interrupt ([Engine::process_frame]) and interleaved
//! floating point blocks ([Engine::process_block]).  Both adapters call the
//! same per-frame computation.

use crate::fixedmath::{f32_to_fract, fract_to_f32, Fract32};
use crate::params::{ParamDesc, ParamTable, ParamValue};

/// Number of audio channels in a frame
pub const NUM_CHANNELS: usize = 4;

/// One multi-channel sample instant
pub type Frame = [Fract32; NUM_CHANNELS];

/// The silent frame
pub const SILENCE: Frame = [Fract32::ZERO; NUM_CHANNELS];

/// A synthesis module
///
/// Implementors provide their descriptor table, a dispatch from (already
/// clamped) parameter values to their internal state, and the per-frame
/// computation.  Neither `next` nor `apply_param` may allocate or block.
pub trait Module {
    /// The parameter descriptors, in index order
    fn descriptors(&self) -> &'static [ParamDesc];
    /// Apply a value that has already been clamped by its descriptor.
    /// `idx` is always a valid index into [Module::descriptors].
    fn apply_param(&mut self, idx: u32, value: ParamValue);
    /// Compute one output frame from one input frame
    fn next(&mut self, input: &Frame) -> Frame;
    /// Number of parameters
    fn num_params(&self) -> u32 {
        self.descriptors().len() as u32
    }
    /// Clamp `value` into the parameter's range and apply it.  Unknown
    /// indices are ignored.
    fn set_param(&mut self, idx: u32, value: ParamValue) {
        match self.descriptors().get(idx as usize) {
            Some(desc) => {
                let value = desc.clamp(value);
                self.apply_param(idx, value);
            }
            None => log::trace!("Ignoring write to unknown parameter {}", idx),
        }
    }
    /// Look up a parameter index by its label (case insensitive)
    fn param_index(&self, label: &str) -> Option<u32> {
        self.descriptors()
            .iter()
            .position(|desc| desc.label.eq_ignore_ascii_case(label))
            .map(|idx| idx as u32)
    }
}

/// The fixed input and output slots of the embedded frame callback
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameIo {
    /// Samples captured for this frame
    pub input: Frame,
    /// Samples to play for this frame
    pub output: Frame,
}

/// Drives a [Module] from a [ParamTable]
pub struct Engine<'a, M: Module> {
    module: M,
    params: &'a ParamTable,
}

impl<'a, M: Module> Engine<'a, M> {
    /// Constructor
    pub fn new(module: M, params: &'a ParamTable) -> Self {
        if params.len() < module.num_params() as usize {
            log::warn!(
                "Parameter table has {} slots for {} parameters",
                params.len(),
                module.num_params()
            );
        }
        Self { module, params }
    }
    /// The driven module
    pub fn module(&self) -> &M {
        &self.module
    }
    /// Mutable access to the driven module, e.g. to set parameters directly
    /// from the audio context
    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }
    /// The control surface
    pub fn params(&self) -> &'a ParamTable {
        self.params
    }
    /// Consume the engine, returning the module
    pub fn into_inner(self) -> M {
        self.module
    }
    /// Apply every parameter written since the last call.  Bounded by the
    /// table size.
    fn apply_pending(&mut self) {
        let mut mask = self.params.take_dirty();
        while mask != 0 {
            let idx = mask.trailing_zeros();
            mask &= mask - 1;
            let (Some(bits), Some(desc)) = (
                self.params.get(idx),
                self.module.descriptors().get(idx as usize),
            ) else {
                continue;
            };
            let value = desc.kind.value_from_bits(bits);
            self.module.set_param(idx, value);
        }
    }
    /// Single-frame entry point: read `io.input`, write `io.output`
    pub fn process_frame(&mut self, io: &mut FrameIo) {
        self.apply_pending();
        io.output = if self.params.is_enabled() {
            self.module.next(&io.input)
        } else {
            SILENCE
        };
    }
    /// Block entry point over interleaved host samples ([NUM_CHANNELS] per
    /// frame).  Processes at most `frames` frames, fewer if either slice is
    /// too short, and returns the number processed.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32], frames: usize) -> usize {
        self.apply_pending();
        let enabled = self.params.is_enabled();
        let mut count = 0;
        for (inp, out) in input
            .chunks_exact(NUM_CHANNELS)
            .zip(output.chunks_exact_mut(NUM_CHANNELS))
            .take(frames)
        {
            let result = if enabled {
                let mut frame = SILENCE;
                for (smp, x) in frame.iter_mut().zip(inp) {
                    *smp = f32_to_fract(*x);
                }
                self.module.next(&frame)
            } else {
                SILENCE
            };
            for (x, smp) in out.iter_mut().zip(result) {
                *x = fract_to_f32(smp);
            }
            count += 1;
        }
        count
    }
}
