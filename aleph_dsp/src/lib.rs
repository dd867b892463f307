//! This crate contains all of the DSP logic for the audio core.  It is `no_std`
//! and never allocates: every buffer is handed in by the caller, and all
//! per-frame work is bounded so a module can run from an audio interrupt.
//!
//! All signal processing is fixed point.  Samples are [Fract32] (signed
//! fractional, `[-1, 1)`), control values such as frequencies and durations
//! are [Fix16] (16.16), and buffer positions are [TapIndex] (32.32).
//!
//! The building blocks are:
//!
//!  - [AudioBuffer], a block of sample memory, and the heads that move through
//!    it: the interpolating [BufferTap] and the clock-divided [BufferTapN]
//!  - the [OnePole] lag filters used for smoothing and glides
//!  - the signal sources in [devices]
//!
//! These are composed into [Module]s (see [modules]), which an [Engine] drives
//! from a lock-free [ParamTable] through either a single-frame or a block
//! entry point.

#![no_std]
#![warn(missing_docs)]

#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod context;
pub mod devices;
pub mod filter_1p;
pub mod fixedmath;
pub mod module;
pub mod modules;
pub mod params;
pub mod tap;
pub mod tap_n;

pub use buffer::AudioBuffer;
pub use context::{Context, FixedSampleRate};
pub use filter_1p::{OnePole, OnePoleFix16, OnePoleFr32};
pub use fixedmath::{Fix16, Fract32, TapIndex};
pub use module::{Engine, Frame, FrameIo, Module, NUM_CHANNELS};
pub use params::{ParamDesc, ParamKind, ParamTable, ParamValue};
pub use tap::BufferTap;
pub use tap_n::BufferTapN;
