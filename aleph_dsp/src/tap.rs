//! Interpolated read/write heads into an [AudioBuffer].

use crate::buffer::AudioBuffer;
use crate::context::Context;
use crate::fixedmath::{scale_fr32, Fix16, Fract32, TapIndex, U0F32};

/// A "tap" or "head" into an [AudioBuffer] with a fractional position.
///
/// The tap remembers the length and context of the buffer it was bound to,
/// but not the buffer itself: every operation touching samples takes the
/// buffer as an argument, and callers are expected to pass the same buffer
/// the tap was bound to.  Reading and writing never move the head; call
/// [BufferTap::next] once per frame to advance it by the increment, which
/// lets a frame read and write the same position as often as it likes.
///
/// Interpolation always touches the two slots straddling the position, with
/// the slot after the last frame of the buffer being slot 0.
#[derive(Clone, Debug)]
pub struct BufferTap {
    frames: u32,
    loop_end: u32,
    idx: TapIndex,
    inc: TapIndex,
    context: Context,
}

impl BufferTap {
    /// Bind a new tap to `buf`, at position 0, looping over the whole buffer,
    /// playing at the native rate.
    pub fn new(buf: &AudioBuffer) -> Self {
        Self {
            frames: buf.frames(),
            loop_end: buf.frames().max(1),
            idx: TapIndex::ZERO,
            inc: TapIndex::ONE,
            context: *buf.context(),
        }
    }
    /// Current position, in frames
    pub fn position(&self) -> TapIndex {
        self.idx
    }
    /// Frames advanced per call to [BufferTap::next]
    pub fn increment(&self) -> TapIndex {
        self.inc
    }
    /// The loop point: positions are kept in `[0, loop_frames)`
    pub fn loop_frames(&self) -> u32 {
        self.loop_end
    }
    /// Advance the position by the increment, wrapping into the loop
    pub fn next(&mut self) {
        self.idx = self.wrap(self.idx.saturating_add(self.inc));
    }
    /// Linear interpolation between the two slots around the position
    pub fn read(&self, buf: &AudioBuffer) -> Fract32 {
        let (a, b, frac) = self.straddle();
        let x = buf.get(a);
        if frac == U0F32::ZERO {
            return x;
        }
        let (wa, wb) = weights(frac);
        let y = buf.get(b);
        Fract32::from_num(x.wide_mul_unsigned(wa))
            .saturating_add(Fract32::from_num(y.wide_mul_unsigned(wb)))
    }
    /// Interpolated write, erasing the old contents of both slots
    pub fn write(&self, buf: &mut AudioBuffer, val: Fract32) {
        self.apply(buf, val, |_, new| new);
    }
    /// Interpolated mix: old contents are scaled by `pre_level` and the
    /// weighted new value is added.  A level of 0 is a [BufferTap::write],
    /// a level of exactly 1 is a [BufferTap::add].
    pub fn mix(&self, buf: &mut AudioBuffer, val: Fract32, pre_level: Fix16) {
        self.apply(buf, val, |old, new| {
            scale_fr32(old, pre_level).saturating_add(new)
        });
    }
    /// Interpolated add, keeping the old contents
    pub fn add(&self, buf: &mut AudioBuffer, val: Fract32) {
        self.apply(buf, val, |old, new| old.saturating_add(new));
    }
    /// Set the playback rate as a multiple of the native rate.  Negative
    /// rates play backwards.
    pub fn set_rate(&mut self, rate: Fix16) {
        self.inc = TapIndex::from_num(rate);
    }
    /// Set the per-step increment directly, in frames
    pub fn set_inc(&mut self, inc: TapIndex) {
        self.inc = inc;
    }
    /// Bind to a different buffer.  The position resets to 0 and the loop
    /// covers the whole of the new buffer.
    pub fn set_buffer(&mut self, buf: &AudioBuffer) {
        self.frames = buf.frames();
        self.loop_end = buf.frames().max(1);
        self.idx = TapIndex::ZERO;
        self.context = *buf.context();
    }
    /// Set the loop point in seconds, clamped to the buffer length
    pub fn set_loop(&mut self, secs: Fix16) {
        let frames = self.context.seconds_to_frames_trunc(secs);
        self.set_loop_frames(frames);
    }
    /// Set the loop point in frames, clamped to `[1, buffer length]`
    pub fn set_loop_frames(&mut self, frames: u32) {
        self.loop_end = frames.clamp(1, self.frames.max(1));
        self.idx = self.wrap(self.idx);
    }
    /// Move to `target`'s position plus `offset` seconds, wrapped into this
    /// tap's own loop.  Negative offsets put this tap behind the target,
    /// which is how a delay head follows a record head.
    pub fn sync(&mut self, target: &BufferTap, offset: Fix16) {
        let offset = self.context.seconds_to_frames(offset);
        self.idx = self.wrap(target.idx.saturating_add(offset));
    }
    /// Set the position directly, in seconds
    pub fn set_pos(&mut self, secs: Fix16) {
        self.idx = self.wrap(self.context.seconds_to_frames(secs));
    }
    /// Set the position directly, in frames
    pub fn set_pos_frames(&mut self, frames: TapIndex) {
        self.idx = self.wrap(frames);
    }
    fn wrap(&self, idx: TapIndex) -> TapIndex {
        let loop_bits = i64::from(self.loop_end) << 32;
        TapIndex::from_bits(idx.to_bits().rem_euclid(loop_bits))
    }
    fn straddle(&self) -> (usize, usize, U0F32) {
        let bits = self.idx.to_bits();
        let a = (bits >> 32) as usize;
        let b = if a + 1 >= self.frames as usize { 0 } else { a + 1 };
        (a, b, U0F32::from_bits(bits as u32))
    }
    fn apply<F>(&self, buf: &mut AudioBuffer, val: Fract32, op: F)
    where
        F: Fn(Fract32, Fract32) -> Fract32,
    {
        let (a, b, frac) = self.straddle();
        if frac == U0F32::ZERO {
            if let Some(slot) = buf.slot(a) {
                *slot = op(*slot, val);
            }
            return;
        }
        let (wa, wb) = weights(frac);
        if let Some(slot) = buf.slot(a) {
            *slot = op(*slot, Fract32::from_num(val.wide_mul_unsigned(wa)));
        }
        if let Some(slot) = buf.slot(b) {
            *slot = op(*slot, Fract32::from_num(val.wide_mul_unsigned(wb)));
        }
    }
}

// (1 - frac, frac) for a nonzero fractional position
#[inline]
fn weights(frac: U0F32) -> (U0F32, U0F32) {
    (U0F32::from_bits(frac.to_bits().wrapping_neg()), frac)
}
