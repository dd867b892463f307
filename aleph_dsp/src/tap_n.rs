//! Non-interpolated, clock-divided heads into an [AudioBuffer].

use crate::buffer::AudioBuffer;
use crate::context::Context;
use crate::fixedmath::{scale_fr32, Fix16, Fract32, TapIndex};

/// A "tap" or "head" with an integer position.  Every operation touches
/// exactly one slot.
///
/// The position only moves once every `divisor` calls to [BufferTapN::next],
/// which gives sample-and-hold style downsampled playback.  Like
/// [crate::tap::BufferTap], the buffer is passed to each sample operation.
#[derive(Clone, Debug)]
pub struct BufferTapN {
    frames: u32,
    loop_end: u32,
    idx: u32,
    inc: i32,
    div: u32,
    div_count: u32,
    context: Context,
}

impl BufferTapN {
    /// Bind a new tap to `buf`, at position 0, looping over the whole buffer,
    /// moving one frame per call with no clock division.
    pub fn new(buf: &AudioBuffer) -> Self {
        Self {
            frames: buf.frames(),
            loop_end: buf.frames().max(1),
            idx: 0,
            inc: 1,
            div: 1,
            div_count: 0,
            context: *buf.context(),
        }
    }
    /// Current position, in frames
    pub fn position(&self) -> u32 {
        self.idx
    }
    /// Frames moved per position update
    pub fn increment(&self) -> i32 {
        self.inc
    }
    /// Calls to [BufferTapN::next] per position update
    pub fn divisor(&self) -> u32 {
        self.div
    }
    /// The loop point: positions are kept in `[0, loop_frames)`
    pub fn loop_frames(&self) -> u32 {
        self.loop_end
    }
    /// Count one activation, moving the position by the increment once the
    /// count reaches the divisor
    pub fn next(&mut self) {
        self.div_count += 1;
        if self.div_count >= self.div {
            self.div_count = 0;
            self.idx = self.wrap(i64::from(self.idx) + i64::from(self.inc));
        }
    }
    /// Read the sample at the position
    pub fn read(&self, buf: &AudioBuffer) -> Fract32 {
        buf.get(self.idx as usize)
    }
    /// Overwrite the sample at the position
    pub fn write(&self, buf: &mut AudioBuffer, val: Fract32) {
        if let Some(slot) = buf.slot(self.idx as usize) {
            *slot = val;
        }
    }
    /// Scale the old sample by `pre_level` and add `val`
    pub fn mix(&self, buf: &mut AudioBuffer, val: Fract32, pre_level: Fix16) {
        if let Some(slot) = buf.slot(self.idx as usize) {
            *slot = scale_fr32(*slot, pre_level).saturating_add(val);
        }
    }
    /// Add `val` to the old sample
    pub fn add(&self, buf: &mut AudioBuffer, val: Fract32) {
        if let Some(slot) = buf.slot(self.idx as usize) {
            *slot = slot.saturating_add(val);
        }
    }
    /// Set the signed step taken on each position update
    pub fn set_inc(&mut self, inc: i32) {
        self.inc = inc;
    }
    /// Set the clock divisor.  Zero is treated as one.
    pub fn set_div(&mut self, div: u32) {
        self.div = div.max(1);
        if self.div_count >= self.div {
            self.div_count = 0;
        }
    }
    /// Bind to a different buffer, resetting position, loop and divisor count
    pub fn set_buffer(&mut self, buf: &AudioBuffer) {
        self.frames = buf.frames();
        self.loop_end = buf.frames().max(1);
        self.idx = 0;
        self.div_count = 0;
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
        self.idx = self.wrap(i64::from(self.idx));
    }
    /// Move to `target`'s position plus `offset` seconds (rounded down to a
    /// whole frame), wrapped into this tap's own loop
    pub fn sync(&mut self, target: &BufferTapN, offset: Fix16) {
        let offset = frames_floor(self.context.seconds_to_frames(offset));
        self.idx = self.wrap(i64::from(target.idx) + offset);
    }
    /// Set the position directly, in seconds (rounded down to a whole frame)
    pub fn set_pos(&mut self, secs: Fix16) {
        self.idx = self.wrap(frames_floor(self.context.seconds_to_frames(secs)));
    }
    /// Set the position directly, in frames
    pub fn set_pos_frames(&mut self, frames: u32) {
        self.idx = self.wrap(i64::from(frames));
    }
    fn wrap(&self, idx: i64) -> u32 {
        // rem_euclid of a positive u32 modulus always fits in u32
        idx.rem_euclid(i64::from(self.loop_end)) as u32
    }
}

fn frames_floor(frames: TapIndex) -> i64 {
    frames.to_bits() >> 32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_holds_position() {
        let mut storage = [Fract32::ZERO; 64];
        let buf = AudioBuffer::new(&Context::new_480(), &mut storage);
        let mut tap = BufferTapN::new(&buf);
        tap.set_div(4);
        for _ in 0..3 {
            tap.next();
        }
        assert_eq!(tap.position(), 0);
        tap.next();
        assert_eq!(tap.position(), 1);
        for _ in 0..8 {
            tap.next();
        }
        assert_eq!(tap.position(), 3);
    }
    #[test]
    fn zero_divisor_is_clamped() {
        let mut storage = [Fract32::ZERO; 8];
        let buf = AudioBuffer::new(&Context::new_480(), &mut storage);
        let mut tap = BufferTapN::new(&buf);
        tap.set_div(0);
        assert_eq!(tap.divisor(), 1);
        tap.next();
        assert_eq!(tap.position(), 1);
    }
    #[test]
    fn negative_increment_wraps() {
        let mut storage = [Fract32::ZERO; 10];
        let buf = AudioBuffer::new(&Context::new_480(), &mut storage);
        let mut tap = BufferTapN::new(&buf);
        tap.set_inc(-3);
        tap.next();
        assert_eq!(tap.position(), 7);
        tap.set_loop_frames(5);
        assert_eq!(tap.position(), 2);
        tap.next();
        assert_eq!(tap.position(), 4);
    }
    #[test]
    fn single_slot_operations() {
        let mut storage = [Fract32::lit("0.25"); 4];
        let mut buf = AudioBuffer::new(&Context::new_480(), &mut storage);
        let mut tap = BufferTapN::new(&buf);
        tap.set_pos_frames(2);
        tap.write(&mut buf, Fract32::lit("0.5"));
        assert_eq!(tap.read(&buf), Fract32::lit("0.5"));
        tap.add(&mut buf, Fract32::lit("0.125"));
        assert_eq!(tap.read(&buf), Fract32::lit("0.625"));
        tap.mix(&mut buf, Fract32::lit("0.125"), Fix16::lit("0.5"));
        assert_eq!(tap.read(&buf), Fract32::lit("0.4375"));
        tap.mix(&mut buf, Fract32::lit("0.1"), Fix16::ZERO);
        assert_eq!(tap.read(&buf), Fract32::lit("0.1"));
        assert_eq!(buf.data()[1], Fract32::lit("0.25"));
        assert_eq!(buf.data()[3], Fract32::lit("0.25"));
    }
    #[test]
    fn sync_and_set_pos() {
        let mut storage = [Fract32::ZERO; 4800];
        let buf = AudioBuffer::new(&Context::new_480(), &mut storage);
        let mut target = BufferTapN::new(&buf);
        let mut tap = BufferTapN::new(&buf);
        target.set_pos_frames(1000);
        tap.sync(&target, Fix16::ZERO);
        assert_eq!(tap.position(), target.position());
        tap.sync(&target, -Fix16::lit("0.0625"));
        assert_eq!(tap.position(), 2800);
        tap.set_pos(Fix16::lit("0.0625"));
        assert_eq!(tap.position(), 3000);
    }
}
