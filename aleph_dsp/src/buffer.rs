//! Mono sample storage shared by any number of buffer taps.

use crate::context::Context;
use crate::fixedmath::{Fix16, Fract32};

/// The largest number of frames a buffer can address
pub const MAX_FRAMES: u32 = i32::MAX as u32;

/// A fixed-capacity block of fractional samples plus its timing metadata.
///
/// The buffer never allocates: storage is handed in at construction and must
/// outlive the buffer (and therefore every tap operating on it).  Taps do not
/// hold a reference to the buffer; it is passed to each tap operation instead,
/// so a record head and several playback heads can share one buffer without
/// aliasing.
pub struct AudioBuffer<'a> {
    data: &'a mut [Fract32],
    dur: Fix16,
    context: Context,
}

impl<'a> AudioBuffer<'a> {
    /// Bind `data` as the backing storage.  The frame count is the slice
    /// length and the duration is derived from the context's sample rate.
    pub fn new(context: &Context, data: &'a mut [Fract32]) -> Self {
        // positions are 32.32 signed, so cap the addressable range
        let len = data.len().min(MAX_FRAMES as usize);
        let (data, _) = data.split_at_mut(len);
        Self {
            dur: context.frames_to_seconds(len as u32),
            data,
            context: *context,
        }
    }
    /// Number of addressable sample slots
    pub fn frames(&self) -> u32 {
        self.data.len() as u32
    }
    /// The processing context used for second/frame conversions
    pub fn context(&self) -> &Context {
        &self.context
    }
    /// Duration of the whole buffer, in seconds
    pub fn duration(&self) -> Fix16 {
        self.dur
    }
    /// True if the buffer has no storage at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Zero every sample
    pub fn clear(&mut self) {
        self.data.fill(Fract32::ZERO);
    }
    /// Read-only view of the samples
    pub fn data(&self) -> &[Fract32] {
        &*self.data
    }
    /// Mutable view of the samples
    pub fn data_mut(&mut self) -> &mut [Fract32] {
        &mut *self.data
    }
    #[inline]
    pub(crate) fn get(&self, idx: usize) -> Fract32 {
        self.data.get(idx).copied().unwrap_or_default()
    }
    #[inline]
    pub(crate) fn slot(&mut self, idx: usize) -> Option<&mut Fract32> {
        self.data.get_mut(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_follows_sample_rate() {
        let mut storage = [Fract32::ZERO; 480];
        let buf = AudioBuffer::new(&Context::new_480(), &mut storage);
        assert_eq!(buf.frames(), 480);
        assert_eq!(buf.duration(), Fix16::lit("0.01"));
    }
    #[test]
    fn clear_zeroes_storage() {
        let mut storage = [Fract32::MAX; 16];
        let mut buf = AudioBuffer::new(&Context::new_441(), &mut storage);
        buf.clear();
        assert!(buf.data().iter().all(|x| *x == Fract32::ZERO));
    }
}
