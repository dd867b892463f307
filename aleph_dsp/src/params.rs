//! The parameter control surface shared between the control path and the
//! frame callback.
//!
//! Parameters are addressed by a small index (`0..N`) into a per-module
//! descriptor table.  Values arrive as [ParamValue]s, which are either plain
//! integers (gates, divisors) or 16.16 fixed point numbers (Hz, seconds,
//! levels).  Both share the same 32 bits, which is what lets [ParamTable]
//! store every slot in a single atomic word.

use crate::fixedmath::Fix16;
use core::str::FromStr;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

/// The most parameters a single [ParamTable] can carry
pub const MAX_PARAMS: usize = 32;

/// A parameter value: a signed integer or a 16.16 fixed point number
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    /// Integer value (gates, clock divisors)
    Int(i32),
    /// 16.16 value (frequencies, durations, levels)
    Fix(Fix16),
}

impl ParamValue {
    /// The value as an integer.  A fixed point value is reinterpreted, not
    /// converted.
    pub const fn as_int(self) -> i32 {
        self.bits()
    }
    /// The value as 16.16.  An integer value is reinterpreted, not converted.
    pub const fn as_fix(self) -> Fix16 {
        Fix16::from_bits(self.bits())
    }
    /// The raw 32 bits of the value
    pub const fn bits(self) -> i32 {
        match self {
            Self::Int(i) => i,
            Self::Fix(f) => f.to_bits(),
        }
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<Fix16> for ParamValue {
    fn from(value: Fix16) -> Self {
        Self::Fix(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Int(value as i32)
    }
}

/// What a parameter means, which also decides its [ParamValue] tag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamKind {
    /// On/off, as an integer (`> 0` is on)
    Gate,
    /// A frequency in Hz
    Hz,
    /// A linear level
    Amp,
    /// A duration in seconds
    Seconds,
    /// A curve shape
    Curve,
    /// A playback rate multiplier
    Rate,
    /// An integer clock divisor
    Divisor,
}

impl ParamKind {
    /// True if values of this kind are integers
    pub const fn is_int(self) -> bool {
        matches!(self, Self::Gate | Self::Divisor)
    }
    /// Rebuild a tagged value from its raw bits
    pub const fn value_from_bits(self, bits: i32) -> ParamValue {
        if self.is_int() {
            ParamValue::Int(bits)
        } else {
            ParamValue::Fix(Fix16::from_bits(bits))
        }
    }
}

/// Describes one parameter of a module: its name, meaning and valid range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamDesc {
    /// Name, used to look the parameter up from text
    pub label: &'static str,
    /// Meaning of the value
    pub kind: ParamKind,
    /// Smallest accepted value
    pub min: ParamValue,
    /// Largest accepted value
    pub max: ParamValue,
}

impl ParamDesc {
    /// Describe an integer parameter
    pub const fn int(label: &'static str, kind: ParamKind, min: i32, max: i32) -> Self {
        Self {
            label,
            kind,
            min: ParamValue::Int(min),
            max: ParamValue::Int(max),
        }
    }
    /// Describe a 16.16 parameter
    pub const fn fix(label: &'static str, kind: ParamKind, min: Fix16, max: Fix16) -> Self {
        Self {
            label,
            kind,
            min: ParamValue::Fix(min),
            max: ParamValue::Fix(max),
        }
    }
    /// Retag `value` for this parameter's kind and clamp it into range
    pub fn clamp(&self, value: ParamValue) -> ParamValue {
        if self.kind.is_int() {
            ParamValue::Int(value.as_int().clamp(self.min.as_int(), self.max.as_int()))
        } else {
            ParamValue::Fix(value.as_fix().clamp(self.min.as_fix(), self.max.as_fix()))
        }
    }
    /// Parse a textual value (`"1"`, `"-0.25"`, `"440"`) for this parameter.
    /// The result is clamped into range.
    pub fn parse(&self, text: &str) -> Result<ParamValue, &'static str> {
        let text = text.trim();
        let value = if self.kind.is_int() {
            ParamValue::Int(i32::from_str(text).map_err(|_| "Expected an integer value")?)
        } else {
            ParamValue::Fix(Fix16::from_str(text).map_err(|_| "Expected a numeric value")?)
        };
        Ok(self.clamp(value))
    }
}

/// A lock-free table of pending parameter writes.
///
/// The control path calls [ParamTable::set] from any thread; the engine
/// drains the changes at the next frame or block boundary with
/// [ParamTable::take_dirty] and [ParamTable::get].  Each slot is a single
/// atomic word, so a value is never observed half written, but no ordering
/// is promised between different slots written back to back.
#[derive(Debug)]
pub struct ParamTable {
    slots: [AtomicI32; MAX_PARAMS],
    dirty: AtomicU32,
    enabled: AtomicBool,
    len: usize,
}

impl ParamTable {
    /// A table with `len` slots (at most [MAX_PARAMS]), enabled, with
    /// nothing pending
    pub fn new(len: usize) -> Self {
        Self {
            slots: core::array::from_fn(|_| AtomicI32::new(0)),
            dirty: AtomicU32::new(0),
            enabled: AtomicBool::new(true),
            len: len.min(MAX_PARAMS),
        }
    }
    /// Number of usable slots
    pub fn len(&self) -> usize {
        self.len
    }
    /// True if the table has no slots
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Queue a write of `value` to slot `idx`.  Out of range indices are
    /// ignored.  A second write before the engine drains the table replaces
    /// the first.
    pub fn set(&self, idx: u32, value: ParamValue) {
        let Some(slot) = self.slots[..self.len].get(idx as usize) else {
            return;
        };
        slot.store(value.bits(), Ordering::Relaxed);
        self.dirty.fetch_or(1 << idx, Ordering::Release);
    }
    /// Raw bits most recently written to slot `idx`
    pub fn get(&self, idx: u32) -> Option<i32> {
        self.slots[..self.len]
            .get(idx as usize)
            .map(|slot| slot.load(Ordering::Relaxed))
    }
    /// Return the mask of slots written since the last call, clearing it
    pub fn take_dirty(&self) -> u32 {
        self.dirty.swap(0, Ordering::Acquire)
    }
    /// True if any slot has been written since the last drain
    pub fn has_pending(&self) -> bool {
        self.dirty.load(Ordering::Relaxed) != 0
    }
    /// Start or stop processing.  A disabled engine outputs silence.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
    /// See [ParamTable::set_enabled]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}
