use crate::fixedmath::{add_fr32, mul_fr32, sub_fr32, Fract32};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Stage {
    #[default]
    Idle,
    Attack,
    Sustain,
    Release,
}

/// An attack/sustain/release envelope generator
///
/// Opening the gate ramps from the current level up to full scale over the
/// attack duration and then holds there.  Closing the gate ramps from the
/// current level down to zero over the release duration.  Because both ramps
/// start from wherever the envelope currently is, toggling the gate
/// mid-ramp never causes a jump.
///
/// The ramp shapes interpolate between a straight line (shape 0) and a
/// quadratic curve (shape approaching 1).  The output is always within
/// `[0, 1)`.
#[derive(Clone, Debug)]
pub struct EnvAsr {
    stage: Stage,
    gate: bool,
    level: Fract32,
    start: Fract32,
    pos: u32,
    progress: Fract32,
    atk_dur: u32,
    rel_dur: u32,
    atk_step: Fract32,
    rel_step: Fract32,
    atk_shape: Fract32,
    rel_shape: Fract32,
}

impl Default for EnvAsr {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvAsr {
    /// An idle envelope with single-frame linear ramps
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            gate: false,
            level: Fract32::ZERO,
            start: Fract32::ZERO,
            pos: 0,
            progress: Fract32::ZERO,
            atk_dur: 1,
            rel_dur: 1,
            atk_step: Fract32::MAX,
            rel_step: Fract32::MAX,
            atk_shape: Fract32::ZERO,
            rel_shape: Fract32::ZERO,
        }
    }
    /// Open or close the gate.  Setting the gate to its current state does
    /// nothing.
    pub fn set_gate(&mut self, on: bool) {
        if on == self.gate {
            return;
        }
        self.gate = on;
        self.start = self.level;
        self.pos = 0;
        self.progress = Fract32::ZERO;
        self.stage = if on { Stage::Attack } else { Stage::Release };
    }
    /// Set the attack duration in frames.  Zero is treated as one.
    pub fn set_atk_dur(&mut self, frames: u32) {
        self.atk_dur = frames.max(1);
        self.atk_step = step_for(self.atk_dur);
    }
    /// Set the release duration in frames.  Zero is treated as one.
    pub fn set_rel_dur(&mut self, frames: u32) {
        self.rel_dur = frames.max(1);
        self.rel_step = step_for(self.rel_dur);
    }
    /// Set the attack curvature.  Negative values are treated as zero.
    pub fn set_atk_shape(&mut self, shape: Fract32) {
        self.atk_shape = shape.max(Fract32::ZERO);
    }
    /// Set the release curvature.  Negative values are treated as zero.
    pub fn set_rel_shape(&mut self, shape: Fract32) {
        self.rel_shape = shape.max(Fract32::ZERO);
    }
    /// The state of the gate
    pub fn gate(&self) -> bool {
        self.gate
    }
    /// The last output value
    pub fn level(&self) -> Fract32 {
        self.level
    }
    /// False once a release has finished
    pub fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }
    /// Compute the next envelope value
    pub fn next(&mut self) -> Fract32 {
        match self.stage {
            Stage::Idle | Stage::Sustain => {}
            Stage::Attack => {
                self.pos += 1;
                self.progress = self.progress.saturating_add(self.atk_step);
                if self.pos >= self.atk_dur {
                    self.level = Fract32::MAX;
                    self.stage = Stage::Sustain;
                } else {
                    let curve = shape(self.progress, self.atk_shape);
                    let span = sub_fr32(Fract32::MAX, self.start);
                    self.level = add_fr32(self.start, mul_fr32(span, curve));
                }
            }
            Stage::Release => {
                self.pos += 1;
                self.progress = self.progress.saturating_add(self.rel_step);
                if self.pos >= self.rel_dur {
                    self.level = Fract32::ZERO;
                    self.stage = Stage::Idle;
                } else {
                    let curve = shape(self.progress, self.rel_shape);
                    self.level = sub_fr32(self.start, mul_fr32(self.start, curve));
                }
            }
        }
        self.level
    }
}

fn step_for(frames: u32) -> Fract32 {
    // frames >= 1, so the quotient fits in an i32
    Fract32::from_bits((i32::MAX as u32 / frames) as i32)
}

/// `(1 - s) * t + s * t^2` for `t, s` in `[0, 1)`
fn shape(t: Fract32, s: Fract32) -> Fract32 {
    let bend = sub_fr32(t, mul_fr32(t, t));
    sub_fr32(t, mul_fr32(s, bend))
}
