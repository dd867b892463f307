//! Offline rendering of a module through the block adapter.

use aleph_dsp::{Engine, Module, ParamTable, ParamValue, NUM_CHANNELS};
use anyhow::{anyhow, Result};

/// Everything needed to drive one render, already resolved against the
/// module's descriptor table
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Total frames to render
    pub frames: usize,
    /// Frames per call to the block adapter
    pub block_size: usize,
    /// Retrigger period in frames, with the gate parameter's index
    pub gate: Option<(u32, usize)>,
    /// Parameter writes applied before the first block
    pub overrides: Vec<(u32, ParamValue)>,
}

/// Look up each `NAME=VALUE` pair in the module's descriptors and parse the
/// value for that parameter
pub fn resolve_overrides<M: Module>(
    module: &M,
    pairs: &[(String, String)],
) -> Result<Vec<(u32, ParamValue)>> {
    pairs
        .iter()
        .map(|(name, text)| {
            let idx = module
                .param_index(name)
                .ok_or_else(|| anyhow!("Unknown parameter '{}'", name))?;
            let desc = &module.descriptors()[idx as usize];
            let value = desc
                .parse(text)
                .map_err(|e| anyhow!("Bad value '{}' for {}: {}", text, desc.label, e))?;
            log::info!("{} = {:?}", desc.label, value);
            Ok((idx, value))
        })
        .collect()
}

/// Gate state at `frame` for a retrigger period of `period` frames: open for
/// the first half of each period
pub fn gate_at(frame: usize, period: usize) -> bool {
    period > 0 && frame % period < period.div_ceil(2)
}

/// Render `plan.frames` frames of `module`, feeding `input` (mono, zero
/// padded) to every input channel, and return the first output channel
pub fn render<M: Module>(module: M, plan: &RenderPlan, input: &[f32]) -> Vec<f32> {
    let table = ParamTable::new(module.num_params() as usize);
    for (idx, value) in &plan.overrides {
        table.set(*idx, *value);
    }
    let mut engine = Engine::new(module, &table);
    let block = plan.block_size.max(1);
    let mut in_buf = vec![0.0f32; block * NUM_CHANNELS];
    let mut out_buf = vec![0.0f32; block * NUM_CHANNELS];
    let mut rendered = Vec::with_capacity(plan.frames);
    let mut gate_open = false;
    let mut pos = 0;
    while pos < plan.frames {
        let len = block.min(plan.frames - pos);
        if let Some((idx, period)) = plan.gate {
            let open = gate_at(pos, period);
            if open != gate_open {
                table.set(idx, open.into());
                gate_open = open;
            }
        }
        for (i, frame) in in_buf.chunks_exact_mut(NUM_CHANNELS).take(len).enumerate() {
            frame.fill(input.get(pos + i).copied().unwrap_or(0.0));
        }
        let done = engine.process_block(&in_buf, &mut out_buf, len);
        rendered.extend(out_buf.chunks_exact(NUM_CHANNELS).take(done).map(|f| f[0]));
        pos += done;
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_dsp::modules::{Drums, Echo};
    use aleph_dsp::{Context, Fix16, Fract32};

    #[test]
    fn gate_schedule() {
        assert!(gate_at(0, 100));
        assert!(gate_at(49, 100));
        assert!(!gate_at(50, 100));
        assert!(gate_at(100, 100));
        assert!(gate_at(0, 1));
        assert!(!gate_at(0, 0));
    }
    #[test]
    fn overrides_resolve_by_label() {
        let drums = Drums::new(&Context::new_480());
        let pairs = vec![
            ("svfHz".to_string(), "1000".to_string()),
            ("GATE".to_string(), "1".to_string()),
        ];
        let resolved = resolve_overrides(&drums, &pairs).unwrap();
        assert_eq!(resolved[0], (1, ParamValue::Fix(Fix16::from_num(1000))));
        assert_eq!(resolved[1], (0, ParamValue::Int(1)));
        let bad_name = vec![("volume".to_string(), "1".to_string())];
        assert!(resolve_overrides(&drums, &bad_name).is_err());
        let bad_value = vec![("gate".to_string(), "on".to_string())];
        assert!(resolve_overrides(&drums, &bad_value).is_err());
    }
    #[test]
    fn renders_requested_length() {
        let drums = Drums::new(&Context::new_480());
        let plan = RenderPlan {
            frames: 1000,
            block_size: 64,
            gate: Some((0, 480)),
            overrides: Vec::new(),
        };
        let out = render(drums, &plan, &[]);
        assert_eq!(out.len(), 1000);
        assert!(out.iter().any(|x| *x != 0.0));
        assert!(out.iter().all(|x| x.abs() <= 1.0));
    }
    #[test]
    fn echo_passes_input_through() {
        let ctx = Context::new_480();
        let mut storage = vec![Fract32::ZERO; 4800];
        let echo = Echo::new(&ctx, &mut storage);
        let plan = RenderPlan {
            frames: 10,
            block_size: 4,
            gate: None,
            overrides: vec![(2, ParamValue::Fix(Fix16::ZERO))],
        };
        let input = [0.5f32; 10];
        let out = render(echo, &plan, &input);
        assert_eq!(out.len(), 10);
        for x in out {
            assert!((x - 0.5).abs() < 1e-6);
        }
    }
}
