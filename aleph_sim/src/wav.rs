//! WAV file input and output for the simulator.

use anyhow::{Context, Result};
use std::path::Path;

/// Read the first channel of a WAV file as floats in `[-1, 1]`, along with
/// the file's sample rate
pub fn read_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open input {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|s| int_to_float(s, bits)))
                .collect::<Result<_, _>>()?
        }
    };
    log::info!(
        "Read {} frames ({} channels, {} bit) from {}",
        samples.len(),
        channels,
        spec.bits_per_sample,
        path.display()
    );
    Ok((samples, spec.sample_rate))
}

/// Write `samples` as a mono 32 bit float WAV file
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create output {}", path.display()))?;
    for s in samples {
        writer.write_sample(*s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Scale a signed integer sample of the given width to `[-1, 1)`
pub fn int_to_float(sample: i32, bits: u16) -> f32 {
    let full_scale = (1u64 << (bits.clamp(1, 32) - 1)) as f32;
    sample as f32 / full_scale
}
