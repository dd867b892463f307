//! aleph-sim - render an aleph_dsp module offline
//!
//! Drives a module through the same block adapter a host audio loop would
//! use and writes the first output channel to a WAV file.

use aleph_dsp::modules::{Drums, Echo};
use aleph_dsp::{Context, FixedSampleRate, Fract32, Module};
use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod render;
mod wav;

use render::RenderPlan;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModuleKind {
    /// Noise and inputs through a state-variable filter and envelope
    Drums,
    /// Feedback delay with a downsampled second head
    Echo,
}

#[derive(Parser, Debug)]
#[command(name = "aleph-sim")]
#[command(about = "Render an aleph_dsp module to a WAV file")]
#[command(version)]
struct Cli {
    /// Module to run
    #[arg(value_enum, default_value_t = ModuleKind::Drums)]
    module: ModuleKind,

    /// Sample rate in Hz (44100 or 48000)
    #[arg(short = 'r', long, default_value_t = 48000)]
    sample_rate: u32,

    /// Length of the render, in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f32,

    /// Output WAV file
    #[arg(short, long, default_value = "aleph-sim.wav")]
    output: PathBuf,

    /// Input WAV file, fed to every input channel (first channel only)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Gate retrigger period in seconds, 0 to leave the gate alone
    #[arg(short, long, default_value_t = 0.5)]
    gate_interval: f32,

    /// Frames per processed block
    #[arg(short, long, default_value_t = 64)]
    block_size: usize,

    /// Set a parameter before rendering, e.g. `--set svfHz=880`
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    sets: Vec<(String, String)>,

    /// Print the module's parameters and exit
    #[arg(long)]
    list_params: bool,
}

fn parse_assignment(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", text))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", text));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn seconds_to_frames(secs: f32, sample_rate: u32) -> usize {
    (secs.max(0.0) * sample_rate as f32) as usize
}

fn list_params<M: Module>(module: &M) {
    println!("{:<4}{:<12}{:<10}{:>12}{:>12}", "idx", "name", "kind", "min", "max");
    for (idx, desc) in module.descriptors().iter().enumerate() {
        let (min, max) = if desc.kind.is_int() {
            (desc.min.as_int().to_string(), desc.max.as_int().to_string())
        } else {
            (desc.min.as_fix().to_string(), desc.max.as_fix().to_string())
        };
        println!(
            "{:<4}{:<12}{:<10}{:>12}{:>12}",
            idx,
            desc.label,
            format!("{:?}", desc.kind),
            min,
            max
        );
    }
}

fn run_module<M: Module>(cli: &Cli, context: &Context, module: M) -> Result<()> {
    if cli.list_params {
        list_params(&module);
        return Ok(());
    }
    let sample_rate = context.sample_rate();
    let overrides = render::resolve_overrides(&module, &cli.sets)?;
    let gate = match module.param_index("gate") {
        Some(idx) if cli.gate_interval > 0.0 => {
            let period = seconds_to_frames(cli.gate_interval, sample_rate).max(1);
            log::info!("Retriggering the gate every {} frames", period);
            Some((idx, period))
        }
        _ => None,
    };
    let input = match &cli.input {
        Some(path) => {
            let (samples, rate) = wav::read_mono(path)?;
            if rate != sample_rate {
                log::warn!(
                    "{} is {} Hz but rendering at {} Hz; no resampling is done",
                    path.display(),
                    rate,
                    sample_rate
                );
            }
            samples
        }
        None => Vec::new(),
    };
    let plan = RenderPlan {
        frames: seconds_to_frames(cli.duration, sample_rate),
        block_size: cli.block_size,
        gate,
        overrides,
    };
    log::info!(
        "Rendering {} frames of {:?} at {} Hz in blocks of {}",
        plan.frames,
        cli.module,
        sample_rate,
        plan.block_size
    );
    let rendered = render::render(module, &plan, &input);
    let peak = rendered.iter().fold(0.0f32, |acc, x| acc.max(x.abs()));
    wav::write_mono(&cli.output, &rendered, sample_rate)?;
    log::info!(
        "Wrote {} frames to {} (peak {:.3})",
        rendered.len(),
        cli.output.display(),
        peak
    );
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let sample_rate = FixedSampleRate::try_from(cli.sample_rate)
        .map_err(|e| anyhow!("{}: {}", e, cli.sample_rate))?;
    let context = Context { sample_rate };
    match cli.module {
        ModuleKind::Drums => run_module(cli, &context, Drums::new(&context)),
        ModuleKind::Echo => {
            let mut storage = vec![Fract32::ZERO; Echo::storage_frames(&context)];
            run_module(cli, &context, Echo::new(&context, &mut storage))
        }
    }
}

fn main() -> ExitCode {
    colog::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
