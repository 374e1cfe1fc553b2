//! Render a wave file binaurally.
//!
//! Usage: `cargo run --example render_file -- hrtf.json input.wav output.wav --azimuth 45 --distance 2`
//!
//! With `--sweep`, the source circles the listener once over the length of the file instead.  The output is always 32-bit
//! float stereo.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;

use binaural::{BinauralRenderer, ChannelFormat, MeasurementSet, RendererConfigBuilder};

#[derive(Debug, Parser)]
struct Args {
    /// A measurement set in JSON.
    hrtf: PathBuf,

    /// The wave file to render.  Any channel count; it is downmixed.
    input: PathBuf,

    output: PathBuf,

    /// Degrees clockwise from straight ahead.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    azimuth: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    elevation: f64,

    #[arg(long, default_value_t = 1.0)]
    distance: f64,

    /// Go once around the listener over the file, ignoring --azimuth.
    #[arg(long)]
    sweep: bool,

    #[arg(long, default_value_t = binaural::DEFAULT_CROSSFADE_FRAMES)]
    crossfade: usize,

    #[arg(long, default_value_t = 512)]
    block: usize,
}

fn read_samples(reader: &mut hound::WavReader<std::io::BufReader<std::fs::File>>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let set = Arc::new(MeasurementSet::load(&args.hrtf)?);
    let config = RendererConfigBuilder::default()
        .crossfade_frames(args.crossfade)
        .max_block_frames(args.block)
        .build()?;
    let mut renderer = BinauralRenderer::new(set, config)?;

    let mut reader = hound::WavReader::open(&args.input)?;
    let in_spec = reader.spec();
    if in_spec.sample_rate != renderer.sample_rate() {
        bail!(
            "{} is at {} Hz, but the measurement set is at {} Hz; resample it first",
            args.input.display(),
            in_spec.sample_rate,
            renderer.sample_rate()
        );
    }

    let Some(channels) = std::num::NonZeroUsize::new(in_spec.channels as usize) else {
        bail!("{} has no channels", args.input.display());
    };
    let format = ChannelFormat::from_channel_count(channels);
    let samples = read_samples(&mut reader)?;
    let total_frames = format.frames_in(samples.len());

    let params = renderer.parameters();
    params.set_direction(binaural::Direction::new(args.azimuth, args.elevation));
    params.set_distance(args.distance)?;

    let out_spec = hound::WavSpec {
        channels: 2,
        sample_format: hound::SampleFormat::Float,
        bits_per_sample: 32,
        sample_rate: renderer.sample_rate(),
    };
    let mut writer = hound::WavWriter::create(&args.output, out_spec)?;

    let mut output = vec![0.0f32; args.block * 2];
    let mut frames_done = 0;
    for block in samples.chunks(args.block * channels.get()) {
        if args.sweep {
            // Counter-clockwise from behind, so that the whole circle stays inside -180..=180.
            let azimuth = 180.0 - 360.0 * frames_done as f64 / total_frames as f64;
            params.set_azimuth(azimuth);
        }

        let frames = format.frames_in(block.len());
        let out = &mut output[..frames * 2];
        renderer.process_interleaved(block, &format, out)?;
        for s in out.iter() {
            writer.write_sample(*s)?;
        }

        frames_done += frames;
    }

    writer.finalize()?;

    log::info!(
        "Rendered {} frames to {}",
        total_frames,
        args.output.display()
    );
    Ok(())
}
