//! Render the Chambers impulse response to a stereo WAV file
//!
//! Feeds a single-sample impulse through the engine, optionally engages
//! freeze partway through, and writes 32-bit float output.
//!
//! Run with: cargo run -p chambers --example render_impulse -- [out.wav] [seconds] [freeze_at_s]
//!
//! Set `RUST_LOG=chambers=debug` to see prepare and freeze events.

use std::error::Error;

use chambers::{Chambers, Control};
use chambers_core::{DspModule, StereoBuffer};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: u32 = 48000;
const BLOCK_SIZE: usize = 512;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "chambers_ir.wav".to_string());
    let seconds: f32 = args.next().map(|s| s.parse::<f32>()).transpose()?.unwrap_or(8.0);
    let freeze_at: Option<f32> = args.next().map(|s| s.parse::<f32>()).transpose()?;

    let mut reverb = Chambers::new();
    for (control, value) in [
        (Control::Time, 0.55),
        (Control::Mass, 0.5),
        (Control::Density, 0.5),
        (Control::Bloom, 0.5),
        (Control::Gravity, 0.5),
        (Control::Warp, 0.0),
        (Control::Drift, 0.0),
    ] {
        reverb.set_control(control, value);
    }
    reverb.prepare(f64::from(SAMPLE_RATE), BLOCK_SIZE, 2);

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec)?;

    let total = (seconds.max(0.0) * SAMPLE_RATE as f32) as usize;
    let freeze_sample = freeze_at.map(|s| (s.max(0.0) * SAMPLE_RATE as f32) as usize);
    let mut buffer = StereoBuffer::new(BLOCK_SIZE);
    let mut rendered = 0;
    let mut peak = 0.0_f32;

    while rendered < total {
        buffer.clear();
        if rendered == 0 {
            buffer.left[0] = 1.0;
            buffer.right[0] = 1.0;
        }
        if freeze_sample.is_some_and(|at| at <= rendered) && !reverb.params().freeze() {
            tracing::info!(seconds = rendered as f32 / SAMPLE_RATE as f32, "engaging freeze");
            reverb.set_freeze(true);
        }

        reverb.process(buffer.as_block());
        peak = peak.max(buffer.peak());

        let frames = BLOCK_SIZE.min(total - rendered);
        for (&l, &r) in buffer.left.iter().zip(buffer.right.iter()).take(frames) {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
        }
        rendered += frames;
    }
    writer.finalize()?;

    tracing::info!(
        path = %path,
        seconds,
        peak_db = 20.0 * peak.max(1e-9).log10(),
        state = ?reverb.freeze_state(),
        "impulse response written"
    );
    Ok(())
}
