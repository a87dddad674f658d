//! Builds a small subtractive voice and prints a rendered envelope of it.
//!
//! Run with: `cargo run -p patchbay-io --example patch_demo`

use patchbay_core::{
    Config, Envelope, FilterShape, Multiplier, Oscillator, Output, ParamKey, Rack, RecursiveFilter,
    Waveform,
};
use patchbay_io::render_seconds;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rack = Rack::new();

    let mut osc = Oscillator::new(110.0);
    osc.set_waveform(Waveform::Saw);
    let osc = rack.add(osc);

    let env = rack.add(Envelope::new(0.02, 0.15, 0.6, 0.3));

    let mut filter = RecursiveFilter::new(900.0);
    filter.set_shape(FilterShape::LowPass);
    let lp = rack.add(filter);

    // Slow LFO sweeping the filter cutoff.
    let lfo = rack.add(Oscillator::new(0.5));
    let depth = rack.add(Multiplier::new(600.0));
    rack.connect(lfo, depth)?;
    rack.connect_param(depth, lp, ParamKey::Breakpoint)?;

    let out = rack.add(Output::default());
    rack.connect(osc, env)?;
    rack.connect(env, lp)?;
    rack.connect(lp, out)?;
    rack.set_config(out, Config::new(48000.0))?;

    rack.set_param(env, ParamKey::Gate, 1.0)?;
    let held = render_seconds(&mut rack, out, 1.0)?;
    rack.set_param(env, ParamKey::Gate, 0.0)?;
    let tail = render_seconds(&mut rack, out, 0.5)?;

    for (label, chunk) in [("held", &held), ("tail", &tail)] {
        let peak = chunk.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let rms = (chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32).sqrt();
        println!("{label}: {} samples, peak {peak:.3}, rms {rms:.3}", chunk.len());
    }
    Ok(())
}
