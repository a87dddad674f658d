//! End-to-end patches exercised through the public rack API.

use patchbay_core::{
    AdditiveSynth, Clamper, Config, Envelope, FilterShape, FirFilter, FirShape, HarmonicPreset,
    Mixer, Multiplier, Oscillator, Output, ParamKey, PatchError, Rack, RecursiveFilter,
    RingModulator, Splitter, TrivialGenerator, Waveform,
};

const RATE: f32 = 48000.0;

fn render(rack: &mut Rack, sink: patchbay_core::ModuleId, n: usize) -> Vec<f32> {
    (0..n).map(|_| rack.next_sample(sink).unwrap()).collect()
}

#[test]
fn sine_patch_is_periodic_at_the_fundamental() {
    let mut rack = Rack::new();
    let osc = rack.add(Oscillator::new(480.0));
    let out = rack.add(Output::default());
    rack.connect(osc, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();

    // 480 Hz at 48 kHz: exactly 100 samples per cycle.
    let samples = render(&mut rack, out, 400);
    for i in 0..300 {
        assert!(
            (samples[i] - samples[i + 100]).abs() < 1e-4,
            "sample {i} differs across one period"
        );
    }
}

#[test]
fn mixer_of_constant_sources_sums_exactly() {
    let mut rack = Rack::new();
    let mix = rack.add(Mixer);
    let out = rack.add(Output::default());
    for _ in 0..5 {
        let src = rack.add(TrivialGenerator::new(0.25, 0.0));
        rack.connect(src, mix).unwrap();
    }
    rack.connect(mix, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();
    for _ in 0..10 {
        assert_eq!(rack.next_sample(out).unwrap(), 1.25);
    }
}

#[test]
fn splitter_branches_stay_sample_aligned() {
    // A ramp split into two branches and recombined by a ring modulator
    // must square the ramp; any double-pull would mix adjacent samples.
    let mut rack = Rack::new();
    let ramp = rack.add(TrivialGenerator::new(1.0, 1.0));
    let split = rack.add(Splitter::default());
    let ring = rack.add(RingModulator);
    let out = rack.add(Output::default());
    rack.connect(ramp, split).unwrap();
    rack.connect(split, ring).unwrap();
    rack.connect(split, ring).unwrap();
    rack.connect(ring, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();
    for expected in [1.0, 4.0, 9.0, 16.0] {
        assert_eq!(rack.next_sample(out).unwrap(), expected);
    }
}

#[test]
fn ring_modulator_degrades_gracefully() {
    let mut rack = Rack::new();
    let ring = rack.add(RingModulator);
    let out = rack.add(Output::default());
    rack.connect(ring, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();
    assert_eq!(rack.next_sample(out).unwrap(), 0.0, "no inputs is silence");

    let a = rack.add(TrivialGenerator::new(0.5, 0.0));
    rack.connect(a, ring).unwrap();
    assert_eq!(rack.next_sample(out).unwrap(), 0.5, "one input passes through");

    let b = rack.add(TrivialGenerator::new(4.0, 0.0));
    rack.connect(b, ring).unwrap();
    assert_eq!(rack.next_sample(out).unwrap(), 2.0, "two inputs multiply");
}

#[test]
fn envelope_gates_an_oscillator() {
    let mut rack = Rack::new();
    let osc = rack.add(Oscillator::new(440.0));
    let env = rack.add(Envelope::new(0.001, 0.01, 0.5, 0.01));
    let out = rack.add(Output::default());
    rack.connect(osc, env).unwrap();
    rack.connect(env, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();

    for s in render(&mut rack, out, 100) {
        assert_eq!(s, 0.0, "closed gate must be silent");
    }
    rack.set_param(env, ParamKey::Gate, 1.0).unwrap();
    let open: f32 = render(&mut rack, out, 1000)
        .iter()
        .fold(0.0, |m, s| m.max(s.abs()));
    assert!(open > 0.1, "open gate must pass signal");
    rack.set_param(env, ParamKey::Gate, 0.0).unwrap();
    render(&mut rack, out, 2000);
    for s in render(&mut rack, out, 100) {
        assert_eq!(s, 0.0, "finished release must be silent");
    }
}

#[test]
fn lfo_patched_to_oscillator_frequency_modulates() {
    let mut rack = Rack::new();
    let lfo = rack.add(Oscillator::new(2.0));
    let depth = rack.add(Multiplier::new(100.0));
    let offset = rack.add(patchbay_core::Adder::new(440.0));
    let carrier = rack.add(Oscillator::new(440.0));
    let out = rack.add(Output::default());
    rack.connect(lfo, depth).unwrap();
    rack.connect(depth, offset).unwrap();
    rack.connect_param(offset, carrier, ParamKey::Frequency).unwrap();
    rack.connect(carrier, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();

    let samples = render(&mut rack, out, 4800);
    assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    // The frequency parameter tracks the modulator, not the literal.
    let f = rack.param_value(carrier, ParamKey::Frequency).unwrap();
    assert!((340.0..=540.0).contains(&f));
    assert_ne!(f, 440.0);
}

#[test]
fn additive_square_crosses_zero_like_its_fundamental() {
    let mut rack = Rack::new();
    let synth = rack.add(AdditiveSynth::new(480.0, 15, HarmonicPreset::Square));
    let out = rack.add(Output::default());
    rack.connect(synth, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();

    // 10 full cycles: a square built from odd harmonics crosses zero
    // twice per cycle of the fundamental.
    let samples = render(&mut rack, out, 1000);
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    assert!(
        (18..=22).contains(&crossings),
        "expected ~20 crossings, got {crossings}"
    );
}

#[test]
fn recursive_filter_in_patch_attenuates_highs() {
    let mut rack = Rack::new();
    let osc = rack.add(Oscillator::new(8000.0));
    let mut filter = RecursiveFilter::new(200.0);
    filter.set_shape(FilterShape::LowPass);
    let lp = rack.add(filter);
    let out = rack.add(Output::default());
    rack.connect(osc, lp).unwrap();
    rack.connect(lp, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();

    render(&mut rack, out, 2000); // settle
    let peak: f32 = render(&mut rack, out, 2000)
        .iter()
        .fold(0.0, |m, s| m.max(s.abs()));
    assert!(peak < 0.1, "8 kHz through a 200 Hz low-pass, got peak {peak}");
}

#[test]
fn fir_band_stop_notches_its_center() {
    let mut rack = Rack::new();
    let osc = rack.add(Oscillator::new(4000.0));
    let mut filter = FirFilter::new(4000.0, 101);
    filter.set_shape(FirShape::BandStop);
    let notch = rack.add(filter);
    let out = rack.add(Output::default());
    rack.set_param(notch, ParamKey::Bandwidth, 2000.0).unwrap();
    rack.connect(osc, notch).unwrap();
    rack.connect(notch, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();

    render(&mut rack, out, 500); // fill the delay line
    let peak: f32 = render(&mut rack, out, 2000)
        .iter()
        .fold(0.0, |m, s| m.max(s.abs()));
    assert!(peak < 0.1, "center frequency must be notched out, got {peak}");
}

#[test]
fn clamper_bounds_a_hot_signal() {
    let mut rack = Rack::new();
    let osc = rack.add(Oscillator::new(440.0));
    let gain = rack.add(Multiplier::new(10.0));
    let clamp = rack.add(Clamper::new(-1.0, 1.0));
    let out = rack.add(Output::default());
    rack.connect(osc, gain).unwrap();
    rack.connect(gain, clamp).unwrap();
    rack.connect(clamp, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();
    for s in render(&mut rack, out, 1000) {
        assert!((-1.0..=1.0).contains(&s));
    }
}

#[test]
fn oversampling_matches_plain_rate_for_dc() {
    let mut rack = Rack::new();
    let src = rack.add(TrivialGenerator::new(0.75, 0.0));
    let out = rack.add(Output::default());
    rack.connect(src, out).unwrap();
    rack.set_config(out, Config::with_oversampling(RATE, 8)).unwrap();
    for _ in 0..10 {
        assert_eq!(rack.next_sample(out).unwrap(), 0.75);
    }
}

#[test]
fn noise_oscillator_stays_bounded() {
    let mut rack = Rack::new();
    let mut osc = Oscillator::new(1.0);
    osc.set_waveform(Waveform::Noise);
    let noise = rack.add(osc);
    let out = rack.add(Output::default());
    rack.connect(noise, out).unwrap();
    rack.set_config(out, Config::new(RATE)).unwrap();
    let samples = render(&mut rack, out, 10000);
    assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    let mean: f32 = samples.iter().sum::<f32>() / samples.len() as f32;
    assert!(mean.abs() < 0.05, "noise should have near-zero mean, got {mean}");
}

#[test]
fn stale_handle_reports_not_found() {
    let mut rack = Rack::new();
    let a = rack.add(TrivialGenerator::new(0.0, 1.0));
    let out = rack.add(Output::default());
    rack.connect(a, out).unwrap();
    rack.remove(a).unwrap();
    assert_eq!(rack.set_param(a, ParamKey::Value, 1.0), Err(PatchError::ModuleNotFound));
    rack.set_config(out, Config::new(RATE)).unwrap();
    // The sink survives with a silent input.
    assert_eq!(rack.next_sample(out).unwrap(), 0.0);
}
