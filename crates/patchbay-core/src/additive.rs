//! Additive synthesis by summed sine partials.

use core::f32::consts::TAU;
use libm::{fmodf, sinf};

use crate::config::Config;
use crate::math::semitone_ratio;
use crate::param::Param;

use alloc::vec::Vec;

/// One sine partial of an [`AdditiveSynth`].
#[derive(Clone, Copy, Debug)]
pub struct Harmonic {
    /// Frequency as a multiple of the fundamental.
    pub ratio: f32,
    /// Linear amplitude of this partial.
    pub amplitude: f32,
    position: f32,
    increment: f32,
}

impl Harmonic {
    fn new(ratio: f32, amplitude: f32) -> Self {
        Self {
            ratio,
            amplitude,
            position: 0.0,
            increment: 0.0,
        }
    }
}

/// How partial frequencies relate to the fundamental.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HarmonicSeries {
    /// Partial `i` (zero-based) sits at `1 + i * spacing` times the
    /// fundamental. A spacing of 1 gives the natural harmonic series.
    Multiple(f32),
    /// Partial `i` sits `i * semitones` equal-tempered semitones above
    /// the fundamental.
    Semitone(f32),
}

/// Classic amplitude recipes for the natural harmonic series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarmonicPreset {
    /// Fundamental only.
    Sine,
    /// Odd harmonics at `1/n`.
    Square,
    /// All harmonics at `1/n` with alternating sign.
    Saw,
    /// Odd harmonics at `1/n²` with alternating sign.
    Triangle,
}

impl HarmonicPreset {
    /// Amplitude of harmonic number `n` (1-based) under this recipe.
    fn amplitude(self, n: u32) -> f32 {
        let nf = n as f32;
        match self {
            Self::Sine => {
                if n == 1 { 1.0 } else { 0.0 }
            }
            Self::Square => {
                if n % 2 == 1 { 1.0 / nf } else { 0.0 }
            }
            Self::Saw => {
                let sign = if n % 2 == 1 { 1.0 } else { -1.0 };
                sign / nf
            }
            Self::Triangle => {
                if n % 2 == 1 {
                    let sign = if (n - 1) % 4 == 0 { 1.0 } else { -1.0 };
                    sign / (nf * nf)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Bank of sine partials summed into one output. No inputs.
///
/// Each partial keeps its own waveform position so detuned series stay
/// phase-coherent with themselves across fundamental changes.
#[derive(Clone, Debug)]
pub struct AdditiveSynth {
    /// Fundamental frequency in Hz; automatable.
    pub(crate) fundamental: Param,
    harmonics: Vec<Harmonic>,
    rate: f32,
}

impl AdditiveSynth {
    /// Creates a synth at the given fundamental with `count` natural
    /// harmonics shaped by `preset`.
    pub fn new(fundamental: f32, count: usize, preset: HarmonicPreset) -> Self {
        let mut synth = Self {
            fundamental: Param::new(fundamental),
            harmonics: Vec::new(),
            rate: 0.0,
        };
        synth.set_standard_harmonics(count, preset);
        synth
    }

    /// Replaces the partials with `count` harmonics of the natural series
    /// shaped by `preset`.
    pub fn set_standard_harmonics(&mut self, count: usize, preset: HarmonicPreset) {
        self.set_series(count, HarmonicSeries::Multiple(1.0));
        self.set_amplitudes(preset);
    }

    /// Replaces the partial frequencies with `count` ratios spaced by
    /// `series`, keeping existing amplitudes. Partials beyond the old
    /// count start at unit amplitude.
    pub fn set_series(&mut self, count: usize, series: HarmonicSeries) {
        let old: Vec<f32> = self.harmonics.iter().map(|h| h.amplitude).collect();
        self.harmonics.clear();
        for i in 0..count {
            let ratio = match series {
                HarmonicSeries::Multiple(spacing) => 1.0 + i as f32 * spacing,
                HarmonicSeries::Semitone(semitones) => semitone_ratio(i as f32 * semitones),
            };
            let amplitude = old.get(i).copied().unwrap_or(1.0);
            self.harmonics.push(Harmonic::new(ratio, amplitude));
        }
        self.recompute_increments();
    }

    /// Applies an amplitude recipe to the current partials, whatever
    /// series they sit on. Partial `i` gets the recipe's coefficient for
    /// harmonic number `i + 1`, with no normalization: the bank's sum can
    /// exceed the [-1, 1] signal range, and callers scale it back down
    /// with a [`Multiplier`](crate::Multiplier).
    pub fn set_amplitudes(&mut self, preset: HarmonicPreset) {
        for (i, h) in self.harmonics.iter_mut().enumerate() {
            h.amplitude = preset.amplitude(i as u32 + 1);
        }
    }

    /// Applies a weighted blend of two amplitude recipes to the current
    /// partials.
    ///
    /// `mix` is clamped to [0, 1]: 0 is pure `from`, 1 is pure `to`.
    pub fn set_blended_amplitudes(&mut self, from: HarmonicPreset, to: HarmonicPreset, mix: f32) {
        let mix = mix.clamp(0.0, 1.0);
        for (i, h) in self.harmonics.iter_mut().enumerate() {
            let n = i as u32 + 1;
            h.amplitude = (1.0 - mix) * from.amplitude(n) + mix * to.amplitude(n);
        }
    }

    /// Drops partials whose absolute amplitude falls below `tolerance`.
    pub fn prune(&mut self, tolerance: f32) {
        self.harmonics.retain(|h| h.amplitude.abs() >= tolerance);
    }

    /// Replaces the partials with an explicit `(ratio, amplitude)` list.
    pub fn set_harmonics(&mut self, partials: &[(f32, f32)]) {
        self.harmonics.clear();
        for &(ratio, amplitude) in partials {
            self.harmonics.push(Harmonic::new(ratio, amplitude));
        }
        self.recompute_increments();
    }

    /// Read access to the current partials.
    pub fn harmonics(&self) -> &[Harmonic] {
        &self.harmonics
    }

    fn recompute_increments(&mut self) {
        if self.rate <= 0.0 {
            return;
        }
        let fundamental = self.fundamental.value();
        for h in &mut self.harmonics {
            h.increment = fundamental * h.ratio / self.rate;
        }
    }

    pub(crate) fn on_config(&mut self, config: &Config) {
        self.rate = config.effective_rate();
        self.recompute_increments();
    }

    /// Advances every partial one step and sums the bank.
    #[inline]
    pub(crate) fn advance(&mut self) -> f32 {
        if self.rate <= 0.0 {
            return 0.0;
        }
        if self.fundamental.take_updated() {
            self.recompute_increments();
        }
        let mut sum = 0.0;
        for h in &mut self.harmonics {
            h.position = fmodf(h.position + h.increment, 1.0);
            sum += h.amplitude * sinf(h.position * TAU);
        }
        sum
    }
}
