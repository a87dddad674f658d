//! Single-waveform phase-accumulator oscillator.
//!
//! The oscillator keeps a waveform position in the unit interval [0, 1).
//! Each pull advances the position by `frequency / rate` (wrapped with
//! `fmod`) and shapes it with the selected [`Waveform`]. Switching
//! waveforms keeps the phase, so a live timbre change does not click back
//! to the start of the cycle.

use core::f32::consts::TAU;
use libm::{fmodf, sinf};

use crate::config::Config;
use crate::param::Param;

/// Waveform shaping functions over a unit-interval position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine: `sin(2π · position)`.
    #[default]
    Sine,
    /// Rising sawtooth from -1 to 1 over one cycle.
    Saw,
    /// Square with 50% duty cycle.
    Square,
    /// Triangle, starting at -1, peaking at the half cycle.
    Triangle,
    /// White noise; ignores the waveform position.
    Noise,
}

impl Waveform {
    /// Shapes a unit-interval position into a sample.
    ///
    /// `noise_state` is the xorshift state used by [`Waveform::Noise`];
    /// other waveforms leave it untouched.
    #[inline]
    pub fn sample(self, position: f32, noise_state: &mut u32) -> f32 {
        match self {
            Self::Sine => sinf(position * TAU),
            Self::Saw => 2.0 * position - 1.0,
            Self::Square => {
                if position < 0.5 { 1.0 } else { -1.0 }
            }
            Self::Triangle => {
                if position < 0.5 {
                    4.0 * position - 1.0
                } else {
                    3.0 - 4.0 * position
                }
            }
            Self::Noise => xorshift_noise(noise_state),
        }
    }
}

/// Xorshift32 PRNG mapped to [-1, 1]. Broadband by construction.
#[inline]
fn xorshift_noise(state: &mut u32) -> f32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    (x as i32 as f32) / (i32::MAX as f32)
}

/// Phase-accumulator oscillator module. No inputs, one output.
#[derive(Clone, Debug)]
pub struct Oscillator {
    /// Fundamental frequency in Hz; automatable.
    pub(crate) frequency: Param,
    waveform: Waveform,
    position: f32,
    rate: f32,
    noise_state: u32,
}

impl Oscillator {
    /// Creates an oscillator at the given frequency, producing a sine.
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency: Param::new(frequency),
            waveform: Waveform::Sine,
            position: 0.0,
            rate: 0.0,
            noise_state: 0x12345678,
        }
    }

    /// Selects the shaping function. The phase is kept.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Returns the current shaping function.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Returns the current waveform position in [0, 1).
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Adopts a new configuration (called by the rack).
    pub(crate) fn on_config(&mut self, config: &Config) {
        self.rate = config.effective_rate();
    }

    /// Advances the phase by one step and shapes the sample.
    ///
    /// Returns 0 when no rate has been configured yet; the position must
    /// never advance by a sentinel-rate increment.
    #[inline]
    pub(crate) fn advance(&mut self) -> f32 {
        if self.rate <= 0.0 {
            return 0.0;
        }
        self.position = fmodf(self.position + self.frequency.value() / self.rate, 1.0);
        if self.position < 0.0 {
            // fmod keeps the sign of the dividend; negative frequencies
            // sweep the waveform backwards but stay inside [0, 1).
            self.position += 1.0;
        }
        self.waveform.sample(self.position, &mut self.noise_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(frequency: f32, sample_rate: f32) -> Oscillator {
        let mut osc = Oscillator::new(frequency);
        osc.on_config(&Config::new(sample_rate));
        osc
    }

    #[test]
    fn unconfigured_outputs_silence() {
        let mut osc = Oscillator::new(440.0);
        for _ in 0..16 {
            assert_eq!(osc.advance(), 0.0);
            assert_eq!(osc.position(), 0.0);
        }
    }

    #[test]
    fn saw_ramps_over_one_cycle() {
        // 1 Hz at 8 Hz sample rate: positions 1/8, 2/8, ...
        let mut osc = configured(1.0, 8.0);
        osc.set_waveform(Waveform::Saw);
        let first = osc.advance();
        assert!((first - (2.0 * 0.125 - 1.0)).abs() < 1e-6);
        let mut last = first;
        for _ in 0..6 {
            let s = osc.advance();
            assert!(s > last, "saw must rise within the cycle");
            last = s;
        }
    }

    #[test]
    fn square_has_unit_magnitude() {
        let mut osc = configured(100.0, 48000.0);
        osc.set_waveform(Waveform::Square);
        for _ in 0..1000 {
            let s = osc.advance();
            assert!(s == 1.0 || s == -1.0);
        }
    }

    #[test]
    fn waveform_change_keeps_phase() {
        let mut osc = configured(440.0, 48000.0);
        for _ in 0..100 {
            osc.advance();
        }
        let before = osc.position();
        osc.set_waveform(Waveform::Triangle);
        assert_eq!(osc.position(), before);
    }

    #[test]
    fn negative_frequency_stays_in_unit_interval() {
        let mut osc = configured(-440.0, 48000.0);
        for _ in 0..1000 {
            osc.advance();
            assert!((0.0..1.0).contains(&osc.position()));
        }
    }

    #[test]
    fn noise_is_bounded_and_nonconstant() {
        let mut osc = configured(1.0, 48000.0);
        osc.set_waveform(Waveform::Noise);
        let first = osc.advance();
        let mut varied = false;
        for _ in 0..100 {
            let s = osc.advance();
            assert!((-1.0..=1.0).contains(&s));
            varied |= s != first;
        }
        assert!(varied);
    }

    #[test]
    fn oversampling_slows_phase_advance() {
        let mut plain = Oscillator::new(440.0);
        plain.on_config(&Config::new(48000.0));
        let mut over = Oscillator::new(440.0);
        over.on_config(&Config::with_oversampling(48000.0, 4));
        plain.advance();
        over.advance();
        assert!((plain.position() - 4.0 * over.position()).abs() < 1e-6);
    }
}
