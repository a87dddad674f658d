//! Windowed-sinc FIR filter.

use core::f32::consts::{PI, TAU};
use libm::cosf;

use crate::config::Config;
use crate::math::sinc;
use crate::param::Param;

use alloc::vec;
use alloc::vec::Vec;

/// Frequency response selected by a [`FirFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FirShape {
    /// Low-pass at the breakpoint.
    #[default]
    LowPass,
    /// High-pass at the breakpoint.
    HighPass,
    /// Band-pass between breakpoint ± bandwidth/2.
    BandPass,
    /// Band-stop between breakpoint ± bandwidth/2.
    BandStop,
}

/// Taper applied to the truncated sinc kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Window {
    /// No taper. Worst stopband, sharpest transition.
    Rectangular,
    /// Raised cosine.
    #[default]
    Hann,
    /// Three-term Blackman; widest transition, deepest stopband.
    Blackman,
}

impl Window {
    fn weight(self, i: usize, taps: usize) -> f32 {
        let phase = TAU * i as f32 / (taps - 1) as f32;
        match self {
            Self::Rectangular => 1.0,
            Self::Hann => 0.5 - 0.5 * cosf(phase),
            Self::Blackman => 0.42 - 0.5 * cosf(phase) + 0.08 * cosf(2.0 * phase),
        }
    }
}

/// Finite-impulse-response filter built from a windowed sinc kernel.
///
/// The kernel length is forced odd so the response is symmetric around a
/// center tap. Input history lives in a ring buffer; each sample costs one
/// multiply-accumulate per tap.
#[derive(Clone, Debug)]
pub struct FirFilter {
    /// Cutoff or center frequency in Hz; automatable.
    pub(crate) breakpoint: Param,
    /// Passband or stopband width in Hz; automatable.
    pub(crate) bandwidth: Param,
    shape: FirShape,
    window: Window,
    custom: bool,
    taps: usize,
    coefficients: Vec<f32>,
    history: Vec<f32>,
    write: usize,
    rate: f32,
}

impl FirFilter {
    /// Creates a low-pass filter with the given cutoff and kernel length.
    ///
    /// Even lengths are rounded up to the next odd number.
    pub fn new(breakpoint: f32, taps: usize) -> Self {
        let taps = if taps % 2 == 0 { taps + 1 } else { taps }.max(3);
        Self {
            breakpoint: Param::new(breakpoint),
            bandwidth: Param::new(100.0),
            shape: FirShape::LowPass,
            window: Window::Hann,
            custom: false,
            taps,
            coefficients: vec![0.0; taps],
            history: vec![0.0; taps],
            write: 0,
            rate: 0.0,
        }
    }

    /// Selects the response shape and rebuilds the kernel, replacing any
    /// user-supplied kernel.
    pub fn set_shape(&mut self, shape: FirShape) {
        self.shape = shape;
        self.custom = false;
        self.rebuild();
    }

    /// Selects the window and rebuilds the kernel, replacing any
    /// user-supplied kernel.
    pub fn set_window(&mut self, window: Window) {
        self.window = window;
        self.custom = false;
        self.rebuild();
    }

    /// Installs an explicit kernel, bypassing the windowed-sinc design.
    ///
    /// Coefficient 0 multiplies the newest sample. Breakpoint and
    /// bandwidth changes leave a user kernel untouched; calling
    /// [`FirFilter::set_shape`] or [`FirFilter::set_window`] afterwards
    /// returns to designed kernels. An empty kernel is ignored.
    pub fn set_coefficients(&mut self, coefficients: &[f32]) {
        if coefficients.is_empty() {
            return;
        }
        self.taps = coefficients.len();
        self.coefficients = coefficients.to_vec();
        self.history = vec![0.0; self.taps];
        self.write = 0;
        self.custom = true;
    }

    /// Number of taps in the kernel (always odd).
    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Read access to the current kernel.
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub(crate) fn on_config(&mut self, config: &Config) {
        self.rate = config.effective_rate();
        self.rebuild();
    }

    /// Windowed, unit-DC-gain low-pass kernel at a normalized cutoff.
    fn low_pass_kernel(&self, cutoff: f32) -> Vec<f32> {
        let omega = TAU * cutoff;
        let m = (self.taps - 1) as isize / 2;
        let mut kernel = Vec::with_capacity(self.taps);
        let mut sum = 0.0;
        for i in 0..self.taps {
            let n = (i as isize - m) as f32;
            let h = (omega / PI) * sinc(n * omega) * self.window.weight(i, self.taps);
            sum += h;
            kernel.push(h);
        }
        if sum != 0.0 {
            for h in &mut kernel {
                *h /= sum;
            }
        }
        kernel
    }

    fn rebuild(&mut self) {
        if self.custom || self.rate <= 0.0 {
            return;
        }
        let nyquist = self.rate / 2.0;
        let breakpoint = self.breakpoint.value().clamp(0.0, nyquist);
        let half_band = (self.bandwidth.value() / 2.0).max(0.0);
        let m = (self.taps - 1) / 2;
        match self.shape {
            FirShape::LowPass => {
                self.coefficients = self.low_pass_kernel(breakpoint / self.rate);
            }
            FirShape::HighPass => {
                // Spectral inversion of the matching low-pass: DC gain
                // lands at exactly zero.
                let mut kernel = self.low_pass_kernel(breakpoint / self.rate);
                for h in kernel.iter_mut() {
                    *h = -*h;
                }
                kernel[m] += 1.0;
                self.coefficients = kernel;
            }
            FirShape::BandPass => {
                let upper = self.low_pass_kernel((breakpoint + half_band).min(nyquist) / self.rate);
                let lower = self.low_pass_kernel((breakpoint - half_band).max(0.0) / self.rate);
                self.coefficients = upper
                    .iter()
                    .zip(&lower)
                    .map(|(u, l)| u - l)
                    .collect();
            }
            FirShape::BandStop => {
                let upper = self.low_pass_kernel((breakpoint + half_band).min(nyquist) / self.rate);
                let lower = self.low_pass_kernel((breakpoint - half_band).max(0.0) / self.rate);
                // Spectral inversion of the matching band-pass.
                let mut kernel: Vec<f32> =
                    upper.iter().zip(&lower).map(|(u, l)| l - u).collect();
                kernel[m] += 1.0;
                self.coefficients = kernel;
            }
        }
    }

    /// Pushes one input sample and convolves against the kernel.
    #[inline]
    pub(crate) fn process(&mut self, input: f32) -> f32 {
        if self.breakpoint.take_updated() | self.bandwidth.take_updated() {
            self.rebuild();
        }
        self.history[self.write] = input;
        self.write = (self.write + 1) % self.taps;
        // Coefficient 0 pairs with the newest sample.
        let mut acc = 0.0;
        for (i, &c) in self.coefficients.iter().enumerate() {
            acc += c * self.history[(self.write + self.taps - 1 - i) % self.taps];
        }
        acc
    }
}
