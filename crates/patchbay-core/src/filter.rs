//! Recursive (IIR) filters.
//!
//! [`RecursiveFilter`] implements the classic single-stage recursion
//!
//! ```text
//! y[n] = a0·x[n] + a1·x[n-1] + a2·x[n-2] + b1·y[n-1] + b2·y[n-2]
//! ```
//!
//! with coefficient recipes for low-pass, high-pass, band-pass and notch
//! responses. [`RcFilter`] is the one-pole analog-RC model, cheap enough
//! to retune every sample from a patched breakpoint.

use core::f32::consts::TAU;
use libm::{cosf, expf};

use crate::config::Config;
use crate::math::flush_denormal;
use crate::param::Param;

/// Frequency response selected by a [`RecursiveFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterShape {
    /// Single-pole low-pass.
    #[default]
    LowPass,
    /// Single-pole high-pass.
    HighPass,
    /// Two-pole band-pass around the breakpoint.
    BandPass,
    /// Two-pole notch around the breakpoint.
    Notch,
}

/// Single-stage recursive filter with a retunable breakpoint.
#[derive(Clone, Copy, Debug)]
pub struct RecursiveFilter {
    /// Cutoff or center frequency in Hz; automatable.
    pub(crate) breakpoint: Param,
    /// Bandwidth in Hz for the band-pass and notch shapes; automatable.
    pub(crate) bandwidth: Param,
    shape: FilterShape,
    rate: f32,
    a0: f32,
    a1: f32,
    a2: f32,
    b1: f32,
    b2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl RecursiveFilter {
    /// Creates a low-pass filter with the given cutoff.
    pub fn new(breakpoint: f32) -> Self {
        Self {
            breakpoint: Param::new(breakpoint),
            bandwidth: Param::new(100.0),
            shape: FilterShape::LowPass,
            rate: 0.0,
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
            b1: 0.0,
            b2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Selects the response shape and retunes. Delay state is kept.
    pub fn set_shape(&mut self, shape: FilterShape) {
        self.shape = shape;
        self.recompute();
    }

    /// Returns the current response shape.
    pub fn shape(&self) -> FilterShape {
        self.shape
    }

    pub(crate) fn on_config(&mut self, config: &Config) {
        self.rate = config.effective_rate();
        self.recompute();
    }

    fn recompute(&mut self) {
        if self.rate <= 0.0 {
            return;
        }
        let fc = self.breakpoint.value() / self.rate;
        match self.shape {
            FilterShape::LowPass => {
                let x = expf(-TAU * fc);
                self.a0 = 1.0 - x;
                self.a1 = 0.0;
                self.a2 = 0.0;
                self.b1 = x;
                self.b2 = 0.0;
            }
            FilterShape::HighPass => {
                let x = expf(-TAU * fc);
                self.a0 = (1.0 + x) / 2.0;
                self.a1 = -(1.0 + x) / 2.0;
                self.a2 = 0.0;
                self.b1 = x;
                self.b2 = 0.0;
            }
            FilterShape::BandPass => {
                let bw = self.bandwidth.value() / self.rate;
                let r = 1.0 - 3.0 * bw;
                let cos_w = cosf(TAU * fc);
                let k = (1.0 - 2.0 * r * cos_w + r * r) / (2.0 - 2.0 * cos_w);
                self.a0 = 1.0 - k;
                self.a1 = 2.0 * (k - r) * cos_w;
                self.a2 = r * r - k;
                self.b1 = 2.0 * r * cos_w;
                self.b2 = -(r * r);
            }
            FilterShape::Notch => {
                let bw = self.bandwidth.value() / self.rate;
                let r = 1.0 - 3.0 * bw;
                let cos_w = cosf(TAU * fc);
                let k = (1.0 - 2.0 * r * cos_w + r * r) / (2.0 - 2.0 * cos_w);
                self.a0 = k;
                self.a1 = -2.0 * k * cos_w;
                self.a2 = k;
                self.b1 = 2.0 * r * cos_w;
                self.b2 = -(r * r);
            }
        }
    }

    /// Runs one sample through the recursion.
    #[inline]
    pub(crate) fn process(&mut self, input: f32) -> f32 {
        if self.breakpoint.take_updated() | self.bandwidth.take_updated() {
            self.recompute();
        }
        let y = self.a0 * input + self.a1 * self.x1 + self.a2 * self.x2
            + self.b1 * self.y1
            + self.b2 * self.y2;
        let y = flush_denormal(y);
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// One-pole RC low-pass / high-pass pair.
///
/// Integrates `v += (x - v) · 2π·breakpoint / rate` each sample. The
/// low-pass output is the capacitor voltage; the high-pass output is the
/// residual `x - v`.
#[derive(Clone, Copy, Debug)]
pub struct RcFilter {
    /// Cutoff frequency in Hz; automatable per sample.
    pub(crate) breakpoint: Param,
    high_pass: bool,
    state: f32,
    rate: f32,
}

impl RcFilter {
    /// Creates an RC low-pass with the given cutoff.
    pub fn new(breakpoint: f32) -> Self {
        Self {
            breakpoint: Param::new(breakpoint),
            high_pass: false,
            state: 0.0,
            rate: 0.0,
        }
    }

    /// Switches between the low-pass and high-pass tap.
    pub fn set_high_pass(&mut self, high_pass: bool) {
        self.high_pass = high_pass;
    }

    pub(crate) fn on_config(&mut self, config: &Config) {
        self.rate = config.effective_rate();
    }

    #[inline]
    pub(crate) fn process(&mut self, input: f32) -> f32 {
        if self.rate <= 0.0 {
            return 0.0;
        }
        let coefficient = (TAU * self.breakpoint.value() / self.rate).min(1.0);
        self.state += (input - self.state) * coefficient;
        self.state = flush_denormal(self.state);
        if self.high_pass {
            input - self.state
        } else {
            self.state
        }
    }
}
