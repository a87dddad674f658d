//! Shared per-module configuration.
//!
//! Every module carries a [`Config`] snapshot describing the rate it runs
//! at. Configuration is injected at one point (usually the sink) and copied
//! along connections by the rack as plain values, not a shared mutable
//! object. A module whose configuration was never set stays
//! uninitialized and must not be asked for real output.

/// Sample-rate and oversampling configuration for one module.
///
/// Copied into a module when it first receives a configuration from a
/// neighbor; see `Rack::set_config` for the propagation rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Whether a real configuration has been received.
    pub initialized: bool,
    /// Output sample rate in Hz. Zero until initialized.
    pub sample_rate: f32,
    /// Oversampling factor. Modules run at `sample_rate * oversampling`;
    /// the output module averages that many pulls back down to one sample.
    pub oversampling: u32,
}

impl Config {
    /// Creates an initialized configuration at the given sample rate,
    /// without oversampling.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            initialized: true,
            sample_rate,
            oversampling: 1,
        }
    }

    /// Creates an initialized configuration with an oversampling factor.
    ///
    /// A factor of zero is treated as one.
    pub fn with_oversampling(sample_rate: f32, oversampling: u32) -> Self {
        Self {
            initialized: true,
            sample_rate,
            oversampling: oversampling.max(1),
        }
    }

    /// The rate modules actually run at: `sample_rate * oversampling`.
    #[inline]
    pub fn effective_rate(&self) -> f32 {
        self.sample_rate * self.oversampling as f32
    }
}

impl Default for Config {
    /// An uninitialized configuration with a sentinel rate of zero.
    fn default() -> Self {
        Self {
            initialized: false,
            sample_rate: 0.0,
            oversampling: 1,
        }
    }
}
