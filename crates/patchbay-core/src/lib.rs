//! Pull-based modular synthesis engine.
//!
//! A [`Rack`] owns a set of modules (oscillators, filters, envelopes,
//! mixers and friends) wired into a directed acyclic patch. Evaluation is
//! lazy and sample-by-sample: asking the sink for the next sample pulls
//! the whole upstream chain exactly once. Any parameter can be driven by
//! another module's output, so modulation routing is the same mechanism
//! as audio routing.
//!
//! ```
//! use patchbay_core::{Config, Oscillator, Output, Rack};
//!
//! let mut rack = Rack::new();
//! let osc = rack.add(Oscillator::new(440.0));
//! let out = rack.add(Output::default());
//! rack.connect(osc, out)?;
//! rack.set_config(out, Config::new(48000.0))?;
//! let sample = rack.next_sample(out)?;
//! assert!((-1.0..=1.0).contains(&sample));
//! # Ok::<(), patchbay_core::PatchError>(())
//! ```
//!
//! The crate is `no_std` (with `alloc`) by default; the `std` feature
//! adds `std::error::Error` for [`PatchError`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod additive;
mod config;
mod envelope;
mod filter;
mod fir;
pub mod math;
mod module;
mod ops;
mod oscillator;
mod param;
mod rack;
mod routing;

pub use additive::{AdditiveSynth, Harmonic, HarmonicPreset, HarmonicSeries};
pub use config::Config;
pub use envelope::{Envelope, Stage};
pub use filter::{FilterShape, RcFilter, RecursiveFilter};
pub use fir::{FirFilter, FirShape, Window};
pub use module::{Module, ModuleKind};
pub use ops::{Adder, Clamper, Function, Multiplier, TrivialGenerator};
pub use oscillator::{Oscillator, Waveform};
pub use param::{Param, ParamKey};
pub use rack::{ModuleId, PatchError, Rack};
pub use routing::{BufferSource, Mixer, Output, RingModulator, Splitter};
