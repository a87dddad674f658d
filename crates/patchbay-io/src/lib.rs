//! Buffer rendering layer for the patchbay synthesis engine.
//!
//! `patchbay-core` produces audio one pulled sample at a time; this crate
//! turns that into whole buffers:
//!
//! - [`render`] / [`render_seconds`]: pull a patch into a fresh `Vec<f32>`
//! - [`render_into`] / [`mix_into`]: fill or layer onto an existing buffer
//! - [`extract_channel`] / [`buffer_source`]: move captured audio into a
//!   rack as a [`patchbay_core::BufferSource`]
//!
//! ```
//! use patchbay_core::{Config, Oscillator, Output, Rack};
//! use patchbay_io::render_seconds;
//!
//! let mut rack = Rack::new();
//! let osc = rack.add(Oscillator::new(440.0));
//! let out = rack.add(Output::default());
//! rack.connect(osc, out)?;
//! rack.set_config(out, Config::new(48000.0))?;
//! let half_second = render_seconds(&mut rack, out, 0.5)?;
//! assert_eq!(half_second.len(), 24000);
//! # Ok::<(), patchbay_io::Error>(())
//! ```

mod render;

pub use render::{buffer_source, extract_channel, mix_into, render, render_into, render_seconds};

/// Error types for rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The rack refused a wiring or evaluation operation.
    #[error("patch error: {0}")]
    Patch(#[from] patchbay_core::PatchError),

    /// A render duration was negative or not finite.
    #[error("invalid render duration: {0} seconds")]
    BadDuration(f32),

    /// A channel index does not exist in the interleaved layout.
    #[error("channel {channel} out of range for {channels} channels")]
    BadChannel {
        /// The requested channel index.
        channel: usize,
        /// The number of channels in the buffer.
        channels: usize,
    },
}

/// Convenience result type for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;
