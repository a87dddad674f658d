//! Offline rendering of a rack into sample buffers.

use patchbay_core::{BufferSource, ModuleId, Rack};

use crate::{Error, Result};

/// Renders `count` samples by pulling the sink repeatedly.
///
/// Fails up front if any module upstream of the sink was never
/// configured, so a silent half-wired patch surfaces as an error instead
/// of a buffer of zeros.
pub fn render(rack: &mut Rack, sink: ModuleId, count: usize) -> Result<Vec<f32>> {
    rack.ensure_configured(sink)?;
    tracing::debug!(sink = ?sink, count, "rendering buffer");
    let mut buffer = Vec::with_capacity(count);
    for _ in 0..count {
        buffer.push(rack.next_sample(sink)?);
    }
    Ok(buffer)
}

/// Renders `seconds` of audio at the sink's configured sample rate.
pub fn render_seconds(rack: &mut Rack, sink: ModuleId, seconds: f32) -> Result<Vec<f32>> {
    if seconds < 0.0 || !seconds.is_finite() {
        return Err(Error::BadDuration(seconds));
    }
    let rate = rack.config(sink)?.sample_rate;
    render(rack, sink, (seconds * rate) as usize)
}

/// Renders into an existing buffer, overwriting it.
pub fn render_into(rack: &mut Rack, sink: ModuleId, buffer: &mut [f32]) -> Result<()> {
    rack.ensure_configured(sink)?;
    for slot in buffer.iter_mut() {
        *slot = rack.next_sample(sink)?;
    }
    Ok(())
}

/// Renders and adds onto an existing buffer, for layering several passes
/// of the same rack (or several racks) into one mix.
pub fn mix_into(rack: &mut Rack, sink: ModuleId, buffer: &mut [f32]) -> Result<()> {
    rack.ensure_configured(sink)?;
    for slot in buffer.iter_mut() {
        *slot += rack.next_sample(sink)?;
    }
    Ok(())
}

/// Pulls one channel out of an interleaved frame buffer.
///
/// Returns `BadChannel` if `channel` is not below `channels` or
/// `channels` is zero.
pub fn extract_channel(interleaved: &[f32], channels: usize, channel: usize) -> Result<Vec<f32>> {
    if channels == 0 || channel >= channels {
        return Err(Error::BadChannel { channel, channels });
    }
    Ok(interleaved
        .iter()
        .skip(channel)
        .step_by(channels)
        .copied()
        .collect())
}

/// Wraps a mono buffer as a [`BufferSource`] module, ready to add to a
/// rack as a playback source.
pub fn buffer_source(samples: &[f32]) -> BufferSource {
    BufferSource::new(samples.to_vec())
}
