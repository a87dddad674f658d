//! Signal routing: mixing, splitting, ring modulation, and the endpoints
//! that bridge the rack to sample buffers.

use alloc::vec::Vec;

/// Sums an unbounded number of inputs into one output.
///
/// The summation itself happens in the rack's evaluation step; the struct
/// exists so a mixer occupies a slot with unbounded input arity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mixer;

/// Fans one input out to several outputs.
///
/// The input is pulled exactly once per evaluation tick no matter how many
/// outputs draw from it. The first draw of a tick pulls and caches; the
/// remaining draws are served from the cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct Splitter {
    cached: f32,
    remaining: usize,
}

impl Splitter {
    /// Maximum number of outputs a splitter supports.
    pub const MAX_OUTPUTS: usize = 32;

    /// True if the next draw must pull the input afresh.
    #[inline]
    pub(crate) fn needs_pull(&self) -> bool {
        self.remaining == 0
    }

    /// Stores a freshly pulled sample to serve `fanout` draws.
    #[inline]
    pub(crate) fn refill(&mut self, sample: f32, fanout: usize) {
        self.cached = sample;
        self.remaining = fanout.max(1);
    }

    /// Serves one draw from the cache.
    #[inline]
    pub(crate) fn draw(&mut self) -> f32 {
        self.remaining -= 1;
        self.cached
    }

    /// Discards the cache so the next draw pulls afresh.
    ///
    /// Called when the output set changes mid-tick; a stale countdown
    /// would otherwise leave new outputs reading an old sample.
    pub(crate) fn invalidate(&mut self) {
        self.remaining = 0;
    }
}

/// Multiplies its two inputs sample by sample.
///
/// Degrades gracefully below full arity: with one input it passes that
/// input through, with none it is silent.
#[derive(Clone, Copy, Debug, Default)]
pub struct RingModulator;

/// Terminal sink that delivers finished samples.
///
/// The rack pulls the output's upstream chain `oversampling` times per
/// delivered sample and averages, folding the oversampled rate back down
/// to the configured output rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Output {
    last: f32,
}

impl Output {
    #[inline]
    pub(crate) fn store(&mut self, sample: f32) {
        self.last = sample;
    }

    /// The most recently delivered sample.
    pub fn last_sample(&self) -> f32 {
        self.last
    }
}

/// Plays a prerecorded buffer into the rack, one sample per pull.
///
/// Past the end of the buffer it emits silence.
#[derive(Clone, Debug, Default)]
pub struct BufferSource {
    samples: Vec<f32>,
    index: usize,
    rate: f32,
}

impl BufferSource {
    /// Creates a source over the given samples.
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            index: 0,
            rate: 0.0,
        }
    }

    /// Rewinds playback to the first sample.
    pub fn rewind(&mut self) {
        self.index = 0;
    }

    /// Seeks to a sample position. Positions past the end pin playback
    /// at end-of-data.
    pub fn seek(&mut self, sample: usize) {
        self.index = sample.min(self.samples.len());
    }

    /// Seeks to a time in seconds at the configured rate.
    ///
    /// Before any configuration arrives the rate is unknown and this
    /// rewinds to the start.
    pub fn set_time(&mut self, seconds: f32) {
        if self.rate <= 0.0 || seconds <= 0.0 {
            self.rewind();
        } else {
            self.seek((seconds * self.rate) as usize);
        }
    }

    /// True while samples remain to be emitted.
    pub fn can_play(&self) -> bool {
        !self.exhausted()
    }

    /// True once every sample has been emitted.
    pub fn exhausted(&self) -> bool {
        self.index >= self.samples.len()
    }

    pub(crate) fn on_config(&mut self, config: &crate::config::Config) {
        self.rate = config.effective_rate();
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> f32 {
        match self.samples.get(self.index) {
            Some(&s) => {
                self.index += 1;
                s
            }
            None => 0.0,
        }
    }
}
