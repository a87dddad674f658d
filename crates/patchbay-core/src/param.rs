//! Automatable module parameters.
//!
//! A [`Param`] holds a literal value that can instead be driven ("patched")
//! by another module's output. The rack pulls each patched parameter exactly
//! once per evaluation step of its owning module; pulling twice before the
//! next step would double-advance the patch source, so parameter refresh is
//! centralized in the rack rather than exposed on the parameter itself.

use crate::rack::ModuleId;

/// Names of every parameter in the module library.
///
/// A parameter is addressed as `(ModuleId, ParamKey)`; each module kind
/// exposes the subset of keys it declares. Connecting to a key a module
/// does not declare is a `NoSuchParam` error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Oscillator fundamental frequency in Hz.
    Frequency,
    /// Additive synth fundamental frequency in Hz.
    Fundamental,
    /// Adder offset / Multiplier factor.
    Amount,
    /// Clamper lower bound.
    Low,
    /// Clamper upper bound.
    High,
    /// Envelope gate signal (0 → positive edge attacks, → 0 releases).
    Gate,
    /// Envelope attack time in seconds.
    Attack,
    /// Envelope decay time in seconds.
    Decay,
    /// Envelope sustain level in [0, 1].
    Sustain,
    /// Envelope release time in seconds.
    Release,
    /// Filter breakpoint (cutoff / center) frequency in Hz.
    Breakpoint,
    /// Band/notch filter bandwidth in Hz.
    Bandwidth,
    /// Trivial generator current value.
    Value,
    /// Trivial generator per-sample increment.
    Step,
}

/// A settable scalar that may be patched to a module's output.
///
/// Assigning a literal clears any patch. Installing a patch leaves the
/// stored literal untouched until the next pull overwrites it.
#[derive(Clone, Copy, Debug)]
pub struct Param {
    value: f32,
    source: Option<ModuleId>,
    updated: bool,
}

impl Param {
    /// Creates a parameter with a literal default value.
    pub fn new(value: f32) -> Self {
        Self {
            value,
            source: None,
            updated: true,
        }
    }

    /// Assigns a literal value, disconnecting any patch source.
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.source = None;
        self.updated = true;
    }

    /// Returns the stored value without advancing anything.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// The module currently driving this parameter, if patched.
    #[inline]
    pub fn source(&self) -> Option<ModuleId> {
        self.source
    }

    /// Installs a patch source, replacing any existing one. Does not pull.
    pub(crate) fn patch(&mut self, source: ModuleId) {
        self.source = Some(source);
    }

    /// Removes the patch source, keeping the last stored value.
    pub(crate) fn unpatch(&mut self) {
        self.source = None;
    }

    /// Stores a freshly pulled value, flagging a change if it differs.
    ///
    /// Called by the rack once per evaluation step of the owning module.
    #[inline]
    pub(crate) fn apply(&mut self, value: f32) {
        if value != self.value {
            self.value = value;
            self.updated = true;
        }
    }

    /// Overwrites the stored value without touching patch or change state.
    ///
    /// Used by modules whose evaluation writes the parameter back (the
    /// trivial generator's ramp).
    #[inline]
    pub(crate) fn store(&mut self, value: f32) {
        self.value = value;
    }

    /// Returns and clears the change flag.
    ///
    /// Modules with derived state (filter coefficients, phase increments)
    /// use this to recompute only when the controlling value moved.
    #[inline]
    pub(crate) fn take_updated(&mut self) -> bool {
        core::mem::replace(&mut self.updated, false)
    }
}
