//! Stateless arithmetic modules and the trivial ramp generator.

use crate::math::db_to_amplitude;
use crate::param::Param;

/// Adds a constant (or patched) offset to its input.
#[derive(Clone, Copy, Debug)]
pub struct Adder {
    /// Offset added to the input; automatable.
    pub(crate) amount: Param,
}

impl Adder {
    /// Creates an adder with the given offset.
    pub fn new(amount: f32) -> Self {
        Self {
            amount: Param::new(amount),
        }
    }

    #[inline]
    pub(crate) fn process(&self, input: f32) -> f32 {
        input + self.amount.value()
    }
}

impl Default for Adder {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Scales its input by a constant (or patched) factor.
#[derive(Clone, Copy, Debug)]
pub struct Multiplier {
    /// Gain factor; automatable.
    pub(crate) amount: Param,
}

impl Multiplier {
    /// Creates a multiplier with the given linear gain.
    pub fn new(amount: f32) -> Self {
        Self {
            amount: Param::new(amount),
        }
    }

    /// Sets the gain in decibels.
    pub fn set_gain_db(&mut self, decibels: f32) {
        self.amount.set(db_to_amplitude(decibels));
    }

    #[inline]
    pub(crate) fn process(&self, input: f32) -> f32 {
        input * self.amount.value()
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Hard-limits its input to a closed range.
#[derive(Clone, Copy, Debug)]
pub struct Clamper {
    /// Lower bound; automatable.
    pub(crate) low: Param,
    /// Upper bound; automatable.
    pub(crate) high: Param,
}

impl Clamper {
    /// Creates a clamper with the given bounds.
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            low: Param::new(low),
            high: Param::new(high),
        }
    }

    #[inline]
    pub(crate) fn process(&self, input: f32) -> f32 {
        let low = self.low.value();
        let high = self.high.value();
        if low > high {
            // Inverted bounds collapse to the midpoint instead of
            // producing an unordered clamp.
            return (low + high) * 0.5;
        }
        input.clamp(low, high)
    }
}

impl Default for Clamper {
    /// Clamps to the nominal signal range [-1, 1].
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

/// Applies an arbitrary pure function to its input.
pub struct Function {
    f: fn(f32) -> f32,
}

impl Function {
    /// Wraps a plain function pointer as a one-in one-out module.
    pub fn new(f: fn(f32) -> f32) -> Self {
        Self { f }
    }

    #[inline]
    pub(crate) fn process(&self, input: f32) -> f32 {
        (self.f)(input)
    }
}

impl core::fmt::Debug for Function {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Function").finish_non_exhaustive()
    }
}

impl Clone for Function {
    fn clone(&self) -> Self {
        Self { f: self.f }
    }
}

/// Emits a linear ramp: returns the current value, then steps it.
///
/// Both the value and the step are parameters, so a pull sequence starting
/// from `value = 0, step = 1` yields 0, 1, 2, 3 and the visible `Value`
/// parameter always holds the next sample to be emitted.
#[derive(Clone, Copy, Debug)]
pub struct TrivialGenerator {
    /// Next value to emit; automatable (and written back each pull).
    pub(crate) value: Param,
    /// Per-sample increment; automatable.
    pub(crate) step: Param,
}

impl TrivialGenerator {
    /// Creates a ramp starting at `value`, advancing by `step` per pull.
    pub fn new(value: f32, step: f32) -> Self {
        Self {
            value: Param::new(value),
            step: Param::new(step),
        }
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> f32 {
        let out = self.value.value();
        self.value.store(out + self.step.value());
        out
    }
}

impl Default for TrivialGenerator {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
