//! Module slots and the closed set of module kinds.

use alloc::vec::Vec;

use crate::additive::AdditiveSynth;
use crate::config::Config;
use crate::envelope::Envelope;
use crate::filter::{RcFilter, RecursiveFilter};
use crate::fir::FirFilter;
use crate::ops::{Adder, Clamper, Function, Multiplier, TrivialGenerator};
use crate::oscillator::Oscillator;
use crate::param::{Param, ParamKey};
use crate::rack::ModuleId;
use crate::routing::{BufferSource, Mixer, Output, RingModulator, Splitter};

/// The closed set of module behaviors a rack slot can hold.
///
/// Dispatch is a match on this enum rather than dynamic trait objects, so
/// the evaluation loop stays monomorphic and allocation-free.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum ModuleKind {
    Oscillator(Oscillator),
    AdditiveSynth(AdditiveSynth),
    TrivialGenerator(TrivialGenerator),
    BufferSource(BufferSource),
    Adder(Adder),
    Multiplier(Multiplier),
    Clamper(Clamper),
    Function(Function),
    Mixer(Mixer),
    Splitter(Splitter),
    RingModulator(RingModulator),
    RecursiveFilter(RecursiveFilter),
    FirFilter(FirFilter),
    RcFilter(RcFilter),
    Envelope(Envelope),
    Output(Output),
}

macro_rules! impl_from_kind {
    ($($ty:ident),* $(,)?) => {
        $(impl From<$ty> for ModuleKind {
            fn from(inner: $ty) -> Self {
                Self::$ty(inner)
            }
        })*
    };
}

impl_from_kind!(
    Oscillator,
    AdditiveSynth,
    TrivialGenerator,
    BufferSource,
    Adder,
    Multiplier,
    Clamper,
    Function,
    Mixer,
    Splitter,
    RingModulator,
    RecursiveFilter,
    FirFilter,
    RcFilter,
    Envelope,
    Output,
);

impl ModuleKind {
    /// Maximum number of input connections this kind accepts.
    pub fn max_inputs(&self) -> usize {
        match self {
            Self::Oscillator(_)
            | Self::AdditiveSynth(_)
            | Self::TrivialGenerator(_)
            | Self::BufferSource(_) => 0,
            Self::Mixer(_) => usize::MAX,
            Self::RingModulator(_) => 2,
            _ => 1,
        }
    }

    /// Maximum number of output connections this kind accepts.
    pub fn max_outputs(&self) -> usize {
        match self {
            Self::Output(_) => 0,
            Self::Splitter(_) => Splitter::MAX_OUTPUTS,
            _ => 1,
        }
    }

    /// The parameter keys this kind declares, in pull order.
    pub fn param_keys(&self) -> &'static [ParamKey] {
        match self {
            Self::Oscillator(_) => &[ParamKey::Frequency],
            Self::AdditiveSynth(_) => &[ParamKey::Fundamental],
            Self::TrivialGenerator(_) => &[ParamKey::Value, ParamKey::Step],
            Self::Adder(_) | Self::Multiplier(_) => &[ParamKey::Amount],
            Self::Clamper(_) => &[ParamKey::Low, ParamKey::High],
            Self::RecursiveFilter(_) | Self::FirFilter(_) => {
                &[ParamKey::Breakpoint, ParamKey::Bandwidth]
            }
            Self::RcFilter(_) => &[ParamKey::Breakpoint],
            Self::Envelope(_) => &[
                ParamKey::Gate,
                ParamKey::Attack,
                ParamKey::Decay,
                ParamKey::Sustain,
                ParamKey::Release,
            ],
            Self::BufferSource(_)
            | Self::Function(_)
            | Self::Mixer(_)
            | Self::Splitter(_)
            | Self::RingModulator(_)
            | Self::Output(_) => &[],
        }
    }

    /// Looks up a declared parameter by key.
    pub fn param(&self, key: ParamKey) -> Option<&Param> {
        match (self, key) {
            (Self::Oscillator(m), ParamKey::Frequency) => Some(&m.frequency),
            (Self::AdditiveSynth(m), ParamKey::Fundamental) => Some(&m.fundamental),
            (Self::TrivialGenerator(m), ParamKey::Value) => Some(&m.value),
            (Self::TrivialGenerator(m), ParamKey::Step) => Some(&m.step),
            (Self::Adder(m), ParamKey::Amount) => Some(&m.amount),
            (Self::Multiplier(m), ParamKey::Amount) => Some(&m.amount),
            (Self::Clamper(m), ParamKey::Low) => Some(&m.low),
            (Self::Clamper(m), ParamKey::High) => Some(&m.high),
            (Self::RecursiveFilter(m), ParamKey::Breakpoint) => Some(&m.breakpoint),
            (Self::RecursiveFilter(m), ParamKey::Bandwidth) => Some(&m.bandwidth),
            (Self::FirFilter(m), ParamKey::Breakpoint) => Some(&m.breakpoint),
            (Self::FirFilter(m), ParamKey::Bandwidth) => Some(&m.bandwidth),
            (Self::RcFilter(m), ParamKey::Breakpoint) => Some(&m.breakpoint),
            (Self::Envelope(m), ParamKey::Gate) => Some(&m.gate),
            (Self::Envelope(m), ParamKey::Attack) => Some(&m.attack),
            (Self::Envelope(m), ParamKey::Decay) => Some(&m.decay),
            (Self::Envelope(m), ParamKey::Sustain) => Some(&m.sustain),
            (Self::Envelope(m), ParamKey::Release) => Some(&m.release),
            _ => None,
        }
    }

    /// Mutable lookup of a declared parameter by key.
    pub fn param_mut(&mut self, key: ParamKey) -> Option<&mut Param> {
        match (self, key) {
            (Self::Oscillator(m), ParamKey::Frequency) => Some(&mut m.frequency),
            (Self::AdditiveSynth(m), ParamKey::Fundamental) => Some(&mut m.fundamental),
            (Self::TrivialGenerator(m), ParamKey::Value) => Some(&mut m.value),
            (Self::TrivialGenerator(m), ParamKey::Step) => Some(&mut m.step),
            (Self::Adder(m), ParamKey::Amount) => Some(&mut m.amount),
            (Self::Multiplier(m), ParamKey::Amount) => Some(&mut m.amount),
            (Self::Clamper(m), ParamKey::Low) => Some(&mut m.low),
            (Self::Clamper(m), ParamKey::High) => Some(&mut m.high),
            (Self::RecursiveFilter(m), ParamKey::Breakpoint) => Some(&mut m.breakpoint),
            (Self::RecursiveFilter(m), ParamKey::Bandwidth) => Some(&mut m.bandwidth),
            (Self::FirFilter(m), ParamKey::Breakpoint) => Some(&mut m.breakpoint),
            (Self::FirFilter(m), ParamKey::Bandwidth) => Some(&mut m.bandwidth),
            (Self::RcFilter(m), ParamKey::Breakpoint) => Some(&mut m.breakpoint),
            (Self::Envelope(m), ParamKey::Gate) => Some(&mut m.gate),
            (Self::Envelope(m), ParamKey::Attack) => Some(&mut m.attack),
            (Self::Envelope(m), ParamKey::Decay) => Some(&mut m.decay),
            (Self::Envelope(m), ParamKey::Sustain) => Some(&mut m.sustain),
            (Self::Envelope(m), ParamKey::Release) => Some(&mut m.release),
            _ => None,
        }
    }

    /// Pushes a new configuration into rate-dependent state.
    pub(crate) fn on_config(&mut self, config: &Config) {
        match self {
            Self::Oscillator(m) => m.on_config(config),
            Self::AdditiveSynth(m) => m.on_config(config),
            Self::RecursiveFilter(m) => m.on_config(config),
            Self::FirFilter(m) => m.on_config(config),
            Self::RcFilter(m) => m.on_config(config),
            Self::Envelope(m) => m.on_config(config),
            Self::BufferSource(m) => m.on_config(config),
            _ => {}
        }
    }
}

/// One occupied slot in the rack: a behavior plus its wiring and
/// configuration.
#[derive(Clone, Debug)]
pub struct Module {
    /// The slot's behavior and parameter state.
    pub(crate) kind: ModuleKind,
    /// Modules feeding this one, oldest connection first.
    pub(crate) inputs: Vec<ModuleId>,
    /// Modules fed by this one, oldest connection first.
    pub(crate) outputs: Vec<ModuleId>,
    /// This module's configuration snapshot.
    pub(crate) config: Config,
}

impl Module {
    pub(crate) fn new(kind: ModuleKind) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            config: Config::default(),
        }
    }

    /// The behavior occupying this slot.
    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    /// The modules currently feeding this one.
    pub fn inputs(&self) -> &[ModuleId] {
        &self.inputs
    }

    /// The modules currently fed by this one.
    pub fn outputs(&self) -> &[ModuleId] {
        &self.outputs
    }

    /// This module's configuration snapshot.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
