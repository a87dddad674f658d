//! Gate-driven ADSR amplitude envelope.

use crate::config::Config;
use crate::param::Param;

/// Envelope progression stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    /// Gate has never fired or the release finished. Output is zero.
    #[default]
    Idle,
    /// Ramping toward full level.
    Attack,
    /// Ramping from full level down to the sustain level.
    Decay,
    /// Holding the sustain level while the gate stays high.
    Sustain,
    /// Ramping from the level at gate-off down to zero.
    Release,
}

/// Linear ADSR envelope, retriggerable from any stage.
///
/// The gate is a parameter: a rising edge (zero to positive) starts the
/// attack from the current level, so a retrigger mid-release picks up
/// where the tail left off instead of snapping to zero. A falling edge
/// starts the release from the current level.
#[derive(Clone, Copy, Debug)]
pub struct Envelope {
    /// Gate signal; automatable.
    pub(crate) gate: Param,
    /// Attack time in seconds; automatable.
    pub(crate) attack: Param,
    /// Decay time in seconds; automatable.
    pub(crate) decay: Param,
    /// Sustain level in [0, 1]; automatable.
    pub(crate) sustain: Param,
    /// Release time in seconds; automatable.
    pub(crate) release: Param,
    stage: Stage,
    time_in_stage: f32,
    level: f32,
    level_at_attack: f32,
    level_at_release: f32,
    previous_gate: f32,
    rate: f32,
}

impl Envelope {
    /// Creates an envelope with the given stage times (seconds) and
    /// sustain level.
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            gate: Param::new(0.0),
            attack: Param::new(attack),
            decay: Param::new(decay),
            sustain: Param::new(sustain),
            release: Param::new(release),
            stage: Stage::Idle,
            time_in_stage: 0.0,
            level: 0.0,
            level_at_attack: 0.0,
            level_at_release: 0.0,
            previous_gate: 0.0,
            rate: 0.0,
        }
    }

    /// The stage the envelope is currently in.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The envelope's current output level.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Forces the attack stage from any state, ramping up from the
    /// current level.
    pub fn attack(&mut self) {
        self.level_at_attack = self.level;
        self.enter(Stage::Attack);
    }

    /// Forces the release stage, ramping down from the current level.
    pub fn release(&mut self) {
        self.level_at_release = self.level;
        self.enter(Stage::Release);
    }

    pub(crate) fn on_config(&mut self, config: &Config) {
        self.rate = config.effective_rate();
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.time_in_stage = 0.0;
    }

    /// Advances the envelope by one sample and returns the level.
    pub(crate) fn advance(&mut self) -> f32 {
        if self.rate <= 0.0 {
            return 0.0;
        }
        let gate = self.gate.value();
        if gate > 0.0 && self.previous_gate <= 0.0 {
            self.level_at_attack = self.level;
            self.enter(Stage::Attack);
        } else if gate <= 0.0 && self.previous_gate > 0.0 {
            self.level_at_release = self.level;
            self.enter(Stage::Release);
        }
        self.previous_gate = gate;

        self.time_in_stage += 1.0 / self.rate;
        match self.stage {
            Stage::Idle => {
                self.level = 0.0;
            }
            Stage::Attack => {
                let attack = self.attack.value();
                if self.time_in_stage >= attack || attack <= 0.0 {
                    self.level = 1.0;
                    self.enter(Stage::Decay);
                } else {
                    let t = self.time_in_stage / attack;
                    self.level = self.level_at_attack + (1.0 - self.level_at_attack) * t;
                }
            }
            Stage::Decay => {
                let decay = self.decay.value();
                let sustain = self.sustain.value();
                if self.time_in_stage >= decay || decay <= 0.0 {
                    self.level = sustain;
                    self.enter(Stage::Sustain);
                } else {
                    let t = self.time_in_stage / decay;
                    self.level = 1.0 + (sustain - 1.0) * t;
                }
            }
            Stage::Sustain => {
                self.level = self.sustain.value();
            }
            Stage::Release => {
                let release = self.release.value();
                if self.time_in_stage >= release || release <= 0.0 {
                    self.level = 0.0;
                    self.enter(Stage::Idle);
                } else {
                    let t = self.time_in_stage / release;
                    self.level = self.level_at_release * (1.0 - t);
                }
            }
        }
        self.level
    }
}

impl Default for Envelope {
    /// 10 ms attack, 100 ms decay, 0.7 sustain, 200 ms release.
    fn default() -> Self {
        Self::new(0.01, 0.1, 0.7, 0.2)
    }
}
