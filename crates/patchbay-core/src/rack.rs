//! The rack: module storage, wiring, and pull-based evaluation.
//!
//! Modules live in an arena indexed by [`ModuleId`]; all wiring between
//! them is held as id lists on each slot, so the rack owns every module
//! and no reference cycles exist no matter how the patch is wired. One
//! call to [`Rack::next_sample`] pulls the sink's upstream chain exactly
//! once (splitters cache to keep the exactly-once guarantee across
//! fan-out) and produces one finished sample.

use alloc::vec;
use alloc::vec::Vec;

use crate::config::Config;
use crate::module::{Module, ModuleKind};
use crate::param::ParamKey;

/// Handle to a module slot in a [`Rack`].
///
/// Ids are never reused: removing a module retires its slot for the
/// lifetime of the rack, so a stale handle fails with `ModuleNotFound`
/// instead of silently addressing a newer module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub(crate) u32);

/// Errors reported by rack wiring and evaluation operations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PatchError {
    /// The id does not address a live module in this rack.
    ModuleNotFound,
    /// The source takes no outputs or the destination takes no inputs.
    NotConnectable,
    /// The requested edge does not exist.
    NotConnected,
    /// The connection would close a feedback loop.
    CycleDetected,
    /// Both endpoints are already configured, at different rates.
    ConfigMismatch {
        /// Effective rate of the source side, in Hz.
        expected: f32,
        /// Effective rate of the destination side, in Hz.
        found: f32,
    },
    /// The destination module does not declare the named parameter.
    NoSuchParam,
    /// A module in the chain has never received a configuration.
    NotConfigured,
}

impl core::fmt::Display for PatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ModuleNotFound => write!(f, "module not found in rack"),
            Self::NotConnectable => write!(f, "module does not support that connection"),
            Self::NotConnected => write!(f, "modules are not connected"),
            Self::CycleDetected => write!(f, "connection would create a cycle"),
            Self::ConfigMismatch { expected, found } => write!(
                f,
                "configuration mismatch: source runs at {expected} Hz, destination at {found} Hz"
            ),
            Self::NoSuchParam => write!(f, "module has no such parameter"),
            Self::NotConfigured => write!(f, "module chain has no configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PatchError {}

/// Arena of modules plus the wiring between them.
#[derive(Clone, Debug, Default)]
pub struct Rack {
    modules: Vec<Option<Module>>,
}

impl Rack {
    /// Creates an empty rack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live modules.
    pub fn len(&self) -> usize {
        self.modules.iter().filter(|s| s.is_some()).count()
    }

    /// True if the rack holds no modules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a module and returns its handle.
    pub fn add(&mut self, kind: impl Into<ModuleKind>) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Some(Module::new(kind.into())));
        #[cfg(feature = "tracing")]
        tracing::debug!(id = id.0, "module added");
        id
    }

    /// Borrow of a module slot.
    pub fn module(&self, id: ModuleId) -> Result<&Module, PatchError> {
        self.slot(id)
    }

    /// Borrow of a module's behavior, for typed inspection.
    pub fn kind(&self, id: ModuleId) -> Result<&ModuleKind, PatchError> {
        Ok(&self.slot(id)?.kind)
    }

    /// Mutable borrow of a module's behavior, for typed reconfiguration.
    pub fn kind_mut(&mut self, id: ModuleId) -> Result<&mut ModuleKind, PatchError> {
        Ok(&mut self.slot_mut(id)?.kind)
    }

    fn slot(&self, id: ModuleId) -> Result<&Module, PatchError> {
        self.modules
            .get(id.0 as usize)
            .and_then(|s| s.as_ref())
            .ok_or(PatchError::ModuleNotFound)
    }

    fn slot_mut(&mut self, id: ModuleId) -> Result<&mut Module, PatchError> {
        self.modules
            .get_mut(id.0 as usize)
            .and_then(|s| s.as_mut())
            .ok_or(PatchError::ModuleNotFound)
    }

    /// Connects `src`'s output to `dst`'s input.
    ///
    /// Fails if either side takes no connections of that direction, if the
    /// edge would close a loop, or if both sides already run at different
    /// rates. When one side is configured and the other is not, the
    /// configuration spreads across the newly joined component. When a
    /// side is at its connection limit, its oldest connection is evicted
    /// to make room.
    pub fn connect(&mut self, src: ModuleId, dst: ModuleId) -> Result<(), PatchError> {
        let (src_cap, src_config) = {
            let m = self.slot(src)?;
            (m.kind.max_outputs(), m.config)
        };
        let (dst_cap, dst_config) = {
            let m = self.slot(dst)?;
            (m.kind.max_inputs(), m.config)
        };
        if src_cap == 0 || dst_cap == 0 {
            return Err(PatchError::NotConnectable);
        }
        if src == dst || self.reaches(dst, src) {
            return Err(PatchError::CycleDetected);
        }
        self.check_configs(&src_config, &dst_config)?;

        if self.slot(src)?.outputs.len() >= src_cap {
            let evicted = self.slot_mut(src)?.outputs.remove(0);
            #[cfg(feature = "tracing")]
            tracing::debug!(src = src.0, evicted = evicted.0, "oldest output evicted");
            if let Ok(m) = self.slot_mut(evicted) {
                if let Some(pos) = m.inputs.iter().position(|&i| i == src) {
                    m.inputs.remove(pos);
                }
            }
        }
        if self.slot(dst)?.inputs.len() >= dst_cap {
            let evicted = self.slot_mut(dst)?.inputs.remove(0);
            #[cfg(feature = "tracing")]
            tracing::debug!(dst = dst.0, evicted = evicted.0, "oldest input evicted");
            if let Ok(m) = self.slot_mut(evicted) {
                if let Some(pos) = m.outputs.iter().position(|&o| o == dst) {
                    m.outputs.remove(pos);
                }
                if let ModuleKind::Splitter(s) = &mut m.kind {
                    s.invalidate();
                }
            }
        }

        {
            let m = self.slot_mut(src)?;
            m.outputs.push(dst);
            if let ModuleKind::Splitter(s) = &mut m.kind {
                s.invalidate();
            }
        }
        self.slot_mut(dst)?.inputs.push(src);
        #[cfg(feature = "tracing")]
        tracing::debug!(src = src.0, dst = dst.0, "modules connected");

        if src_config.initialized && !dst_config.initialized {
            self.propagate_config(src, false);
        } else if dst_config.initialized && !src_config.initialized {
            self.propagate_config(dst, false);
        }
        Ok(())
    }

    /// Patches `src`'s output onto a parameter of `dst`.
    ///
    /// Replaces any existing patch on that parameter. The same cycle and
    /// configuration rules as [`Rack::connect`] apply.
    pub fn connect_param(
        &mut self,
        src: ModuleId,
        dst: ModuleId,
        key: ParamKey,
    ) -> Result<(), PatchError> {
        let src_config = {
            let m = self.slot(src)?;
            if m.kind.max_outputs() == 0 {
                return Err(PatchError::NotConnectable);
            }
            m.config
        };
        let dst_config = {
            let m = self.slot(dst)?;
            if m.kind.param(key).is_none() {
                return Err(PatchError::NoSuchParam);
            }
            m.config
        };
        if src == dst || self.reaches(dst, src) {
            return Err(PatchError::CycleDetected);
        }
        self.check_configs(&src_config, &dst_config)?;

        if let Some(p) = self.slot_mut(dst)?.kind.param_mut(key) {
            p.patch(src);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(src = src.0, dst = dst.0, ?key, "parameter patched");

        if src_config.initialized && !dst_config.initialized {
            self.propagate_config(src, false);
        } else if dst_config.initialized && !src_config.initialized {
            self.propagate_config(dst, false);
        }
        Ok(())
    }

    fn check_configs(&self, src: &Config, dst: &Config) -> Result<(), PatchError> {
        if src.initialized && dst.initialized && src != dst {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                src_rate = src.effective_rate(),
                dst_rate = dst.effective_rate(),
                "refusing to join mismatched configurations"
            );
            return Err(PatchError::ConfigMismatch {
                expected: src.effective_rate(),
                found: dst.effective_rate(),
            });
        }
        Ok(())
    }

    /// Removes the edge from `src` to `dst`, if present.
    pub fn disconnect(&mut self, src: ModuleId, dst: ModuleId) -> Result<(), PatchError> {
        self.slot(dst)?;
        let removed = {
            let m = self.slot_mut(src)?;
            match m.outputs.iter().position(|&o| o == dst) {
                Some(pos) => {
                    m.outputs.remove(pos);
                    if let ModuleKind::Splitter(s) = &mut m.kind {
                        s.invalidate();
                    }
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Err(PatchError::NotConnected);
        }
        let m = self.slot_mut(dst)?;
        if let Some(pos) = m.inputs.iter().position(|&i| i == src) {
            m.inputs.remove(pos);
        }
        Ok(())
    }

    /// Removes the patch on a parameter, keeping its last value.
    pub fn unpatch(&mut self, dst: ModuleId, key: ParamKey) -> Result<(), PatchError> {
        match self.slot_mut(dst)?.kind.param_mut(key) {
            Some(p) => {
                p.unpatch();
                Ok(())
            }
            None => Err(PatchError::NoSuchParam),
        }
    }

    /// Removes a module, detaching every edge and patch that touches it.
    pub fn remove(&mut self, id: ModuleId) -> Result<(), PatchError> {
        self.slot(id)?;
        for slot in self.modules.iter_mut().flatten() {
            slot.inputs.retain(|&i| i != id);
            slot.outputs.retain(|&o| o != id);
            let keys = slot.kind.param_keys();
            for &key in keys {
                if let Some(p) = slot.kind.param_mut(key) {
                    if p.source() == Some(id) {
                        p.unpatch();
                    }
                }
            }
            if let ModuleKind::Splitter(s) = &mut slot.kind {
                s.invalidate();
            }
        }
        self.modules[id.0 as usize] = None;
        #[cfg(feature = "tracing")]
        tracing::debug!(id = id.0, "module removed");
        Ok(())
    }

    /// Assigns a literal value to a parameter, clearing any patch.
    pub fn set_param(&mut self, id: ModuleId, key: ParamKey, value: f32) -> Result<(), PatchError> {
        match self.slot_mut(id)?.kind.param_mut(key) {
            Some(p) => {
                p.set(value);
                Ok(())
            }
            None => Err(PatchError::NoSuchParam),
        }
    }

    /// Reads a parameter's current value.
    pub fn param_value(&self, id: ModuleId, key: ParamKey) -> Result<f32, PatchError> {
        self.slot(id)?
            .kind
            .param(key)
            .map(|p| p.value())
            .ok_or(PatchError::NoSuchParam)
    }

    /// Reads a module's configuration snapshot.
    pub fn config(&self, id: ModuleId) -> Result<Config, PatchError> {
        Ok(self.slot(id)?.config)
    }

    /// Sets a module's configuration and spreads it across everything
    /// reachable from it, overriding what was there.
    pub fn set_config(&mut self, id: ModuleId, config: Config) -> Result<(), PatchError> {
        {
            let m = self.slot_mut(id)?;
            m.config = config;
            m.kind.on_config(&config);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            id = id.0,
            sample_rate = config.sample_rate,
            oversampling = config.oversampling,
            "configuration set"
        );
        self.propagate_config(id, true);
        Ok(())
    }

    /// Verifies that a module and its whole upstream chain are configured.
    pub fn ensure_configured(&self, id: ModuleId) -> Result<(), PatchError> {
        self.slot(id)?;
        let mut visited = vec![false; self.modules.len()];
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let idx = n.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            let m = self.slot(n)?;
            if !m.config.initialized {
                return Err(PatchError::NotConfigured);
            }
            for &input in &m.inputs {
                stack.push(input);
            }
            for &key in m.kind.param_keys() {
                if let Some(source) = m.kind.param(key).and_then(|p| p.source()) {
                    stack.push(source);
                }
            }
        }
        Ok(())
    }

    /// Produces one finished sample by pulling the chain behind `sink`.
    ///
    /// When the sink is an [`Output`](crate::Output), its input chain is
    /// pulled `oversampling` times and the pulls are averaged down to one
    /// output-rate sample. Any other module is pulled once directly.
    pub fn next_sample(&mut self, sink: ModuleId) -> Result<f32, PatchError> {
        let (config, is_output) = {
            let m = self.slot(sink)?;
            (m.config, matches!(m.kind, ModuleKind::Output(_)))
        };
        if !config.initialized {
            return Err(PatchError::NotConfigured);
        }
        let idx = sink.0 as usize;
        if !is_output {
            return Ok(self.pull(idx));
        }
        let sample = match self.input_at(idx, 0) {
            Some(input) => {
                let mut acc = 0.0;
                for _ in 0..config.oversampling.max(1) {
                    acc += self.pull(input.0 as usize);
                }
                acc / config.oversampling.max(1) as f32
            }
            None => 0.0,
        };
        if let Some(Some(m)) = self.modules.get_mut(idx) {
            if let ModuleKind::Output(o) = &mut m.kind {
                o.store(sample);
            }
        }
        Ok(sample)
    }

    /// True if `from` can reach `target` through audio or parameter edges.
    fn reaches(&self, from: ModuleId, target: ModuleId) -> bool {
        let mut visited = vec![false; self.modules.len()];
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            if n == target {
                return true;
            }
            let idx = n.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            if let Some(Some(m)) = self.modules.get(idx) {
                for &out in &m.outputs {
                    stack.push(out);
                }
            }
            for (i, slot) in self.modules.iter().enumerate() {
                let Some(m) = slot else { continue };
                for &key in m.kind.param_keys() {
                    if m.kind.param(key).and_then(|p| p.source()) == Some(n) {
                        stack.push(ModuleId(i as u32));
                    }
                }
            }
        }
        false
    }

    /// Spreads `start`'s configuration across its connected component.
    ///
    /// `force` overwrites configured modules too; otherwise only
    /// unconfigured modules adopt.
    fn propagate_config(&mut self, start: ModuleId, force: bool) {
        let config = match self.slot(start) {
            Ok(m) => m.config,
            Err(_) => return,
        };
        let mut visited = vec![false; self.modules.len()];
        let mut stack = vec![start];
        while let Some(n) = stack.pop() {
            let idx = n.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            let Some(Some(m)) = self.modules.get_mut(idx) else {
                continue;
            };
            if n != start && (force || !m.config.initialized) && m.config != config {
                m.config = config;
                m.kind.on_config(&config);
            }
            let m = match self.slot(n) {
                Ok(m) => m,
                Err(_) => continue,
            };
            for &input in &m.inputs {
                stack.push(input);
            }
            for &out in &m.outputs {
                stack.push(out);
            }
            for &key in m.kind.param_keys() {
                if let Some(source) = m.kind.param(key).and_then(|p| p.source()) {
                    stack.push(source);
                }
            }
            for (i, slot) in self.modules.iter().enumerate() {
                let Some(other) = slot else { continue };
                for &key in other.kind.param_keys() {
                    if other.kind.param(key).and_then(|p| p.source()) == Some(n) {
                        stack.push(ModuleId(i as u32));
                    }
                }
            }
        }
    }

    fn input_at(&self, index: usize, n: usize) -> Option<ModuleId> {
        self.modules
            .get(index)
            .and_then(|s| s.as_ref())
            .and_then(|m| m.inputs.get(n).copied())
    }

    /// Refreshes every patched parameter of one module by pulling its
    /// source, exactly once per evaluation step of the owner.
    fn refresh_params(&mut self, index: usize) {
        let keys = match self.modules.get(index).and_then(|s| s.as_ref()) {
            Some(m) => m.kind.param_keys(),
            None => return,
        };
        for &key in keys {
            let source = self.modules[index]
                .as_ref()
                .and_then(|m| m.kind.param(key))
                .and_then(|p| p.source());
            if let Some(src) = source {
                let value = self.pull(src.0 as usize);
                if let Some(m) = self.modules[index].as_mut() {
                    if let Some(p) = m.kind.param_mut(key) {
                        p.apply(value);
                    }
                }
            }
        }
    }

    /// Evaluates one module for one tick, recursively pulling upstream.
    fn pull(&mut self, index: usize) -> f32 {
        self.refresh_params(index);

        enum Shape {
            Generator,
            Single,
            Envelope(bool),
            Mixer(usize),
            Splitter,
            Ring(usize),
            Output,
        }
        let shape = match self.modules.get(index).and_then(|s| s.as_ref()) {
            None => return 0.0,
            Some(m) => match &m.kind {
                ModuleKind::Oscillator(_)
                | ModuleKind::AdditiveSynth(_)
                | ModuleKind::TrivialGenerator(_)
                | ModuleKind::BufferSource(_) => Shape::Generator,
                ModuleKind::Adder(_)
                | ModuleKind::Multiplier(_)
                | ModuleKind::Clamper(_)
                | ModuleKind::Function(_)
                | ModuleKind::RecursiveFilter(_)
                | ModuleKind::FirFilter(_)
                | ModuleKind::RcFilter(_) => Shape::Single,
                ModuleKind::Envelope(_) => Shape::Envelope(!m.inputs.is_empty()),
                ModuleKind::Mixer(_) => Shape::Mixer(m.inputs.len()),
                ModuleKind::Splitter(_) => Shape::Splitter,
                ModuleKind::RingModulator(_) => Shape::Ring(m.inputs.len()),
                ModuleKind::Output(_) => Shape::Output,
            },
        };

        match shape {
            Shape::Generator => {
                let Some(Some(m)) = self.modules.get_mut(index) else {
                    return 0.0;
                };
                match &mut m.kind {
                    ModuleKind::Oscillator(g) => g.advance(),
                    ModuleKind::AdditiveSynth(g) => g.advance(),
                    ModuleKind::TrivialGenerator(g) => g.advance(),
                    ModuleKind::BufferSource(g) => g.advance(),
                    _ => 0.0,
                }
            }
            Shape::Single => {
                let input = match self.input_at(index, 0) {
                    Some(id) => self.pull(id.0 as usize),
                    None => 0.0,
                };
                let Some(Some(m)) = self.modules.get_mut(index) else {
                    return 0.0;
                };
                match &mut m.kind {
                    ModuleKind::Adder(p) => p.process(input),
                    ModuleKind::Multiplier(p) => p.process(input),
                    ModuleKind::Clamper(p) => p.process(input),
                    ModuleKind::Function(p) => p.process(input),
                    ModuleKind::RecursiveFilter(p) => p.process(input),
                    ModuleKind::FirFilter(p) => p.process(input),
                    ModuleKind::RcFilter(p) => p.process(input),
                    _ => 0.0,
                }
            }
            Shape::Envelope(has_input) => {
                let input = if has_input {
                    match self.input_at(index, 0) {
                        Some(id) => Some(self.pull(id.0 as usize)),
                        None => None,
                    }
                } else {
                    None
                };
                let Some(Some(m)) = self.modules.get_mut(index) else {
                    return 0.0;
                };
                let ModuleKind::Envelope(env) = &mut m.kind else {
                    return 0.0;
                };
                let level = env.advance();
                match input {
                    Some(x) => x * level,
                    None => level,
                }
            }
            Shape::Mixer(count) => {
                let mut sum = 0.0;
                for i in 0..count {
                    if let Some(id) = self.input_at(index, i) {
                        sum += self.pull(id.0 as usize);
                    }
                }
                sum
            }
            Shape::Splitter => {
                let state = match self.modules.get(index).and_then(|s| s.as_ref()) {
                    Some(m) => match &m.kind {
                        ModuleKind::Splitter(s) => Some((s.needs_pull(), m.outputs.len())),
                        _ => None,
                    },
                    None => None,
                };
                let Some((needs, fanout)) = state else {
                    return 0.0;
                };
                if needs {
                    let sample = match self.input_at(index, 0) {
                        Some(id) => self.pull(id.0 as usize),
                        None => 0.0,
                    };
                    if let Some(Some(m)) = self.modules.get_mut(index) {
                        if let ModuleKind::Splitter(s) = &mut m.kind {
                            s.refill(sample, fanout);
                        }
                    }
                }
                let Some(Some(m)) = self.modules.get_mut(index) else {
                    return 0.0;
                };
                match &mut m.kind {
                    ModuleKind::Splitter(s) => s.draw(),
                    _ => 0.0,
                }
            }
            Shape::Ring(count) => match count {
                0 => 0.0,
                1 => match self.input_at(index, 0) {
                    Some(id) => self.pull(id.0 as usize),
                    None => 0.0,
                },
                _ => {
                    let a = match self.input_at(index, 0) {
                        Some(id) => self.pull(id.0 as usize),
                        None => 0.0,
                    };
                    let b = match self.input_at(index, 1) {
                        Some(id) => self.pull(id.0 as usize),
                        None => 0.0,
                    };
                    a * b
                }
            },
            Shape::Output => {
                let sample = match self.input_at(index, 0) {
                    Some(id) => self.pull(id.0 as usize),
                    None => 0.0,
                };
                if let Some(Some(m)) = self.modules.get_mut(index) {
                    if let ModuleKind::Output(o) = &mut m.kind {
                        o.store(sample);
                    }
                }
                sample
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{Adder, Multiplier, TrivialGenerator};
    use crate::oscillator::Oscillator;
    use crate::routing::{Mixer, Output, Splitter};

    #[test]
    fn connect_rejects_missing_modules() {
        let mut rack = Rack::new();
        let a = rack.add(Oscillator::new(440.0));
        assert_eq!(rack.connect(a, ModuleId(99)), Err(PatchError::ModuleNotFound));
    }

    #[test]
    fn connect_rejects_self_loop() {
        let mut rack = Rack::new();
        let a = rack.add(Adder::new(1.0));
        assert_eq!(rack.connect(a, a), Err(PatchError::CycleDetected));
    }

    #[test]
    fn connect_rejects_two_module_cycle() {
        let mut rack = Rack::new();
        let a = rack.add(Adder::new(1.0));
        let b = rack.add(Adder::new(1.0));
        rack.connect(a, b).unwrap();
        assert_eq!(rack.connect(b, a), Err(PatchError::CycleDetected));
    }

    #[test]
    fn param_edge_participates_in_cycle_check() {
        let mut rack = Rack::new();
        let ramp = rack.add(TrivialGenerator::new(100.0, 0.0));
        let osc = rack.add(Oscillator::new(440.0));
        rack.connect_param(ramp, osc, ParamKey::Frequency).unwrap();
        assert_eq!(
            rack.connect_param(osc, ramp, ParamKey::Value),
            Err(PatchError::CycleDetected)
        );
    }

    #[test]
    fn connect_rejects_sink_as_source() {
        let mut rack = Rack::new();
        let out = rack.add(Output::default());
        let add = rack.add(Adder::new(0.0));
        assert_eq!(rack.connect(out, add), Err(PatchError::NotConnectable));
    }

    #[test]
    fn fan_in_overflow_evicts_oldest() {
        let mut rack = Rack::new();
        let a = rack.add(TrivialGenerator::new(1.0, 0.0));
        let b = rack.add(TrivialGenerator::new(2.0, 0.0));
        let add = rack.add(Adder::new(0.0));
        rack.connect(a, add).unwrap();
        rack.connect(b, add).unwrap();
        assert_eq!(rack.module(add).unwrap().inputs(), &[b]);
        assert!(rack.module(a).unwrap().outputs().is_empty());
    }

    #[test]
    fn fan_out_overflow_evicts_oldest() {
        let mut rack = Rack::new();
        let ramp = rack.add(TrivialGenerator::new(1.0, 0.0));
        let x = rack.add(Adder::new(0.0));
        let y = rack.add(Adder::new(0.0));
        rack.connect(ramp, x).unwrap();
        rack.connect(ramp, y).unwrap();
        assert_eq!(rack.module(ramp).unwrap().outputs(), &[y]);
        assert!(rack.module(x).unwrap().inputs().is_empty());
    }

    #[test]
    fn config_spreads_from_initialized_side() {
        let mut rack = Rack::new();
        let osc = rack.add(Oscillator::new(440.0));
        let out = rack.add(Output::default());
        rack.set_config(out, Config::new(48000.0)).unwrap();
        rack.connect(osc, out).unwrap();
        assert!(rack.config(osc).unwrap().initialized);
        assert_eq!(rack.config(osc).unwrap().sample_rate, 48000.0);
    }

    #[test]
    fn config_spreads_transitively() {
        let mut rack = Rack::new();
        let osc = rack.add(Oscillator::new(440.0));
        let gain = rack.add(Multiplier::new(0.5));
        let out = rack.add(Output::default());
        rack.connect(osc, gain).unwrap();
        rack.set_config(out, Config::new(44100.0)).unwrap();
        rack.connect(gain, out).unwrap();
        assert_eq!(rack.config(osc).unwrap().sample_rate, 44100.0);
    }

    #[test]
    fn mismatched_configs_refuse_to_join() {
        let mut rack = Rack::new();
        let a = rack.add(Oscillator::new(440.0));
        let b = rack.add(Output::default());
        rack.set_config(a, Config::new(48000.0)).unwrap();
        rack.set_config(b, Config::new(44100.0)).unwrap();
        let err = rack.connect(a, b).unwrap_err();
        assert!(matches!(err, PatchError::ConfigMismatch { .. }));
        assert!(rack.module(b).unwrap().inputs().is_empty(), "edge must not form");
    }

    #[test]
    fn next_sample_requires_configuration() {
        let mut rack = Rack::new();
        let out = rack.add(Output::default());
        assert_eq!(rack.next_sample(out), Err(PatchError::NotConfigured));
    }

    #[test]
    fn ensure_configured_walks_upstream() {
        let mut rack = Rack::new();
        let osc = rack.add(Oscillator::new(440.0));
        let out = rack.add(Output::default());
        rack.connect(osc, out).unwrap();
        assert_eq!(rack.ensure_configured(out), Err(PatchError::NotConfigured));
        rack.set_config(out, Config::new(48000.0)).unwrap();
        assert_eq!(rack.ensure_configured(out), Ok(()));
    }

    #[test]
    fn trivial_chain_produces_ramp() {
        let mut rack = Rack::new();
        let ramp = rack.add(TrivialGenerator::new(0.0, 1.0));
        let out = rack.add(Output::default());
        rack.connect(ramp, out).unwrap();
        rack.set_config(out, Config::new(48000.0)).unwrap();
        for expected in 0..4 {
            assert_eq!(rack.next_sample(out).unwrap(), expected as f32);
        }
    }

    #[test]
    fn mixer_sums_inputs() {
        let mut rack = Rack::new();
        let a = rack.add(TrivialGenerator::new(1.0, 0.0));
        let b = rack.add(TrivialGenerator::new(2.0, 0.0));
        let c = rack.add(TrivialGenerator::new(3.0, 0.0));
        let mix = rack.add(Mixer);
        let out = rack.add(Output::default());
        rack.connect(a, mix).unwrap();
        rack.connect(b, mix).unwrap();
        rack.connect(c, mix).unwrap();
        rack.connect(mix, out).unwrap();
        rack.set_config(out, Config::new(48000.0)).unwrap();
        assert_eq!(rack.next_sample(out).unwrap(), 6.0);
    }

    #[test]
    fn splitter_pulls_source_once_per_tick() {
        let mut rack = Rack::new();
        let ramp = rack.add(TrivialGenerator::new(0.0, 1.0));
        let split = rack.add(Splitter::default());
        let mix = rack.add(Mixer);
        let gain_a = rack.add(Multiplier::new(1.0));
        let gain_b = rack.add(Multiplier::new(1.0));
        let out = rack.add(Output::default());
        rack.connect(ramp, split).unwrap();
        rack.connect(split, gain_a).unwrap();
        rack.connect(split, gain_b).unwrap();
        rack.connect(gain_a, mix).unwrap();
        rack.connect(gain_b, mix).unwrap();
        rack.connect(mix, out).unwrap();
        rack.set_config(out, Config::new(48000.0)).unwrap();
        // Both branches see the same ramp value each tick.
        assert_eq!(rack.next_sample(out).unwrap(), 0.0);
        assert_eq!(rack.next_sample(out).unwrap(), 2.0);
        assert_eq!(rack.next_sample(out).unwrap(), 4.0);
    }

    #[test]
    fn oversampled_output_averages_pulls() {
        let mut rack = Rack::new();
        let ramp = rack.add(TrivialGenerator::new(0.0, 1.0));
        let out = rack.add(Output::default());
        rack.connect(ramp, out).unwrap();
        rack.set_config(out, Config::with_oversampling(48000.0, 4)).unwrap();
        // Pulls 0,1,2,3 averaged, then 4,5,6,7 averaged.
        assert_eq!(rack.next_sample(out).unwrap(), 1.5);
        assert_eq!(rack.next_sample(out).unwrap(), 5.5);
    }

    #[test]
    fn remove_detaches_everything() {
        let mut rack = Rack::new();
        let ramp = rack.add(TrivialGenerator::new(1.0, 0.0));
        let osc = rack.add(Oscillator::new(440.0));
        let out = rack.add(Output::default());
        rack.connect_param(ramp, osc, ParamKey::Frequency).unwrap();
        rack.connect(osc, out).unwrap();
        rack.remove(ramp).unwrap();
        assert_eq!(rack.param_value(osc, ParamKey::Frequency), Ok(440.0));
        assert!(
            rack.kind(osc)
                .unwrap()
                .param(ParamKey::Frequency)
                .unwrap()
                .source()
                .is_none()
        );
        assert_eq!(rack.remove(ramp), Err(PatchError::ModuleNotFound));
    }

    #[test]
    fn disconnect_requires_existing_edge() {
        let mut rack = Rack::new();
        let a = rack.add(TrivialGenerator::new(1.0, 0.0));
        let b = rack.add(Adder::new(0.0));
        assert_eq!(rack.disconnect(a, b), Err(PatchError::NotConnected));
        rack.connect(a, b).unwrap();
        rack.disconnect(a, b).unwrap();
        assert!(rack.module(b).unwrap().inputs().is_empty());
    }

    #[test]
    fn patched_param_drives_value() {
        let mut rack = Rack::new();
        let lfo = rack.add(TrivialGenerator::new(100.0, 10.0));
        let gain = rack.add(Multiplier::new(1.0));
        let src = rack.add(TrivialGenerator::new(1.0, 0.0));
        let out = rack.add(Output::default());
        rack.connect_param(lfo, gain, ParamKey::Amount).unwrap();
        rack.connect(src, gain).unwrap();
        rack.connect(gain, out).unwrap();
        rack.set_config(out, Config::new(48000.0)).unwrap();
        assert_eq!(rack.next_sample(out).unwrap(), 100.0);
        assert_eq!(rack.next_sample(out).unwrap(), 110.0);
    }
}
