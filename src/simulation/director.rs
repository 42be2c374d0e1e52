//! Per-world orchestration
//!
//! The director owns the shared per-subject state (alert levels and scent
//! trails), the spawn gate, and the live agent if there is one. Hosts feed
//! it sound and subject events as they happen and call `on_tick` once per
//! simulation tick. Within a tick, call `on_tick` before delivering that
//! tick's events so alert decay lands ahead of any increase.
//!
//! Cadence:
//! - every tick: scent deposits, agent tick
//! - every `decay_interval`: alert decay, then a spawn attempt per subject
//! - every `ambience_interval`: background ambience roll per subject
//! - every `scent_cleanup_interval`: stale scent removal

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::alert::{alert_driven_cue, ambient_cue, AlertLevels, AlertRise, CuePlay};
use crate::behavior::{GoalKind, Pursuit};
use crate::core::config::DwellerConfig;
use crate::core::error::Result;
use crate::core::types::{AgentHandle, BlockPos, SubjectId, Tick};
use crate::entity::{Dweller, HeardSound};
use crate::perception::PerceptionFocus;
use crate::scent::ScentStore;
use crate::simulation::events::SubjectEvent;
use crate::spawn::{SpawnGate, SpawnOutcome};
use crate::world::environment::Environment;

/// Builds a fresh pursuit for every spawned agent
pub type PursuitFactory = Box<dyn FnMut() -> Box<dyn Pursuit>>;

pub struct Director {
    config: DwellerConfig,
    alerts: AlertLevels,
    scents: ScentStore,
    gate: SpawnGate,
    dweller: Option<Dweller>,
    pursuit_factory: Option<PursuitFactory>,
    rng: ChaCha8Rng,
    pending_cues: Vec<CuePlay>,
}

impl Director {
    pub fn new(config: DwellerConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let gate = SpawnGate::new(config.clone(), rng.gen());
        Ok(Self {
            alerts: AlertLevels::new(config.alert.clone()),
            scents: ScentStore::new(config.scent.clone()),
            gate,
            dweller: None,
            pursuit_factory: None,
            rng,
            pending_cues: Vec::new(),
            config,
        })
    }

    pub fn with_pursuit(mut self, factory: PursuitFactory) -> Self {
        self.pursuit_factory = Some(factory);
        self
    }

    pub fn config(&self) -> &DwellerConfig {
        &self.config
    }

    pub fn alerts(&self) -> &AlertLevels {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut AlertLevels {
        &mut self.alerts
    }

    pub fn scents(&self) -> &ScentStore {
        &self.scents
    }

    pub fn alert_level(&self, subject: SubjectId) -> f64 {
        self.alerts.level(subject)
    }

    pub fn dweller(&self) -> Option<&Dweller> {
        self.dweller.as_ref()
    }

    pub fn dweller_mut(&mut self) -> Option<&mut Dweller> {
        self.dweller.as_mut()
    }

    pub fn agent_handle(&self) -> Option<AgentHandle> {
        self.dweller.as_ref().map(Dweller::handle)
    }

    /// Current focus; an absent agent reads as no focus
    pub fn focus(&self) -> PerceptionFocus {
        self.dweller
            .as_ref()
            .map(|d| d.focus().clone())
            .unwrap_or_default()
    }

    pub fn active_goal(&self) -> Option<GoalKind> {
        self.dweller.as_ref().and_then(Dweller::active_goal)
    }

    /// Cues decided since the last drain, oldest first
    pub fn drain_cues(&mut self) -> Vec<CuePlay> {
        std::mem::take(&mut self.pending_cues)
    }

    /// A sound made by `subject` at `location`
    pub fn on_sound_event(
        &mut self,
        env: &dyn Environment,
        subject: SubjectId,
        location: DVec3,
        raw_intensity: f64,
    ) -> Option<HeardSound> {
        let Some(subject) = env.subject(subject) else {
            tracing::debug!(%subject, "Sound from unknown subject ignored");
            return None;
        };
        if !subject.is_perceivable() {
            return None;
        }
        if !self.agent_alive(env) {
            return None;
        }
        let dweller = self.dweller.as_mut()?;
        let heard = dweller.on_sound_event(env, &mut self.alerts, &subject, location, raw_intensity)?;
        if let Some(rise) = heard.rise {
            self.answer_rise(&rise, subject.eye_position);
        }
        Some(heard)
    }

    /// A noisy action: the alert rises directly and the agent may hear it
    pub fn on_subject_event(&mut self, env: &dyn Environment, subject: SubjectId, event: SubjectEvent) -> Option<HeardSound> {
        let Some(snapshot) = env.subject(subject) else {
            tracing::debug!(%subject, ?event, "Event from unknown subject ignored");
            return None;
        };
        if !snapshot.is_perceivable() {
            return None;
        }

        let alert = event.alert_intensity(&self.config.events);
        if alert > 0.0 {
            if let Some(rise) = self.alerts.increase(&snapshot, alert) {
                self.answer_rise(&rise, snapshot.eye_position);
            }
        }

        let sound = event.sound_intensity(&self.config.events);
        if sound > 0.0 {
            self.on_sound_event(env, subject, event.location(&snapshot), sound)
        } else {
            None
        }
    }

    /// Drop everything held for a departed subject
    pub fn forget_subject(&mut self, subject: SubjectId) {
        tracing::info!(%subject, "Subject forgotten");
        self.alerts.forget(subject);
        self.scents.forget(subject);
        if let Some(dweller) = self.dweller.as_mut() {
            dweller.perception_mut().smell.forget_subject(subject);
        }
    }

    /// Spawn outcomes of this tick's attempts, if any were due
    ///
    /// Runs ahead of the tick's sound and subject events.
    pub fn on_tick(&mut self, env: &mut dyn Environment) -> Vec<SpawnOutcome> {
        let now = env.current_tick();
        let subjects = env.subjects();
        let timing = self.config.timing.clone();

        for subject in &subjects {
            self.scents.track_movement(subject, now);
        }

        let mut outcomes = Vec::new();
        if is_due(now, timing.decay_interval) {
            for subject in subjects.iter().filter(|s| s.id.is_valid()) {
                self.alerts.decay(subject);
            }
            for subject in subjects.iter().filter(|s| s.is_perceivable()) {
                let outcome = self.gate.try_admit(env, &self.alerts, subject);
                if let SpawnOutcome::Spawned {
                    handle, initial_target, ..
                } = outcome
                {
                    self.adopt_agent(handle, initial_target);
                }
                outcomes.push(outcome);
            }
        }

        if is_due(now, timing.ambience_interval) {
            for subject in subjects.iter().filter(|s| s.is_perceivable()) {
                let level = self.alerts.level(subject.id);
                if let Some(cue) = ambient_cue(level, subject.eye_position, &self.config, &mut self.rng) {
                    self.pending_cues.push(cue);
                }
            }
        }

        if is_due(now, timing.scent_cleanup_interval) {
            self.scents.cleanup(now);
        }

        if !self.agent_alive(&*env) {
            return outcomes;
        }
        if let Some(dweller) = self.dweller.as_mut() {
            if let Some(cue) = dweller.on_tick(env, &self.scents) {
                self.pending_cues.push(cue);
            }
        }
        outcomes
    }

    /// Remove the agent and stop its goals, as a host despawn would
    pub fn despawn(&mut self, env: &mut dyn Environment) {
        if let Some(mut dweller) = self.dweller.take() {
            dweller.shutdown(env, &self.scents);
            self.gate.release(dweller.handle());
            tracing::info!(handle = ?dweller.handle(), "Agent despawned");
        }
    }

    fn adopt_agent(&mut self, handle: AgentHandle, initial_target: Option<BlockPos>) {
        let seed = self.rng.gen();
        let mut dweller = Dweller::new(handle, self.config.clone(), seed).with_initial_target(initial_target);
        if let Some(factory) = self.pursuit_factory.as_mut() {
            dweller = dweller.with_pursuit(factory());
        }
        self.dweller = Some(dweller);
    }

    /// Drops a dead agent; true while one is alive
    fn agent_alive(&mut self, env: &dyn Environment) -> bool {
        let alive = self.gate.is_spawned(env)
            && self
                .dweller
                .as_ref()
                .is_some_and(|d| env.is_alive(d.handle()));
        if !alive && self.dweller.take().is_some() {
            tracing::info!("Agent gone; dropping its state");
        }
        alive
    }

    fn answer_rise(&mut self, rise: &AlertRise, listener: DVec3) {
        if let Some(cue) = alert_driven_cue(rise, listener, &self.config, &mut self.rng) {
            self.pending_cues.push(cue);
        }
    }
}

fn is_due(now: Tick, interval: Tick) -> bool {
    interval > 0 && now % interval == 0
}
