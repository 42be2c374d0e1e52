//! Single-instance spawn gate
//!
//! One live agent at a time. A subject whose alert has reached the phase
//! threshold earns a spawn attempt per cooldown window; the attempt rolls
//! a fixed chance and then searches for a hidden standing spot.
//!
//! Every rejection is an ordinary outcome, reported as a `SpawnOutcome`.

use glam::{DVec3, IVec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::alert::AlertLevels;
use crate::core::config::DwellerConfig;
use crate::core::types::{block_center, AgentHandle, BlockPos, Subject, Tick};
use crate::spawn::target::select_initial_target;
use crate::world::environment::{clear_path_or_blocked, Environment};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SpawnOutcome {
    BelowPhaseThreshold,
    AlreadyActive,
    CoolingDown,
    ChanceFailed,
    NoLocation,
    Spawned {
        handle: AgentHandle,
        position: BlockPos,
        initial_target: Option<BlockPos>,
    },
}

impl SpawnOutcome {
    pub fn is_spawned(&self) -> bool {
        matches!(self, SpawnOutcome::Spawned { .. })
    }
}

#[derive(Debug)]
pub struct SpawnGate {
    /// Advisory; liveness is re-checked against the environment on every read
    active: Option<AgentHandle>,
    last_attempt_tick: Option<Tick>,
    rng: ChaCha8Rng,
    config: DwellerConfig,
}

impl SpawnGate {
    pub fn new(config: DwellerConfig, seed: u64) -> Self {
        Self {
            active: None,
            last_attempt_tick: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn last_attempt_tick(&self) -> Option<Tick> {
        self.last_attempt_tick
    }

    /// Live agent handle; a dead one is forgotten
    pub fn active_handle(&mut self, env: &dyn Environment) -> Option<AgentHandle> {
        match self.active {
            Some(handle) if env.is_alive(handle) => Some(handle),
            Some(handle) => {
                tracing::info!(?handle, "Agent untracked");
                self.active = None;
                None
            }
            None => None,
        }
    }

    pub fn is_spawned(&mut self, env: &dyn Environment) -> bool {
        self.active_handle(env).is_some()
    }

    /// Host-driven removal of the tracked agent
    pub fn release(&mut self, handle: AgentHandle) {
        if self.active == Some(handle) {
            tracing::info!(?handle, "Agent released");
            self.active = None;
        }
    }

    pub fn try_admit(
        &mut self,
        env: &mut dyn Environment,
        alerts: &AlertLevels,
        subject: &Subject,
    ) -> SpawnOutcome {
        if !alerts.has_reached_phase_threshold(subject.id) {
            return SpawnOutcome::BelowPhaseThreshold;
        }
        if self.is_spawned(&*env) {
            return SpawnOutcome::AlreadyActive;
        }

        let now = env.current_tick();
        if let Some(last) = self.last_attempt_tick {
            if now.saturating_sub(last) < self.config.spawn.attempt_interval {
                return SpawnOutcome::CoolingDown;
            }
        }
        // Failed rolls and searches still consume the window
        self.last_attempt_tick = Some(now);

        if self.rng.gen::<f64>() >= self.config.spawn.chance {
            tracing::info!(subject = %subject.id, "Spawn chance failed this cycle");
            return SpawnOutcome::ChanceFailed;
        }
        tracing::info!(subject = %subject.id, alert = alerts.level(subject.id), "Attempting spawn");

        let Some(position) = self.find_location(&*env, subject) else {
            tracing::info!(subject = %subject.id, "No hidden spawn location this cycle");
            return SpawnOutcome::NoLocation;
        };

        let yaw = self.rng.gen::<f64>() * std::f64::consts::TAU;
        let facing = DVec3::new(yaw.cos(), 0.0, yaw.sin());
        let handle = env.spawn_agent_at(position, facing);
        self.active = Some(handle);

        let initial_target = select_initial_target(&*env, subject, &self.config.initial_target, &mut self.rng);
        tracing::info!(?handle, ?position, ?initial_target, subject = %subject.id, "Agent spawned");
        SpawnOutcome::Spawned {
            handle,
            position,
            initial_target,
        }
    }

    /// First candidate in the annulus that is open and hidden from the subject
    fn find_location(&mut self, env: &dyn Environment, subject: &Subject) -> Option<BlockPos> {
        let spawn = &self.config.spawn;
        let origin = subject.block();
        let y_base = origin.y.min(spawn.world_bottom_y + spawn.height_range + 5);

        for attempt in 0..spawn.max_candidates {
            let angle = self.rng.gen::<f64>() * std::f64::consts::TAU;
            let distance = spawn.min_distance + self.rng.gen::<f64>() * (spawn.max_distance - spawn.min_distance);
            let y_offset = if spawn.height_range > 0 {
                self.rng.gen_range(0..spawn.height_range * 2) - spawn.height_range
            } else {
                0
            };
            let y = (y_base + y_offset)
                .min(spawn.world_top_y - 2)
                .max(spawn.world_bottom_y + 1);
            let candidate = IVec3::new(
                origin.x + (angle.cos() * distance) as i32,
                y,
                origin.z + (angle.sin() * distance) as i32,
            );

            if !env.footprint_open_at(candidate) {
                continue;
            }
            if clear_path_or_blocked(env, subject.eye_position, block_center(candidate)) {
                tracing::trace!(?candidate, "Spawn candidate in plain sight");
                continue;
            }
            tracing::debug!(?candidate, attempt = attempt + 1, "Spawn location found");
            return Some(candidate);
        }
        None
    }
}
