//! The hunting agent: senses, focus and goal stack bound to one body
//!
//! Per-tick order: listening countdown, sight, chase memory, smell,
//! focus arrival, goal re-evaluation, presence cue.

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::alert::{AlertLevels, AlertRise, CuePlay, PresenceTimer};
use crate::behavior::{default_goals, Behavior, GoalContext, GoalKind, GoalSelector, Pursuit, PRIORITY_PURSUIT};
use crate::core::config::DwellerConfig;
use crate::core::types::{AgentBody, AgentHandle, BlockPos, Subject, Tick};
use crate::perception::{hearing, sight, PerceptionContext, PerceptionFocus, SoundPerception};
use crate::scent::ScentStore;
use crate::world::environment::Environment;

/// Outcome of a sound the agent could hear
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeardSound {
    pub perception: SoundPerception,
    pub focus_adopted: bool,
    pub rise: Option<AlertRise>,
}

#[derive(Debug)]
pub struct Dweller {
    handle: AgentHandle,
    perception: PerceptionContext,
    goals: GoalSelector,
    presence: PresenceTimer,
    rng: ChaCha8Rng,
    config: DwellerConfig,
}

impl Dweller {
    pub fn new(handle: AgentHandle, config: DwellerConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let presence = PresenceTimer::seeded(&config, &mut rng);
        Self {
            handle,
            perception: PerceptionContext::new(),
            goals: default_goals(),
            presence,
            rng,
            config,
        }
    }

    pub fn with_initial_target(mut self, target: Option<BlockPos>) -> Self {
        self.perception.initial_target = target;
        self
    }

    /// Register a host chase behavior in the top slot
    pub fn with_pursuit(mut self, pursuit: Box<dyn Pursuit>) -> Self {
        tracing::debug!(pursuit = pursuit.name(), "Pursuit registered");
        self.goals.add(PRIORITY_PURSUIT, Behavior::Pursuit(pursuit));
        self
    }

    pub fn handle(&self) -> AgentHandle {
        self.handle
    }

    pub fn focus(&self) -> &PerceptionFocus {
        &self.perception.focus
    }

    pub fn perception(&self) -> &PerceptionContext {
        &self.perception
    }

    pub fn perception_mut(&mut self) -> &mut PerceptionContext {
        &mut self.perception
    }

    pub fn active_goal(&self) -> Option<GoalKind> {
        self.goals.active_goal()
    }

    pub fn running_goals(&self) -> Vec<GoalKind> {
        self.goals.running_goals()
    }

    /// A sound made by `subject` at `location`
    ///
    /// Inaudible sounds change nothing. Audible ones raise the subject's
    /// alert, may start active listening, and are offered to the focus.
    pub fn on_sound_event(
        &mut self,
        env: &dyn Environment,
        alerts: &mut AlertLevels,
        subject: &Subject,
        location: DVec3,
        raw_intensity: f64,
    ) -> Option<HeardSound> {
        let body = env.agent_body(self.handle)?;
        let config = &self.config.hearing;
        let perception = hearing::perceive(
            env,
            body.eye_position,
            location,
            raw_intensity,
            self.perception.listening.is_active(),
            config,
        );
        if !perception.is_audible() {
            tracing::trace!(raw_intensity, effective = perception.effective_distance, "Sound inaudible");
            return None;
        }

        let rise = alerts.increase(subject, perception.perceived_intensity * config.alert_share);
        self.perception.listening.try_start(config, &mut self.rng);
        let focus_adopted = self.perception.focus.propose_sound(
            location,
            perception.perceived_intensity,
            config.high_threshold,
            env.current_tick(),
        );
        tracing::debug!(
            subject = %subject.id,
            pi = perception.perceived_intensity,
            focus_adopted,
            "Heard sound"
        );
        Some(HeardSound {
            perception,
            focus_adopted,
            rise,
        })
    }

    /// Advance one tick; returns a presence cue when one is due
    pub fn on_tick(&mut self, env: &mut dyn Environment, scents: &ScentStore) -> Option<CuePlay> {
        let body = env.agent_body(self.handle)?;
        let now = env.current_tick();

        self.perception.listening.tick();
        self.update_sight(&*env, &body, now);
        self.perception
            .focus
            .expire_chase(now, self.config.investigation.chase_memory_ticks);

        let engaged = self.perception.is_engaged();
        self.perception
            .smell
            .update(&*env, &body, scents, engaged, now, &self.config);

        if !self.goals.is_running(GoalKind::InvestigateSound) {
            let arrival = self.config.investigation.arrival_radius;
            self.perception
                .settle_focus_arrival(body.position, arrival * arrival + 4.0);
        }

        let mut ctx = GoalContext {
            handle: self.handle,
            body,
            now,
            perception: &mut self.perception,
            env,
            scents,
            rng: &mut self.rng,
            config: &self.config,
        };
        self.goals.tick(&mut ctx);

        let active = ctx.perception.focus.chase_engaged
            || ctx.perception.smell.target().is_some()
            || !ctx.navigation_idle();
        self.presence
            .tick(active, body.position, &self.config, &mut self.rng)
    }

    /// Stop every goal so no navigation request outlives the agent
    pub fn shutdown(&mut self, env: &mut dyn Environment, scents: &ScentStore) {
        let Some(body) = env.agent_body(self.handle) else {
            return;
        };
        let mut ctx = GoalContext {
            handle: self.handle,
            body,
            now: env.current_tick(),
            perception: &mut self.perception,
            env,
            scents,
            rng: &mut self.rng,
            config: &self.config,
        };
        self.goals.stop_all(&mut ctx);
    }

    fn update_sight(&mut self, env: &dyn Environment, body: &AgentBody, now: Tick) {
        let report = sight::evaluate(env, body, &self.perception.focus, &self.config.sight);
        let had_sight = self.perception.has_sight;

        match report.sighted_position() {
            Some(position) => {
                let intensity = self.config.hearing.high_threshold + self.config.sight.sight_intensity_bonus;
                self.perception.focus.force_sight(position, intensity, now);
                self.perception.has_sight = true;
                self.perception.sighted_subject = report.subject;
                if !had_sight {
                    tracing::info!(
                        subject = ?report.subject,
                        distance = report.distance,
                        short = report.short_range,
                        sound = report.medium_with_sound,
                        motion = report.medium_with_motion,
                        "Gained sight"
                    );
                }
            }
            None => {
                if had_sight {
                    tracing::info!(subject = ?self.perception.sighted_subject, "Lost sight");
                }
                self.perception.has_sight = false;
                self.perception.sighted_subject = None;
            }
        }
    }
}
