//! Sound attenuation and active listening
//!
//! Sound loses strength with every cell it crosses: open cells cost
//! `air_cost`, occluding cells `solid_cost`. Beyond `max_raycast_steps`
//! blocks the path is not walked and the average cost is charged instead.

use glam::DVec3;
use rand::Rng;
use serde::Serialize;

use crate::core::config::HearingConfig;
use crate::core::types::block_of;
use crate::world::environment::{occluding_or_solid, Environment};

/// How a single sound reached the agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoundPerception {
    pub distance: f64,
    pub effective_distance: f64,
    pub perceived_intensity: f64,
}

impl SoundPerception {
    pub fn is_audible(&self) -> bool {
        self.perceived_intensity > 0.0
    }
}

/// Occlusion-weighted path length from listener to emitter
pub fn effective_distance(env: &dyn Environment, listener: DVec3, emitter: DVec3, config: &HearingConfig) -> f64 {
    let distance = listener.distance(emitter);
    if distance == 0.0 {
        return 0.0;
    }
    if distance >= config.max_raycast_steps as f64 {
        return distance * (config.air_cost + config.solid_cost) / 2.0;
    }

    let direction = (emitter - listener) / distance;
    let steps = distance.ceil() as u32;
    let mut open = 0u32;
    let mut occluding = 0u32;
    for i in 0..steps {
        let block = block_of(listener + direction * i as f64);
        if occluding_or_solid(env, block) {
            occluding += 1;
        } else {
            open += 1;
        }
    }
    open as f64 * config.air_cost + occluding as f64 * config.solid_cost
}

/// Attenuate a raw sound as heard from `listener`
pub fn perceive(
    env: &dyn Environment,
    listener: DVec3,
    emitter: DVec3,
    raw_intensity: f64,
    listening: bool,
    config: &HearingConfig,
) -> SoundPerception {
    let mut effective = effective_distance(env, listener, emitter, config);
    if listening {
        effective *= config.listening_distance_factor;
    }
    SoundPerception {
        distance: listener.distance(emitter),
        effective_distance: effective,
        perceived_intensity: (raw_intensity - effective).max(0.0),
    }
}

/// Heightened hearing for a short random window after a sound
#[derive(Debug, Clone, Default)]
pub struct ListeningState {
    ticks_left: u32,
}

impl ListeningState {
    pub fn is_active(&self) -> bool {
        self.ticks_left > 0
    }

    pub fn ticks_left(&self) -> u32 {
        self.ticks_left
    }

    /// Roll to start listening; no effect while already listening
    pub fn try_start<R: Rng>(&mut self, config: &HearingConfig, rng: &mut R) -> bool {
        if self.is_active() || rng.gen::<f64>() >= config.listening_chance {
            return false;
        }
        let variation = if config.listening_variation_ticks > 0 {
            rng.gen_range(0..config.listening_variation_ticks)
        } else {
            0
        };
        self.ticks_left = config.listening_base_ticks + variation;
        tracing::info!(ticks = self.ticks_left, "Started actively listening");
        self.ticks_left > 0
    }

    /// Count down one tick; true on the tick listening ends
    pub fn tick(&mut self) -> bool {
        if self.ticks_left == 0 {
            return false;
        }
        self.ticks_left -= 1;
        if self.ticks_left == 0 {
            tracing::info!("Stopped actively listening");
            return true;
        }
        false
    }
}
