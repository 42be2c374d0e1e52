//! Ambient feedback decisions
//!
//! The core only decides which cue to play, where, and how loud; the host
//! plays it. All rolls draw from the caller's RNG.

use glam::DVec3;
use rand::Rng;
use serde::Serialize;

use crate::alert::levels::AlertRise;
use crate::core::config::DwellerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmbientCue {
    CaveWhistle,
    CaveWhoop,
    FallingPebbles,
    DistantClicking,
    DistantShriek,
    HeavyFootsteps,
    PresenceClick,
}

const BACKGROUND_CUES: [AmbientCue; 4] = [
    AmbientCue::CaveWhistle,
    AmbientCue::CaveWhoop,
    AmbientCue::FallingPebbles,
    AmbientCue::DistantClicking,
];

/// A cue the host should play
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CuePlay {
    pub cue: AmbientCue,
    pub origin: DVec3,
    pub volume: f32,
    pub pitch: f32,
}

/// Background cave ambience for a subject at `level`
pub fn ambient_cue<R: Rng>(
    level: f64,
    listener: DVec3,
    config: &DwellerConfig,
    rng: &mut R,
) -> Option<CuePlay> {
    let alert = &config.alert;
    let ambience = &config.ambience;

    // High alert hands the soundscape over to the rise-driven cues
    if level > alert.phase_threshold * 0.7 && rng.gen::<f64>() < ambience.high_alert_suppression {
        return None;
    }

    let mut chance =
        ambience.ambient_base_chance + level / alert.max_level * ambience.ambient_alert_factor;
    if level < ambience.quiet_level {
        chance *= 0.5;
    }
    if rng.gen::<f64>() >= chance {
        return None;
    }

    let cue = BACKGROUND_CUES[rng.gen_range(0..BACKGROUND_CUES.len())];
    Some(CuePlay {
        cue,
        origin: listener,
        volume: rng.gen_range(0.5..0.8),
        pitch: rng.gen_range(0.8..1.2),
    })
}

/// Louder cue answering an alert rise, placed somewhere off to the side
pub fn alert_driven_cue<R: Rng>(
    rise: &AlertRise,
    listener: DVec3,
    config: &DwellerConfig,
    rng: &mut R,
) -> Option<CuePlay> {
    let alert = &config.alert;
    let ambience = &config.ambience;

    if rise.amount() < ambience.rise_min_increase && rise.new < alert.phase_threshold * 0.5 {
        return None;
    }

    let chance = ambience.rise_base_chance + rise.new / alert.max_level * ambience.rise_alert_factor;
    if rng.gen::<f64>() >= chance {
        return None;
    }

    let cue = if rise.new > alert.phase_threshold * 0.6 && rng.gen_bool(0.5) {
        AmbientCue::DistantShriek
    } else {
        AmbientCue::HeavyFootsteps
    };

    let dx = signed_offset(rng);
    let dz = signed_offset(rng);
    let dy = rng.gen_range(-2.0..=2.0);

    let volume = (0.7 + rise.new / alert.max_level * 0.8).min(1.5) as f32;
    Some(CuePlay {
        cue,
        origin: listener + DVec3::new(dx, dy, dz),
        volume,
        pitch: rng.gen_range(0.7..1.0),
    })
}

/// 8 to 19 blocks to either side
fn signed_offset<R: Rng>(rng: &mut R) -> f64 {
    let magnitude = rng.gen_range(8.0..19.0);
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

/// Clicking heard near the agent while it is busy hunting
#[derive(Debug, Clone, Default)]
pub struct PresenceTimer {
    countdown: u32,
}

impl PresenceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// First click lands somewhere in the first half of the longest interval
    pub fn seeded<R: Rng>(config: &DwellerConfig, rng: &mut R) -> Self {
        let half = config.ambience.presence_interval_max / 2;
        let countdown = if half == 0 { 0 } else { rng.gen_range(0..half) };
        Self { countdown }
    }

    /// Ticks left before the next click
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Count one tick; yields a cue at the agent's position when due
    pub fn tick<R: Rng>(
        &mut self,
        active: bool,
        agent_position: DVec3,
        config: &DwellerConfig,
        rng: &mut R,
    ) -> Option<CuePlay> {
        if !active {
            return None;
        }
        if self.countdown > 0 {
            self.countdown -= 1;
            return None;
        }

        let ambience = &config.ambience;
        self.countdown =
            rng.gen_range(ambience.presence_interval_min..=ambience.presence_interval_max);
        Some(CuePlay {
            cue: AmbientCue::PresenceClick,
            origin: agent_position,
            volume: 0.7,
            pitch: 1.0,
        })
    }
}
