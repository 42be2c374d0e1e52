//! Dweller configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section deserializes with
//! `#[serde(default)]`, so a TOML file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DwellerError, Result};

/// Per-subject alert (threat) level tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Upper clamp of every alert level
    pub max_level: f64,
    /// Level at which the agent may be admitted into the world
    ///
    /// Also the reference point for ambience thresholds.
    pub phase_threshold: f64,
    /// Subjects below this Y are "deep": louder to the cave, slower to calm down
    pub depth_threshold_y: f64,
    /// Increase multiplier while deep
    pub depth_increase_factor: f64,
    /// Increase multiplier while sneaking
    pub stealth_factor: f64,
    /// Amount removed per decay call
    ///
    /// The director calls decay once per second, so at 0.1 a maxed-out
    /// subject calms fully in about 17 minutes.
    pub base_decay: f64,
    /// Decay multiplier while deep
    pub depth_decay_factor: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_level: 100.0,
            phase_threshold: 75.0,
            depth_threshold_y: 40.0,
            depth_increase_factor: 1.5,
            stealth_factor: 0.5,
            base_decay: 0.1,
            depth_decay_factor: 0.75,
        }
    }
}

/// Ambient feedback rolls driven by the alert level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbienceConfig {
    /// Base chance of an ambient cue per roll
    pub ambient_base_chance: f64,
    /// Extra chance at full alert
    pub ambient_alert_factor: f64,
    /// Below this level the ambient chance is halved
    pub quiet_level: f64,
    /// Chance an ambient roll is skipped outright at high alert
    pub high_alert_suppression: f64,
    /// Base chance of an alert-driven cue on each rise
    pub rise_base_chance: f64,
    /// Extra alert-driven chance at full alert
    pub rise_alert_factor: f64,
    /// Rises smaller than this are ignored while far from the phase threshold
    pub rise_min_increase: f64,
    /// Presence cue interval while the agent is active
    pub presence_interval_min: u32,
    pub presence_interval_max: u32,
}

impl Default for AmbienceConfig {
    fn default() -> Self {
        Self {
            ambient_base_chance: 0.005,
            ambient_alert_factor: 0.025,
            quiet_level: 20.0,
            high_alert_suppression: 0.75,
            rise_base_chance: 0.15,
            rise_alert_factor: 0.25,
            rise_min_increase: 3.0,
            presence_interval_min: 80,
            presence_interval_max: 160,
        }
    }
}

/// Sound attenuation and the listening state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HearingConfig {
    /// Effective-distance cost of an open cell on the sound path
    pub air_cost: f64,
    /// Effective-distance cost of an occluding cell on the sound path
    pub solid_cost: f64,
    /// Beyond this distance the path is not sampled; the averaged cost is used
    pub max_raycast_steps: u32,
    /// Chance that a perceived sound starts active listening
    pub listening_chance: f64,
    /// Listening lasts base + rand(0..variation) ticks
    pub listening_base_ticks: u32,
    pub listening_variation_ticks: u32,
    /// Effective distance multiplier while listening (< 1 hears further)
    pub listening_distance_factor: f64,
    /// Perceived intensity above which chase engages
    pub high_threshold: f64,
    /// Share of perceived intensity fed into the emitter's alert level
    pub alert_share: f64,
}

impl Default for HearingConfig {
    fn default() -> Self {
        Self {
            air_cost: 0.5,
            solid_cost: 1.0,
            max_raycast_steps: 64,
            listening_chance: 0.3,
            listening_base_ticks: 200,
            listening_variation_ticks: 120,
            listening_distance_factor: 0.5,
            high_threshold: 10.0,
            alert_share: 0.5,
        }
    }
}

/// Range tiers for direct sight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    /// Clear sight inside this radius always counts
    pub short_radius: f64,
    /// Medium tier radius (needs a corroborating sound or motion)
    pub medium_radius: f64,
    /// Medium radius multiplier against sprinting subjects
    pub sprint_multiplier: f64,
    /// Extra margin on the subject search radius
    pub search_margin: f64,
    /// Focus intensity needed for the medium+sound tier
    pub sound_pi_threshold: f64,
    /// Fraction of the medium radius the focus must lie within, around the subject
    pub sound_corroboration_fraction: f64,
    /// Squared speed (blocks/tick) that counts as moving
    pub motion_threshold_sq: f64,
    /// Synthetic focus intensity on sight is high_threshold + this bonus
    pub sight_intensity_bonus: f64,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            short_radius: 5.0,
            medium_radius: 15.0,
            sprint_multiplier: 1.5,
            search_margin: 5.0,
            sound_pi_threshold: 5.0,
            sound_corroboration_fraction: 0.75,
            motion_threshold_sq: 0.0009,
            sight_intensity_bonus: 5.0,
        }
    }
}

impl SightConfig {
    /// Radius of the nearest-subject search
    pub fn search_radius(&self) -> f64 {
        self.medium_radius * self.sprint_multiplier + self.search_margin
    }
}

/// Scent trail sampling by the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmellConfig {
    /// Subjects within this radius can be locked for smelling
    ///
    /// A locked subject is kept while within twice this radius.
    pub detection_radius: f64,
    /// Effective sample intensity needed to follow it
    pub pi_threshold: f64,
    /// Only every Nth trail entry is considered
    pub sample_stride: usize,
}

impl Default for SmellConfig {
    fn default() -> Self {
        Self {
            detection_radius: 40.0,
            pi_threshold: 3.0,
            sample_stride: 6,
        }
    }
}

/// Scent trail storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScentConfig {
    /// Samples kept per subject; oldest are evicted first
    pub max_trail_length: usize,
    /// Intensity of a freshly deposited sample
    pub initial_intensity: f64,
    /// Intensity lost per elapsed second
    pub decay_per_second: f64,
    /// Deposit multiplier for wet subjects
    pub wet_multiplier: f64,
    /// Nominal sample life; cleanup drops samples twice this old
    pub lifespan_ticks: u64,
}

impl Default for ScentConfig {
    fn default() -> Self {
        Self {
            max_trail_length: 100,
            initial_intensity: 10.0,
            decay_per_second: 0.1,
            wet_multiplier: 0.1,
            lifespan_ticks: 20 * 60 * 5,
        }
    }
}

/// Sound investigation goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationConfig {
    pub speed: f64,
    /// Search sphere radius before intensity shrinks it
    pub max_search_radius: f64,
    pub min_search_radius: f64,
    /// Radius lost per point of perceived intensity
    pub radius_reduction_per_pi: f64,
    pub arrival_radius: f64,
    /// Ticks spent searching on arrival before the focus is dropped
    pub search_duration_ticks: u32,
    /// Chase-engaged focus not refreshed for this long is forgotten
    pub chase_memory_ticks: u64,
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            max_search_radius: 15.0,
            min_search_radius: 3.0,
            radius_reduction_per_pi: 0.5,
            arrival_radius: 3.0,
            search_duration_ticks: 5 * 20,
            chase_memory_ticks: 30 * 20,
        }
    }
}

/// One-shot walk to the spawn-time target point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeekConfig {
    pub speed: f64,
    pub arrival_radius: f64,
}

impl Default for SeekConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            arrival_radius: 2.0,
        }
    }
}

/// Scent following goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Slightly slower than investigating sounds
    pub speed: f64,
    pub arrival_radius: f64,
    /// Chance per arrival that the trail is lost
    pub lose_trail_chance: f64,
    /// Samples followed in one episode before re-evaluating
    pub max_nodes_per_episode: u32,
    /// Fraction of the trail length searched for the next sample
    pub next_node_window_fraction: f64,
    /// Next sample must be within this Manhattan distance of the current one
    pub next_node_max_manhattan: i32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            speed: 0.8,
            arrival_radius: 2.0,
            lose_trail_chance: 0.1,
            max_nodes_per_episode: 5,
            next_node_window_fraction: 0.1,
            next_node_max_manhattan: 15,
        }
    }
}

/// Idle look goals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Look-at-subject range
    pub look_range: f64,
    /// Chance per tick each idle goal starts
    pub look_chance: f64,
    pub look_at_base_ticks: u32,
    pub look_around_base_ticks: u32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            look_range: 16.0,
            look_chance: 0.02,
            look_at_base_ticks: 40,
            look_around_base_ticks: 20,
        }
    }
}

/// Population gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Ticks between attempts; failed attempts consume the window too
    pub attempt_interval: u64,
    /// Chance an attempt proceeds to the location search
    pub chance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Vertical spread around the biased base height
    pub height_range: i32,
    /// Candidates tried per attempt
    pub max_candidates: u32,
    /// Lowest buildable Y of the world
    pub world_bottom_y: i32,
    /// Highest buildable Y of the world
    pub world_top_y: i32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            attempt_interval: 2400,
            chance: 0.15,
            min_distance: 40.0,
            max_distance: 70.0,
            height_range: 10,
            max_candidates: 10,
            world_bottom_y: -64,
            world_top_y: 320,
        }
    }
}

/// Spawn-time target point relative to the subject
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialTargetConfig {
    pub min_radius: f64,
    pub max_radius: f64,
    pub attempts: u32,
}

impl Default for InitialTargetConfig {
    fn default() -> Self {
        Self {
            min_radius: 20.0,
            max_radius: 30.0,
            attempts: 10,
        }
    }
}

/// Raw alert and sound amounts of noisy subject actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub block_break_alert: f64,
    pub block_break_sound: f64,
    pub jump_alert: f64,
    pub jump_sound: f64,
    /// Landing amounts scale with the blocks fallen
    pub fall_alert_per_block: f64,
    pub fall_sound_per_block: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            block_break_alert: 5.0,
            block_break_sound: 3.0,
            jump_alert: 0.5,
            jump_sound: 0.2,
            fall_alert_per_block: 0.5,
            fall_sound_per_block: 0.25,
        }
    }
}

/// Driver cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub ticks_per_second: u64,
    /// Alert decay and spawn attempts run on this cadence
    pub decay_interval: u64,
    /// Ambient cue rolls run on this cadence
    pub ambience_interval: u64,
    /// Old scent is swept on this cadence
    pub scent_cleanup_interval: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
            decay_interval: 20,
            ambience_interval: 10,
            scent_cleanup_interval: 20 * 60,
        }
    }
}

/// Complete configuration of the dweller core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DwellerConfig {
    pub alert: AlertConfig,
    pub ambience: AmbienceConfig,
    pub hearing: HearingConfig,
    pub sight: SightConfig,
    pub smell: SmellConfig,
    pub scent: ScentConfig,
    pub investigation: InvestigationConfig,
    pub seek: SeekConfig,
    pub tracking: TrackingConfig,
    pub idle: IdleConfig,
    pub spawn: SpawnConfig,
    pub initial_target: InitialTargetConfig,
    pub events: EventConfig,
    pub timing: TimingConfig,
}

impl DwellerConfig {
    /// Parse from TOML text and validate
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DwellerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the systems cannot run with
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, message: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(DwellerError::InvalidConfig(message.to_string()))
            }
        }

        check(self.alert.max_level > 0.0, "alert.max_level must be positive")?;
        check(
            self.alert.phase_threshold <= self.alert.max_level,
            "alert.phase_threshold must not exceed alert.max_level",
        )?;
        check(self.alert.base_decay >= 0.0, "alert.base_decay must not be negative")?;
        check(self.smell.sample_stride > 0, "smell.sample_stride must be at least 1")?;
        check(self.scent.max_trail_length > 0, "scent.max_trail_length must be at least 1")?;
        check(self.timing.ticks_per_second > 0, "timing.ticks_per_second must be at least 1")?;
        check(self.timing.decay_interval > 0, "timing.decay_interval must be at least 1")?;
        check(self.timing.ambience_interval > 0, "timing.ambience_interval must be at least 1")?;
        check(
            self.timing.scent_cleanup_interval > 0,
            "timing.scent_cleanup_interval must be at least 1",
        )?;
        check(
            self.spawn.min_distance <= self.spawn.max_distance,
            "spawn.min_distance must not exceed spawn.max_distance",
        )?;
        check(self.spawn.height_range > 0, "spawn.height_range must be positive")?;
        check(
            self.initial_target.min_radius <= self.initial_target.max_radius,
            "initial_target.min_radius must not exceed initial_target.max_radius",
        )?;
        check(
            self.investigation.min_search_radius <= self.investigation.max_search_radius,
            "investigation.min_search_radius must not exceed max_search_radius",
        )?;
        check(
            self.ambience.presence_interval_min <= self.ambience.presence_interval_max,
            "ambience.presence_interval_min must not exceed presence_interval_max",
        )?;
        let events = &self.events;
        check(
            [
                events.block_break_alert,
                events.block_break_sound,
                events.jump_alert,
                events.jump_sound,
                events.fall_alert_per_block,
                events.fall_sound_per_block,
            ]
            .iter()
            .all(|v| *v >= 0.0),
            "events amounts must not be negative",
        )?;
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<DwellerConfig> {
    let content = fs::read_to_string(path).map_err(|source| DwellerError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    DwellerConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DwellerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_phase_threshold_is_three_quarters() {
        let config = DwellerConfig::default();
        assert_eq!(config.alert.phase_threshold, config.alert.max_level * 0.75);
    }

    #[test]
    fn test_sight_search_radius() {
        let sight = SightConfig::default();
        assert_eq!(sight.search_radius(), 27.5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DwellerConfig::from_toml_str(
            r#"
            [spawn]
            chance = 1.0

            [hearing]
            listening_chance = 0.0
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.spawn.chance, 1.0);
        assert_eq!(config.spawn.attempt_interval, 2400);
        assert_eq!(config.hearing.listening_chance, 0.0);
        assert_eq!(config.hearing.high_threshold, 10.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = DwellerConfig::from_toml_str(
            r#"
            [smell]
            sample_stride = 0
            "#,
        );
        assert!(matches!(result, Err(DwellerError::InvalidConfig(_))));
    }

    #[test]
    fn test_event_amounts_from_toml() {
        let config = DwellerConfig::from_toml_str(
            r#"
            [events]
            block_break_alert = 8.0
            "#,
        )
        .expect("events section should parse");
        assert_eq!(config.events.block_break_alert, 8.0);
        assert_eq!(config.events.block_break_sound, 3.0);

        let negative = DwellerConfig::from_toml_str("[events]\njump_sound = -1.0\n");
        assert!(matches!(negative, Err(DwellerError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = DwellerConfig::from_toml_str("[alert\nmax_level = ");
        assert!(matches!(result, Err(DwellerError::ConfigParse(_))));
    }

    #[test]
    fn test_load_shipped_config() {
        let config = load_config(Path::new("data/dweller.toml")).expect("Should load shipped config");
        assert_eq!(config.alert.max_level, 100.0);
        assert_eq!(config.scent.max_trail_length, 100);
        assert_eq!(config.events.fall_sound_per_block, 0.25);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_config(Path::new("data/does_not_exist.toml")).unwrap_err();
        assert!(err.to_string().contains("does_not_exist.toml"));
    }
}
