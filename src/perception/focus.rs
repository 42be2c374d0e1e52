//! The agent's single object of attention
//!
//! All three senses write here. Sound proposes, sight overrides, and once
//! chase is engaged only strictly stronger evidence above the high
//! threshold may move the focus.

use glam::DVec3;
use serde::Serialize;

use crate::core::types::Tick;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerceptionFocus {
    /// `None` means no focus
    pub source: Option<DVec3>,
    pub intensity: f64,
    pub chase_engaged: bool,
    /// Last tick sight or sound confirmed the focus
    pub refreshed_at: Tick,
}

impl PerceptionFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    fn adopt(&mut self, location: DVec3, intensity: f64, now: Tick) {
        self.source = Some(location);
        self.intensity = intensity;
        self.refreshed_at = now;
    }

    /// Offer a heard sound as the new focus; true if it was adopted
    pub fn propose_sound(&mut self, location: DVec3, intensity: f64, high_threshold: f64, now: Tick) -> bool {
        if self.chase_engaged {
            if intensity > self.intensity && intensity > high_threshold {
                self.adopt(location, intensity, now);
                return true;
            }
            return false;
        }

        let mut adopted = false;
        if intensity > self.intensity {
            self.adopt(location, intensity, now);
            adopted = true;
        }
        if intensity > high_threshold {
            self.chase_engaged = true;
            tracing::info!(pi = intensity, ?location, "Chase engaged by sound");
            // A loud enough sound wins even against an equal focus
            if intensity >= self.intensity {
                self.adopt(location, intensity, now);
                adopted = true;
            }
        }
        adopted
    }

    /// Direct sight: unconditional overwrite and chase
    pub fn force_sight(&mut self, location: DVec3, intensity: f64, now: Tick) {
        if !self.chase_engaged {
            tracing::info!(?location, "Chase engaged by sight");
        }
        self.adopt(location, intensity, now);
        self.chase_engaged = true;
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.intensity = 0.0;
        self.chase_engaged = false;
    }

    /// Drop a chase nobody has confirmed for `memory_ticks`
    pub fn expire_chase(&mut self, now: Tick, memory_ticks: Tick) -> bool {
        if self.chase_engaged && now.saturating_sub(self.refreshed_at) >= memory_ticks {
            tracing::info!(since = self.refreshed_at, "Chase forgotten");
            self.clear();
            return true;
        }
        false
    }
}
