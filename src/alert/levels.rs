//! Per-subject alert (threat) levels
//!
//! Noise raises a subject's level, time lowers it. Deep subjects are both
//! louder to the cave and slower to be forgotten; sneaking halves every rise.
//! Levels are created lazily: an unknown subject reads as 0.

use ahash::AHashMap;
use serde::Serialize;

use crate::core::config::AlertConfig;
use crate::core::types::{Subject, SubjectId};

/// A level that went up, for ambient feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertRise {
    pub subject: SubjectId,
    pub old: f64,
    pub new: f64,
}

impl AlertRise {
    pub fn amount(&self) -> f64 {
        self.new - self.old
    }
}

#[derive(Debug, Clone)]
pub struct AlertLevels {
    levels: AHashMap<SubjectId, f64>,
    config: AlertConfig,
}

impl AlertLevels {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            levels: AHashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Current level, 0 for subjects never seen
    pub fn level(&self, subject: SubjectId) -> f64 {
        debug_assert!(subject.is_valid(), "alert level read for nil subject");
        self.levels.get(&subject).copied().unwrap_or(0.0)
    }

    fn is_deep(&self, subject: &Subject) -> bool {
        subject.position.y < self.config.depth_threshold_y
    }

    /// Raise the level by `raw` after depth and stealth modifiers
    pub fn increase(&mut self, subject: &Subject, raw: f64) -> Option<AlertRise> {
        debug_assert!(subject.id.is_valid(), "alert increase for nil subject");
        if !subject.id.is_valid() {
            return None;
        }

        let depth = if self.is_deep(subject) {
            self.config.depth_increase_factor
        } else {
            1.0
        };
        let stealth = if subject.sneaking {
            self.config.stealth_factor
        } else {
            1.0
        };
        let effective = raw * depth * stealth;

        let old = self.level(subject.id);
        let new = (old + effective).clamp(0.0, self.config.max_level);
        self.levels.insert(subject.id, new);

        if old < self.config.phase_threshold && new >= self.config.phase_threshold {
            tracing::info!(subject = %subject.id, level = new, "Alert reached phase threshold");
        }

        if new > old {
            tracing::debug!(subject = %subject.id, old, new, "Alert rose");
            Some(AlertRise {
                subject: subject.id,
                old,
                new,
            })
        } else {
            None
        }
    }

    /// Lower the level by one decay step; false when already calm
    pub fn decay(&mut self, subject: &Subject) -> bool {
        debug_assert!(subject.id.is_valid(), "alert decay for nil subject");
        let current = self.level(subject.id);
        if current == 0.0 {
            return false;
        }

        let factor = if self.is_deep(subject) {
            self.config.depth_decay_factor
        } else {
            1.0
        };
        let amount = self.config.base_decay * factor;
        let new = (current - amount).clamp(0.0, self.config.max_level);
        self.levels.insert(subject.id, new);
        new != current
    }

    pub fn has_reached_phase_threshold(&self, subject: SubjectId) -> bool {
        self.level(subject) >= self.config.phase_threshold
    }

    pub fn set_level(&mut self, subject: SubjectId, level: f64) {
        self.levels
            .insert(subject, level.clamp(0.0, self.config.max_level));
    }

    pub fn forget(&mut self, subject: SubjectId) {
        self.levels.remove(&subject);
    }
}
