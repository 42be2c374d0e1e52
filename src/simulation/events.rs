//! Noisy things a subject does
//!
//! Each event raises the subject's alert directly and also emits a sound the
//! agent may hear.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::core::config::EventConfig;
use crate::core::types::{block_center, BlockPos, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SubjectEvent {
    BlockBreak(BlockPos),
    Jump,
    /// Landing after falling this many blocks
    Fall(f64),
}

impl SubjectEvent {
    /// Raw amount added to the subject's alert
    pub fn alert_intensity(&self, config: &EventConfig) -> f64 {
        match self {
            SubjectEvent::BlockBreak(_) => config.block_break_alert,
            SubjectEvent::Jump => config.jump_alert,
            SubjectEvent::Fall(blocks) => blocks.max(0.0) * config.fall_alert_per_block,
        }
    }

    /// Raw intensity of the sound the event makes
    pub fn sound_intensity(&self, config: &EventConfig) -> f64 {
        match self {
            SubjectEvent::BlockBreak(_) => config.block_break_sound,
            SubjectEvent::Jump => config.jump_sound,
            SubjectEvent::Fall(blocks) => blocks.max(0.0) * config.fall_sound_per_block,
        }
    }

    /// Where the sound comes from
    pub fn location(&self, subject: &Subject) -> DVec3 {
        match self {
            SubjectEvent::BlockBreak(block) => block_center(*block),
            SubjectEvent::Jump | SubjectEvent::Fall(_) => subject.position,
        }
    }
}
