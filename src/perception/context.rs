//! Perception state shared between the agent's senses and its goals
//!
//! Goals receive this struct explicitly through their context, so every
//! read and write of focus, smell target or initial point is visible at the
//! call site.

use glam::DVec3;

use crate::core::types::{BlockPos, SubjectId};
use crate::perception::focus::PerceptionFocus;
use crate::perception::hearing::ListeningState;
use crate::perception::smell::SmellState;

#[derive(Debug, Clone, Default)]
pub struct PerceptionContext {
    pub focus: PerceptionFocus,
    pub listening: ListeningState,
    pub smell: SmellState,
    /// Point chosen at spawn; cleared for good once reached or abandoned
    pub initial_target: Option<BlockPos>,
    pub has_sight: bool,
    pub sighted_subject: Option<SubjectId>,
}

impl PerceptionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_target(mut self, target: Option<BlockPos>) -> Self {
        self.initial_target = target;
        self
    }

    /// Attention held by chase, sight or listening; smell stays quiet
    pub fn is_engaged(&self) -> bool {
        self.focus.chase_engaged || self.has_sight || self.listening.is_active()
    }

    /// Clear a plain (non-chase) focus the agent is standing on
    pub fn settle_focus_arrival(&mut self, position: DVec3, arrival_radius_sq: f64) -> bool {
        if self.focus.chase_engaged {
            return false;
        }
        match self.focus.source {
            Some(source) if position.distance_squared(source) < arrival_radius_sq => {
                tracing::debug!(?source, "Arrived at focus");
                self.focus.clear();
                true
            }
            _ => false,
        }
    }
}
