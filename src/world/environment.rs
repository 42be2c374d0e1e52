//! Environment seam
//!
//! Everything the dweller core needs from the host world: block queries,
//! line of sight, subject lookup, and movement intents for the agent body.
//! The core never touches world storage directly.

use glam::DVec3;
use thiserror::Error;

use crate::core::types::{AgentBody, AgentHandle, BlockPos, Subject, SubjectId, Tick};

/// Failure of a world query (unloaded chunk, host raycast fault)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("Region not loaded at {0}")]
    Unloaded(BlockPos),

    #[error("Raycast failed: {0}")]
    Raycast(String),
}

/// World collaborator consumed by perception, goals and the spawn gate
pub trait Environment {
    /// Whether the block at `block` stops sound
    fn is_occluding_at(&self, block: BlockPos) -> Result<bool, EnvironmentError>;

    /// Unobstructed straight line between two points
    fn has_clear_path(&self, from: DVec3, to: DVec3) -> Result<bool, EnvironmentError>;

    /// Replaceable block with two clear cells above it
    fn footprint_open_at(&self, block: BlockPos) -> bool;

    /// Solid block directly under `block`
    fn ground_solid_below(&self, block: BlockPos) -> bool;

    /// Connected subjects within `radius` of `center`
    fn nearby_subjects(&self, center: DVec3, radius: f64) -> Vec<Subject>;

    /// Every connected subject
    fn subjects(&self) -> Vec<Subject>;

    fn subject(&self, id: SubjectId) -> Option<Subject> {
        self.subjects().into_iter().find(|s| s.id == id)
    }

    fn current_tick(&self) -> Tick;

    fn is_alive(&self, handle: AgentHandle) -> bool;

    /// Body of a live agent, `None` once it is gone
    fn agent_body(&self, handle: AgentHandle) -> Option<AgentBody>;

    /// True when the agent has no movement request in progress
    fn navigation_idle(&self, handle: AgentHandle) -> bool;

    /// Block the agent is currently walking to
    fn navigation_target(&self, handle: AgentHandle) -> Option<BlockPos>;

    /// Ask the agent to walk to `target`; false if the host refused the path
    fn request_move_to(&mut self, handle: AgentHandle, target: BlockPos, speed: f64) -> bool;

    fn request_look_at(&mut self, handle: AgentHandle, point: DVec3);

    fn cancel_movement(&mut self, handle: AgentHandle);

    /// Materialize a new agent body standing in `block`
    fn spawn_agent_at(&mut self, block: BlockPos, facing: DVec3) -> AgentHandle;
}

/// Line of sight with failures read as blocked
pub fn clear_path_or_blocked(env: &dyn Environment, from: DVec3, to: DVec3) -> bool {
    match env.has_clear_path(from, to) {
        Ok(clear) => clear,
        Err(err) => {
            tracing::warn!(error = %err, "Line of sight query failed, treating as blocked");
            false
        }
    }
}

/// Occlusion with failures read as occluding
pub fn occluding_or_solid(env: &dyn Environment, block: BlockPos) -> bool {
    match env.is_occluding_at(block) {
        Ok(occluding) => occluding,
        Err(err) => {
            tracing::warn!(error = %err, "Occlusion query failed, treating as solid");
            true
        }
    }
}
