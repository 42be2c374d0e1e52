//! Initial target point picked around a subject at spawn time

use glam::IVec3;
use rand::Rng;

use crate::core::config::InitialTargetConfig;
use crate::core::types::{sphere_offset, BlockPos, Subject};
use crate::world::environment::Environment;

/// First sampled point with room to stand and ground beneath
///
/// `None` after `attempts` misses; the agent then falls back to idling.
pub fn select_initial_target<R: Rng>(
    env: &dyn Environment,
    subject: &Subject,
    config: &InitialTargetConfig,
    rng: &mut R,
) -> Option<BlockPos> {
    let origin = subject.block();
    for attempt in 0..config.attempts {
        let distance = config.min_radius + rng.gen::<f64>() * (config.max_radius - config.min_radius);
        let offset = sphere_offset(rng, distance);
        // Offsets truncate toward zero around the subject's block
        let candidate = origin + IVec3::new(offset.x as i32, offset.y as i32, offset.z as i32);
        if env.footprint_open_at(candidate) && env.ground_solid_below(candidate) {
            tracing::info!(subject = %subject.id, target = ?candidate, attempt = attempt + 1, "Initial target selected");
            return Some(candidate);
        }
    }
    tracing::warn!(subject = %subject.id, attempts = config.attempts, "No initial target found");
    None
}
