//! Follow a scent trail sample by sample
//!
//! Trails are stored freshest-first, so "upstream" means lower indices.
//! On each arrival the next sample is searched for in a short window of
//! fresher entries near the current one. The episode ends when nothing
//! qualifies, the node budget runs out, or the trail is lost by chance.

use rand::Rng;

use crate::behavior::GoalContext;
use crate::core::types::{block_center, manhattan, BlockPos, SubjectId};
use crate::scent::ScentSample;

#[derive(Debug, Clone, Default)]
pub struct InvestigateSmell {
    following: Option<ScentSample>,
    nav_target: Option<BlockPos>,
}

impl InvestigateSmell {
    pub fn following(&self) -> Option<&ScentSample> {
        self.following.as_ref()
    }

    pub fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        let arrival = ctx.config.tracking.arrival_radius;
        ctx.perception
            .smell
            .target()
            .is_some_and(|target| !ctx.is_near(target.sample.position, arrival + 1.0))
    }

    pub fn start(&mut self, ctx: &mut GoalContext<'_>) {
        debug_assert!(ctx.perception.smell.target().is_some(), "smell goal started without a target");
        let Some(target) = ctx.perception.smell.target_mut() else {
            return;
        };
        target.nodes_followed = 0;
        let sample = target.sample;
        tracing::info!(subject = %target.subject, position = ?sample.position, "Following scent");
        self.head_for(sample, ctx);
    }

    pub fn should_continue(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        let Some(target) = ctx.perception.smell.target() else {
            return false;
        };
        if target.nodes_followed >= ctx.config.tracking.max_nodes_per_episode {
            tracing::debug!(nodes = target.nodes_followed, "Scent node budget spent");
            return false;
        }
        !ctx.navigation_idle() || !self.arrived(ctx)
    }

    pub fn tick(&mut self, ctx: &mut GoalContext<'_>) {
        let Some(target) = ctx.perception.smell.target().copied() else {
            return;
        };
        // The per-tick scan may have moved the target; re-route to it
        if self.following != Some(target.sample) {
            self.head_for(target.sample, ctx);
        }
        ctx.look_at(block_center(target.sample.position));

        if !self.arrived(ctx) {
            return;
        }
        let nodes_followed = target.nodes_followed + 1;
        if let Some(current) = ctx.perception.smell.target_mut() {
            current.nodes_followed = nodes_followed;
        }
        tracing::debug!(position = ?target.sample.position, nodes_followed, "Reached scent sample");

        if ctx.rng.gen::<f64>() < ctx.config.tracking.lose_trail_chance {
            tracing::info!(position = ?target.sample.position, "Lost the trail");
            ctx.perception.smell.clear_target();
            return;
        }

        match next_sample(ctx, target.subject, &target.sample) {
            Some(next) => {
                if let Some(current) = ctx.perception.smell.target_mut() {
                    current.sample = next;
                }
                self.head_for(next, ctx);
            }
            None => ctx.perception.smell.clear_target(),
        }
    }

    pub fn stop(&mut self, ctx: &mut GoalContext<'_>) {
        if let Some(target) = self.nav_target.take() {
            ctx.release_navigation(target);
        }
        let ours = ctx
            .perception
            .smell
            .target()
            .is_some_and(|target| Some(target.sample) == self.following);
        if ours {
            ctx.perception.smell.clear_target();
        }
        self.following = None;
    }

    fn head_for(&mut self, sample: ScentSample, ctx: &mut GoalContext<'_>) {
        self.following = Some(sample);
        self.nav_target = Some(sample.position);
        ctx.move_to(sample.position, ctx.config.tracking.speed);
    }

    fn arrived(&self, ctx: &GoalContext<'_>) -> bool {
        self.nav_target
            .is_some_and(|target| ctx.is_near(target, ctx.config.tracking.arrival_radius))
    }
}

/// Strongest qualifying sample just upstream of `current`
fn next_sample(ctx: &GoalContext<'_>, subject: SubjectId, current: &ScentSample) -> Option<ScentSample> {
    let trail = ctx.scents.trail(subject)?;
    let index = trail.position_of(current)?;
    let config = ctx.config;
    let window = (config.scent.max_trail_length as f64 * config.tracking.next_node_window_fraction) as usize;
    let stride = config.smell.sample_stride.max(1);

    let mut best: Option<(ScentSample, f64)> = None;
    for i in index.saturating_sub(window)..index {
        if i % stride != 0 {
            continue;
        }
        let Some(candidate) = trail.get(i) else {
            continue;
        };
        if manhattan(candidate.position, current.position) >= config.tracking.next_node_max_manhattan {
            continue;
        }
        let intensity = candidate.intensity_at(ctx.now, config.scent.decay_per_second, config.timing.ticks_per_second);
        if intensity > config.smell.pi_threshold && best.map_or(true, |(_, strongest)| intensity > strongest) {
            best = Some((*candidate, intensity));
        }
    }
    best.map(|(sample, _)| sample)
}
