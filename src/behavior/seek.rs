//! One-shot walk to the point chosen at spawn

use crate::behavior::GoalContext;
use crate::core::types::BlockPos;

#[derive(Debug, Clone, Default)]
pub struct SeekInitialPoint {
    target: Option<BlockPos>,
}

impl SeekInitialPoint {
    pub fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        ctx.perception
            .initial_target
            .is_some_and(|target| !ctx.is_near(target, ctx.config.seek.arrival_radius))
    }

    pub fn start(&mut self, ctx: &mut GoalContext<'_>) {
        debug_assert!(ctx.perception.initial_target.is_some(), "seek started without an initial point");
        let Some(target) = ctx.perception.initial_target else {
            return;
        };
        self.target = Some(target);
        tracing::info!(?target, "Seeking initial point");
        ctx.move_to(target, ctx.config.seek.speed);
    }

    pub fn should_continue(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        ctx.perception.initial_target == Some(target)
            && !ctx.navigation_idle()
            && !ctx.is_near(target, ctx.config.seek.arrival_radius)
    }

    pub fn tick(&mut self, _ctx: &mut GoalContext<'_>) {}

    /// Reached or abandoned, the point is never sought again
    pub fn stop(&mut self, ctx: &mut GoalContext<'_>) {
        if let Some(target) = self.target.take() {
            ctx.release_navigation(target);
            tracing::debug!(?target, "Initial point released");
        }
        ctx.perception.initial_target = None;
    }
}
