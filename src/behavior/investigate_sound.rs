//! Walk to a random point around the focused sound, then search there
//!
//! The louder the sound, the tighter the search sphere. Once arrived the
//! agent lingers looking at the point, then lets the focus go.

use glam::DVec3;
use rand::Rng;

use crate::behavior::GoalContext;
use crate::core::types::{block_center, block_of, sphere_offset, BlockPos};

#[derive(Debug, Clone, Default)]
pub struct InvestigateSound {
    sound_location: Option<DVec3>,
    nav_target: Option<BlockPos>,
    search_ticks: u32,
}

impl InvestigateSound {
    pub fn nav_target(&self) -> Option<BlockPos> {
        self.nav_target
    }

    /// Ticks spent searching at the destination
    pub fn search_ticks(&self) -> u32 {
        self.search_ticks
    }

    pub fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        let focus = &ctx.perception.focus;
        if focus.chase_engaged || focus.intensity <= 0.0 {
            return false;
        }
        let Some(source) = focus.source else {
            return false;
        };
        let arrival = ctx.config.investigation.arrival_radius;
        ctx.body.position.distance_squared(source) >= arrival * arrival + 4.0
    }

    /// Search-sphere radius for a focus of `intensity`
    pub fn search_radius(intensity: f64, ctx: &GoalContext<'_>) -> f64 {
        let config = &ctx.config.investigation;
        (config.max_search_radius - intensity * config.radius_reduction_per_pi).max(config.min_search_radius)
    }

    pub fn start(&mut self, ctx: &mut GoalContext<'_>) {
        debug_assert!(ctx.perception.focus.has_source());
        let Some(source) = ctx.perception.focus.source else {
            return;
        };
        let radius = Self::search_radius(ctx.perception.focus.intensity, ctx);
        let distance = ctx.rng.gen::<f64>() * radius;
        let mut point = source + sphere_offset(ctx.rng, distance);
        let spawn = &ctx.config.spawn;
        point.y = point
            .y
            .clamp(spawn.world_bottom_y as f64, (spawn.world_top_y - 1) as f64);

        let target = block_of(point);
        self.sound_location = Some(source);
        self.nav_target = Some(target);
        self.search_ticks = 0;
        tracing::info!(
            ?source,
            ?target,
            pi = ctx.perception.focus.intensity,
            "Investigating sound"
        );
        ctx.move_to(target, ctx.config.investigation.speed);
    }

    fn arrived(&self, ctx: &GoalContext<'_>) -> bool {
        self.nav_target
            .is_some_and(|target| ctx.is_near(target, ctx.config.investigation.arrival_radius))
    }

    pub fn should_continue(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        let focus = &ctx.perception.focus;
        if focus.chase_engaged || focus.source.is_none() || focus.source != self.sound_location {
            return false;
        }
        if self.search_ticks > 0 || self.arrived(ctx) {
            return true;
        }
        !ctx.navigation_idle()
    }

    pub fn tick(&mut self, ctx: &mut GoalContext<'_>) {
        let Some(target) = self.nav_target else {
            return;
        };
        if !self.arrived(ctx) && self.search_ticks == 0 {
            return;
        }
        self.search_ticks += 1;
        ctx.look_at(block_center(target));
        if self.search_ticks >= ctx.config.investigation.search_duration_ticks {
            tracing::info!(?target, "Sound search finished");
            ctx.perception.focus.clear();
        }
    }

    pub fn stop(&mut self, ctx: &mut GoalContext<'_>) {
        if let Some(target) = self.nav_target.take() {
            ctx.release_navigation(target);
        }
        let focus = &mut ctx.perception.focus;
        if !focus.chase_engaged && focus.source.is_some() && focus.source == self.sound_location {
            focus.clear();
        }
        self.sound_location = None;
        self.search_ticks = 0;
    }
}
