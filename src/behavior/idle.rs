//! Lowest tiers: glance at a nearby subject, or look around aimlessly

use glam::DVec3;
use rand::Rng;

use crate::behavior::GoalContext;
use crate::core::types::SubjectId;
use crate::perception::sight::nearest_subject;

#[derive(Debug, Clone, Default)]
pub struct LookAtSubject {
    subject: Option<SubjectId>,
    ticks_left: u32,
}

impl LookAtSubject {
    pub fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        if ctx.rng.gen::<f64>() >= ctx.config.idle.look_chance {
            return false;
        }
        match nearest_subject(&*ctx.env, &ctx.body, ctx.config.idle.look_range) {
            Some(subject) => {
                self.subject = Some(subject.id);
                true
            }
            None => false,
        }
    }

    pub fn start(&mut self, ctx: &mut GoalContext<'_>) {
        let base = ctx.config.idle.look_at_base_ticks;
        self.ticks_left = base + ctx.rng.gen_range(0..base.max(1));
    }

    pub fn should_continue(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        let Some(id) = self.subject else {
            return false;
        };
        let range = ctx.config.idle.look_range;
        self.ticks_left > 0
            && ctx
                .env
                .subject(id)
                .is_some_and(|s| s.is_perceivable() && s.position.distance(ctx.body.position) <= range)
    }

    pub fn tick(&mut self, ctx: &mut GoalContext<'_>) {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        if let Some(subject) = self.subject.and_then(|id| ctx.env.subject(id)) {
            ctx.look_at(subject.eye_position);
        }
    }

    pub fn stop(&mut self) {
        self.subject = None;
        self.ticks_left = 0;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LookAround {
    direction: DVec3,
    ticks_left: u32,
}

impl LookAround {
    pub fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        ctx.rng.gen::<f64>() < ctx.config.idle.look_chance
    }

    pub fn start(&mut self, ctx: &mut GoalContext<'_>) {
        let heading = ctx.rng.gen::<f64>() * std::f64::consts::TAU;
        self.direction = DVec3::new(heading.cos(), 0.0, heading.sin());
        let base = ctx.config.idle.look_around_base_ticks;
        self.ticks_left = base + ctx.rng.gen_range(0..base.max(1));
    }

    pub fn should_continue(&self) -> bool {
        self.ticks_left > 0
    }

    pub fn tick(&mut self, ctx: &mut GoalContext<'_>) {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        let point = ctx.body.eye_position + self.direction;
        ctx.look_at(point);
    }
}
