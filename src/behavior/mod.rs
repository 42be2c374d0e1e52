//! Behavior goals and the priority scheduler that arbitrates them
//!
//! Architecture: tagged variants + explicit context
//! - `Behavior` enumerates every goal the agent can run
//! - `GoalContext` carries the perception state, world and RNG into each call
//! - `GoalSelector` re-evaluates the stack every tick by priority and controls
//! - `Pursuit` is the one open seam: hosts may plug in a chase behavior

pub mod idle;
pub mod investigate_smell;
pub mod investigate_sound;
pub mod pursuit;
pub mod seek;
pub mod selector;

use std::fmt;

use glam::DVec3;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::DwellerConfig;
use crate::core::types::{block_center, AgentBody, AgentHandle, BlockPos, Tick};
use crate::perception::PerceptionContext;
use crate::scent::ScentStore;
use crate::world::environment::Environment;

pub use idle::{LookAround, LookAtSubject};
pub use investigate_smell::InvestigateSmell;
pub use investigate_sound::InvestigateSound;
pub use pursuit::Pursuit;
pub use seek::SeekInitialPoint;
pub use selector::GoalSelector;

/// Default priorities (lower runs first)
pub const PRIORITY_PURSUIT: u8 = 0;
pub const PRIORITY_INVESTIGATE_SOUND: u8 = 0;
pub const PRIORITY_SEEK_INITIAL_POINT: u8 = 1;
pub const PRIORITY_INVESTIGATE_SMELL: u8 = 2;
pub const PRIORITY_LOOK_AT_SUBJECT: u8 = 8;
pub const PRIORITY_LOOK_AROUND: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GoalKind {
    Pursuit,
    InvestigateSound,
    SeekInitialPoint,
    InvestigateSmell,
    LookAtSubject,
    LookAround,
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoalKind::Pursuit => "pursuit",
            GoalKind::InvestigateSound => "investigate_sound",
            GoalKind::SeekInitialPoint => "seek_initial_point",
            GoalKind::InvestigateSmell => "investigate_smell",
            GoalKind::LookAtSubject => "look_at_subject",
            GoalKind::LookAround => "look_around",
        };
        write!(f, "{}", name)
    }
}

/// Exclusive claims a running goal holds on the agent body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub movement: bool,
    pub look: bool,
}

impl Controls {
    pub const MOVE: Controls = Controls {
        movement: true,
        look: false,
    };
    pub const LOOK: Controls = Controls {
        movement: false,
        look: true,
    };
    pub const MOVE_LOOK: Controls = Controls {
        movement: true,
        look: true,
    };

    pub fn conflicts_with(self, other: Controls) -> bool {
        (self.movement && other.movement) || (self.look && other.look)
    }
}

/// Everything a goal may read or change during one call
pub struct GoalContext<'a> {
    pub handle: AgentHandle,
    pub body: AgentBody,
    pub now: Tick,
    pub perception: &'a mut PerceptionContext,
    pub env: &'a mut dyn Environment,
    pub scents: &'a ScentStore,
    pub rng: &'a mut ChaCha8Rng,
    pub config: &'a DwellerConfig,
}

impl GoalContext<'_> {
    pub fn move_to(&mut self, target: BlockPos, speed: f64) -> bool {
        let accepted = self.env.request_move_to(self.handle, target, speed);
        if !accepted {
            tracing::debug!(?target, "Movement request refused");
        }
        accepted
    }

    pub fn look_at(&mut self, point: DVec3) {
        self.env.request_look_at(self.handle, point);
    }

    pub fn navigation_idle(&self) -> bool {
        self.env.navigation_idle(self.handle)
    }

    /// Cancel movement only if it is still heading for `target`
    pub fn release_navigation(&mut self, target: BlockPos) {
        if self.env.navigation_target(self.handle) == Some(target) {
            self.env.cancel_movement(self.handle);
        }
    }

    /// Within `radius` of the center of `block`
    pub fn is_near(&self, block: BlockPos, radius: f64) -> bool {
        self.body.position.distance_squared(block_center(block)) <= radius * radius
    }
}

#[derive(Debug)]
pub enum Behavior {
    Pursuit(Box<dyn Pursuit>),
    InvestigateSound(InvestigateSound),
    SeekInitialPoint(SeekInitialPoint),
    InvestigateSmell(InvestigateSmell),
    LookAtSubject(LookAtSubject),
    LookAround(LookAround),
}

impl Behavior {
    pub fn kind(&self) -> GoalKind {
        match self {
            Behavior::Pursuit(_) => GoalKind::Pursuit,
            Behavior::InvestigateSound(_) => GoalKind::InvestigateSound,
            Behavior::SeekInitialPoint(_) => GoalKind::SeekInitialPoint,
            Behavior::InvestigateSmell(_) => GoalKind::InvestigateSmell,
            Behavior::LookAtSubject(_) => GoalKind::LookAtSubject,
            Behavior::LookAround(_) => GoalKind::LookAround,
        }
    }

    pub fn controls(&self) -> Controls {
        match self {
            Behavior::SeekInitialPoint(_) => Controls::MOVE,
            Behavior::LookAtSubject(_) => Controls::LOOK,
            Behavior::Pursuit(_)
            | Behavior::InvestigateSound(_)
            | Behavior::InvestigateSmell(_)
            | Behavior::LookAround(_) => Controls::MOVE_LOOK,
        }
    }

    pub fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        match self {
            Behavior::Pursuit(p) => ctx.perception.focus.chase_engaged && p.can_start(ctx),
            Behavior::InvestigateSound(g) => g.can_start(ctx),
            Behavior::SeekInitialPoint(g) => g.can_start(ctx),
            Behavior::InvestigateSmell(g) => g.can_start(ctx),
            Behavior::LookAtSubject(g) => g.can_start(ctx),
            Behavior::LookAround(g) => g.can_start(ctx),
        }
    }

    pub fn should_continue(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        match self {
            Behavior::Pursuit(p) => ctx.perception.focus.chase_engaged && p.should_continue(ctx),
            Behavior::InvestigateSound(g) => g.should_continue(ctx),
            Behavior::SeekInitialPoint(g) => g.should_continue(ctx),
            Behavior::InvestigateSmell(g) => g.should_continue(ctx),
            Behavior::LookAtSubject(g) => g.should_continue(ctx),
            Behavior::LookAround(g) => g.should_continue(),
        }
    }

    pub fn start(&mut self, ctx: &mut GoalContext<'_>) {
        match self {
            Behavior::Pursuit(p) => p.start(ctx),
            Behavior::InvestigateSound(g) => g.start(ctx),
            Behavior::SeekInitialPoint(g) => g.start(ctx),
            Behavior::InvestigateSmell(g) => g.start(ctx),
            Behavior::LookAtSubject(g) => g.start(ctx),
            Behavior::LookAround(g) => g.start(ctx),
        }
    }

    pub fn tick(&mut self, ctx: &mut GoalContext<'_>) {
        match self {
            Behavior::Pursuit(p) => p.tick(ctx),
            Behavior::InvestigateSound(g) => g.tick(ctx),
            Behavior::SeekInitialPoint(g) => g.tick(ctx),
            Behavior::InvestigateSmell(g) => g.tick(ctx),
            Behavior::LookAtSubject(g) => g.tick(ctx),
            Behavior::LookAround(g) => g.tick(ctx),
        }
    }

    pub fn stop(&mut self, ctx: &mut GoalContext<'_>) {
        match self {
            Behavior::Pursuit(p) => p.stop(ctx),
            Behavior::InvestigateSound(g) => g.stop(ctx),
            Behavior::SeekInitialPoint(g) => g.stop(ctx),
            Behavior::InvestigateSmell(g) => g.stop(ctx),
            Behavior::LookAtSubject(g) => g.stop(),
            Behavior::LookAround(_) => {}
        }
    }
}

/// The standard stack: sound, initial point, smell, then the idle looks
pub fn default_goals() -> GoalSelector {
    let mut goals = GoalSelector::new();
    goals.add(
        PRIORITY_INVESTIGATE_SOUND,
        Behavior::InvestigateSound(InvestigateSound::default()),
    );
    goals.add(
        PRIORITY_SEEK_INITIAL_POINT,
        Behavior::SeekInitialPoint(SeekInitialPoint::default()),
    );
    goals.add(
        PRIORITY_INVESTIGATE_SMELL,
        Behavior::InvestigateSmell(InvestigateSmell::default()),
    );
    goals.add(PRIORITY_LOOK_AT_SUBJECT, Behavior::LookAtSubject(LookAtSubject::default()));
    goals.add(PRIORITY_LOOK_AROUND, Behavior::LookAround(LookAround::default()));
    goals
}
