//! Director integration tests
//!
//! Drives the whole core through the director the way a host would:
//! - noisy subject summoning the agent
//! - a registered pursuit taking over during chase
//! - chase memory running out
//! - dead agents being dropped and replaced

use deep_dweller::behavior::{GoalContext, GoalKind, Pursuit};
use deep_dweller::core::config::DwellerConfig;
use deep_dweller::core::types::{block_of, Subject, SubjectId};
use deep_dweller::simulation::{Director, SubjectEvent};
use deep_dweller::spawn::SpawnOutcome;
use deep_dweller::world::{Environment, VoxelWorld};
use glam::{DVec3, IVec3};

/// Walks straight at the focus
#[derive(Debug, Default)]
struct Charge;

impl Pursuit for Charge {
    fn name(&self) -> &str {
        "charge"
    }

    fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        ctx.perception.focus.has_source()
    }

    fn should_continue(&mut self, ctx: &mut GoalContext<'_>) -> bool {
        ctx.perception.focus.has_source()
    }

    fn start(&mut self, _ctx: &mut GoalContext<'_>) {}

    fn tick(&mut self, ctx: &mut GoalContext<'_>) {
        if let Some(source) = ctx.perception.focus.source {
            ctx.move_to(block_of(source), 1.2);
        }
    }

    fn stop(&mut self, ctx: &mut GoalContext<'_>) {
        ctx.env.cancel_movement(ctx.handle);
    }
}

fn certain_spawns() -> DwellerConfig {
    let mut config = DwellerConfig::default();
    config.spawn.chance = 1.0;
    config
}

/// A subject shut in a stone shell, open cave all around it
fn enclosed_subject() -> (VoxelWorld, Subject) {
    let mut world = VoxelWorld::new();
    for x in -2..=2 {
        for y in -2..=4 {
            for z in -2..=2 {
                if x == -2 || x == 2 || z == -2 || z == 2 || y == -2 || y == 4 {
                    world.set_solid(IVec3::new(x, y, z));
                }
            }
        }
    }
    let subject = Subject::new(SubjectId::new(), DVec3::new(0.5, 0.0, 0.5));
    world.add_subject(subject.clone());
    (world, subject)
}

fn tick_to(director: &mut Director, world: &mut VoxelWorld, tick: u64) -> Vec<SpawnOutcome> {
    world.set_tick(tick);
    director.on_tick(world)
}

#[test]
fn test_digging_summons_the_agent() {
    let (mut world, subject) = enclosed_subject();
    let mut director = Director::new(certain_spawns(), 11).expect("valid config");

    // 7.5 per break below the depth threshold
    for i in 0..11 {
        director.on_subject_event(&world, subject.id, SubjectEvent::BlockBreak(IVec3::new(1, 1, i % 2)));
    }
    assert!(director.alert_level(subject.id) >= 75.0);
    assert!(director.agent_handle().is_none());

    let outcomes = tick_to(&mut director, &mut world, 20);
    assert_eq!(outcomes.len(), 1);
    let SpawnOutcome::Spawned { handle, position, .. } = outcomes[0] else {
        panic!("expected a spawn, got {:?}", outcomes[0]);
    };
    assert_eq!(director.agent_handle(), Some(handle));
    assert_eq!(world.agent_count(), 1);
    assert!(world.footprint_open_at(position));
}

#[test]
fn test_quiet_subject_never_summons() {
    let (mut world, subject) = enclosed_subject();
    let mut director = Director::new(certain_spawns(), 11).expect("valid config");
    director.on_subject_event(&world, subject.id, SubjectEvent::Jump);

    for tick in (20..=2400).step_by(20) {
        let outcomes = tick_to(&mut director, &mut world, tick);
        assert!(outcomes.iter().all(|o| *o == SpawnOutcome::BelowPhaseThreshold));
    }
    assert_eq!(world.agent_count(), 0);
}

#[test]
fn test_pursuit_takes_over_during_chase() {
    let (mut world, subject) = enclosed_subject();
    let mut director = Director::new(certain_spawns(), 5)
        .expect("valid config")
        .with_pursuit(Box::new(|| Box::new(Charge) as Box<dyn Pursuit>));
    director.alerts_mut().set_level(subject.id, 90.0);
    assert!(tick_to(&mut director, &mut world, 20)[0].is_spawned());
    let handle = director.agent_handle().expect("agent spawned");

    let heard = director
        .on_sound_event(&world, subject.id, subject.eye_position, 100.0)
        .expect("loud sound heard");
    assert!(heard.perception.perceived_intensity > 10.0);
    assert!(director.focus().chase_engaged);

    tick_to(&mut director, &mut world, 21);
    assert_eq!(director.active_goal(), Some(GoalKind::Pursuit));
    assert_eq!(world.navigation_target(handle), Some(block_of(subject.eye_position)));
}

#[test]
fn test_unconfirmed_chase_is_forgotten() {
    let (mut world, subject) = enclosed_subject();
    let config = certain_spawns();
    let memory = config.investigation.chase_memory_ticks;
    let mut director = Director::new(config, 5)
        .expect("valid config")
        .with_pursuit(Box::new(|| Box::new(Charge) as Box<dyn Pursuit>));
    director.alerts_mut().set_level(subject.id, 90.0);
    tick_to(&mut director, &mut world, 20);
    director
        .on_sound_event(&world, subject.id, subject.eye_position, 100.0)
        .expect("loud sound heard");

    tick_to(&mut director, &mut world, 20 + memory - 1);
    assert!(director.focus().chase_engaged);

    tick_to(&mut director, &mut world, 20 + memory);
    assert!(!director.focus().chase_engaged);
    assert!(!director.focus().has_source());
    assert_ne!(director.active_goal(), Some(GoalKind::Pursuit));
}

#[test]
fn test_dead_agent_is_replaced_after_cooldown() {
    let (mut world, subject) = enclosed_subject();
    let config = certain_spawns();
    let interval = config.spawn.attempt_interval;
    let mut director = Director::new(config, 9).expect("valid config");
    director.alerts_mut().set_level(subject.id, 100.0);

    assert!(tick_to(&mut director, &mut world, 20)[0].is_spawned());
    let first = director.agent_handle().expect("agent spawned");
    world.kill_agent(first);

    assert_eq!(tick_to(&mut director, &mut world, 40), vec![SpawnOutcome::CoolingDown]);
    assert!(director.agent_handle().is_none());

    let outcomes = tick_to(&mut director, &mut world, 20 + interval);
    assert!(outcomes[0].is_spawned());
    assert_ne!(director.agent_handle(), Some(first));
}

#[test]
fn test_sounds_ignored_without_agent() {
    let (world, subject) = enclosed_subject();
    let mut director = Director::new(DwellerConfig::default(), 1).expect("valid config");
    assert!(director
        .on_sound_event(&world, subject.id, subject.eye_position, 50.0)
        .is_none());
    assert_eq!(director.alert_level(subject.id), 0.0);
}

#[test]
fn test_observer_subject_is_invisible_to_the_core() {
    let mut world = VoxelWorld::new();
    let observer = Subject::new(SubjectId::new(), DVec3::new(0.5, 0.0, 0.5)).as_observer();
    world.add_subject(observer.clone());
    let mut director = Director::new(certain_spawns(), 1).expect("valid config");

    director.on_subject_event(&world, observer.id, SubjectEvent::BlockBreak(IVec3::new(1, 0, 0)));
    assert_eq!(director.alert_level(observer.id), 0.0);
}

#[test]
fn test_despawn_stops_goals() {
    let (mut world, subject) = enclosed_subject();
    let mut director = Director::new(certain_spawns(), 3)
        .expect("valid config")
        .with_pursuit(Box::new(|| Box::new(Charge) as Box<dyn Pursuit>));
    director.alerts_mut().set_level(subject.id, 90.0);
    tick_to(&mut director, &mut world, 20);
    let handle = director.agent_handle().expect("agent spawned");
    director
        .on_sound_event(&world, subject.id, subject.eye_position, 100.0)
        .expect("loud sound heard");
    tick_to(&mut director, &mut world, 21);
    assert!(!world.navigation_idle(handle));

    director.despawn(&mut world);
    assert!(director.agent_handle().is_none());
    assert!(director.active_goal().is_none());
    assert!(world.navigation_idle(handle));
}
