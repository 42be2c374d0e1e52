//! Perception integration tests
//!
//! Exercises the three senses through a live agent body in a voxel world:
//! - sound attenuation through mixed open and solid cells
//! - sight overriding any sound focus
//! - smell picking up a trail and the smell goal following it

use deep_dweller::alert::AlertLevels;
use deep_dweller::behavior::{GoalContext, GoalKind, InvestigateSmell};
use deep_dweller::core::config::{DwellerConfig, HearingConfig};
use deep_dweller::core::types::{Subject, SubjectId};
use deep_dweller::entity::Dweller;
use deep_dweller::perception::{hearing, PerceptionContext};
use deep_dweller::scent::ScentStore;
use deep_dweller::world::{Environment, VoxelWorld};
use glam::{DVec3, IVec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn agent_world() -> (VoxelWorld, Dweller) {
    let mut world = VoxelWorld::new();
    let handle = world.spawn_agent_at(IVec3::ZERO, DVec3::X);
    (world, Dweller::new(handle, DwellerConfig::default(), 7))
}

/// Ten blocks of straight path at eye height, the far five solid
#[test]
fn test_sound_through_half_wall() {
    let mut world = VoxelWorld::new();
    for x in 5..10 {
        world.set_solid(IVec3::new(x, 0, 0));
    }
    let heard = hearing::perceive(
        &world,
        DVec3::new(0.5, 0.5, 0.5),
        DVec3::new(10.5, 0.5, 0.5),
        20.0,
        false,
        &HearingConfig::default(),
    );
    assert!((heard.effective_distance - 7.5).abs() < 1e-9);
    assert!((heard.perceived_intensity - 12.5).abs() < 1e-9);
}

#[test]
fn test_loud_sound_through_wall_engages_chase() {
    let (mut world, mut dweller) = agent_world();
    // Agent eye sits at y = 1.7, inside block row y = 1
    for x in 5..10 {
        world.set_solid(IVec3::new(x, 1, 0));
    }
    let subject = Subject::new(SubjectId::new(), DVec3::new(10.5, 0.0, 0.5));
    world.add_subject(subject.clone());
    let config = DwellerConfig::default();
    let mut alerts = AlertLevels::new(config.alert.clone());

    let heard = dweller
        .on_sound_event(&world, &mut alerts, &subject, DVec3::new(10.5, 1.7, 0.5), 20.0)
        .expect("sound is audible");

    assert!((heard.perception.perceived_intensity - 12.5).abs() < 1e-9);
    assert!(heard.focus_adopted);
    assert!(dweller.focus().chase_engaged);
    // Half the perceived intensity, scaled up for a deep subject
    assert!((alerts.level(subject.id) - 12.5 * 0.5 * 1.5).abs() < 1e-9);
}

#[test]
fn test_quiet_sound_does_not_replace_stronger_focus() {
    let (mut world, mut dweller) = agent_world();
    let subject = Subject::new(SubjectId::new(), DVec3::new(3.5, 0.0, 0.5));
    world.add_subject(subject.clone());
    let mut alerts = AlertLevels::new(DwellerConfig::default().alert);

    dweller
        .on_sound_event(&world, &mut alerts, &subject, DVec3::new(3.5, 1.7, 0.5), 8.0)
        .expect("first sound audible");
    let first = dweller.focus().clone();

    let heard = dweller
        .on_sound_event(&world, &mut alerts, &subject, DVec3::new(-3.5, 1.7, 0.5), 5.0)
        .expect("second sound audible");
    assert!(!heard.focus_adopted);
    assert_eq!(dweller.focus().source, first.source);
}

#[test]
fn test_sight_overrides_louder_sound_focus() {
    let (mut world, mut dweller) = agent_world();
    dweller
        .perception_mut()
        .focus
        .propose_sound(DVec3::new(-30.0, 0.0, 0.0), 50.0, 10.0, 0);
    assert!(dweller.focus().chase_engaged);

    let subject = Subject::new(SubjectId::new(), DVec3::new(3.5, 0.0, 0.5));
    world.add_subject(subject.clone());
    let scents = ScentStore::new(DwellerConfig::default().scent);
    dweller.on_tick(&mut world, &scents);

    assert!(dweller.perception().has_sight);
    assert_eq!(dweller.focus().source, Some(subject.position));
    // Synthetic sight intensity replaces the louder sound
    assert_eq!(dweller.focus().intensity, 15.0);
}

#[test]
fn test_hidden_subject_leaves_focus_alone() {
    let (mut world, mut dweller) = agent_world();
    for y in -1..4 {
        for z in -2..=2 {
            world.set_solid(IVec3::new(2, y, z));
        }
    }
    let subject = Subject::new(SubjectId::new(), DVec3::new(4.5, 0.0, 0.5));
    world.add_subject(subject);
    let scents = ScentStore::new(DwellerConfig::default().scent);
    dweller.on_tick(&mut world, &scents);

    assert!(!dweller.perception().has_sight);
    assert!(!dweller.focus().has_source());
}

#[test]
fn test_smell_goal_cannot_start_without_target() {
    let config = DwellerConfig::default();
    let scents = ScentStore::new(config.scent.clone());
    let mut world = VoxelWorld::new();
    let handle = world.spawn_agent_at(IVec3::ZERO, DVec3::X);
    world.add_subject(Subject::new(SubjectId::new(), DVec3::new(100.0, 0.0, 0.0)));
    let body = world.agent_body(handle).expect("agent alive");

    let mut perception = PerceptionContext::new();
    perception.smell.update(&world, &body, &scents, false, 0, &config);
    assert!(perception.smell.target().is_none());

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut ctx = GoalContext {
        handle,
        body,
        now: 0,
        perception: &mut perception,
        env: &mut world,
        scents: &scents,
        rng: &mut rng,
        config: &config,
    };
    assert!(!InvestigateSmell::default().can_start(&mut ctx));
}

#[test]
fn test_agent_follows_fresh_trail() {
    let (mut world, mut dweller) = agent_world();
    let config = DwellerConfig::default();
    let subject_id = SubjectId::new();
    // Far enough that no sight tier fires, close enough to smell
    world.add_subject(Subject::new(subject_id, DVec3::new(30.5, 0.0, 0.5)));

    let mut scents = ScentStore::new(config.scent.clone());
    for x in 1..30 {
        scents.deposit(subject_id, IVec3::new(x, 0, 0), x as u64, false);
    }
    world.set_tick(30);
    dweller.on_tick(&mut world, &scents);

    let target = dweller.perception().smell.target().copied().expect("trail picked up");
    assert_eq!(target.subject, subject_id);
    assert_eq!(target.sample.position, IVec3::new(29, 0, 0));
    assert_eq!(dweller.active_goal(), Some(GoalKind::InvestigateSmell));
    assert_eq!(world.navigation_target(dweller.handle()), Some(IVec3::new(29, 0, 0)));
}

#[test]
fn test_listening_suppresses_smell() {
    let (mut world, mut dweller) = agent_world();
    let config = DwellerConfig::default();
    let subject_id = SubjectId::new();
    world.add_subject(Subject::new(subject_id, DVec3::new(30.5, 0.0, 0.5)));
    let mut scents = ScentStore::new(config.scent.clone());
    for x in 1..30 {
        scents.deposit(subject_id, IVec3::new(x, 0, 0), x as u64, false);
    }

    let mut always = config.hearing.clone();
    always.listening_chance = 1.0;
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(dweller.perception_mut().listening.try_start(&always, &mut rng));

    world.set_tick(30);
    dweller.on_tick(&mut world, &scents);
    assert!(dweller.perception().smell.target().is_none());
}
