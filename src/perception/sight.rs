//! Tiered line-of-sight checks against the nearest subject
//!
//! Sight has three independent tiers:
//! - short: close and visible
//! - medium with sound: visible and a strong focus lies near the subject
//! - medium with motion: visible and the subject is moving (further when sprinting)

use glam::DVec3;
use serde::Serialize;

use crate::core::config::SightConfig;
use crate::core::types::{AgentBody, Subject, SubjectId};
use crate::perception::focus::PerceptionFocus;
use crate::world::environment::{clear_path_or_blocked, Environment};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SightReport {
    pub subject: Option<SubjectId>,
    pub subject_position: Option<DVec3>,
    pub distance: f64,
    pub short_range: bool,
    pub medium_with_sound: bool,
    pub medium_with_motion: bool,
}

impl SightReport {
    pub fn has_sight(&self) -> bool {
        self.short_range || self.medium_with_sound || self.medium_with_motion
    }

    /// Where the seen subject stands, only when a tier fired
    pub fn sighted_position(&self) -> Option<DVec3> {
        if self.has_sight() {
            self.subject_position
        } else {
            None
        }
    }
}

/// Nearest perceivable subject within `radius` of the agent's feet
pub fn nearest_subject(env: &dyn Environment, body: &AgentBody, radius: f64) -> Option<Subject> {
    env.nearby_subjects(body.position, radius)
        .into_iter()
        .filter(Subject::is_perceivable)
        .min_by(|a, b| {
            let da = a.position.distance_squared(body.position);
            let db = b.position.distance_squared(body.position);
            da.total_cmp(&db)
        })
}

/// Eye to eye, falling back to eye to feet
pub fn can_see(env: &dyn Environment, eye: DVec3, subject: &Subject) -> bool {
    clear_path_or_blocked(env, eye, subject.eye_position) || clear_path_or_blocked(env, eye, subject.position)
}

pub fn evaluate(
    env: &dyn Environment,
    body: &AgentBody,
    focus: &PerceptionFocus,
    config: &SightConfig,
) -> SightReport {
    let Some(subject) = nearest_subject(env, body, config.search_radius()) else {
        return SightReport::default();
    };

    let distance = subject.position.distance(body.position);
    let mut report = SightReport {
        subject: Some(subject.id),
        subject_position: Some(subject.position),
        distance,
        ..SightReport::default()
    };

    let medium_radius = if subject.sprinting {
        config.medium_radius * config.sprint_multiplier
    } else {
        config.medium_radius
    };
    // Nothing can fire beyond the widest tier; skip the raycast
    if distance > medium_radius.max(config.medium_radius).max(config.short_radius) {
        return report;
    }
    if !can_see(env, body.eye_position, &subject) {
        return report;
    }

    report.short_range = distance <= config.short_radius;

    let corroborated = focus.intensity >= config.sound_pi_threshold
        && focus.source.is_some_and(|source| {
            source.distance(subject.position) <= config.medium_radius * config.sound_corroboration_fraction
        });
    report.medium_with_sound = distance <= config.medium_radius && corroborated;

    let moving = subject.velocity.length_squared() > config.motion_threshold_sq;
    report.medium_with_motion = distance <= medium_radius && moving;

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::voxel::VoxelWorld;
    use glam::IVec3;

    fn body_at(position: DVec3) -> AgentBody {
        AgentBody {
            position,
            eye_position: position + DVec3::new(0.0, 1.7, 0.0),
        }
    }

    fn world_with(subject: Subject) -> VoxelWorld {
        let mut world = VoxelWorld::new();
        world.add_subject(subject);
        world
    }

    fn standing(x: f64) -> Subject {
        Subject::new(SubjectId::new(), DVec3::new(x, 0.0, 0.5))
    }

    #[test]
    fn test_short_range_sight() {
        let world = world_with(standing(4.5));
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));
        let report = evaluate(&world, &body, &PerceptionFocus::new(), &SightConfig::default());
        assert!(report.short_range);
        assert!(report.has_sight());
    }

    #[test]
    fn test_still_subject_at_medium_range_unseen() {
        let world = world_with(standing(10.5));
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));
        let report = evaluate(&world, &body, &PerceptionFocus::new(), &SightConfig::default());
        assert!(report.subject.is_some());
        assert!(!report.has_sight());
        assert!(report.sighted_position().is_none());
    }

    #[test]
    fn test_moving_subject_at_medium_range_seen() {
        let world = world_with(standing(10.5).with_velocity(DVec3::new(0.1, 0.0, 0.0)));
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));
        let report = evaluate(&world, &body, &PerceptionFocus::new(), &SightConfig::default());
        assert!(report.medium_with_motion);
        assert!(!report.short_range);
    }

    #[test]
    fn test_sprinting_extends_motion_tier() {
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));
        let walker = standing(20.5).with_velocity(DVec3::new(0.1, 0.0, 0.0));
        let report = evaluate(&world_with(walker.clone()), &body, &PerceptionFocus::new(), &SightConfig::default());
        assert!(!report.has_sight());

        let sprinter = walker.sprinting();
        let report = evaluate(&world_with(sprinter), &body, &PerceptionFocus::new(), &SightConfig::default());
        assert!(report.medium_with_motion);
    }

    #[test]
    fn test_sound_corroborates_sight() {
        let subject = standing(10.5);
        let world = world_with(subject.clone());
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));

        let mut focus = PerceptionFocus::new();
        focus.propose_sound(subject.position + DVec3::new(3.0, 0.0, 0.0), 6.0, 10.0, 1);
        let report = evaluate(&world, &body, &focus, &SightConfig::default());
        assert!(report.medium_with_sound);

        let mut distant = PerceptionFocus::new();
        distant.propose_sound(subject.position + DVec3::new(20.0, 0.0, 0.0), 6.0, 10.0, 1);
        let report = evaluate(&world, &body, &distant, &SightConfig::default());
        assert!(!report.medium_with_sound);

        let mut faint = PerceptionFocus::new();
        faint.propose_sound(subject.position, 4.0, 10.0, 1);
        let report = evaluate(&world, &body, &faint, &SightConfig::default());
        assert!(!report.medium_with_sound);
    }

    #[test]
    fn test_wall_blocks_sight() {
        let mut world = world_with(standing(4.5));
        world.fill(IVec3::new(2, -1, -2), IVec3::new(2, 4, 2));
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));
        let report = evaluate(&world, &body, &PerceptionFocus::new(), &SightConfig::default());
        assert!(!report.has_sight());
    }

    #[test]
    fn test_observers_ignored() {
        let world = world_with(standing(2.5).as_observer());
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));
        let report = evaluate(&world, &body, &PerceptionFocus::new(), &SightConfig::default());
        assert!(report.subject.is_none());
    }

    #[test]
    fn test_nearest_subject_chosen() {
        let mut world = VoxelWorld::new();
        let far = standing(12.5);
        let near = standing(3.5);
        world.add_subject(far);
        world.add_subject(near.clone());
        let body = body_at(DVec3::new(0.5, 0.0, 0.5));
        let found = nearest_subject(&world, &body, 30.0).expect("subject in range");
        assert_eq!(found.id, near.id);
    }
}
