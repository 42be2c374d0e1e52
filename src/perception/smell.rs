//! Scent sampling for the lowest-priority sense
//!
//! Only every `sample_stride`-th trail entry is examined. The strongest
//! sample above threshold that the agent has a clear line to becomes the
//! smell target.

use glam::DVec3;
use serde::Serialize;

use crate::core::config::DwellerConfig;
use crate::core::types::{block_center, AgentBody, Subject, SubjectId, Tick};
use crate::perception::sight::nearest_subject;
use crate::scent::{ScentSample, ScentStore, ScentTrail};
use crate::world::environment::{clear_path_or_blocked, Environment};

/// Sample currently being followed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmellTarget {
    pub subject: SubjectId,
    pub sample: ScentSample,
    pub nodes_followed: u32,
}

/// Strongest visible sample in a strided scan of `trail`
pub fn best_sample(
    env: &dyn Environment,
    eye: DVec3,
    trail: &ScentTrail,
    now: Tick,
    config: &DwellerConfig,
) -> Option<(ScentSample, f64)> {
    let mut best: Option<(ScentSample, f64)> = None;
    for sample in trail.iter().step_by(config.smell.sample_stride.max(1)) {
        let intensity = sample.intensity_at(now, config.scent.decay_per_second, config.timing.ticks_per_second);
        if intensity <= config.smell.pi_threshold {
            continue;
        }
        if best.is_some_and(|(_, strongest)| intensity <= strongest) {
            continue;
        }
        if clear_path_or_blocked(env, eye, block_center(sample.position)) {
            best = Some((*sample, intensity));
        }
    }
    best
}

/// Which subject is being smelled and the sample being followed
#[derive(Debug, Clone, Default)]
pub struct SmellState {
    tracked: Option<SubjectId>,
    target: Option<SmellTarget>,
}

impl SmellState {
    pub fn target(&self) -> Option<&SmellTarget> {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> Option<&mut SmellTarget> {
        self.target.as_mut()
    }

    pub fn tracked_subject(&self) -> Option<SubjectId> {
        self.tracked
    }

    /// Adopt `target` directly, tracking its subject
    pub fn set_target(&mut self, target: SmellTarget) {
        self.tracked = Some(target.subject);
        self.target = Some(target);
    }

    /// End the current episode; the tracked subject is kept for re-acquisition
    pub fn clear_target(&mut self) {
        if let Some(target) = self.target.take() {
            tracing::info!(
                subject = %target.subject,
                nodes = target.nodes_followed,
                "Smell investigation ended"
            );
        }
    }

    pub fn forget_subject(&mut self, subject: SubjectId) {
        if self.tracked == Some(subject) {
            self.tracked = None;
        }
        if self.target.is_some_and(|t| t.subject == subject) {
            self.clear_target();
        }
    }

    /// Per-tick smell scan; `engaged` is true while chase, sight or listening hold attention
    pub fn update(
        &mut self,
        env: &dyn Environment,
        body: &AgentBody,
        scents: &ScentStore,
        engaged: bool,
        now: Tick,
        config: &DwellerConfig,
    ) {
        if engaged {
            self.clear_target();
            return;
        }

        let detection = config.smell.detection_radius;
        let mut subject: Option<Subject> = None;

        if let Some(id) = self.tracked {
            let kept = env
                .subject(id)
                .filter(|s| s.is_perceivable() && s.position.distance(body.position) <= detection * 2.0);
            match kept {
                Some(s) => subject = Some(s),
                None => {
                    tracing::debug!(subject = %id, "Lost smell subject");
                    self.tracked = None;
                    self.clear_target();
                }
            }
        }

        if subject.is_none() {
            if let Some(nearest) = nearest_subject(env, body, detection) {
                self.tracked = Some(nearest.id);
                subject = Some(nearest);
            }
        }

        let Some(subject) = subject else {
            self.clear_target();
            return;
        };

        let best = scents
            .trail(subject.id)
            .and_then(|trail| best_sample(env, body.eye_position, trail, now, config));

        match best {
            Some((sample, intensity)) => {
                let changed = self
                    .target
                    .map_or(true, |t| t.sample != sample || t.subject != subject.id);
                if changed {
                    let nodes_followed = match self.target {
                        Some(t) if t.subject == subject.id => t.nodes_followed,
                        _ => 0,
                    };
                    if self.target.is_none() {
                        tracing::info!(
                            subject = %subject.id,
                            position = ?sample.position,
                            intensity,
                            "Started investigating smell"
                        );
                    }
                    self.target = Some(SmellTarget {
                        subject: subject.id,
                        sample,
                        nodes_followed,
                    });
                }
            }
            None => self.clear_target(),
        }
    }
}
