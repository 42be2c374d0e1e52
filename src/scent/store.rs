//! Per-subject scent trails fed by subject movement

use ahash::AHashMap;

use crate::core::config::ScentConfig;
use crate::core::types::{BlockPos, Subject, SubjectId, Tick};
use crate::scent::trail::{ScentSample, ScentTrail};

#[derive(Debug, Clone)]
pub struct ScentStore {
    trails: AHashMap<SubjectId, ScentTrail>,
    /// Block each tracked subject stood in, and when it was last seen
    last_blocks: AHashMap<SubjectId, (BlockPos, Tick)>,
    config: ScentConfig,
}

impl ScentStore {
    pub fn new(config: ScentConfig) -> Self {
        Self {
            trails: AHashMap::new(),
            last_blocks: AHashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ScentConfig {
        &self.config
    }

    /// Lay a sample for `subject` at `block`
    pub fn deposit(&mut self, subject: SubjectId, block: BlockPos, now: Tick, wet: bool) {
        debug_assert!(subject.is_valid(), "scent deposit for nil subject");
        if !subject.is_valid() {
            return;
        }

        let intensity = if wet {
            self.config.initial_intensity * self.config.wet_multiplier
        } else {
            self.config.initial_intensity
        };
        let capacity = self.config.max_trail_length;
        self.trails
            .entry(subject)
            .or_insert_with(|| ScentTrail::new(capacity))
            .push(ScentSample::new(block, now, intensity));
    }

    /// Deposit at the block a subject just left, if it moved to a new block
    ///
    /// Untracked ticks (observer, dead) break the chain: the first tracked
    /// tick afterwards only records where the subject stands.
    pub fn track_movement(&mut self, subject: &Subject, now: Tick) -> bool {
        if !subject.is_perceivable() {
            self.last_blocks.remove(&subject.id);
            return false;
        }

        let block = subject.block();
        match self.last_blocks.insert(subject.id, (block, now)) {
            Some((previous, _)) if previous != block => {
                self.deposit(subject.id, previous, now, subject.wet);
                true
            }
            _ => false,
        }
    }

    pub fn trail(&self, subject: SubjectId) -> Option<&ScentTrail> {
        debug_assert!(subject.is_valid(), "scent trail read for nil subject");
        self.trails.get(&subject)
    }

    /// Drop samples past twice their lifespan and forget empty trails
    ///
    /// Positions of subjects not tracked within the same window go too.
    pub fn cleanup(&mut self, now: Tick) -> usize {
        let max_age = self.config.lifespan_ticks * 2;
        let mut removed = 0;
        self.trails.retain(|_, trail| {
            removed += trail.prune_older_than(now, max_age);
            !trail.is_empty()
        });
        self.last_blocks
            .retain(|_, (_, seen)| now.saturating_sub(*seen) <= max_age);
        if removed > 0 {
            tracing::debug!(removed, remaining_trails = self.trails.len(), "Scent cleanup");
        }
        removed
    }

    pub fn forget(&mut self, subject: SubjectId) {
        self.trails.remove(&subject);
        self.last_blocks.remove(&subject);
    }

    pub fn trail_count(&self) -> usize {
        self.trails.len()
    }

    /// Subjects whose standing block is remembered
    pub fn tracked_count(&self) -> usize {
        self.last_blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec3, IVec3};

    fn store() -> ScentStore {
        ScentStore::new(ScentConfig::default())
    }

    #[test]
    fn test_movement_deposits_previous_block() {
        let mut store = store();
        let mut subject = Subject::new(SubjectId::new(), DVec3::new(0.5, 10.0, 0.5));

        assert!(!store.track_movement(&subject, 1));
        assert!(store.trail(subject.id).is_none());

        subject.teleport(DVec3::new(0.9, 10.0, 0.5));
        assert!(!store.track_movement(&subject, 2));

        subject.teleport(DVec3::new(1.5, 10.0, 0.5));
        assert!(store.track_movement(&subject, 3));

        let trail = store.trail(subject.id).expect("trail after moving");
        assert_eq!(trail.len(), 1);
        let s = trail.get(0).expect("one sample");
        assert_eq!(s.position, IVec3::new(0, 10, 0));
        assert_eq!(s.created_at, 3);
        assert_eq!(s.initial_intensity, 10.0);
    }

    #[test]
    fn test_wet_subject_leaves_faint_scent() {
        let mut store = store();
        let id = SubjectId::new();
        store.deposit(id, IVec3::ZERO, 0, true);
        let s = store.trail(id).and_then(|t| t.get(0)).copied().expect("sample");
        assert!((s.initial_intensity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_observer_leaves_no_scent() {
        let mut store = store();
        let mut subject = Subject::new(SubjectId::new(), DVec3::ZERO).as_observer();
        store.track_movement(&subject, 0);
        subject.teleport(DVec3::new(5.0, 0.0, 0.0));
        assert!(!store.track_movement(&subject, 1));
        assert_eq!(store.trail_count(), 0);
    }

    #[test]
    fn test_untracked_tick_breaks_the_chain() {
        let mut store = store();
        let mut subject = Subject::new(SubjectId::new(), DVec3::new(0.5, 10.0, 0.5));
        store.track_movement(&subject, 0);

        subject.observer = true;
        subject.teleport(DVec3::new(5.5, 10.0, 0.5));
        assert!(!store.track_movement(&subject, 1));

        // Back in play far from the old block: nothing laid there
        subject.observer = false;
        subject.teleport(DVec3::new(9.5, 10.0, 0.5));
        assert!(!store.track_movement(&subject, 2));
        assert!(store.trail(subject.id).is_none());

        subject.teleport(DVec3::new(10.5, 10.0, 0.5));
        assert!(store.track_movement(&subject, 3));
        let laid = store.trail(subject.id).and_then(|t| t.get(0)).copied().expect("sample");
        assert_eq!(laid.position, IVec3::new(9, 10, 0));
    }

    #[test]
    fn test_cleanup_drops_untracked_positions() {
        let mut store = store();
        let gone = Subject::new(SubjectId::new(), DVec3::new(0.5, 10.0, 0.5));
        let present = Subject::new(SubjectId::new(), DVec3::new(4.5, 10.0, 0.5));
        store.track_movement(&gone, 0);
        store.track_movement(&present, 0);
        store.track_movement(&present, 12_000);
        assert_eq!(store.tracked_count(), 2);

        store.cleanup(12_001);
        assert_eq!(store.tracked_count(), 1);
    }

    #[test]
    fn test_cleanup_forgets_stale_trails() {
        let mut store = store();
        let stale = SubjectId::new();
        let fresh = SubjectId::new();
        store.deposit(stale, IVec3::ZERO, 0, false);
        store.deposit(fresh, IVec3::ZERO, 12_000, false);

        let removed = store.cleanup(12_001);
        assert_eq!(removed, 1);
        assert!(store.trail(stale).is_none());
        assert!(store.trail(fresh).is_some());
    }

    #[test]
    fn test_forget_subject() {
        let mut store = store();
        let id = SubjectId::new();
        store.deposit(id, IVec3::ZERO, 0, false);
        store.forget(id);
        assert!(store.trail(id).is_none());
    }
}
