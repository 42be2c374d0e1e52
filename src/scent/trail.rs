//! Scent samples and bounded per-subject trails

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{BlockPos, Tick};

/// A single breadcrumb left where a subject stood
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScentSample {
    pub position: BlockPos,
    pub created_at: Tick,
    pub initial_intensity: f64,
}

impl ScentSample {
    pub fn new(position: BlockPos, created_at: Tick, initial_intensity: f64) -> Self {
        Self {
            position,
            created_at,
            initial_intensity,
        }
    }

    /// Ticks since the sample was laid (zero for samples from the future)
    pub fn age(&self, now: Tick) -> Tick {
        now.saturating_sub(self.created_at)
    }

    /// Strength at `now`, never negative
    ///
    /// Decay advances in whole elapsed seconds.
    pub fn intensity_at(&self, now: Tick, decay_per_second: f64, ticks_per_second: u64) -> f64 {
        let seconds = (self.age(now) / ticks_per_second.max(1)) as f64;
        (self.initial_intensity - decay_per_second * seconds).max(0.0)
    }
}

/// Most-recent-first sequence of samples with FIFO eviction
#[derive(Debug, Clone)]
pub struct ScentTrail {
    samples: VecDeque<ScentSample>,
    capacity: usize,
}

impl ScentTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(256)),
            capacity: capacity.max(1),
        }
    }

    /// Insert at the head, dropping the oldest sample on overflow
    pub fn push(&mut self, sample: ScentSample) -> Option<ScentSample> {
        self.samples.push_front(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_back()
        } else {
            None
        }
    }

    /// Index 0 is the freshest sample
    pub fn get(&self, index: usize) -> Option<&ScentSample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScentSample> {
        self.samples.iter()
    }

    pub fn position_of(&self, sample: &ScentSample) -> Option<usize> {
        self.samples.iter().position(|s| s == sample)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop samples older than `max_age`; returns how many were removed
    pub fn prune_older_than(&mut self, now: Tick, max_age: Tick) -> usize {
        let before = self.samples.len();
        self.samples.retain(|s| s.age(now) <= max_age);
        before - self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use proptest::prelude::*;

    fn sample(i: i32, tick: Tick) -> ScentSample {
        ScentSample::new(IVec3::new(i, 0, 0), tick, 10.0)
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut trail = ScentTrail::new(100);
        for i in 0..100 {
            assert!(trail.push(sample(i, i as Tick)).is_none());
        }
        assert_eq!(trail.len(), 100);
        let oldest = *trail.get(99).expect("full trail");

        let evicted = trail.push(sample(100, 100));
        assert_eq!(evicted, Some(oldest));
        assert_eq!(trail.len(), 100);
        assert_eq!(trail.get(0).map(|s| s.position), Some(IVec3::new(100, 0, 0)));
        assert_eq!(trail.get(99).map(|s| s.position), Some(IVec3::new(1, 0, 0)));
    }

    #[test]
    fn test_intensity_decays_per_second() {
        let s = sample(0, 0);
        assert_eq!(s.intensity_at(0, 0.1, 20), 10.0);
        assert!((s.intensity_at(200, 0.1, 20) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_intensity_floored_at_zero() {
        let s = sample(0, 0);
        assert_eq!(s.intensity_at(1_000_000, 0.1, 20), 0.0);
    }

    #[test]
    fn test_prune_keeps_recent() {
        let mut trail = ScentTrail::new(10);
        trail.push(sample(0, 0));
        trail.push(sample(1, 500));
        let removed = trail.prune_older_than(1000, 600);
        assert_eq!(removed, 1);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.get(0).map(|s| s.created_at), Some(500));
    }

    proptest! {
        #[test]
        fn proptest_trail_never_exceeds_capacity(capacity in 1usize..64, inserts in 0usize..300) {
            let mut trail = ScentTrail::new(capacity);
            for i in 0..inserts {
                trail.push(sample(i as i32, i as Tick));
                prop_assert!(trail.len() <= capacity);
            }
            // Retained samples are exactly the newest, in reverse insertion order
            for (index, s) in trail.iter().enumerate() {
                prop_assert_eq!(s.position.x as usize, inserts - 1 - index);
            }
        }

        #[test]
        fn proptest_intensity_non_increasing(
            initial in 0.0f64..50.0,
            decay in 0.0f64..5.0,
            t1 in 0u64..100_000,
            dt in 0u64..100_000,
        ) {
            let s = ScentSample::new(IVec3::ZERO, 0, initial);
            let earlier = s.intensity_at(t1, decay, 20);
            let later = s.intensity_at(t1 + dt, decay, 20);
            prop_assert!(later <= earlier);
            prop_assert!(later >= 0.0);
        }
    }
}
