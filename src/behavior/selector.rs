//! Priority goal scheduler
//!
//! Every tick: stop goals that no longer hold, start the highest-priority
//! startable goals (preempting conflicting lower ones), then tick whatever
//! is running. Equal priority never preempts.

use crate::behavior::{Behavior, Controls, GoalContext, GoalKind};

#[derive(Debug)]
struct GoalSlot {
    priority: u8,
    behavior: Behavior,
    running: bool,
}

#[derive(Debug, Default)]
pub struct GoalSelector {
    slots: Vec<GoalSlot>,
}

impl GoalSelector {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a goal; later additions at equal priority sort after earlier ones
    pub fn add(&mut self, priority: u8, behavior: Behavior) {
        let pos = self
            .slots
            .iter()
            .position(|slot| priority < slot.priority)
            .unwrap_or(self.slots.len());
        self.slots.insert(
            pos,
            GoalSlot {
                priority,
                behavior,
                running: false,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, kind: GoalKind) -> bool {
        self.slots.iter().any(|slot| slot.behavior.kind() == kind)
    }

    /// Highest-priority running goal
    pub fn active_goal(&self) -> Option<GoalKind> {
        self.slots
            .iter()
            .find(|slot| slot.running)
            .map(|slot| slot.behavior.kind())
    }

    pub fn is_running(&self, kind: GoalKind) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.running && slot.behavior.kind() == kind)
    }

    pub fn running_goals(&self) -> Vec<GoalKind> {
        self.slots
            .iter()
            .filter(|slot| slot.running)
            .map(|slot| slot.behavior.kind())
            .collect()
    }

    pub fn tick(&mut self, ctx: &mut GoalContext<'_>) {
        for slot in self.slots.iter_mut().filter(|s| s.running) {
            if !slot.behavior.should_continue(ctx) {
                tracing::debug!(goal = %slot.behavior.kind(), "Goal finished");
                slot.behavior.stop(ctx);
                slot.running = false;
            }
        }

        for i in 0..self.slots.len() {
            if self.slots[i].running {
                continue;
            }
            let priority = self.slots[i].priority;
            let controls = self.slots[i].behavior.controls();
            if self.blocked_by_running(i, priority, controls) {
                continue;
            }
            if !self.slots[i].behavior.can_start(ctx) {
                continue;
            }
            self.preempt_conflicts(i, controls, ctx);
            let slot = &mut self.slots[i];
            tracing::debug!(goal = %slot.behavior.kind(), priority, "Goal started");
            slot.behavior.start(ctx);
            slot.running = true;
        }

        for slot in self.slots.iter_mut().filter(|s| s.running) {
            slot.behavior.tick(ctx);
        }
    }

    /// Stop every running goal, e.g. before the agent is discarded
    pub fn stop_all(&mut self, ctx: &mut GoalContext<'_>) {
        for slot in self.slots.iter_mut().filter(|s| s.running) {
            slot.behavior.stop(ctx);
            slot.running = false;
        }
    }

    fn blocked_by_running(&self, index: usize, priority: u8, controls: Controls) -> bool {
        self.slots.iter().enumerate().any(|(j, other)| {
            j != index
                && other.running
                && other.priority <= priority
                && other.behavior.controls().conflicts_with(controls)
        })
    }

    fn preempt_conflicts(&mut self, index: usize, controls: Controls, ctx: &mut GoalContext<'_>) {
        for (j, other) in self.slots.iter_mut().enumerate() {
            if j != index && other.running && other.behavior.controls().conflicts_with(controls) {
                tracing::debug!(goal = %other.behavior.kind(), "Goal preempted");
                other.behavior.stop(ctx);
                other.running = false;
            }
        }
    }
}
