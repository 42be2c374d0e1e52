//! Host-provided chase behavior
//!
//! The agent only raises the chase flag and keeps the focus current; what a
//! chase looks like is left to the host. A registered pursuit sits in the
//! top goal slot and is only consulted while chase is engaged.

use std::fmt::Debug;

use crate::behavior::GoalContext;

pub trait Pursuit: Debug {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Called only while chase is engaged
    fn can_start(&mut self, ctx: &mut GoalContext<'_>) -> bool;

    /// Called only while chase is engaged; the goal stops when chase ends
    fn should_continue(&mut self, ctx: &mut GoalContext<'_>) -> bool;

    fn start(&mut self, ctx: &mut GoalContext<'_>);

    fn tick(&mut self, ctx: &mut GoalContext<'_>);

    /// Must release any navigation the pursuit requested
    fn stop(&mut self, ctx: &mut GoalContext<'_>);
}
