//! Population gate and spawn-time target selection

pub mod gate;
pub mod target;

pub use gate::{SpawnGate, SpawnOutcome};
pub use target::select_initial_target;
