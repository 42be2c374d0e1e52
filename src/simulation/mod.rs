//! Event intake and the per-tick driver

pub mod director;
pub mod events;

pub use director::{Director, PursuitFactory};
pub use events::SubjectEvent;
