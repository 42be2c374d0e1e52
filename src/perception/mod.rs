//! Hearing, sight and smell, fused into one focus

pub mod context;
pub mod focus;
pub mod hearing;
pub mod sight;
pub mod smell;

pub use context::PerceptionContext;
pub use focus::PerceptionFocus;
pub use hearing::{ListeningState, SoundPerception};
pub use sight::SightReport;
pub use smell::{SmellState, SmellTarget};
