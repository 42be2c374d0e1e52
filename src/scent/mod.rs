//! Scent trails left by moving subjects

pub mod store;
pub mod trail;

pub use store::ScentStore;
pub use trail::{ScentSample, ScentTrail};
