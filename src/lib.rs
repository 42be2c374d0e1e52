//! Deep Dweller - perception-driven cave stalker simulation core
//!
//! A single hunting agent hears, sees and smells subjects moving through a
//! voxel world, fuses what it perceives into one focus, and acts on it
//! through a priority goal stack. The host world is reached only through
//! the `world::Environment` trait.

pub mod alert;
pub mod behavior;
pub mod core;
pub mod entity;
pub mod perception;
pub mod scent;
pub mod simulation;
pub mod spawn;
pub mod world;
