//! Host world seam and the in-memory reference world

pub mod environment;
pub mod voxel;

pub use environment::{clear_path_or_blocked, occluding_or_solid, Environment, EnvironmentError};
pub use voxel::VoxelWorld;
