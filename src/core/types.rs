//! Core type definitions used throughout the codebase

use glam::{DVec3, IVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for perceived subjects (players)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub Uuid);

impl SubjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The reserved "no subject" identity
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_nil()
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Integer voxel coordinate
pub type BlockPos = IVec3;

/// Index handle for a spawned agent body
///
/// Holding a handle says nothing about liveness; ask the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentHandle(pub u64);

/// Voxel containing a world position
pub fn block_of(pos: DVec3) -> BlockPos {
    pos.floor().as_ivec3()
}

/// Center point of a voxel
pub fn block_center(block: BlockPos) -> DVec3 {
    block.as_dvec3() + DVec3::splat(0.5)
}

/// Manhattan distance between two voxels
pub fn manhattan(a: BlockPos, b: BlockPos) -> i32 {
    let d = (a - b).abs();
    d.x + d.y + d.z
}

/// Offset of length `distance` in a random direction
///
/// Heading and pitch are drawn uniformly, so points cluster toward the poles.
pub fn sphere_offset<R: Rng>(rng: &mut R, distance: f64) -> DVec3 {
    let heading = rng.gen::<f64>() * std::f64::consts::TAU;
    let pitch = rng.gen::<f64>() * std::f64::consts::PI - std::f64::consts::FRAC_PI_2;
    DVec3::new(
        heading.cos() * pitch.cos() * distance,
        pitch.sin() * distance,
        heading.sin() * pitch.cos() * distance,
    )
}

/// Snapshot of a perceived subject as reported by the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    /// Feet position
    pub position: DVec3,
    pub eye_position: DVec3,
    /// Blocks per tick
    pub velocity: DVec3,
    pub sneaking: bool,
    pub sprinting: bool,
    /// Standing in water or rain
    pub wet: bool,
    pub alive: bool,
    /// Creative/spectator style modes the agent must ignore
    pub observer: bool,
}

impl Subject {
    /// Standing eye height of a subject
    pub const EYE_HEIGHT: f64 = 1.62;

    pub fn new(id: SubjectId, position: DVec3) -> Self {
        Self {
            id,
            position,
            eye_position: position + DVec3::new(0.0, Self::EYE_HEIGHT, 0.0),
            velocity: DVec3::ZERO,
            sneaking: false,
            sprinting: false,
            wet: false,
            alive: true,
            observer: false,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn sneaking(mut self) -> Self {
        self.sneaking = true;
        self
    }

    pub fn sprinting(mut self) -> Self {
        self.sprinting = true;
        self
    }

    pub fn wet(mut self) -> Self {
        self.wet = true;
        self
    }

    pub fn as_observer(mut self) -> Self {
        self.observer = true;
        self
    }

    /// Move feet and eyes together
    pub fn teleport(&mut self, position: DVec3) {
        let eye_offset = self.eye_position - self.position;
        self.position = position;
        self.eye_position = position + eye_offset;
    }

    pub fn block(&self) -> BlockPos {
        block_of(self.position)
    }

    /// Whether perception channels may consider this subject at all
    pub fn is_perceivable(&self) -> bool {
        self.alive && !self.observer && self.id.is_valid()
    }
}

/// Position and eye position of a live agent body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentBody {
    pub position: DVec3,
    pub eye_position: DVec3,
}
