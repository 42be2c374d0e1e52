//! In-memory voxel world
//!
//! A small reference host: a set of solid blocks, connected subjects, and
//! agent bodies that walk in straight lines toward their navigation target.
//! Uses a HashSet for O(1) solidity lookup.

use ahash::AHashSet;
use glam::{DVec3, IVec3};

use crate::core::types::{block_of, AgentBody, AgentHandle, BlockPos, Subject, SubjectId, Tick};
use crate::world::environment::{Environment, EnvironmentError};

/// Eye offset of a spawned agent body
pub const AGENT_EYE_HEIGHT: f64 = 1.7;

/// Blocks walked per tick at speed 1.0
pub const WALK_SPEED_PER_TICK: f64 = 0.25;

/// Line of sight sampling step along a segment
const RAY_STEP: f64 = 0.1;

#[derive(Debug, Clone)]
struct AgentRecord {
    position: DVec3,
    facing: DVec3,
    alive: bool,
    nav_target: Option<BlockPos>,
    speed: f64,
    look_target: Option<DVec3>,
}

#[derive(Debug, Clone, Default)]
pub struct VoxelWorld {
    solid: AHashSet<BlockPos>,
    subjects: Vec<Subject>,
    agents: Vec<AgentRecord>,
    tick: Tick,
    query_failure: bool,
}

/// Feet position of a body standing in `block`
pub fn standing_point(block: BlockPos) -> DVec3 {
    DVec3::new(block.x as f64 + 0.5, block.y as f64, block.z as f64 + 0.5)
}

impl VoxelWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_solid(&mut self, block: BlockPos) {
        self.solid.insert(block);
    }

    pub fn clear_block(&mut self, block: BlockPos) {
        self.solid.remove(&block);
    }

    pub fn is_solid(&self, block: BlockPos) -> bool {
        self.solid.contains(&block)
    }

    /// Fill an inclusive box of blocks
    pub fn fill(&mut self, min: BlockPos, max: BlockPos) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.solid.insert(IVec3::new(x, y, z));
                }
            }
        }
    }

    /// Flat floor one block thick whose top surface is at `y + 1`
    pub fn floor(&mut self, y: i32, half_extent: i32) {
        self.fill(
            IVec3::new(-half_extent, y, -half_extent),
            IVec3::new(half_extent, y, half_extent),
        );
    }

    pub fn solid_count(&self) -> usize {
        self.solid.len()
    }

    /// Make every following query fail, as a broken host would
    pub fn set_query_failure(&mut self, failing: bool) {
        self.query_failure = failing;
    }

    pub fn add_subject(&mut self, subject: Subject) {
        self.remove_subject(subject.id);
        self.subjects.push(subject);
    }

    pub fn remove_subject(&mut self, id: SubjectId) -> Option<Subject> {
        let index = self.subjects.iter().position(|s| s.id == id)?;
        Some(self.subjects.remove(index))
    }

    pub fn subject_mut(&mut self, id: SubjectId) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| s.id == id)
    }

    /// Teleport a subject and record the displacement as its velocity
    pub fn move_subject(&mut self, id: SubjectId, position: DVec3) {
        if let Some(subject) = self.subject_mut(id) {
            subject.velocity = position - subject.position;
            subject.teleport(position);
        }
    }

    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    /// Advance one tick and walk every agent toward its target
    pub fn advance(&mut self) {
        self.tick += 1;
        for agent in self.agents.iter_mut().filter(|a| a.alive) {
            let Some(target) = agent.nav_target else {
                continue;
            };
            let goal = standing_point(target);
            let delta = goal - agent.position;
            let distance = delta.length();
            let step = agent.speed * WALK_SPEED_PER_TICK;
            if distance <= step {
                agent.position = goal;
                agent.nav_target = None;
            } else {
                agent.position += delta / distance * step;
                agent.facing = delta / distance;
            }
        }
    }

    pub fn kill_agent(&mut self, handle: AgentHandle) {
        if let Some(agent) = self.agents.get_mut(handle.0 as usize) {
            agent.alive = false;
            agent.nav_target = None;
        }
    }

    pub fn place_agent(&mut self, handle: AgentHandle, position: DVec3) {
        if let Some(agent) = self.agents.get_mut(handle.0 as usize) {
            agent.position = position;
        }
    }

    pub fn look_target(&self, handle: AgentHandle) -> Option<DVec3> {
        self.agents.get(handle.0 as usize).and_then(|a| a.look_target)
    }

    pub fn facing(&self, handle: AgentHandle) -> Option<DVec3> {
        self.agents.get(handle.0 as usize).map(|a| a.facing)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    fn live_agent(&self, handle: AgentHandle) -> Option<&AgentRecord> {
        self.agents.get(handle.0 as usize).filter(|a| a.alive)
    }
}

impl Environment for VoxelWorld {
    fn is_occluding_at(&self, block: BlockPos) -> Result<bool, EnvironmentError> {
        if self.query_failure {
            return Err(EnvironmentError::Unloaded(block));
        }
        Ok(self.is_solid(block))
    }

    fn has_clear_path(&self, from: DVec3, to: DVec3) -> Result<bool, EnvironmentError> {
        if self.query_failure {
            return Err(EnvironmentError::Raycast("host query failure".to_string()));
        }

        let start = block_of(from);
        let end = block_of(to);
        let delta = to - from;
        let length = delta.length();
        let steps = (length / RAY_STEP).ceil() as u32;

        for i in 1..steps {
            let point = from + delta * (i as f64 / steps as f64);
            let block = block_of(point);
            if block != start && block != end && self.is_solid(block) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn footprint_open_at(&self, block: BlockPos) -> bool {
        !self.is_solid(block) && !self.is_solid(block + IVec3::Y) && !self.is_solid(block + IVec3::Y * 2)
    }

    fn ground_solid_below(&self, block: BlockPos) -> bool {
        self.is_solid(block - IVec3::Y)
    }

    fn nearby_subjects(&self, center: DVec3, radius: f64) -> Vec<Subject> {
        let radius_sq = radius * radius;
        self.subjects
            .iter()
            .filter(|s| s.position.distance_squared(center) <= radius_sq)
            .cloned()
            .collect()
    }

    fn subjects(&self) -> Vec<Subject> {
        self.subjects.clone()
    }

    fn current_tick(&self) -> Tick {
        self.tick
    }

    fn is_alive(&self, handle: AgentHandle) -> bool {
        self.live_agent(handle).is_some()
    }

    fn agent_body(&self, handle: AgentHandle) -> Option<AgentBody> {
        self.live_agent(handle).map(|a| AgentBody {
            position: a.position,
            eye_position: a.position + DVec3::new(0.0, AGENT_EYE_HEIGHT, 0.0),
        })
    }

    fn navigation_idle(&self, handle: AgentHandle) -> bool {
        self.live_agent(handle).map_or(true, |a| a.nav_target.is_none())
    }

    fn navigation_target(&self, handle: AgentHandle) -> Option<BlockPos> {
        self.live_agent(handle).and_then(|a| a.nav_target)
    }

    fn request_move_to(&mut self, handle: AgentHandle, target: BlockPos, speed: f64) -> bool {
        if self.is_solid(target) {
            return false;
        }
        match self.agents.get_mut(handle.0 as usize) {
            Some(agent) if agent.alive => {
                agent.nav_target = Some(target);
                agent.speed = speed;
                true
            }
            _ => false,
        }
    }

    fn request_look_at(&mut self, handle: AgentHandle, point: DVec3) {
        if let Some(agent) = self.agents.get_mut(handle.0 as usize) {
            agent.look_target = Some(point);
        }
    }

    fn cancel_movement(&mut self, handle: AgentHandle) {
        if let Some(agent) = self.agents.get_mut(handle.0 as usize) {
            agent.nav_target = None;
        }
    }

    fn spawn_agent_at(&mut self, block: BlockPos, facing: DVec3) -> AgentHandle {
        let handle = AgentHandle(self.agents.len() as u64);
        self.agents.push(AgentRecord {
            position: standing_point(block),
            facing,
            alive: true,
            nav_target: None,
            speed: 0.0,
            look_target: None,
        });
        handle
    }
}
