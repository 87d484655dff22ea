//! Collision detection and pass-through scoring
//!
//! Plain axis-aligned boxes: the agent box against both rectangles of every
//! obstacle pair, plus the ground line and (optionally) the ceiling.

use serde::{Deserialize, Serialize};

use super::body::FlightBody;
use super::geometry::Rect;
use super::obstacles::{ObstaclePool, PairId};
use crate::config::GameConfig;

/// What the agent ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    Obstacle(PairId),
    Ground,
    Ceiling,
}

/// Result of evaluating one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    None,
    /// Ends the run; nothing else from this step is applied
    Collision(CollisionKind),
    /// Pairs whose trailing edge just passed the agent, oldest first
    Scored(Vec<PairId>),
}

/// Vertical limits of the playfield
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorldBounds {
    /// y of the ground line
    pub ground_y: f32,
    pub lethal_ceiling: bool,
}

impl WorldBounds {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            ground_y: config.ground_y(),
            lethal_ceiling: config.lethal_ceiling,
        }
    }
}

/// Does the agent box touch a world boundary?
pub fn bounds_collision(agent: &Rect, bounds: &WorldBounds) -> Option<CollisionKind> {
    if agent.max.y >= bounds.ground_y {
        return Some(CollisionKind::Ground);
    }
    if bounds.lethal_ceiling && agent.min.y <= 0.0 {
        return Some(CollisionKind::Ceiling);
    }
    None
}

/// First pair (front to back) with an obstacle overlapping the agent box
pub fn obstacle_collision(agent: &Rect, pool: &ObstaclePool) -> Option<PairId> {
    pool.rects()
        .find(|(_, upper, lower)| agent.overlaps(upper) || agent.overlaps(lower))
        .map(|(id, _, _)| id)
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionScorer {
    bounds: WorldBounds,
}

impl CollisionScorer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            bounds: WorldBounds::from_config(config),
        }
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    /// Test the agent against the world, then score passed pairs.
    ///
    /// Collision is checked first; if it fires, no pair is marked scored.
    /// A pair already marked scored is never reported again.
    pub fn evaluate(&self, body: &FlightBody, pool: &mut ObstaclePool) -> Verdict {
        let agent = body.bounds();

        if let Some(id) = obstacle_collision(&agent, pool) {
            return Verdict::Collision(CollisionKind::Obstacle(id));
        }
        if let Some(kind) = bounds_collision(&agent, &self.bounds) {
            return Verdict::Collision(kind);
        }

        let width = pool.obstacle_width();
        let agent_x = body.pos.x;
        let scored: Vec<PairId> = pool
            .pairs_mut()
            .filter(|p| !p.scored && p.trailing_edge(width) < agent_x)
            .filter_map(|p| p.mark_scored().then_some(p.id))
            .collect();

        if scored.is_empty() {
            Verdict::None
        } else {
            Verdict::Scored(scored)
        }
    }
}
