//! Obstacle pairs and the bounded pool that recycles them
//!
//! Pairs live in creation order, which is also left-to-right screen order
//! because every pair spawns at the same x and moves at the same speed. That
//! makes the front of the queue both the oldest and the leftmost pair.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::config::GameConfig;

/// Stable ordinal of an obstacle pair, never reused within a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairId(pub u64);

/// Why a pair left the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictReason {
    /// Scrolled fully past the left edge
    OffScreen,
    /// Pool exceeded its pair capacity
    Capacity,
}

/// Something the pool did during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Spawned(PairId),
    Evicted { id: PairId, reason: EvictReason },
}

/// An upper and a lower obstacle sharing one x position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstaclePair {
    pub id: PairId,
    /// Bottom edge of the upper obstacle
    pub top_bottom_edge: f32,
    /// Top edge of the lower obstacle
    pub gap_top_edge: f32,
    /// Left (leading) edge
    pub x: f32,
    pub scored: bool,
}

impl ObstaclePair {
    /// Right edge; once it is behind the agent the pair counts as passed
    #[inline]
    pub fn trailing_edge(&self, width: f32) -> f32 {
        self.x + width
    }

    pub fn upper_rect(&self, width: f32) -> Rect {
        Rect::new(
            Vec2::new(self.x, 0.0),
            Vec2::new(self.x + width, self.top_bottom_edge),
        )
    }

    /// The lower obstacle reaches down to the ground line
    pub fn lower_rect(&self, width: f32, ground_y: f32) -> Rect {
        Rect::new(
            Vec2::new(self.x, self.gap_top_edge),
            Vec2::new(self.x + width, ground_y),
        )
    }

    /// Flip the scored flag. Returns false if it was already set.
    pub fn mark_scored(&mut self) -> bool {
        if self.scored {
            return false;
        }
        self.scored = true;
        true
    }
}

/// Pool parameters copied out of [`GameConfig`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PoolParams {
    spawn_x: f32,
    speed: f32,
    width: f32,
    gap: f32,
    gap_min_y: f32,
    gap_max_y: f32,
    gap_max_allowed: f32,
    ground_y: f32,
    max_pairs: usize,
    spawn_interval_steps: u64,
}

/// Bounded FIFO of obstacle pairs with a seeded gap generator
#[derive(Debug, Clone)]
pub struct ObstaclePool {
    pairs: VecDeque<ObstaclePair>,
    rng: Pcg32,
    /// Fixed steps since the last spawn (or since the timer started)
    steps_since_spawn: u64,
    next_id: u64,
    params: PoolParams,
}

impl ObstaclePool {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let params = PoolParams {
            spawn_x: config.viewport_width,
            speed: config.obstacle_speed,
            width: config.obstacle_width,
            gap: config.gap,
            gap_min_y: config.gap_min_y,
            gap_max_y: config.gap_max_y,
            gap_max_allowed: config.gap_max_allowed,
            ground_y: config.ground_y(),
            max_pairs: config.max_pairs,
            spawn_interval_steps: config.spawn_interval_steps(),
        };
        Self {
            pairs: VecDeque::with_capacity(config.max_pairs + 1),
            rng: Pcg32::seed_from_u64(seed),
            steps_since_spawn: 0,
            next_id: 1,
            params,
        }
    }

    /// Advance one fixed step: move, spawn when due, then evict.
    ///
    /// Only called while playing, so the spawn timer is paused otherwise.
    pub fn step(&mut self, dt: f32) -> Vec<PoolEvent> {
        let mut events = Vec::new();

        let dx = self.params.speed * dt;
        for pair in &mut self.pairs {
            pair.x -= dx;
        }

        self.steps_since_spawn += 1;
        if self.steps_since_spawn >= self.params.spawn_interval_steps {
            self.steps_since_spawn -= self.params.spawn_interval_steps;
            let id = self.spawn();
            events.push(PoolEvent::Spawned(id));
        }

        self.evict(&mut events);
        events
    }

    /// Create one pair at the right viewport edge
    pub fn spawn(&mut self) -> PairId {
        let (top_bottom_edge, gap_top_edge) = self.draw_gap();
        let id = PairId(self.next_id);
        self.next_id += 1;
        self.pairs.push_back(ObstaclePair {
            id,
            top_bottom_edge,
            gap_top_edge,
            x: self.params.spawn_x,
            scored: false,
        });
        log::debug!(
            "Spawned pair {} (gap {:.1}..{:.1})",
            id.0,
            top_bottom_edge,
            gap_top_edge
        );
        id
    }

    /// Pick the gap: upper edge uniform in range, lower edge one gap below but
    /// never past the lowest allowed edge. Near the bottom of the range this
    /// shrinks the gap instead of redrawing.
    fn draw_gap(&mut self) -> (f32, f32) {
        let p = &self.params;
        let top_bottom_edge = if p.gap_max_y > p.gap_min_y {
            self.rng.random_range(p.gap_min_y..=p.gap_max_y)
        } else {
            p.gap_min_y
        };
        let gap_top_edge = (top_bottom_edge + p.gap).min(p.gap_max_allowed);
        (top_bottom_edge, gap_top_edge)
    }

    fn evict(&mut self, events: &mut Vec<PoolEvent>) {
        let width = self.params.width;
        self.pairs.retain(|pair| {
            let visible = pair.trailing_edge(width) >= 0.0;
            if !visible {
                log::debug!("Evicted pair {} (off screen)", pair.id.0);
                events.push(PoolEvent::Evicted {
                    id: pair.id,
                    reason: EvictReason::OffScreen,
                });
            }
            visible
        });

        while self.pairs.len() > self.params.max_pairs {
            if let Some(oldest) = self.pairs.pop_front() {
                log::debug!("Evicted pair {} (capacity)", oldest.id.0);
                events.push(PoolEvent::Evicted {
                    id: oldest.id,
                    reason: EvictReason::Capacity,
                });
            }
        }

        debug_assert!(self.pairs.len() <= self.params.max_pairs);
        debug_assert!(
            self.pairs
                .iter()
                .zip(self.pairs.iter().skip(1))
                .all(|(a, b)| a.id < b.id),
            "pool must stay in creation order"
        );
    }

    /// Drop every pair and restart the spawn timer. The id counter and the
    /// RNG stream keep running so a restarted run stays reproducible.
    pub fn reset(&mut self) {
        self.pairs.clear();
        self.restart_timer();
    }

    /// Start counting a full spawn interval from now
    pub fn restart_timer(&mut self) {
        self.steps_since_spawn = 0;
    }

    pub fn pairs(&self) -> impl Iterator<Item = &ObstaclePair> {
        self.pairs.iter()
    }

    pub fn pairs_mut(&mut self) -> impl Iterator<Item = &mut ObstaclePair> {
        self.pairs.iter_mut()
    }

    pub fn get(&self, id: PairId) -> Option<&ObstaclePair> {
        self.pairs.iter().find(|p| p.id == id)
    }

    /// Number of pairs (each pair is two obstacles)
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of individual obstacle rectangles
    #[inline]
    pub fn obstacle_count(&self) -> usize {
        self.pairs.len() * 2
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.params.max_pairs
    }

    #[inline]
    pub fn obstacle_width(&self) -> f32 {
        self.params.width
    }

    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.params.ground_y
    }

    /// Fixed steps until the next spawn
    pub fn steps_until_spawn(&self) -> u64 {
        self.params.spawn_interval_steps - self.steps_since_spawn
    }

    /// Both obstacle rectangles of every pair, front to back
    pub fn rects(&self) -> impl Iterator<Item = (PairId, Rect, Rect)> + '_ {
        let width = self.params.width;
        let ground_y = self.params.ground_y;
        self.pairs
            .iter()
            .map(move |p| (p.id, p.upper_rect(width), p.lower_rect(width, ground_y)))
    }
}
