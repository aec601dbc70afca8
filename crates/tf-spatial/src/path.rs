//! Pathfinding capability trait and a line-of-sight reference pathfinder.
//!
//! # Contract
//!
//! [`Pathfinder::request_path`] is non-blocking and returns the next waypoint
//! toward the target.  `None` means "no path yet", never a failure: the
//! movement phase applies its fallback policy and asks again at its next
//! cadence.
//!
//! # DirectPathfinder
//!
//! Obstacles are axis-aligned rectangles in an R-tree.  A segment query first
//! collects rectangles whose envelope intersects the segment's bounding box,
//! then runs an exact slab test on each.  The agent footprint is handled by
//! inflating every rectangle by half the agent's width and height.
//!
//! When the straight line is blocked, the pathfinder tries the four corners
//! of the nearest blocking rectangle and returns the visible corner with the
//! shortest start→corner→target length.  The chosen corner is cached per
//! agent until it is reached, the target moves away, or
//! [`Pathfinder::invalidate_path`] is called.

use rstar::{AABB, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use tracing::trace;

use tf_core::{EntityId, Vec2};

/// The pathfinding capability as consumed by the movement phase.
pub trait Pathfinder {
    /// Next waypoint from `start` toward `target` for a body of the given
    /// footprint, or `None` while no path is available.
    fn request_path(
        &mut self,
        agent:  EntityId,
        start:  Vec2,
        target: Vec2,
        width:  f32,
        height: f32,
    ) -> Option<Vec2>;

    fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool;

    /// Drop any cached route for `agent`.
    fn invalidate_path(&mut self, agent: EntityId);
}

impl<P: Pathfinder + ?Sized> Pathfinder for Box<P> {
    fn request_path(
        &mut self,
        agent:  EntityId,
        start:  Vec2,
        target: Vec2,
        width:  f32,
        height: f32,
    ) -> Option<Vec2> {
        (**self).request_path(agent, start, target, width, height)
    }
    fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        (**self).has_line_of_sight(from, to)
    }
    fn invalidate_path(&mut self, agent: EntityId) {
        (**self).invalidate_path(agent)
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

/// An axis-aligned blocking rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub min: Vec2,
    pub max: Vec2,
}

impl Obstacle {
    /// Rectangle spanning `a` and `b` in any corner order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width * 0.5, height * 0.5);
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Grown by `hx` / `hy` on each side.
    pub fn inflated(&self, hx: f32, hy: f32) -> Obstacle {
        Obstacle {
            min: Vec2::new(self.min.x - hx, self.min.y - hy),
            max: Vec2::new(self.max.x + hx, self.max.y + hy),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    /// Slab test: does segment `a → b` touch this rectangle?
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        let d = b - a;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;
        for (p, dp, lo, hi) in [
            (a.x, d.x, self.min.x, self.max.x),
            (a.y, d.y, self.min.y, self.max.y),
        ] {
            if dp.abs() < f32::EPSILON {
                if p < lo || p > hi {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / dp;
            let (mut t0, mut t1) = ((lo - p) * inv, (hi - p) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return false;
            }
        }
        true
    }
}

impl RTreeObject for Obstacle {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min.to_array(), self.max.to_array())
    }
}

/// R-tree of static obstacles.
#[derive(Debug, Default)]
pub struct ObstacleMap {
    tree: RTree<Obstacle>,
}

impl ObstacleMap {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { tree: RTree::bulk_load(obstacles) }
    }

    pub fn insert(&mut self, obstacle: Obstacle) {
        self.tree.insert(obstacle);
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Obstacles (inflated by `hx`/`hy`) that segment `a → b` crosses.
    fn blockers(&self, a: Vec2, b: Vec2, hx: f32, hy: f32) -> impl Iterator<Item = Obstacle> + '_ {
        let query = AABB::from_corners(
            [a.x.min(b.x) - hx, a.y.min(b.y) - hy],
            [a.x.max(b.x) + hx, a.y.max(b.y) + hy],
        );
        self.tree
            .locate_in_envelope_intersecting(&query)
            .map(move |o| o.inflated(hx, hy))
            .filter(move |o| o.intersects_segment(a, b))
    }

    /// `true` if a body of half-extent `hx`/`hy` can travel `a → b` in a
    /// straight line.
    pub fn is_clear(&self, a: Vec2, b: Vec2, hx: f32, hy: f32) -> bool {
        self.blockers(a, b, hx, hy).next().is_none()
    }

    /// `true` if `p` lies inside any (inflated) obstacle.
    pub fn is_blocked(&self, p: Vec2, hx: f32, hy: f32) -> bool {
        let query = AABB::from_corners([p.x - hx, p.y - hy], [p.x + hx, p.y + hy]);
        self.tree
            .locate_in_envelope_intersecting(&query)
            .any(|o| o.inflated(hx, hy).contains(p))
    }

    /// The crossing obstacle whose center is closest to `a`.
    fn nearest_blocker(&self, a: Vec2, b: Vec2, hx: f32, hy: f32) -> Option<Obstacle> {
        self.blockers(a, b, hx, hy)
            .min_by(|l, r| a.distance_squared(l.center()).total_cmp(&a.distance_squared(r.center())))
    }
}

// ── DirectPathfinder ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct CachedWaypoint {
    target:   Vec2,
    waypoint: Vec2,
}

/// Line-of-sight pathfinder with single-corner detours.
#[derive(Debug, Default)]
pub struct DirectPathfinder {
    obstacles: ObstacleMap,
    cache:     FxHashMap<EntityId, CachedWaypoint>,
}

impl DirectPathfinder {
    /// Clearance kept between a detour corner and the inflated obstacle.
    const CORNER_MARGIN: f32 = 4.0;
    /// A cached detour is dropped once the target moves this far.
    const REPLAN_DISTANCE: f32 = 32.0;

    pub fn new(obstacles: ObstacleMap) -> Self {
        Self { obstacles, cache: FxHashMap::default() }
    }

    pub fn obstacles(&self) -> &ObstacleMap {
        &self.obstacles
    }

    /// Number of agents with a cached detour.
    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }

    fn detour(&self, start: Vec2, target: Vec2, hx: f32, hy: f32) -> Option<Vec2> {
        let blocker = self.obstacles.nearest_blocker(start, target, hx, hy)?;
        let ring = blocker.inflated(Self::CORNER_MARGIN, Self::CORNER_MARGIN);
        ring.corners()
            .into_iter()
            .filter(|&c| !self.obstacles.is_blocked(c, hx, hy))
            .filter(|&c| self.obstacles.is_clear(start, c, hx, hy))
            .map(|c| (c, start.distance(c) + c.distance(target)))
            .min_by(|l, r| l.1.total_cmp(&r.1))
            .map(|(c, _)| c)
    }
}

impl Pathfinder for DirectPathfinder {
    fn request_path(
        &mut self,
        agent:  EntityId,
        start:  Vec2,
        target: Vec2,
        width:  f32,
        height: f32,
    ) -> Option<Vec2> {
        let (hx, hy) = (width * 0.5, height * 0.5);

        if self.obstacles.is_clear(start, target, hx, hy) {
            self.cache.remove(&agent);
            return Some(target);
        }

        if let Some(cached) = self.cache.get(&agent) {
            let arrived = start.distance(cached.waypoint) <= hx.max(hy).max(1.0);
            let target_moved = cached.target.distance(target) > Self::REPLAN_DISTANCE;
            if !arrived && !target_moved && self.obstacles.is_clear(start, cached.waypoint, hx, hy) {
                return Some(cached.waypoint);
            }
        }

        match self.detour(start, target, hx, hy) {
            Some(waypoint) => {
                trace!(agent = %agent, %waypoint, "detour waypoint");
                self.cache.insert(agent, CachedWaypoint { target, waypoint });
                Some(waypoint)
            }
            None => {
                self.cache.remove(&agent);
                None
            }
        }
    }

    fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        self.obstacles.is_clear(from, to, 0.0, 0.0)
    }

    fn invalidate_path(&mut self, agent: EntityId) {
        self.cache.remove(&agent);
    }
}
