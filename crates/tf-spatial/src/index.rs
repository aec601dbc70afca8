//! Per-tick neighbour index over agent positions.
//!
//! Rebuilt once per tick with `RTree::bulk_load` (cheaper than incremental
//! updates when most agents moved).  Results are sorted by id so callers that
//! fold over neighbours stay deterministic.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use tf_core::{EntityId, Vec2};

#[derive(Copy, Clone, Debug, PartialEq)]
struct IndexedPoint {
    point: [f32; 2],
    id:    EntityId,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

#[derive(Debug, Default)]
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents.
    pub fn rebuild<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (EntityId, Vec2)>,
    {
        let entries: Vec<IndexedPoint> = points
            .into_iter()
            .filter(|(_, p)| p.is_finite())
            .map(|(id, p)| IndexedPoint { point: p.to_array(), id })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Every entry within `radius` of `center` (inclusive), ascending by id.
    pub fn within_radius(&self, center: Vec2, radius: f32) -> Vec<(EntityId, Vec2)> {
        let mut out: Vec<(EntityId, Vec2)> = self
            .tree
            .locate_within_distance(center.to_array(), radius * radius)
            .map(|e| (e.id, Vec2::new(e.point[0], e.point[1])))
            .collect();
        out.sort_unstable_by_key(|(id, _)| *id);
        out
    }

    /// Like [`within_radius`](Self::within_radius) but without `exclude`.
    pub fn neighbours(&self, exclude: EntityId, center: Vec2, radius: f32) -> Vec<(EntityId, Vec2)> {
        let mut out = self.within_radius(center, radius);
        out.retain(|(id, _)| *id != exclude);
        out
    }

    /// Closest entry to `center`.  Equidistant entries resolve to the lowest id.
    pub fn nearest(&self, center: Vec2) -> Option<(EntityId, Vec2)> {
        let query = center.to_array();
        let first = self.tree.nearest_neighbor(&query)?;
        let best = first.distance_2(&query);
        let winner = self
            .tree
            .locate_within_distance(query, best)
            .fold(first, |acc, e| if e.id < acc.id { e } else { acc });
        Some((winner.id, Vec2::new(winner.point[0], winner.point[1])))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
