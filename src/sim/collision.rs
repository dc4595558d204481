//! Collision detection between circular colliders
//!
//! Broad phase walks the [`SpatialGrid`] with a five-cell forward stencil;
//! narrow phase is an exact circle-circle test. Overlapping pairs highlight
//! both entities and are written to a bounded [`CollisionBuffer`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Tint};
use super::grid::SpatialGrid;

/// Below this center distance the direction between two colliders is undefined
pub const DEGENERATE_DISTANCE: f32 = 1e-5;

/// Cell offsets `(dx, dy)` visited from every cell: itself, right, below,
/// below-right, below-left.
///
/// The other four neighbors (left, above, above-left, above-right) are the
/// mirror images of these and get visited from the other side, so each pair
/// of adjacent-or-same cells is tested exactly once over the whole grid.
pub const FORWARD_STENCIL: [(i64, i64); 5] = [(0, 0), (1, 0), (0, 1), (1, 1), (-1, 1)];

/// One overlapping pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    /// Entity index of the first collider
    pub a: usize,
    /// Entity index of the second collider
    pub b: usize,
    /// Unit vector from `a`'s collider center toward `b`'s
    pub normal: Vec2,
    /// Sum of radii minus center distance (>= 0)
    pub penetration: f32,
}

/// Fixed-capacity record list for one frame
#[derive(Debug, Clone)]
pub struct CollisionBuffer {
    records: Vec<CollisionRecord>,
    capacity: usize,
    truncated: bool,
    overlaps_found: usize,
}

impl CollisionBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            truncated: false,
            overlaps_found: 0,
        }
    }

    /// Forget the previous frame's records and flags
    pub fn clear(&mut self) {
        self.records.clear();
        self.truncated = false;
        self.overlaps_found = 0;
    }

    /// Count an overlapping pair and store it if there is room.
    ///
    /// `make` only runs when the record is kept. Returns whether it was.
    pub fn try_push(&mut self, make: impl FnOnce() -> CollisionRecord) -> bool {
        self.overlaps_found += 1;
        if self.records.len() >= self.capacity {
            self.truncated = true;
            return false;
        }
        self.records.push(make());
        true
    }

    #[inline]
    pub fn records(&self) -> &[CollisionRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether at least one overlapping pair was discarded this frame
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Every overlapping pair seen this frame, stored or not
    #[inline]
    pub fn overlaps_found(&self) -> usize {
        self.overlaps_found
    }
}

/// Boolean overlap test, no square root
#[inline]
pub fn circles_overlap(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    let reach = r1 + r2;
    c1.distance_squared(c2) < reach * reach
}

/// Separation normal and penetration depth for two overlapping circles.
///
/// Coincident centers get the +X axis as their normal. Penetration always uses
/// the true distance, so it is `r1 + r2` in that case.
pub fn circle_contact(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> (Vec2, f32) {
    let delta = c2 - c1;
    let distance = delta.length();
    let normal = if distance <= DEGENERATE_DISTANCE {
        Vec2::X
    } else {
        delta / distance
    };
    (normal, (r1 + r2 - distance).max(0.0))
}

/// Test one candidate pair and record it on overlap
fn test_pair(entities: &mut [Entity], a: usize, b: usize, buffer: &mut CollisionBuffer) {
    let (c1, r1) = (entities[a].collider_center(), entities[a].collider_radius);
    let (c2, r2) = (entities[b].collider_center(), entities[b].collider_radius);
    if !circles_overlap(c1, r1, c2, r2) {
        return;
    }

    // Highlighting does not depend on buffer room
    entities[a].sprite.tint = Tint::Colliding;
    entities[b].sprite.tint = Tint::Colliding;

    buffer.try_push(|| {
        let (normal, penetration) = circle_contact(c1, r1, c2, r2);
        CollisionRecord {
            a,
            b,
            normal,
            penetration,
        }
    });
}

/// Find every overlapping pair among the entities bucketed in `grid`.
///
/// `grid` must have been partitioned from `entities` this frame. The buffer is
/// cleared first. Scanning always runs to completion, even after the buffer
/// fills, so highlights and `overlaps_found` reflect the whole frame.
pub fn detect_collisions(
    grid: &SpatialGrid,
    entities: &mut [Entity],
    buffer: &mut CollisionBuffer,
) {
    buffer.clear();

    let cols = grid.cols() as i64;
    let rows = grid.rows() as i64;

    for cy in 0..rows {
        for cx in 0..cols {
            let base = (cx + cy * cols) as usize;
            let list_a = grid.cell(base);
            if list_a.is_empty() {
                continue;
            }

            for &(dx, dy) in &FORWARD_STENCIL {
                let nx = cx + dx;
                let ny = cy + dy;
                if nx < 0 || ny < 0 || nx >= cols || ny >= rows {
                    continue;
                }
                let neighbor = (nx + ny * cols) as usize;

                if neighbor == base {
                    for (i, &a) in list_a.iter().enumerate() {
                        for &b in &list_a[i + 1..] {
                            test_pair(entities, a as usize, b as usize, buffer);
                        }
                    }
                } else {
                    let list_b = grid.cell(neighbor);
                    for &a in list_a {
                        for &b in list_b {
                            test_pair(entities, a as usize, b as usize, buffer);
                        }
                    }
                }
            }
        }
    }

    if buffer.is_truncated() {
        log::warn!(
            "collision records truncated: {} overlaps, {} kept",
            buffer.overlaps_found(),
            buffer.capacity()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn circle(x: f32, y: f32, radius: f32) -> Entity {
        Entity {
            position: Vec2::new(x, y),
            collider_radius: radius,
            ..Default::default()
        }
    }

    fn run(entities: &mut [Entity], world: Vec2, capacity: usize) -> CollisionBuffer {
        let mut grid = SpatialGrid::new(world, 24.0, 64);
        grid.partition(entities);
        let mut buffer = CollisionBuffer::new(capacity);
        detect_collisions(&grid, entities, &mut buffer);
        buffer
    }

    #[test]
    fn test_overlap_along_x() {
        let mut entities = vec![circle(100.0, 100.0, 12.0), circle(110.0, 100.0, 12.0)];
        let buffer = run(&mut entities, Vec2::new(1000.0, 900.0), 16);

        assert_eq!(buffer.len(), 1);
        let record = buffer.records()[0];
        assert_eq!((record.a, record.b), (0, 1));
        assert!((record.penetration - 14.0).abs() < 1e-5);
        assert!((record.normal - Vec2::X).length() < 1e-6);
        assert!(entities.iter().all(Entity::is_highlighted));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let mut entities = vec![circle(100.0, 100.0, 12.0), circle(124.0, 100.0, 12.0)];
        let buffer = run(&mut entities, Vec2::new(1000.0, 900.0), 16);
        assert!(buffer.is_empty());
        assert_eq!(buffer.overlaps_found(), 0);
        assert!(!entities.iter().any(Entity::is_highlighted));
    }

    #[test]
    fn test_coincident_centers() {
        let (normal, penetration) = circle_contact(Vec2::splat(50.0), 12.0, Vec2::splat(50.0), 8.0);
        assert!(normal.is_finite());
        assert!((normal.length() - 1.0).abs() < 1e-6);
        assert!((penetration - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_collider_offset_used() {
        // Positions far apart, collider centers overlapping
        let mut a = circle(100.0, 100.0, 10.0);
        a.collider_offset = Vec2::new(10.0, 0.0);
        let mut b = circle(125.0, 100.0, 10.0);
        b.collider_offset = Vec2::new(-5.0, 0.0);
        let mut entities = vec![a, b];
        let buffer = run(&mut entities, Vec2::new(1000.0, 900.0), 16);
        assert_eq!(buffer.len(), 1);
        assert!((buffer.records()[0].penetration - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_pairs_across_every_stencil_direction() {
        // Cell side 24. Each pair straddles one boundary direction.
        let cases = [
            (Vec2::new(23.0, 10.0), Vec2::new(25.0, 10.0)), // right
            (Vec2::new(10.0, 23.0), Vec2::new(10.0, 25.0)), // below
            (Vec2::new(23.0, 23.0), Vec2::new(25.0, 25.0)), // below-right
            (Vec2::new(49.0, 23.0), Vec2::new(47.0, 25.0)), // below-left
            (Vec2::new(47.0, 25.0), Vec2::new(49.0, 23.0)), // above-right, from the other side
        ];
        for (p, q) in cases {
            let mut entities = vec![circle(p.x, p.y, 5.0), circle(q.x, q.y, 5.0)];
            let buffer = run(&mut entities, Vec2::new(240.0, 240.0), 16);
            assert_eq!(buffer.len(), 1, "pair {p:?} {q:?}");
        }
    }

    #[test]
    fn test_truncation_keeps_scanning() {
        // Five mutually overlapping entities = 10 pairs, room for 3
        let mut entities: Vec<Entity> = (0..5)
            .map(|i| circle(100.0 + i as f32, 100.0, 12.0))
            .collect();
        let buffer = run(&mut entities, Vec2::new(1000.0, 900.0), 3);
        assert!(buffer.is_truncated());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.overlaps_found(), 10);
        assert!(entities.iter().all(Entity::is_highlighted));
    }

    #[test]
    fn test_buffer_clear_resets_flags() {
        let mut buffer = CollisionBuffer::new(1);
        let record = CollisionRecord {
            a: 0,
            b: 1,
            normal: Vec2::X,
            penetration: 1.0,
        };
        assert!(buffer.try_push(|| record));
        assert!(!buffer.try_push(|| record));
        assert!(buffer.is_truncated());
        buffer.clear();
        assert!(!buffer.is_truncated());
        assert_eq!(buffer.overlaps_found(), 0);
        assert!(buffer.is_empty());
    }

    proptest! {
        #[test]
        fn prop_grid_matches_brute_force(
            circles in prop::collection::vec(
                (0.0f32..240.0, 0.0f32..200.0, 1.0f32..12.0),
                0..120,
            )
        ) {
            let mut entities: Vec<Entity> =
                circles.iter().map(|&(x, y, r)| circle(x, y, r)).collect();
            let mut grid = SpatialGrid::new(Vec2::new(240.0, 200.0), 24.0, 256);
            grid.partition(&entities);
            let mut buffer = CollisionBuffer::new(100_000);
            detect_collisions(&grid, &mut entities, &mut buffer);

            let mut found = HashSet::new();
            for record in buffer.records() {
                let key = (record.a.min(record.b), record.a.max(record.b));
                prop_assert!(found.insert(key), "pair {:?} reported twice", key);
            }

            let mut expected = HashSet::new();
            for i in 0..entities.len() {
                for j in i + 1..entities.len() {
                    let (a, b) = (&entities[i], &entities[j]);
                    if circles_overlap(
                        a.collider_center(),
                        a.collider_radius,
                        b.collider_center(),
                        b.collider_radius,
                    ) {
                        expected.insert((i, j));
                    }
                }
            }
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn prop_contact_geometry(
            x in -100.0f32..100.0, y in -100.0f32..100.0,
            r1 in 1.0f32..12.0, r2 in 1.0f32..12.0,
        ) {
            let c1 = Vec2::ZERO;
            let c2 = Vec2::new(x, y);
            let d = c2.length();
            if circles_overlap(c1, r1, c2, r2) {
                let (normal, penetration) = circle_contact(c1, r1, c2, r2);
                prop_assert!((normal.length() - 1.0).abs() < 1e-4);
                prop_assert!((penetration - (r1 + r2 - d)).abs() < 1e-3);
                if d > 1e-3 {
                    prop_assert!(normal.dot(c2) > 0.0);
                }
            } else {
                prop_assert!(d >= r1 + r2 - 1e-3);
            }
        }
    }
}
