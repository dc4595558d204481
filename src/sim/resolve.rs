//! Positional collision response
//!
//! A single relaxation pass: every recorded pair is pushed apart by its
//! penetration depth, half to each side. There is no velocity or momentum.
//! Clusters of three or more may need a few frames to settle.

use glam::Vec2;

use super::collision::{CollisionBuffer, CollisionRecord};
use super::entity::Entity;
use crate::clamp_axis;
use crate::settings::DebugToggles;

/// Move each pair apart along its normal, `penetration / 2` each
pub fn separate(entities: &mut [Entity], records: &[CollisionRecord]) {
    for record in records {
        let half = record.normal * (record.penetration * 0.5);
        entities[record.a].position -= half;
        entities[record.b].position += half;
    }
}

/// Keep an entity's collider inside `[0, world]` on both axes
#[inline]
pub fn clamp_to_world(entity: &mut Entity, world: Vec2) {
    let r = entity.collider_radius;
    let offset = entity.collider_offset;
    entity.position.x = clamp_axis(entity.position.x, r - offset.x, world.x - r - offset.x);
    entity.position.y = clamp_axis(entity.position.y, r - offset.y, world.y - r - offset.y);
}

/// Apply this frame's separations, then clamp everyone to the world
pub fn resolve_collisions(
    entities: &mut [Entity],
    collisions: &CollisionBuffer,
    world: Vec2,
    debug: &DebugToggles,
) {
    if debug.separate_collisions {
        separate(entities, collisions.records());
    }
    for entity in entities.iter_mut() {
        clamp_to_world(entity, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::detect_collisions;
    use crate::sim::grid::SpatialGrid;

    const WORLD: Vec2 = Vec2::new(1000.0, 900.0);

    fn circle(x: f32, y: f32, radius: f32) -> Entity {
        Entity {
            position: Vec2::new(x, y),
            collider_radius: radius,
            ..Default::default()
        }
    }

    fn detect(entities: &mut [Entity]) -> CollisionBuffer {
        let mut grid = SpatialGrid::new(WORLD, 24.0, 32);
        grid.partition(entities);
        let mut buffer = CollisionBuffer::new(64);
        detect_collisions(&grid, entities, &mut buffer);
        buffer
    }

    #[test]
    fn test_isolated_pair_separates_symmetrically() {
        let start = [Vec2::new(300.0, 200.0), Vec2::new(306.0, 208.0)];
        let mut entities = vec![
            circle(start[0].x, start[0].y, 12.0),
            circle(start[1].x, start[1].y, 10.0),
        ];
        let buffer = detect(&mut entities);
        assert_eq!(buffer.len(), 1);

        resolve_collisions(&mut entities, &buffer, WORLD, &DebugToggles::default());

        let distance = entities[0].position.distance(entities[1].position);
        assert!((distance - 22.0).abs() < 1e-4);
        let moved_a = entities[0].position.distance(start[0]);
        let moved_b = entities[1].position.distance(start[1]);
        assert!((moved_a - moved_b).abs() < 1e-4);
        assert!((moved_a + moved_b - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_coincident_pair_separates_along_x() {
        let mut entities = vec![circle(400.0, 400.0, 12.0), circle(400.0, 400.0, 12.0)];
        let buffer = detect(&mut entities);
        resolve_collisions(&mut entities, &buffer, WORLD, &DebugToggles::default());
        assert!(entities.iter().all(|e| e.position.is_finite()));
        assert!((entities[0].position.x - 388.0).abs() < 1e-4);
        assert!((entities[1].position.x - 412.0).abs() < 1e-4);
    }

    #[test]
    fn test_separation_disabled() {
        let mut entities = vec![circle(100.0, 100.0, 12.0), circle(110.0, 100.0, 12.0)];
        let buffer = detect(&mut entities);
        let debug = DebugToggles {
            separate_collisions: false,
            ..Default::default()
        };
        resolve_collisions(&mut entities, &buffer, WORLD, &debug);
        assert_eq!(entities[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(entities[1].position, Vec2::new(110.0, 100.0));
    }

    #[test]
    fn test_pushed_past_right_edge_is_clamped() {
        let mut entities = vec![circle(980.0, 450.0, 12.0), circle(988.0, 450.0, 12.0)];
        let buffer = detect(&mut entities);
        resolve_collisions(&mut entities, &buffer, WORLD, &DebugToggles::default());
        assert_eq!(entities[1].position.x, WORLD.x - 12.0);
    }

    #[test]
    fn test_clamp_respects_offset() {
        let mut entity = circle(-20.0, 1000.0, 10.0);
        entity.collider_offset = Vec2::new(5.0, -5.0);
        clamp_to_world(&mut entity, WORLD);
        assert_eq!(entity.collider_center().x, 10.0);
        assert_eq!(entity.collider_center().y, WORLD.y - 10.0);
    }

    #[test]
    fn test_clamp_world_smaller_than_collider() {
        let mut entity = circle(5.0, 5.0, 12.0);
        clamp_to_world(&mut entity, Vec2::new(10.0, 10.0));
        assert_eq!(entity.position, Vec2::new(-2.0, -2.0));
    }
}
