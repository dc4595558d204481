//! Per-frame simulation step
//!
//! move player → clamp → partition → detect → resolve. Identical prior
//! state and identical inputs give identical results, since collision
//! enumeration order follows entity array order and grid layout.

use glam::Vec2;

use super::collision::detect_collisions;
use super::entity::Tint;
use super::resolve::{clamp_to_world, resolve_collisions};
use super::state::{FrameDiagnostics, SimState};
use crate::consts::{FRAME_DT, WORLD_H, WORLD_W};

/// Held movement keys for the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    /// Unit direction (screen space, +y down), zero when idle or cancelled out
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }
}

/// Host inputs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct TickInput {
    /// Elapsed seconds since the previous frame
    pub dt: f32,
    pub movement: MoveIntent,
    /// Current world bounds (may change when the host window resizes)
    pub world_size: Vec2,
    /// Rebuild the scene before stepping
    pub reset: bool,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            dt: FRAME_DT,
            movement: MoveIntent::default(),
            world_size: Vec2::new(WORLD_W, WORLD_H),
            reset: false,
        }
    }
}

impl TickInput {
    pub fn new(dt: f32, world_size: Vec2) -> Self {
        Self {
            dt,
            world_size,
            ..Default::default()
        }
    }
}

/// Advance the simulation by one frame and return its diagnostics
pub fn tick(state: &mut SimState, input: &TickInput) -> FrameDiagnostics {
    if input.reset {
        state.reset(input.world_size);
    }
    state.frame += 1;

    let world = input.world_size;

    if let Some(player) = state.player() {
        let velocity = input.movement.direction() * (state.settings.player_speed * input.dt);
        state.store.get_mut(player).position += velocity;
    }

    for entity in state.store.as_mut_slice() {
        entity.sprite.tint = Tint::Normal;
        clamp_to_world(entity, world);
    }

    state.grid.partition(state.store.as_slice());
    detect_collisions(&state.grid, state.store.as_mut_slice(), &mut state.collisions);
    resolve_collisions(
        state.store.as_mut_slice(),
        &state.collisions,
        world,
        &state.settings.debug,
    );

    state.diagnostics = FrameDiagnostics {
        frame: state.frame,
        entity_count: state.store.len(),
        grid: state.grid.diagnostics(),
        collision_count: state.collisions.len(),
        collision_capacity: state.collisions.capacity(),
        overlaps_found: state.collisions.overlaps_found(),
        truncated: state.collisions.is_truncated(),
    };
    log::debug!(
        "frame {}: {} collisions{}, grid avg/max {:.1}/{}, overflow {}",
        state.diagnostics.frame,
        state.diagnostics.collision_count,
        if state.diagnostics.truncated { " (TRUNC)" } else { "" },
        state.diagnostics.grid.avg_cell_count,
        state.diagnostics.grid.max_cell_count,
        state.diagnostics.grid.overflow_count,
    );
    state.diagnostics
}
