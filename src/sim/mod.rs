//! Deterministic simulation module
//!
//! Everything the frame loop mutates lives here. This module must be pure and
//! deterministic:
//! - Seeded RNG only
//! - Stable iteration order (entity array order)
//! - Fixed-capacity buffers, preallocated once
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod grid;
pub mod resolve;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{
    CollisionBuffer, CollisionRecord, FORWARD_STENCIL, circle_contact, circles_overlap,
    detect_collisions,
};
pub use entity::{Entity, EntityId, EntityStore, Sprite, SpriteRect, Tint};
pub use grid::{GridDiagnostics, SpatialGrid};
pub use resolve::{clamp_to_world, resolve_collisions, separate};
pub use rng::Lcg;
pub use state::{FrameDiagnostics, SimState};
pub use tick::{MoveIntent, TickInput, tick};
