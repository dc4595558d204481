//! Swarm Grid - fixed-capacity 2D entity simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity store, spatial grid, collisions)
//! - `settings`: Run configuration and debug toggles
//! - `error`: Configuration errors
//!
//! Rendering, input polling and frame pacing belong to the host. The host
//! feeds a [`sim::TickInput`] into [`sim::tick`] once per frame and then reads
//! the entity slice and [`sim::FrameDiagnostics`] back out.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{DebugToggles, Settings};

/// Simulation configuration constants
pub mod consts {
    /// Target frame time of the reference host loop (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// World dimensions
    pub const WORLD_W: f32 = 1000.0;
    pub const WORLD_H: f32 = 900.0;

    /// Entity store capacity (player included)
    pub const ENTITY_COUNT: usize = 1000;
    /// Maximum collision records kept per frame
    pub const MAX_COLLISIONS: usize = 2024;

    /// Nominal collider radius
    pub const COLLISION_RADIUS: f32 = 12.0;
    /// Grid cell side: ~2x radius so a collider never spans more than one neighbor
    pub const CELL_SIZE: f32 = 2.0 * COLLISION_RADIUS;
    /// Maximum entity indices stored per grid cell
    pub const MAX_ENTITIES_PER_CELL: usize = 32;

    /// Default spawn seed
    pub const RNG_SEED: u32 = 0xC001_C0DE;

    /// Player speed (world units per second)
    pub const PLAYER_SPEED: f32 = 128.0;
    /// Render sizes
    pub const PLAYER_SIZE: f32 = 64.0;
    pub const ENTITY_SIZE: f32 = 32.0;
}

/// Clamp a single axis value into `[lo, hi]`.
///
/// Unlike `f32::clamp` this never panics when `lo > hi` (a world smaller than
/// the collider); the upper bound wins in that case.
#[inline]
pub fn clamp_axis(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}
