//! Simulation state and scene setup
//!
//! Owns every per-frame array: entity store, grid, collision buffer. All of
//! it is preallocated from [`Settings`] up front and only mutated in place.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::CollisionBuffer;
use super::entity::{EntityId, EntityStore, SpriteRect};
use super::grid::{GridDiagnostics, SpatialGrid};
use super::rng::Lcg;
use crate::consts::{ENTITY_SIZE, PLAYER_SIZE};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Atlas source rect for the player ship
pub const PLAYER_ATLAS_RECT: SpriteRect = SpriteRect::new(0.0, 0.0, 128.0, 128.0);
/// Atlas source rect for spawned entities
pub const ENTITY_ATLAS_RECT: SpriteRect = SpriteRect::new(0.0, 4.0 * 128.0, 128.0, 128.0);

/// What the renderer and HUD read after each frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    pub frame: u64,
    pub entity_count: usize,
    pub grid: GridDiagnostics,
    /// Records stored this frame
    pub collision_count: usize,
    pub collision_capacity: usize,
    /// Overlapping pairs seen, including ones that did not fit
    pub overlaps_found: usize,
    pub truncated: bool,
}

/// Complete simulation state
#[derive(Debug)]
pub struct SimState {
    pub settings: Settings,
    pub store: EntityStore,
    pub grid: SpatialGrid,
    pub collisions: CollisionBuffer,
    /// Spawn RNG, reseeded on every reset
    pub rng: Lcg,
    /// Frames ticked since creation
    pub frame: u64,
    /// Diagnostics from the most recent tick
    pub diagnostics: FrameDiagnostics,
    player: Option<EntityId>,
}

impl SimState {
    /// Validate settings, allocate all buffers and spawn the initial scene
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut state = Self {
            store: EntityStore::new(settings.entity_capacity),
            grid: SpatialGrid::from_settings(&settings),
            collisions: CollisionBuffer::new(settings.max_collisions),
            rng: Lcg::new(settings.seed),
            frame: 0,
            diagnostics: FrameDiagnostics::default(),
            player: None,
            settings,
        };
        state.reset(state.settings.world_size());
        Ok(state)
    }

    /// The player-controlled entity, if it exists
    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Rebuild the scene: player in the middle, everyone else scattered.
    ///
    /// Uses the configured seed, so the layout for a given `world` and
    /// capacity is always the same.
    pub fn reset(&mut self, world: Vec2) {
        self.store.clear();
        self.collisions.clear();
        self.rng.reseed(self.settings.seed);

        let radius = self.settings.collision_radius;

        // The player is always created first and the store is empty
        self.player = self.store.create();
        if let Some(id) = self.player {
            let player = self.store.get_mut(id);
            player.position = world / 2.0;
            player.size = Vec2::splat(PLAYER_SIZE);
            player.sprite.rect = PLAYER_ATLAS_RECT;
            player.collider_radius = radius;
        }

        while !self.store.is_full() {
            let rx = self.rng.next01();
            let ry = self.rng.next01();
            // Keep spawns one radius from the edge so nothing starts clamped
            let position = Vec2::new(
                radius + rx * (world.x - 2.0 * radius),
                radius + ry * (world.y - 2.0 * radius),
            );
            if self.spawn(position).is_none() {
                break;
            }
        }

        log::info!(
            "Scene reset: {} entities in {}x{} (seed {:#010x})",
            self.store.len(),
            world.x,
            world.y,
            self.settings.seed
        );
    }

    /// Create a regular entity at `position`, or `None` if the store is full
    pub fn spawn(&mut self, position: Vec2) -> Option<EntityId> {
        let id = self.store.create()?;
        let entity = self.store.get_mut(id);
        entity.position = position;
        entity.size = Vec2::splat(ENTITY_SIZE);
        entity.sprite.rect = ENTITY_ATLAS_RECT;
        entity.collider_radius = self.settings.collision_radius;
        Some(id)
    }

    /// Destroy an entity, keeping the player handle pointed at the player.
    ///
    /// Any other handles the caller holds may now alias a different entity.
    ///
    /// # Panics
    /// If `id` is not an active handle of this state's store.
    pub fn despawn(&mut self, id: EntityId) {
        self.store.assert_owned(id);
        let last = self.store.id_at(self.store.len() - 1);
        if self.player == Some(id) {
            self.player = None;
        } else if self.player.is_some() && self.player == last {
            // The player is about to be moved into the freed slot
            self.player = Some(id);
        }
        self.store.destroy(id);
    }
}

impl Clone for SimState {
    /// Deep copy whose player handle belongs to the cloned store
    fn clone(&self) -> Self {
        let store = self.store.clone();
        let player = self.player.and_then(|id| store.id_at(id.index()));
        Self {
            settings: self.settings.clone(),
            store,
            grid: self.grid.clone(),
            collisions: self.collisions.clone(),
            rng: self.rng,
            frame: self.frame,
            diagnostics: self.diagnostics,
            player,
        }
    }
}
