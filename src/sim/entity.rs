//! Entities and the fixed-capacity entity store
//!
//! Entities live in one dense array. Creation appends, destruction moves the
//! last active entity into the freed slot. That keeps iteration cache-dense and
//! both operations O(1), at the cost of index stability: after a `destroy`,
//! the handle of the former last entity now aliases the destroyed slot.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Highlight state written by the detector and read by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tint {
    #[default]
    Normal,
    /// Overlapped another collider this frame
    Colliding,
}

impl Tint {
    /// Color modulation for the renderer (white / red)
    pub fn rgba(self) -> [f32; 4] {
        match self {
            Tint::Normal => [1.0, 1.0, 1.0, 1.0],
            Tint::Colliding => [1.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Axis-aligned rectangle in pixels (atlas source or screen destination)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpriteRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl SpriteRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Renderer-facing sprite data. The texture itself belongs to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Source rectangle in the atlas
    pub rect: SpriteRect,
    pub tint: Tint,
    /// Anchor within the sprite, (0.5, 0.5) = centered on the position
    pub pivot: Vec2,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            rect: SpriteRect::default(),
            tint: Tint::Normal,
            pivot: Vec2::splat(0.5),
        }
    }
}

impl Sprite {
    /// Destination rectangle for an entity drawn at `position` with `size`
    pub fn dest_rect(&self, position: Vec2, size: Vec2) -> SpriteRect {
        let top_left = position - size * self.pivot;
        SpriteRect::new(top_left.x, top_left.y, size.x, size.y)
    }
}

/// A simulated entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub position: Vec2,
    /// Render size, independent of the collider
    pub size: Vec2,
    pub sprite: Sprite,
    pub collider_radius: f32,
    /// Collider center relative to `position`
    pub collider_offset: Vec2,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            sprite: Sprite::default(),
            collider_radius: 0.0,
            collider_offset: Vec2::ZERO,
        }
    }
}

impl Entity {
    /// World-space center of the circular collider
    #[inline]
    pub fn collider_center(&self) -> Vec2 {
        self.position + self.collider_offset
    }

    #[inline]
    pub fn is_highlighted(&self) -> bool {
        self.sprite.tint == Tint::Colliding
    }
}

static NEXT_STORE_TAG: AtomicU32 = AtomicU32::new(1);

/// Handle to an entity slot in a specific [`EntityStore`]
///
/// Only valid until the next `destroy` on the same store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    index: u32,
    store: u32,
}

impl EntityId {
    /// Slot index into [`EntityStore::as_slice`]
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Dense fixed-capacity entity array with swap-delete
///
/// A clone is a separate store: it gets its own tag, so handles issued by the
/// original are rejected by the clone and vice versa.
#[derive(Debug)]
pub struct EntityStore {
    entities: Vec<Entity>,
    capacity: usize,
    tag: u32,
}

impl EntityStore {
    /// Preallocate storage for `capacity` entities
    pub fn new(capacity: usize) -> Self {
        assert!(capacity <= u32::MAX as usize, "entity capacity exceeds u32 index range");
        Self {
            entities: Vec::with_capacity(capacity),
            capacity,
            tag: NEXT_STORE_TAG.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Claim the next free slot, reset to defaults.
    ///
    /// Returns `None` when the store is full; callers decide how to degrade.
    pub fn create(&mut self) -> Option<EntityId> {
        if self.entities.len() >= self.capacity {
            return None;
        }
        let index = self.entities.len() as u32;
        self.entities.push(Entity::default());
        Some(EntityId {
            index,
            store: self.tag,
        })
    }

    /// Remove an entity by moving the last active entity into its slot.
    ///
    /// # Panics
    /// If `id` was not produced by this store or no longer names an active
    /// slot. Continuing would corrupt the swap-delete invariant.
    pub fn destroy(&mut self, id: EntityId) {
        let index = self.assert_owned(id);
        self.entities.swap_remove(index);
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[self.assert_owned(id)]
    }

    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        let index = self.assert_owned(id);
        &mut self.entities[index]
    }

    /// Handle for an active slot index
    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        (index < self.entities.len()).then(|| EntityId {
            index: index as u32,
            store: self.tag,
        })
    }

    /// Slot index of `id`, checked against this store.
    ///
    /// # Panics
    /// If `id` came from another store or names a slot past the active range.
    pub fn assert_owned(&self, id: EntityId) -> usize {
        assert!(
            id.store == self.tag,
            "entity handle from store {} used with store {}",
            id.store,
            self.tag
        );
        let index = id.index();
        assert!(
            index < self.entities.len(),
            "entity handle {} out of range (active {})",
            index,
            self.entities.len()
        );
        index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entities.len() >= self.capacity
    }

    /// Drop every entity; capacity is kept
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    #[inline]
    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }
}

impl Clone for EntityStore {
    fn clone(&self) -> Self {
        let mut entities = Vec::with_capacity(self.capacity);
        entities.extend_from_slice(&self.entities);
        Self {
            entities,
            capacity: self.capacity,
            tag: NEXT_STORE_TAG.fetch_add(1, Ordering::Relaxed),
        }
    }
}
