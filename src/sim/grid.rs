//! Uniform spatial grid for broad-phase collision detection
//!
//! The grid covers the world with square cells and is rebuilt from scratch
//! every frame. Each cell stores up to `cell_capacity` entity indices in a
//! preallocated flat buffer; entities that don't fit are counted as overflow
//! and skipped for collision purposes this frame (they still exist).
//!
//! Precondition: no collider radius may exceed half the cell size. The
//! detector only looks at adjacent cells, so a larger collider can reach an
//! entity two cells away and that collision would be silently missed. This is
//! checked with a debug assertion only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::settings::Settings;

/// Per-frame occupancy statistics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridDiagnostics {
    /// Entities dropped because their cell was full
    pub overflow_count: usize,
    /// Highest occupant count of any cell
    pub max_cell_count: usize,
    /// Mean occupant count over non-empty cells (0 when all empty)
    pub avg_cell_count: f32,
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cell_capacity: usize,
    /// `cols * rows * cell_capacity` entity indices, cell-major
    slots: Vec<u32>,
    /// Occupants per cell
    counts: Vec<usize>,
    diagnostics: GridDiagnostics,
}

impl SpatialGrid {
    /// Grid covering `world` with cells of side `cell_size`
    pub fn new(world: Vec2, cell_size: f32, cell_capacity: usize) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        let cols = (world.x / cell_size).ceil().max(1.0) as usize;
        let rows = (world.y / cell_size).ceil().max(1.0) as usize;
        let num_cells = cols * rows;
        Self {
            cell_size,
            cols,
            rows,
            cell_capacity,
            slots: vec![0; num_cells * cell_capacity],
            counts: vec![0; num_cells],
            diagnostics: GridDiagnostics::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.world_size(),
            settings.cell_size(),
            settings.max_entities_per_cell,
        )
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cols * self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn cell_capacity(&self) -> usize {
        self.cell_capacity
    }

    /// Diagnostics from the last `partition`
    #[inline]
    pub fn diagnostics(&self) -> GridDiagnostics {
        self.diagnostics
    }

    /// Cell coordinates for a point, clamped so out-of-world points land in an
    /// edge cell
    #[inline]
    pub fn cell_coords(&self, p: Vec2) -> (usize, usize) {
        let cx = ((p.x / self.cell_size).floor() as i64).clamp(0, self.cols as i64 - 1);
        let cy = ((p.y / self.cell_size).floor() as i64).clamp(0, self.rows as i64 - 1);
        (cx as usize, cy as usize)
    }

    /// Flat cell index: `cx + cy * cols`
    #[inline]
    pub fn cell_index(&self, p: Vec2) -> usize {
        let (cx, cy) = self.cell_coords(p);
        cx + cy * self.cols
    }

    /// Entity indices stored in a cell
    #[inline]
    pub fn cell(&self, index: usize) -> &[u32] {
        let start = index * self.cell_capacity;
        &self.slots[start..start + self.counts[index]]
    }

    /// Bucket every entity by its collider center.
    ///
    /// The center is `position + collider_offset`, the same point the narrow
    /// phase tests; it equals `position` whenever the offset is zero.
    /// Clears the previous frame's contents first. Entities landing in a full
    /// cell are counted in `overflow_count` and left out.
    pub fn partition(&mut self, entities: &[Entity]) {
        self.counts.fill(0);
        let mut overflow_count = 0;

        for (i, entity) in entities.iter().enumerate() {
            debug_assert!(
                2.0 * entity.collider_radius <= self.cell_size,
                "collider radius {} exceeds half the cell size {}",
                entity.collider_radius,
                self.cell_size
            );

            let cell = self.cell_index(entity.collider_center());
            let count = self.counts[cell];
            if count < self.cell_capacity {
                self.slots[cell * self.cell_capacity + count] = i as u32;
                self.counts[cell] = count + 1;
            } else {
                overflow_count += 1;
                log::trace!(
                    "cell {} overflow (cap={}, attempted count={})",
                    cell,
                    self.cell_capacity,
                    count + 1
                );
            }
        }

        let mut total = 0;
        let mut non_empty = 0;
        let mut max_cell_count = 0;
        for &count in self.counts.iter().filter(|&&c| c > 0) {
            total += count;
            non_empty += 1;
            max_cell_count = max_cell_count.max(count);
        }

        self.diagnostics = GridDiagnostics {
            overflow_count,
            max_cell_count,
            avg_cell_count: if non_empty > 0 {
                total as f32 / non_empty as f32
            } else {
                0.0
            },
        };

        if overflow_count > 0 {
            log::warn!(
                "{} entities dropped from full grid cells (cap={})",
                overflow_count,
                self.cell_capacity
            );
        }
    }
}
