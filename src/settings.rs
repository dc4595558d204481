//! Run settings and debug toggles
//!
//! Start-of-run constants for the simulation core. Loaded from an optional
//! JSON file; missing fields fall back to the values in [`crate::consts`].

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Debug switches that used to be process-wide globals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugToggles {
    /// Push overlapping colliders apart after detection
    pub separate_collisions: bool,
    /// Ask the renderer to outline colliders
    pub render_colliders: bool,
    /// Ask the renderer to outline sprite bounds
    pub render_texture_border: bool,
}

impl Default for DebugToggles {
    fn default() -> Self {
        Self {
            separate_collisions: true,
            render_colliders: true,
            render_texture_border: false,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World width used to size the grid and for the initial spawn
    pub world_w: f32,
    /// World height used to size the grid and for the initial spawn
    pub world_h: f32,

    /// Nominal collider radius given to spawned entities
    pub collision_radius: f32,
    /// Grid cell side; `None` derives it as 2x the collision radius
    pub cell_size: Option<f32>,
    /// Entity indices stored per cell before overflow
    pub max_entities_per_cell: usize,
    /// Collision records kept per frame before truncation
    pub max_collisions: usize,
    /// Entity store capacity (player included)
    pub entity_capacity: usize,

    /// Spawn seed
    pub seed: u32,
    /// Player speed in world units per second
    pub player_speed: f32,

    pub debug: DebugToggles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_w: WORLD_W,
            world_h: WORLD_H,
            collision_radius: COLLISION_RADIUS,
            cell_size: None,
            max_entities_per_cell: MAX_ENTITIES_PER_CELL,
            max_collisions: MAX_COLLISIONS,
            entity_capacity: ENTITY_COUNT,
            seed: RNG_SEED,
            player_speed: PLAYER_SPEED,
            debug: DebugToggles::default(),
        }
    }
}

impl Settings {
    /// Effective grid cell side
    pub fn cell_size(&self) -> f32 {
        self.cell_size.unwrap_or(2.0 * self.collision_radius)
    }

    /// World bounds as a vector
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.world_w, self.world_h)
    }

    /// Check the invariants the grid and detector depend on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v > 0.0 && v.is_finite();
        if !(positive(self.world_w) && positive(self.world_h)) {
            return Err(ConfigError::InvalidWorld {
                width: self.world_w,
                height: self.world_h,
            });
        }
        if !positive(self.collision_radius) {
            return Err(ConfigError::InvalidRadius(self.collision_radius));
        }
        let diameter = 2.0 * self.collision_radius;
        let cell_size = self.cell_size();
        // NaN fails the comparison
        if !(cell_size >= diameter && cell_size.is_finite()) {
            return Err(ConfigError::CellTooSmall {
                cell_size,
                diameter,
            });
        }
        if self.max_entities_per_cell == 0 {
            return Err(ConfigError::ZeroCapacity("max_entities_per_cell"));
        }
        if self.max_collisions == 0 {
            return Err(ConfigError::ZeroCapacity("max_collisions"));
        }
        if self.entity_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("entity_capacity"));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.cell_size(), 24.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{ "seed": 5, "debug": { "separate_collisions": false } }"#)
                .unwrap();
        assert_eq!(settings.seed, 5);
        assert!(!settings.debug.separate_collisions);
        assert!(settings.debug.render_colliders);
        assert_eq!(settings.world_w, WORLD_W);
    }

    #[test]
    fn test_cell_smaller_than_diameter_rejected() {
        let err = Settings::from_json(r#"{ "collision_radius": 12.0, "cell_size": 20.0 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::CellTooSmall { .. }));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let settings = Settings {
            max_collisions: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ZeroCapacity("max_collisions"))
        ));
    }

    #[test]
    fn test_bad_world_rejected() {
        let settings = Settings {
            world_w: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidWorld { .. })
        ));
    }

    #[test]
    fn test_non_finite_world_rejected() {
        let settings = Settings {
            world_w: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidWorld { .. })
        ));
        let settings = Settings {
            world_h: f32::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_non_finite_cell_rejected() {
        for cell_size in [f32::NAN, f32::INFINITY] {
            let settings = Settings {
                cell_size: Some(cell_size),
                ..Default::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(ConfigError::CellTooSmall { .. })
            ));
        }
        let settings = Settings {
            collision_radius: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/swarm-grid.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
