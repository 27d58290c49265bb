use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_cell_size() -> i32 {
    2
}

fn default_initial_terrain_half() -> i32 {
    5
}

fn default_population_per_house() -> i32 {
    4
}

fn default_terrain_unlock_threshold() -> usize {
    2
}

fn default_free_first_placement() -> bool {
    true
}

/// Numeric rules shared by the placement checks and the turn pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rules {
    /// World units covered by one grid cell.
    #[serde(default = "default_cell_size")]
    pub cell_size: i32,
    /// Half-width, in cells, of the buildable square before any terrain unlock.
    #[serde(default = "default_initial_terrain_half")]
    pub initial_terrain_half: i32,
    #[serde(default = "default_population_per_house")]
    pub population_per_house: i32,
    /// Houses and community centers needed per extra ring of terrain.
    #[serde(default = "default_terrain_unlock_threshold")]
    pub terrain_unlock_threshold: usize,
    /// Skip the energy affordability check while the settlement is empty.
    #[serde(default = "default_free_first_placement")]
    pub free_first_placement: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            initial_terrain_half: default_initial_terrain_half(),
            population_per_house: default_population_per_house(),
            terrain_unlock_threshold: default_terrain_unlock_threshold(),
            free_first_placement: default_free_first_placement(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cell_size must be positive, got {0}")]
    CellSize(i32),
    #[error("initial_terrain_half must be positive, got {0}")]
    TerrainHalf(i32),
    #[error("population_per_house must not be negative, got {0}")]
    PopulationPerHouse(i32),
    #[error("terrain_unlock_threshold must be at least 1")]
    UnlockThreshold,
}

impl Rules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size <= 0 {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        if self.initial_terrain_half <= 0 {
            return Err(ConfigError::TerrainHalf(self.initial_terrain_half));
        }
        if self.population_per_house < 0 {
            return Err(ConfigError::PopulationPerHouse(self.population_per_house));
        }
        if self.terrain_unlock_threshold == 0 {
            return Err(ConfigError::UnlockThreshold);
        }
        Ok(())
    }

    /// Exclusive bound on `|x|` and `|z|` for the given number of terrain unlocks.
    pub fn terrain_limit(&self, unlocked_terrain_areas: u32) -> i64 {
        (i64::from(self.initial_terrain_half) + i64::from(unlocked_terrain_areas))
            * i64::from(self.cell_size)
    }
}
