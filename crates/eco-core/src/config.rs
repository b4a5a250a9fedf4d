//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid in cells
    pub width: i32,
    /// Height of the world grid in cells
    pub height: i32,
    /// Pixel size of one cell, forwarded to the renderer
    pub tile_size: u32,
}

impl WorldConfig {
    /// Cell count of a `width` x `height` grid, or `None` if a dimension is
    /// negative or the area does not fit in `i32`.
    pub fn cell_count(width: i32, height: i32) -> Option<usize> {
        let width = usize::try_from(width).ok()?;
        let height = usize::try_from(height).ok()?;
        width
            .checked_mul(height)
            .filter(|cells| *cells <= i32::MAX as usize)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            tile_size: 16,
        }
    }
}

/// Tick pacing and time-slicing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Elapsed host time between ticks (milliseconds)
    pub tick_period_ms: u64,
    /// Entities processed between budget checks
    pub batch_size: usize,
    /// Wall-clock budget per `advance()` call (milliseconds)
    pub slice_budget_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 1000,
            batch_size: 100,
            slice_budget_ms: 10,
        }
    }
}

/// Per-species behavior constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Chance per tick that a plant seeds a neighbouring cell
    pub plant_spread_chance: f64,
    /// Chance per tick that a plant withers
    pub plant_death_chance: f64,
    /// Chance per tick that a diseased entity dies of the disease
    pub disease_death_chance: f64,
    /// Chance per tick that a diseased entity infects a neighbour
    pub disease_spread_chance: f64,
    /// Reach of plant contagion
    pub plant_contagion_radius: i32,
    /// Reach of animal contagion
    pub animal_contagion_radius: i32,
    /// Distance at which a herbivore can graze
    pub forage_radius: i32,
    /// Chance a fed herbivore breeds
    pub herbivore_breed_chance: f64,
    /// Chance a fed carnivore breeds
    pub carnivore_breed_chance: f64,
    /// Consecutive hungry ticks tolerated before starving
    pub starvation_threshold: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            plant_spread_chance: 0.2,
            plant_death_chance: 0.03,
            disease_death_chance: 0.4,
            disease_spread_chance: 0.7,
            plant_contagion_radius: 2,
            animal_contagion_radius: 5,
            forage_radius: 3,
            herbivore_breed_chance: 0.2,
            carnivore_breed_chance: 0.5,
            starvation_threshold: 7,
        }
    }
}

/// Initial population scattered when a session starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub rocks: usize,
    pub grass: usize,
    pub sheep: usize,
    pub tigers: usize,
    pub diseased_grass: usize,
    pub diseased_sheep: usize,
    pub diseased_tigers: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            rocks: 40,
            grass: 400,
            sheep: 60,
            tigers: 8,
            diseased_grass: 0,
            diseased_sheep: 0,
            diseased_tigers: 0,
        }
    }
}

/// Full session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    pub world: WorldConfig,
    pub clock: ClockConfig,
    pub behavior: BehaviorConfig,
    pub population: PopulationConfig,
}

impl SimConfig {
    /// Load a configuration from a JSON file. Missing sections fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.width <= 0 || self.world.height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if WorldConfig::cell_count(self.world.width, self.world.height).is_none() {
            return Err(Error::Validation(format!(
                "grid of {}x{} cells is too large",
                self.world.width, self.world.height
            )));
        }
        if self.clock.batch_size == 0 {
            return Err(Error::Validation("batch_size must be at least 1".to_string()));
        }
        if self.clock.tick_period_ms == 0 {
            return Err(Error::Validation("tick_period_ms must be at least 1".to_string()));
        }

        let b = &self.behavior;
        let chances = [
            ("plant_spread_chance", b.plant_spread_chance),
            ("plant_death_chance", b.plant_death_chance),
            ("disease_death_chance", b.disease_death_chance),
            ("disease_spread_chance", b.disease_spread_chance),
            ("herbivore_breed_chance", b.herbivore_breed_chance),
            ("carnivore_breed_chance", b.carnivore_breed_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Validation(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if b.plant_contagion_radius < 0 || b.animal_contagion_radius < 0 || b.forage_radius < 0 {
            return Err(Error::Validation("radii must not be negative".to_string()));
        }

        Ok(())
    }
}
