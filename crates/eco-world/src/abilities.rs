//! Host abilities.
//!
//! Player tools that act on the grid between polls. They only use the
//! grid's public operations, so occupancy and population bookkeeping hold
//! no matter what an ability does.

use crate::entity::Entity;
use crate::grid::Grid;
use crate::random::RandomSource;
use crate::species::Species;
use eco_core::{record_counter, EntityId, Position, Result};
use tracing::{debug, info};

/// Random placement attempts per requested entity before giving up
const PLACEMENT_ATTEMPTS: usize = 10;

/// Scatter up to `count` entities at random open cells. Returns how many
/// were placed; a crowded grid may take fewer.
pub fn populate(grid: &mut Grid, species: Species, count: usize, rng: &mut dyn RandomSource) -> usize {
    if grid.width() <= 0 || grid.height() <= 0 {
        return 0;
    }

    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < count * PLACEMENT_ATTEMPTS {
        attempts += 1;
        let pos = random_cell(grid, rng);
        if grid.try_add(Entity::new(species, pos)) {
            placed += 1;
        }
    }

    debug!(species = %species, requested = count, placed, "Populated");
    placed
}

/// Place one entity where the player asked. Surfaces
/// [`Error::InvalidPlacement`](eco_core::Error::InvalidPlacement) so the
/// host can tell the player the cell is taken.
pub fn spawn_at(grid: &mut Grid, species: Species, pos: Position) -> Result<EntityId> {
    let id = grid.add(Entity::new(species, pos))?;
    info!(species = %species, x = pos.x, y = pos.y, "Spawned by player");
    record_counter!("ability_uses", 1, ability = "spawn_at");
    Ok(id)
}

/// Remove every entity within Manhattan `radius` of `center`, on both layers.
pub fn clear_area(grid: &mut Grid, center: Position, radius: i32) -> usize {
    let doomed: Vec<EntityId> = grid
        .entities()
        .filter(|entity| Grid::distance_to(center, entity.position()) <= radius)
        .map(Entity::id)
        .collect();

    let removed = doomed
        .into_iter()
        .filter(|id| grid.remove(*id).is_some())
        .count();
    info!(x = center.x, y = center.y, radius, removed, "Area cleared");
    record_counter!("ability_uses", 1, ability = "clear_area");
    removed
}

/// Timed ability: drops plants at random cells once per tick for a number
/// of ticks.
#[derive(Debug, Clone)]
pub struct RainOfPlants {
    species: Species,
    drops_per_tick: usize,
    ticks_remaining: u32,
}

impl RainOfPlants {
    pub fn new(species: Species, drops_per_tick: usize, ticks: u32) -> Self {
        Self {
            species,
            drops_per_tick,
            ticks_remaining: ticks,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ticks_remaining == 0
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.ticks_remaining
    }

    /// Call once per completed tick. Returns how many plants landed.
    pub fn on_tick(&mut self, grid: &mut Grid, rng: &mut dyn RandomSource) -> usize {
        if self.is_finished() {
            return 0;
        }
        self.ticks_remaining -= 1;

        let mut landed = 0;
        for _ in 0..self.drops_per_tick {
            let pos = random_cell(grid, rng);
            if grid.try_add(Entity::new(self.species, pos)) {
                landed += 1;
            }
        }
        debug!(species = %self.species, landed, ticks_remaining = self.ticks_remaining, "Rain fell");
        record_counter!("ability_uses", 1, ability = "rain_of_plants");
        landed
    }
}

fn random_cell(grid: &Grid, rng: &mut dyn RandomSource) -> Position {
    let x = rng.below(grid.width() as usize) as i32;
    let y = rng.below(grid.height() as usize) as i32;
    Position::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;
    use eco_core::{Error, Layer};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_populate_fills_up_to_capacity() {
        let mut grid = Grid::new(3, 3, 16);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let placed = populate(&mut grid, Species::Sheep, 20, &mut rng);
        assert!(placed <= 9);
        assert_eq!(grid.population().count(Species::Sheep), placed);
    }

    #[test]
    fn test_populate_gives_up_when_full() {
        let mut grid = Grid::new(1, 1, 16);
        let mut rng = FixedRandom(0.0);
        assert_eq!(populate(&mut grid, Species::Grass, 3, &mut rng), 1);
        assert_eq!(populate(&mut grid, Species::Grass, 3, &mut rng), 0);
    }

    #[test]
    fn test_spawn_at_is_strict() {
        let mut grid = Grid::new(3, 3, 16);
        spawn_at(&mut grid, Species::Tiger, Position::new(1, 1)).unwrap();

        let result = spawn_at(&mut grid, Species::Rock, Position::new(1, 1));
        assert!(matches!(result, Err(Error::InvalidPlacement { layer: Layer::Foreground, .. })));
        assert!(spawn_at(&mut grid, Species::Grass, Position::new(1, 1)).is_ok());
    }

    #[test]
    fn test_clear_area() {
        let mut grid = Grid::new(7, 7, 16);
        grid.add(Entity::new(Species::Grass, Position::new(3, 3))).unwrap();
        grid.add(Entity::new(Species::Sheep, Position::new(3, 3))).unwrap();
        grid.add(Entity::new(Species::Sheep, Position::new(4, 4))).unwrap();
        let outside = grid.add(Entity::new(Species::Tiger, Position::new(6, 6))).unwrap();

        assert_eq!(clear_area(&mut grid, Position::new(3, 3), 2), 3);
        assert_eq!(grid.len(), 1);
        assert!(grid.contains(outside));
        assert_eq!(grid.population().count(Species::Sheep), 0);
    }

    #[test]
    fn test_rain_of_plants_runs_out() {
        let mut grid = Grid::new(6, 6, 16);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut rain = RainOfPlants::new(Species::Grass, 4, 2);

        let first = rain.on_tick(&mut grid, &mut rng);
        let second = rain.on_tick(&mut grid, &mut rng);
        assert!(rain.is_finished());
        assert_eq!(rain.on_tick(&mut grid, &mut rng), 0);
        assert_eq!(grid.population().count(Species::Grass), first + second);
        assert!(first >= 1 && first <= 4);
    }
}
