//! Simulation session: the grid, its clock, and the random source that
//! drives behavior, behind one host-facing API.

use crate::abilities;
use crate::clock::{Advance, SimulationClock};
use crate::grid::Grid;
use crate::random::RandomSource;
use crate::species::Species;
use eco_core::{record_gauge, Result, SimConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub struct Simulation<R: RandomSource = ChaCha8Rng> {
    grid: Grid,
    clock: SimulationClock,
    rng: R,
    config: SimConfig,
    last_extinct: Option<Species>,
}

impl Simulation<ChaCha8Rng> {
    /// Build an empty session. Uses the configured seed, or OS entropy when
    /// none is set.
    pub fn new(config: SimConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    pub fn with_rng(config: SimConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid: Grid::from_config(&config.world),
            clock: SimulationClock::new(&config.clock),
            rng,
            config,
            last_extinct: None,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Host-side mutation between polls
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Grid plus the session's random source, for abilities that scatter
    pub fn grid_and_rng(&mut self) -> (&mut Grid, &mut dyn RandomSource) {
        (&mut self.grid, &mut self.rng)
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.ticks_completed()
    }

    pub fn is_ticking(&self) -> bool {
        self.clock.is_ticking()
    }

    /// Scatter the configured starting population at random open cells
    #[instrument(skip(self))]
    pub fn seed_population(&mut self) -> usize {
        let plan = &self.config.population;
        let counts = [
            (Species::Rock, plan.rocks),
            (Species::Grass, plan.grass),
            (Species::Sheep, plan.sheep),
            (Species::Tiger, plan.tigers),
            (Species::DiseasedGrass, plan.diseased_grass),
            (Species::DiseasedSheep, plan.diseased_sheep),
            (Species::DiseasedTiger, plan.diseased_tigers),
        ];

        let mut placed = 0;
        for (species, count) in counts {
            if count > 0 {
                placed += abilities::populate(&mut self.grid, species, count, &mut self.rng);
            }
        }
        info!(placed, "Population seeded");
        placed
    }

    /// Feed elapsed host frame time
    pub fn frame(&mut self, delta: Duration) -> bool {
        self.clock.accumulate(delta)
    }

    pub fn request_tick(&mut self) {
        self.clock.request_tick();
    }

    /// Host poll. Runs part or all of the current tick.
    pub fn advance(&mut self) -> Advance {
        let outcome = self
            .clock
            .advance(&mut self.grid, &mut self.rng, &self.config.behavior);

        if let Advance::Completed { tick, .. } = outcome {
            self.report(tick);
        }
        outcome
    }

    /// First living species whose population has died out, if any
    pub fn extinct_species(&self) -> Option<Species> {
        self.grid.population().extinct_species()
    }

    /// First healthy species that died out; diseased variants are ignored
    pub fn extinct_healthy_species(&self) -> Option<Species> {
        self.grid.population().extinct_healthy_species()
    }

    /// Clear the board for a new session
    pub fn reset(&mut self) -> usize {
        self.last_extinct = None;
        let removed = self.grid.remove_all();
        info!(removed, "Session reset");
        removed
    }

    fn report(&mut self, tick: u64) {
        let population = self.grid.population();
        info!(tick, entities = self.grid.len(), "Tick complete");
        for (species, count) in population.iter() {
            record_gauge!("population", count, tick = tick, species = species.label());
        }

        let extinct = population.extinct_species();
        if extinct != self.last_extinct {
            if let Some(species) = extinct {
                warn!(tick, species = %species, "Species extinct");
            }
            self.last_extinct = extinct;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::random::FixedRandom;
    use eco_core::{Layer, Position, WorldConfig};

    fn small_config() -> SimConfig {
        SimConfig {
            seed: Some(42),
            world: WorldConfig {
                width: 5,
                height: 5,
                tile_size: 16,
            },
            ..Default::default()
        }
    }

    fn run_tick<R: RandomSource>(sim: &mut Simulation<R>) -> Advance {
        sim.request_tick();
        loop {
            let outcome = sim.advance();
            if matches!(outcome, Advance::Completed { .. }) {
                return outcome;
            }
        }
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(small_config()).unwrap();
        assert_eq!(sim.grid().width(), 5);
        assert_eq!(sim.tick_count(), 0);
        assert!(sim.grid().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.world.height = -1;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_lone_plant_stays_put() {
        let mut sim = Simulation::with_rng(small_config(), FixedRandom(1.0)).unwrap();
        let grass = sim
            .grid_mut()
            .add(Entity::new(Species::Grass, Position::new(0, 0)))
            .unwrap();

        run_tick(&mut sim);

        assert_eq!(sim.grid().len(), 1);
        let here = sim.grid().objects_at(Position::new(0, 0), Some(Layer::Background));
        assert_eq!(here.len(), 1);
        assert_eq!(here[0].id(), grass);
    }

    #[test]
    fn test_carnivore_catches_adjacent_herbivore() {
        let mut sim = Simulation::with_rng(small_config(), FixedRandom(1.0)).unwrap();
        let tiger = sim
            .grid_mut()
            .add(Entity::new(Species::Tiger, Position::new(2, 2)))
            .unwrap();
        let sheep = sim
            .grid_mut()
            .add(Entity::new(Species::Sheep, Position::new(2, 1)))
            .unwrap();

        run_tick(&mut sim);

        let tiger = sim.grid().get(tiger).unwrap();
        let prior = Position::new(2, 1);
        assert!(tiger.position().manhattan_distance(&prior) <= 1);
        if tiger.position() == prior {
            assert!(!sim.grid().contains(sheep));
            assert_eq!(tiger.steps_since_eat(), 0);
        }
    }

    #[test]
    fn test_starving_herbivore_removed() {
        let mut sim = Simulation::with_rng(small_config(), FixedRandom(1.0)).unwrap();
        let sheep = sim
            .grid_mut()
            .add(Entity::new(Species::Sheep, Position::new(2, 2)).with_steps_since_eat(7))
            .unwrap();

        run_tick(&mut sim);
        assert!(!sim.grid().contains(sheep));
    }

    #[test]
    fn test_extinction_signal() {
        let mut sim = Simulation::with_rng(small_config(), FixedRandom(1.0)).unwrap();
        let grid = sim.grid_mut();
        grid.add(Entity::new(Species::Grass, Position::new(0, 0))).unwrap();
        grid.add(Entity::new(Species::Tiger, Position::new(4, 4))).unwrap();
        let sheep = grid.add(Entity::new(Species::Sheep, Position::new(2, 2))).unwrap();
        assert_eq!(sim.extinct_species(), None);

        sim.grid_mut().remove(sheep);
        assert_eq!(sim.extinct_species(), Some(Species::Sheep));
    }

    #[test]
    fn test_frames_drive_ticks() {
        let mut sim = Simulation::with_rng(small_config(), FixedRandom(1.0)).unwrap();
        assert_eq!(sim.advance(), Advance::Idle);

        assert!(!sim.frame(Duration::from_millis(500)));
        assert!(sim.frame(Duration::from_millis(500)));
        assert!(matches!(sim.advance(), Advance::Completed { tick: 1, .. }));
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn test_seed_and_reset() {
        let mut config = small_config();
        config.population.rocks = 2;
        config.population.grass = 5;
        config.population.sheep = 3;
        config.population.tigers = 1;
        let mut sim = Simulation::new(config).unwrap();

        let placed = sim.seed_population();
        assert_eq!(placed, sim.grid().len());
        assert!(placed > 0);

        assert_eq!(sim.reset(), placed);
        assert!(sim.grid().is_empty());
        assert_eq!(sim.extinct_species(), None);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut config = small_config();
        config.world.width = 12;
        config.world.height = 12;
        config.population.grass = 30;
        config.population.sheep = 6;
        config.population.tigers = 2;

        let summary = |config: SimConfig| {
            let mut sim = Simulation::new(config).unwrap();
            sim.seed_population();
            for _ in 0..10 {
                run_tick(&mut sim);
            }
            Species::ALL.map(|s| sim.grid().population().count(s))
        };

        assert_eq!(summary(config.clone()), summary(config));
    }
}
