//! Per-species behavior rules.
//!
//! Every species' descriptor points at one of the functions here. A rule is
//! run once per tick for each live entity and reports whether the entity is
//! still on the grid afterwards. Rules only use the grid's non-failing
//! operations: a blocked placement or move is simply skipped this tick.

use crate::entity::Entity;
use crate::grid::{Criteria, Grid};
use crate::random::RandomSource;
use crate::species::{Species, Tag};
use eco_core::{BehaviorConfig, EntityId, Position};
use tracing::trace;

/// Outcome of one behavior update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Continues,
    /// The entity removed itself; its id is dead
    Removed,
}

pub type BehaviorFn = fn(EntityId, &mut Turn<'_>) -> Fate;

/// Everything a behavior rule may touch during its update
pub struct Turn<'a> {
    pub grid: &'a mut Grid,
    pub rng: &'a mut dyn RandomSource,
    pub rules: &'a BehaviorConfig,
}

impl<'a> Turn<'a> {
    pub fn new(grid: &'a mut Grid, rng: &'a mut dyn RandomSource, rules: &'a BehaviorConfig) -> Self {
        Self { grid, rng, rules }
    }

    fn position_of(&self, id: EntityId) -> Option<Position> {
        self.grid.get(id).map(Entity::position)
    }

    fn die(&mut self, id: EntityId, cause: &'static str) -> Fate {
        if let Some(entity) = self.grid.remove(id) {
            trace!(entity_id = %id, species = %entity.species(), cause, "Entity died");
        }
        Fate::Removed
    }
}

/// Run the behavior registered for the entity's species
pub fn run(id: EntityId, turn: &mut Turn<'_>) -> Fate {
    match turn.grid.get(id) {
        Some(entity) => (entity.descriptor().behavior)(id, turn),
        None => Fate::Removed,
    }
}

/// Terrain does nothing
pub fn inert(_id: EntityId, _turn: &mut Turn<'_>) -> Fate {
    Fate::Continues
}

pub fn plant(id: EntityId, turn: &mut Turn<'_>) -> Fate {
    let Some(entity) = turn.grid.get(id) else {
        return Fate::Removed;
    };
    let (species, pos) = (entity.species(), entity.position());

    if turn.rng.roll(turn.rules.plant_spread_chance) {
        let direction = Grid::random_direction(turn.rng);
        let seedling = Entity::new(species, pos.step(direction));
        if turn.grid.try_add(seedling) {
            trace!(parent = %id, species = %species, "Plant spread");
        }
    }

    if turn.rng.roll(turn.rules.plant_death_chance) {
        return turn.die(id, "withered");
    }

    Fate::Continues
}

pub fn herbivore(id: EntityId, turn: &mut Turn<'_>) -> Fate {
    let Some(entity) = turn.grid.get(id) else {
        return Fate::Removed;
    };
    let (species, pos) = (entity.species(), entity.position());

    // Keep away from the herd
    let crowd = Criteria::new().tag(Tag::Herbivore).excluding(id);
    match turn.grid.closest_object(pos, &crowd).map(Entity::position) {
        Some(other) => {
            if let Some(toward) = Grid::direction_to(pos, other) {
                turn.grid.try_move(id, pos.step(toward.opposite()));
            }
        }
        None => wander(id, turn),
    }

    let Some(pos) = turn.position_of(id) else {
        return Fate::Removed;
    };
    let forage_radius = turn.rules.forage_radius;
    let food = turn
        .grid
        .closest_object(pos, &Criteria::new().tag(Tag::Plant))
        .filter(|plant| Grid::distance_to(pos, plant.position()) <= forage_radius)
        .map(Entity::id);

    if let Some(plant) = food {
        if turn.rng.roll(turn.rules.herbivore_breed_chance) && breed(species, pos, turn) {
            turn.grid.remove(plant);
        }
    }

    starve(id, food.is_some(), turn)
}

pub fn carnivore(id: EntityId, turn: &mut Turn<'_>) -> Fate {
    let Some(entity) = turn.grid.get(id) else {
        return Fate::Removed;
    };
    let (species, pos) = (entity.species(), entity.position());
    let prey = Criteria::new().tag(Tag::Herbivore);

    match turn.grid.closest_object(pos, &prey).map(Entity::position) {
        Some(target) if Grid::distance_to(pos, target) > 1 => chase(id, pos, target, turn),
        Some(_) => {}
        None => wander(id, turn),
    }

    let Some(pos) = turn.position_of(id) else {
        return Fate::Removed;
    };
    let kill = turn
        .grid
        .closest_object(pos, &prey)
        .filter(|victim| Grid::distance_to(pos, victim.position()) == 1)
        .map(|victim| (victim.id(), victim.position()));

    if let Some((victim, victim_pos)) = kill {
        turn.grid.remove(victim);
        turn.grid.try_move(id, victim_pos);
        trace!(hunter = %id, prey = %victim, "Prey eaten");

        if turn.rng.roll(turn.rules.carnivore_breed_chance) {
            breed(species, victim_pos, turn);
        }
    }

    starve(id, kill.is_some(), turn)
}

/// Base species behavior first, then the disease's own step
pub fn diseased(id: EntityId, turn: &mut Turn<'_>) -> Fate {
    let Some(species) = turn.grid.get(id).map(Entity::species) else {
        return Fate::Removed;
    };
    let Some(base) = species.descriptor().base else {
        return Fate::Continues;
    };

    if (base.descriptor().behavior)(id, turn) == Fate::Removed {
        return Fate::Removed;
    }

    contagion(id, species, base, turn)
}

fn contagion(id: EntityId, species: Species, base: Species, turn: &mut Turn<'_>) -> Fate {
    let Some(pos) = turn.position_of(id) else {
        return Fate::Removed;
    };
    // Death and spread are independent draws; a dying carrier still infects
    let dies = turn.rng.roll(turn.rules.disease_death_chance);
    let spreads = turn.rng.roll(turn.rules.disease_spread_chance);

    if spreads {
        let radius = if base.has_tag(Tag::Plant) {
            turn.rules.plant_contagion_radius
        } else {
            turn.rules.animal_contagion_radius
        };
        let victim = turn
            .grid
            .closest_object(pos, &Criteria::new().species(base))
            .filter(|victim| Grid::distance_to(pos, victim.position()) <= radius)
            .map(Entity::id);

        if let Some(victim) = victim {
            if let Some(infected) = infect(turn.grid, victim, species) {
                trace!(carrier = %id, infected = %infected, species = %species, "Disease spread");
            }
        }
    }

    if dies {
        return turn.die(id, "disease");
    }
    Fate::Continues
}

pub fn infect(grid: &mut Grid, victim: EntityId, species: Species) -> Option<EntityId> {
    let healthy = grid.remove(victim)?;
    let sick = Entity::new(species, healthy.position()).with_steps_since_eat(healthy.steps_since_eat());
    let id = sick.id();
    grid.try_add(sick).then_some(id)
}

/// Place a newborn next to `pos`. Returns whether a cell was found.
fn breed(species: Species, pos: Position, turn: &mut Turn<'_>) -> bool {
    let Some(spot) = turn.grid.random_open_neighbor(pos, species.layer(), turn.rng) else {
        return false;
    };
    let born = turn.grid.try_add(Entity::new(species, spot));
    if born {
        trace!(species = %species, x = spot.x, y = spot.y, "Entity born");
    }
    born
}

fn wander(id: EntityId, turn: &mut Turn<'_>) {
    let Some(entity) = turn.grid.get(id) else {
        return;
    };
    let (pos, layer) = (entity.position(), entity.layer());
    if let Some(spot) = turn.grid.random_open_neighbor(pos, layer, turn.rng) {
        turn.grid.try_move(id, spot);
    }
}

/// Step toward `target`; if the direct step is blocked, take any other open
/// step that does not reverse the direct one.
fn chase(id: EntityId, pos: Position, target: Position, turn: &mut Turn<'_>) {
    let Some(toward) = Grid::direction_to(pos, target) else {
        return;
    };
    if turn.grid.try_move(id, pos.step(toward)) {
        return;
    }

    let (tx, ty) = toward.to_delta();
    for direction in Grid::shuffled_directions(turn.rng) {
        let (dx, dy) = direction.to_delta();
        if (dx - tx).abs() == 2 || (dy - ty).abs() == 2 {
            continue;
        }
        if turn.grid.try_move(id, pos.step(direction)) {
            return;
        }
    }
}

fn starve(id: EntityId, fed: bool, turn: &mut Turn<'_>) -> Fate {
    let threshold = turn.rules.starvation_threshold;
    let Some(entity) = turn.grid.get_mut(id) else {
        return Fate::Removed;
    };

    if fed {
        entity.steps_since_eat = 0;
    } else {
        entity.steps_since_eat += 1;
    }

    if entity.steps_since_eat > threshold {
        return turn.die(id, "starvation");
    }
    Fate::Continues
}
