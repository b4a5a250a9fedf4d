//! Bounded 2D grid that owns every live entity.
//!
//! The grid keeps three views in lockstep: the entity table, the insertion
//! order list, and one occupancy plane per [`Layer`]. Every mutation goes
//! through the methods here, which update all three plus the population
//! counters before returning.

use crate::entity::Entity;
use crate::population::Population;
use crate::random::{shuffle_with, RandomSource};
use crate::species::{Species, Tag};
use eco_core::{Direction, EntityId, Error, Layer, Position, Result, TileId, WorldConfig};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Filters for [`Grid::closest_object`]
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub species: Option<Species>,
    pub tags: Vec<Tag>,
    pub exclude: Option<EntityId>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact species (label) match
    pub fn species(mut self, species: Species) -> Self {
        self.species = Some(species);
        self
    }

    /// Require a category tag; repeated calls require all of them
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn excluding(mut self, id: EntityId) -> Self {
        self.exclude = Some(id);
        self
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        if self.exclude == Some(entity.id()) {
            return false;
        }
        if let Some(species) = self.species {
            if entity.species() != species {
                return false;
            }
        }
        entity.descriptor().has_tags(&self.tags)
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    tile_size: u32,
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,
    cells: [Vec<Option<EntityId>>; 2],
    population: Population,
}

impl Grid {
    /// Build an empty grid. Dimensions whose area does not fit in `i32`
    /// produce a grid with no cells.
    pub fn new(width: i32, height: i32, tile_size: u32) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        let (width, height, size) = match WorldConfig::cell_count(width, height) {
            Some(size) => (width, height, size),
            None => {
                warn!(width, height, "Grid too large, creating an empty grid");
                (0, 0, 0)
            }
        };
        Self {
            width,
            height,
            tile_size,
            entities: HashMap::new(),
            order: Vec::new(),
            cells: [vec![None; size], vec![None; size]],
            population: Population::new(),
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.width, config.height, config.tile_size)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Pixel size of a cell, for the renderer
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Live entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.order.iter().filter_map(move |id| self.entities.get(id))
    }

    /// Snapshot of live ids in insertion order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// In bounds and unoccupied on `layer`
    pub fn is_open(&self, pos: Position, layer: Layer) -> bool {
        match self.index(pos) {
            Some(index) => self.cells[layer.index()][index].is_none(),
            None => false,
        }
    }

    /// Place an entity, failing with [`Error::InvalidPlacement`] if its cell
    /// is occupied or out of bounds.
    pub fn add(&mut self, entity: Entity) -> Result<EntityId> {
        let position = entity.position();
        let layer = entity.layer();
        let Some(index) = self.index(position).filter(|_| self.is_open(position, layer)) else {
            return Err(Error::InvalidPlacement { position, layer });
        };

        let id = entity.id();
        let species = entity.species();
        self.cells[layer.index()][index] = Some(id);
        self.order.push(id);
        self.entities.insert(id, entity);
        self.population.increment(species);

        trace!(entity_id = %id, species = %species, x = position.x, y = position.y, "Entity added");
        Ok(id)
    }

    /// Place an entity if its cell is open. Leaves the grid untouched otherwise.
    pub fn try_add(&mut self, entity: Entity) -> bool {
        self.add(entity).is_ok()
    }

    /// Take an entity off the grid, vacating its cell. Returns `None` if the
    /// id is not live.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        if let Some(index) = self.index(entity.position()) {
            self.cells[entity.layer().index()][index] = None;
        }
        if let Some(slot) = self.order.iter().position(|other| *other == id) {
            self.order.remove(slot);
        }
        self.population.decrement(entity.species());

        trace!(entity_id = %id, species = %entity.species(), "Entity removed");
        Some(entity)
    }

    /// Remove every entity and forget which species were tracked.
    pub fn remove_all(&mut self) -> usize {
        let removed = self.order.len();
        self.entities.clear();
        self.order.clear();
        for plane in &mut self.cells {
            plane.iter_mut().for_each(|cell| *cell = None);
        }
        self.population.reset();
        removed
    }

    /// Move an entity to `to` on its own layer.
    pub fn move_entity(&mut self, id: EntityId, to: Position) -> Result<()> {
        let (from, layer) = match self.entities.get(&id) {
            Some(entity) => (entity.position(), entity.layer()),
            None => return Err(Error::UnknownEntity(id)),
        };
        let Some(to_index) = self.index(to).filter(|_| self.is_open(to, layer)) else {
            return Err(Error::InvalidPlacement { position: to, layer });
        };

        let from_index = self.index(from);
        let plane = &mut self.cells[layer.index()];
        if let Some(from_index) = from_index {
            plane[from_index] = None;
        }
        plane[to_index] = Some(id);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.position = to;
        }
        Ok(())
    }

    pub fn try_move(&mut self, id: EntityId, to: Position) -> bool {
        self.move_entity(id, to).is_ok()
    }

    /// Step one cell toward `target` along the dominant axis.
    pub fn try_step_towards(&mut self, id: EntityId, target: Position) -> bool {
        let Some(from) = self.get(id).map(Entity::position) else {
            return false;
        };
        match Self::direction_to(from, target) {
            Some(direction) => self.try_move(id, from.step(direction)),
            None => false,
        }
    }

    pub fn occupant(&self, pos: Position, layer: Layer) -> Option<&Entity> {
        let index = self.index(pos)?;
        self.cells[layer.index()][index].and_then(|id| self.entities.get(&id))
    }

    /// Entities at a cell, background first. At most one per layer.
    pub fn objects_at(&self, pos: Position, layer: Option<Layer>) -> Vec<&Entity> {
        match layer {
            Some(layer) => self.occupant(pos, layer).into_iter().collect(),
            None => Layer::ALL
                .iter()
                .filter_map(|layer| self.occupant(pos, *layer))
                .collect(),
        }
    }

    /// Tile the renderer should draw for a cell
    pub fn tile_at(&self, pos: Position, layer: Layer) -> TileId {
        self.occupant(pos, layer)
            .map(|entity| entity.descriptor().tile)
            .unwrap_or_else(|| layer.default_tile())
    }

    /// Nearest matching entity by Manhattan distance. Ties go to the
    /// earliest-inserted entity.
    pub fn closest_object(&self, pos: Position, criteria: &Criteria) -> Option<&Entity> {
        let mut best: Option<(&Entity, i32)> = None;
        for entity in self.entities().filter(|e| criteria.matches(e)) {
            let distance = pos.manhattan_distance(&entity.position());
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((entity, distance));
            }
        }
        best.map(|(entity, _)| entity)
    }

    pub fn distance_to(a: Position, b: Position) -> i32 {
        a.manhattan_distance(&b)
    }

    /// Unit step from `from` toward `to` along the axis with the larger
    /// displacement. Equal displacements move vertically. `None` when the
    /// positions coincide.
    pub fn direction_to(from: Position, to: Position) -> Option<Direction> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0 { Direction::East } else { Direction::West })
        } else {
            Some(if dy > 0 { Direction::South } else { Direction::North })
        }
    }

    pub fn random_direction(rng: &mut dyn RandomSource) -> Direction {
        Direction::ALL[rng.below(Direction::ALL.len())]
    }

    /// The four directions in a fresh random order
    pub fn shuffled_directions(rng: &mut dyn RandomSource) -> [Direction; 4] {
        let mut directions = Direction::ALL;
        shuffle_with(rng, &mut directions);
        directions
    }

    /// First open neighbour of `pos` on `layer`, scanning in random order
    pub fn random_open_neighbor(
        &self,
        pos: Position,
        layer: Layer,
        rng: &mut dyn RandomSource,
    ) -> Option<Position> {
        Self::shuffled_directions(rng)
            .into_iter()
            .map(|direction| pos.step(direction))
            .find(|candidate| self.is_open(*candidate, layer))
    }
}
