//! Entity state.

use crate::species::{Species, SpeciesDescriptor};
use eco_core::{EntityId, Layer, Position};

/// A live occupant of the grid.
///
/// Entities are created detached and handed to [`Grid::add`](crate::Grid::add),
/// which takes ownership. Position only changes through the grid's move
/// operations, so the fields are read-only from outside the crate.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    species: Species,
    pub(crate) position: Position,
    pub(crate) steps_since_eat: u32,
}

impl Entity {
    pub fn new(species: Species, position: Position) -> Self {
        Self {
            id: EntityId::new(),
            species,
            position,
            steps_since_eat: 0,
        }
    }

    /// Start with a given starvation counter
    pub fn with_steps_since_eat(mut self, steps: u32) -> Self {
        self.steps_since_eat = steps;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn descriptor(&self) -> &'static SpeciesDescriptor {
        self.species.descriptor()
    }

    pub fn layer(&self) -> Layer {
        self.species.layer()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Ticks since this entity last fed
    pub fn steps_since_eat(&self) -> u32 {
        self.steps_since_eat
    }
}
