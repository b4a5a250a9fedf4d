//! Ecosystem simulation engine.
//!
//! A bounded two-layer grid of plants, herbivores, carnivores and terrain
//! that evolves in discrete, time-sliced ticks while staying safe to query
//! and mutate from the host between polls.

pub mod abilities;
pub mod behavior;
pub mod clock;
pub mod entity;
pub mod grid;
pub mod population;
pub mod random;
pub mod simulation;
pub mod species;

pub use clock::{Advance, SimulationClock};
pub use entity::Entity;
pub use grid::{Criteria, Grid};
pub use population::Population;
pub use random::{FixedRandom, RandomSource};
pub use simulation::Simulation;
pub use species::{Species, SpeciesDescriptor, Tag};
