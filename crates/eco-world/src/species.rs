//! Species registry.
//!
//! Each species is described once by an immutable [`SpeciesDescriptor`] in a
//! static table indexed by [`Species`]. Entities only carry the `Species`
//! key; everything else is looked up here.

use crate::behavior::{self, BehaviorFn};
use eco_core::{Layer, TileId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Rock,
    Grass,
    DiseasedGrass,
    Sheep,
    DiseasedSheep,
    Tiger,
    DiseasedTiger,
}

/// Category label used for behavior-targeting queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Inanimate,
    Plant,
    Herbivore,
    Carnivore,
    Diseased,
}

pub struct SpeciesDescriptor {
    pub species: Species,
    pub label: &'static str,
    pub tags: &'static [Tag],
    pub layer: Layer,
    pub tile: TileId,
    /// Species whose behavior a diseased variant wraps
    pub base: Option<Species>,
    pub behavior: BehaviorFn,
}

impl SpeciesDescriptor {
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn has_tags(&self, tags: &[Tag]) -> bool {
        tags.iter().all(|tag| self.has_tag(*tag))
    }

    /// Plants and animals; terrain is not living
    pub fn is_living(&self) -> bool {
        self.has_tag(Tag::Plant) || self.has_tag(Tag::Herbivore) || self.has_tag(Tag::Carnivore)
    }
}

impl fmt::Debug for SpeciesDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeciesDescriptor")
            .field("label", &self.label)
            .field("tags", &self.tags)
            .field("layer", &self.layer)
            .field("tile", &self.tile)
            .field("base", &self.base)
            .finish()
    }
}

static REGISTRY: [SpeciesDescriptor; Species::COUNT] = [
    SpeciesDescriptor {
        species: Species::Rock,
        label: "Rock",
        tags: &[Tag::Inanimate],
        layer: Layer::Foreground,
        tile: TileId(12),
        base: None,
        behavior: behavior::inert,
    },
    SpeciesDescriptor {
        species: Species::Grass,
        label: "Grass",
        tags: &[Tag::Plant],
        layer: Layer::Background,
        tile: TileId(1),
        base: None,
        behavior: behavior::plant,
    },
    SpeciesDescriptor {
        species: Species::DiseasedGrass,
        label: "Diseased Grass",
        tags: &[Tag::Plant, Tag::Diseased],
        layer: Layer::Background,
        tile: TileId(2),
        base: Some(Species::Grass),
        behavior: behavior::diseased,
    },
    SpeciesDescriptor {
        species: Species::Sheep,
        label: "Sheep",
        tags: &[Tag::Herbivore],
        layer: Layer::Foreground,
        tile: TileId(20),
        base: None,
        behavior: behavior::herbivore,
    },
    SpeciesDescriptor {
        species: Species::DiseasedSheep,
        label: "Diseased Sheep",
        tags: &[Tag::Herbivore, Tag::Diseased],
        layer: Layer::Foreground,
        tile: TileId(21),
        base: Some(Species::Sheep),
        behavior: behavior::diseased,
    },
    SpeciesDescriptor {
        species: Species::Tiger,
        label: "Tiger",
        tags: &[Tag::Carnivore],
        layer: Layer::Foreground,
        tile: TileId(30),
        base: None,
        behavior: behavior::carnivore,
    },
    SpeciesDescriptor {
        species: Species::DiseasedTiger,
        label: "Diseased Tiger",
        tags: &[Tag::Carnivore, Tag::Diseased],
        layer: Layer::Foreground,
        tile: TileId(31),
        base: Some(Species::Tiger),
        behavior: behavior::diseased,
    },
];

impl Species {
    pub const COUNT: usize = 7;

    pub const ALL: [Species; Species::COUNT] = [
        Species::Rock,
        Species::Grass,
        Species::DiseasedGrass,
        Species::Sheep,
        Species::DiseasedSheep,
        Species::Tiger,
        Species::DiseasedTiger,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static SpeciesDescriptor {
        &REGISTRY[self.index()]
    }

    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    pub fn layer(self) -> Layer {
        self.descriptor().layer
    }

    pub fn has_tag(self, tag: Tag) -> bool {
        self.descriptor().has_tag(tag)
    }

    /// The diseased variant of a base species, if it has one
    pub fn diseased(self) -> Option<Species> {
        Species::ALL
            .into_iter()
            .find(|candidate| candidate.descriptor().base == Some(self))
    }

    pub fn from_label(label: &str) -> Option<Species> {
        Species::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_indexed_by_species() {
        for species in Species::ALL {
            assert_eq!(species.descriptor().species, species);
        }
    }

    #[test]
    fn test_layers() {
        assert_eq!(Species::Grass.layer(), Layer::Background);
        assert_eq!(Species::DiseasedGrass.layer(), Layer::Background);
        assert_eq!(Species::Rock.layer(), Layer::Foreground);
        assert_eq!(Species::Sheep.layer(), Layer::Foreground);
        assert_eq!(Species::Tiger.layer(), Layer::Foreground);
    }

    #[test]
    fn test_diseased_variants_inherit_base_tags() {
        for species in Species::ALL {
            if let Some(base) = species.descriptor().base {
                assert!(species.has_tag(Tag::Diseased));
                assert!(species.descriptor().has_tags(base.descriptor().tags));
                assert_eq!(species.layer(), base.layer());
                assert_eq!(base.diseased(), Some(species));
            }
        }
    }

    #[test]
    fn test_living() {
        assert!(!Species::Rock.descriptor().is_living());
        assert!(Species::Grass.descriptor().is_living());
        assert!(Species::Sheep.descriptor().is_living());
        assert!(Species::DiseasedTiger.descriptor().is_living());
    }

    #[test]
    fn test_labels_are_unique() {
        for species in Species::ALL {
            assert_eq!(Species::from_label(species.label()), Some(species));
        }
        assert_eq!(Species::from_label("Wolf"), None);
    }
}
