//! Per-species live counts and extinction detection.

use crate::species::Species;
use serde::Serialize;

/// Live count per species.
///
/// Only [`Grid`](crate::Grid) mutates this, once per add and once per
/// remove, so the counts always equal the number of live entities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Population {
    counts: [usize; Species::COUNT],
    /// A species is tracked from its first placement until the next reset
    tracked: [bool; Species::COUNT],
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn increment(&mut self, species: Species) {
        let i = species.index();
        self.counts[i] += 1;
        self.tracked[i] = true;
    }

    pub(crate) fn decrement(&mut self, species: Species) {
        let i = species.index();
        self.counts[i] = self.counts[i].saturating_sub(1);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn count(&self, species: Species) -> usize {
        self.counts[species.index()]
    }

    pub fn is_tracked(&self, species: Species) -> bool {
        self.tracked[species.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Tracked species with their live counts, in registry order
    pub fn iter(&self) -> impl Iterator<Item = (Species, usize)> + '_ {
        Species::ALL
            .into_iter()
            .filter(|s| self.is_tracked(*s))
            .map(|s| (s, self.count(s)))
    }

    /// First tracked living species with no live members, in registry order.
    ///
    /// Terrain never counts. A species that was never placed this session is
    /// not tracked and so cannot be extinct.
    pub fn extinct_species(&self) -> Option<Species> {
        Species::ALL.into_iter().find(|species| {
            species.descriptor().is_living()
                && self.is_tracked(*species)
                && self.count(*species) == 0
        })
    }

    /// Like [`extinct_species`](Self::extinct_species) but ignores diseased
    /// variants, so an outbreak burning out is not reported.
    pub fn extinct_healthy_species(&self) -> Option<Species> {
        Species::ALL.into_iter().find(|species| {
            species.descriptor().is_living()
                && species.descriptor().base.is_none()
                && self.is_tracked(*species)
                && self.count(*species) == 0
        })
    }
}
