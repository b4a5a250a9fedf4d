//! Turn pacing and cooperative, time-sliced tick execution.
//!
//! The host feeds elapsed frame time into [`SimulationClock::accumulate`].
//! Crossing the tick period only marks a tick as pending; the work happens
//! in [`SimulationClock::advance`], which the host polls once per frame.
//! Each poll processes whole batches from a snapshot of the entity list
//! until the wall-clock budget is spent, then suspends with its cursor
//! saved for the next poll.

use crate::behavior::{self, Turn};
use crate::grid::Grid;
use crate::random::RandomSource;
use eco_core::{BehaviorConfig, ClockConfig, EntityId};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Result of one `advance()` poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Advance {
    /// No tick pending or running
    Idle,
    /// Budget spent mid-tick; the next poll resumes here
    Suspended { processed: usize, remaining: usize },
    /// The tick finished on this poll
    Completed { tick: u64, visited: usize },
}

#[derive(Debug)]
struct TickProgress {
    snapshot: Vec<EntityId>,
    cursor: usize,
    updated: usize,
}

#[derive(Debug)]
pub struct SimulationClock {
    period: Duration,
    batch_size: usize,
    slice_budget: Duration,
    accumulator: Duration,
    pending: bool,
    current: Option<TickProgress>,
    completed: u64,
}

impl SimulationClock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            period: Duration::from_millis(config.tick_period_ms),
            batch_size: config.batch_size.max(1),
            slice_budget: Duration::from_millis(config.slice_budget_ms),
            accumulator: Duration::ZERO,
            pending: false,
            current: None,
            completed: 0,
        }
    }

    /// Add host frame time. Returns true when this frame made a tick due.
    pub fn accumulate(&mut self, delta: Duration) -> bool {
        self.accumulator += delta;
        if self.accumulator >= self.period {
            self.accumulator -= self.period;
            self.request_tick();
            return true;
        }
        false
    }

    /// Mark a tick as due. At most one tick is ever pending, so repeated
    /// requests before it starts collapse into one.
    pub fn request_tick(&mut self) {
        if self.pending {
            trace!("Tick already pending, request coalesced");
        }
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// A tick has started and not yet finished
    pub fn is_ticking(&self) -> bool {
        self.current.is_some()
    }

    pub fn ticks_completed(&self) -> u64 {
        self.completed
    }

    /// Run the pending or in-progress tick until it completes or the slice
    /// budget runs out. At least one batch is processed per call.
    pub fn advance(
        &mut self,
        grid: &mut Grid,
        rng: &mut dyn RandomSource,
        rules: &BehaviorConfig,
    ) -> Advance {
        if self.current.is_none() {
            if !self.pending {
                return Advance::Idle;
            }
            self.pending = false;
            let snapshot = grid.entity_ids();
            debug!(tick = self.completed + 1, entities = snapshot.len(), "Tick started");
            self.current = Some(TickProgress {
                snapshot,
                cursor: 0,
                updated: 0,
            });
        }

        let started = Instant::now();
        let Some(progress) = self.current.as_mut() else {
            return Advance::Idle;
        };
        let mut turn = Turn::new(grid, rng, rules);

        loop {
            let end = (progress.cursor + self.batch_size).min(progress.snapshot.len());
            for id in &progress.snapshot[progress.cursor..end] {
                // Killed earlier this tick
                if !turn.grid.contains(*id) {
                    continue;
                }
                behavior::run(*id, &mut turn);
                progress.updated += 1;
            }
            progress.cursor = end;

            if progress.cursor >= progress.snapshot.len() {
                break;
            }
            if started.elapsed() >= self.slice_budget {
                let remaining = progress.snapshot.len() - progress.cursor;
                trace!(processed = progress.cursor, remaining, "Tick suspended");
                return Advance::Suspended {
                    processed: progress.cursor,
                    remaining,
                };
            }
        }

        let visited = progress.updated;
        self.current = None;
        self.completed += 1;
        debug!(tick = self.completed, visited, elapsed_us = started.elapsed().as_micros() as u64, "Tick completed");

        Advance::Completed {
            tick: self.completed,
            visited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::random::FixedRandom;
    use crate::species::Species;
    use eco_core::Position;

    fn clock(batch_size: usize, slice_budget_ms: u64) -> SimulationClock {
        SimulationClock::new(&ClockConfig {
            tick_period_ms: 1000,
            batch_size,
            slice_budget_ms,
        })
    }

    #[test]
    fn test_accumulate_marks_tick_due() {
        let mut clock = clock(100, 10);
        assert!(!clock.accumulate(Duration::from_millis(600)));
        assert!(!clock.is_pending());
        assert!(clock.accumulate(Duration::from_millis(600)));
        assert!(clock.is_pending());
        assert!(!clock.is_ticking());
    }

    #[test]
    fn test_pending_ticks_coalesce() {
        let mut clock = clock(100, 10);
        let mut grid = Grid::new(3, 3, 16);
        let rules = BehaviorConfig::default();
        let mut rng = FixedRandom(1.0);

        clock.request_tick();
        clock.request_tick();
        clock.accumulate(Duration::from_millis(1500));

        assert!(matches!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Completed { tick: 1, .. }
        ));
        assert_eq!(clock.advance(&mut grid, &mut rng, &rules), Advance::Idle);
    }

    #[test]
    fn test_idle_without_request() {
        let mut clock = clock(100, 10);
        let mut grid = Grid::new(3, 3, 16);
        let mut rng = FixedRandom(1.0);
        assert_eq!(
            clock.advance(&mut grid, &mut rng, &BehaviorConfig::default()),
            Advance::Idle
        );
        assert_eq!(clock.ticks_completed(), 0);
    }

    #[test]
    fn test_time_sliced_batches() {
        let mut clock = clock(2, 0);
        let mut grid = Grid::new(5, 5, 16);
        let rules = BehaviorConfig::default();
        let mut rng = FixedRandom(1.0);
        for x in 0..5 {
            grid.add(Entity::new(Species::Rock, Position::new(x, 0))).unwrap();
        }

        clock.request_tick();
        assert_eq!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Suspended { processed: 2, remaining: 3 }
        );
        assert!(clock.is_ticking());
        assert_eq!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Suspended { processed: 4, remaining: 1 }
        );
        assert_eq!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Completed { tick: 1, visited: 5 }
        );
        assert!(!clock.is_ticking());
        assert_eq!(clock.advance(&mut grid, &mut rng, &rules), Advance::Idle);
    }

    #[test]
    fn test_request_during_tick_is_deferred() {
        let mut clock = clock(1, 0);
        let mut grid = Grid::new(5, 5, 16);
        let rules = BehaviorConfig::default();
        let mut rng = FixedRandom(1.0);
        grid.add(Entity::new(Species::Rock, Position::new(0, 0))).unwrap();
        grid.add(Entity::new(Species::Rock, Position::new(1, 0))).unwrap();

        clock.request_tick();
        assert!(matches!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Suspended { .. }
        ));
        clock.request_tick();
        assert!(matches!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Completed { tick: 1, .. }
        ));
        assert!(clock.is_pending());
        assert!(matches!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Suspended { .. }
        ));
        assert!(matches!(
            clock.advance(&mut grid, &mut rng, &rules),
            Advance::Completed { tick: 2, .. }
        ));
    }

    #[test]
    fn test_snapshot_skips_dead_and_newborn() {
        let mut clock = clock(1, 0);
        let mut grid = Grid::new(9, 9, 16);
        let rules = BehaviorConfig::default();
        let mut rng = FixedRandom(1.0);

        let first = grid.add(Entity::new(Species::Sheep, Position::new(0, 0))).unwrap();
        let doomed = grid.add(Entity::new(Species::Sheep, Position::new(8, 0))).unwrap();
        let last = grid.add(Entity::new(Species::Sheep, Position::new(0, 8))).unwrap();

        clock.request_tick();
        clock.advance(&mut grid, &mut rng, &rules);
        assert_eq!(grid.get(first).unwrap().steps_since_eat(), 1);

        grid.remove(doomed);
        let newcomer = grid.add(Entity::new(Species::Sheep, Position::new(8, 8))).unwrap();

        let mut outcome = Advance::Idle;
        while !matches!(outcome, Advance::Completed { .. }) {
            outcome = clock.advance(&mut grid, &mut rng, &rules);
        }

        assert_eq!(outcome, Advance::Completed { tick: 1, visited: 2 });
        assert_eq!(grid.get(last).unwrap().steps_since_eat(), 1);
        assert_eq!(grid.get(newcomer).unwrap().steps_since_eat(), 0);
    }
}
