//! Arc-consistency maintenance after a domain shrinks.
//!
//! Queue-based propagation: every position whose domain shrank is queued;
//! when it is processed, each in-bounds neighbor keeps only the variants that
//! some variant of the processed cell can sit next to. A neighbor that shrinks
//! is queued in turn.
//!
//! Contradictions are soft. If a neighbor would be left with nothing, the
//! contradiction is logged and the neighbor keeps its domain unchanged;
//! propagation carries on with the rest of the queue.
//!
//! Every enqueue follows a strict shrink, so the queue drains after at most
//! `|grid| * |catalog|` shrinks.

use super::catalog::{TileCatalog, TileIndex};
use super::contradiction::{Contradiction, ContradictionKind, ContradictionLog};
use super::direction::Direction;
use super::grid::Grid;
use bevy::log::warn;
use bevy::math::IVec3;
use std::collections::VecDeque;

/// What one drain of the queue changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationOutcome {
    /// Cells whose domain shrank, in the order they shrank (a cell may repeat).
    pub shrunk: Vec<IVec3>,
    /// Positions dequeued and processed.
    pub processed: usize,
    /// Contradictions logged during the drain.
    pub contradictions: usize,
}

/// Propagation work queue for one run.
#[derive(Debug, Clone)]
pub struct Propagator {
    queue: VecDeque<IVec3>,
    /// `queued[i]`: cell `i` is waiting in the queue.
    queued: Vec<bool>,
    /// Scratch: `allowed[b]` for the neighbor being checked.
    allowed: Vec<bool>,
    /// Total positions processed across the run.
    total_processed: usize,
}

impl Propagator {
    pub fn new(grid_len: usize, catalog_len: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(grid_len),
            queued: vec![false; grid_len],
            allowed: vec![false; catalog_len],
            total_processed: 0,
        }
    }

    /// Queue `pos` for a re-check of its neighbors. No-op if already queued.
    pub fn enqueue(&mut self, grid: &Grid, pos: IVec3) {
        let Some(i) = grid.index(pos) else {
            return;
        };
        if !self.queued[i] {
            self.queued[i] = true;
            self.queue.push_back(pos);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn total_processed(&self) -> usize {
        self.total_processed
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.queued.fill(false);
    }

    /// Drain the queue, shrinking neighbors until nothing changes.
    pub fn propagate(
        &mut self,
        grid: &mut Grid,
        catalog: &TileCatalog,
        log: &mut ContradictionLog,
    ) -> PropagationOutcome {
        let mut outcome = PropagationOutcome::default();

        while let Some(current) = self.queue.pop_front() {
            if let Some(i) = grid.index(current) {
                self.queued[i] = false;
            }
            outcome.processed += 1;
            self.total_processed += 1;

            let current_tiles: Vec<TileIndex> = match grid.cell(current) {
                Some(cell) if !cell.domain.is_empty() => cell.domain.tiles().to_vec(),
                // A gap has nothing to say about its neighbors
                _ => continue,
            };

            for dir in Direction::ALL {
                let Some(neighbor) = grid.neighbor(current, dir) else {
                    continue;
                };

                let allowed = self.allowed_for(catalog, &current_tiles, dir, grid, neighbor);
                let before = grid.cell(neighbor).map_or(0, |c| c.domain.len());

                if allowed.is_empty() {
                    warn!(
                        "Contradiction at {} (propagating {} from {})",
                        neighbor, dir, current
                    );
                    log.record(Contradiction {
                        pos: neighbor,
                        kind: ContradictionKind::Propagation {
                            from: current,
                            direction: dir,
                        },
                    });
                    outcome.contradictions += 1;
                    continue;
                }

                if allowed.len() < before {
                    if let Some(cell) = grid.cell_mut(neighbor) {
                        cell.domain.narrow_to(&allowed);
                    }
                    outcome.shrunk.push(neighbor);
                    self.enqueue(grid, neighbor);
                }
            }
        }

        outcome
    }

    /// Variants of the neighbor's domain that at least one of `current_tiles`
    /// accepts across face `dir`.
    fn allowed_for(
        &mut self,
        catalog: &TileCatalog,
        current_tiles: &[TileIndex],
        dir: Direction,
        grid: &Grid,
        neighbor: IVec3,
    ) -> Vec<TileIndex> {
        self.allowed.fill(false);
        for &tile in current_tiles {
            for &b in catalog.neighbors(tile, dir) {
                self.allowed[b] = true;
            }
        }

        match grid.cell(neighbor) {
            Some(cell) => cell
                .domain
                .tiles()
                .iter()
                .copied()
                .filter(|&b| self.allowed[b])
                .collect(),
            None => Vec::new(),
        }
    }
}
