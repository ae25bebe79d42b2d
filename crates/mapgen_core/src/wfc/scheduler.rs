//! Generation state machine.
//!
//! Drives one run from an unconstrained grid to a finished map:
//!
//! ```text
//! Idle -> Initializing -> Selecting -> Collapsing -> Propagating -> Selecting ...
//!                            |
//!                            +-> Finalizing -> Bordering -> Complete
//! ```
//!
//! `advance()` performs exactly one state's work so a caller can spread a run
//! over frames. `step()` performs one whole Selecting/Collapsing/Propagating
//! cycle, and `run_to_completion()` finishes the run in one go.

use super::border::border_ring;
use super::catalog::{TileCatalog, TileIndex};
use super::collapse::collapse_cell;
use super::contradiction::{Contradiction, ContradictionKind, ContradictionLog};
use super::entropy::{choose_candidate, lowest_entropy_cells, Selection};
use super::grid::{Grid, GridError};
use super::propagator::Propagator;
use crate::config::GeneratorConfig;
use crate::generator::{GeneratorListener, GeneratorListeners, StepReport, TilePlacement};
use crate::rng::{GenRng, StdRandom};
use bevy::log::{debug, info, trace, warn};
use bevy::math::IVec3;
use std::sync::Arc;

/// Where the scheduler is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenerationState {
    /// No run in progress.
    #[default]
    Idle,
    /// Boundary constraints are about to be applied.
    Initializing,
    /// Looking for the lowest-entropy cell.
    Selecting,
    /// A cell has been chosen and is about to collapse.
    Collapsing,
    /// The collapse is being propagated.
    Propagating,
    /// Every cell is settled. Final placements are being reported.
    Finalizing,
    /// The border ring is being placed.
    Bordering,
    /// The run is over. Results stay readable until the next start.
    Complete,
}

impl GenerationState {
    /// A run has been started and has not finished.
    pub fn is_running(self) -> bool {
        !matches!(self, GenerationState::Idle | GenerationState::Complete)
    }
}

/// Numbers describing a run, for logs and UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub seed: u64,
    pub steps: usize,
    pub collapsed: usize,
    pub gaps: usize,
    pub contradictions: usize,
    pub propagations: usize,
}

/// Everything that lives only for the duration of one run.
struct GenerationRun {
    seed: u64,
    grid: Grid,
    propagator: Propagator,
    log: ContradictionLog,
    rng: StdRandom,
    history: Vec<(IVec3, TileIndex)>,
    /// `reported[i]`: cell `i` has already been handed out as a placement.
    reported: Vec<bool>,
    pending: Option<IVec3>,
    completed: bool,
}

impl GenerationRun {
    /// Push a placement for `pos` if it just reached a single variant.
    fn report_if_collapsed(&mut self, pos: IVec3, out: &mut Vec<TilePlacement>) {
        let Some(i) = self.grid.index(pos) else {
            return;
        };
        if self.reported[i] {
            return;
        }
        if let Some(tile) = self.grid.cells()[i].domain.collapsed_tile() {
            self.reported[i] = true;
            out.push(TilePlacement {
                pos,
                tile,
                border: false,
            });
        }
    }

    fn report_all_collapsed(&mut self, out: &mut Vec<TilePlacement>) {
        for i in 0..self.grid.len() {
            let pos = self.grid.cells()[i].pos;
            self.report_if_collapsed(pos, out);
        }
    }
}

/// Runs map generation over a shared catalog, one state at a time.
pub struct GenerationScheduler {
    catalog: Arc<TileCatalog>,
    config: GeneratorConfig,
    /// Fully unconstrained grid every run starts from.
    template: Grid,
    state: GenerationState,
    run: Option<GenerationRun>,
    steps: usize,
    completions: usize,
    listeners: GeneratorListeners,
}

impl GenerationScheduler {
    /// Create an idle scheduler. Fails if any grid dimension is zero.
    pub fn new(catalog: Arc<TileCatalog>, config: GeneratorConfig) -> Result<Self, GridError> {
        let template = Grid::new(config.size_x, config.height, config.size_z, catalog.len())?;
        Ok(Self {
            catalog,
            config,
            template,
            state: GenerationState::Idle,
            run: None,
            steps: 0,
            completions: 0,
            listeners: GeneratorListeners::default(),
        })
    }

    /// Swap in a new catalog. Any run in progress is cancelled.
    pub fn set_catalog(&mut self, catalog: Arc<TileCatalog>) -> Result<(), GridError> {
        self.template = Grid::new(
            self.config.size_x,
            self.config.height,
            self.config.size_z,
            catalog.len(),
        )?;
        self.catalog = catalog;
        self.cancel();
        Ok(())
    }

    pub fn add_listener(&mut self, listener: Box<dyn GeneratorListener>) {
        self.listeners.add(listener);
    }

    /// Begin a run with the configured seed, abandoning any run in progress.
    pub fn start(&mut self) {
        self.start_with_seed(self.config.seed);
    }

    /// Begin a run with an explicit seed. `None` draws one from OS entropy;
    /// the seed actually used is logged and available from `seed()`.
    pub fn start_with_seed(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or_else(|| StdRandom::from_entropy().next_u64());
        let grid = self.template.clone();
        let cells = grid.len();

        info!(
            "Starting map generation: {}x{}x{} cells, {} tiles, seed {}",
            grid.size_x(),
            grid.height(),
            grid.size_z(),
            self.catalog.len(),
            seed
        );

        self.run = Some(GenerationRun {
            seed,
            propagator: Propagator::new(cells, self.catalog.len()),
            grid,
            log: ContradictionLog::new(),
            rng: StdRandom::from_u64_seed(seed),
            history: Vec::new(),
            reported: vec![false; cells],
            pending: None,
            completed: false,
        });
        self.steps = 0;
        self.state = GenerationState::Initializing;
        self.listeners.notify_reset();
    }

    /// Abandon the current run. The completion signal will not fire for it.
    pub fn cancel(&mut self) {
        if self.state.is_running() {
            info!("Map generation cancelled after {} steps", self.steps);
        }
        if self.run.take().is_some() {
            self.listeners.notify_reset();
        }
        self.steps = 0;
        self.state = GenerationState::Idle;
    }

    /// Perform the work of the current state and move to the next one.
    ///
    /// In `Idle` and `Complete` nothing happens.
    pub fn advance(&mut self) -> StepReport {
        let mut report = match self.state {
            GenerationState::Idle | GenerationState::Complete => StepReport::default(),
            GenerationState::Initializing => self.initialize(),
            GenerationState::Selecting => self.select(),
            GenerationState::Collapsing => self.collapse(),
            GenerationState::Propagating => self.propagate(),
            GenerationState::Finalizing => self.finalize(),
            GenerationState::Bordering => self.place_border(),
        };
        report.state = self.state;
        report.step_number = self.steps;

        for placement in &report.placements {
            self.listeners.notify_placed(placement);
        }
        if report.completed {
            self.listeners.notify_complete();
        }
        report
    }

    /// Advance until the next `Selecting` or `Complete`.
    ///
    /// From `Selecting` this is one collapse and its propagation, or the
    /// whole wrap-up once nothing is left to collapse.
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport {
            state: self.state,
            step_number: self.steps,
            ..Default::default()
        };
        if !self.state.is_running() {
            return report;
        }
        loop {
            let next = self.advance();
            report.merge(next);
            if matches!(
                self.state,
                GenerationState::Selecting | GenerationState::Complete | GenerationState::Idle
            ) {
                break;
            }
        }
        report
    }

    /// Step until the run is complete. Returns everything the run reported.
    pub fn run_to_completion(&mut self) -> StepReport {
        let mut report = StepReport {
            state: self.state,
            step_number: self.steps,
            ..Default::default()
        };
        while self.state.is_running() {
            report.merge(self.step());
        }
        report
    }

    fn initialize(&mut self) -> StepReport {
        let mut report = StepReport::default();
        let Some(run) = self.run.as_mut() else {
            self.state = GenerationState::Idle;
            return report;
        };

        for dead in self.catalog.audit() {
            warn!(
                "Tile '{}' has no compatible neighbor on its {} face",
                self.catalog.variant(dead.tile).id,
                dead.direction
            );
        }

        let shrunk = run.grid.apply_boundary_constraints(&self.catalog);
        for cell in run.grid.cells() {
            if cell.domain.is_empty() {
                warn!(
                    "No tile fits the map edge at {}; the cell will stay empty",
                    cell.pos
                );
                run.log.record(Contradiction {
                    pos: cell.pos,
                    kind: ContradictionKind::Authoring,
                });
            }
        }

        if self.config.settle_boundary && !shrunk.is_empty() {
            for pos in shrunk {
                run.propagator.enqueue(&run.grid, pos);
            }
            let outcome = run
                .propagator
                .propagate(&mut run.grid, &self.catalog, &mut run.log);
            trace!(
                "Boundary settled: {} cells shrank, {} contradictions",
                outcome.shrunk.len(),
                outcome.contradictions
            );
        }

        run.report_all_collapsed(&mut report.placements);
        self.state = GenerationState::Selecting;
        report
    }

    fn select(&mut self) -> StepReport {
        let Some(run) = self.run.as_mut() else {
            self.state = GenerationState::Idle;
            return StepReport::default();
        };

        match lowest_entropy_cells(&run.grid) {
            Selection::Complete => {
                self.state = GenerationState::Finalizing;
            }
            Selection::Candidates { entropy, cells } => {
                run.pending = choose_candidate(&cells, &mut run.rng);
                trace!(
                    "Selected {:?} among {} cells of entropy {}",
                    run.pending,
                    cells.len(),
                    entropy
                );
                self.state = GenerationState::Collapsing;
            }
        }
        StepReport::default()
    }

    fn collapse(&mut self) -> StepReport {
        let mut report = StepReport::default();
        let Some(run) = self.run.as_mut() else {
            self.state = GenerationState::Idle;
            return report;
        };

        if let Some(pos) = run.pending.take() {
            if let Some(tile) = collapse_cell(&mut run.grid, pos, &mut run.rng) {
                debug!(
                    "Step {}: {} -> '{}'",
                    self.steps + 1,
                    pos,
                    self.catalog.variant(tile).id
                );
                run.history.push((pos, tile));
                run.propagator.enqueue(&run.grid, pos);
                run.report_if_collapsed(pos, &mut report.placements);
                report.collapsed = Some((pos, tile));
            }
        }
        self.state = GenerationState::Propagating;
        report
    }

    fn propagate(&mut self) -> StepReport {
        let mut report = StepReport::default();
        let Some(run) = self.run.as_mut() else {
            self.state = GenerationState::Idle;
            return report;
        };

        let outcome = run
            .propagator
            .propagate(&mut run.grid, &self.catalog, &mut run.log);
        for pos in outcome.shrunk {
            run.report_if_collapsed(pos, &mut report.placements);
        }
        self.steps += 1;
        self.state = GenerationState::Selecting;
        report
    }

    fn finalize(&mut self) -> StepReport {
        let mut report = StepReport::default();
        let Some(run) = self.run.as_mut() else {
            self.state = GenerationState::Idle;
            return report;
        };

        run.report_all_collapsed(&mut report.placements);
        self.state = GenerationState::Bordering;
        report
    }

    fn place_border(&mut self) -> StepReport {
        let mut report = StepReport::default();
        let Some(run) = self.run.as_mut() else {
            self.state = GenerationState::Idle;
            return report;
        };

        if self.config.add_border {
            match self.catalog.border() {
                Some(tile) => {
                    report.placements = border_ring(run.grid.size_x(), run.grid.size_z())
                        .into_iter()
                        .map(|pos| TilePlacement {
                            pos,
                            tile,
                            border: true,
                        })
                        .collect();
                }
                None => warn!("Border requested but the catalog has no border tile"),
            }
        }

        self.state = GenerationState::Complete;
        if !run.completed {
            run.completed = true;
            report.completed = true;
            self.completions += 1;
            info!(
                "Map generated in {} steps: {} tiles placed, {} gaps, {} contradictions",
                self.steps,
                run.grid.collapsed_count(),
                run.grid.gap_count(),
                run.log.len()
            );
        }
        report
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == GenerationState::Complete
    }

    /// Completed Selecting/Collapsing/Propagating cycles in the current run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Runs that reached `Complete` over the scheduler's lifetime.
    pub fn completions(&self) -> usize {
        self.completions
    }

    pub fn catalog(&self) -> &Arc<TileCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Grid of the current (or just completed) run.
    pub fn grid(&self) -> Option<&Grid> {
        self.run.as_ref().map(|run| &run.grid)
    }

    pub fn contradictions(&self) -> Option<&ContradictionLog> {
        self.run.as_ref().map(|run| &run.log)
    }

    /// Cells chosen by selection and the variant each collapsed to, in order.
    pub fn history(&self) -> &[(IVec3, TileIndex)] {
        match &self.run {
            Some(run) => &run.history,
            None => &[],
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.run.as_ref().map(|run| run.seed)
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.run.as_ref().map(|run| RunSummary {
            seed: run.seed,
            steps: self.steps,
            collapsed: run.grid.collapsed_count(),
            gaps: run.grid.gap_count(),
            contradictions: run.log.len(),
            propagations: run.propagator.total_processed(),
        })
    }
}
