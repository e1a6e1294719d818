use std::sync::atomic::Ordering;

use crate::problem::Problem;
use crate::types::{SolverError, ValueGrid};

use super::constraint_table::ConstraintTable;
use super::planner;
use super::store::AssignmentStore;
use super::{maybe_call_callback, Config, Counters, Solution};

/// The odometer search loop. Treats the flat assignment as a counter
/// in the increment order chosen by the planner, evaluates constraints
/// on each candidate, and on failure jumps the counter past every
/// candidate that differs only in cells the failing constraint never
/// read. Yields solutions lazily; `solver::solve` is the collecting
/// entry point.
pub struct Engine<'p> {
    problem: &'p Problem,
    store: AssignmentStore,
    table: ConstraintTable<'p>,
    order: Vec<usize>,
    touch_flat: Vec<bool>,
    counters: Counters,
    config: Config,
    started: bool,
    finished: bool,
}

impl Iterator for Engine<'_> {
    type Item = Result<Solution, SolverError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.run()
    }
}

impl<'p> Engine<'p> {
    pub fn new(problem: &'p Problem, config: Config) -> Result<Engine<'p>, SolverError> {
        if problem.constraints().is_empty() {
            return Err(SolverError::EmptyProblem);
        }

        let store = AssignmentStore::new(problem);
        assert!(store.num_cells() > 0);

        let mut table = ConstraintTable::new(problem, &store)?;
        let order = planner::make_increment_order(&mut table, store.num_cells())?;
        let touch_flat = vec![false; store.num_cells()];

        Ok(Engine {
            problem,
            store,
            table,
            order,
            touch_flat,
            counters: Counters::default(),
            config,
            started: false,
            finished: false,
        })
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    fn run(&mut self) -> Option<Result<Solution, SolverError>> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            self.update_progress();
            maybe_call_callback(&mut self.config.progress_callback, &self.counters);
        }

        let reorder_interval = self.config.reorder_interval.max(1);

        loop {
            if let Some(abort) = &self.config.abort {
                if abort.load(Ordering::Relaxed) {
                    self.finish();
                    return None;
                }
            }

            let exploring = self.counters.nodes % reorder_interval == 0;
            let mut increment_index = 0;
            let mut solution_ok = true;

            for i in 0..self.table.len() {
                let entry = &self.table.entries()[i];
                entry.clear_touches();
                self.counters.constraints_evaluated += 1;

                let satisfied = match entry.evaluate() {
                    Ok(satisfied) => satisfied,
                    Err(error) => {
                        self.finish();
                        return Some(Err(error));
                    }
                };

                if satisfied {
                    self.table.entries_mut()[i].estimated_quality = 0;
                    continue;
                }

                solution_ok = false;
                self.touch_flat.fill(false);
                self.table.entries()[i].collect_touches(&mut self.touch_flat);

                // The deepest position we may jump to is the first
                // cell (in odometer order) the failing constraint read.
                let skip = match self.skip_index() {
                    Some(skip) => skip,
                    None => {
                        let constraint = self.table.entries()[i].index;
                        self.finish();
                        return Some(Err(SolverError::NoCellsRead { constraint }));
                    }
                };
                self.table.entries_mut()[i].estimated_quality = skip;
                increment_index = increment_index.max(skip);

                if !exploring {
                    break;
                }
            }

            if exploring {
                self.table.sort_by_quality_desc();
            }

            let solution = if solution_ok {
                increment_index = 1;
                self.counters.solutions += 1;
                Some(self.capture_solution())
            } else {
                None
            };
            if increment_index > 1 {
                self.counters.skips += 1;
            }

            assert!(increment_index >= 1);
            let overflowed = self.step_odometer(increment_index);
            self.counters.nodes += 1;
            if overflowed {
                // The exhausted counter state is the last node considered.
                self.counters.nodes += 1;
                self.finish();
            }

            if let Some(solution) = solution {
                return Some(Ok(solution));
            }
            if self.finished {
                return None;
            }

            if self.counters.nodes & self.config.progress_frequency_mask == 0 {
                self.update_progress();
                maybe_call_callback(&mut self.config.progress_callback, &self.counters);
            }
        }
    }

    // Position (1-based, in odometer order) of the first touched cell.
    fn skip_index(&self) -> Option<usize> {
        self.order
            .iter()
            .position(|&cell| self.touch_flat[cell])
            .map(|i| i + 1)
    }

    // Resets every position below increment_index, increments the
    // position at it, and carries upward. Returns true when the carry
    // runs off the most significant position.
    fn step_odometer(&mut self, increment_index: usize) -> bool {
        let num_cells = self.order.len();

        for i in 0..increment_index - 1 {
            let cell = self.order[i];
            self.store.set_cell(cell, self.store.lower(cell));
        }
        self.store.inc_cell(self.order[increment_index - 1]);

        for i in increment_index - 1..num_cells - 1 {
            let cell = self.order[i];
            if self.store.cell(cell) <= self.store.upper(cell) {
                break;
            }
            self.store.set_cell(cell, self.store.lower(cell));
            self.store.inc_cell(self.order[i + 1]);
        }

        let top = self.order[num_cells - 1];
        self.store.cell(top) > self.store.upper(top)
    }

    fn capture_solution(&self) -> Solution {
        self.problem
            .variables()
            .iter()
            .enumerate()
            .map(|(i, var)| {
                let values = self.store.copy_cells(self.store.offset(i), var.len());
                (var.name.clone(), ValueGrid::new(var.dims.clone(), values))
            })
            .collect()
    }

    fn finish(&mut self) {
        self.finished = true;
        self.update_progress();
        maybe_call_callback(&mut self.config.progress_callback, &self.counters);
    }

    // Odometer position as a fraction of the full product, most
    // significant digit first.
    fn update_progress(&mut self) {
        let mut ratio = 0.0;
        let mut weight = 1.0;
        for &cell in self.order.iter().rev() {
            let width = (self.store.upper(cell) - self.store.lower(cell) + 1) as f64;
            weight /= width;
            ratio += (self.store.cell(cell) - self.store.lower(cell)) as f64 * weight;
        }
        self.counters.progress_ratio = ratio.min(1.0);
    }
}
