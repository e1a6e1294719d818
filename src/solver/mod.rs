pub mod constraint_table;
pub mod engine;
pub mod planner;
pub mod store;

pub use engine::Engine;

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::problem::Problem;
use crate::types::{SolverError, ValueGrid};

/// Variable name to value grid, in declaration order.
pub type Solution = Vec<(String, ValueGrid)>;

pub type ProgressCallback = dyn FnMut(&Counters);

#[derive(Copy, Clone, Debug, Default)]
pub struct Counters {
    pub nodes: u64,
    pub solutions: u64,
    pub constraints_evaluated: u64,
    pub skips: u64,
    pub progress_ratio: f64,
}

pub struct Config {
    pub max_solutions: Option<u64>,
    /// Re-sort constraints by observed quality every this many nodes.
    /// 1 adapts fastest; larger values trade adaptivity for speed.
    pub reorder_interval: u64,
    pub progress_callback: Option<Box<ProgressCallback>>,
    pub progress_frequency_mask: u64,
    pub abort: Option<Arc<AtomicBool>>,
}

impl Default for Config {
    fn default() -> Config {
        const LOG_UPDATE_FREQUENCY: u64 = 16;
        Config {
            max_solutions: None,
            reorder_interval: 1,
            progress_callback: None,
            progress_frequency_mask: (1 << LOG_UPDATE_FREQUENCY) - 1,
            abort: None,
        }
    }
}

#[derive(Debug)]
pub struct Results {
    pub solutions: Vec<Solution>,
    pub counters: Counters,
}

/// A solve that aborted, carrying the node count accumulated up to the
/// failing candidate.
#[derive(Debug)]
pub struct SolveFailure {
    pub error: SolverError,
    pub nodes: u64,
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "solve failed after {} nodes: {}", self.nodes, self.error)
    }
}

impl std::error::Error for SolveFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Runs the search to completion, or until `config.max_solutions`
/// solutions have been found or the abort flag is raised.
pub fn solve(problem: &Problem, config: Config) -> Result<Results, SolveFailure> {
    let max_solutions = config.max_solutions;
    let mut engine = Engine::new(problem, config).map_err(|error| SolveFailure {
        error,
        nodes: 0,
    })?;

    let mut solutions = Vec::new();
    while max_solutions.map_or(true, |max| (solutions.len() as u64) < max) {
        match engine.next() {
            Some(Ok(solution)) => solutions.push(solution),
            Some(Err(error)) => {
                let nodes = engine.counters().nodes;
                return Err(SolveFailure { error, nodes });
            }
            None => break,
        }
    }

    Ok(Results {
        solutions,
        counters: *engine.counters(),
    })
}

pub(crate) fn maybe_call_callback<F: FnMut(&T) + ?Sized, T>(
    callback: &mut Option<Box<F>>,
    payload: &T,
) {
    if let Some(callback) = callback {
        (callback)(payload);
    }
}
