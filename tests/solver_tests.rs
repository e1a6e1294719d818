use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fd_solver::problem::Problem;
use fd_solver::solver::{solve, Config, Solution};
use fd_solver::types::{CellValue, SolverError, ValueGrid};

fn scalar(solution: &Solution, name: &str) -> CellValue {
    let (_, grid) = solution
        .iter()
        .find(|(n, _)| n == name)
        .expect("missing variable");
    assert_eq!(grid.values.len(), 1);
    grid.values[0]
}

fn less_than_problem() -> Problem {
    let mut problem = Problem::new();
    problem.add_scalar("a", 0, 2).unwrap();
    problem.add_scalar("b", 0, 2).unwrap();
    problem
        .add_constraint(&["a", "b"], |views| {
            Ok(views[0].read(&[0])? < views[1].read(&[0])?)
        })
        .unwrap();
    problem
}

#[test]
fn single_scalar_domain() {
    let mut problem = Problem::new();
    problem.add_scalar("x", 0, 2).unwrap();
    problem
        .add_constraint_on("x", |x| Ok(x.read(&[0])? >= 1))
        .unwrap();

    let results = solve(&problem, Config::default()).unwrap();

    let values: Vec<_> = results.solutions.iter().map(|s| scalar(s, "x")).collect();
    assert_eq!(values, [1, 2]);
    // Three candidates, then the exhausted counter state.
    assert_eq!(results.counters.nodes, 4);
}

#[test]
fn two_scalars_inequality() {
    let results = solve(&less_than_problem(), Config::default()).unwrap();

    let pairs: Vec<_> = results
        .solutions
        .iter()
        .map(|s| (scalar(s, "a"), scalar(s, "b")))
        .collect();
    assert_eq!(pairs, [(0, 1), (0, 2), (1, 2)]);
}

#[test]
fn infeasible_problem_visits_whole_domain() {
    let mut problem = Problem::new();
    problem.add_scalar("x", 0, 1).unwrap();
    problem
        .add_constraint_on("x", |x| Ok(x.read(&[0])? > 5))
        .unwrap();

    let results = solve(&problem, Config::default()).unwrap();

    assert!(results.solutions.is_empty());
    assert_eq!(results.counters.nodes, 3);
}

#[test]
fn max_solutions_truncates_in_discovery_order() {
    let full = solve(&less_than_problem(), Config::default()).unwrap();
    let truncated = solve(
        &less_than_problem(),
        Config {
            max_solutions: Some(2),
            ..Config::default()
        },
    )
    .unwrap();

    assert_eq!(truncated.solutions.len(), 2);
    assert_eq!(truncated.solutions, full.solutions[..2]);
    assert!(truncated.counters.nodes < full.counters.nodes);
}

#[test]
fn multi_cell_variable_keeps_its_shape() {
    let mut problem = Problem::new();
    problem
        .add_variable(
            "g",
            ValueGrid::filled(vec![2, 2], 0),
            ValueGrid::filled(vec![2, 2], 1),
        )
        .unwrap();
    problem
        .add_constraint_on("g", |g| {
            let mut sum = 0;
            for i in 0..g.len() {
                sum += g.get(i)?;
            }
            Ok(sum == 2)
        })
        .unwrap();

    let results = solve(&problem, Config::default()).unwrap();

    assert_eq!(results.solutions.len(), 6);
    for solution in &results.solutions {
        let (name, grid) = &solution[0];
        assert_eq!(name, "g");
        assert_eq!(grid.dims, [2, 2]);
        assert!(grid.values.iter().all(|&v| (0..=1).contains(&v)));
        assert_eq!(grid.values.iter().sum::<CellValue>(), 2);
    }
    assert_eq!(results.counters.nodes, 17);
}

#[test]
fn failing_constraint_skips_unread_cells() {
    let mut problem = Problem::new();
    problem.add_scalar("a", 0, 9).unwrap();
    problem.add_scalar("b", 0, 9).unwrap();
    problem
        .add_constraint_on("a", |a| Ok(a.read(&[0])? == 7))
        .unwrap();

    let results = solve(&problem, Config::default()).unwrap();

    assert_eq!(results.solutions.len(), 10);
    assert!(results.solutions.iter().all(|s| scalar(s, "a") == 7));
    // Values of b are never enumerated against failing values of a.
    assert!(results.counters.nodes < 100);
    assert!(results.counters.skips > 0);
}

#[test]
fn solving_twice_is_idempotent() {
    let problem = less_than_problem();
    let first = solve(&problem, Config::default()).unwrap();
    let second = solve(&problem, Config::default()).unwrap();

    assert_eq!(first.solutions, second.solutions);
    assert_eq!(first.counters.nodes, second.counters.nodes);
}

#[test]
fn reorder_interval_does_not_change_the_solution_set() {
    for interval in [1, 3, 64] {
        let results = solve(
            &less_than_problem(),
            Config {
                reorder_interval: interval,
                ..Config::default()
            },
        )
        .unwrap();

        let pairs: Vec<_> = results
            .solutions
            .iter()
            .map(|s| (scalar(s, "a"), scalar(s, "b")))
            .collect();
        assert_eq!(pairs, [(0, 1), (0, 2), (1, 2)]);
    }
}

#[test]
fn preset_abort_flag_returns_partial_results() {
    let abort = Arc::new(AtomicBool::new(true));
    let results = solve(
        &less_than_problem(),
        Config {
            abort: Some(abort),
            ..Config::default()
        },
    )
    .unwrap();

    assert!(results.solutions.is_empty());
    assert_eq!(results.counters.nodes, 0);
}

#[test]
fn solve_requires_constraints() {
    let mut problem = Problem::new();
    problem.add_scalar("x", 0, 1).unwrap();

    let failure = solve(&problem, Config::default()).unwrap_err();
    assert!(matches!(failure.error, SolverError::EmptyProblem));
}

#[test]
fn failing_predicate_must_read_a_cell() {
    let mut problem = Problem::new();
    problem.add_scalar("x", 0, 1).unwrap();
    problem.add_constraint_on("x", |_| Ok(false)).unwrap();

    let failure = solve(&problem, Config::default()).unwrap_err();
    assert!(matches!(
        failure.error,
        SolverError::NoCellsRead { constraint: 0 }
    ));
}

#[test]
fn predicate_errors_abort_the_solve_with_node_count() {
    let mut problem = Problem::new();
    problem.add_scalar("x", 0, 2).unwrap();
    problem
        .add_constraint_on("x", |x| {
            if x.read(&[0])? == 1 {
                Err(SolverError::ConstraintEvaluationFailed {
                    message: "boom".to_string(),
                })
            } else {
                Ok(true)
            }
        })
        .unwrap();

    let failure = solve(&problem, Config::default()).unwrap_err();
    assert!(matches!(
        failure.error,
        SolverError::ConstraintEvaluationFailed { .. }
    ));
    assert_eq!(failure.nodes, 1);
}

#[test]
fn out_of_range_reads_surface_as_errors() {
    let mut problem = Problem::new();
    problem.add_scalar("x", 0, 1).unwrap();
    problem
        .add_constraint_on("x", |x| Ok(x.read(&[3])? == 0))
        .unwrap();

    let failure = solve(&problem, Config::default()).unwrap_err();
    assert!(matches!(
        failure.error,
        SolverError::IndexOutOfRange { .. }
    ));
}

#[derive(Copy, Clone, Debug)]
enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    fn apply(self, a: CellValue, b: CellValue) -> bool {
        match self {
            Op::Eq => a == b,
            Op::Ne => a != b,
            Op::Lt => a < b,
            Op::Le => a <= b,
            Op::Gt => a > b,
            Op::Ge => a >= b,
        }
    }
}

const OPS: [Op; 6] = [Op::Eq, Op::Ne, Op::Lt, Op::Le, Op::Gt, Op::Ge];

fn brute_force(
    lower: &[CellValue],
    upper: &[CellValue],
    comparisons: &[(usize, usize, Op)],
) -> Vec<Vec<CellValue>> {
    let mut found = Vec::new();
    let mut candidate = lower.to_vec();

    'outer: loop {
        if comparisons
            .iter()
            .all(|&(i, j, op)| op.apply(candidate[i], candidate[j]))
        {
            found.push(candidate.clone());
        }

        for i in 0..candidate.len() {
            candidate[i] += 1;
            if candidate[i] <= upper[i] {
                continue 'outer;
            }
            candidate[i] = lower[i];
        }
        return found;
    }
}

#[test]
fn random_problems_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50 {
        let num_vars = rng.gen_range(2..=6);
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        let mut problem = Problem::new();
        let names: Vec<String> = (0..num_vars).map(|i| format!("v{i}")).collect();

        for name in &names {
            let lo = rng.gen_range(-2..=2);
            let hi = lo + rng.gen_range(0..=2);
            lower.push(lo);
            upper.push(hi);
            problem.add_scalar(name, lo, hi).unwrap();
        }

        let num_comparisons = rng.gen_range(1..=4);
        let mut comparisons = Vec::new();
        for _ in 0..num_comparisons {
            let i = rng.gen_range(0..num_vars);
            let j = (i + rng.gen_range(1..num_vars)) % num_vars;
            let op = OPS[rng.gen_range(0..OPS.len())];
            comparisons.push((i, j, op));
            problem
                .add_constraint(&[&names[i], &names[j]], move |views| {
                    Ok(op.apply(views[0].read(&[0])?, views[1].read(&[0])?))
                })
                .unwrap();
        }

        let results = solve(&problem, Config::default()).unwrap();
        let mut engine_set: Vec<Vec<CellValue>> = results
            .solutions
            .iter()
            .map(|s| names.iter().map(|n| scalar(s, n)).collect())
            .collect();

        // No assignment may be discovered twice.
        let discovered = engine_set.len();
        engine_set.sort();
        engine_set.dedup();
        assert_eq!(engine_set.len(), discovered);

        let mut expected = brute_force(&lower, &upper, &comparisons);
        expected.sort();
        assert_eq!(engine_set, expected);

        for solution in &engine_set {
            for (i, &value) in solution.iter().enumerate() {
                assert!(lower[i] <= value && value <= upper[i]);
            }
        }
    }
}
