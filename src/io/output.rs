use crate::solver::{Counters, Solution};
use crate::types::ValueGrid;

/// Multi-line rendering of one solution, one variable per block.
/// Two-dimensional variables are laid out as a table; everything else
/// is printed as a flat list.
pub fn solution_as_grids(solution: &Solution) -> String {
    let mut output = String::new();

    for (name, grid) in solution {
        if grid.dims.len() == 2 {
            output.push_str(name);
            output.push_str(":\n");
            output.push_str(&grid_2d(grid));
        } else {
            output.push_str(&format!("{} = {}\n", name, values_compact(grid)));
        }
    }

    output
}

pub fn solution_compact(solution: &Solution) -> String {
    solution
        .iter()
        .map(|(name, grid)| format!("{}={}", name, values_compact(grid)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn counters(counters: &Counters) -> String {
    format!(
        "{{ nodes: {} solutions: {} constraints_evaluated: {} skips: {} progress_ratio: {} }}",
        counters.nodes,
        counters.solutions,
        counters.constraints_evaluated,
        counters.skips,
        counters.progress_ratio
    )
}

fn values_compact(grid: &ValueGrid) -> String {
    format!(
        "[{}]",
        grid.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    )
}

fn grid_2d(grid: &ValueGrid) -> String {
    let mut output = String::new();
    let rows = grid.dims[0];
    let cols = grid.dims[1];

    let pad_size = grid
        .values
        .iter()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1)
        + 1;

    for r in 0..rows {
        for c in 0..cols {
            // First index fastest: cell (r, c) lives at r + c * rows.
            let value = grid.values[r + c * rows].to_string();
            (0..pad_size - value.len()).for_each(|_| output.push(' '));
            output.push_str(&value);
        }
        output.push('\n');
    }

    output
}
