use crate::types::{CellValue, SolverError, ValueGrid};
use crate::view::GridView;

pub type Predicate = Box<dyn Fn(&[GridView]) -> Result<bool, SolverError>>;

pub struct Variable {
    pub name: String,
    pub dims: Vec<usize>,
    pub lower: Vec<CellValue>,
    pub upper: Vec<CellValue>,
}

impl Variable {
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

pub struct Constraint {
    pub vars: Vec<String>,
    pub predicate: Predicate,
}

/// Immutable-after-build description of a problem: variables in
/// declaration order plus predicate constraints over them.
#[derive(Default)]
pub struct Problem {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl Problem {
    pub fn new() -> Problem {
        Problem::default()
    }

    /// Declares a variable. `upper` must have the same number of cells
    /// as `lower` and is reshaped to `lower`'s shape.
    pub fn add_variable(
        &mut self,
        name: &str,
        lower: ValueGrid,
        upper: ValueGrid,
    ) -> Result<String, SolverError> {
        if lower.len() != upper.len() {
            return Err(SolverError::ShapeMismatch {
                name: name.to_string(),
                lower_len: lower.len(),
                upper_len: upper.len(),
            });
        }
        if lower.is_empty() || lower.values.iter().zip(&upper.values).any(|(lo, hi)| lo > hi) {
            return Err(SolverError::InvalidBounds {
                name: name.to_string(),
            });
        }
        if self.variables.iter().any(|v| v.name == name) {
            return Err(SolverError::DuplicateVariable {
                name: name.to_string(),
            });
        }

        self.variables.push(Variable {
            name: name.to_string(),
            dims: lower.dims,
            lower: lower.values,
            upper: upper.values,
        });
        Ok(name.to_string())
    }

    pub fn add_scalar(
        &mut self,
        name: &str,
        lower: CellValue,
        upper: CellValue,
    ) -> Result<String, SolverError> {
        self.add_variable(name, ValueGrid::scalar(lower), ValueGrid::scalar(upper))
    }

    /// Attaches a constraint. The predicate is invoked with the views
    /// for `vars` in the listed order and must read at least one cell
    /// whenever it rejects a candidate.
    pub fn add_constraint<F>(&mut self, vars: &[&str], predicate: F) -> Result<(), SolverError>
    where
        F: Fn(&[GridView]) -> Result<bool, SolverError> + 'static,
    {
        if vars.is_empty() {
            return Err(SolverError::EmptyConstraint);
        }
        for var in vars {
            if !self.variables.iter().any(|v| v.name == *var) {
                return Err(SolverError::UnknownVariable {
                    name: var.to_string(),
                });
            }
        }

        self.constraints.push(Constraint {
            vars: vars.iter().map(|v| v.to_string()).collect(),
            predicate: Box::new(predicate),
        });
        Ok(())
    }

    /// Single-variable convenience for `add_constraint`.
    pub fn add_constraint_on<F>(&mut self, var: &str, predicate: F) -> Result<(), SolverError>
    where
        F: Fn(&GridView) -> Result<bool, SolverError> + 'static,
    {
        self.add_constraint(&[var], move |views| predicate(&views[0]))
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    pub fn num_cells(&self) -> usize {
        self.variables.iter().map(Variable::len).sum()
    }
}
