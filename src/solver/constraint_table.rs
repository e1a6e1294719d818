use std::cmp::Reverse;

use crate::problem::{Constraint, Problem};
use crate::types::SolverError;
use crate::view::GridView;

use super::store::AssignmentStore;

/// Solve-time wrapper over the constraint list carrying the
/// per-constraint quality estimate used for dynamic reordering. Each
/// entry owns views for its variables; the views of one entry never
/// overlap because variables never share cells.
pub struct ConstraintTable<'p> {
    entries: Vec<TableEntry<'p>>,
}

pub struct TableEntry<'p> {
    source: &'p Constraint,
    pub index: usize,
    pub views: Vec<GridView>,
    pub estimated_quality: usize,
}

impl TableEntry<'_> {
    pub fn clear_touches(&self) {
        for view in &self.views {
            view.clear_touches();
        }
    }

    pub fn evaluate(&self) -> Result<bool, SolverError> {
        (self.source.predicate)(&self.views)
    }

    /// Writes this constraint's touch grids into `out`, which spans the
    /// whole flat assignment. Positions outside this constraint's
    /// variables are left as they are.
    pub fn collect_touches(&self, out: &mut [bool]) {
        for view in &self.views {
            let offset = view.offset();
            view.snapshot_touches(&mut out[offset..offset + view.len()]);
        }
    }
}

impl<'p> ConstraintTable<'p> {
    pub fn new(
        problem: &'p Problem,
        store: &AssignmentStore,
    ) -> Result<ConstraintTable<'p>, SolverError> {
        let mut entries = Vec::with_capacity(problem.constraints().len());

        for (index, constraint) in problem.constraints().iter().enumerate() {
            let mut views = Vec::with_capacity(constraint.vars.len());
            for name in &constraint.vars {
                let var_index =
                    problem
                        .variable_index(name)
                        .ok_or_else(|| SolverError::UnknownVariable {
                            name: name.clone(),
                        })?;
                views.push(store.view(problem, var_index));
            }
            entries.push(TableEntry {
                source: constraint,
                index,
                views,
                estimated_quality: 0,
            });
        }

        Ok(ConstraintTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TableEntry<'p>] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [TableEntry<'p>] {
        &mut self.entries
    }

    /// Stable sort, highest quality first. Satisfied constraints carry
    /// quality 0 and sink to the end.
    pub fn sort_by_quality_desc(&mut self) {
        self.entries.sort_by_key(|e| Reverse(e.estimated_quality));
    }
}
