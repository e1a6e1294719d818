use std::cell::RefCell;
use std::rc::Rc;

use crate::problem::Problem;
use crate::types::{CellIndex, CellValue};
use crate::view::GridView;

/// Owns the flat assignment vector plus the parallel bound vectors and
/// hands out non-overlapping grid views by variable. The odometer
/// mutates cells directly through the store; views only read.
pub struct AssignmentStore {
    values: Rc<RefCell<Vec<CellValue>>>,
    lower: Vec<CellValue>,
    upper: Vec<CellValue>,
    offsets: Vec<CellIndex>,
}

impl AssignmentStore {
    pub fn new(problem: &Problem) -> AssignmentStore {
        let mut lower = Vec::with_capacity(problem.num_cells());
        let mut upper = Vec::with_capacity(problem.num_cells());
        let mut offsets = Vec::with_capacity(problem.variables().len());

        // Variables keep declaration order, so the offset of variable k
        // is the total length of the variables before it.
        for var in problem.variables() {
            offsets.push(lower.len());
            lower.extend_from_slice(&var.lower);
            upper.extend_from_slice(&var.upper);
        }

        let values = Rc::new(RefCell::new(lower.clone()));
        AssignmentStore {
            values,
            lower,
            upper,
            offsets,
        }
    }

    /// One view per variable, in declaration order.
    pub fn alloc_views(&self, problem: &Problem) -> Vec<GridView> {
        (0..problem.variables().len())
            .map(|i| self.view(problem, i))
            .collect()
    }

    pub fn view(&self, problem: &Problem, var_index: usize) -> GridView {
        let var = &problem.variables()[var_index];
        GridView::new(
            Rc::clone(&self.values),
            self.offsets[var_index],
            var.dims.clone(),
        )
    }

    pub fn num_cells(&self) -> usize {
        self.lower.len()
    }

    pub fn offset(&self, var_index: usize) -> CellIndex {
        self.offsets[var_index]
    }

    pub fn cell(&self, i: CellIndex) -> CellValue {
        self.values.borrow()[i]
    }

    pub fn set_cell(&mut self, i: CellIndex, value: CellValue) {
        self.values.borrow_mut()[i] = value;
    }

    pub fn inc_cell(&mut self, i: CellIndex) {
        self.values.borrow_mut()[i] += 1;
    }

    pub fn lower(&self, i: CellIndex) -> CellValue {
        self.lower[i]
    }

    pub fn upper(&self, i: CellIndex) -> CellValue {
        self.upper[i]
    }

    pub fn copy_cells(&self, offset: CellIndex, len: usize) -> Vec<CellValue> {
        self.values.borrow()[offset..offset + len].to_vec()
    }
}
