use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{CellIndex, CellValue, SolverError};

/// Read-recording window over a contiguous slice of the flat
/// assignment, presented as a grid. Constraints only ever see these;
/// writes go through the `AssignmentStore` and bypass the view, which
/// is what lets the touch grid stand in for a read set.
pub struct GridView {
    values: Rc<RefCell<Vec<CellValue>>>,
    offset: CellIndex,
    dims: Vec<usize>,
    len: usize,
    touched: RefCell<Vec<bool>>,
}

impl GridView {
    pub(crate) fn new(
        values: Rc<RefCell<Vec<CellValue>>>,
        offset: CellIndex,
        dims: Vec<usize>,
    ) -> GridView {
        let len = dims.iter().product();
        GridView {
            values,
            offset,
            dims,
            len,
            touched: RefCell::new(vec![false; len]),
        }
    }

    /// Reads one cell by grid indices (first index fastest) and records
    /// the touch.
    pub fn read(&self, indices: &[usize]) -> Result<CellValue, SolverError> {
        let index = self.linear_index(indices)?;
        Ok(self.fetch(index))
    }

    /// Reads one cell by linear index.
    pub fn get(&self, index: usize) -> Result<CellValue, SolverError> {
        if index >= self.len {
            return Err(SolverError::IndexOutOfRange {
                indices: vec![index],
                dims: self.dims.clone(),
            });
        }
        Ok(self.fetch(index))
    }

    pub fn shape(&self) -> &[usize] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear_touches(&self) {
        self.touched.borrow_mut().fill(false);
    }

    /// Copies the touch grid in linear order into `out`, which must
    /// have matching length.
    pub fn snapshot_touches(&self, out: &mut [bool]) {
        out.copy_from_slice(&self.touched.borrow());
    }

    pub(crate) fn offset(&self) -> CellIndex {
        self.offset
    }

    fn fetch(&self, index: usize) -> CellValue {
        self.touched.borrow_mut()[index] = true;
        self.values.borrow()[self.offset + index]
    }

    fn linear_index(&self, indices: &[usize]) -> Result<usize, SolverError> {
        if indices.len() != self.dims.len() {
            return Err(self.out_of_range(indices));
        }

        let mut index = 0;
        let mut stride = 1;
        for (&i, &dim) in indices.iter().zip(&self.dims) {
            if i >= dim {
                return Err(self.out_of_range(indices));
            }
            index += i * stride;
            stride *= dim;
        }
        Ok(index)
    }

    fn out_of_range(&self, indices: &[usize]) -> SolverError {
        SolverError::IndexOutOfRange {
            indices: indices.to_vec(),
            dims: self.dims.clone(),
        }
    }
}
