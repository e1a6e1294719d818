use derive_more::{Display, Error};

pub type CellIndex = usize;
pub type CellValue = i64;

/// An owned shaped block of integers. Values are stored with the first
/// index fastest, so a linear index matches the mixed-radix mapping
/// used by the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueGrid {
    pub dims: Vec<usize>,
    pub values: Vec<CellValue>,
}

impl ValueGrid {
    pub fn new(dims: Vec<usize>, values: Vec<CellValue>) -> ValueGrid {
        assert_eq!(dims.iter().product::<usize>(), values.len());
        ValueGrid { dims, values }
    }

    pub fn scalar(value: CellValue) -> ValueGrid {
        ValueGrid {
            dims: vec![1],
            values: vec![value],
        }
    }

    pub fn filled(dims: Vec<usize>, value: CellValue) -> ValueGrid {
        let len = dims.iter().product();
        ValueGrid {
            dims,
            values: vec![value; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[display(
        fmt = "variable {}: lower bounds have {} cells but upper bounds have {}",
        name,
        lower_len,
        upper_len
    )]
    ShapeMismatch {
        name: String,
        lower_len: usize,
        upper_len: usize,
    },

    #[display(fmt = "variable {}: bounds are empty or lower exceeds upper", name)]
    InvalidBounds { name: String },

    #[display(fmt = "variable {} is already declared", name)]
    DuplicateVariable { name: String },

    #[display(fmt = "unknown variable: {}", name)]
    UnknownVariable { name: String },

    #[display(fmt = "problem has no constraints")]
    EmptyProblem,

    #[display(fmt = "constraint references no variables")]
    EmptyConstraint,

    #[display(fmt = "constraint evaluation failed: {}", message)]
    ConstraintEvaluationFailed { message: String },

    #[display(fmt = "index {:?} out of range for shape {:?}", indices, dims)]
    IndexOutOfRange {
        indices: Vec<usize>,
        dims: Vec<usize>,
    },

    #[display(fmt = "failing constraint {} read no cells", constraint)]
    NoCellsRead { constraint: usize },
}
