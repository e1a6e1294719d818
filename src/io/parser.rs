use lazy_static::lazy_static;
use regex::Regex;

use crate::problem::Problem;
use crate::types::{CellValue, SolverError, ValueGrid};
use crate::view::GridView;

pub type ParserResult = Result<Problem, String>;

/// Parses the declarative problem format:
///
/// ```text
/// var x in 0..2            # scalar
/// var g[2,2] in 0..1       # grid with uniform per-cell bounds
/// constraint x >= 1
/// constraint g[0,0] != g[1,1]
/// constraint a < b
/// constraint sum g == 2
/// ```
///
/// Indices are 0-based. Comparison constraints compare two cell
/// references, or a cell reference against an integer literal.
pub fn parse_text(input: &str) -> ParserResult {
    let mut input = String::from(input);
    remove_comments(&mut input);

    let mut problem = Problem::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(decl) = line.strip_prefix("var ") {
            parse_variable(&mut problem, decl.trim())?;
        } else if let Some(body) = line.strip_prefix("constraint ") {
            parse_constraint(&mut problem, body.trim())?;
        } else {
            return Err(format!("Unrecognized line: {line}"));
        }
    }

    Ok(problem)
}

fn remove_comments(input: &mut String) {
    lazy_static! {
        static ref COMMENT_REGEX: Regex = Regex::new("(?m)#.*$").unwrap();
    }

    *input = COMMENT_REGEX.replace_all(input, "").to_string();
}

fn parse_variable(problem: &mut Problem, decl: &str) -> Result<(), String> {
    lazy_static! {
        static ref VAR_REGEX: Regex =
            Regex::new(r"^([A-Za-z_]\w*)\s*(?:\[([\d\s,]+)\])?\s+in\s+(-?\d+)\.\.(-?\d+)$")
                .unwrap();
    }

    let captures = VAR_REGEX
        .captures(decl)
        .ok_or_else(|| format!("Bad variable declaration: {decl}"))?;

    let name = &captures[1];
    let dims = match captures.get(2) {
        Some(dims) => parse_index_list(dims.as_str())?,
        None => vec![1],
    };
    let lower = parse_value(&captures[3])?;
    let upper = parse_value(&captures[4])?;

    problem
        .add_variable(
            name,
            ValueGrid::filled(dims.clone(), lower),
            ValueGrid::filled(dims, upper),
        )
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn parse_constraint(problem: &mut Problem, body: &str) -> Result<(), String> {
    lazy_static! {
        static ref SUM_REGEX: Regex =
            Regex::new(r"^sum\s+([A-Za-z_]\w*)\s*(==|!=|<=|>=|<|>)\s*(-?\d+)$").unwrap();
        static ref CMP_REGEX: Regex = Regex::new(
            r"^([A-Za-z_]\w*)(?:\[([\d\s,]+)\])?\s*(==|!=|<=|>=|<|>)\s*(?:(-?\d+)|([A-Za-z_]\w*)(?:\[([\d\s,]+)\])?)$",
        )
        .unwrap();
    }

    if let Some(captures) = SUM_REGEX.captures(body) {
        let var = captures[1].to_string();
        let op = CmpOp::parse(&captures[2]);
        let target = parse_value(&captures[3])?;

        return problem
            .add_constraint_on(&var, move |view| {
                let mut sum = 0;
                for i in 0..view.len() {
                    sum += view.get(i)?;
                }
                Ok(op.apply(sum, target))
            })
            .map_err(|e| e.to_string());
    }

    let captures = CMP_REGEX
        .captures(body)
        .ok_or_else(|| format!("Unrecognized constraint: {body}"))?;

    let left = parse_cell_ref(&captures[1], captures.get(2).map(|m| m.as_str()))?;
    let op = CmpOp::parse(&captures[3]);

    let result = if let Some(literal) = captures.get(4) {
        let value = parse_value(literal.as_str())?;
        let var = left.var.clone();
        problem.add_constraint_on(&var, move |view| {
            Ok(op.apply(left.read_from(view)?, value))
        })
    } else {
        let right = parse_cell_ref(&captures[5], captures.get(6).map(|m| m.as_str()))?;
        if left.var == right.var {
            let var = left.var.clone();
            problem.add_constraint_on(&var, move |view| {
                Ok(op.apply(left.read_from(view)?, right.read_from(view)?))
            })
        } else {
            let vars = [left.var.clone(), right.var.clone()];
            problem.add_constraint(&[&vars[0], &vars[1]], move |views| {
                Ok(op.apply(left.read_from(&views[0])?, right.read_from(&views[1])?))
            })
        }
    };

    result.map_err(|e| e.to_string())
}

struct CellRef {
    var: String,
    indices: Option<Vec<usize>>,
}

impl CellRef {
    fn read_from(&self, view: &GridView) -> Result<CellValue, SolverError> {
        match &self.indices {
            Some(indices) => view.read(indices),
            None => view.get(0),
        }
    }
}

fn parse_cell_ref(var: &str, indices: Option<&str>) -> Result<CellRef, String> {
    let indices = match indices {
        Some(list) => Some(parse_index_list(list)?),
        None => None,
    };
    Ok(CellRef {
        var: var.to_string(),
        indices,
    })
}

fn parse_index_list(list: &str) -> Result<Vec<usize>, String> {
    list.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("Bad index list: {list}"))
        })
        .collect()
}

fn parse_value(text: &str) -> Result<CellValue, String> {
    text.parse::<CellValue>()
        .map_err(|_| format!("Value out of range: {text}"))
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    // Only called on tokens the constraint regexes matched.
    fn parse(token: &str) -> CmpOp {
        match token {
            "==" => CmpOp::Eq,
            "!=" => CmpOp::Ne,
            "<" => CmpOp::Lt,
            "<=" => CmpOp::Le,
            ">" => CmpOp::Gt,
            ">=" => CmpOp::Ge,
            _ => panic!("Bad comparison operator: {token}"),
        }
    }

    fn apply(self, a: CellValue, b: CellValue) -> bool {
        match self {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        }
    }
}
