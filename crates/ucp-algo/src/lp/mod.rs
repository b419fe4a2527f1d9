//! Linear and mixed-integer programming layer
//!
//! The decomposition talks to the LP/MILP engine only through this module:
//!
//! - [`LinearProgram`] - solver-independent model (columns, ranged rows, binaries)
//! - [`Solver`] - solve a program to optimality, returning primal values and,
//!   for pure LPs, row dual prices
//! - [`solve_with_lazy_constraints`] - the integer-node hook: every
//!   integer-feasible incumbent is handed to a [`LazyConstraintHandler`],
//!   which may return new global rows before the search resumes
//!
//! The HiGHS binding lives in [`highs`](self::highs).
//!
//! ## Dual sign convention
//!
//! Row duals `y` satisfy `c = A^T y + d`, where `d` are the column reduced
//! costs. With all columns bounded below by zero this gives strong duality in
//! the form `objective = sum_r y_r * b_r`, where `b_r` is the bound at which
//! row `r` is active. Rows at their lower bound have `y >= 0`, rows at their
//! upper bound `y <= 0`.

pub mod highs;
mod model;

pub use self::highs::{HighsOptions, HighsSolver};
pub use model::{ColId, Column, ColumnKind, LinearProgram, Row, RowId};

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Failures reported by the LP/MILP engine
#[derive(Debug, Error)]
pub enum SolverError {
    /// No point satisfies the constraints
    #[error("problem is infeasible")]
    Infeasible,

    /// The objective decreases without bound
    #[error("problem is unbounded")]
    Unbounded,

    /// Wall-clock budget exhausted before optimality was proven
    #[error("time limit of {seconds:.1}s reached")]
    TimeLimit { seconds: f64 },

    /// Integer-node budget exhausted by the lazy-constraint search
    #[error("integer node limit of {nodes} reached")]
    NodeLimit { nodes: usize },

    /// Numerical breakdown or any other engine failure
    #[error("solver failed: {0}")]
    Failed(String),
}

/// Optimal solution of a [`LinearProgram`]
#[derive(Debug, Clone)]
pub struct LpSolution {
    objective: f64,
    values: Vec<f64>,
    row_duals: Option<Vec<f64>>,
}

impl LpSolution {
    pub fn new(objective: f64, values: Vec<f64>, row_duals: Option<Vec<f64>>) -> Self {
        Self {
            objective,
            values,
            row_duals,
        }
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn value(&self, col: ColId) -> f64 {
        self.values[col.index()]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dual price of a row; `None` for mixed-integer solves.
    pub fn dual(&self, row: RowId) -> Option<f64> {
        self.row_duals.as_ref().map(|duals| duals[row.index()])
    }

    pub fn has_duals(&self) -> bool {
        self.row_duals.is_some()
    }
}

/// An LP/MILP engine
pub trait Solver {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Solve `program` to optimality.
    ///
    /// Infeasibility and unboundedness are reported as
    /// [`SolverError::Infeasible`] / [`SolverError::Unbounded`], an exhausted
    /// time budget as [`SolverError::TimeLimit`]; any other non-optimal
    /// termination is a [`SolverError::Failed`].
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, SolverError>;
}

impl<S: Solver + ?Sized> Solver for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, SolverError> {
        (**self).solve(program)
    }
}

/// An integer-feasible point of the search, valid only for the duration of
/// one [`LazyConstraintHandler::on_integer_node`] call.
#[derive(Debug)]
pub struct IntegerNode<'a> {
    index: usize,
    solution: &'a LpSolution,
}

impl<'a> IntegerNode<'a> {
    /// Sequence number of this node within the search (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self, col: ColId) -> f64 {
        self.solution.value(col)
    }

    /// Objective of the node's relaxation with all rows added so far
    pub fn objective(&self) -> f64 {
        self.solution.objective()
    }
}

/// Callback fired once per integer-feasible node
pub trait LazyConstraintHandler {
    type Error: From<SolverError>;

    /// Inspect the node; return the rows to add globally, or an empty vector
    /// to accept the node as optimal.
    fn on_integer_node(&mut self, node: &IntegerNode<'_>) -> Result<Vec<Row>, Self::Error>;
}

/// Budget for [`solve_with_lazy_constraints`]
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Maximum number of integer nodes handed to the handler
    pub max_integer_nodes: usize,
    /// Wall-clock limit for the whole search
    pub time_limit: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_integer_nodes: 10_000,
            time_limit: None,
        }
    }
}

/// Result of a completed lazy-constraint search
#[derive(Debug, Clone)]
pub struct LazySearchOutcome {
    /// Accepted integer solution
    pub solution: LpSolution,
    /// Integer nodes inspected, including the accepted one
    pub integer_nodes: usize,
    /// Rows added by the handler
    pub rows_added: usize,
}

/// Solve a mixed-integer program whose constraint set is completed lazily.
///
/// The engine's optimal integer point is offered to `handler`. Rows returned
/// by the handler are appended to `program` permanently and the search is
/// resumed from the enlarged model; the first node for which the handler
/// returns no rows is the optimum. Because rows are only ever added, each
/// resolve is a valid continuation of the previous search.
pub fn solve_with_lazy_constraints<S, H>(
    solver: &S,
    program: &mut LinearProgram,
    limits: &SearchLimits,
    handler: &mut H,
) -> Result<LazySearchOutcome, H::Error>
where
    S: Solver + ?Sized,
    H: LazyConstraintHandler + ?Sized,
{
    let started = Instant::now();
    let mut rows_added = 0;

    for index in 0.. {
        if index >= limits.max_integer_nodes {
            return Err(SolverError::NodeLimit {
                nodes: limits.max_integer_nodes,
            }
            .into());
        }
        if let Some(limit) = limits.time_limit {
            if started.elapsed() >= limit {
                return Err(SolverError::TimeLimit {
                    seconds: limit.as_secs_f64(),
                }
                .into());
            }
        }

        let solution = solver.solve(program)?;
        let node = IntegerNode {
            index,
            solution: &solution,
        };
        let rows = handler.on_integer_node(&node)?;
        if rows.is_empty() {
            debug!(
                nodes = index + 1,
                rows_added,
                objective = solution.objective(),
                "lazy-constraint search accepted integer node"
            );
            return Ok(LazySearchOutcome {
                solution,
                integer_nodes: index + 1,
                rows_added,
            });
        }
        rows_added += rows.len();
        for row in rows {
            program.add_row(row);
        }
    }
    unreachable!("unbounded node loop exits through the node limit")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a fixed point and records how many rows it was given.
    struct FixedSolver;

    impl Solver for FixedSolver {
        fn name(&self) -> &str {
            "fixed"
        }

        fn solve(&self, program: &LinearProgram) -> Result<LpSolution, SolverError> {
            let values = vec![program.num_rows() as f64; program.num_columns()];
            Ok(LpSolution::new(program.objective_of(&values), values, None))
        }
    }

    struct AddUntil {
        target_rows: usize,
    }

    impl LazyConstraintHandler for AddUntil {
        type Error = SolverError;

        fn on_integer_node(&mut self, node: &IntegerNode<'_>) -> Result<Vec<Row>, SolverError> {
            if node.index() < self.target_rows {
                Ok(vec![Row::less_eq("cut", vec![], 0.0)])
            } else {
                Ok(vec![])
            }
        }
    }

    #[test]
    fn test_lazy_search_adds_rows_until_accepted() {
        let mut program = LinearProgram::new();
        let x = program.add_continuous("x", 1.0, 0.0, 10.0);
        let mut handler = AddUntil { target_rows: 3 };
        let outcome =
            solve_with_lazy_constraints(&FixedSolver, &mut program, &SearchLimits::default(), &mut handler)
                .unwrap();
        assert_eq!(outcome.integer_nodes, 4);
        assert_eq!(outcome.rows_added, 3);
        assert_eq!(program.num_rows(), 3);
        assert_eq!(outcome.solution.value(x), 3.0);
    }

    #[test]
    fn test_lazy_search_respects_node_limit() {
        let mut program = LinearProgram::new();
        program.add_continuous("x", 1.0, 0.0, 10.0);
        let mut handler = AddUntil { target_rows: 100 };
        let limits = SearchLimits {
            max_integer_nodes: 5,
            time_limit: None,
        };
        let err = solve_with_lazy_constraints(&FixedSolver, &mut program, &limits, &mut handler)
            .unwrap_err();
        assert!(matches!(err, SolverError::NodeLimit { nodes: 5 }));
    }

    #[test]
    fn test_lazy_search_respects_time_limit() {
        let mut program = LinearProgram::new();
        program.add_continuous("x", 1.0, 0.0, 10.0);
        let mut handler = AddUntil { target_rows: 100 };
        let limits = SearchLimits {
            max_integer_nodes: 10,
            time_limit: Some(Duration::ZERO),
        };
        let err = solve_with_lazy_constraints(&FixedSolver, &mut program, &limits, &mut handler)
            .unwrap_err();
        assert!(matches!(err, SolverError::TimeLimit { .. }));
        assert_eq!(program.num_rows(), 0);
    }
}
