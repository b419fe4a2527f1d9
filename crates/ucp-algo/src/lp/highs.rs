//! HiGHS backend for [`LinearProgram`]
//!
//! Builds a `highs::RowProblem` column by column, then row by row, so column
//! and row indices in the HiGHS model coincide with [`ColId`]/[`RowId`]
//! handles. Row duals are only read back for pure LPs.

use std::time::{Duration, Instant};

use highs::{HighsModelStatus, RowProblem, Sense};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ColumnKind, LinearProgram, LpSolution, Solver, SolverError};

/// HiGHS tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighsOptions {
    /// Relative MIP optimality gap
    pub mip_rel_gap: f64,
    /// Per-solve time limit
    pub time_limit: Option<Duration>,
    /// Let HiGHS print its own log to stdout
    pub verbose: bool,
}

impl Default for HighsOptions {
    fn default() -> Self {
        Self {
            mip_rel_gap: 1e-9,
            time_limit: None,
            verbose: false,
        }
    }
}

/// Wall-clock budget shared by every solve of one [`HighsSolver`]
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

/// [`Solver`] backed by the HiGHS simplex and branch-and-cut engines
#[derive(Debug, Clone, Default)]
pub struct HighsSolver {
    options: HighsOptions,
    deadline: Option<Deadline>,
}

impl HighsSolver {
    pub fn new(options: HighsOptions) -> Self {
        Self {
            options,
            deadline: None,
        }
    }

    /// Share `budget`, counted from now, across all later solves: each solve
    /// gets only what is left of it.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.deadline = Instant::now()
            .checked_add(budget)
            .map(|at| Deadline { at, budget });
        self
    }

    pub fn options(&self) -> &HighsOptions {
        &self.options
    }

    /// Time left of the shared budget, `None` without one
    pub fn remaining_time(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.at.saturating_duration_since(Instant::now()))
    }

    /// Per-solve limit clipped to the remaining budget
    fn next_time_limit(&self) -> Result<Option<Duration>, SolverError> {
        let Some(remaining) = self.remaining_time() else {
            return Ok(self.options.time_limit);
        };
        if remaining.is_zero() {
            return Err(self.time_limit_error());
        }
        Ok(Some(
            self.options
                .time_limit
                .map_or(remaining, |limit| limit.min(remaining)),
        ))
    }

    fn time_limit_error(&self) -> SolverError {
        let limit = self
            .deadline
            .map(|deadline| deadline.budget)
            .or(self.options.time_limit);
        SolverError::TimeLimit {
            seconds: limit.map_or(0.0, |t| t.as_secs_f64()),
        }
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &str {
        "highs"
    }

    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, SolverError> {
        let time_limit = self.next_time_limit()?;
        let mut problem = RowProblem::default();
        let cols: Vec<_> = program
            .columns()
            .iter()
            .map(|column| match column.kind {
                ColumnKind::Continuous => {
                    problem.add_column(column.cost, column.lower..=column.upper)
                }
                ColumnKind::Binary => problem.add_integer_column(column.cost, 0.0..=1.0),
            })
            .collect();
        for row in program.rows() {
            problem.add_row(
                row.lower..=row.upper,
                row.terms.iter().map(|(col, coef)| (cols[col.index()], *coef)),
            );
        }

        let mixed_integer = program.is_mixed_integer();
        let mut model = problem.optimise(Sense::Minimise);
        model.set_option("output_flag", self.options.verbose);
        if mixed_integer {
            model.set_option("mip_rel_gap", self.options.mip_rel_gap);
        }
        if let Some(limit) = time_limit {
            model.set_option("time_limit", limit.as_secs_f64());
        }

        let solved = model
            .try_solve()
            .map_err(|status| SolverError::Failed(format!("HiGHS returned {status:?}")))?;

        match solved.status() {
            HighsModelStatus::Optimal => {}
            // every program built here has a bounded objective
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                return Err(SolverError::Infeasible)
            }
            HighsModelStatus::Unbounded => return Err(SolverError::Unbounded),
            HighsModelStatus::ReachedTimeLimit => return Err(self.time_limit_error()),
            other => return Err(SolverError::Failed(format!("model status {other:?}"))),
        }

        let solution = solved.get_solution();
        let values = solution.columns().to_vec();
        let objective = program.objective_of(&values);
        let row_duals = (!mixed_integer).then(|| solution.dual_rows().to_vec());

        trace!(
            columns = program.num_columns(),
            rows = program.num_rows(),
            mixed_integer,
            objective,
            "HiGHS solve finished"
        );
        Ok(LpSolution::new(objective, values, row_duals))
    }
}
