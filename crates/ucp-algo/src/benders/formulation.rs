//! Commitment-logic rows shared by the master problem and the monolithic MILP
//!
//! Every row has the form
//!
//! ```text
//! sum_t coef_t * u[i][t]  (+ c[i][j])  >=  lower
//! ```
//!
//! over a single generator `i`. The startup row carries the startup-cost
//! column `c[i][j]`; the minimum up/down-time rows only touch `u`. Builders
//! return `None` when the row would be trivially satisfied and
//! [`UcpError::OutOfRange`](ucp_core::UcpError::OutOfRange) for indices
//! outside the instance.

use ucp_core::{CommitmentSchedule, UcpResult, UnitCommitmentProblem};

/// Family of a commitment-logic row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentRowKind {
    Startup,
    MinUp,
    MinDown,
}

/// One `>=` row over the commitment columns of a single generator
#[derive(Debug, Clone, PartialEq)]
pub struct CommitmentRow {
    pub kind: CommitmentRowKind,
    pub generator: usize,
    pub period: usize,
    /// `(period, coefficient)` pairs on `u[generator][period]`
    pub u_terms: Vec<(usize, f64)>,
    /// Whether `c[generator][period]` enters with coefficient 1
    pub has_startup_column: bool,
    pub lower: f64,
}

impl CommitmentRow {
    pub fn name(&self) -> String {
        let family = match self.kind {
            CommitmentRowKind::Startup => "startup",
            CommitmentRowKind::MinUp => "min_up",
            CommitmentRowKind::MinDown => "min_down",
        };
        format!("{family}[{},{}]", self.generator, self.period)
    }

    /// Whether a fixed schedule (with startup cost charged on every
    /// off-to-on transition) satisfies the row.
    pub fn is_satisfied_by(&self, problem: &UnitCommitmentProblem, schedule: &CommitmentSchedule) -> bool {
        let mut activity: f64 = self
            .u_terms
            .iter()
            .map(|&(t, coef)| coef * schedule.value(self.generator, t))
            .sum();
        if self.has_startup_column && schedule.starts_up(self.generator, self.period) {
            activity += problem.generators()[self.generator].startup_cost;
        }
        activity >= self.lower - 1e-9
    }
}

/// `c[i][j] - S*u[i][j] + S*u[i][j-1] >= 0`; `u[i][-1]` is taken as offline.
pub fn startup_row(problem: &UnitCommitmentProblem, i: usize, j: usize) -> UcpResult<Option<CommitmentRow>> {
    let cost = problem.generator(i)?.startup_cost;
    problem.demand(j)?;
    if cost == 0.0 {
        return Ok(None);
    }
    let mut u_terms = vec![(j, -cost)];
    if j > 0 {
        u_terms.push((j - 1, cost));
    }
    Ok(Some(CommitmentRow {
        kind: CommitmentRowKind::Startup,
        generator: i,
        period: j,
        u_terms,
        has_startup_column: true,
        lower: 0.0,
    }))
}

/// Aggregated minimum up-time row for a startup at period `j`:
///
/// `sum_{t in [j, end)} (u[i][t] - u[i][j] + u[i][j-1]) >= 0`
///
/// where `end = min(j + minUpTime, nPeriods)`. A window of one period
/// reduces to `u[i][j-1] >= 0` and is skipped.
pub fn min_up_row(problem: &UnitCommitmentProblem, i: usize, j: usize) -> UcpResult<Option<CommitmentRow>> {
    let end = problem.min_up_window_end(i, j)?;
    let len = end - j;
    if len <= 1 {
        return Ok(None);
    }
    let len = len as f64;
    let mut u_terms = vec![(j, 1.0 - len)];
    u_terms.extend((j + 1..end).map(|t| (t, 1.0)));
    if j > 0 {
        u_terms.push((j - 1, len));
    }
    Ok(Some(CommitmentRow {
        kind: CommitmentRowKind::MinUp,
        generator: i,
        period: j,
        u_terms,
        has_startup_column: false,
        lower: 0.0,
    }))
}

/// Aggregated minimum down-time row for a shutdown at period `j`:
///
/// `sum_{t in [j, end)} (u[i][j] - u[i][j-1] - u[i][t]) >= j - end`
///
/// where `end = min(j + minDownTime, nPeriods)`. One-period windows are
/// skipped, as is `j = 0`: with units offline before the horizon there is no
/// shutdown to enforce.
pub fn min_down_row(problem: &UnitCommitmentProblem, i: usize, j: usize) -> UcpResult<Option<CommitmentRow>> {
    let end = problem.min_down_window_end(i, j)?;
    let len = end - j;
    if len <= 1 || j == 0 {
        return Ok(None);
    }
    let len = len as f64;
    let mut u_terms = vec![(j, len - 1.0), (j - 1, -len)];
    u_terms.extend((j + 1..end).map(|t| (t, -1.0)));
    Ok(Some(CommitmentRow {
        kind: CommitmentRowKind::MinDown,
        generator: i,
        period: j,
        u_terms,
        has_startup_column: false,
        lower: -len,
    }))
}

/// All non-trivial commitment-logic rows of an instance, generator-major.
pub fn commitment_rows(problem: &UnitCommitmentProblem) -> Vec<CommitmentRow> {
    let mut rows = Vec::new();
    for i in 0..problem.n_generators() {
        for j in 0..problem.n_periods() {
            // indices range over the instance, so no builder can fail
            let built = [
                startup_row(problem, i, j),
                min_up_row(problem, i, j),
                min_down_row(problem, i, j),
            ];
            rows.extend(built.into_iter().flat_map(Result::ok).flatten());
        }
    }
    rows
}

/// Names of the minimum up/down-time rows a schedule violates.
pub fn min_time_violations(problem: &UnitCommitmentProblem, schedule: &CommitmentSchedule) -> Vec<String> {
    commitment_rows(problem)
        .into_iter()
        .filter(|row| row.kind != CommitmentRowKind::Startup)
        .filter(|row| !row.is_satisfied_by(problem, schedule))
        .map(|row| row.name())
        .collect()
}
