//! Benders cuts over the master's commitment variables

use serde::Serialize;
use std::fmt;

use ucp_core::{CommitmentSchedule, UcpError};

use super::BendersError;

/// Which subproblem produced a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CutKind {
    /// `constant + sum(coef * u) <= 0`
    Feasibility,
    /// `constant + sum(coef * u) - phi <= 0`
    Optimality,
}

impl fmt::Display for CutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutKind::Feasibility => write!(f, "feasibility"),
            CutKind::Optimality => write!(f, "optimality"),
        }
    }
}

/// A globally valid linear inequality over `u` (and `phi` for optimality cuts).
///
/// Coefficients are stored densely, row-major by generator, so every
/// `(generator, period)` pair of the instance has an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cut {
    kind: CutKind,
    constant: f64,
    n_periods: usize,
    coefficients: Vec<f64>,
}

impl Cut {
    pub fn new(kind: CutKind, constant: f64, n_periods: usize, coefficients: Vec<f64>) -> Self {
        debug_assert!(n_periods > 0 && coefficients.len() % n_periods == 0);
        Self {
            kind,
            constant,
            n_periods,
            coefficients,
        }
    }

    pub fn kind(&self) -> CutKind {
        self.kind
    }

    /// Part of the bound that does not depend on `u`
    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn n_generators(&self) -> usize {
        self.coefficients.len() / self.n_periods
    }

    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Coefficient of `u[i][j]`
    pub fn coefficient(&self, i: usize, j: usize) -> Result<f64, BendersError> {
        let n_generators = self.n_generators();
        if i >= n_generators {
            return Err(UcpError::OutOfRange { what: "generator", index: i, len: n_generators }.into());
        }
        if j >= self.n_periods {
            return Err(UcpError::OutOfRange { what: "period", index: j, len: self.n_periods }.into());
        }
        Ok(self.coefficients[i * self.n_periods + j])
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Non-zero coefficients as `((generator, period), coefficient)`
    pub fn terms(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        let n_periods = self.n_periods;
        self.coefficients
            .iter()
            .enumerate()
            .filter(|(_, &coef)| coef != 0.0)
            .map(move |(k, &coef)| ((k / n_periods, k % n_periods), coef))
    }

    /// `constant + sum(coef * u)` for a fixed schedule: the subproblem value
    /// this cut predicts at `schedule`.
    pub fn evaluate(&self, schedule: &CommitmentSchedule) -> f64 {
        self.terms()
            .filter(|&((i, j), _)| schedule.is_on(i, j))
            .map(|(_, coef)| coef)
            .sum::<f64>()
            + self.constant
    }

    /// Amount by which `(schedule, phi)` violates this cut (0 when satisfied).
    ///
    /// `phi` is ignored for feasibility cuts.
    pub fn violation(&self, schedule: &CommitmentSchedule, phi: f64) -> f64 {
        let lhs = match self.kind {
            CutKind::Feasibility => self.evaluate(schedule),
            CutKind::Optimality => self.evaluate(schedule) - phi,
        };
        lhs.max(0.0)
    }
}
