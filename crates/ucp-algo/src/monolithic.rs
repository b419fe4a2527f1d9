//! Monolithic MILP baseline
//!
//! The undecomposed formulation: commitment, startup, output and load-shed
//! variables in a single model, solved with `good_lp` on HiGHS. Used to
//! cross-check the Benders result.
//!
//! ## Formulation
//!
//! ```text
//! min  sum c[i][j] + sum C_i u[i][j] + sum mc_i p[i][j] + sum L_j l[j]
//! s.t. sum_i p[i][j] + l[j] = d[j]
//!      min_i u[i][j] <= p[i][j] <= max_i u[i][j]
//!      p[i][j] - p[i][j-1] <= RU_i,  p[i][j-1] - p[i][j] <= RD_i
//!      startup and minimum up/down-time rows (see benders::formulation)
//!      u binary; c, p, l >= 0
//! ```

use std::time::{Duration, Instant};

use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use ucp_core::{CommitmentSchedule, UcpError, UnitCommitmentProblem};

use crate::benders::formulation::commitment_rows;
use crate::solution::{SolveMethod, UcpSolution};

/// Errors from the monolithic solver
#[derive(Debug, Error)]
pub enum MonolithicError {
    #[error("no feasible solution: the unit commitment MILP is infeasible")]
    NoFeasibleSolution,

    #[error("unit commitment MILP is unbounded")]
    Unbounded,

    #[error("invalid solver option: {0}")]
    InvalidOption(String),

    #[error("solver failed: {0}")]
    SolverFailed(String),

    #[error(transparent)]
    Problem(#[from] UcpError),
}

/// Configuration for the monolithic solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonolithicConfig {
    /// Relative MIP gap
    pub mip_rel_gap: f64,
    pub time_limit: Option<Duration>,
    pub verbose: bool,
}

impl Default for MonolithicConfig {
    fn default() -> Self {
        Self {
            mip_rel_gap: 1e-9,
            time_limit: None,
            verbose: false,
        }
    }
}

/// Solve a UCP instance as one MILP.
pub fn solve_monolithic(
    problem: &UnitCommitmentProblem,
    config: &MonolithicConfig,
) -> Result<UcpSolution, MonolithicError> {
    let start = Instant::now();
    let n_generators = problem.n_generators();
    let n_periods = problem.n_periods();

    let mut vars = variables!();
    let mut objective = Expression::from(0.0);

    let mut u: Vec<Vec<Variable>> = Vec::with_capacity(n_generators);
    let mut c: Vec<Vec<Variable>> = Vec::with_capacity(n_generators);
    let mut p: Vec<Vec<Variable>> = Vec::with_capacity(n_generators);
    for generator in problem.generators() {
        let u_i: Vec<Variable> = (0..n_periods).map(|_| vars.add(variable().binary())).collect();
        let c_i: Vec<Variable> = (0..n_periods).map(|_| vars.add(variable().min(0.0))).collect();
        let p_i: Vec<Variable> = (0..n_periods).map(|_| vars.add(variable().min(0.0))).collect();
        for j in 0..n_periods {
            objective += c_i[j] + generator.commitment_cost * u_i[j] + generator.marginal_cost * p_i[j];
        }
        u.push(u_i);
        c.push(c_i);
        p.push(p_i);
    }
    let l: Vec<Variable> = (0..n_periods).map(|_| vars.add(variable().min(0.0))).collect();
    for (j, &cost) in problem.load_shedding_costs().iter().enumerate() {
        objective += cost * l[j];
    }

    let mut model = vars.minimise(objective).using(highs).set_verbose(config.verbose);
    model = model
        .set_mip_rel_gap(config.mip_rel_gap as f32)
        .map_err(MonolithicError::InvalidOption)?;
    if let Some(limit) = config.time_limit {
        model = model.set_time_limit(limit.as_secs_f64());
    }

    for (j, &demand) in problem.demands().iter().enumerate() {
        let supply: Expression = (0..n_generators).map(|i| p[i][j]).sum();
        let shed = l[j];
        model = model.with(constraint!(supply + shed == demand));
    }
    for (i, generator) in problem.generators().iter().enumerate() {
        for j in 0..n_periods {
            let (p_ij, u_ij) = (p[i][j], u[i][j]);
            model = model.with(constraint!(p_ij >= generator.min_output * u_ij));
            model = model.with(constraint!(p_ij <= generator.max_output * u_ij));
            if j == 0 {
                continue;
            }
            let p_prev = p[i][j - 1];
            if generator.ramp_up.is_finite() {
                model = model.with(constraint!(p_ij - p_prev <= generator.ramp_up));
            }
            if generator.ramp_down.is_finite() {
                model = model.with(constraint!(p_prev - p_ij <= generator.ramp_down));
            }
        }
    }
    for row in commitment_rows(problem) {
        let mut lhs: Expression = row
            .u_terms
            .iter()
            .map(|&(t, coef)| coef * u[row.generator][t])
            .sum();
        if row.has_startup_column {
            lhs += c[row.generator][row.period];
        }
        model = model.with(constraint!(lhs >= row.lower));
    }

    let solved = model.solve().map_err(|err| match err {
        ResolutionError::Infeasible => MonolithicError::NoFeasibleSolution,
        ResolutionError::Unbounded => MonolithicError::Unbounded,
        other => MonolithicError::SolverFailed(other.to_string()),
    })?;

    let flags = u
        .iter()
        .flat_map(|u_i| u_i.iter().map(|&v| solved.value(v) > 0.5))
        .collect();
    let schedule = CommitmentSchedule::from_flags(n_generators, n_periods, flags)?;
    let output = p
        .iter()
        .map(|p_i| p_i.iter().map(|&v| solved.value(v).max(0.0)).collect())
        .collect();
    let load_shed = l.iter().map(|&v| solved.value(v).max(0.0)).collect();

    let mut solution = UcpSolution::from_dispatch(problem, SolveMethod::Monolithic, schedule, output, load_shed);
    solution.solve_time = start.elapsed();
    info!(
        objective = solution.objective,
        elapsed = ?solution.solve_time,
        "monolithic MILP solved"
    );
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucp_core::Generator;

    #[test]
    fn test_two_generator_scenario() {
        let problem = UnitCommitmentProblem::with_uniform_shedding_cost(
            vec![
                Generator::new("A").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 10.0),
                Generator::new("B").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 20.0),
            ],
            vec![100.0, 100.0, 100.0],
            1000.0,
        )
        .unwrap();
        let solution = solve_monolithic(&problem, &MonolithicConfig::default()).unwrap();
        assert!((solution.objective - 4200.0).abs() < 1e-6);
        assert!(solution.total_load_shed() < 1e-6);
        for j in 0..3 {
            assert!((solution.output(0, j) - 60.0).abs() < 1e-6);
            assert!((solution.output(1, j) - 40.0).abs() < 1e-6);
        }
    }
}
