//! Benders driver
//!
//! Builds the master, binds a [`BendersOrchestrator`] to its node hook and
//! turns the accepted node into a [`UcpSolution`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ucp_core::UnitCommitmentProblem;

use super::formulation::min_time_violations;
use super::master::MasterProblem;
use super::orchestrator::{BendersOrchestrator, Tolerances};
use super::BendersError;
use crate::lp::{HighsOptions, HighsSolver, SearchLimits, Solver};
use crate::solution::{SolveMethod, UcpSolution};

/// Configuration for the Benders solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BendersConfig {
    /// Feasibility objectives at or above this trigger a feasibility cut
    pub feasibility_tolerance: f64,
    /// Slack allowed between `phi` and the dispatch cost when accepting a node
    pub optimality_tolerance: f64,
    /// Maximum number of integer nodes evaluated
    pub max_iterations: usize,
    /// Wall-clock limit for the whole decomposition
    pub time_limit: Option<Duration>,
    /// Relative MIP gap of each master solve
    pub mip_rel_gap: f64,
    /// Forward HiGHS output to stdout
    pub verbose: bool,
}

impl Default for BendersConfig {
    fn default() -> Self {
        Self {
            feasibility_tolerance: 1e-9,
            optimality_tolerance: 1e-9,
            max_iterations: 10_000,
            time_limit: None,
            mip_rel_gap: 1e-9,
            verbose: false,
        }
    }
}

impl BendersConfig {
    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            feasibility: self.feasibility_tolerance,
            optimality: self.optimality_tolerance,
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_integer_nodes: self.max_iterations,
            time_limit: self.time_limit,
        }
    }

    /// Per-solve options; the overall `time_limit` is a shared budget, see
    /// [`BendersConfig::highs_solver`].
    pub fn highs_options(&self) -> HighsOptions {
        HighsOptions {
            mip_rel_gap: self.mip_rel_gap,
            time_limit: None,
            verbose: self.verbose,
        }
    }

    /// HiGHS backend whose master and subproblem solves together stay within
    /// `time_limit`, counted from this call.
    pub fn highs_solver(&self) -> HighsSolver {
        let solver = HighsSolver::new(self.highs_options());
        match self.time_limit {
            Some(limit) => solver.with_time_budget(limit),
            None => solver,
        }
    }
}

/// Solve a UCP instance by Benders decomposition on HiGHS.
pub fn solve_benders(problem: &UnitCommitmentProblem, config: &BendersConfig) -> Result<UcpSolution, BendersError> {
    solve_benders_with(problem, config, &config.highs_solver())
}

/// Solve a UCP instance by Benders decomposition on any [`Solver`].
///
/// The same solver handles the master MILP and both subproblem LPs.
pub fn solve_benders_with<S: Solver + ?Sized>(
    problem: &UnitCommitmentProblem,
    config: &BendersConfig,
    solver: &S,
) -> Result<UcpSolution, BendersError> {
    let start = Instant::now();
    info!(
        generators = problem.n_generators(),
        periods = problem.n_periods(),
        solver = solver.name(),
        "starting Benders decomposition"
    );

    let mut master = MasterProblem::new(problem);
    let mut orchestrator = BendersOrchestrator::new(problem, solver, config.tolerances());
    let search = master.solve(solver, &config.search_limits(), &mut orchestrator)?;
    let lower_bound = master.objective_value()?;

    let (registry, stats) = orchestrator.into_parts();
    let candidate = registry.into_best().ok_or(BendersError::NotSolved)?;

    let violations = min_time_violations(problem, &candidate.schedule);
    if !violations.is_empty() {
        warn!(rows = ?violations, "accepted schedule violates minimum up/down-time rows");
    }

    let n_generators = problem.n_generators();
    let output = (0..n_generators)
        .map(|i| candidate.dispatch.output_profile(i).map(<[f64]>::to_vec))
        .collect::<Result<Vec<_>, _>>()?;
    let load_shed = candidate.dispatch.load_shed_profile().to_vec();
    let mut solution = UcpSolution::from_dispatch(problem, SolveMethod::Benders, candidate.schedule, output, load_shed);
    solution.lower_bound = lower_bound;
    solution.benders = Some(stats);
    solution.solve_time = start.elapsed();

    info!(
        objective = solution.objective,
        lower_bound,
        integer_nodes = search.integer_nodes,
        feasibility_cuts = stats.feasibility_cuts,
        optimality_cuts = stats.optimality_cuts,
        elapsed = ?solution.solve_time,
        "Benders decomposition converged"
    );
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BendersConfig::default();
        assert_eq!(config.feasibility_tolerance, 1e-9);
        assert_eq!(config.optimality_tolerance, 1e-9);
        assert_eq!(config.max_iterations, 10_000);
        assert!(config.time_limit.is_none());
        assert_eq!(config.search_limits().max_integer_nodes, 10_000);
        assert!(config.highs_solver().remaining_time().is_none());
    }

    #[test]
    fn test_time_limit_is_a_shared_budget() {
        let config = BendersConfig {
            time_limit: Some(Duration::from_secs(120)),
            ..BendersConfig::default()
        };
        assert!(config.highs_options().time_limit.is_none());
        let remaining = config.highs_solver().remaining_time().unwrap();
        assert!(remaining <= Duration::from_secs(120));
        assert!(remaining > Duration::from_secs(60));
    }
}
