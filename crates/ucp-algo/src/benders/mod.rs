//! Benders decomposition of the unit commitment problem
//!
//! The instance is split into
//!
//! - a [`MasterProblem`] over the binary commitments `u`, startup costs `c` and
//!   a lower bound `phi` on the dispatch cost, holding the minimum up/down-time
//!   logic;
//! - a [`DispatchSubproblem`] LP for a fixed commitment, in a feasibility
//!   variant (total violation of output/ramp limits) and an optimality variant
//!   (production plus shedding cost).
//!
//! The [`BendersOrchestrator`] runs at every integer-feasible master node:
//! infeasible commitments receive a feasibility cut, commitments whose `phi`
//! underestimates the dispatch cost receive an optimality cut, and the first
//! node passing both tests is optimal.
//!
//! ## Example
//!
//! ```no_run
//! use ucp_algo::benders::{solve_benders, BendersConfig};
//! use ucp_core::{Generator, UnitCommitmentProblemBuilder};
//!
//! let problem = UnitCommitmentProblemBuilder::new()
//!     .generator(Generator::new("A").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 10.0))
//!     .generator(Generator::new("B").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 20.0))
//!     .demand([100.0, 100.0, 100.0])
//!     .uniform_shedding_cost(1000.0)
//!     .build()?;
//!
//! let solution = solve_benders(&problem, &BendersConfig::default())?;
//! println!("{}", solution.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cut;
pub mod formulation;
pub mod master;
pub mod orchestrator;
pub mod solver;
pub mod subproblem;

pub use cut::{Cut, CutKind};
pub use master::{CutGenerator, MasterNode, MasterProblem, MasterSearchStats};
pub use orchestrator::{
    evaluate_node, BendersOrchestrator, BendersStats, Candidate, IncumbentRegistry, NodeOutcome,
    OrchestratorState, Tolerances,
};
pub use solver::{solve_benders, solve_benders_with, BendersConfig};
pub use subproblem::{DispatchDuals, DispatchSolution, DispatchSubproblem, SubproblemVariant};

use thiserror::Error;
use ucp_core::UcpError;

use crate::lp::SolverError;

/// Errors that can occur during the decomposition
#[derive(Debug, Error)]
pub enum BendersError {
    /// No commitment satisfies the master constraints
    #[error("no feasible solution: the master problem is infeasible")]
    NoFeasibleCommitment,

    /// A commitment was read from a non-integral master point
    #[error("commitment u[{generator}][{period}] = {value} is not integral")]
    FractionalCommitment {
        generator: usize,
        period: usize,
        value: f64,
    },

    /// A schedule does not match the instance dimensions
    #[error("schedule is {}x{}, instance is {}x{}", actual.0, actual.1, expected.0, expected.1)]
    ScheduleShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A result was requested before the corresponding solve
    #[error("problem has not been solved")]
    NotSolved,

    #[error("integer node limit of {0} reached before convergence")]
    IterationLimit(usize),

    #[error("time limit of {0:.1}s reached before convergence")]
    TimeLimit(f64),

    /// The same schedule failed the feasibility test twice
    #[error("feasibility cut repeated at node {node} (violation {violation:e}); solver tolerances too loose")]
    Stalled { node: usize, violation: f64 },

    /// Numerical or other failure of the LP/MILP engine
    #[error("solver failure: {0}")]
    Solver(SolverError),

    #[error(transparent)]
    Problem(#[from] UcpError),
}

/// Master-side mapping: infeasibility of the master means no commitment
/// exists, budget exhaustion maps onto the decomposition limits.
impl From<SolverError> for BendersError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Infeasible => BendersError::NoFeasibleCommitment,
            SolverError::NodeLimit { nodes } => BendersError::IterationLimit(nodes),
            SolverError::TimeLimit { seconds } => BendersError::TimeLimit(seconds),
            other => BendersError::Solver(other),
        }
    }
}
