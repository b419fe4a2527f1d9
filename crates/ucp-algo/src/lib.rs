//! # ucp-algo: Unit Commitment Solvers
//!
//! This crate solves unit commitment instances from [`ucp_core`] to global
//! optimality.
//!
//! | Method | Entry point | Description |
//! |--------|-------------|-------------|
//! | Benders decomposition | [`solve_benders`] | Binary master with dual-derived cuts from dispatch LPs |
//! | Monolithic MILP | [`solve_monolithic`] | Single model on `good_lp`, used as a correctness baseline |
//!
//! ### Architecture
//!
//! - **[`lp`]**: solver-independent LP model, the [`lp::Solver`] trait, the
//!   HiGHS backend and the lazy-constraint integer-node hook
//! - **[`benders`]**: master problem, dispatch subproblems, cuts and the
//!   orchestrator state machine
//! - **[`monolithic`]**: the undecomposed formulation
//! - **[`solution`]**: the [`UcpSolution`] shared by both methods, exported
//!   to CSV/JSON through [`ucp_io::SolutionExport`]
//!
//! ## Example
//!
//! ```no_run
//! use ucp_algo::{solve_benders, solve_monolithic, BendersConfig, MonolithicConfig};
//! use ucp_core::{Generator, UnitCommitmentProblemBuilder};
//!
//! let problem = UnitCommitmentProblemBuilder::new()
//!     .generator(Generator::new("A").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 10.0))
//!     .generator(Generator::new("B").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 20.0))
//!     .demand([100.0, 100.0, 100.0])
//!     .uniform_shedding_cost(1000.0)
//!     .build()?;
//!
//! let benders = solve_benders(&problem, &BendersConfig::default())?;
//! let monolithic = solve_monolithic(&problem, &MonolithicConfig::default())?;
//! assert!((benders.objective - monolithic.objective).abs() < 1e-6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod benders;
mod export;
pub mod lp;
pub mod monolithic;
pub mod solution;

pub use benders::{solve_benders, solve_benders_with, BendersConfig, BendersError, BendersStats};
pub use monolithic::{solve_monolithic, MonolithicConfig, MonolithicError};
pub use solution::{SolveMethod, UcpSolution};
