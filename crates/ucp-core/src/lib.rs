//! # ucp-core: Unit Commitment Problem Data
//!
//! Provides the immutable instance description shared by the solver crates:
//!
//! - [`Generator`] - technical and economic parameters of one unit
//! - [`UnitCommitmentProblem`] - the validated fleet plus per-period demand
//!   and load-shedding cost
//! - [`CommitmentSchedule`] - a complete on/off assignment per generator and period
//! - [`UcpError`] - unified error type with bounds-violation reporting
//!
//! ## Quick Start
//!
//! ```rust
//! use ucp_core::{Generator, UnitCommitmentProblemBuilder};
//!
//! let problem = UnitCommitmentProblemBuilder::new()
//!     .generator(Generator::new("A").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 10.0))
//!     .generator(Generator::new("B").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 20.0))
//!     .demand([100.0, 100.0, 100.0])
//!     .uniform_shedding_cost(1000.0)
//!     .build()?;
//!
//! assert_eq!(problem.n_generators(), 2);
//! assert_eq!(problem.n_periods(), 3);
//! # Ok::<(), ucp_core::UcpError>(())
//! ```

pub mod error;
pub mod problem;
pub mod schedule;

pub use error::{UcpError, UcpResult};
pub use problem::{Generator, UnitCommitmentProblem, UnitCommitmentProblemBuilder};
pub use schedule::CommitmentSchedule;
