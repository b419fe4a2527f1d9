//! # ucp-io: Unit Commitment Data I/O
//!
//! Reads instances from the whitespace-separated generator and demand tables
//! and writes solutions as CSV or JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ucp_io::importers::load_instance;
//!
//! fn main() -> anyhow::Result<()> {
//!     let problem = load_instance(Path::new("data/generators.txt"), Path::new("data/demand.txt"), 46.0)?;
//!     println!("Generators: {}", problem.n_generators());
//!     println!("Peak demand: {} MW", problem.peak_demand());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! ### Importers ([`importers`])
//! - [`importers::load_instance`] - both tables plus a scalar shedding cost
//! - [`importers::parse_generators_file`] / [`importers::parse_demand_file`]
//!
//! ### Exporters ([`exporters`])
//! - [`exporters::SolutionExport`] - implemented by solver solution types
//! - [`exporters::DispatchTable`] - per-period dispatch, written by
//!   [`exporters::write_dispatch_csv`]

pub mod exporters;
pub mod importers;

pub use exporters::{DispatchTable, SolutionExport};
pub use importers::load_instance;
