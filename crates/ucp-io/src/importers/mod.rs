//! Text-table importers
//!
//! An instance is stored as two whitespace-separated tables:
//!
//! | File | Header | Rows |
//! |------|--------|------|
//! | generators | 2 lines (names, units) | `name min max startup commitment ramp minUp minDown marginal` |
//! | demand | 1 line | one demand value (MW) per period |
//!
//! The load-shedding cost is a single scalar supplied separately and
//! replicated across periods.
//!
//! ```no_run
//! use std::path::Path;
//! use ucp_io::importers::load_instance;
//!
//! let problem = load_instance(Path::new("data/generators.txt"), Path::new("data/demand.txt"), 46.0)?;
//! println!("{} generators, {} periods", problem.n_generators(), problem.n_periods());
//! # Ok::<(), anyhow::Error>(())
//! ```

mod demand;
mod generators;

use std::path::Path;

use anyhow::{Context, Result};
use ucp_core::UnitCommitmentProblem;

pub use demand::{parse_demand_file, parse_demand_string, DEMAND_HEADER_LINES};
pub use generators::{parse_generators_file, parse_generators_string, GENERATOR_COLUMNS, GENERATOR_HEADER_LINES};

/// Load and validate an instance from a generator table and a demand table.
pub fn load_instance(
    generators_path: &Path,
    demand_path: &Path,
    load_shedding_cost: f64,
) -> Result<UnitCommitmentProblem> {
    let generators = parse_generators_file(generators_path)?;
    let demand = parse_demand_file(demand_path)?;
    UnitCommitmentProblem::with_uniform_shedding_cost(generators, demand, load_shedding_cost).with_context(|| {
        format!(
            "validating instance from '{}' and '{}'",
            generators_path.display(),
            demand_path.display()
        )
    })
}

/// Build an instance from in-memory table contents.
pub fn instance_from_strings(
    generators: &str,
    demand: &str,
    load_shedding_cost: f64,
) -> Result<UnitCommitmentProblem> {
    let generators = parse_generators_string(generators).context("parsing generator table")?;
    let demand = parse_demand_string(demand).context("parsing demand table")?;
    UnitCommitmentProblem::with_uniform_shedding_cost(generators, demand, load_shedding_cost)
        .context("validating instance")
}
