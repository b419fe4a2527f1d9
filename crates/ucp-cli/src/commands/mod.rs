pub mod solve;
pub mod validate;

use anyhow::Result;
use ucp_core::UnitCommitmentProblem;
use ucp_io::importers::load_instance;

use ucp_cli::InstanceArgs;

/// Load the instance named on the command line; the flag overrides the
/// configured shedding cost.
pub fn load_problem(args: &InstanceArgs, default_shedding_cost: f64) -> Result<UnitCommitmentProblem> {
    let shedding_cost = args.shedding_cost.unwrap_or(default_shedding_cost);
    load_instance(&args.generators, &args.demand, shedding_cost)
}
