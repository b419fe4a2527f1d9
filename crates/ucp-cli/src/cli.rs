use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Unit commitment by Benders decomposition", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Configuration file (defaults to <config dir>/ucp/config.toml when present)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve an instance and report the optimal commitment and dispatch
    Solve(SolveArgs),
    /// Parse and validate an instance without solving it
    Validate(InstanceArgs),
}

/// Input tables shared by every command
#[derive(Args, Debug, Clone)]
pub struct InstanceArgs {
    /// Generator table (two header lines, nine columns)
    #[arg(value_hint = ValueHint::FilePath)]
    pub generators: PathBuf,

    /// Demand table (one header line, one value per period)
    #[arg(value_hint = ValueHint::FilePath)]
    pub demand: PathBuf,

    /// Load-shedding cost ($/MWh), replicated across periods
    #[arg(long)]
    pub shedding_cost: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Solution method
    #[arg(long, value_enum)]
    pub method: Option<Method>,

    /// Solve with both methods and fail if the objectives disagree
    #[arg(long)]
    pub verify: bool,

    /// Write the per-period dispatch as CSV
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub csv: Option<PathBuf>,

    /// Write the full solution as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub json: Option<PathBuf>,

    /// Maximum number of integer nodes evaluated by Benders
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Wall-clock limit in seconds
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Relative MIP gap for master and monolithic solves
    #[arg(long)]
    pub mip_gap: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Benders decomposition with lazy cuts
    #[default]
    Benders,
    /// Single MILP, mainly for cross-checking
    Monolithic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve_flags() {
        let cli = Cli::parse_from([
            "ucp",
            "--log-level",
            "debug",
            "solve",
            "gens.txt",
            "demand.txt",
            "--shedding-cost",
            "46",
            "--method",
            "monolithic",
            "--verify",
        ]);
        assert_eq!(cli.log_level, tracing::Level::DEBUG);
        let Commands::Solve(args) = cli.command else {
            panic!("expected solve");
        };
        assert_eq!(args.instance.generators, PathBuf::from("gens.txt"));
        assert_eq!(args.instance.shedding_cost, Some(46.0));
        assert_eq!(args.method, Some(Method::Monolithic));
        assert!(args.verify);
        assert!(args.csv.is_none());
    }
}
