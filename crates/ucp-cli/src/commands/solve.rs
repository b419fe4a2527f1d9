use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use tabwriter::TabWriter;
use tracing::info;
use ucp_algo::{solve_benders, solve_monolithic, UcpSolution};
use ucp_cli::{Method, SolveArgs, UcpConfig};
use ucp_core::UnitCommitmentProblem;
use ucp_io::SolutionExport;

use super::load_problem;

/// Largest relative objective difference accepted by `--verify`
const VERIFY_TOLERANCE: f64 = 1e-6;

pub fn handle(args: &SolveArgs, config: UcpConfig) -> Result<()> {
    let config = config.with_overrides(args)?;
    let problem = load_problem(&args.instance, config.instance.load_shedding_cost)?;
    info!(
        generators = problem.n_generators(),
        periods = problem.n_periods(),
        method = ?config.solver.method,
        "loaded instance"
    );

    let solution = solve(&problem, &config, config.solver.method)?;

    if args.verify {
        let other = match config.solver.method {
            Method::Benders => Method::Monolithic,
            Method::Monolithic => Method::Benders,
        };
        let reference = solve(&problem, &config, other)?;
        let difference = relative_difference(solution.objective, reference.objective);
        if difference > VERIFY_TOLERANCE {
            bail!(
                "objectives disagree: {} {:.6} vs {} {:.6} (relative difference {difference:e})",
                solution.method,
                solution.objective,
                reference.method,
                reference.objective
            );
        }
        println!(
            "Verified: {} and {} objectives agree ({:.6})",
            solution.method, reference.method, reference.objective
        );
    }

    print_report(&solution)?;

    if let Some(path) = &args.csv {
        solution.to_csv(path)?;
        info!(path = %path.display(), "wrote dispatch CSV");
    }
    if let Some(path) = &args.json {
        solution.to_json(path)?;
        info!(path = %path.display(), "wrote solution JSON");
    }
    Ok(())
}

fn solve(problem: &UnitCommitmentProblem, config: &UcpConfig, method: Method) -> Result<UcpSolution> {
    match method {
        Method::Benders => solve_benders(problem, &config.benders()).context("Benders decomposition failed"),
        Method::Monolithic => {
            solve_monolithic(problem, &config.monolithic()).context("monolithic MILP failed")
        }
    }
}

fn relative_difference(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs().max(1.0)
}

fn print_report(solution: &UcpSolution) -> Result<()> {
    print!("{}", solution.summary());
    println!();

    let mut writer = TabWriter::new(io::stdout());
    write!(writer, "PERIOD\tDEMAND\tSHED")?;
    for name in &solution.generator_names {
        write!(writer, "\t{name}")?;
    }
    writeln!(writer)?;

    for (j, demand) in solution.demand.iter().enumerate() {
        write!(writer, "{j}\t{demand:.2}\t{:.2}", solution.load_shed[j])?;
        for i in 0..solution.n_generators() {
            if solution.schedule.is_on(i, j) {
                write!(writer, "\t{:.2}", solution.output(i, j))?;
            } else {
                write!(writer, "\t-")?;
            }
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    println!("Objective: {:.6}", solution.objective);
    Ok(())
}
