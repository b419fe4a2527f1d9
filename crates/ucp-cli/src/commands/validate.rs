use std::io::{self, Write};

use anyhow::Result;
use tabwriter::TabWriter;
use ucp_cli::{InstanceArgs, UcpConfig};
use ucp_core::UnitCommitmentProblem;

use super::load_problem;

pub fn handle(args: &InstanceArgs, config: &UcpConfig) -> Result<()> {
    let problem = load_problem(args, config.instance.load_shedding_cost)?;
    print_instance(&problem)?;
    Ok(())
}

fn format_limit(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "-".to_string()
    }
}

fn print_instance(problem: &UnitCommitmentProblem) -> Result<()> {
    println!(
        "Instance OK: {} generators, {} periods",
        problem.n_generators(),
        problem.n_periods()
    );

    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "NAME\tMIN\tMAX\tSTARTUP\tCOMMITMENT\tMARGINAL\tRAMP UP\tRAMP DOWN\tMIN UP\tMIN DOWN"
    )?;
    for generator in problem.generators() {
        writeln!(
            writer,
            "{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{}",
            generator.name,
            generator.min_output,
            generator.max_output,
            generator.startup_cost,
            generator.commitment_cost,
            generator.marginal_cost,
            format_limit(generator.ramp_up),
            format_limit(generator.ramp_down),
            generator.min_up_time,
            generator.min_down_time
        )?;
    }
    writer.flush()?;

    let capacity = problem.installed_capacity();
    let peak = problem.peak_demand();
    println!("Installed capacity: {capacity:.2} MW");
    println!("Peak demand: {peak:.2} MW");
    println!("Total demand: {:.2} MWh", problem.total_demand());
    if capacity < peak {
        println!(
            "Warning: peak demand exceeds installed capacity by {:.2} MW; load will be shed",
            peak - capacity
        );
    }
    Ok(())
}
