//! UCP solution data structures
//!
//! Defines the output shared by the Benders and monolithic solvers.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use ucp_core::{CommitmentSchedule, UnitCommitmentProblem};

use crate::benders::BendersStats;

/// Algorithm that produced a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveMethod {
    Benders,
    Monolithic,
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveMethod::Benders => write!(f, "benders"),
            SolveMethod::Monolithic => write!(f, "monolithic"),
        }
    }
}

/// Complete solution to a unit commitment instance
#[derive(Debug, Clone, Serialize)]
pub struct UcpSolution {
    pub method: SolveMethod,
    /// Total cost: commitment + startup + production + shedding
    pub objective: f64,
    pub commitment_cost: f64,
    pub startup_cost: f64,
    pub production_cost: f64,
    pub shedding_cost: f64,
    /// Best lower bound proven by the solver
    pub lower_bound: f64,
    pub generator_names: Vec<String>,
    pub demand: Vec<f64>,
    pub schedule: CommitmentSchedule,
    /// Output per generator, per period (MW)
    pub output: Vec<Vec<f64>>,
    /// Load shed per period (MW)
    pub load_shed: Vec<f64>,
    /// Decomposition counters (Benders only)
    pub benders: Option<BendersStats>,
    pub solve_time: Duration,
}

impl UcpSolution {
    /// Assemble a solution and its cost breakdown from a schedule and dispatch.
    pub fn from_dispatch(
        problem: &UnitCommitmentProblem,
        method: SolveMethod,
        schedule: CommitmentSchedule,
        output: Vec<Vec<f64>>,
        load_shed: Vec<f64>,
    ) -> Self {
        let mut commitment_cost = 0.0;
        let mut startup_cost = 0.0;
        let mut production_cost = 0.0;
        for (i, generator) in problem.generators().iter().enumerate() {
            let online = schedule.row(i).iter().filter(|&&on| on).count() as f64;
            commitment_cost += generator.commitment_cost * online;
            startup_cost += generator.startup_cost * schedule.startups(i) as f64;
            production_cost += generator.marginal_cost * output[i].iter().sum::<f64>();
        }
        let shedding_cost: f64 = problem
            .load_shedding_costs()
            .iter()
            .zip(&load_shed)
            .map(|(cost, shed)| cost * shed)
            .sum();
        let objective = commitment_cost + startup_cost + production_cost + shedding_cost;

        Self {
            method,
            objective,
            commitment_cost,
            startup_cost,
            production_cost,
            shedding_cost,
            lower_bound: objective,
            generator_names: problem.generators().iter().map(|g| g.name.clone()).collect(),
            demand: problem.demands().to_vec(),
            schedule,
            output,
            load_shed,
            benders: None,
            solve_time: Duration::ZERO,
        }
    }

    pub fn n_generators(&self) -> usize {
        self.output.len()
    }

    pub fn n_periods(&self) -> usize {
        self.load_shed.len()
    }

    /// Output of generator `i` in period `j` (MW)
    pub fn output(&self, i: usize, j: usize) -> f64 {
        self.output[i][j]
    }

    /// Total generation over the horizon (MWh)
    pub fn total_generation(&self) -> f64 {
        self.output.iter().flatten().sum()
    }

    /// Total load shed over the horizon (MWh)
    pub fn total_load_shed(&self) -> f64 {
        self.load_shed.iter().sum()
    }

    /// Number of startups across all generators
    pub fn total_startups(&self) -> usize {
        (0..self.schedule.n_generators())
            .map(|i| self.schedule.startups(i))
            .sum()
    }

    /// Relative gap between objective and lower bound
    pub fn gap(&self) -> f64 {
        if self.objective.abs() < f64::EPSILON {
            0.0
        } else {
            ((self.objective - self.lower_bound) / self.objective.abs()).max(0.0)
        }
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("UCP Solution Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Method: {}\n", self.method));
        s.push_str(&format!("Total Cost: ${:.2}\n", self.objective));
        s.push_str(&format!("  Commitment: ${:.2}\n", self.commitment_cost));
        s.push_str(&format!("  Startup: ${:.2}\n", self.startup_cost));
        s.push_str(&format!("  Production: ${:.2}\n", self.production_cost));
        s.push_str(&format!("  Load Shedding: ${:.2}\n", self.shedding_cost));
        s.push_str(&format!("Lower Bound: ${:.2} (gap {:.4}%)\n", self.lower_bound, self.gap() * 100.0));
        s.push_str(&format!(
            "Generation: {:.2} MWh, Load Shed: {:.2} MWh\n",
            self.total_generation(),
            self.total_load_shed()
        ));
        s.push_str(&format!(
            "Online unit-periods: {} ({} startups)\n",
            self.schedule.online_count(),
            self.total_startups()
        ));
        if let Some(stats) = &self.benders {
            s.push_str(&format!(
                "Benders: {} integer nodes, {} feasibility cuts, {} optimality cuts\n",
                stats.integer_nodes, stats.feasibility_cuts, stats.optimality_cuts
            ));
        }
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucp_core::Generator;

    #[test]
    fn test_cost_breakdown_and_summary() {
        let problem = UnitCommitmentProblem::with_uniform_shedding_cost(
            vec![
                Generator::new("A").with_output_limits(0.0, 60.0).with_costs(2.0, 7.0, 10.0),
                Generator::new("B").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 20.0),
            ],
            vec![100.0, 100.0],
            1000.0,
        )
        .unwrap();
        let schedule =
            CommitmentSchedule::from_rows(vec![vec![true, true], vec![false, true]]).unwrap();
        let solution = UcpSolution::from_dispatch(
            &problem,
            SolveMethod::Benders,
            schedule,
            vec![vec![60.0, 60.0], vec![0.0, 40.0]],
            vec![40.0, 0.0],
        );

        assert_eq!(solution.commitment_cost, 4.0);
        assert_eq!(solution.startup_cost, 7.0);
        assert_eq!(solution.production_cost, 1200.0 + 800.0);
        assert_eq!(solution.shedding_cost, 40_000.0);
        assert_eq!(solution.objective, 4.0 + 7.0 + 2000.0 + 40_000.0);
        assert_eq!(solution.total_startups(), 2);
        assert_eq!(solution.gap(), 0.0);

        let summary = solution.summary();
        assert!(summary.contains("Method: benders"));
        assert!(summary.contains("Load Shed: 40.00 MWh"));
    }
}
