//! Unit commitment problem data
//!
//! Defines the immutable description of a UCP instance: the generator fleet
//! with its technical and economic parameters, and the per-period demand and
//! load-shedding cost.

use serde::Serialize;

use crate::error::{UcpError, UcpResult};

/// A thermal generating unit.
///
/// Costs are per period: `commitment_cost` is charged for every period the
/// unit is online, `startup_cost` for every off-to-on transition and
/// `marginal_cost` per MW produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generator {
    /// Human-readable name
    pub name: String,
    /// Fixed cost per online period ($)
    pub commitment_cost: f64,
    /// Production cost ($/MW)
    pub marginal_cost: f64,
    /// Cost of an off-to-on transition ($)
    pub startup_cost: f64,
    /// Minimum output while online (MW)
    pub min_output: f64,
    /// Maximum output while online (MW)
    pub max_output: f64,
    /// Periods the unit must stay online after a startup
    pub min_up_time: usize,
    /// Periods the unit must stay offline after a shutdown
    pub min_down_time: usize,
    /// Maximum output increase between consecutive periods (MW/period, `INFINITY` = unlimited)
    pub ramp_up: f64,
    /// Maximum output decrease between consecutive periods (MW/period, `INFINITY` = unlimited)
    pub ramp_down: f64,
}

impl Generator {
    /// Create a generator with zero costs and no technical limits.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commitment_cost: 0.0,
            marginal_cost: 0.0,
            startup_cost: 0.0,
            min_output: 0.0,
            max_output: 0.0,
            min_up_time: 1,
            min_down_time: 1,
            ramp_up: f64::INFINITY,
            ramp_down: f64::INFINITY,
        }
    }

    /// Set the output limits (MW)
    pub fn with_output_limits(mut self, min_output: f64, max_output: f64) -> Self {
        self.min_output = min_output;
        self.max_output = max_output;
        self
    }

    /// Set commitment, startup and marginal costs
    pub fn with_costs(mut self, commitment_cost: f64, startup_cost: f64, marginal_cost: f64) -> Self {
        self.commitment_cost = commitment_cost;
        self.startup_cost = startup_cost;
        self.marginal_cost = marginal_cost;
        self
    }

    /// Set minimum up and down times (periods)
    pub fn with_min_times(mut self, min_up_time: usize, min_down_time: usize) -> Self {
        self.min_up_time = min_up_time;
        self.min_down_time = min_down_time;
        self
    }

    /// Set ramp-up and ramp-down limits (MW/period)
    pub fn with_ramps(mut self, ramp_up: f64, ramp_down: f64) -> Self {
        self.ramp_up = ramp_up;
        self.ramp_down = ramp_down;
        self
    }

    /// Set the same limit for ramping up and down
    pub fn with_ramp_rate(self, ramp_rate: f64) -> Self {
        self.with_ramps(ramp_rate, ramp_rate)
    }

    fn validate(&self, index: usize) -> UcpResult<()> {
        let label = format!("generator {} ({})", index, self.name);
        for (field, value) in [
            ("commitment cost", self.commitment_cost),
            ("marginal cost", self.marginal_cost),
            ("startup cost", self.startup_cost),
            ("minimum output", self.min_output),
            ("maximum output", self.max_output),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(UcpError::Validation(format!(
                    "{label}: {field} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.min_output > self.max_output {
            return Err(UcpError::Validation(format!(
                "{label}: minimum output {} exceeds maximum output {}",
                self.min_output, self.max_output
            )));
        }
        if self.min_up_time == 0 || self.min_down_time == 0 {
            return Err(UcpError::Validation(format!(
                "{label}: minimum up/down times must be at least one period"
            )));
        }
        for (field, value) in [("ramp-up limit", self.ramp_up), ("ramp-down limit", self.ramp_down)] {
            if value.is_nan() || value < 0.0 {
                return Err(UcpError::Validation(format!(
                    "{label}: {field} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// An immutable unit commitment instance.
///
/// Per-generator data lives in [`Generator`]; per-period data is stored in
/// parallel vectors of length [`n_periods`](Self::n_periods). Construction
/// validates every invariant, so downstream code can index freely with
/// `0..n_generators()` and `0..n_periods()`.
#[derive(Debug, Clone, Serialize)]
pub struct UnitCommitmentProblem {
    generators: Vec<Generator>,
    demand: Vec<f64>,
    load_shedding_cost: Vec<f64>,
}

impl UnitCommitmentProblem {
    /// Create and validate an instance.
    pub fn new(
        generators: Vec<Generator>,
        demand: Vec<f64>,
        load_shedding_cost: Vec<f64>,
    ) -> UcpResult<Self> {
        if generators.is_empty() {
            return Err(UcpError::Validation(
                "instance must contain at least one generator".to_string(),
            ));
        }
        if demand.is_empty() {
            return Err(UcpError::Validation(
                "instance must contain at least one period".to_string(),
            ));
        }
        if load_shedding_cost.len() != demand.len() {
            return Err(UcpError::Validation(format!(
                "load-shedding cost has {} entries but demand has {} periods",
                load_shedding_cost.len(),
                demand.len()
            )));
        }
        for (i, generator) in generators.iter().enumerate() {
            generator.validate(i)?;
        }
        for (j, (&d, &cost)) in demand.iter().zip(&load_shedding_cost).enumerate() {
            if !d.is_finite() || d < 0.0 {
                return Err(UcpError::Validation(format!(
                    "period {j}: demand must be finite and non-negative, got {d}"
                )));
            }
            if !cost.is_finite() || cost < 0.0 {
                return Err(UcpError::Validation(format!(
                    "period {j}: load-shedding cost must be finite and non-negative, got {cost}"
                )));
            }
        }
        Ok(Self {
            generators,
            demand,
            load_shedding_cost,
        })
    }

    /// Create an instance with one shedding cost replicated across all periods.
    pub fn with_uniform_shedding_cost(
        generators: Vec<Generator>,
        demand: Vec<f64>,
        load_shedding_cost: f64,
    ) -> UcpResult<Self> {
        let costs = vec![load_shedding_cost; demand.len()];
        Self::new(generators, demand, costs)
    }

    /// Number of generators
    pub fn n_generators(&self) -> usize {
        self.generators.len()
    }

    /// Number of periods
    pub fn n_periods(&self) -> usize {
        self.demand.len()
    }

    /// All generators in index order
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// Demand per period (MW)
    pub fn demands(&self) -> &[f64] {
        &self.demand
    }

    /// Load-shedding cost per period ($/MW)
    pub fn load_shedding_costs(&self) -> &[f64] {
        &self.load_shedding_cost
    }

    /// Generator `i`, or a bounds error naming the valid range.
    pub fn generator(&self, i: usize) -> UcpResult<&Generator> {
        self.generators.get(i).ok_or(UcpError::OutOfRange {
            what: "generator",
            index: i,
            len: self.generators.len(),
        })
    }

    /// Demand in period `j` (MW)
    pub fn demand(&self, j: usize) -> UcpResult<f64> {
        self.check_period(j)?;
        Ok(self.demand[j])
    }

    /// Load-shedding cost in period `j` ($/MW)
    pub fn load_shedding_cost(&self, j: usize) -> UcpResult<f64> {
        self.check_period(j)?;
        Ok(self.load_shedding_cost[j])
    }

    /// Look up a generator index by name
    pub fn generator_index(&self, name: &str) -> Option<usize> {
        self.generators.iter().position(|g| g.name == name)
    }

    /// Sum of maximum outputs over the fleet (MW)
    pub fn installed_capacity(&self) -> f64 {
        self.generators.iter().map(|g| g.max_output).sum()
    }

    /// Largest single-period demand (MW)
    pub fn peak_demand(&self) -> f64 {
        self.demand.iter().copied().fold(0.0, f64::max)
    }

    /// Total energy demanded over the horizon (MWh)
    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    /// End (exclusive) of the minimum up-time window starting at period `j`,
    /// clipped to the horizon.
    pub fn min_up_window_end(&self, i: usize, j: usize) -> UcpResult<usize> {
        let generator = self.generator(i)?;
        self.check_period(j)?;
        Ok((j + generator.min_up_time).min(self.n_periods()))
    }

    /// End (exclusive) of the minimum down-time window starting at period `j`,
    /// clipped to the horizon.
    pub fn min_down_window_end(&self, i: usize, j: usize) -> UcpResult<usize> {
        let generator = self.generator(i)?;
        self.check_period(j)?;
        Ok((j + generator.min_down_time).min(self.n_periods()))
    }

    fn check_period(&self, j: usize) -> UcpResult<()> {
        if j >= self.demand.len() {
            return Err(UcpError::OutOfRange {
                what: "period",
                index: j,
                len: self.demand.len(),
            });
        }
        Ok(())
    }
}

/// Builder for constructing unit commitment instances
#[derive(Debug, Default)]
pub struct UnitCommitmentProblemBuilder {
    generators: Vec<Generator>,
    demand: Vec<f64>,
    load_shedding_cost: Option<Vec<f64>>,
    uniform_shedding_cost: Option<f64>,
}

impl UnitCommitmentProblemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a generator
    pub fn generator(mut self, generator: Generator) -> Self {
        self.generators.push(generator);
        self
    }

    /// Add several generators
    pub fn generators(mut self, generators: impl IntoIterator<Item = Generator>) -> Self {
        self.generators.extend(generators);
        self
    }

    /// Set the demand profile (MW per period)
    pub fn demand(mut self, demand: impl Into<Vec<f64>>) -> Self {
        self.demand = demand.into();
        self
    }

    /// Set a per-period load-shedding cost
    pub fn load_shedding_costs(mut self, costs: impl Into<Vec<f64>>) -> Self {
        self.load_shedding_cost = Some(costs.into());
        self
    }

    /// Use one load-shedding cost for every period
    pub fn uniform_shedding_cost(mut self, cost: f64) -> Self {
        self.uniform_shedding_cost = Some(cost);
        self
    }

    /// Validate and build the instance
    pub fn build(self) -> UcpResult<UnitCommitmentProblem> {
        let costs = match (self.load_shedding_cost, self.uniform_shedding_cost) {
            (Some(costs), None) => costs,
            (None, Some(cost)) => vec![cost; self.demand.len()],
            (None, None) => {
                return Err(UcpError::Validation(
                    "load-shedding cost not specified".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(UcpError::Validation(
                    "both per-period and uniform load-shedding costs specified".to_string(),
                ))
            }
        };
        UnitCommitmentProblem::new(self.generators, self.demand, costs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_unit_problem() -> UnitCommitmentProblem {
        UnitCommitmentProblemBuilder::new()
            .generator(Generator::new("A").with_output_limits(0.0, 60.0))
            .generator(Generator::new("B").with_output_limits(10.0, 60.0).with_min_times(3, 2))
            .demand([100.0, 100.0, 100.0])
            .uniform_shedding_cost(1000.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_dimensions() {
        let problem = two_unit_problem();
        assert_eq!(problem.n_generators(), 2);
        assert_eq!(problem.n_periods(), 3);
        assert_eq!(problem.load_shedding_costs(), &[1000.0; 3]);
        assert_eq!(problem.installed_capacity(), 120.0);
        assert_eq!(problem.peak_demand(), 100.0);
        assert_eq!(problem.generator_index("B"), Some(1));
    }

    #[test]
    fn test_problem_serializes_to_json() {
        let problem = two_unit_problem();
        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(value["generators"][1]["name"], "B");
        assert_eq!(value["generators"][1]["min_up_time"], 3);
        // unlimited ramps have no JSON number
        assert!(value["generators"][0]["ramp_up"].is_null());
        assert_eq!(value["demand"].as_array().unwrap().len(), 3);
        assert_eq!(value["load_shedding_cost"][0], 1000.0);
    }

    #[test]
    fn test_accessors_reject_out_of_range() {
        let problem = two_unit_problem();
        let err = problem.generator(2).unwrap_err();
        assert!(err.to_string().contains("[0, 2)"));
        let err = problem.demand(3).unwrap_err();
        assert!(matches!(err, UcpError::OutOfRange { what: "period", index: 3, len: 3 }));
        assert!(problem.load_shedding_cost(5).is_err());
    }

    #[test]
    fn test_windows_are_clipped_to_horizon() {
        let problem = two_unit_problem();
        assert_eq!(problem.min_up_window_end(1, 0).unwrap(), 3);
        assert_eq!(problem.min_up_window_end(1, 2).unwrap(), 3);
        assert_eq!(problem.min_down_window_end(1, 0).unwrap(), 2);
        assert_eq!(problem.min_up_window_end(0, 1).unwrap(), 2);
    }

    #[test]
    fn test_min_output_above_max_is_rejected() {
        let result = UnitCommitmentProblem::with_uniform_shedding_cost(
            vec![Generator::new("bad").with_output_limits(80.0, 50.0)],
            vec![10.0],
            100.0,
        );
        assert!(matches!(result, Err(UcpError::Validation(_))));
    }

    #[test]
    fn test_zero_min_up_time_is_rejected() {
        let result = UnitCommitmentProblem::with_uniform_shedding_cost(
            vec![Generator::new("bad").with_output_limits(0.0, 50.0).with_min_times(0, 1)],
            vec![10.0],
            100.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mismatched_shedding_costs_rejected() {
        let result = UnitCommitmentProblem::new(
            vec![Generator::new("g").with_output_limits(0.0, 50.0)],
            vec![10.0, 20.0],
            vec![100.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unlimited_ramps_are_valid() {
        let result = UnitCommitmentProblem::with_uniform_shedding_cost(
            vec![Generator::new("g").with_output_limits(0.0, 50.0).with_ramp_rate(f64::INFINITY)],
            vec![10.0],
            100.0,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_shedding_cost() {
        let result = UnitCommitmentProblemBuilder::new()
            .generator(Generator::new("g").with_output_limits(0.0, 50.0))
            .demand([10.0])
            .build();
        assert!(result.is_err());
    }
}
