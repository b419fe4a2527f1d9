//! Economic-dispatch subproblem for a fixed commitment
//!
//! ## Formulation
//!
//! Columns (all `[0, inf)`): output `p[i][j]`, load shed `l[j]` and, in the
//! feasibility variant, one violation column per inequality row.
//!
//! | Row | Form | Dual |
//! |-----|------|------|
//! | balance `j` | `sum_i p[i][j] + l[j] = d[j]` | free |
//! | min output `(i,j)` | `p[i][j] (+ s) >= U[i][j] * min[i]` | `>= 0` |
//! | max output `(i,j)` | `p[i][j] (- s) <= U[i][j] * max[i]` | `<= 0` |
//! | ramp up `(i,j>0)` | `p[i][j] - p[i][j-1] (- s) <= rampUp[i]` | `<= 0` |
//! | ramp down `(i,j>0)` | `p[i][j-1] - p[i][j] (- s) <= rampDown[i]` | `<= 0` |
//!
//! Ramp rows are omitted for unlimited (infinite) ramps.
//!
//! Since every column is bounded only below by zero, strong duality gives
//! `objective = sum(row dual * row rhs)`. The `U`-independent part of that sum
//! is the cut constant; the remainder, `(y_min * min[i] + y_max * max[i]) * U[i][j]`,
//! yields the cut coefficients.

use serde::Serialize;
use tracing::trace;

use ucp_core::{CommitmentSchedule, UcpError, UnitCommitmentProblem};

use super::cut::{Cut, CutKind};
use super::BendersError;
use crate::lp::{ColId, LinearProgram, Row, RowId, Solver, SolverError};

/// Which objective the subproblem minimizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubproblemVariant {
    /// Total violation of the output and ramp rows
    Feasibility,
    /// Production plus load-shedding cost
    Optimality,
}

impl SubproblemVariant {
    fn cut_kind(self) -> CutKind {
        match self {
            SubproblemVariant::Feasibility => CutKind::Feasibility,
            SubproblemVariant::Optimality => CutKind::Optimality,
        }
    }
}

/// Row dual prices of a solved subproblem, row-major `(i, j)` where indexed
/// by generator. Ramp duals are zero where no ramp row exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchDuals {
    pub balance: Vec<f64>,
    pub min_output: Vec<f64>,
    pub max_output: Vec<f64>,
    pub ramp_up: Vec<f64>,
    pub ramp_down: Vec<f64>,
}

/// Primal and dual solution of a dispatch subproblem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSolution {
    n_generators: usize,
    n_periods: usize,
    objective: f64,
    output: Vec<f64>,
    load_shed: Vec<f64>,
    duals: DispatchDuals,
}

impl DispatchSolution {
    /// Optimal subproblem objective
    pub fn objective(&self) -> f64 {
        self.objective
    }

    fn check_generator(&self, i: usize) -> Result<(), BendersError> {
        if i >= self.n_generators {
            return Err(UcpError::OutOfRange { what: "generator", index: i, len: self.n_generators }.into());
        }
        Ok(())
    }

    fn check_period(&self, j: usize) -> Result<(), BendersError> {
        if j >= self.n_periods {
            return Err(UcpError::OutOfRange { what: "period", index: j, len: self.n_periods }.into());
        }
        Ok(())
    }

    /// Output of generator `i` in period `j` (MW)
    pub fn output(&self, i: usize, j: usize) -> Result<f64, BendersError> {
        self.check_generator(i)?;
        self.check_period(j)?;
        Ok(self.output[i * self.n_periods + j])
    }

    /// Load shed in period `j` (MW)
    pub fn load_shed(&self, j: usize) -> Result<f64, BendersError> {
        self.check_period(j)?;
        Ok(self.load_shed[j])
    }

    pub fn load_shed_profile(&self) -> &[f64] {
        &self.load_shed
    }

    /// Output of generator `i` across periods
    pub fn output_profile(&self, i: usize) -> Result<&[f64], BendersError> {
        self.check_generator(i)?;
        Ok(&self.output[i * self.n_periods..(i + 1) * self.n_periods])
    }

    pub fn duals(&self) -> &DispatchDuals {
        &self.duals
    }

    pub fn n_generators(&self) -> usize {
        self.n_generators
    }

    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// `sum marginalCost * p`
    pub fn production_cost(&self, problem: &UnitCommitmentProblem) -> f64 {
        problem
            .generators()
            .iter()
            .enumerate()
            .zip(self.output.chunks(self.n_periods))
            .map(|(g, profile)| g.marginal_cost * profile.iter().sum::<f64>())
            .sum()
    }

    /// `sum loadSheddingCost * l`
    pub fn shedding_cost(&self, problem: &UnitCommitmentProblem) -> f64 {
        problem
            .load_shedding_costs()
            .iter()
            .zip(&self.load_shed)
            .map(|(cost, shed)| cost * shed)
            .sum()
    }
}

/// Row handles of the dispatch program
#[derive(Debug, Clone)]
struct DispatchRows {
    balance: Vec<RowId>,
    min_output: Vec<RowId>,
    max_output: Vec<RowId>,
    ramp_up: Vec<Option<RowId>>,
    ramp_down: Vec<Option<RowId>>,
}

/// Dispatch LP for one fixed [`CommitmentSchedule`].
///
/// Built, solved and discarded once per master node.
#[derive(Debug, Clone)]
pub struct DispatchSubproblem<'a> {
    problem: &'a UnitCommitmentProblem,
    variant: SubproblemVariant,
    program: LinearProgram,
    output: Vec<ColId>,
    load_shed: Vec<ColId>,
    rows: DispatchRows,
    solution: Option<DispatchSolution>,
}

impl<'a> DispatchSubproblem<'a> {
    /// Minimize total violation of output and ramp limits under `schedule`.
    pub fn feasibility(
        problem: &'a UnitCommitmentProblem,
        schedule: &CommitmentSchedule,
    ) -> Result<Self, BendersError> {
        Self::build(problem, schedule, SubproblemVariant::Feasibility)
    }

    /// Minimize production plus shedding cost under `schedule`.
    pub fn optimality(
        problem: &'a UnitCommitmentProblem,
        schedule: &CommitmentSchedule,
    ) -> Result<Self, BendersError> {
        Self::build(problem, schedule, SubproblemVariant::Optimality)
    }

    fn build(
        problem: &'a UnitCommitmentProblem,
        schedule: &CommitmentSchedule,
        variant: SubproblemVariant,
    ) -> Result<Self, BendersError> {
        let n_generators = problem.n_generators();
        let n_periods = problem.n_periods();
        if schedule.n_generators() != n_generators || schedule.n_periods() != n_periods {
            return Err(BendersError::ScheduleShape {
                expected: (n_generators, n_periods),
                actual: (schedule.n_generators(), schedule.n_periods()),
            });
        }

        let feasibility = variant == SubproblemVariant::Feasibility;
        let mut program = LinearProgram::new();
        let mut output = Vec::with_capacity(n_generators * n_periods);
        for (i, generator) in problem.generators().iter().enumerate() {
            let cost = if feasibility { 0.0 } else { generator.marginal_cost };
            for j in 0..n_periods {
                output.push(program.add_continuous(format!("p[{i},{j}]"), cost, 0.0, f64::INFINITY));
            }
        }
        let load_shed: Vec<ColId> = problem
            .load_shedding_costs()
            .iter()
            .enumerate()
            .map(|(j, &cost)| {
                let cost = if feasibility { 0.0 } else { cost };
                program.add_continuous(format!("l[{j}]"), cost, 0.0, f64::INFINITY)
            })
            .collect();

        // Relaxing slack: sign +1 loosens a `>=` row, -1 a `<=` row.
        let relax = |program: &mut LinearProgram, name: &str, mut terms: Vec<(ColId, f64)>, sign: f64| {
            if feasibility {
                let slack = program.add_continuous(format!("s_{name}"), 1.0, 0.0, f64::INFINITY);
                terms.push((slack, sign));
            }
            terms
        };

        let balance = problem
            .demands()
            .iter()
            .enumerate()
            .map(|(j, &demand)| {
                let mut terms: Vec<(ColId, f64)> =
                    (0..n_generators).map(|i| (output[i * n_periods + j], 1.0)).collect();
                terms.push((load_shed[j], 1.0));
                program.add_row(Row::equal(format!("balance[{j}]"), terms, demand))
            })
            .collect();

        let mut min_output = Vec::with_capacity(n_generators * n_periods);
        let mut max_output = Vec::with_capacity(n_generators * n_periods);
        let mut ramp_up = Vec::with_capacity(n_generators * n_periods);
        let mut ramp_down = Vec::with_capacity(n_generators * n_periods);
        for (i, generator) in problem.generators().iter().enumerate() {
            for j in 0..n_periods {
                let p = output[i * n_periods + j];
                let on = schedule.value(i, j);

                let name = format!("min[{i},{j}]");
                let terms = relax(&mut program, &name, vec![(p, 1.0)], 1.0);
                min_output.push(program.add_row(Row::greater_eq(name, terms, on * generator.min_output)));

                let name = format!("max[{i},{j}]");
                let terms = relax(&mut program, &name, vec![(p, 1.0)], -1.0);
                max_output.push(program.add_row(Row::less_eq(name, terms, on * generator.max_output)));

                if j == 0 {
                    ramp_up.push(None);
                    ramp_down.push(None);
                    continue;
                }
                let prev = output[i * n_periods + j - 1];
                ramp_up.push(generator.ramp_up.is_finite().then(|| {
                    let name = format!("ramp_up[{i},{j}]");
                    let terms = relax(&mut program, &name, vec![(p, 1.0), (prev, -1.0)], -1.0);
                    program.add_row(Row::less_eq(name, terms, generator.ramp_up))
                }));
                ramp_down.push(generator.ramp_down.is_finite().then(|| {
                    let name = format!("ramp_down[{i},{j}]");
                    let terms = relax(&mut program, &name, vec![(prev, 1.0), (p, -1.0)], -1.0);
                    program.add_row(Row::less_eq(name, terms, generator.ramp_down))
                }));
            }
        }

        Ok(Self {
            problem,
            variant,
            program,
            output,
            load_shed,
            rows: DispatchRows {
                balance,
                min_output,
                max_output,
                ramp_up,
                ramp_down,
            },
            solution: None,
        })
    }

    pub fn variant(&self) -> SubproblemVariant {
        self.variant
    }

    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    /// Solve the LP and extract primal values and row duals.
    ///
    /// An exhausted time budget surfaces as [`BendersError::TimeLimit`]. Any
    /// other solver failure is fatal: both variants are feasible for every
    /// schedule, so infeasibility here signals a numerical breakdown.
    pub fn solve<S: Solver + ?Sized>(&mut self, solver: &S) -> Result<&DispatchSolution, BendersError> {
        let lp = solver.solve(&self.program).map_err(|err| match err {
            SolverError::TimeLimit { seconds } => BendersError::TimeLimit(seconds),
            other => BendersError::Solver(other),
        })?;
        if !lp.has_duals() {
            return Err(BendersError::Solver(SolverError::Failed(format!(
                "{} returned no row duals for the dispatch LP",
                solver.name()
            ))));
        }
        let dual = |row: &RowId| lp.dual(*row).unwrap_or(0.0);
        let optional_dual = |row: &Option<RowId>| row.as_ref().map_or(0.0, dual);

        let duals = DispatchDuals {
            balance: self.rows.balance.iter().map(dual).collect(),
            min_output: self.rows.min_output.iter().map(dual).collect(),
            max_output: self.rows.max_output.iter().map(dual).collect(),
            ramp_up: self.rows.ramp_up.iter().map(optional_dual).collect(),
            ramp_down: self.rows.ramp_down.iter().map(optional_dual).collect(),
        };

        let solution = DispatchSolution {
            n_generators: self.problem.n_generators(),
            n_periods: self.problem.n_periods(),
            objective: lp.objective(),
            output: self.output.iter().map(|&c| lp.value(c).max(0.0)).collect(),
            load_shed: self.load_shed.iter().map(|&c| lp.value(c).max(0.0)).collect(),
            duals,
        };
        trace!(
            variant = ?self.variant,
            objective = solution.objective,
            "solved dispatch subproblem"
        );
        Ok(self.solution.insert(solution))
    }

    /// The solved dispatch, or [`BendersError::NotSolved`]
    pub fn dispatch(&self) -> Result<&DispatchSolution, BendersError> {
        self.solution.as_ref().ok_or(BendersError::NotSolved)
    }

    pub fn objective(&self) -> Result<f64, BendersError> {
        Ok(self.dispatch()?.objective)
    }

    /// `sum_j y_bal[j]*d[j] + sum y_ru*rampUp + sum y_rd*rampDown`
    pub fn cut_constant(&self) -> Result<f64, BendersError> {
        let duals = &self.dispatch()?.duals;
        let n_periods = self.problem.n_periods();
        let balance: f64 = duals
            .balance
            .iter()
            .zip(self.problem.demands())
            .map(|(y, d)| y * d)
            .sum();
        let ramps: f64 = self
            .problem
            .generators()
            .iter()
            .enumerate()
            .flat_map(|(i, g)| {
                (1..n_periods).map(move |j| {
                    let k = i * n_periods + j;
                    let up = if g.ramp_up.is_finite() { duals.ramp_up[k] * g.ramp_up } else { 0.0 };
                    let down = if g.ramp_down.is_finite() { duals.ramp_down[k] * g.ramp_down } else { 0.0 };
                    up + down
                })
            })
            .sum();
        Ok(balance + ramps)
    }

    /// `y_min[i][j]*min[i] + y_max[i][j]*max[i]`, row-major
    pub fn cut_coefficients(&self) -> Result<Vec<f64>, BendersError> {
        let duals = &self.dispatch()?.duals;
        let n_periods = self.problem.n_periods();
        Ok((0..duals.min_output.len())
            .map(|k| {
                let g = &self.problem.generators()[k / n_periods];
                duals.min_output[k] * g.min_output + duals.max_output[k] * g.max_output
            })
            .collect())
    }

    /// The Benders cut implied by this subproblem's duals
    pub fn cut(&self) -> Result<Cut, BendersError> {
        Ok(Cut::new(
            self.variant.cut_kind(),
            self.cut_constant()?,
            self.problem.n_periods(),
            self.cut_coefficients()?,
        ))
    }

    /// Consume the subproblem, keeping only the solved dispatch
    pub fn into_dispatch(self) -> Result<DispatchSolution, BendersError> {
        self.solution.ok_or(BendersError::NotSolved)
    }
}
