//! Benders master problem
//!
//! ## Columns
//!
//! | Block | Count | Domain | Cost |
//! |-------|-------|--------|------|
//! | `u[i][j]` | nG x nT | binary | commitment cost of `i` |
//! | `c[i][j]` | nG x nT | `[0, inf)` | 1 |
//! | `phi` | 1 | `[0, inf)` | 1 |
//!
//! ## Rows
//!
//! The permanent commitment-logic rows from
//! [`formulation`](super::formulation), followed by every injected cut in
//! insertion order.

use tracing::{debug, info};

use ucp_core::{CommitmentSchedule, UnitCommitmentProblem};

use super::cut::{Cut, CutKind};
use super::formulation::commitment_rows;
use super::BendersError;
use crate::lp::{
    self, ColId, IntegerNode, LazyConstraintHandler, LinearProgram, LpSolution, Row, RowId,
    SearchLimits, Solver,
};

/// Distance from 0 or 1 tolerated before a commitment value counts as fractional
pub const INTEGRALITY_TOLERANCE: f64 = 1e-5;

/// Column handles of the master program
#[derive(Debug, Clone)]
struct MasterColumns {
    n_generators: usize,
    n_periods: usize,
    u: Vec<ColId>,
    c: Vec<ColId>,
    phi: ColId,
}

impl MasterColumns {
    fn u(&self, i: usize, j: usize) -> ColId {
        self.u[i * self.n_periods + j]
    }

    fn c(&self, i: usize, j: usize) -> ColId {
        self.c[i * self.n_periods + j]
    }

    fn cut_row(&self, cut: &Cut, index: usize) -> Row {
        let mut terms: Vec<(ColId, f64)> = cut.terms().map(|((i, j), coef)| (self.u(i, j), coef)).collect();
        let name = match cut.kind() {
            CutKind::Feasibility => format!("feasibility_cut[{index}]"),
            CutKind::Optimality => {
                terms.push((self.phi, -1.0));
                format!("optimality_cut[{index}]")
            }
        };
        Row::less_eq(name, terms, -cut.constant())
    }

    /// Round `u` to a schedule, refusing fractional values.
    fn commitment(&self, value: impl Fn(ColId) -> f64) -> Result<CommitmentSchedule, BendersError> {
        let mut flags = Vec::with_capacity(self.u.len());
        for i in 0..self.n_generators {
            for j in 0..self.n_periods {
                let v = value(self.u(i, j));
                if v.min(1.0 - v).abs() > INTEGRALITY_TOLERANCE {
                    return Err(BendersError::FractionalCommitment {
                        generator: i,
                        period: j,
                        value: v,
                    });
                }
                flags.push(v > 0.5);
            }
        }
        Ok(CommitmentSchedule::from_flags(self.n_generators, self.n_periods, flags)?)
    }
}

/// The master's view of an integer-feasible search node.
///
/// Only handed out while the node is being inspected, so
/// [`current_commitment`](Self::current_commitment) can never observe a
/// point the search has moved past.
#[derive(Debug)]
pub struct MasterNode<'a> {
    node: &'a IntegerNode<'a>,
    columns: &'a MasterColumns,
}

impl MasterNode<'_> {
    /// Sequence number of the node within the master search
    pub fn index(&self) -> usize {
        self.node.index()
    }

    /// The node's commitment schedule.
    ///
    /// Fails with [`BendersError::FractionalCommitment`] if any `u` is not
    /// integral within [`INTEGRALITY_TOLERANCE`]; cuts derived from
    /// fractional commitments are not valid.
    pub fn current_commitment(&self) -> Result<CommitmentSchedule, BendersError> {
        self.columns.commitment(|col| self.node.value(col))
    }

    /// Value of the dispatch-cost lower bound `phi` at this node
    pub fn phi(&self) -> f64 {
        self.node.value(self.columns.phi)
    }

    /// Master objective at this node
    pub fn objective(&self) -> f64 {
        self.node.objective()
    }
}

/// Callback receiving each integer-feasible master node
pub trait CutGenerator {
    /// Return a cut to inject, or `None` to accept the node.
    fn on_integer_node(&mut self, node: &MasterNode<'_>) -> Result<Option<Cut>, BendersError>;
}

/// Counters from a completed master search
#[derive(Debug, Clone, Copy, Default)]
pub struct MasterSearchStats {
    pub integer_nodes: usize,
    pub cuts_added: usize,
}

/// Binary commitment decisions, startup costs and the dispatch-cost bound `phi`
#[derive(Debug, Clone)]
pub struct MasterProblem {
    program: LinearProgram,
    columns: MasterColumns,
    base_rows: usize,
    cuts: Vec<Cut>,
    solution: Option<LpSolution>,
}

impl MasterProblem {
    /// Build the master with its permanent commitment-logic rows.
    pub fn new(problem: &UnitCommitmentProblem) -> Self {
        let n_generators = problem.n_generators();
        let n_periods = problem.n_periods();
        let mut program = LinearProgram::new();

        let mut u = Vec::with_capacity(n_generators * n_periods);
        for (i, generator) in problem.generators().iter().enumerate() {
            for j in 0..n_periods {
                u.push(program.add_binary(format!("u[{i},{j}]"), generator.commitment_cost));
            }
        }
        let c = (0..n_generators * n_periods)
            .map(|k| {
                program.add_continuous(
                    format!("c[{},{}]", k / n_periods, k % n_periods),
                    1.0,
                    0.0,
                    f64::INFINITY,
                )
            })
            .collect();
        let phi = program.add_continuous("phi", 1.0, 0.0, f64::INFINITY);

        let columns = MasterColumns {
            n_generators,
            n_periods,
            u,
            c,
            phi,
        };

        for row in commitment_rows(problem) {
            let mut terms: Vec<(ColId, f64)> = row
                .u_terms
                .iter()
                .map(|&(t, coef)| (columns.u(row.generator, t), coef))
                .collect();
            if row.has_startup_column {
                terms.push((columns.c(row.generator, row.period), 1.0));
            }
            program.add_row(Row::greater_eq(row.name(), terms, row.lower));
        }
        let base_rows = program.num_rows();

        info!(
            generators = n_generators,
            periods = n_periods,
            columns = program.num_columns(),
            rows = base_rows,
            "built Benders master problem"
        );

        Self {
            program,
            columns,
            base_rows,
            cuts: Vec::new(),
            solution: None,
        }
    }

    /// Add a permanent global cut.
    ///
    /// Cuts are never retracted; an existing solution is discarded because
    /// it may violate the new row.
    pub fn inject_cut(&mut self, cut: Cut) -> RowId {
        let row = self.columns.cut_row(&cut, self.cuts.len());
        debug!(kind = %cut.kind(), constant = cut.constant(), "injecting cut into master");
        self.cuts.push(cut);
        self.solution = None;
        self.program.add_row(row)
    }

    /// Solve the master, handing every integer-feasible node to `generator`.
    ///
    /// Cuts returned by the generator are injected and the search resumes; the
    /// first node the generator accepts is the optimum.
    pub fn solve<S, G>(
        &mut self,
        solver: &S,
        limits: &SearchLimits,
        generator: &mut G,
    ) -> Result<MasterSearchStats, BendersError>
    where
        S: Solver + ?Sized,
        G: CutGenerator + ?Sized,
    {
        self.solution = None;
        let mut hook = NodeHook {
            columns: &self.columns,
            cuts: &mut self.cuts,
            generator,
        };
        let outcome = lp::solve_with_lazy_constraints(solver, &mut self.program, limits, &mut hook)?;
        self.solution = Some(outcome.solution);
        Ok(MasterSearchStats {
            integer_nodes: outcome.integer_nodes,
            cuts_added: outcome.rows_added,
        })
    }

    /// Master objective after [`solve`](Self::solve): a lower bound on the
    /// total cost, tight at the accepted node.
    pub fn objective_value(&self) -> Result<f64, BendersError> {
        self.solution
            .as_ref()
            .map(LpSolution::objective)
            .ok_or(BendersError::NotSolved)
    }

    /// Accepted commitment after [`solve`](Self::solve)
    pub fn commitment(&self) -> Result<CommitmentSchedule, BendersError> {
        let solution = self.solution.as_ref().ok_or(BendersError::NotSolved)?;
        self.columns.commitment(|col| solution.value(col))
    }

    /// `phi` after [`solve`](Self::solve)
    pub fn phi(&self) -> Result<f64, BendersError> {
        self.solution
            .as_ref()
            .map(|s| s.value(self.columns.phi))
            .ok_or(BendersError::NotSolved)
    }

    /// Cuts injected so far, in insertion order
    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    /// Number of permanent (non-cut) rows
    pub fn num_base_rows(&self) -> usize {
        self.base_rows
    }

    pub fn program(&self) -> &LinearProgram {
        &self.program
    }
}

/// Binds a [`CutGenerator`] to the lazy-constraint search
struct NodeHook<'a, G: ?Sized> {
    columns: &'a MasterColumns,
    cuts: &'a mut Vec<Cut>,
    generator: &'a mut G,
}

impl<G: CutGenerator + ?Sized> LazyConstraintHandler for NodeHook<'_, G> {
    type Error = BendersError;

    fn on_integer_node(&mut self, node: &IntegerNode<'_>) -> Result<Vec<Row>, BendersError> {
        let view = MasterNode {
            node,
            columns: self.columns,
        };
        match self.generator.on_integer_node(&view)? {
            None => Ok(Vec::new()),
            Some(cut) => {
                let row = self.columns.cut_row(&cut, self.cuts.len());
                self.cuts.push(cut);
                Ok(vec![row])
            }
        }
    }
}
