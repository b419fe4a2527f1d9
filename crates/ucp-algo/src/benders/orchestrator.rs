//! Cut-generation loop run at every integer-feasible master node
//!
//! ## State machine
//!
//! ```text
//! AwaitingIntegerNode -> CheckingFeasibility -+-> InjectingFeasibilityCut ---------> AwaitingIntegerNode
//!                                             +-> CheckingOptimality -+-> InjectingOptimalityCut -> AwaitingIntegerNode
//!                                                                     +-> NodeAccepted ----------> AwaitingIntegerNode
//! ```
//!
//! The decision for one node is the pure function [`evaluate_node`]; the
//! [`BendersOrchestrator`] binds it to the master's node hook, tracks the
//! state, keeps statistics and records accepted nodes in an
//! [`IncumbentRegistry`].

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, trace, warn};

use ucp_core::{CommitmentSchedule, UnitCommitmentProblem};

use super::cut::Cut;
use super::master::{CutGenerator, MasterNode};
use super::subproblem::{DispatchSolution, DispatchSubproblem};
use super::BendersError;
use crate::lp::Solver;

/// Thresholds of the feasibility and optimality tests
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerances {
    /// Feasibility objectives at or above this value trigger a feasibility cut
    pub feasibility: f64,
    /// A node is accepted when `phi >= dispatch cost - optimality`
    pub optimality: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            feasibility: 1e-9,
            optimality: 1e-9,
        }
    }
}

/// Orchestrator state between and during node evaluations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrchestratorState {
    AwaitingIntegerNode,
    CheckingFeasibility,
    InjectingFeasibilityCut,
    CheckingOptimality,
    InjectingOptimalityCut,
    NodeAccepted,
}

impl OrchestratorState {
    /// Whether `self -> next` is an edge of the state machine
    pub fn can_transition_to(self, next: OrchestratorState) -> bool {
        use OrchestratorState::*;
        matches!(
            (self, next),
            (AwaitingIntegerNode, CheckingFeasibility)
                | (CheckingFeasibility, InjectingFeasibilityCut)
                | (CheckingFeasibility, CheckingOptimality)
                | (CheckingOptimality, InjectingOptimalityCut)
                | (CheckingOptimality, NodeAccepted)
                | (InjectingFeasibilityCut, AwaitingIntegerNode)
                | (InjectingOptimalityCut, AwaitingIntegerNode)
                | (NodeAccepted, AwaitingIntegerNode)
        )
    }
}

/// A commitment whose dispatch has been solved to optimality
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub schedule: CommitmentSchedule,
    pub dispatch: DispatchSolution,
    /// Master lower bound on the dispatch cost at this node
    pub phi: f64,
}

impl Candidate {
    /// Production plus shedding cost of the dispatch
    pub fn dispatch_cost(&self) -> f64 {
        self.dispatch.objective()
    }

    /// Commitment, startup and dispatch cost of the candidate
    pub fn total_cost(&self, problem: &UnitCommitmentProblem) -> f64 {
        commitment_and_startup_cost(problem, &self.schedule) + self.dispatch_cost()
    }
}

/// `sum commitmentCost * u + sum startupCost * startups`
pub fn commitment_and_startup_cost(problem: &UnitCommitmentProblem, schedule: &CommitmentSchedule) -> f64 {
    problem
        .generators()
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let online = schedule.row(i).iter().filter(|&&on| on).count() as f64;
            g.commitment_cost * online + g.startup_cost * schedule.startups(i) as f64
        })
        .sum()
}

/// Decision for one integer node
#[derive(Debug, Clone)]
pub enum NodeOutcome {
    /// The schedule has no dispatch within output and ramp limits
    FeasibilityCut { cut: Cut, violation: f64 },
    /// `phi` underestimates the dispatch cost of the schedule
    OptimalityCut { cut: Cut, candidate: Candidate },
    /// `phi` already covers the dispatch cost
    Accepted(Candidate),
}

/// Run the feasibility and optimality tests for one commitment.
///
/// Stateless: depends only on the instance, the schedule, the node's `phi`
/// and the tolerances.
pub fn evaluate_node<S: Solver + ?Sized>(
    problem: &UnitCommitmentProblem,
    solver: &S,
    schedule: &CommitmentSchedule,
    phi: f64,
    tolerances: &Tolerances,
) -> Result<NodeOutcome, BendersError> {
    let mut feasibility = DispatchSubproblem::feasibility(problem, schedule)?;
    let violation = feasibility.solve(solver)?.objective();
    if violation >= tolerances.feasibility {
        return Ok(NodeOutcome::FeasibilityCut {
            cut: feasibility.cut()?,
            violation,
        });
    }

    let mut optimality = DispatchSubproblem::optimality(problem, schedule)?;
    let cost = optimality.solve(solver)?.objective();
    if phi >= cost - tolerances.optimality {
        return Ok(NodeOutcome::Accepted(Candidate {
            schedule: schedule.clone(),
            dispatch: optimality.into_dispatch()?,
            phi,
        }));
    }
    let cut = optimality.cut()?;
    Ok(NodeOutcome::OptimalityCut {
        cut,
        candidate: Candidate {
            schedule: schedule.clone(),
            dispatch: optimality.into_dispatch()?,
            phi,
        },
    })
}

/// Best accepted node seen so far.
///
/// Written only on the `NodeAccepted` transition.
#[derive(Debug, Clone, Default)]
pub struct IncumbentRegistry {
    best: Option<(f64, Candidate)>,
    accepted: usize,
}

impl IncumbentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted candidate; returns whether it became the incumbent.
    pub fn record(&mut self, problem: &UnitCommitmentProblem, candidate: Candidate) -> bool {
        self.accepted += 1;
        let cost = candidate.total_cost(problem);
        match &self.best {
            Some((best, _)) if *best <= cost => false,
            _ => {
                self.best = Some((cost, candidate));
                true
            }
        }
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref().map(|(_, candidate)| candidate)
    }

    pub fn best_cost(&self) -> Option<f64> {
        self.best.as_ref().map(|(cost, _)| *cost)
    }

    pub fn into_best(self) -> Option<Candidate> {
        self.best.map(|(_, candidate)| candidate)
    }

    /// Number of accepted nodes
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

/// Counters of the decomposition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BendersStats {
    /// Integer-feasible master nodes evaluated
    pub integer_nodes: usize,
    pub feasibility_cuts: usize,
    pub optimality_cuts: usize,
    /// Feasibility subproblems solved
    pub feasibility_solves: usize,
    /// Optimality subproblems solved
    pub optimality_solves: usize,
    /// Nodes accepted through the repeated-cut guard
    pub stalled_acceptances: usize,
}

impl BendersStats {
    pub fn total_cuts(&self) -> usize {
        self.feasibility_cuts + self.optimality_cuts
    }
}

/// Cut generator bound to a master search
pub struct BendersOrchestrator<'a, S: ?Sized> {
    problem: &'a UnitCommitmentProblem,
    solver: &'a S,
    tolerances: Tolerances,
    state: OrchestratorState,
    registry: IncumbentRegistry,
    stats: BendersStats,
    feasibility_cut_schedules: HashSet<CommitmentSchedule>,
    optimality_cut_schedules: HashSet<CommitmentSchedule>,
}

impl<'a, S: Solver + ?Sized> BendersOrchestrator<'a, S> {
    pub fn new(problem: &'a UnitCommitmentProblem, solver: &'a S, tolerances: Tolerances) -> Self {
        Self {
            problem,
            solver,
            tolerances,
            state: OrchestratorState::AwaitingIntegerNode,
            registry: IncumbentRegistry::new(),
            stats: BendersStats::default(),
            feasibility_cut_schedules: HashSet::new(),
            optimality_cut_schedules: HashSet::new(),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn stats(&self) -> &BendersStats {
        &self.stats
    }

    pub fn registry(&self) -> &IncumbentRegistry {
        &self.registry
    }

    pub fn into_parts(self) -> (IncumbentRegistry, BendersStats) {
        (self.registry, self.stats)
    }

    fn transition(&mut self, next: OrchestratorState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid orchestrator transition {:?} -> {next:?}",
            self.state
        );
        trace!(from = ?self.state, to = ?next, "orchestrator transition");
        self.state = next;
    }

    fn accept(&mut self, candidate: Candidate) {
        self.transition(OrchestratorState::NodeAccepted);
        let improved = self.registry.record(self.problem, candidate);
        debug!(improved, "integer node accepted");
        self.transition(OrchestratorState::AwaitingIntegerNode);
    }

    /// Evaluate one commitment and advance the state machine.
    ///
    /// Returns the cut to inject, or `None` when the node is accepted.
    pub fn process(&mut self, schedule: CommitmentSchedule, phi: f64) -> Result<Option<Cut>, BendersError> {
        self.stats.integer_nodes += 1;
        self.transition(OrchestratorState::CheckingFeasibility);
        self.stats.feasibility_solves += 1;

        let outcome = evaluate_node(self.problem, self.solver, &schedule, phi, &self.tolerances);
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state = OrchestratorState::AwaitingIntegerNode;
                return Err(err);
            }
        };

        match outcome {
            NodeOutcome::FeasibilityCut { cut, violation } => {
                if !self.feasibility_cut_schedules.insert(schedule) {
                    self.state = OrchestratorState::AwaitingIntegerNode;
                    return Err(BendersError::Stalled {
                        node: self.stats.integer_nodes,
                        violation,
                    });
                }
                self.transition(OrchestratorState::InjectingFeasibilityCut);
                self.stats.feasibility_cuts += 1;
                debug!(
                    node = self.stats.integer_nodes,
                    violation,
                    "schedule infeasible, adding feasibility cut"
                );
                self.transition(OrchestratorState::AwaitingIntegerNode);
                Ok(Some(cut))
            }
            NodeOutcome::Accepted(candidate) => {
                self.stats.optimality_solves += 1;
                self.transition(OrchestratorState::CheckingOptimality);
                debug!(
                    node = self.stats.integer_nodes,
                    phi,
                    dispatch_cost = candidate.dispatch_cost(),
                    "optimality test passed"
                );
                self.accept(candidate);
                Ok(None)
            }
            NodeOutcome::OptimalityCut { cut, candidate } => {
                self.stats.optimality_solves += 1;
                self.transition(OrchestratorState::CheckingOptimality);
                if !self.optimality_cut_schedules.insert(candidate.schedule.clone()) {
                    // The earlier cut already binds phi at this schedule; the
                    // gap is solver tolerance.
                    warn!(
                        node = self.stats.integer_nodes,
                        phi,
                        dispatch_cost = candidate.dispatch_cost(),
                        "optimality cut repeated for the same schedule, accepting node"
                    );
                    self.stats.stalled_acceptances += 1;
                    self.accept(candidate);
                    return Ok(None);
                }
                self.transition(OrchestratorState::InjectingOptimalityCut);
                self.stats.optimality_cuts += 1;
                debug!(
                    node = self.stats.integer_nodes,
                    phi,
                    dispatch_cost = candidate.dispatch_cost(),
                    "phi below dispatch cost, adding optimality cut"
                );
                self.transition(OrchestratorState::AwaitingIntegerNode);
                Ok(Some(cut))
            }
        }
    }
}

impl<S: Solver + ?Sized> CutGenerator for BendersOrchestrator<'_, S> {
    fn on_integer_node(&mut self, node: &MasterNode<'_>) -> Result<Option<Cut>, BendersError> {
        let schedule = node.current_commitment()?;
        self.process(schedule, node.phi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::HighsSolver;
    use ucp_core::Generator;

    fn problem() -> UnitCommitmentProblem {
        UnitCommitmentProblem::with_uniform_shedding_cost(
            vec![
                Generator::new("A").with_output_limits(0.0, 60.0).with_costs(0.0, 0.0, 10.0),
                Generator::new("B").with_output_limits(50.0, 60.0).with_costs(0.0, 0.0, 20.0),
            ],
            vec![100.0, 40.0],
            1000.0,
        )
        .unwrap()
    }

    #[test]
    fn test_state_machine_edges() {
        use OrchestratorState::*;
        assert!(AwaitingIntegerNode.can_transition_to(CheckingFeasibility));
        assert!(CheckingOptimality.can_transition_to(NodeAccepted));
        assert!(!AwaitingIntegerNode.can_transition_to(NodeAccepted));
        assert!(!CheckingFeasibility.can_transition_to(InjectingOptimalityCut));
    }

    #[test]
    fn test_over_commitment_yields_feasibility_cut() {
        let problem = problem();
        let solver = HighsSolver::default();
        // B's minimum of 50 exceeds the second period's demand of 40
        let schedule = CommitmentSchedule::from_rows(vec![vec![true, true], vec![true, true]]).unwrap();
        let outcome = evaluate_node(&problem, &solver, &schedule, 0.0, &Tolerances::default()).unwrap();
        match outcome {
            NodeOutcome::FeasibilityCut { cut, violation } => {
                assert!((violation - 10.0).abs() < 1e-6);
                assert!(cut.evaluate(&schedule) > 1e-6);
                // switching B off in period 1 satisfies the cut
                let fixed =
                    CommitmentSchedule::from_rows(vec![vec![true, true], vec![true, false]]).unwrap();
                assert!(cut.evaluate(&fixed) <= 1e-6);
            }
            other => panic!("expected feasibility cut, got {other:?}"),
        }
    }

    #[test]
    fn test_low_phi_yields_optimality_cut_then_acceptance() {
        let problem = problem();
        let solver = HighsSolver::default();
        let schedule = CommitmentSchedule::from_rows(vec![vec![true, true], vec![true, false]]).unwrap();
        let mut orchestrator = BendersOrchestrator::new(&problem, &solver, Tolerances::default());

        let cut = orchestrator.process(schedule.clone(), 0.0).unwrap().unwrap();
        // period 0: A 50, B 50; period 1: A 40
        let cost = 50.0 * 10.0 + 50.0 * 20.0 + 40.0 * 10.0;
        assert!((cut.evaluate(&schedule) - cost).abs() < 1e-6);
        assert_eq!(orchestrator.state(), OrchestratorState::AwaitingIntegerNode);
        assert!(orchestrator.registry().best().is_none());

        assert!(orchestrator.process(schedule.clone(), cost + 1e-3).unwrap().is_none());
        let stats = *orchestrator.stats();
        assert_eq!(stats.integer_nodes, 2);
        assert_eq!(stats.optimality_cuts, 1);
        assert_eq!(stats.feasibility_cuts, 0);
        let best = orchestrator.registry().best().unwrap();
        assert_eq!(best.schedule, schedule);
        assert!((orchestrator.registry().best_cost().unwrap() - cost).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_feasibility_cut_stalls() {
        let problem = problem();
        let solver = HighsSolver::default();
        let schedule = CommitmentSchedule::all_on(2, 2);
        let mut orchestrator = BendersOrchestrator::new(&problem, &solver, Tolerances::default());
        assert!(orchestrator.process(schedule.clone(), 0.0).unwrap().is_some());
        let err = orchestrator.process(schedule, 0.0).unwrap_err();
        assert!(matches!(err, BendersError::Stalled { .. }));
    }

    #[test]
    fn test_repeated_optimality_cut_accepts() {
        let problem = problem();
        let solver = HighsSolver::default();
        let schedule = CommitmentSchedule::from_rows(vec![vec![true, true], vec![false, false]]).unwrap();
        let mut orchestrator = BendersOrchestrator::new(&problem, &solver, Tolerances::default());
        assert!(orchestrator.process(schedule.clone(), 0.0).unwrap().is_some());
        assert!(orchestrator.process(schedule, 0.0).unwrap().is_none());
        assert_eq!(orchestrator.stats().stalled_acceptances, 1);
        assert_eq!(orchestrator.registry().accepted(), 1);
    }

    #[test]
    fn test_registry_keeps_cheapest() {
        let problem = problem();
        let solver = HighsSolver::default();
        let mut registry = IncumbentRegistry::new();
        for (rows, phi) in [
            (vec![vec![true, true], vec![false, false]], 0.0),
            (vec![vec![true, true], vec![true, false]], 0.0),
        ] {
            let schedule = CommitmentSchedule::from_rows(rows).unwrap();
            let mut osp = DispatchSubproblem::optimality(&problem, &schedule).unwrap();
            osp.solve(&solver).unwrap();
            registry.record(
                &problem,
                Candidate {
                    schedule,
                    dispatch: osp.into_dispatch().unwrap(),
                    phi,
                },
            );
        }
        assert_eq!(registry.accepted(), 2);
        // A alone sheds 40 MW at 1000 in period 0
        let best = registry.best().unwrap();
        assert!(best.schedule.is_on(1, 0));
    }
}
