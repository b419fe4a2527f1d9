//! Dispatch subproblem tests: feasibility test, duals and cut recovery

use ucp_algo::benders::{CutKind, DispatchSubproblem};
use ucp_algo::lp::HighsSolver;
use ucp_core::{CommitmentSchedule, Generator, UnitCommitmentProblem};

/// Three units with output floors and ramp limits
/// base: 20-80 MW @ $10, ramp 40
/// mid:  10-50 MW @ $20, ramp 30
/// peak:  0-30 MW @ $40, unlimited ramp
fn three_unit_problem(demand: Vec<f64>) -> UnitCommitmentProblem {
    UnitCommitmentProblem::with_uniform_shedding_cost(
        vec![
            Generator::new("base")
                .with_output_limits(20.0, 80.0)
                .with_costs(50.0, 100.0, 10.0)
                .with_ramp_rate(40.0),
            Generator::new("mid")
                .with_output_limits(10.0, 50.0)
                .with_costs(20.0, 40.0, 20.0)
                .with_ramp_rate(30.0),
            Generator::new("peak")
                .with_output_limits(0.0, 30.0)
                .with_costs(5.0, 10.0, 40.0),
        ],
        demand,
        200.0,
    )
    .unwrap()
}

fn schedule(rows: &[&[u8]]) -> CommitmentSchedule {
    CommitmentSchedule::from_rows(rows.iter().map(|r| r.iter().map(|&f| f == 1).collect()).collect())
        .unwrap()
}

fn sample_schedules() -> Vec<CommitmentSchedule> {
    vec![
        CommitmentSchedule::all_on(3, 4),
        CommitmentSchedule::all_off(3, 4),
        schedule(&[&[1, 1, 1, 1], &[0, 1, 1, 0], &[0, 0, 1, 0]]),
        schedule(&[&[0, 1, 1, 1], &[1, 1, 0, 0], &[1, 0, 1, 1]]),
        schedule(&[&[1, 0, 1, 0], &[0, 0, 0, 1], &[1, 1, 1, 1]]),
    ]
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0),
        "{what}: expected {expected}, got {actual}"
    );
}

#[test]
fn test_all_on_with_spare_capacity_is_feasible() {
    let problem = three_unit_problem(vec![60.0, 90.0, 120.0, 100.0]);
    assert!(problem.installed_capacity() > problem.peak_demand());
    let mut fsp = DispatchSubproblem::feasibility(&problem, &CommitmentSchedule::all_on(3, 4)).unwrap();
    let objective = fsp.solve(&HighsSolver::default()).unwrap().objective();
    assert!(objective.abs() < 1e-9, "feasibility objective {objective}");
}

#[test]
fn test_over_commitment_has_positive_violation() {
    // the base unit alone must produce 20 MW while only 15 MW are demanded
    let problem = three_unit_problem(vec![15.0, 90.0, 120.0, 100.0]);
    let mut fsp = DispatchSubproblem::feasibility(&problem, &CommitmentSchedule::all_on(3, 4)).unwrap();
    let objective = fsp.solve(&HighsSolver::default()).unwrap().objective();
    // base 20 + mid 10 against demand 15
    assert_close(objective, 15.0, "over-commitment violation");
}

#[test]
fn test_ramp_conflict_has_positive_violation() {
    let slow_start = UnitCommitmentProblem::with_uniform_shedding_cost(
        vec![Generator::new("slow")
            .with_output_limits(20.0, 80.0)
            .with_costs(50.0, 100.0, 10.0)
            .with_ramp_rate(5.0)],
        vec![60.0; 4],
        200.0,
    )
    .unwrap();
    let u = schedule(&[&[0, 1, 1, 1]]);
    let mut fsp = DispatchSubproblem::feasibility(&slow_start, &u).unwrap();
    let objective = fsp.solve(&HighsSolver::default()).unwrap().objective();
    // must reach 20 MW from 0 with a 5 MW ramp: 15 MW of violation
    assert_close(objective, 15.0, "ramp conflict violation");
}

#[test]
fn test_optimality_objective_matches_cut_at_same_schedule() {
    let problem = three_unit_problem(vec![60.0, 90.0, 120.0, 100.0]);
    let solver = HighsSolver::default();
    for u in sample_schedules() {
        let mut osp = DispatchSubproblem::optimality(&problem, &u).unwrap();
        let objective = osp.solve(&solver).unwrap().objective();
        let coefficients = osp.cut_coefficients().unwrap();
        let recovered = osp.cut_constant().unwrap()
            + coefficients
                .iter()
                .enumerate()
                .filter(|(k, _)| u.is_on(k / 4, k % 4))
                .map(|(_, c)| c)
                .sum::<f64>();
        assert_close(recovered, objective, "strong duality");

        let cut = osp.cut().unwrap();
        assert_eq!(cut.kind(), CutKind::Optimality);
        assert_close(cut.evaluate(&u), objective, "cut evaluation");
    }
}

#[test]
fn test_feasibility_objective_matches_cut_at_same_schedule() {
    let problem = three_unit_problem(vec![15.0, 90.0, 120.0, 30.0]);
    let solver = HighsSolver::default();
    for u in sample_schedules() {
        let mut fsp = DispatchSubproblem::feasibility(&problem, &u).unwrap();
        let objective = fsp.solve(&solver).unwrap().objective();
        let cut = fsp.cut().unwrap();
        assert_eq!(cut.kind(), CutKind::Feasibility);
        assert_close(cut.evaluate(&u), objective, "feasibility strong duality");
    }
}

#[test]
fn test_cuts_underestimate_other_schedules() {
    let problem = three_unit_problem(vec![15.0, 90.0, 120.0, 30.0]);
    let solver = HighsSolver::default();
    let schedules = sample_schedules();

    let violation = |u: &CommitmentSchedule| {
        let mut fsp = DispatchSubproblem::feasibility(&problem, u).unwrap();
        fsp.solve(&solver).unwrap().objective()
    };
    let dispatch_cost = |u: &CommitmentSchedule| {
        let mut osp = DispatchSubproblem::optimality(&problem, u).unwrap();
        osp.solve(&solver).unwrap().objective()
    };

    for u in &schedules {
        let mut fsp = DispatchSubproblem::feasibility(&problem, u).unwrap();
        fsp.solve(&solver).unwrap();
        let feasibility_cut = fsp.cut().unwrap();
        for other in &schedules {
            assert!(feasibility_cut.evaluate(other) <= violation(other) + 1e-6);
        }

        // optimality cuts exist only where the dispatch LP is feasible
        if violation(u) > 1e-9 {
            continue;
        }
        let mut osp = DispatchSubproblem::optimality(&problem, u).unwrap();
        osp.solve(&solver).unwrap();
        let optimality_cut = osp.cut().unwrap();
        for other in schedules.iter().filter(|other| violation(*other) <= 1e-9) {
            let cost = dispatch_cost(other);
            assert!(optimality_cut.evaluate(other) <= cost + 1e-6 * cost.max(1.0));
        }
    }
}

#[test]
fn test_feasibility_resolve_is_idempotent() {
    let problem = three_unit_problem(vec![15.0, 90.0, 120.0, 30.0]);
    let solver = HighsSolver::default();
    let u = CommitmentSchedule::all_on(3, 4);

    let mut first = DispatchSubproblem::feasibility(&problem, &u).unwrap();
    let first = first.solve(&solver).unwrap().clone();
    let mut second = DispatchSubproblem::feasibility(&problem, &u).unwrap();
    let second = second.solve(&solver).unwrap().clone();

    assert_eq!(first.objective(), second.objective());
    assert_eq!(first.duals(), second.duals());
}

#[test]
fn test_capacity_shortfall_is_shed() {
    // 160 MW installed against a 200 MW spike in period 2
    let problem = three_unit_problem(vec![60.0, 90.0, 200.0, 100.0]);
    let solver = HighsSolver::default();
    let u = CommitmentSchedule::all_on(3, 4);

    let mut fsp = DispatchSubproblem::feasibility(&problem, &u).unwrap();
    assert!(fsp.solve(&solver).unwrap().objective().abs() < 1e-9);

    let mut osp = DispatchSubproblem::optimality(&problem, &u).unwrap();
    let dispatch = osp.solve(&solver).unwrap();
    assert_close(dispatch.load_shed(2).unwrap(), 40.0, "shed during spike");
    assert!(dispatch.load_shed(0).unwrap() < 1e-9);
    assert!(dispatch.load_shed(4).is_err());
    assert_close(dispatch.shedding_cost(&problem), 40.0 * 200.0, "shedding cost");
}
