//! Instance importer tests against files on disk

use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;
use ucp_io::importers::{instance_from_strings, load_instance};

fn repo_data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("data")
        .join(name)
}

#[test]
fn test_load_reference_system() {
    let problem = load_instance(&repo_data("generators.txt"), &repo_data("demand.txt"), 46.0)
        .expect("reference data should load");

    assert_eq!(problem.n_generators(), 31);
    assert_eq!(problem.n_periods(), 24);
    assert_eq!(problem.peak_demand(), 2564.0);
    assert!(problem.load_shedding_costs().iter().all(|&c| c == 46.0));

    let u350 = problem
        .generator_index("U350")
        .map(|i| &problem.generators()[i])
        .expect("U350 present");
    assert_eq!(u350.min_up_time, 24);
    assert_eq!(u350.startup_cost, 2298.0);
    assert_eq!(u350.ramp_up, 240.0);
    assert_eq!(u350.ramp_down, 240.0);
}

#[test]
fn test_load_from_temp_files() {
    let dir = tempdir().unwrap();
    let generators = dir.path().join("gens.txt");
    let demand = dir.path().join("demand.txt");
    fs::write(
        &generators,
        "name min max startup commitment ramp minUp minDown marginal\n\
         -    MW  MW  $       $          MW   h     h       $/MWh\n\
         A    0   60  0       0          60   1     1       10\n\
         B    0   60  0       0          60   1     1       20\n",
    )
    .unwrap();
    fs::write(&demand, "demand\n100\n100\n100\n").unwrap();

    let problem = load_instance(&generators, &demand, 1000.0).unwrap();
    assert_eq!(problem.n_generators(), 2);
    assert_eq!(problem.demands(), &[100.0, 100.0, 100.0]);
    assert_eq!(problem.generators()[1].marginal_cost, 20.0);
}

#[test]
fn test_missing_file_names_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    let err = load_instance(&missing, &repo_data("demand.txt"), 46.0).unwrap_err();
    assert!(format!("{err:#}").contains("nope.txt"));
}

#[test]
fn test_invalid_generator_fails_validation() {
    // minimum output above maximum output
    let err = instance_from_strings("h\nh\nA 70 60 0 0 10 1 1 5\n", "d\n50\n", 100.0).unwrap_err();
    assert!(format!("{err:#}").contains("validating instance"));
}

#[test]
fn test_negative_shedding_cost_rejected() {
    let err = instance_from_strings("h\nh\nA 0 60 0 0 10 1 1 5\n", "d\n50\n", -1.0).unwrap_err();
    assert!(format!("{err:#}").contains("load-shedding cost"));
}
