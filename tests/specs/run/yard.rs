//! Running a TOML yard

use crate::prelude::*;

#[test]
fn crossing_trains_finish_after_deadlock_recovery() {
    let temp = Project::empty();
    temp.file("yard.toml", CROSSING_YARD);

    temp.yardd()
        .args(&["--config", "yard.toml", "--sim-log", "simulation.log"])
        .passes()
        .stdout_has("run complete: 2 clients")
        .stdout_has("Train1:")
        .stdout_has("Train2:");

    let log = temp.read("simulation.log");
    assert!(log.contains("Deadlock detected!"), "{}", log);
    assert!(log.contains("SERVER: Preempting"), "{}", log);
    assert_eq!(
        log.lines().filter(|l| l.contains("SIMULATION COMPLETE")).count(),
        1
    );
}

#[test]
fn shared_platform_runs_without_deadlock() {
    let temp = Project::empty();
    temp.file("yard.toml", SHARED_YARD);

    temp.yardd()
        .args(&["--config", "yard.toml", "--sim-log", "simulation.log"])
        .passes()
        .stdout_has("run complete: 3 clients")
        .stdout_has("0 deadlocks");

    let log = temp.read("simulation.log");
    assert!(log.contains("Platform is full"), "{}", log);
}

#[test]
fn sim_log_lines_carry_timestamps() {
    let temp = Project::empty();
    temp.file("yard.toml", SHARED_YARD);

    temp.yardd()
        .args(&["--config", "yard.toml", "--sim-log", "out/simulation.log"])
        .fails()
        .stderr_has("simulation log");

    std::fs::create_dir_all(temp.path().join("out")).unwrap();
    temp.yardd()
        .args(&["--config", "yard.toml", "--sim-log", "out/simulation.log"])
        .passes();

    let log = temp.read("out/simulation.log");
    let first = log.lines().next().unwrap();
    assert!(first.starts_with("[00:00:01] "), "{}", first);
}
