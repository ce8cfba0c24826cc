//! Diagnostic log specs

use crate::prelude::*;

#[test]
fn log_file_records_run() {
    let temp = Project::empty();
    temp.file("yard.toml", CROSSING_YARD);

    temp.yardd()
        .args(&["--config", "yard.toml", "--log", "logs/yardd.log"])
        .passes();

    let log = temp.read("logs/yardd.log");
    assert!(log.contains("yard loaded"), "{}", log);
    assert!(log.contains("run finished"), "{}", log);
}

#[test]
fn stdout_stays_clean_of_diagnostics() {
    let temp = Project::empty();
    temp.file("yard.toml", SHARED_YARD);

    temp.yardd()
        .args(&["--config", "yard.toml"])
        .passes()
        .stdout_lacks("INFO")
        .stdout_lacks("WARN");
}
