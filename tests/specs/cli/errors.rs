//! Startup error specs
//!
//! Every startup failure exits non-zero with `error:` on stderr.

use crate::prelude::*;

#[test]
fn missing_config_file_fails() {
    Project::empty()
        .yardd()
        .args(&["--config", "nope.toml"])
        .fails()
        .stderr_has("error:")
        .stderr_has("nope.toml");
}

#[test]
fn unknown_itinerary_entry_fails() {
    let temp = Project::empty();
    temp.file(
        "yard.toml",
        "[resource.A]\ncapacity = 1\n\n[client.Train1]\nitinerary = [\"A\", \"B\"]\n",
    );

    temp.yardd()
        .args(&["--config", "yard.toml"])
        .fails()
        .stderr_has("error:")
        .stderr_has("unknown resource B");
}

#[test]
fn error_is_a_single_line_when_logging_to_file() {
    let temp = Project::empty();
    temp.file(
        "yard.toml",
        "[resource.A]\ncapacity = 1\n\n[client.Train1]\nitinerary = [\"A\", \"B\"]\n",
    );

    let stderr = temp
        .yardd()
        .args(&["--config", "yard.toml", "--log", "yardd.log"])
        .fails()
        .stderr();

    similar_asserts::assert_eq!(
        stderr.as_str(),
        "error: loading yard.toml: client Train1 references unknown resource B\n"
    );
}

#[test]
fn zero_capacity_fails() {
    let temp = Project::empty();
    temp.file(
        "yard.toml",
        "[resource.A]\ncapacity = 0\n\n[client.Train1]\nitinerary = [\"A\"]\n",
    );

    temp.yardd()
        .args(&["--config", "yard.toml"])
        .fails()
        .stderr_has("invalid capacity for resource A");
}

#[test]
fn empty_yard_fails() {
    let temp = Project::empty();
    temp.file("yard.toml", "");

    temp.yardd()
        .args(&["--config", "yard.toml"])
        .fails()
        .stderr_has("no resource definitions");
}

#[test]
fn config_and_legacy_files_conflict() {
    let temp = Project::empty();
    temp.file("yard.toml", CROSSING_YARD);

    temp.yardd()
        .args(&[
            "--config",
            "yard.toml",
            "--intersections",
            "i.txt",
            "--trains",
            "t.txt",
        ])
        .fails()
        .stderr_has("cannot be used with");
}

#[test]
fn no_yard_in_directory_fails() {
    Project::empty()
        .yardd()
        .fails()
        .stderr_has("error:")
        .stderr_has("intersections.txt");
}
