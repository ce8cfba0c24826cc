//! Running the legacy `intersections.txt` / `trains.txt` pair

use crate::prelude::*;

#[test]
fn legacy_files_in_working_directory_are_default() {
    let temp = Project::empty();
    temp.file("intersections.txt", "IntersectionA:1\nIntersectionB:2\n");
    temp.file(
        "trains.txt",
        "Train1: IntersectionA, IntersectionB\nTrain2: IntersectionB\n",
    );

    temp.yardd().passes().stdout_has("run complete: 2 clients");
}

#[test]
fn legacy_files_by_path() {
    let temp = Project::empty();
    temp.file("data/i.txt", "IntersectionA:1\nIntersectionB:1\n");
    temp.file(
        "data/t.txt",
        "Train1:IntersectionA,IntersectionB\nTrain2:IntersectionB,IntersectionA\n",
    );

    temp.yardd()
        .args(&["--intersections", "data/i.txt", "--trains", "data/t.txt"])
        .passes()
        .stdout_has("run complete: 2 clients");
}

#[test]
fn malformed_legacy_line_reports_line_number() {
    let temp = Project::empty();
    temp.file("intersections.txt", "IntersectionA:1\nIntersectionB:many\n");
    temp.file("trains.txt", "Train1:IntersectionA\n");

    temp.yardd().fails().stderr_has("line 2");
}
