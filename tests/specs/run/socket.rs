//! Trains talking to the coordinator over a Unix socket

use crate::prelude::*;

#[test]
fn socket_run_completes_and_removes_socket() {
    let temp = Project::empty();
    temp.file("yard.toml", CROSSING_YARD);

    temp.yardd()
        .args(&["--config", "yard.toml", "--socket", "run/yard.sock"])
        .passes()
        .stdout_has("run complete: 2 clients");

    assert!(!temp.path().join("run/yard.sock").exists());
}
