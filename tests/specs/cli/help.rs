//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_yard_sources() {
    Project::empty()
        .yardd()
        .args(&["--help"])
        .passes()
        .stdout_has("--config")
        .stdout_has("--intersections")
        .stdout_has("--socket");
}

#[test]
fn version_prints_package_version() {
    Project::empty()
        .yardd()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}
