//! Shared helpers for yardd specs

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::prelude::*;

/// Two trains crossing the same pair of intersections in opposite order
pub const CROSSING_YARD: &str = r#"
[resource.IntersectionA]
capacity = 1

[resource.IntersectionB]
capacity = 1

[client.Train1]
itinerary = ["IntersectionA", "IntersectionB"]

[client.Train2]
itinerary = ["IntersectionB", "IntersectionA"]
"#;

/// Three trains sharing a two-slot platform
pub const SHARED_YARD: &str = r#"
[resource.Platform]
capacity = 2

[client.Train1]
itinerary = ["Platform"]

[client.Train2]
itinerary = ["Platform"]

[client.Train3]
itinerary = ["Platform"]
"#;

/// Path to the yardd binary, building it on first use when a plain
/// `cargo test` did not build workspace binaries.
fn yardd_bin() -> PathBuf {
    static BIN: OnceLock<PathBuf> = OnceLock::new();
    BIN.get_or_init(|| {
        let path = assert_cmd::cargo::cargo_bin("yardd");
        if !path.exists() {
            let status = std::process::Command::new(env!("CARGO"))
                .args(["build", "-p", "yard-daemon", "--bin", "yardd"])
                .current_dir(env!("CARGO_MANIFEST_DIR"))
                .status()
                .expect("failed to run cargo build");
            assert!(status.success(), "building yardd failed");
        }
        path
    })
    .clone()
}

/// A scratch directory the binary runs in
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(rel)).unwrap()
    }

    /// yardd with fast trains, run from the project root
    pub fn yardd(&self) -> CliBuilder {
        let mut cmd = Command::new(yardd_bin());
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .args(["--travel-ms", "20", "--retry-ms", "2"])
            .timeout(std::time::Duration::from_secs(60));
        CliBuilder { cmd }
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().failure(),
        }
    }
}

pub struct RunAssert {
    assert: Assert,
}

impl RunAssert {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(expected)),
        }
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(expected)),
        }
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(unexpected).not()),
        }
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stderr).into_owned()
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned()
    }
}
