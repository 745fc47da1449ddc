//! Common test fixtures for tile server tests.

use std::path::PathBuf;

/// Requester identities used across tests.
pub mod users {
    /// Owner of the private datasets in tests.
    pub const OWNER: &str = "alice";

    /// A signed-in user who owns nothing.
    pub const STRANGER: &str = "bob";
}

/// Small assemblies for building containers.
pub mod assemblies {
    /// Two-chromosome toy assembly (4000 bp total).
    pub const TOY: &[(&str, u64)] = &[("chr1", 2500), ("chr2", 1500)];

    /// First chromosomes of hg19.
    pub const HG19_HEAD: &[(&str, u64)] = &[
        ("chr1", 249_250_621),
        ("chr2", 243_199_373),
        ("chr3", 198_022_430),
    ];
}

/// A temporary directory that lives as long as the returned guard.
pub struct TempWorkspace {
    dir: tempfile::TempDir,
}

impl TempWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Path of `name` inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name` and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
