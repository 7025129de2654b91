//! Locating and reading package sources.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use ry_ir::SourceUnit;

/// File extension of Ryton sources.
pub const SOURCE_EXTENSION: &str = "ry";

/// Ordered package search directories; the first match wins.
#[derive(Debug, Default)]
pub struct PackageLoader {
    search: Vec<PathBuf>,
    reads: AtomicUsize,
}

impl PackageLoader {
    pub fn new(search: Vec<PathBuf>) -> Self {
        PackageLoader {
            search,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search
    }

    /// `foo.bar` is looked up as `foo/bar.ry` under each directory.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let relative = relative_path(name);
        self.search
            .iter()
            .map(|dir| dir.join(&relative))
            .find(|candidate| candidate.is_file())
    }

    pub fn read(&self, path: &Path) -> std::io::Result<SourceUnit> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let text = std::fs::read_to_string(path)?;
        Ok(SourceUnit::from_file(path, text))
    }

    /// Number of package files read from disk so far.
    pub fn disk_reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

fn relative_path(name: &str) -> PathBuf {
    let mut path: PathBuf = name.split('.').collect();
    path.set_extension(SOURCE_EXTENSION);
    path
}
