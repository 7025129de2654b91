//! The `check` command: compile, resolve and validate without running.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::DriverError;
use crate::session::Session;

/// Check every file, compiling them in parallel.
///
/// Returns one `OK` line per file, in argument order. The first failure in
/// argument order is returned instead.
pub fn check_files(session: &Session, paths: &[PathBuf]) -> Result<Vec<String>, DriverError> {
    paths
        .par_iter()
        .map(|path| check_one(session, path))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

fn check_one(session: &Session, path: &Path) -> Result<String, DriverError> {
    let unit = session.read(path)?;
    let program = session.build(&unit)?;
    Ok(format!(
        "OK: {} ({} blocks, {} packages)",
        path.display(),
        program.blocks.len(),
        program.packages.len()
    ))
}
