//! The `compile` command: write a program artifact for `exec`.

use std::path::Path;

use ry_eval::write_artifact;

use crate::error::DriverError;
use crate::session::Session;

pub fn compile_file(session: &Session, path: &Path, out: &Path) -> Result<(), DriverError> {
    let unit = session.read(path)?;
    let program = session.build(&unit)?;
    write_artifact(out, &program)?;
    tracing::info!(artifact = %out.display(), packages = program.packages.len(), "artifact written");
    Ok(())
}
