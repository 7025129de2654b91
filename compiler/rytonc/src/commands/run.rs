//! The `run` command: compile a file and execute it.

use std::path::Path;

use crate::error::DriverError;
use crate::session::Session;

pub fn run_file(session: &Session, path: &Path) -> Result<(), DriverError> {
    let unit = session.read(path)?;
    let program = session.build(&unit)?;
    session.run(program)
}
