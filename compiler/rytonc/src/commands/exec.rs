//! The `exec` command: run a program artifact written by `compile`.

use std::io::Read;
use std::path::{Path, PathBuf};

use ry_eval::read_artifact;

use crate::error::DriverError;
use crate::session::{execute, Session};

/// Run the artifact at `path` on the in-process interpreter.
///
/// With `source_stdin` the original source text is read from stdin and
/// used for fault reports in place of the copy stored in the artifact.
pub fn exec_artifact(session: &Session, path: &Path, source_stdin: bool) -> Result<(), DriverError> {
    let mut program = read_artifact(path)?;
    if source_stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| DriverError::Io {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        if !text.is_empty() {
            program.source.text = text;
        }
    }
    execute(program, &session.interpreter())
}
