//! Command handlers for the `ryton` CLI.
//!
//! Each handler returns its failure instead of exiting; `main` renders it
//! and picks the exit status.

mod check;
mod compile;
mod exec;
mod run;
mod translate;

pub use check::check_files;
pub use compile::compile_file;
pub use exec::exec_artifact;
pub use run::run_file;
pub use translate::translate_file;
