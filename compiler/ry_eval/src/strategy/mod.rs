//! How a compiled program gets executed.
//!
//! [`InterpreterStrategy`] runs the program in this process.
//! [`SubprocessStrategy`] serializes it to an artifact and runs it in a
//! child process, which isolates crashes and allows a hard kill.

mod interpreter;
mod subprocess;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use interpreter::InterpreterStrategy;
pub use subprocess::{SubprocessStrategy, SOURCE_STDIN_FLAG};

use crate::errors::ExecError;
use crate::program::Program;

pub trait ExecutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run `program` to completion, giving up early once `cancel` is set.
    fn execute(&self, program: &Program, cancel: &CancelToken) -> Result<(), ExecError>;
}

/// Shared flag asking a running program to stop.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
