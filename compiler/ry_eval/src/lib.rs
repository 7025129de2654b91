//! Execution of lowered Ryton programs.
//!
//! A [`Program`] is a lowered entry tree plus every package it may import.
//! It runs on the tree-walking [`Interpreter`], either in this process
//! ([`InterpreterStrategy`]) or in a child process fed a serialized
//! artifact ([`SubprocessStrategy`]).
//!
//! Uncaught exceptions surface as [`RuntimeFault`]s inside [`ExecError`];
//! [`FaultReporter`] resolves them back to the user's source.

pub mod artifact;
mod bridge;
mod builtins;
mod environment;
mod errors;
mod fault;
mod interpreter;
mod print_handler;
mod program;
mod strategy;
mod tracer;
mod value;

pub use artifact::{read_artifact, write_artifact, ArtifactError, FORMAT_VERSION, MAGIC};
pub use bridge::{BridgeError, ForeignBridge, ProcessBridge, RecordingBridge};
pub use environment::Env;
pub use errors::{ExecError, Flow, Halt, Raised, RuntimeFault};
pub use fault::{FaultFormat, FaultReporter, DEFAULT_CONTEXT_RADIUS};
pub use interpreter::{host_module_names, Interpreter, InterpreterBuilder, MAX_CALL_DEPTH};
pub use print_handler::{buffer_handler, stdout_handler, PrintHandler, SharedPrintHandler};
pub use program::{PackageProgram, Program, ProgramSource};
pub use strategy::{
    CancelToken, ExecutionStrategy, InterpreterStrategy, SubprocessStrategy, SOURCE_STDIN_FLAG,
};
pub use tracer::{ExecutionTracer, TraceGuard, DEFAULT_TRACE_CAPACITY};
pub use value::{Builtin, BuiltinFn, Class, Dict, Function, Instance, MetaTable, Module, Value};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
