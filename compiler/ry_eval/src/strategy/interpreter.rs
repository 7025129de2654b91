use std::sync::Arc;
use std::time::Duration;

use ry_memory::MemoryConfig;

use super::{CancelToken, ExecutionStrategy};
use crate::bridge::ForeignBridge;
use crate::errors::ExecError;
use crate::interpreter::Interpreter;
use crate::print_handler::SharedPrintHandler;
use crate::program::Program;
use crate::tracer::{ExecutionTracer, TraceGuard};

/// Runs programs on the tree-walking interpreter in this process.
#[derive(Clone, Default)]
pub struct InterpreterStrategy {
    memory: MemoryConfig,
    timeout: Option<Duration>,
    trace: bool,
    tracer: Arc<ExecutionTracer>,
    print: Option<SharedPrintHandler>,
    bridge: Option<Arc<dyn ForeignBridge>>,
}

impl InterpreterStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record calls and returns while the program runs.
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    #[must_use]
    pub fn with_print_handler(mut self, print: SharedPrintHandler) -> Self {
        self.print = Some(print);
        self
    }

    #[must_use]
    pub fn with_bridge(mut self, bridge: Arc<dyn ForeignBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Events recorded by the last traced run.
    pub fn tracer(&self) -> &Arc<ExecutionTracer> {
        &self.tracer
    }
}

impl ExecutionStrategy for InterpreterStrategy {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    fn execute(&self, program: &Program, cancel: &CancelToken) -> Result<(), ExecError> {
        let mut builder = Interpreter::builder()
            .with_memory_config(self.memory)
            .with_timeout(self.timeout)
            .with_tracer(Arc::clone(&self.tracer))
            .with_cancel(cancel.clone());
        if let Some(print) = &self.print {
            builder = builder.with_print_handler(Arc::clone(print));
        }
        if let Some(bridge) = &self.bridge {
            builder = builder.with_bridge(Arc::clone(bridge));
        }
        let mut interpreter = builder.build();
        let _guard = self.trace.then(|| TraceGuard::new(Arc::clone(&self.tracer)));
        interpreter.run_program(program)
    }
}
