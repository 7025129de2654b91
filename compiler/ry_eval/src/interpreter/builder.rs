//! Builder for configuring an [`Interpreter`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use ry_memory::{MemoryConfig, MemoryRuntime};

use super::Interpreter;
use crate::bridge::{ForeignBridge, ProcessBridge};
use crate::builtins;
use crate::environment::Env;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::strategy::CancelToken;
use crate::tracer::ExecutionTracer;
use crate::value::Value;

#[must_use]
pub struct InterpreterBuilder {
    print: Option<SharedPrintHandler>,
    memory_config: MemoryConfig,
    memory: Option<Arc<MemoryRuntime<Value>>>,
    tracer: Option<Arc<ExecutionTracer>>,
    bridge: Option<Arc<dyn ForeignBridge>>,
    cancel: CancelToken,
    timeout: Option<Duration>,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            print: None,
            memory_config: MemoryConfig::default(),
            memory: None,
            tracer: None,
            bridge: None,
            cancel: CancelToken::new(),
            timeout: None,
        }
    }

    /// Capture or redirect `print` output.
    pub fn with_print_handler(mut self, print: SharedPrintHandler) -> Self {
        self.print = Some(print);
        self
    }

    pub fn with_memory_config(mut self, config: MemoryConfig) -> Self {
        self.memory_config = config;
        self
    }

    /// Share an existing memory runtime instead of creating one.
    pub fn with_memory(mut self, memory: Arc<MemoryRuntime<Value>>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_tracer(mut self, tracer: Arc<ExecutionTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn ForeignBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Abort with `TimedOut` once the run takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Interpreter {
        let builtins_env = Env::default();
        let exceptions = builtins::exception_classes();
        builtins::install_globals(&builtins_env, &exceptions);
        let globals = builtins_env.child();
        let memory = self
            .memory
            .unwrap_or_else(|| Arc::new(MemoryRuntime::new(self.memory_config)));
        Interpreter {
            builtins: builtins_env,
            globals,
            print: self.print.unwrap_or_else(stdout_handler),
            memory,
            tracer: self.tracer.unwrap_or_default(),
            bridge: self
                .bridge
                .unwrap_or_else(|| Arc::new(ProcessBridge::new())),
            exceptions,
            host_modules: builtins::host_modules(),
            packages: Default::default(),
            loaded: Default::default(),
            watches: Vec::new(),
            polling: false,
            cancel: self.cancel,
            timeout: self.timeout,
            started: Instant::now(),
            depth: 0,
            package: None,
        }
    }
}
