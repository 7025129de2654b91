//! Tree-walking interpreter for lowered programs.
//!
//! The interpreter only understands host forms. Evaluation is split the
//! usual way:
//!
//! - `stmt`: blocks, assignment, loops, `try`, class definitions, imports
//! - `expr`: expressions, attribute and index access
//! - `call`: calling functions, classes, bound and built-in methods
//! - `ops`: unary and binary operators
//! - `convert`: `str()`, `repr()` and iteration
//! - `watch`: safe points, watches, cancellation and deadlines
//!
//! Every non-local exit (exception, `return`, `break`, cancellation)
//! travels as the `Err` side of a [`Flow`] result.

mod builder;
mod call;
mod convert;
mod expr;
mod ops;
mod stmt;
mod watch;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use ry_ir::Span;
use ry_memory::MemoryRuntime;

pub use builder::InterpreterBuilder;

use crate::bridge::ForeignBridge;
use crate::builtins;
use crate::environment::Env;
use crate::errors::{ExecError, Flow, Raised, RuntimeFault};
use crate::print_handler::SharedPrintHandler;
use crate::program::{PackageProgram, Program};
use crate::strategy::CancelToken;
use crate::tracer::ExecutionTracer;
use crate::value::{Class, Instance, Module, Value};

use watch::Watch;

/// Tracer events attached to a fault report.
const FAULT_TRACE_LEN: usize = 5;

/// Nested user-function calls allowed before `RecursionError`.
pub const MAX_CALL_DEPTH: usize = 800;

pub struct Interpreter {
    builtins: Env,
    globals: Env,
    print: SharedPrintHandler,
    memory: Arc<MemoryRuntime<Value>>,
    tracer: Arc<ExecutionTracer>,
    bridge: Arc<dyn ForeignBridge>,
    exceptions: FxHashMap<&'static str, Arc<Class>>,
    host_modules: FxHashMap<&'static str, Value>,
    packages: FxHashMap<String, Arc<PackageProgram>>,
    loaded: FxHashMap<String, Value>,
    watches: Vec<Watch>,
    polling: bool,
    cancel: CancelToken,
    timeout: Option<Duration>,
    started: Instant,
    depth: usize,
    /// Package whose code is executing, `None` for the entry program.
    package: Option<Arc<str>>,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    pub fn memory(&self) -> &Arc<MemoryRuntime<Value>> {
        &self.memory
    }

    pub fn tracer(&self) -> &Arc<ExecutionTracer> {
        &self.tracer
    }

    /// A global of the entry program.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name)
    }

    /// Run `program`: the top level, then `main` if it is defined, then
    /// any watches still pending. With `trash_cleaner` set the object
    /// table is cleared and a collection forced afterwards, whether or
    /// not the run succeeded.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %program.source.origin.display_name()))]
    pub fn run_program(&mut self, program: &Program) -> Result<(), ExecError> {
        self.packages = program
            .packages
            .iter()
            .map(|p| (p.name.clone(), Arc::new(p.clone())))
            .collect();
        let result = self.run_entry(program);
        if program.tree.directives.trash_cleaner {
            self.clean_up();
        }
        match result {
            Ok(()) | Err(Flow::Return(_) | Flow::Break | Flow::Continue) => Ok(()),
            Err(Flow::Halt(halt)) => Err(halt.into()),
            Err(Flow::Raise(raised)) => Err(ExecError::Fault(Box::new(self.fault(*raised)))),
        }
    }

    fn run_entry(&mut self, program: &Program) -> Result<(), Flow> {
        let globals = self.globals.clone();
        self.exec_block(&program.tree.body, &globals)?;
        if let Some(main @ Value::Function(_)) = globals.get("main") {
            tracing::debug!("calling main");
            self.call_value(main, Vec::new(), program.tree.body.span)?;
        }
        self.drain_watches()
    }

    fn clean_up(&mut self) {
        let cleared = self.memory.clear_objects();
        self.watches.clear();
        self.loaded.clear();
        self.globals.clear();
        let reclaimed = self.memory.collect();
        tracing::debug!(cleared, reclaimed = reclaimed.len(), "trash cleaner ran");
    }

    fn fault(&self, raised: Raised) -> RuntimeFault {
        RuntimeFault {
            kind: raised.kind,
            message: raised.message,
            span: raised.span,
            package: raised.package.map(|p| p.to_string()),
            trace: self.tracer.recent(FAULT_TRACE_LEN),
        }
    }

    /// Build an exception of the built-in class `kind`.
    #[cold]
    pub(crate) fn raise(&self, kind: &str, message: impl Into<String>, span: Span) -> Flow {
        let class = self
            .exceptions
            .get(kind)
            .or_else(|| self.exceptions.get("RuntimeError"))
            .cloned()
            .unwrap_or_else(|| Arc::new(Class::new(kind, None)));
        let message = message.into();
        let value = self.exception_value(&class, message.clone());
        self.raised(value, class.name.clone(), message, span)
    }

    pub(crate) fn raised(&self, value: Value, kind: String, message: String, span: Span) -> Flow {
        Flow::Raise(Box::new(Raised {
            value,
            kind,
            message,
            span,
            package: self.package.clone(),
        }))
    }

    fn exception_value(&self, class: &Arc<Class>, message: String) -> Value {
        let instance = Instance {
            class: Arc::clone(class),
            fields: Default::default(),
            slot: None,
        };
        instance
            .fields
            .lock()
            .insert("message".to_string(), Value::str(message));
        Value::Instance(Arc::new(instance))
    }

    /// Run a package's top level once and bind its exports as a module.
    fn load_package(&mut self, name: &str, span: Span) -> Result<Value, Flow> {
        if let Some(module) = self.loaded.get(name) {
            return Ok(module.clone());
        }
        let Some(package) = self.packages.get(name).cloned() else {
            return Err(self.raise(
                "ImportError",
                format!("package `{name}` was not bundled with this program"),
                span,
            ));
        };
        tracing::debug!(package = %name, "initializing package");
        let env = self.builtins.child();
        let outer = self.package.replace(Arc::from(name));
        let result = self.exec_block(&package.tree.body, &env);
        self.package = outer;
        match result {
            Ok(()) | Err(Flow::Return(_)) => {}
            Err(flow) => return Err(flow),
        }
        let members = package
            .exports
            .iter()
            .filter_map(|export| env.get(export).map(|v| (export.clone(), v)))
            .collect();
        let module = Value::Module(Arc::new(Module {
            name: name.to_string(),
            members,
            native: false,
        }));
        self.loaded.insert(name.to_string(), module.clone());
        Ok(module)
    }

    fn host_module(&self, name: &str) -> Option<Value> {
        self.host_modules.get(name).cloned()
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn print_line(&self, line: &str) {
        self.print.println(line);
    }

    pub(crate) fn call_bridge(&self, lang: &str, code: &str, span: Span) -> Result<Value, Flow> {
        self.bridge
            .call(lang, code)
            .map(Value::str)
            .map_err(|e| self.raise("BridgeError", e.to_string(), span))
    }
}

/// Names of the host modules every interpreter provides.
pub fn host_module_names() -> Vec<&'static str> {
    builtins::HOST_MODULES.to_vec()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
