//! Calling values.

use std::sync::Arc;

use ry_ir::Span;

use super::{Interpreter, MAX_CALL_DEPTH};
use crate::builtins::methods;
use crate::errors::Flow;
use crate::value::{Class, Function, HeapSlot, Instance, Value};

/// Heap bytes accounted for each class instance.
const INSTANCE_SIZE: usize = 64;

impl Interpreter {
    pub(crate) fn call_value(&mut self, callee: Value, mut args: Vec<Value>, span: Span) -> Result<Value, Flow> {
        match callee {
            Value::Function(func) => self.call_function(&func, args, span),
            Value::Builtin(builtin) => (builtin.func)(self, args, span),
            Value::Class(class) => self.instantiate(&class, args, span),
            Value::BoundMethod(bound) => {
                let (receiver, func) = &*bound;
                args.insert(0, receiver.clone());
                self.call_function(func, args, span)
            }
            Value::NativeMethod(bound) => {
                let (receiver, name) = &*bound;
                methods::call(self, receiver, name, args, span)
            }
            Value::Table(ref table) => {
                let handler = table.lock().handler("__call");
                match handler {
                    Some(handler) => {
                        args.insert(0, callee.clone());
                        self.call_value(handler, args, span)
                    }
                    None => Err(self.raise("TypeError", "'MetaTable' object is not callable", span)),
                }
            }
            other => Err(self.raise(
                "TypeError",
                format!("'{}' object is not callable", other.type_name()),
                span,
            )),
        }
    }

    pub(crate) fn call_function(&mut self, func: &Arc<Function>, args: Vec<Value>, span: Span) -> Result<Value, Flow> {
        if args.len() > func.params.len() {
            return Err(self.raise(
                "TypeError",
                format!(
                    "{}() takes {} positional argument(s) but {} were given",
                    func.name,
                    func.params.len(),
                    args.len()
                ),
                span,
            ));
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(self.raise("RecursionError", "maximum recursion depth exceeded", span));
        }

        let env = func.closure.child();
        let given = args.len();
        for (name, value) in func.params.iter().zip(args) {
            env.set(name.clone(), value);
        }
        for (name, default) in func.params.iter().zip(&func.defaults).skip(given) {
            match default {
                Some(value) => env.set(name.clone(), value.clone()),
                None => {
                    return Err(self.raise(
                        "TypeError",
                        format!("{}() missing required argument: '{name}'", func.name),
                        span,
                    ));
                }
            }
        }

        self.tracer.called(&func.name);
        self.depth += 1;
        let outer = std::mem::replace(&mut self.package, func.package.clone());
        let result = self.exec_block(&func.body, &env);
        self.package = outer;
        self.depth -= 1;

        match result {
            Ok(()) | Err(Flow::Break | Flow::Continue) => {
                self.tracer.returned(&func.name);
                Ok(Value::None)
            }
            Err(Flow::Return(value)) => {
                self.tracer.returned(&func.name);
                Ok(value)
            }
            Err(Flow::Raise(raised)) => {
                self.tracer.error(&func.name, &raised.kind);
                Err(Flow::Raise(raised))
            }
            Err(halt @ Flow::Halt(_)) => Err(halt),
        }
    }

    /// Create an instance of `class` and run its `__init__`.
    ///
    /// Every instance owns a rooted object on the managed heap for as long
    /// as it is alive, so heap statistics and collections see it.
    pub(crate) fn instantiate(&mut self, class: &Arc<Class>, args: Vec<Value>, span: Span) -> Result<Value, Flow> {
        let r = self
            .memory
            .allocate_rooted(INSTANCE_SIZE)
            .map_err(|e| self.raise("MemoryError", e.to_string(), span))?;
        let instance = Value::Instance(Arc::new(Instance {
            class: Arc::clone(class),
            fields: Default::default(),
            slot: Some(HeapSlot::new(&self.memory, r)),
        }));

        match class.lookup("__init__") {
            Some(Value::Function(init)) => {
                let mut init_args = Vec::with_capacity(args.len() + 1);
                init_args.push(instance.clone());
                init_args.extend(args);
                self.call_function(&init, init_args, span)?;
            }
            Some(other) => {
                self.call_value(other, args, span)?;
            }
            None if class.is_a("Exception") => {
                let message = match args.into_iter().next() {
                    Some(Value::Str(s)) => Value::Str(s),
                    Some(other) => Value::str(self.to_str(&other)?),
                    None => Value::str(""),
                };
                if let Value::Instance(i) = &instance {
                    i.fields.lock().insert("message".to_string(), message);
                }
            }
            None if !args.is_empty() => {
                return Err(self.raise(
                    "TypeError",
                    format!("{}() takes no arguments", class.name),
                    span,
                ));
            }
            None => {}
        }
        Ok(instance)
    }
}
