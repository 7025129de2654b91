//! Runtime values.
//!
//! Scalars are stored inline. Everything with identity lives behind an
//! `Arc`, and mutable containers behind a `parking_lot::Mutex`, so values
//! can be shared with the memory runtime's object table.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use ry_ir::{Block, Span};
use ry_memory::{GcRef, MemoryRuntime};

use crate::environment::Env;
use crate::errors::Flow;
use crate::interpreter::Interpreter;

pub type BuiltinFn = fn(&mut Interpreter, Vec<Value>, Span) -> Result<Value, Flow>;

pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(Arc<Mutex<Vec<Value>>>),
    Dict(Arc<Mutex<Dict>>),
    /// Half-open integer range.
    Range {
        start: i64,
        end: i64,
    },
    Function(Arc<Function>),
    Builtin(&'static Builtin),
    Class(Arc<Class>),
    Instance(Arc<Instance>),
    /// A user method bound to its receiver.
    BoundMethod(Arc<(Value, Arc<Function>)>),
    /// A method of a built-in type bound to its receiver.
    NativeMethod(Arc<(Value, &'static str)>),
    Module(Arc<Module>),
    Table(Arc<Mutex<MetaTable>>),
}

impl Value {
    pub fn str(text: impl Into<Arc<str>>) -> Value {
        Value::Str(text.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Arc::new(Mutex::new(items)))
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(Arc::new(Mutex::new(dict)))
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Float(_) => "float".into(),
            Value::Str(_) => "str".into(),
            Value::List(_) => "list".into(),
            Value::Dict(_) => "dict".into(),
            Value::Range { .. } => "range".into(),
            Value::Function(_) => "function".into(),
            Value::Builtin(_) => "builtin_function".into(),
            Value::Class(_) => "type".into(),
            Value::Instance(i) => i.class.name.clone(),
            Value::BoundMethod(_) | Value::NativeMethod(_) => "method".into(),
            Value::Module(_) => "module".into(),
            Value::Table(_) => "MetaTable".into(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.lock().is_empty(),
            Value::Dict(d) => !d.lock().is_empty(),
            Value::Range { start, end } => start < end,
            Value::Table(t) => !t.lock().data.is_empty(),
            _ => true,
        }
    }

    /// Integer view of ints and bools.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    #[expect(clippy::cast_precision_loss, reason = "int to float promotion")]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_int().map(|n| n as f64),
        }
    }

    /// `==`: numbers compare across types, containers element-wise,
    /// everything else by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                matches!((self.as_float(), other.as_float()), (Some(a), Some(b)) if a == b)
            }
            (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
                self.as_int() == other.as_int()
            }
            (Value::List(a), Value::List(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.lock().clone(), b.lock().clone());
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.equals(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.lock().clone(), b.lock().clone());
                a.len() == b.len()
                    && a.entries
                        .iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.equals(&w)))
            }
            (Value::Range { start: a, end: b }, Value::Range { start: c, end: d }) => {
                a == c && b == d
            }
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Arc::ptr_eq(a, b),
            (Value::Table(a), Value::Table(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Rough byte size, for memory accounting.
    pub fn approximate_size(&self) -> usize {
        const WORD: usize = std::mem::size_of::<Value>();
        match self {
            Value::Str(s) => WORD + s.len(),
            Value::List(items) => WORD + items.lock().iter().map(Value::approximate_size).sum::<usize>(),
            Value::Dict(d) => {
                WORD + d
                    .lock()
                    .entries
                    .iter()
                    .map(|(k, v)| k.approximate_size() + v.approximate_size())
                    .sum::<usize>()
            }
            _ => WORD,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(items) => f.debug_list().entries(items.lock().iter()).finish(),
            Value::Range { start, end } => write!(f, "Range({start}..{end})"),
            Value::Builtin(b) => write!(f, "Builtin({})", b.name),
            Value::Function(func) => write!(f, "Function({})", func.name),
            Value::Class(class) => write!(f, "Class({})", class.name),
            Value::Module(m) => write!(f, "Module({})", m.name),
            other => write!(f, "<{}>", other.type_name()),
        }
    }
}

/// Insertion-ordered mapping with `==` key comparison.
#[derive(Clone, Default)]
pub struct Dict {
    pub entries: Vec<(Value, Value)>,
}

impl Dict {
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.equals(key))
            .map(|(_, v)| v.clone())
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k.equals(key))?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k.equals(key))
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    /// Default values, evaluated when the function was defined.
    pub defaults: Vec<Option<Value>>,
    pub body: Arc<Block>,
    pub closure: Env,
    /// Package the function was defined in, `None` for the entry program.
    pub package: Option<Arc<str>>,
}

impl Function {
    pub(crate) fn rebind(&self, closure: Env) -> Function {
        Function {
            name: self.name.clone(),
            params: self.params.clone(),
            defaults: self.defaults.clone(),
            body: Arc::clone(&self.body),
            closure,
            package: self.package.clone(),
        }
    }
}

pub struct Class {
    pub name: String,
    pub base: Option<Arc<Class>>,
    pub attrs: Mutex<FxHashMap<String, Value>>,
}

impl Class {
    pub fn new(name: impl Into<String>, base: Option<Arc<Class>>) -> Self {
        Class {
            name: name.into(),
            base,
            attrs: Mutex::new(FxHashMap::default()),
        }
    }

    /// Attribute of this class or the nearest base defining it.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.attrs.lock().get(name) {
            return Some(v.clone());
        }
        self.base.as_ref().and_then(|b| b.lookup(name))
    }

    /// True when `name` is this class or one of its bases.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.base.as_ref().is_some_and(|b| b.is_a(name))
    }
}

/// Keeps an instance's heap object rooted while the instance lives.
pub(crate) struct HeapSlot {
    memory: Weak<MemoryRuntime<Value>>,
    r: GcRef,
}

impl HeapSlot {
    pub fn new(memory: &Arc<MemoryRuntime<Value>>, r: GcRef) -> Self {
        HeapSlot {
            memory: Arc::downgrade(memory),
            r,
        }
    }
}

impl Drop for HeapSlot {
    fn drop(&mut self) {
        if let Some(memory) = self.memory.upgrade() {
            // The object may already be gone after an explicit free.
            let _ = memory.remove_root(self.r);
        }
    }
}

pub struct Instance {
    pub class: Arc<Class>,
    pub fields: Mutex<FxHashMap<String, Value>>,
    pub(crate) slot: Option<HeapSlot>,
}

impl Instance {
    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.lock().get(name).cloned()
    }

    pub fn heap_ref(&self) -> Option<GcRef> {
        self.slot.as_ref().map(|s| s.r)
    }
}

/// A host module, a loaded package or a native library.
pub struct Module {
    pub name: String,
    pub members: Vec<(String, Value)>,
    pub native: bool,
}

impl Module {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}

/// A table built from a literal aggregate, with optional metamethods.
#[derive(Clone, Default)]
pub struct MetaTable {
    pub data: Dict,
    /// Dict of `__index`, `__call`, `__add`, ... handlers.
    pub meta: Option<Value>,
}

impl MetaTable {
    pub fn handler(&self, name: &str) -> Option<Value> {
        match &self.meta {
            Some(Value::Dict(d)) => d.lock().get(&Value::str(name)),
            _ => None,
        }
    }
}
