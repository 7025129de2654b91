//! Lexical scopes.
//!
//! A scope is shared by every closure created inside it, so scopes are
//! reference counted and locked. Lookups lock one scope at a time while
//! walking outwards.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::Value;

#[derive(Default)]
struct Scope {
    vars: FxHashMap<String, Value>,
    parent: Option<Env>,
}

#[derive(Clone, Default)]
pub struct Env(Arc<Mutex<Scope>>);

impl Env {
    /// A scope nested inside `self`.
    pub fn child(&self) -> Env {
        Env(Arc::new(Mutex::new(Scope {
            vars: FxHashMap::default(),
            parent: Some(self.clone()),
        })))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = self.clone();
        loop {
            let parent = {
                let guard = scope.0.lock();
                if let Some(value) = guard.vars.get(name) {
                    return Some(value.clone());
                }
                guard.parent.clone()
            };
            scope = parent?;
        }
    }

    /// Bind `name` in this scope.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.lock().vars.insert(name.into(), value);
    }

    pub fn parent(&self) -> Option<Env> {
        self.0.lock().parent.clone()
    }

    /// Bindings made directly in this scope, sorted by name.
    pub fn locals(&self) -> Vec<(String, Value)> {
        let mut locals: Vec<_> = self
            .0
            .lock()
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        locals.sort_by(|a, b| a.0.cmp(&b.0));
        locals
    }

    /// Drop every binding, breaking reference cycles through closures.
    pub fn clear(&self) {
        let vars = std::mem::take(&mut self.0.lock().vars);
        drop(vars);
    }
}
