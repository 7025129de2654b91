//! The static table of host modules and the probe for their targets.

use rustc_hash::{FxHashMap, FxHashSet};

/// Logical module path to the targets that must all be present for an
/// import of it to succeed.
///
/// Read-only once built. Resolution never adds or removes entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleMapping {
    entries: FxHashMap<String, Vec<String>>,
}

impl ModuleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// The modules every host provides.
    pub fn standard() -> Self {
        let mut mapping = Self::new();
        for module in ["std", "std.lib", "std.Math", "std.String", "std.Time", "std.Memory"] {
            mapping = mapping.with_entry(module, [module]);
        }
        mapping.with_entry("std.Graphics", ["std.Graphics", "native:sdl"])
    }

    #[must_use]
    pub fn with_entry<I, S>(mut self, path: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(path.to_string(), targets.into_iter().map(Into::into).collect());
        self
    }

    pub fn targets(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Answers whether a backing target can be provided by this host.
pub trait TargetProbe: Send + Sync {
    fn is_available(&self, target: &str) -> bool;
}

/// A probe over a fixed set of target names.
#[derive(Clone, Debug, Default)]
pub struct StaticProbe {
    available: FxHashSet<String>,
}

impl StaticProbe {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticProbe {
            available: targets.into_iter().map(Into::into).collect(),
        }
    }
}

impl TargetProbe for StaticProbe {
    fn is_available(&self, target: &str) -> bool {
        self.available.contains(target)
    }
}
