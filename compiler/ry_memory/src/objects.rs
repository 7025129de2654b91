use rustc_hash::FxHashMap;

use crate::MemoryError;

#[derive(Clone, Debug)]
struct Entry<V> {
    value: V,
    size: usize,
}

/// Values stored by name, accounted apart from the collected heap.
#[derive(Debug)]
pub struct ObjectTable<V> {
    entries: FxHashMap<String, Entry<V>>,
    total_bytes: usize,
}

impl<V> Default for ObjectTable<V> {
    fn default() -> Self {
        ObjectTable {
            entries: FxHashMap::default(),
            total_bytes: 0,
        }
    }
}

impl<V> ObjectTable<V> {
    /// Store `value` under `name`, replacing (and returning) any previous
    /// value.
    pub fn allocate(&mut self, name: impl Into<String>, value: V, size: usize) -> Option<V> {
        self.total_bytes += size;
        let old = self.entries.insert(name.into(), Entry { value, size })?;
        self.total_bytes -= old.size;
        Some(old.value)
    }

    pub fn free(&mut self, name: &str) -> Result<V, MemoryError> {
        let entry = self
            .entries
            .remove(name)
            .ok_or_else(|| MemoryError::UnknownName(name.to_string()))?;
        self.total_bytes -= entry.size;
        Ok(entry.value)
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name).map(|e| &e.value)
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    /// Remove every entry, handing the values back to the caller.
    pub fn drain(&mut self) -> Vec<V> {
        self.total_bytes = 0;
        self.entries.drain().map(|(_, entry)| entry.value).collect()
    }
}
