use std::fmt;
use std::str::FromStr;

use crate::MemoryError;

/// Default heap size: 16 MiB.
pub const DEFAULT_HEAP_SIZE: usize = 16 * 1024 * 1024;
/// Default number of allocations between automatic collections.
pub const DEFAULT_THRESHOLD: usize = 10_000;
/// Default pool slot size in bytes.
pub const DEFAULT_SLOT_SIZE: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CollectorKind {
    #[default]
    MarkSweep,
    ReferenceCounting,
    Generational,
    Incremental,
}

impl CollectorKind {
    pub const ALL: [CollectorKind; 4] = [
        CollectorKind::MarkSweep,
        CollectorKind::ReferenceCounting,
        CollectorKind::Generational,
        CollectorKind::Incremental,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CollectorKind::MarkSweep => "MarkSweep",
            CollectorKind::ReferenceCounting => "ReferenceCounting",
            CollectorKind::Generational => "Generational",
            CollectorKind::Incremental => "Incremental",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CollectorKind {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, MemoryError> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "marksweep" => Ok(CollectorKind::MarkSweep),
            "refcount" | "reference" | "referencecounting" | "rc" => {
                Ok(CollectorKind::ReferenceCounting)
            }
            "generational" => Ok(CollectorKind::Generational),
            "incremental" => Ok(CollectorKind::Incremental),
            _ => Err(MemoryError::UnknownCollector(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MemoryConfig {
    pub collector: CollectorKind,
    pub heap_size: usize,
    pub threshold: usize,
    pub slot_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            collector: CollectorKind::default(),
            heap_size: DEFAULT_HEAP_SIZE,
            threshold: DEFAULT_THRESHOLD,
            slot_size: DEFAULT_SLOT_SIZE,
        }
    }
}

impl MemoryConfig {
    #[must_use]
    pub fn with_collector(mut self, collector: CollectorKind) -> Self {
        self.collector = collector;
        self
    }

    #[must_use]
    pub fn with_heap_size(mut self, heap_size: usize) -> Self {
        self.heap_size = heap_size;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_names_parse_loosely() {
        assert_eq!("MarkSweep".parse(), Ok(CollectorKind::MarkSweep));
        assert_eq!("mark-sweep".parse(), Ok(CollectorKind::MarkSweep));
        assert_eq!("Reference".parse(), Ok(CollectorKind::ReferenceCounting));
        assert_eq!("GENERATIONAL".parse(), Ok(CollectorKind::Generational));
        assert_eq!(
            "copying".parse::<CollectorKind>(),
            Err(MemoryError::UnknownCollector("copying".into()))
        );
    }

    #[test]
    fn defaults() {
        let config = MemoryConfig::default();
        assert_eq!(config.heap_size, 16 * 1024 * 1024);
        assert_eq!(config.threshold, 10_000);
        assert_eq!(config.collector, CollectorKind::MarkSweep);
    }
}
