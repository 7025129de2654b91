//! Call/return/exception log.
//!
//! The evaluator reports every user-function call through
//! [`ExecutionTracer`]. Events are only recorded while tracing is enabled,
//! and only the most recent ones are kept.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Events kept by default.
pub const DEFAULT_TRACE_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct ExecutionTracer {
    enabled: AtomicBool,
    capacity: usize,
    events: Mutex<VecDeque<String>>,
}

impl Default for ExecutionTracer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRACE_CAPACITY)
    }
}

impl ExecutionTracer {
    pub fn with_capacity(capacity: usize) -> Self {
        ExecutionTracer {
            enabled: AtomicBool::new(false),
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn called(&self, function: &str) {
        self.push(|| format!("Called: {function}"));
    }

    pub fn returned(&self, function: &str) {
        self.push(|| format!("Returned: {function}"));
    }

    pub fn error(&self, function: &str, kind: &str) {
        self.push(|| format!("Error in {function}: {kind}"));
    }

    fn push(&self, event: impl FnOnce() -> String) {
        if !self.is_enabled() {
            return;
        }
        let event = event();
        tracing::trace!(%event, "trace");
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// The last `n` events, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let events = self.events.lock();
        events.iter().skip(events.len().saturating_sub(n)).cloned().collect()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().iter().cloned().collect()
    }
}

/// Enables a tracer for its lifetime.
///
/// Dropping the guard disables tracing on every exit path, including
/// unwinding out of a failed run.
#[must_use = "tracing stops as soon as the guard is dropped"]
pub struct TraceGuard {
    tracer: Arc<ExecutionTracer>,
}

impl TraceGuard {
    pub fn new(tracer: Arc<ExecutionTracer>) -> Self {
        tracer.enable();
        TraceGuard { tracer }
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        self.tracer.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_only_while_guarded() {
        let tracer = Arc::new(ExecutionTracer::default());
        tracer.called("ignored");
        {
            let _guard = TraceGuard::new(Arc::clone(&tracer));
            tracer.called("f");
            tracer.error("f", "ValueError");
        }
        assert!(!tracer.is_enabled());
        tracer.returned("ignored");
        assert_eq!(tracer.events(), vec!["Called: f", "Error in f: ValueError"]);
    }

    #[test]
    fn keeps_the_most_recent_events() {
        let tracer = ExecutionTracer::with_capacity(2);
        tracer.enable();
        for name in ["a", "b", "c"] {
            tracer.called(name);
        }
        assert_eq!(tracer.events(), vec!["Called: b", "Called: c"]);
        assert_eq!(tracer.recent(1), vec!["Called: c"]);
    }
}
