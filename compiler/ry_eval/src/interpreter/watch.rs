//! Safe points: cancellation, deadlines and watch polling.
//!
//! A watch is a condition registered by `watch cond { body }` (and by the
//! lowered forms of `event` and `parallel`). Watches are polled at
//! statement boundaries and while sleeping, no more often than their
//! interval, and each body runs at most once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ry_ir::{Block, Expr};

use super::Interpreter;
use crate::environment::Env;
use crate::errors::{Flow, Halt};

pub(super) struct Watch {
    cond: Expr,
    body: Arc<Block>,
    env: Env,
    interval: Duration,
    next_poll: Instant,
}

impl Interpreter {
    pub(super) fn register_watch(&mut self, cond: &Expr, body: &Block, interval_ms: u64, env: &Env) {
        tracing::trace!(interval_ms, "watch registered");
        self.watches.push(Watch {
            cond: cond.clone(),
            body: Arc::new(body.clone()),
            env: env.clone(),
            interval: Duration::from_millis(interval_ms),
            next_poll: Instant::now(),
        });
    }

    /// Check for cancellation and an expired deadline, then poll due
    /// watches.
    pub(crate) fn safe_point(&mut self) -> Result<(), Flow> {
        if self.cancel.is_cancelled() {
            return Err(Flow::Halt(Halt::Cancelled));
        }
        if let Some(limit) = self.timeout {
            if self.started.elapsed() > limit {
                return Err(Flow::Halt(Halt::TimedOut(limit)));
            }
        }
        self.poll_watches(false)
    }

    /// Poll watches that are due, or every watch when `all` is set.
    fn poll_watches(&mut self, all: bool) -> Result<(), Flow> {
        if self.polling || self.watches.is_empty() {
            return Ok(());
        }
        self.polling = true;
        let result = self.poll_pending(all);
        self.polling = false;
        result
    }

    fn poll_pending(&mut self, all: bool) -> Result<(), Flow> {
        let now = Instant::now();
        let pending = std::mem::take(&mut self.watches);
        let mut kept = Vec::with_capacity(pending.len());
        let mut pending = pending.into_iter();
        let mut outcome = Ok(());
        for mut watch in pending.by_ref() {
            if !all && watch.next_poll > now {
                kept.push(watch);
                continue;
            }
            match self.fire(&watch) {
                Ok(true) => {}
                Ok(false) => {
                    watch.next_poll = now + watch.interval;
                    kept.push(watch);
                }
                Err(flow) => {
                    outcome = Err(flow);
                    break;
                }
            }
        }
        kept.extend(pending);
        // Watches registered by a body go after the ones already waiting.
        kept.append(&mut self.watches);
        self.watches = kept;
        outcome
    }

    /// Evaluate a watch; run its body and report `true` when it held.
    fn fire(&mut self, watch: &Watch) -> Result<bool, Flow> {
        if !self.eval(&watch.cond, &watch.env)?.is_truthy() {
            return Ok(false);
        }
        tracing::trace!("watch fired");
        self.exec_block(&watch.body, &watch.env)?;
        Ok(true)
    }

    /// Poll every remaining watch once, including ones registered while
    /// doing so. Watches that never held are dropped.
    pub(super) fn drain_watches(&mut self) -> Result<(), Flow> {
        self.polling = true;
        let result = self.drain_pending();
        self.polling = false;
        self.watches.clear();
        result
    }

    fn drain_pending(&mut self) -> Result<(), Flow> {
        loop {
            let batch = std::mem::take(&mut self.watches);
            if batch.is_empty() {
                return Ok(());
            }
            for watch in &batch {
                if !self.fire(watch)? {
                    tracing::debug!("watch never held");
                }
            }
        }
    }

    /// Sleep for `duration`, staying responsive to watches and
    /// cancellation.
    pub(crate) fn sleep(&mut self, duration: Duration) -> Result<(), Flow> {
        const SLICE: Duration = Duration::from_millis(10);
        let end = Instant::now() + duration;
        loop {
            self.safe_point()?;
            let now = Instant::now();
            if now >= end {
                return Ok(());
            }
            std::thread::sleep((end - now).min(SLICE));
        }
    }
}
