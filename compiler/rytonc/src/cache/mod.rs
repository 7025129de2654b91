//! Compilation cache shared by every unit a session compiles.
//!
//! Entries are keyed by the token fingerprint of the source, so two texts
//! that differ only in layout share one pipeline run. Concurrent requests
//! for the same key wait on a single `OnceLock` slot; the pipeline runs
//! once and every waiter gets the same result.

mod rebase;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use ry_diagnostic::Diagnostic;
use ry_ir::{ContentHash, SourceUnit};
use ry_lexer::TokenList;
use ry_lower::{Lowered, LoweringError};
use ry_parse::SyntaxError;
use tracing::debug;

use self::rebase::Alignment;

/// A unit taken through parsing and the lowering pipeline.
#[derive(Clone, Debug)]
pub struct Compiled {
    pub unit: SourceUnit,
    pub fingerprint: ContentHash,
    pub lowered: Lowered,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Lowering(#[from] LoweringError),
}

impl CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Syntax(e) => e.to_diagnostic(),
            CompileError::Lowering(e) => e.to_diagnostic(),
        }
    }
}

/// The unit that filled a slot, and what compiling it produced.
struct Entry {
    unit: SourceUnit,
    result: Result<Arc<Compiled>, CompileError>,
}

type Slot = Arc<OnceLock<Entry>>;

#[derive(Default)]
pub struct SourceCache {
    slots: Mutex<FxHashMap<ContentHash, Slot>>,
    invocations: AtomicUsize,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and lower `unit`, reusing an earlier run when the token
    /// stream is unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %unit.name()))]
    pub fn compile(&self, unit: &SourceUnit) -> Result<Arc<Compiled>, CompileError> {
        let tokens = ry_parse::tokenize(unit)?;
        let fingerprint = tokens.fingerprint(unit.text());
        let slot = Arc::clone(self.slots.lock().entry(fingerprint).or_default());

        let mut ran = false;
        let entry = slot.get_or_init(|| {
            ran = true;
            Entry {
                unit: unit.clone(),
                result: self.run(unit, &tokens, fingerprint).map(Arc::new),
            }
        });
        if ran {
            debug!(fingerprint = %fingerprint.to_hex(), "cache miss");
            return entry.result.clone();
        }
        debug!(fingerprint = %fingerprint.to_hex(), "cache hit");

        if entry.unit == *unit {
            return entry.result.clone();
        }
        match &entry.result {
            Ok(compiled) if compiled.unit.text() == unit.text() => Ok(Arc::new(Compiled {
                unit: unit.clone(),
                ..Compiled::clone(compiled)
            })),
            Ok(compiled) => match moved_to(compiled, unit, &tokens) {
                Some(moved) => Ok(Arc::new(moved)),
                None => self.run(unit, &tokens, fingerprint).map(Arc::new),
            },
            // Errors carry file names and positions of the unit that made
            // them.
            Err(_) => self.run(unit, &tokens, fingerprint).map(Arc::new),
        }
    }

    /// Number of times the pipeline has actually run.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Number of distinct fingerprints seen.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn run(
        &self,
        unit: &SourceUnit,
        tokens: &TokenList,
        fingerprint: ContentHash,
    ) -> Result<Compiled, CompileError> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        let tree = ry_parse::parse_tokens(tokens, unit)?;
        let lowered = ry_lower::lower(tree, unit)?;
        Ok(Compiled {
            unit: unit.clone(),
            fingerprint,
            lowered,
        })
    }
}

/// `compiled` carried over to `unit`, a re-laid-out copy of its source.
fn moved_to(compiled: &Compiled, unit: &SourceUnit, tokens: &TokenList) -> Option<Compiled> {
    let old_tokens = ry_parse::tokenize(&compiled.unit).ok()?;
    let alignment = Alignment::new(&old_tokens, compiled.unit.text(), tokens, unit.text())?;
    debug!(file = %unit.name(), "rebasing cached compilation");
    Some(Compiled {
        unit: unit.clone(),
        fingerprint: compiled.fingerprint,
        lowered: rebase::rebase(&compiled.lowered, &alignment, &compiled.unit, unit),
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
