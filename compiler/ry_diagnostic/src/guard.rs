//! Recursion guard for fault rendering.
//!
//! Rendering a fault can itself fault (a value's display hook, a broken
//! source map). The guard tracks whether a render is in progress and how
//! deeply renders are nested. A render started while another is in progress
//! is marked nested and gets the compact form; past the depth ceiling the
//! caller must print the terse fallback line instead of rendering at all.

use std::cell::Cell;

/// Default nesting ceiling.
pub const DEFAULT_RENDER_DEPTH: u32 = 100;

#[derive(Debug)]
pub struct RenderGuard {
    handling: Cell<bool>,
    depth: Cell<u32>,
    limit: u32,
}

impl Default for RenderGuard {
    fn default() -> Self {
        Self::with_limit(DEFAULT_RENDER_DEPTH)
    }
}

impl RenderGuard {
    pub fn with_limit(limit: u32) -> Self {
        RenderGuard {
            handling: Cell::new(false),
            depth: Cell::new(0),
            limit,
        }
    }

    pub fn is_handling(&self) -> bool {
        self.handling.get()
    }

    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    /// Begin a render. `None` means the ceiling was reached.
    pub fn enter(&self) -> Option<RenderToken<'_>> {
        if self.depth.get() >= self.limit {
            return None;
        }
        let nested = self.handling.replace(true);
        self.depth.set(self.depth.get() + 1);
        Some(RenderToken {
            guard: self,
            nested,
        })
    }

    /// The line printed instead of a panel once the ceiling is reached.
    pub fn fallback_line(kind: &str, message: &str) -> String {
        format!("error: {kind}: {message} (diagnostics unavailable)")
    }
}

/// Held for the duration of one render.
#[derive(Debug)]
pub struct RenderToken<'a> {
    guard: &'a RenderGuard,
    nested: bool,
}

impl RenderToken<'_> {
    /// True when another render was already in progress.
    pub fn is_nested(&self) -> bool {
        self.nested
    }
}

impl Drop for RenderToken<'_> {
    fn drop(&mut self) {
        self.guard.depth.set(self.guard.depth.get().saturating_sub(1));
        if !self.nested {
            self.guard.handling.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_enter_is_marked() {
        let guard = RenderGuard::default();
        let outer = guard.enter();
        assert!(outer.as_ref().is_some_and(|t| !t.is_nested()));
        {
            let inner = guard.enter();
            assert!(inner.as_ref().is_some_and(RenderToken::is_nested));
            assert_eq!(guard.depth(), 2);
        }
        assert!(guard.is_handling());
        drop(outer);
        assert!(!guard.is_handling());
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn ceiling_refuses_further_renders() {
        let guard = RenderGuard::with_limit(2);
        let a = guard.enter();
        let b = guard.enter();
        assert!(a.is_some() && b.is_some());
        assert!(guard.enter().is_none());
        drop(b);
        assert!(guard.enter().is_some());
    }

    #[test]
    fn fallback_line_is_terse() {
        assert_eq!(
            RenderGuard::fallback_line("ValueError", "bad"),
            "error: ValueError: bad (diagnostics unavailable)"
        );
    }
}
