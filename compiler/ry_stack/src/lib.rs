//! Stack growth for recursive tree walks.
//!
//! The parser, the lowering passes and the evaluator all recurse once per
//! nesting level of the program. Deeply nested input would otherwise
//! overflow the native stack, so each recursive entry point runs through
//! [`ensure_sufficient_stack`], which allocates a new segment when fewer
//! than [`RED_ZONE`] bytes remain.

/// Grow when less than this much stack is left.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nest(depth: u32) -> u32 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        assert_eq!(nest(200_000), 200_000);
    }

    #[test]
    fn passes_results_through() {
        let ok: Result<u8, String> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(ok, Ok(7));
    }
}
