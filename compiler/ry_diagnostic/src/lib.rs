//! Diagnostics for the Ryton pipeline.
//!
//! - [`Diagnostic`]: code, kind, message and labeled spans produced by any phase
//! - [`LocationTracker`]: maps spans (and lines of lowered output) back to the
//!   original source, provenance first, text similarity as a labeled fallback
//! - [`BlockRegistry`]: the nesting record of user-visible constructs
//! - [`Report`]: a diagnostic resolved against source and blocks, ready for an
//!   emitter (boxed terminal panel or JSON record)

mod blocks;
mod diagnostic;
pub mod emitter;
mod error_code;
mod guard;
mod location;
mod report;
pub mod similarity;
pub mod span_utils;

pub use blocks::{BlockId, BlockKind, BlockRegistry, CodeBlock};
pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guard::{RenderGuard, RenderToken, DEFAULT_RENDER_DEPTH};
pub use location::{Confidence, ContextLine, Location, LocationTracker, LoweredLine};
pub use report::{FaultRecord, Report};
