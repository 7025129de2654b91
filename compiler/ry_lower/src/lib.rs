//! Lowering from Ryton surface syntax to the host form.
//!
//! A parsed [`Tree`](ry_ir::Tree) goes through a fixed [`Pipeline`] of
//! [`Pass`]es. Each pass replaces one family of surface constructs with
//! host constructs and tags what it synthesized, so diagnostics can still
//! point at the original source. Import statements are left for the
//! resolver; [`validate`] then checks that nothing but host forms remain.

mod build;
mod context;
mod error;
mod pass;
pub mod passes;
mod pipeline;
mod printer;
mod rewrite;
mod validate;

pub use context::{PassContext, ProtectTable};
pub use error::LoweringError;
pub use pass::Pass;
pub use pipeline::{lower, Lowered, Pipeline};
pub use printer::{print_host, render};
pub use validate::validate;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
