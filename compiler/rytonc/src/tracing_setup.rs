//! Log output for the driver.
//!
//! Nothing is installed unless `RYTON_LOG` is set; it takes the usual
//! `EnvFilter` directives (`RYTON_LOG=ry_resolve=debug`). With
//! `RYTON_LOG_TREE=1` spans are drawn as an indented tree instead of flat
//! lines. All output goes to stderr so program output stays clean.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: Once = Once::new();

pub const LOG_VAR: &str = "RYTON_LOG";
pub const LOG_TREE_VAR: &str = "RYTON_LOG_TREE";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    TRACING_INIT.call_once(|| {
        if std::env::var_os(LOG_VAR).is_none() {
            return;
        }
        let filter = EnvFilter::from_env(LOG_VAR);
        let tree = std::env::var(LOG_TREE_VAR).is_ok_and(|v| v == "1");
        if tree {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
