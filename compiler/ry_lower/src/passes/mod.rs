//! The lowering passes, one module each.

mod blocks;
mod contracts;
mod declarations;
mod defer;
mod events;
mod foreign;
mod guards;
mod macros;
mod match_arms;
mod oop;
mod operators;
mod protect;
mod ranges;
mod records;
mod restore;
mod state_machines;
mod strict_typing;
mod tables;
mod try_sugar;

pub use blocks::Blocks;
pub use contracts::Contracts;
pub use declarations::Declarations;
pub use defer::Defer;
pub use events::{Events, WATCH_INTERVAL_MS};
pub use foreign::Foreign;
pub use guards::Guards;
pub use macros::Macros;
pub use match_arms::Match;
pub use oop::Oop;
pub use operators::Operators;
pub use protect::Protect;
pub use ranges::Ranges;
pub use records::Records;
pub use restore::Restore;
pub use state_machines::StateMachines;
pub use strict_typing::StrictTyping;
pub use tables::Tables;
pub use try_sugar::TrySugar;
