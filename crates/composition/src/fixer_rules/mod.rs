//! Ordered table of known-bad flag combinations and their repairs.
//!
//! Each rule inspects one (current, connected) pair of composition records.
//! Rules are tried in table order and the first whose precondition holds
//! decides the outcome for that pair.

mod pipeline;
mod rules;
mod types;

pub use pipeline::run_fixers;
pub use rules::FixerRule;
pub use types::{FixOutcome, FixerContext, FixerPair};
