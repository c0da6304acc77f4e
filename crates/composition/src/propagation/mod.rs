//! Walks the neighbourhood of each upgraded edge and feeds every
//! (current, connected) pair through the fixer table.

mod driver;
mod matching;
mod types;

pub use driver::EdgeRepairer;
pub use matching::flags_match;
pub use types::RepairSummary;
