//! Ordering of the fixer's systems within `Update`.
//!
//! ```text
//! Input  →  Repair  →  Report
//! ```
//!
//! * **Input** – gate notifications and host upgrade requests.
//! * **Repair** – the repair pass over changed upgraded edges.
//! * **Report** – diagnostics that only read what the earlier phases did.

use bevy::prelude::*;

/// Configured as a chain: `Input` → `Repair` → `Report`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixerSet {
    Input,
    Repair,
    Report,
}
