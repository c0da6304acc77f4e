//! Keeps road composition flags consistent after network upgrades.
//!
//! When the host upgrades a road segment (quay, retaining wall, elevated,
//! tunnel) it can leave the segment's end records disagreeing with their
//! neighbours, which renders as holes in walls or stray pillars. This crate
//! watches upgraded edges, walks their neighbourhood and rewrites the
//! offending flags through deferred commands.

pub mod activation_gate;
pub mod fixer_rules;
pub mod flags;
pub mod graph;
pub mod inspector;
pub mod net_composition;
pub mod original_flags;
pub mod plugin;
pub mod propagation;
pub mod sets;
pub mod settings;
pub mod stats;
pub mod systems;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;
pub mod topology;
pub mod upgrade_modes;
pub mod write_batch;


pub use plugin::CompositionFixerPlugin;
pub use sets::FixerSet;
