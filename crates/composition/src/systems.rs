use bevy::prelude::*;

use crate::graph::NetGraph;
use crate::propagation::EdgeRepairer;
use crate::settings::FixerSettings;
use crate::stats::FixerStats;
use crate::topology::{Deleted, Edge, Hidden, Temp, Upgraded};

/// Upgraded preview edges the host touched since the repair pass last ran.
pub type ChangedUpgradedEdges = (
    With<Edge>,
    With<Upgraded>,
    With<Temp>,
    Without<Deleted>,
    Without<Hidden>,
    Or<(Changed<Edge>, Changed<Temp>)>,
);

/// Repair every changed upgraded edge and queue the fixes.
///
/// Runs only while the activation gate is open. Change ticks are compared
/// against the last run, so edges touched while the gate was closed are
/// picked up once it opens.
pub fn repair_upgraded_edges(
    changed: Query<Entity, ChangedUpgradedEdges>,
    graph: NetGraph,
    settings: Res<FixerSettings>,
    mut stats: ResMut<FixerStats>,
    mut commands: Commands,
) {
    if changed.is_empty() {
        return;
    }

    #[cfg(feature = "trace")]
    let _span = info_span!("repair_upgraded_edges").entered();

    let mut repairer = EdgeRepairer::new(&graph).with_fix_logging(settings.log_fixes);
    for edge in &changed {
        repairer.repair_edge(edge);
    }
    let (batch, summary) = repairer.finish();
    let writes = batch.flush(&mut commands, settings.record_original_flags);
    stats.record_pass(&summary, writes);
}
