use bevy::prelude::*;

use crate::activation_gate::{
    gate_is_open, handle_prefab_changed, handle_tool_changed, refresh_gate_on_mode_change,
    ActivationGate, PrefabChanged, ToolChanged,
};
use crate::inspector::{inspect_edges, InspectEdge};
use crate::settings::FixerSettings;
use crate::sets::FixerSet;
use crate::stats::{report_fixer_stats, FixerStats};
use crate::systems::repair_upgraded_edges;
use crate::upgrade_modes::{apply_upgrades, ApplyUpgrade, UpgradeModes};

/// Registers the fixer's resources, events and systems in `Update`.
///
/// `FixerSettings` and `UpgradeModes` are only initialised if absent, so a
/// host can insert its own before adding the plugin.
pub struct CompositionFixerPlugin;

impl Plugin for CompositionFixerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FixerSettings>()
            .init_resource::<UpgradeModes>()
            .init_resource::<ActivationGate>()
            .init_resource::<FixerStats>()
            .add_event::<ToolChanged>()
            .add_event::<PrefabChanged>()
            .add_event::<ApplyUpgrade>()
            .add_event::<InspectEdge>()
            .configure_sets(
                Update,
                (FixerSet::Input, FixerSet::Repair, FixerSet::Report).chain(),
            )
            .add_systems(
                Update,
                (
                    refresh_gate_on_mode_change,
                    handle_tool_changed,
                    handle_prefab_changed,
                    apply_upgrades,
                )
                    .chain()
                    .in_set(FixerSet::Input),
            )
            .add_systems(
                Update,
                repair_upgraded_edges
                    .run_if(gate_is_open)
                    .in_set(FixerSet::Repair),
            )
            .add_systems(
                Update,
                (report_fixer_stats, inspect_edges).in_set(FixerSet::Report),
            );
    }
}
