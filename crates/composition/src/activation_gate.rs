//! Decides whether the repair pass should run this tick.
//!
//! The pass only matters while the player is editing the network with one of
//! the configured upgrade modes selected. Tool and prefab changes arrive as
//! separate events and either one can open or close the gate.

use bevy::prelude::*;

use crate::settings::FixerSettings;
use crate::upgrade_modes::UpgradeModes;

/// The host tool currently in use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveTool {
    #[default]
    None,
    /// The network-edit tool that applies upgrades.
    NetEdit,
    Other(String),
}

/// The active tool changed.
#[derive(Event, Debug, Clone)]
pub struct ToolChanged {
    pub tool: ActiveTool,
}

/// The active prefab changed. `None` means nothing is selected.
#[derive(Event, Debug, Clone)]
pub struct PrefabChanged {
    pub prefab: Option<String>,
}

/// Last tool and prefab pushed by the host, plus the derived run flag.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct ActivationGate {
    tool: ActiveTool,
    prefab: Option<String>,
    active: bool,
}

impl ActivationGate {
    /// True iff `tool` is the network-edit tool and `prefab` names a
    /// configured upgrade mode.
    pub fn should_run(tool: &ActiveTool, prefab: Option<&str>, modes: &UpgradeModes) -> bool {
        *tool == ActiveTool::NetEdit && prefab.is_some_and(|id| modes.contains(id))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tool(&self) -> &ActiveTool {
        &self.tool
    }

    pub fn prefab(&self) -> Option<&str> {
        self.prefab.as_deref()
    }

    pub fn on_tool_changed(&mut self, tool: ActiveTool, modes: &UpgradeModes) -> bool {
        self.tool = tool;
        self.recompute(modes)
    }

    pub fn on_prefab_changed(&mut self, prefab: Option<String>, modes: &UpgradeModes) -> bool {
        self.prefab = prefab;
        self.recompute(modes)
    }

    /// Re-derive the run flag from the stored tool and prefab.
    pub fn recompute(&mut self, modes: &UpgradeModes) -> bool {
        let active = Self::should_run(&self.tool, self.prefab(), modes);
        if active != self.active {
            debug!(
                "Fixer gate {} (tool {:?}, prefab {:?})",
                if active { "opened" } else { "closed" },
                self.tool,
                self.prefab
            );
        }
        self.active = active;
        active
    }
}

pub fn handle_tool_changed(
    mut events: EventReader<ToolChanged>,
    mut gate: ResMut<ActivationGate>,
    modes: Res<UpgradeModes>,
) {
    for event in events.read() {
        gate.on_tool_changed(event.tool.clone(), &modes);
    }
}

pub fn handle_prefab_changed(
    mut events: EventReader<PrefabChanged>,
    mut gate: ResMut<ActivationGate>,
    modes: Res<UpgradeModes>,
) {
    for event in events.read() {
        gate.on_prefab_changed(event.prefab.clone(), &modes);
    }
}

/// A replaced mode table can change whether the current prefab counts.
pub fn refresh_gate_on_mode_change(mut gate: ResMut<ActivationGate>, modes: Res<UpgradeModes>) {
    if modes.is_changed() && !modes.is_added() {
        gate.recompute(&modes);
    }
}

/// Run condition for the repair pass.
pub fn gate_is_open(gate: Res<ActivationGate>, settings: Res<FixerSettings>) -> bool {
    settings.enabled && gate.is_active()
}
