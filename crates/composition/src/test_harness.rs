//! # TestNetwork: headless harness for the composition fixer
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `CompositionFixerPlugin` and
//! plays the host's part: it spawns nodes, edges and composition records,
//! pushes tool/prefab notifications and marks edges as upgraded.

use bevy::app::App;
use bevy::ecs::system::SystemState;
use bevy::prelude::*;

use crate::activation_gate::{ActiveTool, PrefabChanged, ToolChanged};
use crate::flags::CompositionFlags;
use crate::graph::{LookupMiss, NetGraph};
use crate::inspector::{describe_edge, EdgeReport, InspectEdge};
use crate::net_composition::NetCompositionData;
use crate::original_flags::{OriginalCompositionFlags, OriginalFlagsArchive};
use crate::settings::FixerSettings;
use crate::stats::FixerStats;
use crate::topology::{Composition, ConnectedEdges, Deleted, Edge, Hidden, Temp, Upgraded};
use crate::upgrade_modes::{ApplyUpgrade, UpgradeModes};
use crate::CompositionFixerPlugin;

/// A headless app with the fixer installed and an empty network.
pub struct TestNetwork {
    app: App,
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl TestNetwork {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Default settings, gate closed.
    pub fn new() -> Self {
        Self::with_settings(FixerSettings::default())
    }

    /// Insert `settings` before the plugin so it is not replaced by defaults.
    pub fn with_settings(settings: FixerSettings) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(settings);
        app.add_plugins(CompositionFixerPlugin);
        app.update();
        Self { app }
    }

    /// Select the network-edit tool with `mode` as the active prefab.
    pub fn with_gate_open(mut self, mode: &str) -> Self {
        self.open_gate(mode);
        self
    }

    // -----------------------------------------------------------------------
    // Host notifications
    // -----------------------------------------------------------------------

    pub fn select_tool(&mut self, tool: ActiveTool) {
        self.app.world_mut().send_event(ToolChanged { tool });
    }

    pub fn select_prefab(&mut self, prefab: Option<&str>) {
        self.app.world_mut().send_event(PrefabChanged {
            prefab: prefab.map(str::to_string),
        });
    }

    /// Push both notifications and run one update so the gate settles.
    pub fn open_gate(&mut self, mode: &str) {
        self.select_tool(ActiveTool::NetEdit);
        self.select_prefab(Some(mode));
        self.tick(1);
    }

    pub fn close_gate(&mut self) {
        self.select_tool(ActiveTool::Other("Bulldoze".to_string()));
        self.tick(1);
    }

    pub fn apply_upgrade(&mut self, edge: Entity, mode: &str) {
        self.app.world_mut().send_event(ApplyUpgrade {
            edge,
            mode: mode.to_string(),
        });
    }

    pub fn inspect(&mut self, edge: Entity) {
        self.app.world_mut().send_event(InspectEdge { edge });
    }

    // -----------------------------------------------------------------------
    // Network setup
    // -----------------------------------------------------------------------

    pub fn add_node(&mut self) -> Entity {
        self.app.world_mut().spawn(ConnectedEdges::default()).id()
    }

    /// Spawn an edge from `start` to `end` with its three composition
    /// records and register it in both nodes' connected-edge lists.
    pub fn add_edge(
        &mut self,
        start: Entity,
        end: Entity,
        edge_record: NetCompositionData,
        start_record: NetCompositionData,
        end_record: NetCompositionData,
    ) -> Entity {
        let world = self.app.world_mut();
        let composition = Composition {
            edge: world.spawn(edge_record).id(),
            start_node: world.spawn(start_record).id(),
            end_node: world.spawn(end_record).id(),
        };
        let edge = world.spawn((Edge { start, end }, composition)).id();
        for node in [start, end] {
            if let Some(mut connected) = world.get_mut::<ConnectedEdges>(node) {
                connected.0.push(edge);
            }
        }
        edge
    }

    /// Tag `edge` the way the host does after an upgrade.
    pub fn mark_upgraded(&mut self, edge: Entity) {
        self.app.world_mut().entity_mut(edge).insert((Upgraded, Temp));
    }

    pub fn mark_deleted(&mut self, edge: Entity) {
        self.app.world_mut().entity_mut(edge).insert(Deleted);
    }

    pub fn mark_hidden(&mut self, edge: Entity) {
        self.app.world_mut().entity_mut(edge).insert(Hidden);
    }

    /// Overwrite a record directly, as the host would.
    pub fn set_record(&mut self, handle: Entity, record: NetCompositionData) {
        self.app.world_mut().entity_mut(handle).insert(record);
    }

    /// Drop a record, as if the host has not built it yet.
    pub fn remove_record(&mut self, handle: Entity) {
        self.app
            .world_mut()
            .entity_mut(handle)
            .remove::<NetCompositionData>();
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn stats(&self) -> &FixerStats {
        self.resource::<FixerStats>()
    }

    pub fn modes(&self) -> &UpgradeModes {
        self.resource::<UpgradeModes>()
    }

    pub fn composition(&self, edge: Entity) -> Composition {
        *self
            .app
            .world()
            .get::<Composition>(edge)
            .expect("edge should have a Composition")
    }

    pub fn record(&self, handle: Entity) -> NetCompositionData {
        *self
            .app
            .world()
            .get::<NetCompositionData>(handle)
            .expect("handle should have a NetCompositionData")
    }

    pub fn edge_record(&self, edge: Entity) -> NetCompositionData {
        self.record(self.composition(edge).edge)
    }

    pub fn start_record(&self, edge: Entity) -> NetCompositionData {
        self.record(self.composition(edge).start_node)
    }

    pub fn end_record(&self, edge: Entity) -> NetCompositionData {
        self.record(self.composition(edge).end_node)
    }

    pub fn original_flags(&self, handle: Entity) -> Option<CompositionFlags> {
        self.app
            .world()
            .get::<OriginalCompositionFlags>(handle)
            .map(|o| o.flags)
    }

    /// Encode every retained original, as a host save would.
    pub fn export_originals(&self) -> Vec<u8> {
        OriginalFlagsArchive::capture(self.app.world()).to_bytes()
    }

    /// Decode and reattach saved originals. Returns the number restored.
    pub fn import_originals(&mut self, bytes: &[u8]) -> usize {
        OriginalFlagsArchive::decode_or_warn(bytes).restore(self.app.world_mut())
    }

    /// `describe_edge` against the live world.
    pub fn describe(&mut self, edge: Entity) -> Result<EdgeReport, LookupMiss> {
        let mut state: SystemState<NetGraph> = SystemState::new(self.app.world_mut());
        let graph = state.get(self.app.world());
        describe_edge(&graph, edge)
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_gate_open(&self, expected: bool) {
        let gate = self.resource::<crate::activation_gate::ActivationGate>();
        assert_eq!(
            gate.is_active(),
            expected,
            "gate state (tool {:?}, prefab {:?})",
            gate.tool(),
            gate.prefab()
        );
    }

    pub fn assert_fixes(&self, expected: u32) {
        let fixed = self.stats().totals.pairs_fixed();
        assert_eq!(fixed, expected, "expected {expected} fixes, got {fixed}");
    }
}
