//! User-selectable upgrade modes and the host-side shim that applies them.
//!
//! A mode names the flags to set and clear on a road segment. Applying one
//! patches the edge record and both endpoint records, then marks the edge
//! `Upgraded + Temp` so the fixer picks it up on the same tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::flags::{CompositionFlags, GeneralFlags, SideFlags};
use crate::graph::{GraphAccessor, NetGraph};
use crate::topology::{Temp, Upgraded};
use crate::write_batch::WriteBatch;

const SURFACE_DETAIL: SideFlags = SideFlags::WIDE_SIDEWALK.union(SideFlags::PRIMARY_BEAUTIFICATION);
const GRADE: SideFlags = SideFlags::RAISED.union(SideFlags::LOWERED);

/// One named upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeMode {
    pub id: String,
    pub set: CompositionFlags,
    pub unset: CompositionFlags,
    /// Whether the mode may be used on a segment that is already a tunnel.
    #[serde(default)]
    pub underground: bool,
}

impl UpgradeMode {
    pub fn new(id: &str, set: CompositionFlags, unset: CompositionFlags) -> Self {
        Self {
            id: id.to_string(),
            set,
            unset,
            underground: false,
        }
    }

    pub fn underground(mut self) -> Self {
        self.underground = true;
        self
    }

    /// `flags` with this mode's set/unset groups applied.
    pub fn apply(&self, flags: CompositionFlags) -> CompositionFlags {
        flags.updated(self.set, self.unset)
    }

    /// Tunnels only accept underground modes.
    pub fn usable_on(&self, flags: CompositionFlags) -> bool {
        self.underground || !flags.has_general(GeneralFlags::TUNNEL)
    }
}

/// The configured upgrade modes, looked up by id.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeModes {
    pub modes: Vec<UpgradeMode>,
}

impl Default for UpgradeModes {
    fn default() -> Self {
        Self {
            modes: vec![
                UpgradeMode::new(
                    "Quay",
                    CompositionFlags::EMPTY.with_right(SideFlags::RAISED),
                    CompositionFlags::general(GeneralFlags::ELEVATED)
                        .with_right(SURFACE_DETAIL.union(SideFlags::LOWERED)),
                ),
                UpgradeMode::new(
                    "RetainingWall",
                    CompositionFlags::EMPTY.with_right(SideFlags::LOWERED),
                    CompositionFlags::general(GeneralFlags::ELEVATED)
                        .with_right(SURFACE_DETAIL.union(SideFlags::RAISED)),
                ),
                UpgradeMode::new(
                    "Elevated",
                    CompositionFlags::general(GeneralFlags::ELEVATED),
                    CompositionFlags::both_sides(SURFACE_DETAIL.union(GRADE)),
                ),
                UpgradeMode::new(
                    "Tunnel",
                    CompositionFlags::general(GeneralFlags::TUNNEL),
                    CompositionFlags::both_sides(SURFACE_DETAIL.union(GRADE)),
                )
                .underground(),
            ],
        }
    }
}

impl UpgradeModes {
    pub fn get(&self, id: &str) -> Option<&UpgradeMode> {
        self.modes.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(|m| m.id.as_str())
    }
}

/// Request to apply the mode named `mode` to `edge`.
#[derive(Event, Debug, Clone)]
pub struct ApplyUpgrade {
    pub edge: Entity,
    pub mode: String,
}

/// Build the writes that apply `mode` to the edge record and both endpoint
/// records of `edge`.
pub fn plan_upgrade<G: GraphAccessor>(
    graph: &G,
    edge: Entity,
    mode: &UpgradeMode,
) -> Result<WriteBatch, &'static str> {
    let composition = graph.composition(edge).ok_or("Edge has no composition")?;
    let edge_record = graph
        .record(composition.edge)
        .ok_or("Edge composition record not found")?;
    if !mode.usable_on(edge_record.flags) {
        return Err("Mode cannot be used on a tunnel");
    }

    let mut batch = WriteBatch::default();
    for handle in [composition.edge, composition.start_node, composition.end_node] {
        let record = graph
            .record(handle)
            .ok_or("Node composition record not found")?;
        batch.push(handle, record.with_flags(mode.apply(record.flags)), record.flags);
    }
    Ok(batch)
}

/// Applies queued `ApplyUpgrade` requests.
pub fn apply_upgrades(
    mut events: EventReader<ApplyUpgrade>,
    modes: Res<UpgradeModes>,
    graph: NetGraph,
    mut commands: Commands,
) {
    for request in events.read() {
        let Some(mode) = modes.get(&request.mode) else {
            warn!("Unknown upgrade mode {:?} for {:?}", request.mode, request.edge);
            continue;
        };
        match plan_upgrade(&graph, request.edge, mode) {
            Ok(batch) => {
                batch.flush(&mut commands, false);
                if let Some(mut entity) = commands.get_entity(request.edge) {
                    entity.try_insert((Upgraded, Temp));
                }
                debug!("Applied upgrade {} to {:?}", mode.id, request.edge);
            }
            Err(reason) => {
                debug!(
                    "Upgrade {} on {:?} skipped: {reason}",
                    mode.id, request.edge
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::SideOption;
    use crate::graph::MemoryGraph;
    use crate::net_composition::NetCompositionData;

    #[test]
    fn test_default_table_has_four_modes() {
        let modes = UpgradeModes::default();
        assert_eq!(
            modes.ids().collect::<Vec<_>>(),
            vec!["Quay", "RetainingWall", "Elevated", "Tunnel"]
        );
        assert!(modes.contains("Tunnel"));
        assert!(!modes.contains("Bridge"));
        assert!(modes.get("Tunnel").is_some_and(|m| m.underground));
        assert!(modes.get("Quay").is_some_and(|m| !m.underground));
    }

    #[test]
    fn test_quay_raises_right_side_only() {
        let modes = UpgradeModes::default();
        let quay = modes.get("Quay").unwrap();
        let before = CompositionFlags::general(GeneralFlags::ELEVATED)
            .with_left(SideFlags::SIDEWALK)
            .with_right(SideFlags::LOWERED | SideFlags::WIDE_SIDEWALK);

        let after = quay.apply(before);
        assert!(!after.has_general(GeneralFlags::ELEVATED));
        assert_eq!(after.left, SideFlags::SIDEWALK);
        assert_eq!(after.right, SideFlags::RAISED);
    }

    #[test]
    fn test_elevated_clears_grade_on_both_sides() {
        let modes = UpgradeModes::default();
        let elevated = modes.get("Elevated").unwrap();
        let after = elevated.apply(
            CompositionFlags::EMPTY
                .with_left(SideFlags::RAISED | SideFlags::SIDEWALK)
                .with_right(SideFlags::LOWERED),
        );
        assert!(after.has_general(GeneralFlags::ELEVATED));
        assert!(!after.has_side(SideFlags::RAISED, SideOption::Any));
        assert!(!after.has_side(SideFlags::LOWERED, SideOption::Any));
        assert!(after.has_side(SideFlags::SIDEWALK, SideOption::Left));
    }

    #[test]
    fn test_tunnels_only_take_underground_modes() {
        let modes = UpgradeModes::default();
        let tunnel = CompositionFlags::general(GeneralFlags::TUNNEL);
        assert!(modes.get("Tunnel").unwrap().usable_on(tunnel));
        assert!(!modes.get("RetainingWall").unwrap().usable_on(tunnel));
        assert!(modes
            .get("RetainingWall")
            .unwrap()
            .usable_on(CompositionFlags::EMPTY));
    }

    #[test]
    fn test_table_round_trips_through_json() {
        let modes = UpgradeModes::default();
        let json = serde_json::to_string(&modes).expect("serialize");
        let back: UpgradeModes = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, modes);
    }

    #[test]
    fn test_plan_upgrade_patches_all_three_records() {
        let mut graph = MemoryGraph::default();
        let a = graph.add_node();
        let b = graph.add_node();
        let record = NetCompositionData {
            width: 10.0,
            ..Default::default()
        };
        let edge = graph.add_edge(a, b, record, record, record);
        let modes = UpgradeModes::default();

        let batch = plan_upgrade(&graph, edge, modes.get("RetainingWall").unwrap()).unwrap();
        assert_eq!(batch.len(), 3);
        for write in batch.iter() {
            assert!(write.record.has_side(SideFlags::LOWERED, SideOption::Right));
            assert_eq!(write.record.width, 10.0);
            assert_eq!(write.original, CompositionFlags::EMPTY);
        }
    }

    #[test]
    fn test_plan_upgrade_refuses_surface_mode_on_tunnel() {
        let mut graph = MemoryGraph::default();
        let a = graph.add_node();
        let b = graph.add_node();
        let tunnel =
            NetCompositionData::default().with_flags(CompositionFlags::general(GeneralFlags::TUNNEL));
        let edge = graph.add_edge(a, b, tunnel, tunnel, tunnel);
        let modes = UpgradeModes::default();

        assert!(plan_upgrade(&graph, edge, modes.get("Quay").unwrap()).is_err());
        assert!(plan_upgrade(&graph, Entity::from_raw(77), modes.get("Quay").unwrap()).is_err());
    }
}
