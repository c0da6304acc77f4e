//! Read-only access to host topology and composition records.

use std::fmt;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::net_composition::NetCompositionData;
use crate::original_flags::OriginalCompositionFlags;
use crate::topology::{Composition, ConnectedEdges, Edge};

/// Lookups the propagation driver needs from the host.
///
/// Implementations must be side-effect free; the driver may call them from
/// several workers at once.
pub trait GraphAccessor {
    fn edge(&self, edge: Entity) -> Option<Edge>;

    fn composition(&self, edge: Entity) -> Option<Composition>;

    fn record(&self, handle: Entity) -> Option<NetCompositionData>;

    /// Edges touching `node`. Empty when the node has no buffer.
    fn connected_edges(&self, node: Entity) -> &[Entity];

    /// Flags the host produced before the fixer first rewrote `handle`, if
    /// they were kept.
    fn original_flags(&self, _handle: Entity) -> Option<OriginalCompositionFlags> {
        None
    }

    fn require_edge(&self, edge: Entity) -> Result<Edge, LookupMiss> {
        self.edge(edge).ok_or(LookupMiss::Edge(edge))
    }

    fn require_composition(&self, edge: Entity) -> Result<Composition, LookupMiss> {
        self.composition(edge).ok_or(LookupMiss::Composition(edge))
    }

    fn require_record(&self, handle: Entity) -> Result<NetCompositionData, LookupMiss> {
        self.record(handle).ok_or(LookupMiss::Record(handle))
    }
}

/// A lookup that found nothing. Expected while the host is still building
/// data for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMiss {
    Edge(Entity),
    Composition(Entity),
    Record(Entity),
}

impl fmt::Display for LookupMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMiss::Edge(e) => write!(f, "no Edge on {e:?}"),
            LookupMiss::Composition(e) => write!(f, "no Composition on edge {e:?}"),
            LookupMiss::Record(e) => write!(f, "no NetCompositionData on {e:?}"),
        }
    }
}

/// ECS-backed accessor used by the fixer systems.
#[derive(SystemParam)]
pub struct NetGraph<'w, 's> {
    edges: Query<'w, 's, &'static Edge>,
    compositions: Query<'w, 's, &'static Composition>,
    records: Query<'w, 's, &'static NetCompositionData>,
    connected: Query<'w, 's, &'static ConnectedEdges>,
    originals: Query<'w, 's, &'static OriginalCompositionFlags>,
}

impl GraphAccessor for NetGraph<'_, '_> {
    fn edge(&self, edge: Entity) -> Option<Edge> {
        self.edges.get(edge).ok().copied()
    }

    fn composition(&self, edge: Entity) -> Option<Composition> {
        self.compositions.get(edge).ok().copied()
    }

    fn record(&self, handle: Entity) -> Option<NetCompositionData> {
        self.records.get(handle).ok().copied()
    }

    fn connected_edges(&self, node: Entity) -> &[Entity] {
        match self.connected.get(node) {
            Ok(connected) => connected.0.as_slice(),
            Err(_) => &[],
        }
    }

    fn original_flags(&self, handle: Entity) -> Option<OriginalCompositionFlags> {
        self.originals.get(handle).ok().copied()
    }
}

/// Plain in-memory accessor for driver tests and benches.
#[cfg(any(test, feature = "bench"))]
#[derive(Default, Debug, Clone)]
pub struct MemoryGraph {
    pub edges: std::collections::HashMap<Entity, Edge>,
    pub compositions: std::collections::HashMap<Entity, Composition>,
    pub records: std::collections::HashMap<Entity, NetCompositionData>,
    pub connected: std::collections::HashMap<Entity, Vec<Entity>>,
    pub originals: std::collections::HashMap<Entity, OriginalCompositionFlags>,
    next_index: u32,
}

#[cfg(any(test, feature = "bench"))]
impl MemoryGraph {
    fn allocate(&mut self) -> Entity {
        self.next_index += 1;
        Entity::from_raw(self.next_index)
    }

    pub fn add_node(&mut self) -> Entity {
        let node = self.allocate();
        self.connected.insert(node, Vec::new());
        node
    }

    /// Add an edge with its own record and one record per endpoint.
    /// Returns the edge handle.
    pub fn add_edge(
        &mut self,
        start: Entity,
        end: Entity,
        edge_record: NetCompositionData,
        start_record: NetCompositionData,
        end_record: NetCompositionData,
    ) -> Entity {
        let edge = self.allocate();
        let comp = Composition {
            edge: self.allocate(),
            start_node: self.allocate(),
            end_node: self.allocate(),
        };
        self.records.insert(comp.edge, edge_record);
        self.records.insert(comp.start_node, start_record);
        self.records.insert(comp.end_node, end_record);
        self.edges.insert(edge, Edge { start, end });
        self.compositions.insert(edge, comp);
        self.connected.entry(start).or_default().push(edge);
        self.connected.entry(end).or_default().push(edge);
        edge
    }
}

#[cfg(any(test, feature = "bench"))]
impl GraphAccessor for MemoryGraph {
    fn edge(&self, edge: Entity) -> Option<Edge> {
        self.edges.get(&edge).copied()
    }

    fn composition(&self, edge: Entity) -> Option<Composition> {
        self.compositions.get(&edge).copied()
    }

    fn record(&self, handle: Entity) -> Option<NetCompositionData> {
        self.records.get(&handle).copied()
    }

    fn connected_edges(&self, node: Entity) -> &[Entity] {
        self.connected.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    fn original_flags(&self, handle: Entity) -> Option<OriginalCompositionFlags> {
        self.originals.get(&handle).copied()
    }
}
