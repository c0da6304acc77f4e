//! Host-owned network topology as seen by the fixer.
//!
//! Edges and nodes are plain entities. The fixer never spawns or despawns any
//! of them; it only reads these components and queues record replacements.

use bevy::prelude::*;

/// Directed road segment between two node entities.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub start: Entity,
    pub end: Entity,
}

impl Edge {
    pub fn node(&self, endpoint: Endpoint) -> Entity {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }
}

/// Handles of the three composition records that shape an edge.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composition {
    /// Record of the segment body.
    pub edge: Entity,
    /// Record of the node at `Edge::start`, as seen from this edge.
    pub start_node: Entity,
    /// Record of the node at `Edge::end`, as seen from this edge.
    pub end_node: Entity,
}

impl Composition {
    pub fn node_record(&self, endpoint: Endpoint) -> Entity {
        match endpoint {
            Endpoint::Start => self.start_node,
            Endpoint::End => self.end_node,
        }
    }
}

/// Edges touching a node, in host order.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectedEdges(pub Vec<Entity>);

/// Which end of an edge is being repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    pub const BOTH: [Endpoint; 2] = [Endpoint::Start, Endpoint::End];

    pub fn is_start(self) -> bool {
        self == Endpoint::Start
    }

    pub fn opposite(self) -> Self {
        match self {
            Endpoint::Start => Endpoint::End,
            Endpoint::End => Endpoint::Start,
        }
    }
}

/// The host changed this edge through an upgrade.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Upgraded;

/// The edge belongs to the tool's in-progress preview.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Temp;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Deleted;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hidden;
