use crate::net_composition::NetCompositionData;

use super::rules::FixerRule;

/// The four records a rule may read and rewrite.
///
/// For a dead-end node the connected half is a copy of the current half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixerPair {
    pub current_edge: NetCompositionData,
    pub current_node: NetCompositionData,
    pub connected_edge: NetCompositionData,
    pub connected_node: NetCompositionData,
}

impl FixerPair {
    pub fn new(
        current_edge: NetCompositionData,
        current_node: NetCompositionData,
        connected_edge: NetCompositionData,
        connected_node: NetCompositionData,
    ) -> Self {
        Self {
            current_edge,
            current_node,
            connected_edge,
            connected_node,
        }
    }

    /// A dead end has no neighbour, so it is paired with itself.
    pub fn dead_end(edge: NetCompositionData, node: NetCompositionData) -> Self {
        Self::new(edge, node, edge, node)
    }

    /// True when all four flag sets equal `other`'s. Geometry is ignored.
    pub fn same_flags(&self, other: &FixerPair) -> bool {
        self.current_edge.flags == other.current_edge.flags
            && self.current_node.flags == other.current_node.flags
            && self.connected_edge.flags == other.connected_edge.flags
            && self.connected_node.flags == other.connected_node.flags
    }
}

/// Facts about the pair computed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixerContext {
    pub is_dead_end_node: bool,
    pub flags_match: bool,
}

impl FixerContext {
    pub fn dead_end() -> Self {
        Self {
            is_dead_end_node: true,
            flags_match: false,
        }
    }

    pub fn neighbor(flags_match: bool) -> Self {
        Self {
            is_dead_end_node: false,
            flags_match,
        }
    }

    /// Unmatched neighbours are intentionally different (a road narrowing,
    /// for instance) and must never be touched.
    pub fn allows_rules(&self) -> bool {
        self.is_dead_end_node || self.flags_match
    }
}

/// Result of running the table over one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixOutcome {
    pub pair: FixerPair,
    /// The rule that changed the pair, if any.
    pub applied: Option<FixerRule>,
}

impl FixOutcome {
    pub fn unchanged(pair: FixerPair) -> Self {
        Self {
            pair,
            applied: None,
        }
    }

    pub fn applied(&self) -> bool {
        self.applied.is_some()
    }
}
