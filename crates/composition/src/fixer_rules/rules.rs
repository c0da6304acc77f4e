use crate::flags::{CompositionFlags, GeneralFlags, SideFlags, SideOption};

use super::types::{FixerContext, FixerPair};

const LOW_TRANSITION_BOTH: CompositionFlags =
    CompositionFlags::both_sides(SideFlags::LOW_TRANSITION);
const HIGH_TRANSITION_BOTH: CompositionFlags =
    CompositionFlags::both_sides(SideFlags::HIGH_TRANSITION);
const RAISED_SIDEWALK_BOTH: CompositionFlags =
    CompositionFlags::both_sides(SideFlags::SIDEWALK.union(SideFlags::RAISED));
const INTERSECTION: CompositionFlags = CompositionFlags::general(GeneralFlags::INTERSECTION);

/// One known defect pattern. Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixerRule {
    /// Holes in retaining walls at a dead end lowered on both sides.
    DeadEndRetainingWalls,
    /// Holes in retaining walls where lowered pieces meet.
    LoweredRetainingWalls,
    /// Holes where two tunnel pieces meet.
    ConnectedTunnels,
    /// Spurious pillars where a raised piece meets an elevated one.
    PillarsRaisedElevated,
    /// Broken raised roundabout approaches.
    RaisedRoundabouts,
}

impl FixerRule {
    pub const ORDERED: [FixerRule; 5] = [
        FixerRule::DeadEndRetainingWalls,
        FixerRule::LoweredRetainingWalls,
        FixerRule::ConnectedTunnels,
        FixerRule::PillarsRaisedElevated,
        FixerRule::RaisedRoundabouts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FixerRule::DeadEndRetainingWalls => "DeadEndRetainingWalls",
            FixerRule::LoweredRetainingWalls => "LoweredRetainingWalls",
            FixerRule::ConnectedTunnels => "ConnectedTunnels",
            FixerRule::PillarsRaisedElevated => "PillarsRaisedElevated",
            FixerRule::RaisedRoundabouts => "RaisedRoundabouts",
        }
    }

    /// Position in `ORDERED`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this rule claims the pair.
    ///
    /// Only the dead-end rule ignores `flags_match`.
    pub fn precondition(self, pair: &FixerPair, ctx: FixerContext) -> bool {
        let current = &pair.current_node;
        let connected = &pair.connected_node;
        match self {
            FixerRule::DeadEndRetainingWalls => {
                ctx.is_dead_end_node && current.has_side(SideFlags::LOWERED, SideOption::Both)
            }
            FixerRule::LoweredRetainingWalls => {
                ctx.flags_match
                    && (current.has_side(SideFlags::LOWERED, SideOption::Any)
                        || connected.has_side(SideFlags::LOWERED, SideOption::Any))
            }
            FixerRule::ConnectedTunnels => {
                ctx.flags_match
                    && current.has_general(GeneralFlags::TUNNEL)
                    && connected.has_general(GeneralFlags::TUNNEL)
            }
            FixerRule::PillarsRaisedElevated => {
                ctx.flags_match
                    && current.has_side(SideFlags::RAISED, SideOption::Any)
                    && connected.has_general(GeneralFlags::ELEVATED)
            }
            FixerRule::RaisedRoundabouts => {
                ctx.flags_match
                    && current.has_side(SideFlags::RAISED, SideOption::Any)
                    && connected.has_side(SideFlags::RAISED, SideOption::Any)
                    && (current.has_general(GeneralFlags::ROUNDABOUT)
                        || connected.has_general(GeneralFlags::ROUNDABOUT))
            }
        }
    }

    /// The rule's mutation. Does not check the precondition.
    pub fn apply(self, pair: FixerPair) -> FixerPair {
        let mut out = pair;
        match self {
            FixerRule::DeadEndRetainingWalls => {
                out.current_node = out
                    .current_node
                    .updated(CompositionFlags::EMPTY, LOW_TRANSITION_BOTH);
            }
            FixerRule::LoweredRetainingWalls => {
                out.current_node = out.current_node.updated(INTERSECTION, LOW_TRANSITION_BOTH);
                out.connected_node = out
                    .connected_node
                    .updated(INTERSECTION, LOW_TRANSITION_BOTH);
            }
            FixerRule::ConnectedTunnels => {
                out.current_node = out
                    .current_node
                    .updated(CompositionFlags::EMPTY, HIGH_TRANSITION_BOTH);
                out.connected_node = out
                    .connected_node
                    .updated(CompositionFlags::EMPTY, HIGH_TRANSITION_BOTH);
            }
            FixerRule::PillarsRaisedElevated => {
                out.current_node = out
                    .current_node
                    .updated(LOW_TRANSITION_BOTH, CompositionFlags::EMPTY);
                out.connected_node = out
                    .connected_node
                    .updated(LOW_TRANSITION_BOTH, CompositionFlags::EMPTY);
            }
            FixerRule::RaisedRoundabouts => {
                out.current_node = out
                    .current_node
                    .updated(RAISED_SIDEWALK_BOTH, LOW_TRANSITION_BOTH);
                out.connected_node = out
                    .connected_node
                    .updated(RAISED_SIDEWALK_BOTH, LOW_TRANSITION_BOTH);
            }
        }
        out
    }
}
