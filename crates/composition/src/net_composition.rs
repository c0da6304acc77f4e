//! Per-edge and per-node composition records.
//!
//! The engine only ever rewrites `flags`. Every geometry field is carried over
//! untouched by copying the record and patching the flags on the copy.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::flags::{CompositionFlags, GeneralFlags, SideFlags, SideOption};

/// Geometry and flag state of one composition record.
///
/// Geometry fields are opaque to the fixer. They exist so that a rewrite can
/// be checked to preserve them bit for bit.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetCompositionData {
    pub flags: CompositionFlags,
    /// Min/max height of the piece relative to the terrain.
    pub height_range: (f32, f32),
    pub surface_height: (f32, f32),
    pub edge_heights: [f32; 4],
    pub width: f32,
    pub middle_offset: f32,
    pub width_offset: f32,
    pub node_offset: f32,
    pub roundabout_size: (f32, f32),
    pub min_lod: i32,
    pub state: u32,
}

impl NetCompositionData {
    pub fn with_flags(mut self, flags: CompositionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn has_general(&self, flag: GeneralFlags) -> bool {
        self.flags.has_general(flag)
    }

    pub fn has_side(&self, flag: SideFlags, option: SideOption) -> bool {
        self.flags.has_side(flag, option)
    }

    /// Copy of this record with `added` set and `removed` cleared.
    pub fn updated(self, added: CompositionFlags, removed: CompositionFlags) -> Self {
        let flags = self.flags.updated(added, removed);
        self.with_flags(flags)
    }

    pub fn is_dead_end(&self) -> bool {
        self.has_general(GeneralFlags::DEAD_END)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> NetCompositionData {
        NetCompositionData {
            flags: CompositionFlags::both_sides(SideFlags::LOWERED | SideFlags::LOW_TRANSITION),
            height_range: (-4.5, 0.25),
            surface_height: (-4.0, -4.0),
            edge_heights: [-4.0, -4.0, -3.5, -3.5],
            width: 16.0,
            middle_offset: 0.5,
            width_offset: 1.25,
            node_offset: 2.0,
            roundabout_size: (0.0, 0.0),
            min_lod: 3,
            state: 0b1011,
        }
    }

    #[test]
    fn test_update_preserves_geometry() {
        let record = sample_record();
        let patched = record.updated(
            CompositionFlags::general(GeneralFlags::INTERSECTION),
            CompositionFlags::both_sides(SideFlags::LOW_TRANSITION),
        );

        assert_eq!(patched.height_range, record.height_range);
        assert_eq!(patched.surface_height, record.surface_height);
        assert_eq!(patched.edge_heights, record.edge_heights);
        assert_eq!(patched.width.to_bits(), record.width.to_bits());
        assert_eq!(patched.middle_offset.to_bits(), record.middle_offset.to_bits());
        assert_eq!(patched.width_offset.to_bits(), record.width_offset.to_bits());
        assert_eq!(patched.node_offset.to_bits(), record.node_offset.to_bits());
        assert_eq!(patched.min_lod, record.min_lod);
        assert_eq!(patched.state, record.state);

        assert!(patched.has_general(GeneralFlags::INTERSECTION));
        assert!(!patched.has_side(SideFlags::LOW_TRANSITION, SideOption::Any));
        assert!(patched.has_side(SideFlags::LOWERED, SideOption::Both));
    }

    #[test]
    fn test_dead_end_reads_general_flag() {
        let mut record = sample_record();
        assert!(!record.is_dead_end());
        record.flags.general |= GeneralFlags::DEAD_END;
        assert!(record.is_dead_end());
    }
}
