//! Flags a record carried before the fixer first rewrote it.
//!
//! Attached once per record (insert-if-absent) so later rewrites never move
//! it. `OriginalFlagsArchive` carries every retained value across a save:
//! bitcode-encoded, prefixed by a format version, keyed by record entity.

use bevy::prelude::*;

use crate::flags::CompositionFlags;

/// Bump when the encoded layout changes.
pub const ORIGINAL_FLAGS_VERSION: u32 = 1;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct OriginalCompositionFlags {
    pub version: u32,
    pub flags: CompositionFlags,
}

impl OriginalCompositionFlags {
    pub fn new(flags: CompositionFlags) -> Self {
        Self {
            version: ORIGINAL_FLAGS_VERSION,
            flags,
        }
    }
}

/// One retained value and the record it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct ArchivedOriginal {
    /// `Entity::to_bits` of the composition record.
    pub record: u64,
    pub original: OriginalCompositionFlags,
}

/// Every `OriginalCompositionFlags` in a world, ready to be stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct OriginalFlagsArchive {
    pub version: u32,
    pub entries: Vec<ArchivedOriginal>,
}

impl Default for OriginalFlagsArchive {
    fn default() -> Self {
        Self {
            version: ORIGINAL_FLAGS_VERSION,
            entries: Vec::new(),
        }
    }
}

impl OriginalFlagsArchive {
    /// Collect the retained originals of `world`, ordered by record.
    pub fn capture(world: &World) -> Self {
        let mut entries: Vec<ArchivedOriginal> = world
            .iter_entities()
            .filter_map(|entity| {
                entity
                    .get::<OriginalCompositionFlags>()
                    .map(|original| ArchivedOriginal {
                        record: entity.id().to_bits(),
                        original: *original,
                    })
            })
            .collect();
        entries.sort_by_key(|e| e.record);
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    /// Decode a stored archive. Unknown versions are rejected rather than
    /// misread.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let decoded: Self =
            bitcode::decode(bytes).map_err(|e| format!("failed to decode original flags: {e}"))?;
        if decoded.version != ORIGINAL_FLAGS_VERSION {
            return Err(format!(
                "unsupported original flags version {} (expected {})",
                decoded.version, ORIGINAL_FLAGS_VERSION
            ));
        }
        Ok(decoded)
    }

    /// Like `from_bytes`, but logs and falls back to an empty archive.
    pub fn decode_or_warn(bytes: &[u8]) -> Self {
        match Self::from_bytes(bytes) {
            Ok(archive) => archive,
            Err(e) => {
                warn!("OriginalFlagsArchive: {} ({} bytes)", e, bytes.len());
                Self::default()
            }
        }
    }

    /// Reattach every entry whose record still exists, replacing whatever the
    /// record holds. Returns the number restored.
    pub fn restore(&self, world: &mut World) -> usize {
        let mut restored = 0;
        for entry in &self.entries {
            let Some(record) = Entity::try_from_bits(entry.record)
                .ok()
                .filter(|e| world.entities().contains(*e))
            else {
                trace!(
                    "OriginalFlagsArchive: record {:#x} is gone, skipping",
                    entry.record
                );
                continue;
            };
            if entry.original.version != ORIGINAL_FLAGS_VERSION {
                warn!(
                    "OriginalFlagsArchive: {record:?} has version {}, skipping",
                    entry.original.version
                );
                continue;
            }
            world.entity_mut(record).insert(entry.original);
            restored += 1;
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{GeneralFlags, SideFlags};

    fn tunnel() -> CompositionFlags {
        CompositionFlags::general(GeneralFlags::TUNNEL)
            .with_right(SideFlags::HIGH_TRANSITION | SideFlags::SIDEWALK)
    }

    #[test]
    fn test_capture_only_sees_retained_records() {
        let mut world = World::new();
        let kept = world.spawn(OriginalCompositionFlags::new(tunnel())).id();
        world.spawn_empty();

        let archive = OriginalFlagsArchive::capture(&world);
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.entries[0].record, kept.to_bits());
        assert_eq!(archive.entries[0].original.flags, tunnel());
    }

    #[test]
    fn test_bytes_restore_onto_same_records() {
        let mut world = World::new();
        let record = world.spawn(OriginalCompositionFlags::new(tunnel())).id();
        let bytes = OriginalFlagsArchive::capture(&world).to_bytes();

        world.entity_mut(record).remove::<OriginalCompositionFlags>();
        let archive = OriginalFlagsArchive::from_bytes(&bytes).unwrap();
        assert_eq!(archive.restore(&mut world), 1);
        assert_eq!(
            world.get::<OriginalCompositionFlags>(record).map(|o| o.flags),
            Some(tunnel())
        );
    }

    #[test]
    fn test_restore_skips_missing_records() {
        let mut world = World::new();
        let record = world.spawn(OriginalCompositionFlags::new(tunnel())).id();
        let archive = OriginalFlagsArchive::capture(&world);
        world.despawn(record);

        assert_eq!(archive.restore(&mut world), 0);
    }

    #[test]
    fn test_rejects_other_versions() {
        let stale = OriginalFlagsArchive {
            version: ORIGINAL_FLAGS_VERSION + 1,
            entries: Vec::new(),
        };
        let err = OriginalFlagsArchive::from_bytes(&stale.to_bytes()).unwrap_err();
        assert!(err.contains("unsupported"), "got {err}");
    }

    #[test]
    fn test_garbage_decodes_to_empty_archive() {
        assert!(OriginalFlagsArchive::decode_or_warn(&[0xFF]).is_empty());
    }
}
