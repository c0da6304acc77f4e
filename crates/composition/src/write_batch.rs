//! Deferred record replacements.
//!
//! The driver never mutates live records. It appends replacements here and the
//! owning system flushes them into `Commands`, which the scheduler applies at
//! the next sync point, after every producer of this tick has finished.

use bevy::prelude::*;

use crate::flags::CompositionFlags;
use crate::net_composition::NetCompositionData;
use crate::original_flags::OriginalCompositionFlags;

/// One queued replacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingWrite {
    pub handle: Entity,
    pub record: NetCompositionData,
    /// Flags the host had on `handle` when the driver read it this tick.
    pub original: CompositionFlags,
}

/// Append-only write-ahead list. Later writes to the same handle win.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    writes: Vec<PendingWrite>,
}

impl WriteBatch {
    pub fn push(&mut self, handle: Entity, record: NetCompositionData, original: CompositionFlags) {
        self.writes.push(PendingWrite {
            handle,
            record,
            original,
        });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingWrite> {
        self.writes.iter()
    }

    /// The record `handle` will hold once the batch is applied.
    pub fn latest(&self, handle: Entity) -> Option<&NetCompositionData> {
        self.writes
            .iter()
            .rev()
            .find(|w| w.handle == handle)
            .map(|w| &w.record)
    }

    pub fn extend(&mut self, other: WriteBatch) {
        self.writes.extend(other.writes);
    }

    /// Queue every write as an entity command, in order. Returns the number of
    /// writes queued. Handles that are gone when the commands apply are
    /// skipped, including ones despawned earlier in the same sync point.
    pub fn flush(self, commands: &mut Commands, record_original: bool) -> usize {
        let mut queued = 0;
        for write in self.writes {
            let Some(mut entity) = commands.get_entity(write.handle) else {
                trace!("WriteBatch: {:?} is gone, dropping write", write.handle);
                continue;
            };
            entity.try_insert(write.record);
            if record_original {
                entity.try_insert_if_new(OriginalCompositionFlags::new(write.original));
            }
            queued += 1;
        }
        queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::SideFlags;

    fn record(side: SideFlags) -> NetCompositionData {
        NetCompositionData::default().with_flags(CompositionFlags::both_sides(side))
    }

    #[test]
    fn test_latest_write_wins() {
        let mut world = World::new();
        let handle = world.spawn_empty().id();
        let mut batch = WriteBatch::default();
        batch.push(handle, record(SideFlags::RAISED), CompositionFlags::EMPTY);
        batch.push(handle, record(SideFlags::LOWERED), CompositionFlags::EMPTY);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.latest(handle), Some(&record(SideFlags::LOWERED)));
    }

    #[test]
    fn test_flush_applies_in_order_and_keeps_first_original() {
        let mut world = World::new();
        let handle = world.spawn(record(SideFlags::SIDEWALK)).id();

        let mut batch = WriteBatch::default();
        batch.push(
            handle,
            record(SideFlags::RAISED),
            CompositionFlags::both_sides(SideFlags::SIDEWALK),
        );
        batch.push(
            handle,
            record(SideFlags::LOWERED),
            CompositionFlags::both_sides(SideFlags::RAISED),
        );

        let mut queue = bevy::ecs::world::CommandQueue::default();
        let queued = {
            let mut commands = Commands::new(&mut queue, &world);
            batch.flush(&mut commands, true)
        };
        queue.apply(&mut world);

        assert_eq!(queued, 2);
        assert_eq!(
            world.get::<NetCompositionData>(handle),
            Some(&record(SideFlags::LOWERED))
        );
        assert_eq!(
            world.get::<OriginalCompositionFlags>(handle).map(|o| o.flags),
            Some(CompositionFlags::both_sides(SideFlags::SIDEWALK))
        );
    }

    #[test]
    fn test_flush_without_original_tracking() {
        let mut world = World::new();
        let handle = world.spawn(record(SideFlags::SIDEWALK)).id();
        let mut batch = WriteBatch::default();
        batch.push(handle, record(SideFlags::RAISED), CompositionFlags::EMPTY);

        let mut queue = bevy::ecs::world::CommandQueue::default();
        {
            let mut commands = Commands::new(&mut queue, &world);
            batch.flush(&mut commands, false);
        }
        queue.apply(&mut world);

        assert!(world.get::<OriginalCompositionFlags>(handle).is_none());
    }

    #[test]
    fn test_flush_skips_record_despawned_before_apply() {
        let mut world = World::new();
        let handle = world.spawn(record(SideFlags::SIDEWALK)).id();
        let survivor = world.spawn(record(SideFlags::SIDEWALK)).id();
        let mut batch = WriteBatch::default();
        batch.push(handle, record(SideFlags::RAISED), CompositionFlags::EMPTY);
        batch.push(survivor, record(SideFlags::LOWERED), CompositionFlags::EMPTY);

        let mut queue = bevy::ecs::world::CommandQueue::default();
        {
            let mut commands = Commands::new(&mut queue, &world);
            assert_eq!(batch.flush(&mut commands, true), 2);
        }
        world.despawn(handle);
        queue.apply(&mut world);

        assert!(world.get::<NetCompositionData>(handle).is_none());
        assert_eq!(
            world.get::<NetCompositionData>(survivor),
            Some(&record(SideFlags::LOWERED))
        );
        assert_eq!(
            world.get::<OriginalCompositionFlags>(survivor).map(|o| o.flags),
            Some(CompositionFlags::EMPTY)
        );
    }
}
