//! Fixed-capacity history of physics snapshots for rewind.

use std::collections::VecDeque;

use bitstream::{BitReader, BitWriter};
use codec::{rigid_body, CodecResult};
use world::{EntityId, SimWorld};

use crate::error::SyncResult;
use crate::physics::include_in_history;

/// One captured snapshot: a wrapping sequence tag plus the serialized body
/// samples of every recorded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicsSnapshot {
    pub seq: u8,
    pub bytes: Vec<u8>,
}

/// A fixed-capacity FIFO of [`PhysicsSnapshot`]s.
///
/// Inserting past capacity evicts the oldest entry. Sequence numbers wrap
/// at 8 bits, so "is this sequence still present" is a validity question
/// ([`contains_seq`](Self::contains_seq)), never a bounds check. The ring
/// only guarantees retention and faithful re-application; deciding *when*
/// to rewind belongs to the caller.
#[derive(Debug)]
pub struct SnapshotHistory {
    entries: VecDeque<PhysicsSnapshot>,
    capacity: usize,
    next_seq: u8,
    writer: BitWriter,
}

impl SnapshotHistory {
    /// Creates an empty history retaining at most `capacity` snapshots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
            writer: BitWriter::new(),
        }
    }

    /// Maximum number of retained snapshots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no snapshot is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a snapshot with this sequence number is retained.
    #[must_use]
    pub fn contains_seq(&self, seq: u8) -> bool {
        self.entries.iter().any(|snapshot| snapshot.seq == seq)
    }

    /// Sequence number of the newest retained snapshot.
    #[must_use]
    pub fn latest_seq(&self) -> Option<u8> {
        self.entries.back().map(|snapshot| snapshot.seq)
    }

    /// Captures every history-included body (sleeping ones too) and pushes
    /// the snapshot, evicting the oldest if the ring is full.
    ///
    /// Returns the sequence number assigned to the capture.
    pub fn capture(&mut self, world: &SimWorld) -> CodecResult<u8> {
        let ids: Vec<EntityId> = world
            .body_entities()
            .filter(|id| {
                world.body(*id).map_or(false, include_in_history) && world.placement(*id).is_some()
            })
            .collect();

        self.writer.reset();
        self.writer.write_varu32(ids.len() as u32)?;
        for id in ids {
            self.writer.align_to_byte();
            self.writer.write_u32_aligned(id.raw())?;
            rigid_body::write_sample(world, id, &mut self.writer)?;
        }
        let bytes = self.writer.finish().to_vec();

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(PhysicsSnapshot { seq, bytes });
        Ok(seq)
    }

    /// Pops the oldest retained snapshot and re-applies it to the world.
    ///
    /// Application is the hard path: every recorded sample overwrites local
    /// state, with no reconciliation and no activity exclusion. Returns the
    /// applied snapshot's sequence number, or `None` when the ring is
    /// empty.
    pub fn rewind(&mut self, world: &mut SimWorld) -> SyncResult<Option<u8>> {
        let Some(snapshot) = self.entries.pop_front() else {
            return Ok(None);
        };

        let mut reader = BitReader::new(&snapshot.bytes);
        let count = reader.read_varu32()?;
        for _ in 0..count {
            reader.align_to_byte()?;
            let id = EntityId::new(reader.read_u32_aligned()?);
            let sample = rigid_body::read_sample(&mut reader)?;
            rigid_body::apply_sample(world, id, &sample);
        }
        Ok(Some(snapshot.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use schema::BodyShape;
    use world::{Placement, RigidBody};

    fn world_with_bodies() -> (SimWorld, EntityId, EntityId) {
        let mut world = SimWorld::new();

        let awake = world.spawn();
        world.insert_placement(awake, Placement::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY));
        world.insert_body(
            awake,
            RigidBody::new(BodyShape::Sphere { radius: 0.5 }, 1.0, true),
        );

        let sleeping = world.spawn();
        world.insert_placement(
            sleeping,
            Placement::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY),
        );
        let mut body = RigidBody::new(BodyShape::Sphere { radius: 0.5 }, 1.0, true);
        body.active = false;
        world.insert_body(sleeping, body);

        (world, awake, sleeping)
    }

    #[test]
    fn capture_assigns_wrapping_sequence_numbers() {
        let (world, _, _) = world_with_bodies();
        let mut history = SnapshotHistory::new(4);

        assert_eq!(history.capture(&world).unwrap(), 0);
        assert_eq!(history.capture(&world).unwrap(), 1);
        assert_eq!(history.latest_seq(), Some(1));
        assert!(history.contains_seq(0));
        assert!(!history.contains_seq(7));
    }

    #[test]
    fn capture_records_sleeping_bodies() {
        let (mut world, _, sleeping) = world_with_bodies();
        let mut history = SnapshotHistory::new(4);
        history.capture(&world).unwrap();

        // Move the sleeping body; a rewind must restore it.
        world.placement_mut(sleeping).unwrap().translation = Vec3::new(99.0, 0.0, 0.0);
        history.rewind(&mut world).unwrap();
        assert_eq!(
            world.placement(sleeping).unwrap().translation,
            Vec3::new(2.0, 0.0, 0.0)
        );
    }

    #[test]
    fn eviction_keeps_exactly_capacity() {
        let (world, _, _) = world_with_bodies();
        let capacity = 4;
        let extra = 3;
        let mut history = SnapshotHistory::new(capacity);

        for _ in 0..capacity + extra {
            history.capture(&world).unwrap();
        }

        assert_eq!(history.len(), capacity);
        // The oldest `extra` sequence numbers are gone.
        for seq in 0..extra as u8 {
            assert!(!history.contains_seq(seq));
        }
        for seq in extra as u8..(capacity + extra) as u8 {
            assert!(history.contains_seq(seq));
        }
    }

    #[test]
    fn rewind_consumes_oldest_first() {
        let (mut world, awake, _) = world_with_bodies();
        let mut history = SnapshotHistory::new(4);

        history.capture(&world).unwrap();
        world.placement_mut(awake).unwrap().translation = Vec3::new(50.0, 0.0, 0.0);
        history.capture(&world).unwrap();

        let seq = history.rewind(&mut world).unwrap();
        assert_eq!(seq, Some(0));
        assert_eq!(
            world.placement(awake).unwrap().translation,
            Vec3::new(1.0, 0.0, 0.0)
        );
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn rewind_on_empty_history_is_none() {
        let mut world = SimWorld::new();
        let mut history = SnapshotHistory::new(4);
        assert_eq!(history.rewind(&mut world).unwrap(), None);
    }

    #[test]
    fn sequence_wraps_at_eight_bits() {
        let (world, _, _) = world_with_bodies();
        let mut history = SnapshotHistory::new(2);

        for _ in 0..=u8::MAX {
            history.capture(&world).unwrap();
        }
        assert_eq!(history.capture(&world).unwrap(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let history = SnapshotHistory::new(0);
        assert_eq!(history.capacity(), 1);
    }
}
