//! Placement serialization.
//!
//! Construction and sync payloads are identical for placements: the full
//! transform is cheap (28 bytes) and always wanted whole.

use bitstream::{BitReader, BitWriter};
use glam::{Quat, Vec3};
use schema::ComponentKind;
use world::{EntityId, Placement, SimWorld};

use crate::error::CodecResult;
use crate::fields::{read_quat, read_vec3, write_quat, write_vec3};
use crate::scratch::ComponentStreamSet;
use crate::Purpose;

/// Stages placement constructor arguments into the scratch set.
pub fn stage_construction(set: &mut ComponentStreamSet, translation: Vec3, rotation: Quat) {
    let stream = set.stream_mut(ComponentKind::Placement);
    write_fields(stream, translation, rotation);
}

/// Encodes the live component: presence bit, then current field values.
pub fn encode_live(
    _purpose: Purpose,
    world: &SimWorld,
    id: EntityId,
    writer: &mut BitWriter,
) -> CodecResult<()> {
    match world.placement(id) {
        Some(placement) => {
            writer.write_bit(true);
            writer.align_to_byte();
            write_fields(writer, placement.translation, placement.rotation);
            writer.align_to_byte();
        }
        None => writer.write_bit(false),
    }
    Ok(())
}

/// Decodes the presence bit and, when present, applies the fields.
///
/// The payload is always fully consumed; application is skipped when the
/// entity is not live (benign staleness) so subsequent fields never drift.
pub fn decode_apply(
    purpose: Purpose,
    world: &mut SimWorld,
    id: EntityId,
    reader: &mut BitReader<'_>,
) -> CodecResult<()> {
    if !reader.read_bit()? {
        return Ok(());
    }
    reader.align_to_byte()?;
    let translation = read_vec3(reader)?;
    let rotation = read_quat(reader)?;
    reader.align_to_byte()?;

    if !world.contains(id) {
        return Ok(());
    }
    match purpose {
        Purpose::Construction => {
            world.insert_placement(id, Placement::new(translation, rotation));
        }
        Purpose::Sync => {
            if let Some(placement) = world.placement_mut(id) {
                placement.translation = translation;
                placement.rotation = rotation;
            }
        }
    }
    Ok(())
}

fn write_fields(writer: &mut BitWriter, translation: Vec3, rotation: Quat) {
    write_vec3(writer, translation);
    write_quat(writer, rotation);
}
