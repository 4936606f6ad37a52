//! Renderable serialization.
//!
//! Renderables are immutable after construction, so the sync payload is
//! empty: presence alone says "this entity still has its visuals".

use bitstream::{BitReader, BitWriter};
use schema::ComponentKind;
use wire::Limits;
use world::{EntityId, Renderable, SimWorld};

use crate::error::CodecResult;
use crate::fields::{read_string, write_string};
use crate::scratch::ComponentStreamSet;
use crate::Purpose;

/// Stages renderable constructor arguments into the scratch set.
pub fn stage_construction(
    set: &mut ComponentStreamSet,
    mesh: &str,
    texture: &str,
    limits: &Limits,
) -> CodecResult<()> {
    let stream = set.stream_mut(ComponentKind::Renderable);
    write_string(stream, mesh, limits)?;
    write_string(stream, texture, limits)?;
    Ok(())
}

/// Encodes the live component: presence bit, then purpose-specific fields.
pub fn encode_live(
    purpose: Purpose,
    world: &SimWorld,
    id: EntityId,
    writer: &mut BitWriter,
    limits: &Limits,
) -> CodecResult<()> {
    match world.renderable(id) {
        Some(renderable) => {
            writer.write_bit(true);
            if purpose == Purpose::Construction {
                writer.align_to_byte();
                write_string(writer, &renderable.mesh, limits)?;
                write_string(writer, &renderable.texture, limits)?;
                writer.align_to_byte();
            }
        }
        None => writer.write_bit(false),
    }
    Ok(())
}

/// Decodes the presence bit and, when present, applies the fields.
pub fn decode_apply(
    purpose: Purpose,
    world: &mut SimWorld,
    id: EntityId,
    reader: &mut BitReader<'_>,
    limits: &Limits,
) -> CodecResult<()> {
    if !reader.read_bit()? {
        return Ok(());
    }
    if purpose == Purpose::Sync {
        return Ok(());
    }
    reader.align_to_byte()?;
    let mesh = read_string(reader, limits)?;
    let texture = read_string(reader, limits)?;
    reader.align_to_byte()?;

    if world.contains(id) {
        world.insert_renderable(id, Renderable::new(mesh, texture));
    }
    Ok(())
}
