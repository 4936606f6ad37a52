//! Whole-entity encoding in the fixed component order.
//!
//! These three functions are the only places that iterate component kinds,
//! and all of them walk [`ComponentKind::ORDER`]. The same per-kind block
//! shape (presence bit, then byte-aligned fields) is produced whether the
//! payload comes from staged scratch buffers or from a live entity, so a
//! receiver cannot tell a finalized client request from a server re-encode.

use bitstream::{BitReader, BitWriter};
use schema::ComponentKind;
use wire::Limits;
use world::{EntityId, SimWorld};

use crate::error::CodecResult;
use crate::scratch::ComponentStreamSet;
use crate::{placement, renderable, rigid_body, Purpose};

/// Encodes every staged component, in order, into the main stream.
///
/// Used when finalizing an open request into an outgoing packet.
pub fn encode_staged(set: &mut ComponentStreamSet, writer: &mut BitWriter) -> CodecResult<()> {
    for kind in ComponentKind::ORDER {
        if set.is_staged(kind) {
            writer.write_bit(true);
            writer.align_to_byte();
            writer.write_bytes_aligned(set.staged_bytes(kind))?;
        } else {
            writer.write_bit(false);
        }
    }
    Ok(())
}

/// Encodes a live entity's components, in order, for the given purpose.
pub fn encode_entity(
    purpose: Purpose,
    world: &SimWorld,
    id: EntityId,
    writer: &mut BitWriter,
    limits: &Limits,
) -> CodecResult<()> {
    for kind in ComponentKind::ORDER {
        match kind {
            ComponentKind::Placement => placement::encode_live(purpose, world, id, writer)?,
            ComponentKind::RigidBody => {
                rigid_body::encode_live(purpose, world, id, writer, limits)?;
            }
            ComponentKind::Renderable => {
                renderable::encode_live(purpose, world, id, writer, limits)?;
            }
        }
    }
    Ok(())
}

/// Decodes an entity body, in order, applying each present component.
///
/// The stream is fully consumed whether or not the entity is live; a
/// missing entity makes every application a benign no-op.
pub fn decode_entity(
    purpose: Purpose,
    world: &mut SimWorld,
    id: EntityId,
    reader: &mut BitReader<'_>,
    limits: &Limits,
) -> CodecResult<()> {
    for kind in ComponentKind::ORDER {
        match kind {
            ComponentKind::Placement => placement::decode_apply(purpose, world, id, reader)?,
            ComponentKind::RigidBody => {
                rigid_body::decode_apply(purpose, world, id, reader, limits)?;
            }
            ComponentKind::Renderable => {
                renderable::decode_apply(purpose, world, id, reader, limits)?;
            }
        }
    }
    Ok(())
}
