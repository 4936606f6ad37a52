//! Entity lifecycle request assembly and message encoding.
//!
//! The request state machine lives on the synchronizer: `Idle` until a
//! request is opened, then either `OpenLocal` (offline mode created the
//! entity immediately) or `OpenStaged` (constructor arguments accumulate in
//! scratch buffers until the request is closed and sent). Decoding and
//! role-dependent handling of lifecycle messages is in the session module.

use bitstream::BitWriter;
use codec::{CodecResult, ComponentStreamSet, Purpose};
use wire::{LifecycleOp, Limits, MessageKind};
use world::{EntityId, SimWorld};

/// The creation-request state machine.
#[derive(Debug)]
pub(crate) enum RequestState {
    /// No request is open.
    Idle,
    /// Offline request: components go straight into the local world.
    OpenLocal { entity: EntityId },
    /// Networked request: components stage into scratch buffers.
    OpenStaged { set: ComponentStreamSet },
}

impl RequestState {
    pub(crate) fn is_open(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Encodes a Create request from staged scratch buffers.
///
/// The entity id field is zero: the request is unfulfilled and only the
/// server may mint a real id.
pub(crate) fn encode_create_from_staged(
    writer: &mut BitWriter,
    set: &mut ComponentStreamSet,
) -> CodecResult<()> {
    wire::write_kind(writer, MessageKind::EntityRequest);
    wire::write_op(writer, LifecycleOp::Create)?;
    writer.align_to_byte();
    writer.write_u32_aligned(EntityId::NONE.raw())?;
    codec::encode_staged(set, writer)
}

/// Encodes a fulfilled Create (real id, payload re-read from the world).
pub(crate) fn encode_create_from_world(
    writer: &mut BitWriter,
    world: &SimWorld,
    id: EntityId,
    limits: &Limits,
) -> CodecResult<()> {
    wire::write_kind(writer, MessageKind::EntityRequest);
    wire::write_op(writer, LifecycleOp::Create)?;
    writer.align_to_byte();
    writer.write_u32_aligned(id.raw())?;
    codec::encode_entity(Purpose::Construction, world, id, writer, limits)
}

/// Encodes a Destroy message naming one entity.
pub(crate) fn encode_destroy(writer: &mut BitWriter, id: EntityId) -> CodecResult<()> {
    wire::write_kind(writer, MessageKind::EntityRequest);
    wire::write_op(writer, LifecycleOp::Destroy)?;
    writer.align_to_byte();
    writer.write_u32_aligned(id.raw())?;
    Ok(())
}
