//! Periodic physics state broadcast and client-side reconciliation.

use bitstream::{BitReader, BitWriter};
use codec::{rigid_body, BodySample, CodecError};
use tracing::debug;
use wire::{LimitKind, Limits, MessageKind};
use world::{EntityId, RigidBody, SimWorld};

use crate::config::{ReconcileMode, SyncConfig};
use crate::error::{SyncError, SyncResult};

/// Whether a body belongs in the periodic network broadcast.
///
/// Passive/static bodies never move, and sleeping bodies have not moved
/// since the last broadcast; both are excluded to bound bandwidth.
#[must_use]
pub fn include_in_sync(body: &RigidBody) -> bool {
    body.dynamic && body.active
}

/// Whether a body belongs in a history snapshot.
///
/// Sleeping bodies are still recorded: a rewind must restore them exactly,
/// not forget them. Only passive/static bodies are skipped.
#[must_use]
pub fn include_in_history(body: &RigidBody) -> bool {
    body.dynamic
}

pub(crate) fn encode_sync_message(
    world: &SimWorld,
    seq: u8,
    writer: &mut BitWriter,
    limits: &Limits,
) -> Result<(), CodecError> {
    wire::write_kind(writer, MessageKind::PhysicsSync);
    writer.write_u8(seq);

    let ids: Vec<EntityId> = world
        .body_entities()
        .filter(|id| {
            world.body(*id).map_or(false, include_in_sync) && world.placement(*id).is_some()
        })
        .collect();
    if ids.len() > limits.max_entities_per_message {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::EntityCount,
            limit: limits.max_entities_per_message,
            actual: ids.len(),
        });
    }

    writer.write_varu32(ids.len() as u32)?;
    for id in ids {
        writer.align_to_byte();
        writer.write_u32_aligned(id.raw())?;
        rigid_body::write_sample(world, id, writer)?;
    }
    Ok(())
}

/// Decodes a physics-sync body (kind byte already consumed) and reconciles
/// each carried sample into the world.
///
/// Returns the message sequence number and how many samples were applied;
/// samples for unknown entities are consumed and skipped.
pub(crate) fn apply_sync_message(
    world: &mut SimWorld,
    reader: &mut BitReader<'_>,
    config: &SyncConfig,
) -> SyncResult<(u8, usize)> {
    let seq = reader.read_u8_aligned()?;
    let count = reader.read_varu32()? as usize;
    if count > config.limits.max_entities_per_message {
        return Err(SyncError::Wire(wire::DecodeError::LimitsExceeded {
            kind: LimitKind::EntityCount,
            limit: config.limits.max_entities_per_message,
            actual: count,
        }));
    }

    let mut applied = 0;
    for _ in 0..count {
        reader.align_to_byte()?;
        let id = EntityId::new(reader.read_u32_aligned()?);
        let sample = rigid_body::read_sample(reader)?;
        if !world.contains(id) {
            debug!(entity = id.raw(), "sync sample for unknown entity, skipping");
            continue;
        }
        reconcile(world, id, &sample, config);
        applied += 1;
    }

    if reader.bits_remaining() >= 8 {
        return Err(SyncError::TrailingData {
            remaining_bits: reader.bits_remaining(),
        });
    }
    Ok((seq, applied))
}

/// Folds one network sample into local state per the configured strategy.
///
/// Hard warp overwrites position outright. Smooth correction keeps the
/// locally-predicted position when the error is below the snap threshold
/// and instead nudges linear velocity by the error scaled with the
/// stiffness gain; a large error (a stall, a teleport) still hard-warps.
/// Velocity, activity, and the rotation pair always follow the network.
pub fn reconcile(world: &mut SimWorld, id: EntityId, sample: &BodySample, config: &SyncConfig) {
    match config.reconcile {
        ReconcileMode::Warp => rigid_body::apply_sample(world, id, sample),
        ReconcileMode::Smooth => {
            let Some(placement) = world.placement(id) else {
                rigid_body::apply_sample(world, id, sample);
                return;
            };
            let error = sample.translation - placement.translation;
            if error.length() >= config.snap_threshold {
                rigid_body::apply_sample(world, id, sample);
                return;
            }

            if let Some(placement) = world.placement_mut(id) {
                if let Some((rotation, _)) = sample.rotation {
                    placement.rotation = rotation;
                }
            }
            if let Some(body) = world.body_mut(id) {
                body.linear_velocity =
                    sample.linear_velocity + error * config.correction_stiffness;
                body.active = sample.active;
                if let Some((_, angular_velocity)) = sample.rotation {
                    body.angular_velocity = angular_velocity;
                }
            }
        }
    }
}
