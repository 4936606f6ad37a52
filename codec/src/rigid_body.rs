//! Rigid body serialization: constructor payloads and sync samples.

use bitstream::{BitReader, BitWriter};
use glam::{Quat, Vec3};
use schema::{BodyShape, ComponentKind};
use wire::Limits;
use world::{EntityId, RigidBody, SimWorld};

use crate::error::{CodecError, CodecResult};
use crate::fields::{read_quat, read_string, read_vec3, write_quat, write_string, write_vec3};
use crate::scratch::ComponentStreamSet;
use crate::Purpose;

const SHAPE_TAG_LO: u64 = 0;
const SHAPE_TAG_HI: u64 = (BodyShape::VARIANT_COUNT - 1) as u64;

/// One object's physical state as carried by sync payloads.
///
/// The rotation pair rides only for shapes whose orientation matters; its
/// absence is a presence bit on the wire, symmetric between encode and
/// decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySample {
    pub translation: Vec3,
    pub linear_velocity: Vec3,
    pub active: bool,
    pub rotation: Option<(Quat, Vec3)>,
}

/// Stages rigid-body constructor arguments into the scratch set.
pub fn stage_construction(
    set: &mut ComponentStreamSet,
    shape: &BodyShape,
    mass: f32,
    dynamic: bool,
    limits: &Limits,
) -> CodecResult<()> {
    let stream = set.stream_mut(ComponentKind::RigidBody);
    write_construction_fields(stream, shape, mass, dynamic, limits)
}

/// Encodes the live component: presence bit, then purpose-specific fields.
pub fn encode_live(
    purpose: Purpose,
    world: &SimWorld,
    id: EntityId,
    writer: &mut BitWriter,
    limits: &Limits,
) -> CodecResult<()> {
    let present = match purpose {
        Purpose::Construction => world.body(id).is_some(),
        // A sync sample needs the translation, so both components must exist.
        Purpose::Sync => world.body(id).is_some() && world.placement(id).is_some(),
    };
    if !present {
        writer.write_bit(false);
        return Ok(());
    }
    writer.write_bit(true);
    writer.align_to_byte();
    match purpose {
        Purpose::Construction => {
            let body = world.body(id).ok_or(CodecError::MissingComponent {
                entity: id,
                kind: ComponentKind::RigidBody,
            })?;
            write_construction_fields(writer, &body.shape, body.mass, body.dynamic, limits)?;
        }
        Purpose::Sync => write_sample(world, id, writer)?,
    }
    writer.align_to_byte();
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
    reader.align_to_byte()?;
    match purpose {
        Purpose::Construction => {
            let (shape, mass, dynamic) = read_construction_fields(reader, limits)?;
            if world.contains(id) {
                world.insert_body(id, RigidBody::new(shape, mass, dynamic));
            }
        }
        Purpose::Sync => {
            let sample = read_sample(reader)?;
            apply_sample(world, id, &sample);
        }
    }
    reader.align_to_byte()?;
    Ok(())
}

/// Writes one object's sync sample (no presence bit).
pub fn write_sample(world: &SimWorld, id: EntityId, writer: &mut BitWriter) -> CodecResult<()> {
    let body = world.body(id).ok_or(CodecError::MissingComponent {
        entity: id,
        kind: ComponentKind::RigidBody,
    })?;
    let placement = world.placement(id).ok_or(CodecError::MissingComponent {
        entity: id,
        kind: ComponentKind::Placement,
    })?;

    write_vec3(writer, placement.translation);
    write_vec3(writer, body.linear_velocity);
    writer.write_bit(body.active);
    if body.shape.rotation_matters() {
        writer.write_bit(true);
        write_quat(writer, placement.rotation);
        write_vec3(writer, body.angular_velocity);
    } else {
        writer.write_bit(false);
    }
    Ok(())
}

/// Reads one object's sync sample (no presence bit).
pub fn read_sample(reader: &mut BitReader<'_>) -> CodecResult<BodySample> {
    let translation = read_vec3(reader)?;
    let linear_velocity = read_vec3(reader)?;
    let active = reader.read_bit()?;
    let rotation = if reader.read_bit()? {
        let rotation = read_quat(reader)?;
        let angular_velocity = read_vec3(reader)?;
        Some((rotation, angular_velocity))
    } else {
        None
    };
    Ok(BodySample {
        translation,
        linear_velocity,
        active,
        rotation,
    })
}

/// Overwrites local state with the sample (the hard-warp path).
///
/// Missing entity or components are benign: the sample is simply dropped.
pub fn apply_sample(world: &mut SimWorld, id: EntityId, sample: &BodySample) {
    if let Some(placement) = world.placement_mut(id) {
        placement.translation = sample.translation;
        if let Some((rotation, _)) = sample.rotation {
            placement.rotation = rotation;
        }
    }
    if let Some(body) = world.body_mut(id) {
        body.linear_velocity = sample.linear_velocity;
        body.active = sample.active;
        if let Some((_, angular_velocity)) = sample.rotation {
            body.angular_velocity = angular_velocity;
        }
    }
}

fn write_construction_fields(
    writer: &mut BitWriter,
    shape: &BodyShape,
    mass: f32,
    dynamic: bool,
    limits: &Limits,
) -> CodecResult<()> {
    writer.write_ranged(u64::from(shape.tag()), SHAPE_TAG_LO, SHAPE_TAG_HI)?;
    match shape {
        BodyShape::Sphere { radius } => writer.write_f32(*radius),
        BodyShape::ConvexMesh { mesh } | BodyShape::StaticMesh { mesh } => {
            write_string(writer, mesh, limits)?;
        }
        BodyShape::Wheel { radius, width } => {
            writer.write_f32(*radius);
            writer.write_f32(*width);
        }
        BodyShape::Character { height, radius } => {
            writer.write_f32(*height);
            writer.write_f32(*radius);
        }
        _ => {
            return Err(CodecError::UnknownShapeTag { tag: shape.tag() });
        }
    }
    writer.write_f32(mass);
    writer.write_bit(dynamic);
    Ok(())
}

fn read_construction_fields(
    reader: &mut BitReader<'_>,
    limits: &Limits,
) -> CodecResult<(BodyShape, f32, bool)> {
    let tag = reader.read_ranged(SHAPE_TAG_LO, SHAPE_TAG_HI)? as u8;
    let shape = match tag {
        0 => BodyShape::Sphere {
            radius: reader.read_f32()?,
        },
        1 => BodyShape::ConvexMesh {
            mesh: read_string(reader, limits)?,
        },
        2 => BodyShape::StaticMesh {
            mesh: read_string(reader, limits)?,
        },
        3 => BodyShape::Wheel {
            radius: reader.read_f32()?,
            width: reader.read_f32()?,
        },
        4 => BodyShape::Character {
            height: reader.read_f32()?,
            radius: reader.read_f32()?,
        },
        _ => return Err(CodecError::UnknownShapeTag { tag }),
    };
    let mass = reader.read_f32()?;
    let dynamic = reader.read_bit()?;
    Ok((shape, mass, dynamic))
}
