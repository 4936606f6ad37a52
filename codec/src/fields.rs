//! Shared field encoders for vectors, quaternions, and strings.

use bitstream::{BitReader, BitResult, BitWriter};
use glam::{Quat, Vec3};
use wire::{LimitKind, Limits};

use crate::error::{CodecError, CodecResult};

pub(crate) fn write_vec3(writer: &mut BitWriter, value: Vec3) {
    writer.write_f32(value.x);
    writer.write_f32(value.y);
    writer.write_f32(value.z);
}

pub(crate) fn read_vec3(reader: &mut BitReader<'_>) -> BitResult<Vec3> {
    Ok(Vec3::new(
        reader.read_f32()?,
        reader.read_f32()?,
        reader.read_f32()?,
    ))
}

pub(crate) fn write_quat(writer: &mut BitWriter, value: Quat) {
    writer.write_f32(value.x);
    writer.write_f32(value.y);
    writer.write_f32(value.z);
    writer.write_f32(value.w);
}

pub(crate) fn read_quat(reader: &mut BitReader<'_>) -> BitResult<Quat> {
    Ok(Quat::from_xyzw(
        reader.read_f32()?,
        reader.read_f32()?,
        reader.read_f32()?,
        reader.read_f32()?,
    ))
}

/// Writes a length-prefixed UTF-8 string at the next byte boundary.
pub(crate) fn write_string(
    writer: &mut BitWriter,
    value: &str,
    limits: &Limits,
) -> CodecResult<()> {
    if value.len() > limits.max_string_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::StringBytes,
            limit: limits.max_string_bytes,
            actual: value.len(),
        });
    }
    writer.align_to_byte();
    writer.write_varu32(value.len() as u32)?;
    writer.write_bytes_aligned(value.as_bytes())?;
    Ok(())
}

/// Reads a length-prefixed UTF-8 string at the next byte boundary.
pub(crate) fn read_string(reader: &mut BitReader<'_>, limits: &Limits) -> CodecResult<String> {
    reader.align_to_byte()?;
    let len = reader.read_varu32()? as usize;
    if len > limits.max_string_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::StringBytes,
            limit: limits.max_string_bytes,
            actual: len,
        });
    }
    let bytes = reader.read_bytes_aligned(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidString)
}
